use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

pub(crate) mod health_check_controller;
pub(crate) mod tiddler_controller;
pub(crate) mod wiki_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self {
            status_code,
            data: Some(data),
        }
    }

    pub fn no_content(status_code: u16) -> ApiResponse<()> {
        ApiResponse {
            status_code,
            data: None,
        }
    }
}

/// Stub response shared by the content routes. The content store is not
/// implemented; these routes pin the URL surface the wiki protocol expects.
pub(crate) fn not_implemented() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(ApiResponse::<()>::no_content(
            StatusCode::NOT_IMPLEMENTED.into(),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_serialize_api_response_with_some() {
        let response = ApiResponse::new(StatusCode::OK.into(), "HelloThere");
        let serialized = serde_json::to_string(&response).unwrap();

        // Serializing and then deserializing because the string output from serde_json::to_string is
        // non-deterministic as far as the order of the JSON keys. This ensures the test won't be flaky
        let deserialized_value: serde_json::Value = serde_json::from_str(&serialized).unwrap();
        let deserialized_expected_value: serde_json::Value =
            json!({"data": "HelloThere", "status_code": 200});
        assert_eq!(deserialized_value, deserialized_expected_value);
    }

    #[tokio::test]
    async fn test_serialize_api_response_with_none() {
        let response = ApiResponse::<()>::no_content(StatusCode::NOT_IMPLEMENTED.into());
        // No need to deserialize here because there's only one key
        let serialized = serde_json::to_string(&response).unwrap();
        assert_eq!(serialized, json!({"status_code": 501}).to_string());
    }
}

use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;

/// Runtime configuration for the wiki server.
///
/// Every flag can also be set through the environment (clap's `env`
/// attribute); a `.env` file in the working directory is loaded first.
#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that are allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Sets the host interface to listen on
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: String,

    /// Sets the TCP port to listen on
    #[arg(short, long, env, default_value_t = 8080)]
    pub port: u16,

    /// Directory served for requests that match no API route (static wiki assets)
    #[arg(long, env, default_value = "./static")]
    pub static_dir: String,

    /// Period in milliseconds between update events on a changes stream
    #[arg(long, env, default_value_t = 2000)]
    pub changes_interval_millis: u64,

    /// Value of the SSE retry directive sent to changes clients; zero omits the directive
    #[arg(long, env, default_value_t = 2000)]
    pub changes_retry_millis: i64,

    /// Sets the log level (Off, Error, Warn, Info, Debug, Trace)
    #[arg(short = 'l', long, env, default_value = "Info")]
    pub log_level_filter: LevelFilter,
}

impl Config {
    /// Loads `.env` when present, then parses CLI arguments and the
    /// environment.
    pub fn new() -> Self {
        dotenv().ok();
        Config::parse()
    }
}

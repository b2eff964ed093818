use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

const DEFAULT_API_URL: &str = "https://brsapi.ir/Api/Market/Gold_Currency.php";
const DEFAULT_REFRESH_SECS: u64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub cache_path: PathBuf,
    pub refresh_interval: Duration,
    pub log_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();

        let api_url =
            std::env::var("BAZARWATCH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        // The key is a credential and must come from the environment;
        // there is no embedded default.
        let api_key = std::env::var("BAZARWATCH_API_KEY")
            .context("BAZARWATCH_API_KEY is not set (get a free key from brsapi.ir)")?;

        let cache_path = match std::env::var("BAZARWATCH_CACHE_PATH") {
            Ok(path) => PathBuf::from(path),
            Err(_) => cache_dir().join("snapshot.json"),
        };

        let refresh_interval = std::env::var("BAZARWATCH_REFRESH_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_REFRESH_SECS));

        let log_path = match std::env::var("BAZARWATCH_LOG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => cache_dir().join("bazarwatch.log"),
        };

        Ok(Self {
            api_url,
            api_key,
            cache_path,
            refresh_interval,
            log_path,
        })
    }
}

fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("bazarwatch")
}

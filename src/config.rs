use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding every collection file.
    pub data_dir: PathBuf,
    pub server: ServerConfig,
    pub search_max_results: usize,
    pub barcode_cache_ttl_days: i64,
    pub archive_after_months: u32,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("MEALMIND_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env_or("APP_PORT", 8080),
        };
        Ok(Self {
            data_dir,
            server,
            search_max_results: env_or("SEARCH_MAX_RESULTS", 20),
            barcode_cache_ttl_days: env_or("BARCODE_CACHE_TTL_DAYS", 30),
            archive_after_months: env_or("ARCHIVE_AFTER_MONTHS", 6),
        })
    }

    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            search_max_results: 20,
            barcode_cache_ttl_days: 30,
            archive_after_months: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_on_garbage() {
        std::env::set_var("MEALMIND_TEST_NUMBER", "not-a-number");
        assert_eq!(env_or("MEALMIND_TEST_NUMBER", 7u32), 7);
        std::env::set_var("MEALMIND_TEST_NUMBER", "12");
        assert_eq!(env_or("MEALMIND_TEST_NUMBER", 7u32), 12);
        std::env::remove_var("MEALMIND_TEST_NUMBER");
        assert_eq!(env_or("MEALMIND_TEST_NUMBER", 7u32), 7);
    }
}

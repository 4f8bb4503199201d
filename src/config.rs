// config.rs
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone)]
pub struct Config {
    /// Unset means the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    pub db_max_connections: u32,
    pub cors_origins: Vec<String>,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn init() -> Config {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Missing or unparsable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let port = lookup("PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        let db_max_connections = lookup("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:8000".to_string(),
                ]
            });

        let log_level = lookup("LOG_LEVEL")
            .and_then(|v| v.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::DEBUG);

        Config {
            database_url,
            port,
            db_max_connections,
            cors_origins,
            log_level,
        }
    }
}

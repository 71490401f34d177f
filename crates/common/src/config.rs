use std::path::PathBuf;

/// Where market data comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceKind {
    /// Yahoo Finance chart API over HTTPS.
    Yahoo,
    /// One CSV file per ticker under a local directory.
    Csv { dir: PathBuf },
}

impl std::fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSourceKind::Yahoo => write!(f, "yahoo"),
            DataSourceKind::Csv { dir } => write!(f, "csv ({})", dir.display()),
        }
    }
}

/// Process-level settings loaded from environment variables at startup.
/// Domain parameters live in the TOML file named by `config_path`.
/// Invalid values cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub data_source: DataSourceKind,
    /// Overrides the TOML universe when set.
    pub universe_override: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let data_source = match optional_env("DATA_SOURCE")
            .unwrap_or_else(|| "yahoo".to_string())
            .to_lowercase()
            .as_str()
        {
            "yahoo" => DataSourceKind::Yahoo,
            "csv" => DataSourceKind::Csv {
                dir: PathBuf::from(required_env("DATA_DIR")),
            },
            other => panic!("ERROR: DATA_SOURCE must be 'yahoo' or 'csv', got: '{other}'"),
        };

        Config {
            config_path: optional_env("PRICEBOT_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("config/pricebot.toml")),
            data_source,
            universe_override: optional_env("UNIVERSE").map(|v| parse_universe(&v)),
        }
    }
}

/// Split a comma-separated ticker list, dropping blanks.
pub fn parse_universe(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

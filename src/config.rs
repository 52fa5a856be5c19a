use anyhow::{Result, bail};

const DEFAULT_MAX_CONNECTIONS: u32 = 15;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_API_BASE_PATH: &str = "/api/repair";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: String,
    /// Prefix the users collection is mounted under. Empty means the root.
    pub api_base_path: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // the service must never start against an implicit database
        let database_url = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ => bail!(
                "DATABASE_URL is not set. Please set it to a valid connection string, e.g. sqlite://users.db"
            ),
        };

        let max_connections = lookup("MAX_CONNECTIONS")
            .and_then(|val| val.parse::<u32>().ok())
            .filter(|val| *val > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let api_base_path = normalize_base_path(
            &lookup("API_BASE_PATH").unwrap_or_else(|| DEFAULT_API_BASE_PATH.to_string()),
        );

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            api_base_path,
        })
    }
}

// "api/repair/" -> "/api/repair", "/" -> ""
fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

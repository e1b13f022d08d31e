use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Interval in seconds between expired-token sweeps. 0 = disabled,
    /// expired tokens are then only dropped when a lookup touches them.
    /// Set via ENIGMA_TOKEN_SWEEP_SECS env var. Default: 0.
    pub token_sweep_secs: u64,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            database_url: "sqlite://alpha-enigma.db?mode=rwc".into(),
            token_sweep_secs: 0,
            log_json: false,
        }
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let defaults = Config::default();

    let port = match std::env::var("ENIGMA_PORT") {
        Ok(v) => v
            .parse()
            .map_err(|_| anyhow::anyhow!("ENIGMA_PORT must be a port number, got '{}'", v))?,
        Err(_) => defaults.port,
    };

    Ok(Config {
        host: std::env::var("ENIGMA_HOST").unwrap_or(defaults.host),
        port,
        database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
        token_sweep_secs: std::env::var("ENIGMA_TOKEN_SWEEP_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.token_sweep_secs),
        log_json: std::env::var("ENIGMA_LOG_JSON")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_sweep() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.token_sweep_secs, 0);
        assert!(cfg.database_url.starts_with("sqlite:"));
    }
}

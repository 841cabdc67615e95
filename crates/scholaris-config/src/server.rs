use std::env;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub observability_enabled: bool,
    /// `json` switches console logs to JSON lines.
    pub log_format: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            observability_enabled: env::var("OBSERVABILITY_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim().to_lowercase().as_str(), "false" | "0" | "off" | "no")
}

#[cfg(test)]
mod tests {
    use super::parse_flag;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("FALSE"));
        assert!(!parse_flag(" off "));
    }
}

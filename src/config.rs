use dotenvy::dotenv;
use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} missing, it is required")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// One hour up to one year.
const TOKEN_TTL_HOURS: RangeInclusive<i64> = 1..=8760;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub request_timeout: Duration,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv().is_ok();

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse("PORT", "u16 number", required("PORT")?)?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_hours: in_range(
                "TOKEN_TTL_HOURS",
                "number of hours between 1 and 8760",
                optional("TOKEN_TTL_HOURS", "number of hours", 24)?,
                TOKEN_TTL_HOURS,
            )?,
            request_timeout: Duration::from_secs(optional(
                "REQUEST_TIMEOUT_SECS",
                "number of seconds",
                10,
            )?),
            db_max_connections: optional("DB_MAX_CONNECTIONS", "u32 number", 5)?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn optional<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) => parse(name, expected, v),
        Err(_) => Ok(default),
    }
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    let parsed: Result<T, _> = value.trim().parse();
    parsed.map_err(|_| ConfigError::Invalid { name, expected, value })
}

fn in_range<T: PartialOrd + ToString>(
    name: &'static str,
    expected: &'static str,
    value: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            expected,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_non_numeric_port() {
        let err = parse::<u16>("PORT", "u16 number", "eighty".to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));
    }

    #[test]
    fn parse_trims_whitespace() {
        let port: u16 = parse("PORT", "u16 number", " 8080 ".to_string()).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn token_ttl_outside_range_is_rejected() {
        for raw in ["0", "-2", "8761", "9223372036854775807"] {
            let hours: i64 = parse("TOKEN_TTL_HOURS", "number of hours", raw.to_string()).unwrap();
            let err = in_range("TOKEN_TTL_HOURS", "hours", hours, TOKEN_TTL_HOURS).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_HOURS", .. }),
                "{raw}"
            );
        }
        assert_eq!(in_range("TOKEN_TTL_HOURS", "hours", 24, TOKEN_TTL_HOURS).unwrap(), 24);
        assert_eq!(in_range("TOKEN_TTL_HOURS", "hours", 8760, TOKEN_TTL_HOURS).unwrap(), 8760);
    }
}

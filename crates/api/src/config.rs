use std::fmt::Display;
use std::str::FromStr;

use rfpeval_core::financial::validation::DEFAULT_MAX_COMPARE_VERSIONS;

/// Server settings, read once at startup.
///
/// | Env var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `HOST`                  | `0.0.0.0`               |
/// | `PORT`                  | `3000`                  |
/// | `CORS_ORIGINS`          | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
/// | `MAX_COMPARE_VERSIONS`  | `20`                    |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Most versions a single financial summary may compare.
    pub max_compare_versions: usize,
}

impl ServerConfig {
    /// Load from the environment. Panics on a value that does not parse, so
    /// a bad deployment fails at boot.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: split_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            max_compare_versions: env_or("MAX_COMPARE_VERSIONS", DEFAULT_MAX_COMPARE_VERSIONS),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            split_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
        assert!(split_origins("").is_empty());
    }

    #[test]
    fn unset_variable_uses_default() {
        assert_eq!(env_or("RFPEVAL_TEST_UNSET_VARIABLE", 42u64), 42);
    }
}

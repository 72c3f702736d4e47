// src/config.rs

use std::{env, fmt, str::FromStr};

use dotenvy::dotenv;
use url::Url;

/// Which of the portal services this process hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    Question,
    Test,
    Marks,
    /// All three services behind one listener.
    All,
}

impl ServiceRole {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceRole::Question => 8085,
            ServiceRole::Test => 8086,
            ServiceRole::Marks => 8087,
            ServiceRole::All => 8080,
        }
    }

    pub fn hosts_questions(self) -> bool {
        matches!(self, ServiceRole::Question | ServiceRole::All)
    }

    pub fn hosts_tests(self) -> bool {
        matches!(self, ServiceRole::Test | ServiceRole::All)
    }

    pub fn hosts_marks(self) -> bool {
        matches!(self, ServiceRole::Marks | ServiceRole::All)
    }
}

impl FromStr for ServiceRole {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "question" | "questions" => Ok(ServiceRole::Question),
            "test" | "tests" => Ok(ServiceRole::Test),
            "marks" => Ok(ServiceRole::Marks),
            "all" => Ok(ServiceRole::All),
            other => Err(ConfigError(format!(
                "EXAM_SERVICE must be one of question, test, marks, all (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceRole::Question => "question",
            ServiceRole::Test => "test",
            ServiceRole::Marks => "marks",
            ServiceRole::All => "all",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub log_dir: String,
    pub service: ServiceRole,
    pub host: String,
    pub port: u16,
    /// Base URLs of the collaborating services.
    pub question_service_url: Url,
    pub test_service_url: Url,
    pub marks_service_url: Url,
    pub upstream_timeout_secs: u64,
    pub seed_question_bank: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service = match lookup("EXAM_SERVICE") {
            Some(raw) => raw.parse()?,
            None => ServiceRole::All,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError(format!("PORT must be a port number (got '{}')", raw)))?,
            None => service.default_port(),
        };

        // In a single-process deployment the services reach each other on our own port.
        let default_url = |other: ServiceRole| {
            let port = if service == ServiceRole::All {
                port
            } else {
                other.default_port()
            };
            format!("http://localhost:{}", port)
        };

        let question_service_url = parse_url(
            "QUESTION_SERVICE_URL",
            lookup("QUESTION_SERVICE_URL").unwrap_or_else(|| default_url(ServiceRole::Question)),
        )?;
        let test_service_url = parse_url(
            "TEST_SERVICE_URL",
            lookup("TEST_SERVICE_URL").unwrap_or_else(|| default_url(ServiceRole::Test)),
        )?;
        let marks_service_url = parse_url(
            "MARKS_SERVICE_URL",
            lookup("MARKS_SERVICE_URL").unwrap_or_else(|| default_url(ServiceRole::Marks)),
        )?;

        let upstream_timeout_secs = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                ConfigError(format!("UPSTREAM_TIMEOUT_SECS must be an integer (got '{}')", raw))
            })?,
            None => 10,
        };

        let seed_question_bank = lookup("SEED_QUESTION_BANK")
            .map(|raw| !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://exam_portal.db?mode=rwc".to_string()),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            service,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            question_service_url,
            test_service_url,
            marks_service_url,
            upstream_timeout_secs,
            seed_question_bank,
        })
    }
}

fn parse_url(key: &str, raw: String) -> Result<Url, ConfigError> {
    Url::parse(&raw).map_err(|e| ConfigError(format!("{} is not a valid URL ({}): {}", key, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_single_process() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.service, ServiceRole::All);
        assert_eq!(config.port, 8080);
        assert_eq!(config.question_service_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.marks_service_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.upstream_timeout_secs, 10);
        assert!(config.seed_question_bank);
    }

    #[test]
    fn split_deployment_uses_per_service_ports() {
        let config = config_from(&[("EXAM_SERVICE", "test")]).unwrap();
        assert_eq!(config.port, 8086);
        assert_eq!(config.question_service_url.as_str(), "http://localhost:8085/");
        assert_eq!(config.marks_service_url.as_str(), "http://localhost:8087/");
    }

    #[test]
    fn explicit_urls_win() {
        let config = config_from(&[
            ("EXAM_SERVICE", "marks"),
            ("TEST_SERVICE_URL", "http://tests.internal:9000"),
            ("SEED_QUESTION_BANK", "false"),
        ])
        .unwrap();
        assert_eq!(config.test_service_url.as_str(), "http://tests.internal:9000/");
        assert!(!config.seed_question_bank);
    }

    #[test]
    fn rejects_unknown_role_and_bad_url() {
        assert!(config_from(&[("EXAM_SERVICE", "grading")]).is_err());
        assert!(config_from(&[("MARKS_SERVICE_URL", "not a url")]).is_err());
        assert!(config_from(&[("PORT", "eighty")]).is_err());
    }
}

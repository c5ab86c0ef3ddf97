//! Process-level settings read from the environment (and `.env`).
//!
//! Per-run options live on the CLI; these are the deployment knobs:
//!
//! - `KPI_ENVIRONMENT`: `development` | `staging` | `production`
//! - `KPI_LOG`: tracing filter directive (e.g. `info`, `freight_kpi=debug`)
//! - `KPI_ENABLE_ANALYTICS`: `true`/`1` to emit usage events from the TUI

use std::collections::HashMap;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "staging" => Some(Environment::Staging),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: Environment,
    pub log_filter: Option<String>,
    pub analytics_enabled: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let vars: HashMap<String, String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("KPI_"))
            .collect();
        Self::from_vars(&vars)
    }

    fn from_vars(vars: &HashMap<String, String>) -> Result<Self, AppError> {
        let environment = match vars.get("KPI_ENVIRONMENT") {
            Some(raw) => Environment::parse(raw).ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Invalid KPI_ENVIRONMENT '{raw}'. Expected development, staging, or production."),
                )
            })?,
            None => Environment::Development,
        };

        let log_filter = vars
            .get("KPI_LOG")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let analytics_enabled = vars
            .get("KPI_ENABLE_ANALYTICS")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            environment,
            log_filter,
            analytics_enabled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_unset() {
        let s = Settings::from_vars(&HashMap::new()).unwrap();
        assert_eq!(s.environment, Environment::Development);
        assert_eq!(s.log_filter, None);
        assert!(!s.analytics_enabled);
    }

    #[test]
    fn reads_all_knobs() {
        let s = Settings::from_vars(&vars(&[
            ("KPI_ENVIRONMENT", "Prod"),
            ("KPI_LOG", " debug "),
            ("KPI_ENABLE_ANALYTICS", "TRUE"),
        ]))
        .unwrap();
        assert_eq!(s.environment, Environment::Production);
        assert_eq!(s.log_filter.as_deref(), Some("debug"));
        assert!(s.analytics_enabled);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = Settings::from_vars(&vars(&[("KPI_ENVIRONMENT", "qa")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

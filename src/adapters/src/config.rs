use std::{env, fmt};

use loyalty_core::Coupon;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("LOYALTY_STORE_KEY is not set, the hosted store cannot be reached without an access key")]
    MissingAccessKey,
    #[error("{0} is not set")]
    MissingVariable(&'static str),
    #[error("Unknown store backend '{0}', expected one of: rest, postgres, memory")]
    UnknownBackend(String),
    #[error("LOYALTY_COUPONS is not a JSON list of coupons: {0}")]
    InvalidCoupons(String),
}

#[derive(Clone, PartialEq, Eq)]
pub enum StoreSettings {
    Rest { url: String, access_key: String },
    Postgres { database_url: String },
    Memory { coupons: Vec<Coupon> },
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreSettings::Rest { url, .. } => f
                .debug_struct("Rest")
                .field("url", url)
                .field("access_key", &"<redacted>")
                .finish(),
            StoreSettings::Postgres { .. } => f
                .debug_struct("Postgres")
                .field("database_url", &"<redacted>")
                .finish(),
            StoreSettings::Memory { coupons } => f
                .debug_struct("Memory")
                .field("coupons", &coupons.len())
                .finish(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoyaltyConfig {
    pub store: StoreSettings,
    pub listen_addr: String,
}

impl LoyaltyConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let backend = read("LOYALTY_STORE_BACKEND").unwrap_or_else(|| "rest".to_string());

        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "rest" => StoreSettings::Rest {
                url: read("LOYALTY_STORE_URL")
                    .ok_or(ConfigurationError::MissingVariable("LOYALTY_STORE_URL"))?,
                access_key: read("LOYALTY_STORE_KEY").ok_or(ConfigurationError::MissingAccessKey)?,
            },
            "postgres" => StoreSettings::Postgres {
                database_url: read("DATABASE_URL")
                    .ok_or(ConfigurationError::MissingVariable("DATABASE_URL"))?,
            },
            "memory" => StoreSettings::Memory {
                coupons: match read("LOYALTY_COUPONS") {
                    Some(raw) => serde_json::from_str(&raw)
                        .map_err(|e| ConfigurationError::InvalidCoupons(e.to_string()))?,
                    None => vec![],
                },
            },
            other => return Err(ConfigurationError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            store,
            listen_addr: read("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| values.get(key).cloned()
    }

    #[test]
    fn rest_backend_is_the_default() {
        let config = LoyaltyConfig::from_lookup(lookup(&[
            ("LOYALTY_STORE_URL", "https://store.example"),
            ("LOYALTY_STORE_KEY", "anon-key"),
        ]))
        .unwrap();

        assert_eq!(
            config.store,
            StoreSettings::Rest {
                url: "https://store.example".to_string(),
                access_key: "anon-key".to_string(),
            }
        );
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn missing_access_key_is_reported() {
        let result = LoyaltyConfig::from_lookup(lookup(&[(
            "LOYALTY_STORE_URL",
            "https://store.example",
        )]));

        assert_eq!(result.unwrap_err(), ConfigurationError::MissingAccessKey);
    }

    #[test]
    fn blank_access_key_is_reported() {
        let result = LoyaltyConfig::from_lookup(lookup(&[
            ("LOYALTY_STORE_URL", "https://store.example"),
            ("LOYALTY_STORE_KEY", "   "),
        ]));

        assert_eq!(result.unwrap_err(), ConfigurationError::MissingAccessKey);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let result = LoyaltyConfig::from_lookup(lookup(&[("LOYALTY_STORE_BACKEND", "postgres")]));

        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::MissingVariable("DATABASE_URL")
        );
    }

    #[test]
    fn memory_backend_needs_no_credentials() {
        let config = LoyaltyConfig::from_lookup(lookup(&[
            ("LOYALTY_STORE_BACKEND", "Memory"),
            ("LISTEN_ADDR", "127.0.0.1:9000"),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreSettings::Memory { coupons: vec![] });
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
    }

    #[test]
    fn memory_backend_reads_coupons() {
        let config = LoyaltyConfig::from_lookup(lookup(&[
            ("LOYALTY_STORE_BACKEND", "memory"),
            (
                "LOYALTY_COUPONS",
                r#"[{"id": 1, "title": "Free drink", "points_cost": 40}]"#,
            ),
        ]))
        .unwrap();

        assert_eq!(
            config.store,
            StoreSettings::Memory {
                coupons: vec![Coupon::new(1, "Free drink".to_string(), 40)]
            }
        );
    }

    #[test]
    fn malformed_coupons_are_rejected() {
        let result = LoyaltyConfig::from_lookup(lookup(&[
            ("LOYALTY_STORE_BACKEND", "memory"),
            ("LOYALTY_COUPONS", r#"[{"id": 1}]"#),
        ]));

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidCoupons(_))
        ));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = LoyaltyConfig::from_lookup(lookup(&[("LOYALTY_STORE_BACKEND", "sqlite")]));

        assert_eq!(
            result.unwrap_err(),
            ConfigurationError::UnknownBackend("sqlite".to_string())
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let settings = StoreSettings::Rest {
            url: "https://store.example".to_string(),
            access_key: "anon-key".to_string(),
        };

        let rendered = format!("{:?}", settings);

        assert!(!rendered.contains("anon-key"));
        assert!(rendered.contains("https://store.example"));
    }
}

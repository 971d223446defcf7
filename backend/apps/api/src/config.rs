//! Server Settings
//!
//! Everything the binary reads from the environment, parsed once at
//! startup.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AuthConfig, InitialAdmin};
use axum::http::HeaderValue;
use base64::Engine;
use base64::engine::general_purpose;
use catalog::CatalogConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

pub struct Settings {
    /// PostgreSQL when set, the in-process store otherwise
    pub database_url: Option<String>,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<HeaderValue>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key → value source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut auth = match get("AUTH_TOKEN_SECRET") {
            Some(secret_b64) => {
                let secret = general_purpose::STANDARD
                    .decode(secret_b64.trim())
                    .context("AUTH_TOKEN_SECRET is not valid base64")?;
                AuthConfig::with_secret(secret)?
            }
            None if cfg!(debug_assertions) => {
                tracing::warn!("AUTH_TOKEN_SECRET not set, using a random secret");
                AuthConfig::development()
            }
            None => bail!("AUTH_TOKEN_SECRET must be set in production"),
        };

        if let Some(ttl) = get("AUTH_TOKEN_TTL_SECS") {
            let secs: u64 = ttl
                .trim()
                .parse()
                .context("AUTH_TOKEN_TTL_SECS must be a whole number of seconds")?;
            if secs == 0 {
                bail!("AUTH_TOKEN_TTL_SECS must be positive");
            }
            auth = auth.with_token_ttl(Duration::from_secs(secs));
        }

        match (
            get("AUTH_ADMIN_EMAIL"),
            get("AUTH_ADMIN_PASSWORD"),
            get("AUTH_ADMIN_NAME"),
        ) {
            (Some(email), Some(password), name) => {
                auth = auth.with_initial_admin(InitialAdmin {
                    email,
                    password,
                    name: name.unwrap_or_else(|| "Administrator".to_string()),
                });
            }
            (None, None, _) => {}
            _ => bail!("AUTH_ADMIN_EMAIL and AUTH_ADMIN_PASSWORD must be set together"),
        }

        let strict_order_lookup = match get("CATALOG_STRICT_ORDER_LOOKUP") {
            Some(flag) => flag
                .trim()
                .parse::<bool>()
                .context("CATALOG_STRICT_ORDER_LOOKUP must be true or false")?,
            None => false,
        };

        let bind_addr: SocketAddr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins: Vec<HeaderValue> = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        Ok(Self {
            database_url: get("DATABASE_URL"),
            auth,
            catalog: CatalogConfig {
                strict_order_lookup,
            },
            bind_addr,
            frontend_origins,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("auth", &self.auth)
            .field("catalog", &self.catalog)
            .field("bind_addr", &self.bind_addr)
            .field("frontend_origins", &self.frontend_origins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    const SECRET_B64: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

    #[test]
    fn test_defaults() {
        let settings = settings(&[("AUTH_TOKEN_SECRET", SECRET_B64)]).unwrap();
        assert!(settings.database_url.is_none());
        assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(settings.auth.token_ttl_secs(), 3600);
        assert!(settings.auth.initial_admin.is_none());
        assert!(!settings.catalog.strict_order_lookup);
        assert_eq!(settings.frontend_origins.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("AUTH_TOKEN_SECRET", SECRET_B64),
            ("AUTH_TOKEN_TTL_SECS", "60"),
            ("AUTH_ADMIN_EMAIL", "root@oficina.com"),
            ("AUTH_ADMIN_PASSWORD", "rootpw"),
            ("CATALOG_STRICT_ORDER_LOOKUP", "true"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/oficina"),
        ])
        .unwrap();

        assert_eq!(settings.auth.token_ttl_secs(), 60);
        let admin = settings.auth.initial_admin.as_ref().unwrap();
        assert_eq!(admin.name, "Administrator");
        assert!(settings.catalog.strict_order_lookup);
        assert_eq!(settings.bind_addr.port(), 9000);
        assert!(settings.database_url.is_some());
        assert!(!format!("{settings:?}").contains("postgres://"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(settings(&[("AUTH_TOKEN_SECRET", "c2hvcnQ=")]).is_err());
        assert!(settings(&[("AUTH_TOKEN_SECRET", "%%%")]).is_err());
        assert!(
            settings(&[("AUTH_TOKEN_SECRET", SECRET_B64), ("AUTH_TOKEN_TTL_SECS", "soon")])
                .is_err()
        );
        assert!(
            settings(&[("AUTH_TOKEN_SECRET", SECRET_B64), ("AUTH_ADMIN_EMAIL", "a@o.com")])
                .is_err()
        );
    }
}

//! Environment-driven service configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use stockroom_auth::RoleNames;
use stockroom_products::DEFAULT_TOPIC;

/// Key material used to verify bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtKey {
    /// HS256 shared secret.
    Secret(String),
    /// RS256 public key, PEM file on disk.
    PublicKeyPem(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_key: JwtKey,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,
    pub roles: RoleNames,
    pub events_topic: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_key: JwtKey::Secret("dev-secret".to_string()),
            jwt_issuer: None,
            jwt_audience: None,
            roles: RoleNames::default(),
            events_topic: DEFAULT_TOPIC.to_string(),
            database_url: None,
            redis_url: None,
        }
    }
}

impl ApiConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let bind_addr = match get("BIND_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("BIND_ADDR is not a socket address: {addr}"))?,
            None => defaults.bind_addr,
        };

        let jwt_key = match (get("JWT_PUBLIC_KEY_PEM"), get("JWT_SECRET")) {
            (Some(path), _) => JwtKey::PublicKeyPem(PathBuf::from(path)),
            (None, Some(secret)) => JwtKey::Secret(secret),
            (None, None) => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                defaults.jwt_key
            }
        };

        let roles = RoleNames::new(
            get("ROLE_ADMIN").unwrap_or_else(|| defaults.roles.admin.to_string()),
            get("ROLE_USER").unwrap_or_else(|| defaults.roles.user.to_string()),
        );

        Ok(Self {
            bind_addr,
            jwt_key,
            jwt_issuer: get("JWT_ISSUER"),
            jwt_audience: get("JWT_AUDIENCE"),
            roles,
            events_topic: get("PRODUCT_EVENTS_TOPIC").unwrap_or(defaults.events_topic),
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.roles, RoleNames::default());
        assert_eq!(config.events_topic, "product-events");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn role_names_are_overridable() {
        let config =
            ApiConfig::from_lookup(lookup(&[("ROLE_ADMIN", "store-admin"), ("ROLE_USER", "clerk")])).unwrap();
        assert_eq!(config.roles, RoleNames::new("store-admin", "clerk"));
    }

    #[test]
    fn public_key_wins_over_secret() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("JWT_PUBLIC_KEY_PEM", "/etc/stockroom/realm.pem"),
        ]))
        .unwrap();
        assert_eq!(config.jwt_key, JwtKey::PublicKeyPem("/etc/stockroom/realm.pem".into()));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = ApiConfig::from_lookup(lookup(&[("DATABASE_URL", "  "), ("JWT_SECRET", "abc")])).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.jwt_key, JwtKey::Secret("abc".into()));
    }

    #[test]
    fn bad_bind_addr_is_an_error() {
        assert!(ApiConfig::from_lookup(lookup(&[("BIND_ADDR", "not-an-addr")])).is_err());
    }
}

use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{0}` must not be empty")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
    /// bcrypt hash of the admin password. Left empty, logins fail with a
    /// misconfiguration error.
    #[serde(default)]
    pub admin_password_hash: String,
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    #[serde(default = "default_image_max_dimension")]
    pub image_max_dimension: u32,
    #[serde(default = "default_image_quality")]
    pub image_quality: u8,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_database_path() -> String {
    "data.db".to_string()
}

fn default_upload_path() -> String {
    "uploads".to_string()
}

fn default_token_ttl_seconds() -> u64 {
    10 * 60 * 60
}

fn default_image_max_dimension() -> u32 {
    600
}

fn default_image_quality() -> u8 {
    60
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    if config.jwt_secret.trim().is_empty() {
        return Err(ConfigError::Missing("jwt_secret"));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_fields() {
        let config = parse_config(r#"{"jwt_secret": "s3cret"}"#).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.database_path, "data.db");
        assert_eq!(config.upload_path, "uploads");
        assert_eq!(config.admin_password_hash, "");
        assert_eq!(config.token_ttl_seconds, 36_000);
        assert_eq!(config.image_max_dimension, 600);
        assert_eq!(config.image_quality, 60);
    }

    #[test]
    fn explicit_values_win() {
        let config = parse_config(
            r#"{
                "bind_address": "127.0.0.1:9000",
                "upload_path": "/srv/photos",
                "admin_password_hash": "$2b$12$abc",
                "jwt_secret": "k",
                "image_quality": 80
            }"#,
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.upload_path, "/srv/photos");
        assert_eq!(config.admin_password_hash, "$2b$12$abc");
        assert_eq!(config.image_quality, 80);
    }

    #[test]
    fn jwt_secret_is_required() {
        assert!(matches!(parse_config("{}"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            parse_config(r#"{"jwt_secret": "  "}"#),
            Err(ConfigError::Missing("jwt_secret"))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_config("/nonexistent/config.json"),
            Err(ConfigError::Io(_))
        ));
    }
}

//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{AppError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_email_config(&settings.email)?;
    validate_jobs_config(&settings.jobs)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(AppError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(AppError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(AppError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate bearer token configuration
fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.is_empty() {
        return Err(AppError::Config(
            "JWT secret is required".to_string()
        ));
    }

    if config.admin_group.is_empty() {
        return Err(AppError::Config(
            "Admin group name is required".to_string()
        ));
    }

    Ok(())
}

/// Validate email delivery configuration
fn validate_email_config(config: &super::EmailConfig) -> Result<()> {
    if config.smtp_server.is_empty() {
        return Err(AppError::Config(
            "SMTP server is required".to_string()
        ));
    }

    if config.from_email.is_empty() || !config.from_email.contains('@') {
        return Err(AppError::Config(
            "A valid sender email address is required".to_string()
        ));
    }

    Ok(())
}

/// Validate background job configuration
fn validate_jobs_config(config: &super::JobsConfig) -> Result<()> {
    if config.sweep_interval_secs == 0 {
        return Err(AppError::Config(
            "Sweep interval must be greater than 0".to_string()
        ));
    }

    if config.dispatch_interval_secs == 0 {
        return Err(AppError::Config(
            "Dispatch interval must be greater than 0".to_string()
        ));
    }

    if config.dispatch_batch_size <= 0 {
        return Err(AppError::Config(
            "Dispatch batch size must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(AppError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(AppError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "test-secret".to_string();
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(validate_settings(&valid_settings()).is_ok());
    }

    #[test]
    fn test_missing_jwt_secret_rejected() {
        let mut settings = valid_settings();
        settings.auth.jwt_secret = String::new();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_connection_bounds_rejected() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        settings.database.max_connections = 10;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let mut settings = valid_settings();
        settings.jobs.dispatch_batch_size = 0;
        assert!(validate_settings(&settings).is_err());
    }
}

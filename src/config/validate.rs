use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - CC address and default passcode are not blank
/// - Notification history keeps at least one entry
/// - Translation has an API key when enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.notification.cc_address.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "notification.cc_address cannot be empty".to_string(),
        ));
    }

    if config.notification.history_limit == 0 {
        return Err(ConfigError::ValidationError(
            "notification.history_limit cannot be 0".to_string(),
        ));
    }

    if config.desk.default_passcode.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "desk.default_passcode cannot be empty".to_string(),
        ));
    }

    if config.translation.enabled {
        let has_key = config
            .translation
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if !has_key {
            return Err(ConfigError::ValidationError(
                "translation.api_key is required when translation is enabled".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_history_fails() {
        let mut config = Config::default();
        config.notification.history_limit = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_blank_passcode_fails() {
        let mut config = Config::default();
        config.desk.default_passcode = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_translation_needs_key() {
        let mut config = Config::default();
        config.translation.enabled = true;
        assert!(validate_config(&config).is_err());

        config.translation.api_key = Some("secret".to_string());
        assert!(validate_config(&config).is_ok());
    }
}

//! Full configuration validation.
//!
//! Validates numeric ranges and cross-field bounds. Each section has its own
//! function; this entry point calls them all and collects errors into a
//! single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::NanochatConfig;
use nanochat_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &NanochatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_chat(&mut errors, config);
    sections::validate_sampling(&mut errors, config);
    sections::validate_host(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

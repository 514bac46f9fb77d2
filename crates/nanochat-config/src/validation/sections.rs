//! Validation for the chat, sampling, and host sections.

use crate::schema::NanochatConfig;

use super::helpers::{validate_range, validate_range_f64};

/// Upper bound for top-K accepted anywhere in the config.
const TOP_K_CEILING: u64 = 128;

/// Validate chat constraints.
pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &NanochatConfig) {
    validate_range(
        errors,
        "chat.notice_capacity",
        u64::from(config.chat.notice_capacity),
        1,
        64,
    );
    if config.chat.welcome_message.trim().is_empty() {
        errors.push("chat.welcome_message must not be empty".into());
    }
    if config.chat.cleared_message.trim().is_empty() {
        errors.push("chat.cleared_message must not be empty".into());
    }
}

/// Validate slider bounds.
pub(crate) fn validate_sampling(errors: &mut Vec<String>, config: &NanochatConfig) {
    let sampling = &config.sampling;
    validate_range_f64(
        errors,
        "sampling.temperature_step",
        sampling.temperature_step,
        0.01,
        1.0,
    );
    validate_range(
        errors,
        "sampling.top_k_min",
        u64::from(sampling.top_k_min),
        1,
        TOP_K_CEILING,
    );
    validate_range(
        errors,
        "sampling.top_k_max",
        u64::from(sampling.top_k_max),
        1,
        TOP_K_CEILING,
    );
    if sampling.top_k_min > sampling.top_k_max {
        errors.push(format!(
            "sampling.top_k_min = {} exceeds sampling.top_k_max = {}",
            sampling.top_k_min, sampling.top_k_max
        ));
    }
}

/// Validate simulated host constraints.
pub(crate) fn validate_host(errors: &mut Vec<String>, config: &NanochatConfig) {
    let host = &config.host;
    validate_range_f64(
        errors,
        "host.default_temperature",
        host.default_temperature,
        0.0,
        1.0,
    );
    validate_range(
        errors,
        "host.default_top_k",
        u64::from(host.default_top_k),
        1,
        TOP_K_CEILING,
    );
    validate_range(errors, "host.max_tokens", host.max_tokens, 1, 1_000_000);
    validate_range(errors, "host.chunk_delay_ms", host.chunk_delay_ms, 0, 5000);
}

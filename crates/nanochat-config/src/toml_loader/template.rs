//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# nanochat configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[chat]
# welcome_message = "Hello! I'm Gemini Nano. How can I help you today?"
# cleared_message = "Chat cleared. How can I help you?"
# chunk_mode = "cumulative"   # cumulative, delta
# notice_capacity = 8         # 1-64

[sampling]
# temperature_step = 0.1      # 0.01-1.0
# top_k_min = 1
# top_k_max = 40

[host]
# available = true
# default_temperature = 0.8   # 0.0-1.0
# default_top_k = 3
# max_tokens = 6144
# chunk_delay_ms = 40         # 0-5000

[logging]
# level = "INFO"              # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}

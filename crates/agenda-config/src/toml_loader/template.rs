//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Agenda Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.
# API keys are read from the environment (OPENAI_API_KEY, ANTHROPIC_API_KEY)
# or from a .env file, never from this file.

[reasoning]
# provider = "openai"      # openai, claude
# model = "gpt-4o-mini"    # empty = provider default
# base_url = ""            # OpenAI-compatible endpoint override
# max_tokens = 1024        # 1-32768
# temperature = 0.3        # 0.0-2.0
# timeout_secs = 60        # 5-600
# max_retries = 2          # 0-10
# retry_backoff_ms = 500   # 0-60000

[assistant]
# system_prompt = "..."    # placeholders: {now}, {user_name}
# show_tool_notices = true
# tool_notice_prefix = "🔧"
# parallel_tools = false
# tool_timeout_secs = 10   # 1-300
# error_message = "Sorry, something went wrong. Could you try again?"

[store]
# pool_size = 8            # 1-256
# seed_file = "appointments.json"

[logging]
# level = "INFO"           # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}

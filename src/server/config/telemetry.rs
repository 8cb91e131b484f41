use tracing::info;

use super::ServerConfig;

pub fn log_loaded(config: &ServerConfig) {
    info!(
        target: "refine_prompt::config",
        path = %config.source_path.display(),
        file_found = config.file_found,
        base_url = %config.provider.base_url,
        model = %config.provider.model,
        temperature = config.provider.temperature,
        max_tokens = config.provider.max_tokens,
        timeout_secs = config.provider.timeout_secs,
        api_key_env = %config.provider.api_key_env,
        credential_present = config.provider.has_credential(),
        "Configuration loaded"
    );
}

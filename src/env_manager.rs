use crate::config::LLMProvider;
use log::{debug, info};
use secrecy::SecretString;
use std::env;

/// Optional variables read by this crate
pub const OPTIONAL_ENV_VARS: &[&str] =
    &["OPENAI_API_KEY", "XAI_API_KEY", "DEEPSEEK_API_KEY", "EVENTPARSE_LOG_LEVEL", "EVENTPARSE_CONFIG_PATH"];

/// Load variables from a `.env` file if there is one
pub fn load_env_file() {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => debug!("No .env file loaded: {}", e),
    }
}

/// API key for `provider`, if set and non-blank
pub fn api_key(provider: LLMProvider) -> Option<SecretString> {
    let var = provider.api_key_var();
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value.trim().to_string())),
        _ => {
            debug!("{} is not set", var);
            None
        }
    }
}

// Configuration management module
// Handles TOML settings, the API credential, and interactive setup

pub mod interactive;
pub mod settings;


pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    ApiKey, Config, ConfigError, EmbeddingConfig, GenerationConfig, RetrievalConfig, SarvamConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}

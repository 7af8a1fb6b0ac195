use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn defaults_are_valid() {
    let config = Config::default_with_dir(Path::new("/tmp/ramayana-test"));
    assert!(config.validate().is_ok());
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.generation.model, "sarvam-m");
    assert_eq!(config.generation.max_tokens, 512);
    assert_eq!(config.embedding.dimension, DEFAULT_EMBEDDING_DIMENSION);
    assert_eq!(config.sarvam.retry_attempts, 1);
}

#[test]
fn load_missing_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let config = Config::load_from(temp_dir.path()).expect("load should succeed");
    assert_eq!(config.embedding, EmbeddingConfig::default());
    assert_eq!(config.base_dir, temp_dir.path());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let mut config = Config::load_from(temp_dir.path()).expect("load should succeed");
    config.retrieval.top_k = 5;
    config.generation.max_tokens = 256;
    config.embedding.model = "all-minilm:latest".to_string();
    config.save().expect("save should succeed");

    let reloaded = Config::load_from(temp_dir.path()).expect("reload should succeed");
    assert_eq!(reloaded.retrieval.top_k, 5);
    assert_eq!(reloaded.generation.max_tokens, 256);
    assert_eq!(reloaded.embedding.model, "all-minilm:latest");
}

#[test]
fn malformed_toml_is_an_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    std::fs::write(temp_dir.path().join("config.toml"), "[embedding\nport = {}")
        .expect("should write file");

    assert!(Config::load_from(temp_dir.path()).is_err());
}

#[test]
fn validation_rejects_out_of_range_values() {
    let base = Path::new("/tmp/ramayana-test");

    let mut config = Config::default_with_dir(base);
    config.retrieval.top_k = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTopK(0))
    ));

    let mut config = Config::default_with_dir(base);
    config.generation.temperature = 3.0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidTemperature(_))
    ));

    let mut config = Config::default_with_dir(base);
    config.embedding.protocol = "ftp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));

    let mut config = Config::default_with_dir(base);
    config.sarvam.retry_attempts = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidRetryAttempts(0))
    ));

    let mut config = Config::default_with_dir(base);
    config.embedding.dimension = 16;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidEmbeddingDimension(16))
    ));
}

#[test]
fn embedding_endpoint_url() {
    let embedding = EmbeddingConfig {
        host: "embed-host".to_string(),
        port: 4242,
        ..EmbeddingConfig::default()
    };

    let url = embedding.endpoint_url().expect("should build URL");
    assert_eq!(url.host_str(), Some("embed-host"));
    assert_eq!(url.port(), Some(4242));
}

#[test]
#[serial]
fn config_dir_honors_env_override() {
    // SAFETY: tests touching process env are serialized via #[serial]
    unsafe { std::env::set_var(CONFIG_DIR_ENV, "/tmp/ramayana-chat-override") };
    let dir = Config::config_dir().expect("should resolve dir");
    assert_eq!(dir, PathBuf::from("/tmp/ramayana-chat-override"));
    unsafe { std::env::remove_var(CONFIG_DIR_ENV) };
}

#[test]
#[serial]
fn api_key_missing_is_fatal() {
    // SAFETY: tests touching process env are serialized via #[serial]
    unsafe { std::env::remove_var(API_KEY_ENV) };
    assert!(matches!(
        ApiKey::from_env(),
        Err(ConfigError::MissingApiKey(_))
    ));

    unsafe { std::env::set_var(API_KEY_ENV, "   ") };
    assert!(ApiKey::from_env().is_err());

    unsafe { std::env::set_var(API_KEY_ENV, "sk-test-key") };
    let key = ApiKey::from_env().expect("key should load");
    assert_eq!(key.expose(), "sk-test-key");
    assert_eq!(format!("{:?}", key), "ApiKey(redacted)");
    unsafe { std::env::remove_var(API_KEY_ENV) };
}

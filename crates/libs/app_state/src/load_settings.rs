use crate::AppSettings;
use color_eyre::Result;
use std::path::Path;
use std::sync::LazyLock;

/// Load settings from a YAML file plus `APP__`-prefixed environment
/// overrides (e.g. `APP__SECRETS__GEMINI_API_KEY`).
pub fn load_settings_from(config_path: &Path) -> Result<AppSettings> {
    // Pick up a local .env first so it can overwrite secrets from env.
    dotenv::from_path(".env").ok();
    let builder = config::Config::builder()
        .add_source(config::File::from(config_path.canonicalize()?))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );
    Ok(builder.build()?.try_deserialize::<AppSettings>()?)
}

pub fn load_app_settings() -> Result<AppSettings> {
    load_settings_from(Path::new("config/settings.yaml"))
}

/// Immutable global settings, initialized on first access.
pub static SETTINGS: LazyLock<AppSettings> =
    LazyLock::new(|| load_app_settings().expect("Failed to load app settings"));

#[must_use]
pub fn settings() -> &'static AppSettings {
    &SETTINGS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r"
analysis:
  model_candidates: [gemini-pro]
  request_timeout_secs: 10
google:
  project_id: outfit-vision
  firestore_database: (default)
logging:
  level: info
secrets:
  vision_api_key: null
  gemini_api_key: null
  credentials_file: null
";

    #[test]
    fn loads_yaml_settings() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        file.write_all(SAMPLE.as_bytes())?;
        let settings = load_settings_from(file.path())?;
        assert_eq!(settings.analysis.model_candidates, vec!["gemini-pro"]);
        assert_eq!(settings.analysis.request_timeout_secs, 10);
        assert_eq!(settings.google.project_id, "outfit-vision");
        assert_eq!(settings.secrets.gemini_api_key, None);
        Ok(())
    }
}

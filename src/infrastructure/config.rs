use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub firebase: FirebaseSettings,
    #[serde(default)]
    pub live: LiveSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FirebaseSettings {
    pub database_url: String,
    /// Database secret or ID token, sent as `auth=`
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default = "default_readings_path")]
    pub readings_path: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LiveSettings {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_preload")]
    pub preload: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            preload: default_preload(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_readings_path() -> String {
    "lecturas".to_string()
}

fn default_capacity() -> usize {
    20
}

fn default_preload() -> usize {
    5
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// Load `config/telemetry.*`, overridden by `TELEMETRY__SECTION__KEY` variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/telemetry").required(false))
        .add_source(
            config::Environment::with_prefix("TELEMETRY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    if config.live.capacity == 0 {
        anyhow::bail!("live.capacity must be at least 1");
    }
    Ok(config)
}

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding serialized model artifacts and catalog metadata
    #[serde(default = "default_models_dir")]
    pub models_dir: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Reference year for the recency signal
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,

    /// Seed for fallback noise sampling; sampled from the OS when unset
    #[serde(default)]
    pub noise_seed: Option<u64>,
}

fn default_models_dir() -> String {
    "./models".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_reference_year() -> i32 {
    2024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            host: default_host(),
            port: default_port(),
            reference_year: default_reference_year(),
            noise_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

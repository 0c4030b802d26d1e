use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Completion model used when neither the config file nor the CLI picks one.
pub const DEFAULT_MODEL: &str = "davinci-instruct-beta";

/// Default API endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Greeting shown on launch until the first message is sent.
pub const DEFAULT_GREETING: &str = "不知道叫什么的GPT🤪";

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const ORGANIZATION_VAR: &str = "OPENAI_ORGANIZATION";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub default_model: Option<String>,
    pub base_url: Option<String>,
    /// Banner text for the typewriter greeting.
    pub greeting: Option<String>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "causerie");
        match proj_dirs {
            Some(dirs) => dirs.config_dir().join("config.toml"),
            None => PathBuf::from("causerie.toml"),
        }
    }
}

/// API credentials read from the environment.
///
/// A missing variable yields an empty string rather than an error: the
/// request is still attempted and the remote rejection is absorbed like any
/// other failure.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub organization: String,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_vars(API_KEY_VAR, ORGANIZATION_VAR)
    }

    fn from_vars(api_key_var: &str, organization_var: &str) -> Self {
        Self {
            api_key: env::var(api_key_var).unwrap_or_default(),
            organization: env::var(organization_var).unwrap_or_default(),
        }
    }
}

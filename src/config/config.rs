use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
            },
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .set_default("backend.base_url", DEFAULT_BASE_URL)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("PAPERCHAT").separator("__"))
            .build()?;

        let mut app_config: AppConfig = settings.try_deserialize()?;

        // Expand environment variables if present like ${PAPERCHAT_BACKEND}
        app_config.backend.base_url = expand_env(&app_config.backend.base_url);
        if app_config.backend.base_url.is_empty() {
            app_config.backend.base_url = DEFAULT_BASE_URL.to_string();
        }

        Ok(app_config)
    }

    /// Applies a `--base-url` style override on top of whatever was loaded.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.backend.base_url = url;
        }
        self
    }
}

fn expand_env(val: &str) -> String {
    if val.starts_with("${") && val.ends_with('}') {
        let var_name = &val[2..val.len() - 1];
        std::env::var(var_name).unwrap_or_else(|_| "".to_string())
    } else {
        val.to_string()
    }
}

pub mod config;

pub use self::config::{AppConfig, BackendConfig, DEFAULT_BASE_URL};

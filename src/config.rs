use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_addr: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("database_url", "sqlite:thoughts.db")?
            .set_default("server_addr", "127.0.0.1:3000")?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::default())
            .build()?;

        s.try_deserialize()
    }
}

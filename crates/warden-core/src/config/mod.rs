//! Application configuration schemas.
//!
//! Configuration is deserialized from TOML files and the environment via
//! the `config` crate. Each sub-module is one logical section.

pub mod auth;
pub mod logging;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;

use crate::result::AppResult;

/// Environment variable prefix for overrides, e.g. `WARDEN__AUTH__JWT_SECRET`.
pub const ENV_PREFIX: &str = "WARDEN";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Token authority settings.
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Merges `config/default`, an environment-specific overlay
    /// `config/{env}` (both optional) and environment variables prefixed
    /// with `WARDEN__`.
    pub fn load(env: &str) -> AppResult<Self> {
        Self::load_with_vars(env, None)
    }

    /// Same as [`load`](Self::load), reading overrides from `vars` instead of
    /// the process environment when given.
    pub fn load_with_vars(env: &str, vars: Option<HashMap<String, String>>) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(vars.map(|vars| vars.into_iter().collect())),
            )
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.auth.validate()?;
        Ok(app)
    }
}

//! Application settings read from Rocket's figment under the `schoolflow` key.
//!
//! ```toml
//! [release.schoolflow]
//! secure_cookies = true
//! access_log_url = "https://logs.example.com/ingest"
//! static_dir = "/srv/schoolflow/static"
//! ```

use rocket::fairing::AdHoc;
use rocket::figment::Figment;
use serde::Deserialize;

pub const CONFIG_KEY: &str = "schoolflow";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Whether session cookies carry the `Secure` attribute. Resolved from
    /// the active profile on ignition when not set explicitly.
    pub secure_cookies: Option<bool>,
    /// Collector that receives access-log events as JSON. When unset the
    /// events go to the application log.
    pub access_log_url: Option<String>,
    /// Directory served for the frontend; `SCHOOLFLOW_STATIC_DIR` overrides it.
    pub static_dir: Option<String>,
}

impl AppConfig {
    /// Extracts the settings, defaulting `secure_cookies` to true only under
    /// the release profile.
    pub fn from_figment(figment: &Figment) -> Result<Self, rocket::figment::Error> {
        let mut config: AppConfig = figment.focus(CONFIG_KEY).extract()?;
        if config.secure_cookies.is_none() {
            let production = *figment.profile() == rocket::Config::RELEASE_PROFILE;
            config.secure_cookies = Some(production);
        }
        Ok(config)
    }

    pub fn cookies_secure(&self) -> bool {
        self.secure_cookies.unwrap_or(false)
    }

    pub fn static_dir(&self) -> String {
        std::env::var("SCHOOLFLOW_STATIC_DIR")
            .ok()
            .or_else(|| self.static_dir.clone())
            .unwrap_or_else(|| "static".to_string())
    }
}

/// Places the resolved [`AppConfig`] into managed state.
pub fn config_fairing() -> AdHoc {
    AdHoc::try_on_ignite("SchoolFlow Config", |rocket| async {
        match AppConfig::from_figment(rocket.figment()) {
            Ok(config) => {
                info!(
                    "[config] secure cookies: {}, access log sink: {}",
                    config.cookies_secure(),
                    config.access_log_url.as_deref().unwrap_or("application log")
                );
                Ok(rocket.manage(config))
            }
            Err(e) => {
                error!("[config] Invalid `{}` configuration: {}", CONFIG_KEY, e);
                Err(rocket)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_defaults_follow_profile() {
        let debug = Figment::from(rocket::Config::debug_default());
        assert!(!AppConfig::from_figment(&debug).unwrap().cookies_secure());

        let release = Figment::from(rocket::Config::release_default())
            .select(rocket::Config::RELEASE_PROFILE);
        assert!(AppConfig::from_figment(&release).unwrap().cookies_secure());
    }

    #[test]
    fn test_explicit_settings_win() {
        let figment = Figment::from(rocket::Config::debug_default())
            .merge(("schoolflow.secure_cookies", true))
            .merge(("schoolflow.access_log_url", "http://127.0.0.1:9/logs"));
        let config = AppConfig::from_figment(&figment).unwrap();
        assert!(config.cookies_secure());
        assert_eq!(config.access_log_url.as_deref(), Some("http://127.0.0.1:9/logs"));
    }
}

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "console.toml";
pub const DEFAULT_EMPLOYEE_API_URL: &str = "http://127.0.0.1:3001/api/employees";
pub const DEFAULT_DEMO_API_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Employee collection endpoint.
    pub employee_api_url: Url,
    /// Host serving the read-only demo collections.
    pub demo_api_url: Url,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            employee_api_url: Url::parse(DEFAULT_EMPLOYEE_API_URL).expect("default employee url"),
            demo_api_url: Url::parse(DEFAULT_DEMO_API_URL).expect("default demo url"),
        }
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid {key} '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!("{key} must use http or https, got '{}'", url.scheme());
    }
    Ok(url)
}

/// Loads `console.toml` from the working directory and the process environment.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment overrides
/// (`APP__`-prefixed names win over the bare ones).
pub fn load_settings_from<F>(path: &Path, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("employee_api_url") {
                    settings.employee_api_url = parse_url("employee_api_url", v)?;
                }
                if let Some(v) = file_cfg.get("demo_api_url") {
                    settings.demo_api_url = parse_url("demo_api_url", v)?;
                }
            }
            Err(err) => warn!(path = %path.display(), "ignoring malformed config file: {err}"),
        }
    }

    if let Some(v) = env("EMPLOYEE_API_URL") {
        settings.employee_api_url = parse_url("EMPLOYEE_API_URL", &v)?;
    }
    if let Some(v) = env("APP__EMPLOYEE_API_URL") {
        settings.employee_api_url = parse_url("APP__EMPLOYEE_API_URL", &v)?;
    }

    if let Some(v) = env("DEMO_API_URL") {
        settings.demo_api_url = parse_url("DEMO_API_URL", &v)?;
    }
    if let Some(v) = env("APP__DEMO_API_URL") {
        settings.demo_api_url = parse_url("APP__DEMO_API_URL", &v)?;
    }

    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

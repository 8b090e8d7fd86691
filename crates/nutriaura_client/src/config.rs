use crate::AnalysisError;
use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AnalysisError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function instead of the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, AnalysisError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let api = get("NUTRIAURA_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::Config("NUTRIAURA_API_KEY missing".into()))?;
        let model = get("NUTRIAURA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());
        let base_url = get("NUTRIAURA_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let timeout = match get("NUTRIAURA_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AnalysisError::Config(format!("NUTRIAURA_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => 60,
        };
        Ok(Self {
            api_key: SecretString::new(api.into()),
            model,
            base_url,
            timeout: Duration::from_secs(timeout),
        })
    }
}

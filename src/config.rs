//! Startup configuration from the environment

use crate::session::DEFAULT_TEMPERATURE;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_MODEL: &str = "models/gemini-1.5-flash";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Settings read once at process start
#[derive(Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Base URL replacing the public Gemini endpoint
    pub gateway: Option<String>,
    pub port: u16,
    /// Sessions without any request for this long are dropped
    pub session_idle: Duration,
}

impl ChatConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        let model = get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = match get("GEMINI_TEMPERATURE") {
            Some(raw) => {
                let value: f32 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "GEMINI_TEMPERATURE",
                    value: raw.clone(),
                    reason: "not a number",
                })?;
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::Invalid {
                        name: "GEMINI_TEMPERATURE",
                        value: raw,
                        reason: "must be between 0.0 and 1.0",
                    });
                }
                value
            }
            None => DEFAULT_TEMPERATURE,
        };

        let port = match get("CHAT_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CHAT_PORT",
                value: raw,
                reason: "not a port number",
            })?,
            None => DEFAULT_PORT,
        };

        let idle_secs = match get("CHAT_SESSION_IDLE_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "CHAT_SESSION_IDLE_SECS",
                        value: raw,
                        reason: "must be a positive number of seconds",
                    })
                }
            },
            None => DEFAULT_SESSION_IDLE_SECS,
        };

        Ok(Self {
            api_key,
            model,
            temperature,
            gateway: get("LLM_GATEWAY"),
            port,
            session_idle: Duration::from_secs(idle_secs),
        })
    }
}

// Keep the key out of logs
impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("gateway", &self.gateway)
            .field("port", &self.port)
            .field("session_idle", &self.session_idle)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ChatConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ChatConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("GEMINI_API_KEY", "secret")]).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.model, "models/gemini-1.5-flash");
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.port, 8000);
        assert_eq!(config.session_idle, Duration::from_secs(1800));
        assert!(config.gateway.is_none());
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("GEMINI_API_KEY"))));
        assert!(matches!(
            load(&[("GEMINI_API_KEY", "  ")]),
            Err(ConfigError::Missing(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("GEMINI_TEMPERATURE", "0.2"),
            ("LLM_GATEWAY", "http://gateway.local"),
            ("CHAT_PORT", "9090"),
            ("CHAT_SESSION_IDLE_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(config.model, "gemini-1.5-pro");
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.gateway.as_deref(), Some("http://gateway.local"));
        assert_eq!(config.port, 9090);
        assert_eq!(config.session_idle, Duration::from_secs(60));
    }

    #[test]
    fn test_session_idle_must_be_positive() {
        for raw in ["0", "-5", "soon"] {
            let err = load(&[("GEMINI_API_KEY", "k"), ("CHAT_SESSION_IDLE_SECS", raw)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { name: "CHAT_SESSION_IDLE_SECS", .. }));
        }
    }

    #[test]
    fn test_temperature_out_of_range() {
        let err = load(&[("GEMINI_API_KEY", "k"), ("GEMINI_TEMPERATURE", "1.5")]).unwrap_err();
        assert!(err.to_string().contains("between 0.0 and 1.0"));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = load(&[("GEMINI_API_KEY", "super-secret")]).unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}

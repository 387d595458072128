//! Environment-sourced configuration.
//!
//! Every analysis kind reads its endpoint and key from a pair of variables.
//! Values are looked up through a closure so tests never touch the process
//! environment.

use std::time::Duration;

use crate::error::{VisionError, VisionResult};

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which remote service a command talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Face,
    Vision,
}

impl ServiceKind {
    pub fn endpoint_var(&self) -> &'static str {
        match self {
            ServiceKind::Face => "FACE_ENDPOINT",
            ServiceKind::Vision => "VISION_ENDPOINT",
        }
    }

    pub fn key_var(&self) -> &'static str {
        match self {
            ServiceKind::Face => "FACE_KEY",
            ServiceKind::Vision => "VISION_KEY",
        }
    }
}

/// Endpoint and key for the face or image-analysis service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub endpoint: String,
    pub key: String,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env(kind: ServiceKind) -> VisionResult<Self> {
        Self::from_lookup(kind, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(kind: ServiceKind, lookup: F) -> VisionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut vars = required(&lookup, &[kind.endpoint_var(), kind.key_var()])?.into_iter();
        let endpoint = normalize_endpoint(&vars.next().unwrap_or_default());
        let key = vars.next().unwrap_or_default();

        Ok(Self {
            endpoint,
            key,
            timeout: timeout_from(&lookup)?,
        })
    }
}

/// Endpoint, key and project for the custom-vision training service.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub endpoint: String,
    pub key: String,
    pub project_id: String,
    pub timeout: Duration,
}

impl TrainingConfig {
    pub const ENDPOINT_VAR: &'static str = "TRAINING_ENDPOINT";
    pub const KEY_VAR: &'static str = "TRAINING_KEY";
    pub const PROJECT_VAR: &'static str = "TRAINING_PROJECT_ID";

    pub fn from_env() -> VisionResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> VisionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let values = required(
            &lookup,
            &[Self::ENDPOINT_VAR, Self::KEY_VAR, Self::PROJECT_VAR],
        )?;
        let [endpoint, key, project_id]: [String; 3] = values
            .try_into()
            .map_err(|_| VisionError::InvalidConfig("training settings".to_string()))?;

        Ok(Self {
            endpoint: normalize_endpoint(&endpoint),
            key,
            project_id,
            timeout: timeout_from(&lookup)?,
        })
    }
}

/// Reads every named variable, reporting all missing or empty ones at once.
fn required<F>(lookup: &F, names: &[&str]) -> VisionResult<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut values = Vec::with_capacity(names.len());
    let mut missing = Vec::new();

    for name in names {
        match lookup(name).map(|v| v.trim().to_string()) {
            Some(value) if !value.is_empty() => values.push(value),
            _ => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(values)
    } else {
        Err(VisionError::Config { missing })
    }
}

fn timeout_from<F>(lookup: &F) -> VisionResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("AZVISION_TIMEOUT_SECS") {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| VisionError::InvalidConfig(format!("AZVISION_TIMEOUT_SECS={raw}"))),
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_vision_config_from_lookup() {
        let config = ServiceConfig::from_lookup(
            ServiceKind::Vision,
            env(&[
                ("VISION_ENDPOINT", "https://example.cognitiveservices.azure.com/"),
                ("VISION_KEY", "secret"),
            ]),
        )
        .unwrap();

        assert_eq!(config.endpoint, "https://example.cognitiveservices.azure.com");
        assert_eq!(config.key, "secret");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let err = ServiceConfig::from_lookup(ServiceKind::Vision, env(&[("VISION_KEY", "k")]))
            .unwrap_err();
        match err {
            VisionError::Config { missing } => assert_eq!(missing, vec!["VISION_ENDPOINT"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = ServiceConfig::from_lookup(
            ServiceKind::Face,
            env(&[("FACE_ENDPOINT", "  "), ("FACE_KEY", "")]),
        )
        .unwrap_err();
        match err {
            VisionError::Config { missing } => {
                assert_eq!(missing, vec!["FACE_ENDPOINT", "FACE_KEY"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_training_config_requires_project() {
        let err = TrainingConfig::from_lookup(env(&[
            ("TRAINING_ENDPOINT", "https://train.example"),
            ("TRAINING_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, VisionError::Config { ref missing } if missing == &["TRAINING_PROJECT_ID"]));

        let config = TrainingConfig::from_lookup(env(&[
            ("TRAINING_ENDPOINT", "https://train.example"),
            ("TRAINING_KEY", "k"),
            ("TRAINING_PROJECT_ID", "p-1"),
            ("AZVISION_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.project_id, "p-1");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let err = ServiceConfig::from_lookup(
            ServiceKind::Face,
            env(&[
                ("FACE_ENDPOINT", "https://face.example"),
                ("FACE_KEY", "k"),
                ("AZVISION_TIMEOUT_SECS", "soon"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, VisionError::InvalidConfig(_)));
    }
}

//! Host-only options that ride along in the configuration JSON

use serde::Deserialize;
use tracing::Level;

use galaxy_render::GalaxyError;

#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawHostOptions {
    log_level: String,
}

impl Default for RawHostOptions {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Options consumed by the bindings rather than the renderer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostOptions {
    pub log_level: Level,
}

impl HostOptions {
    pub fn from_json(json: &str) -> Result<Self, GalaxyError> {
        let raw: RawHostOptions =
            serde_json::from_str(json).map_err(|e| GalaxyError::InvalidConfig(e.to_string()))?;
        let log_level = parse_level(&raw.log_level).ok_or_else(|| {
            GalaxyError::InvalidConfig(format!(
                "logLevel must be one of error, warn, info, debug, trace (got '{}')",
                raw.log_level
            ))
        })?;
        Ok(Self { log_level })
    }
}

fn parse_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_info() {
        let opts = HostOptions::from_json("{}").unwrap();
        assert_eq!(opts.log_level, Level::INFO);
    }

    #[test]
    fn test_level_alongside_render_options() {
        let opts = HostOptions::from_json(r#"{"density": 2, "logLevel": "Debug"}"#).unwrap();
        assert_eq!(opts.log_level, Level::DEBUG);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = HostOptions::from_json(r#"{"logLevel": "verbose"}"#).unwrap_err();
        assert!(matches!(err, GalaxyError::InvalidConfig(_)));
    }
}

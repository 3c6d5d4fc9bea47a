//! Client-wide configuration.

use gloam_interp::InterpConfig;
use gloam_protocol::DecoderConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::GloamError;

/// Everything a [`ClientContext`](crate::ClientContext) needs to start.
///
/// All fields have defaults, so a JSON document only has to name what it
/// changes:
///
/// ```
/// let cfg = gloam::ClientConfig::from_json(r#"{"player_name": "Alice"}"#).unwrap();
/// assert_eq!(cfg.message_log_capacity, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Name of the local player, used to find our own descriptor.
    pub player_name: Option<String>,
    /// Interpolation and cross-fade settings.
    pub interp: InterpConfig,
    /// How many recent messages the log keeps. Default: 5.
    pub message_log_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            player_name: None,
            interp: InterpConfig::default(),
            message_log_capacity: 5,
        }
    }
}

impl ClientConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, GloamError> {
        let cfg: Self = serde_json::from_str(json)?;
        Ok(cfg.validated())
    }

    /// Clamps out-of-range values. A zero log capacity becomes 1.
    pub fn validated(mut self) -> Self {
        if self.message_log_capacity == 0 {
            warn!("message_log_capacity is 0, clamping to 1");
            self.message_log_capacity = 1;
        }
        self.interp = self.interp.validated();
        self
    }

    /// The decoder settings derived from this config.
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            player_name: self.player_name.clone(),
        }
        .validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ClientConfig::default();
        assert!(cfg.player_name.is_none());
        assert!(cfg.interp.interpolate);
        assert_eq!(cfg.message_log_capacity, 5);
    }

    #[test]
    fn test_from_json_nested_interp() {
        let cfg = ClientConfig::from_json(
            r#"{"player_name": "Bob", "interp": {"interpolate": false, "cross_fade": true}}"#,
        )
        .unwrap();
        assert_eq!(cfg.player_name.as_deref(), Some("Bob"));
        assert!(!cfg.interp.interpolate);
        assert!(cfg.interp.cross_fade);
        assert_eq!(cfg.interp.default_interval_ms, 200);
    }

    #[test]
    fn test_from_json_clamps_capacity() {
        let cfg = ClientConfig::from_json(r#"{"message_log_capacity": 0}"#).unwrap();
        assert_eq!(cfg.message_log_capacity, 1);
    }

    #[test]
    fn test_from_json_rejects_bad_document() {
        let err = ClientConfig::from_json(r#"{"message_log_capacity": "lots"}"#).unwrap_err();
        assert!(matches!(err, GloamError::Config(_)));
    }

    #[test]
    fn test_decoder_config_drops_blank_name() {
        let cfg = ClientConfig {
            player_name: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.decoder_config().player_name, None);
    }
}

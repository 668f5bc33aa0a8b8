//! Forwarder configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which downstream sink receives parsed events.
///
/// `None` means no forwarder is configured and routing falls through to
/// the registered payment handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwarderMode {
    #[default]
    None,
    Rest,
    Websocket,
}

/// Forwarder configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderConfig {
    #[serde(default)]
    pub mode: ForwarderMode,

    /// Base URL of the downstream processor (REST mode)
    pub rest_base_url: Option<String>,

    /// Route appended to the base URL (REST mode)
    #[serde(default = "default_rest_route")]
    pub rest_route: String,

    /// WebSocket sink URL (websocket mode)
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
}

impl ForwarderConfig {
    /// Validate forwarder configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.mode {
            ForwarderMode::Rest => {
                let configured = self
                    .rest_base_url
                    .as_deref()
                    .is_some_and(|url| !url.trim().is_empty());
                if !configured {
                    return Err(ValidationError::MissingForwarderUrl("rest"));
                }
            }
            ForwarderMode::Websocket => {
                if self.websocket_url.trim().is_empty() {
                    return Err(ValidationError::MissingForwarderUrl("websocket"));
                }
            }
            ForwarderMode::None => {}
        }
        Ok(())
    }
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            mode: ForwarderMode::None,
            rest_base_url: None,
            rest_route: default_rest_route(),
            websocket_url: default_websocket_url(),
        }
    }
}

fn default_rest_route() -> String {
    "/creditor_api".to_string()
}

fn default_websocket_url() -> String {
    "ws://localhost:8765".to_string()
}

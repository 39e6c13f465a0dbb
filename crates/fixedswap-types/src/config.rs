//! Registry configuration.

use serde::{Deserialize, Serialize};

use crate::{FixedSwapError, Identity, Result, constants};

/// Configuration for one registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identity under which the registry pulls transfers. Exchange owners
    /// approve this identity on the base asset; swap callers approve it on
    /// the quote asset.
    pub spender: Identity,
    /// Deployment name, attached to log spans.
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_label() -> String {
    constants::DEFAULT_LABEL.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            spender: Identity(constants::DEFAULT_SPENDER),
            label: default_label(),
        }
    }
}

impl RegistryConfig {
    #[must_use]
    pub fn with_spender(spender: Identity) -> Self {
        Self {
            spender,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| FixedSwapError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spender.is_null() {
            return Err(FixedSwapError::Configuration(
                "spender must not be the null identity".into(),
            ));
        }
        if self.label.trim().is_empty() {
            return Err(FixedSwapError::Configuration("label must not be empty".into()));
        }
        Ok(())
    }
}

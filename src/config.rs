// SPDX-License-Identifier: MIT
//! Builder configuration

use serde::Deserialize;

use crate::header::ShowCommand;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Write the optional Unicode offsets in new LinkInfo sections
    pub unicode_link_info: bool,
    /// Show command for new headers
    pub show_command: ShowCommand,
    /// Hex-dump every assembled section at TRACE level
    pub trace_sections: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unicode_link_info: false,
            show_command: ShowCommand::Normal,
            trace_sections: false,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|s| match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

impl Config {
    /// Load from `LNK_*` environment variables, defaulting anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            unicode_link_info: env_flag("LNK_UNICODE_LINK_INFO")
                .unwrap_or(defaults.unicode_link_info),
            show_command: std::env::var("LNK_SHOW_COMMAND")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.show_command),
            trace_sections: env_flag("LNK_TRACE_SECTIONS").unwrap_or(defaults.trace_sections),
        }
    }

    /// Parse a TOML document; missing keys take their defaults
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(source: &str) -> Result<Self, String> {
        toml::from_str(source).map_err(|e| format!("Invalid configuration: {}", e))
    }
}

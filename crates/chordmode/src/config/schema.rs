//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key handling settings
    pub keys: KeysConfig,
    /// Keymap customizations
    pub keymap: KeymapConfig,
}

/// Key handling settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Characters that go straight to the host in normal mode
    pub pass_keys: String,
    /// Single-character translations for non-default keyboard layouts
    pub layout: BTreeMap<String, String>,
}

impl KeysConfig {
    /// Pass keys as individual key tokens.
    pub fn pass_key_tokens(&self) -> Vec<String> {
        self.pass_keys
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect()
    }
}

/// Keymap customization settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    /// Drop all default normal-mode bindings before applying custom ones
    pub unmap_all: bool,
    /// Normal-mode sequences to remove
    pub unmap: Vec<String>,
    /// Custom keybindings for normal mode
    pub normal: Vec<CustomKeyBinding>,
    /// Custom keybindings for visual mode
    pub visual: Vec<CustomKeyBinding>,
}

/// A custom keybinding definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomKeyBinding {
    /// Key sequence (e.g., "gg", "<c-d>", "g<left>")
    pub key: String,
    /// Command to run
    pub action: String,
    /// Optional description for help display
    pub description: Option<String>,
}

//! Keymap definitions for chordmode.

use crate::command::Command;
use crate::error::KeymapError;
use crate::keys::{format_key_sequence, parse_key_sequence, KeyMapping, MappingBuilder};

use super::{CustomKeyBinding, KeymapConfig};

/// One key sequence bound to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub keys: Vec<String>,
    pub command: Command,
    /// Overrides the command's own description in help listings
    pub description: Option<String>,
}

impl Binding {
    pub fn notation(&self) -> String {
        format_key_sequence(&self.keys)
    }

    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or_else(|| self.command.description())
    }
}

/// A keymap is an ordered collection of key sequences mapped to commands
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Add a binding, replacing any binding of the same sequence
    pub fn bind(&mut self, sequence: &str, command: Command) -> Result<(), KeymapError> {
        self.bind_described(sequence, command, None)
    }

    fn bind_described(
        &mut self,
        sequence: &str,
        command: Command,
        description: Option<String>,
    ) -> Result<(), KeymapError> {
        let keys = parse_key_sequence(sequence)?;
        let binding = Binding {
            keys,
            command,
            description,
        };
        match self.bindings.iter_mut().find(|b| b.keys == binding.keys) {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
        Ok(())
    }

    /// Remove a binding. Returns whether one was bound.
    pub fn unbind(&mut self, sequence: &str) -> Result<bool, KeymapError> {
        let keys = parse_key_sequence(sequence)?;
        let before = self.bindings.len();
        self.bindings.retain(|b| b.keys != keys);
        Ok(self.bindings.len() != before)
    }

    pub fn unbind_all(&mut self) {
        self.bindings.clear();
    }

    /// Look up the command bound to a sequence
    pub fn get(&self, sequence: &str) -> Option<Command> {
        let keys = parse_key_sequence(sequence).ok()?;
        self.bindings
            .iter()
            .find(|b| b.keys == keys)
            .map(|b| b.command)
    }

    /// Get all bindings, in binding order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Add configured bindings on top of the current ones
    pub fn apply(&mut self, custom: &[CustomKeyBinding]) -> Result<(), KeymapError> {
        for binding in custom {
            let command: Command = binding.action.parse()?;
            self.bind_described(&binding.key, command, binding.description.clone())?;
        }
        Ok(())
    }

    /// Build the mapping tree the interpreter walks.
    ///
    /// When one sequence is a prefix of another the shorter one wins.
    pub fn build(&self) -> Result<KeyMapping<Command>, KeymapError> {
        let mut builder = MappingBuilder::new();
        for binding in &self.bindings {
            builder.bind(binding.keys.iter().cloned(), binding.command)?;
        }
        Ok(builder.build())
    }

    /// `(sequence, description)` pairs for the help overlay
    pub fn help_lines(&self) -> Vec<(String, String)> {
        self.bindings
            .iter()
            .map(|b| (b.notation(), b.description().to_string()))
            .collect()
    }

    /// Normal-mode keymap with the configured changes applied
    pub fn normal_from(config: &KeymapConfig) -> Result<Self, KeymapError> {
        let mut km = Self::default_normal();
        if config.unmap_all {
            km.unbind_all();
        }
        for sequence in &config.unmap {
            if !km.unbind(sequence)? {
                tracing::debug!(sequence = %sequence, "unmap of unbound sequence");
            }
        }
        km.apply(&config.normal)?;
        Ok(km)
    }

    /// Visual-mode keymap with the configured changes applied
    pub fn visual_from(config: &KeymapConfig) -> Result<Self, KeymapError> {
        let mut km = Self::default_visual();
        km.apply(&config.visual)?;
        Ok(km)
    }

    /// Create the default normal-mode keymap
    pub fn default_normal() -> Self {
        Self::from_table(&[
            // Scrolling
            ("j", Command::ScrollDown),
            ("<c-e>", Command::ScrollDown),
            ("k", Command::ScrollUp),
            ("<c-y>", Command::ScrollUp),
            ("h", Command::ScrollLeft),
            ("l", Command::ScrollRight),
            ("gg", Command::ScrollToTop),
            ("G", Command::ScrollToBottom),
            ("zH", Command::ScrollToLeft),
            ("zL", Command::ScrollToRight),
            ("d", Command::ScrollPageDown),
            ("u", Command::ScrollPageUp),
            // Page
            ("r", Command::Reload),
            ("yy", Command::CopyCurrentUrl),
            ("p", Command::OpenCopiedUrlInCurrentTab),
            ("P", Command::OpenCopiedUrlInNewTab),
            ("gu", Command::GoUp),
            ("gU", Command::GoToRoot),
            ("[[", Command::GoPrevious),
            ("]]", Command::GoNext),
            ("gi", Command::FocusInput),
            ("gs", Command::ToggleViewSource),
            // Hints and marks
            ("f", Command::LinkHints),
            ("F", Command::LinkHintsNewTab),
            ("yf", Command::CopyLinkUrl),
            ("m", Command::CreateMark),
            ("`", Command::GotoMark),
            // Find
            ("/", Command::EnterFindMode),
            ("n", Command::PerformFind),
            ("N", Command::PerformBackwardsFind),
            // History
            ("H", Command::GoBack),
            ("L", Command::GoForward),
            // Tabs
            ("t", Command::CreateTab),
            ("gt", Command::NextTab),
            ("K", Command::NextTab),
            ("gT", Command::PreviousTab),
            ("J", Command::PreviousTab),
            ("g0", Command::FirstTab),
            ("g$", Command::LastTab),
            ("^", Command::VisitPreviousTab),
            ("yt", Command::DuplicateTab),
            ("<a-p>", Command::TogglePinTab),
            ("x", Command::RemoveTab),
            ("X", Command::RestoreTab),
            ("<<", Command::MoveTabLeft),
            (">>", Command::MoveTabRight),
            ("o", Command::OpenVomnibar),
            ("T", Command::SearchTabs),
            // Modes
            ("i", Command::EnterInsertMode),
            ("v", Command::EnterVisualMode),
            ("?", Command::ShowHelp),
        ])
    }

    /// Create the default visual-mode keymap
    pub fn default_visual() -> Self {
        Self::from_table(&[
            ("h", Command::MoveLeft),
            ("l", Command::MoveRight),
            ("k", Command::MoveUp),
            ("j", Command::MoveDown),
            ("w", Command::WordForward),
            ("b", Command::WordBackward),
            ("e", Command::WordEnd),
            ("0", Command::LineStart),
            ("$", Command::LineEnd),
            ("gg", Command::DocumentStart),
            ("G", Command::DocumentEnd),
            ("o", Command::ReverseSelection),
            ("y", Command::YankSelection),
            ("v", Command::ExitVisualMode),
        ])
    }

    fn from_table(table: &[(&str, Command)]) -> Self {
        let mut km = Self::new();
        for (sequence, command) in table {
            if let Err(err) = km.bind(sequence, *command) {
                tracing::error!(sequence, error = %err, "invalid default binding");
            }
        }
        km
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Node;

    #[test]
    fn test_keymap_bind_and_get() {
        let mut km = Keymap::new();
        km.bind("<c-d>", Command::ScrollPageDown).unwrap();
        assert_eq!(km.get("<C-d>"), Some(Command::ScrollPageDown));
        assert_eq!(km.get("<c-u>"), None);
    }

    #[test]
    fn test_default_normal_keymap() {
        let km = Keymap::default_normal();
        assert_eq!(km.get("j"), Some(Command::ScrollDown));
        assert_eq!(km.get("gg"), Some(Command::ScrollToTop));
        assert_eq!(km.get("g0"), Some(Command::FirstTab));
        assert_eq!(km.get("<<"), Some(Command::MoveTabLeft));
        assert_eq!(km.get("i"), Some(Command::EnterInsertMode));
        assert_eq!(km.get("?"), Some(Command::ShowHelp));
    }

    #[test]
    fn test_default_keymaps_have_no_conflicts() {
        for km in [Keymap::default_normal(), Keymap::default_visual()] {
            let mapping = km.build().unwrap();
            assert_eq!(mapping.len(), km.len());
        }
    }

    #[test]
    fn test_keymap_override() {
        let mut km = Keymap::default_normal();
        let before = km.len();

        km.bind("j", Command::ScrollPageDown).unwrap();
        assert_eq!(km.get("j"), Some(Command::ScrollPageDown));
        assert_eq!(km.len(), before);
    }

    #[test]
    fn test_keymap_unbind() {
        let mut km = Keymap::default_normal();
        assert!(km.get("x").is_some());

        assert!(km.unbind("x").unwrap());
        assert!(km.get("x").is_none());
        assert!(!km.unbind("x").unwrap());
    }

    #[test]
    fn test_apply_custom_bindings() {
        let mut km = Keymap::new();
        km.apply(&[CustomKeyBinding {
            key: "<c-f>".into(),
            action: "scrollFullPageDown".into(),
            description: Some("Page down".into()),
        }])
        .unwrap();

        assert_eq!(km.get("<c-f>"), Some(Command::ScrollFullPageDown));
        assert_eq!(
            km.help_lines(),
            vec![("<c-f>".to_string(), "Page down".to_string())]
        );
    }

    #[test]
    fn test_apply_rejects_unknown_command() {
        let mut km = Keymap::new();
        let err = km
            .apply(&[CustomKeyBinding {
                key: "q".into(),
                action: "save_query".into(),
                description: None,
            }])
            .unwrap_err();
        assert_eq!(err, KeymapError::UnknownCommand("save_query".into()));
    }

    #[test]
    fn test_build_shorter_sequence_wins() {
        let mut km = Keymap::new();
        km.bind("gg", Command::ScrollToTop).unwrap();
        km.bind("g", Command::GoBack).unwrap();
        let mapping = km.build().unwrap();

        assert!(matches!(mapping.lookup(&["g"]), Some(Node::Leaf(Command::GoBack))));
        assert!(mapping.lookup(&["g", "g"]).is_none());
    }

    #[test]
    fn test_normal_from_config() {
        let config = KeymapConfig {
            unmap: vec!["x".into(), "zz".into()],
            normal: vec![CustomKeyBinding {
                key: "x".into(),
                action: "pass_next_key".into(),
                description: None,
            }],
            ..Default::default()
        };
        let km = Keymap::normal_from(&config).unwrap();
        assert_eq!(km.get("x"), Some(Command::PassNextKey));
        assert_eq!(km.get("j"), Some(Command::ScrollDown));

        let config = KeymapConfig {
            unmap_all: true,
            ..Default::default()
        };
        assert!(Keymap::normal_from(&config).unwrap().is_empty());
    }

    #[test]
    fn test_help_lines_use_command_descriptions() {
        let km = Keymap::default_visual();
        let lines = km.help_lines();
        assert!(lines.contains(&("y".to_string(), Command::YankSelection.description().to_string())));
        assert!(lines.contains(&("gg".to_string(), "Extend selection to the start of the document".to_string())));
    }
}

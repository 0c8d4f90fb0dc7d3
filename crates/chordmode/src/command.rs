//! Commands that keymaps bind to.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::KeymapError;

/// All commands a key sequence can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    // Scrolling
    ScrollDown,
    ScrollUp,
    ScrollLeft,
    ScrollRight,
    ScrollToTop,
    ScrollToBottom,
    ScrollToLeft,
    ScrollToRight,
    ScrollPageDown,
    ScrollPageUp,
    ScrollFullPageDown,
    ScrollFullPageUp,

    // Page
    Reload,
    CopyCurrentUrl,
    OpenCopiedUrlInCurrentTab,
    OpenCopiedUrlInNewTab,
    GoUp,
    GoToRoot,
    GoPrevious,
    GoNext,
    FocusInput,
    ToggleViewSource,

    // Hints and marks
    LinkHints,
    LinkHintsNewTab,
    CopyLinkUrl,
    CreateMark,
    GotoMark,

    // Find
    EnterFindMode,
    PerformFind,
    PerformBackwardsFind,

    // History
    GoBack,
    GoForward,

    // Tabs
    CreateTab,
    NextTab,
    PreviousTab,
    FirstTab,
    LastTab,
    VisitPreviousTab,
    DuplicateTab,
    TogglePinTab,
    RemoveTab,
    RestoreTab,
    MoveTabLeft,
    MoveTabRight,
    OpenVomnibar,
    SearchTabs,

    // Modes
    EnterInsertMode,
    EnterVisualMode,
    PassNextKey,
    ShowHelp,

    // Visual mode
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    WordForward,
    WordBackward,
    WordEnd,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    ReverseSelection,
    YankSelection,
    ExitVisualMode,
}

impl Command {
    pub const ALL: &'static [Command] = &[
        Command::ScrollDown,
        Command::ScrollUp,
        Command::ScrollLeft,
        Command::ScrollRight,
        Command::ScrollToTop,
        Command::ScrollToBottom,
        Command::ScrollToLeft,
        Command::ScrollToRight,
        Command::ScrollPageDown,
        Command::ScrollPageUp,
        Command::ScrollFullPageDown,
        Command::ScrollFullPageUp,
        Command::Reload,
        Command::CopyCurrentUrl,
        Command::OpenCopiedUrlInCurrentTab,
        Command::OpenCopiedUrlInNewTab,
        Command::GoUp,
        Command::GoToRoot,
        Command::GoPrevious,
        Command::GoNext,
        Command::FocusInput,
        Command::ToggleViewSource,
        Command::LinkHints,
        Command::LinkHintsNewTab,
        Command::CopyLinkUrl,
        Command::CreateMark,
        Command::GotoMark,
        Command::EnterFindMode,
        Command::PerformFind,
        Command::PerformBackwardsFind,
        Command::GoBack,
        Command::GoForward,
        Command::CreateTab,
        Command::NextTab,
        Command::PreviousTab,
        Command::FirstTab,
        Command::LastTab,
        Command::VisitPreviousTab,
        Command::DuplicateTab,
        Command::TogglePinTab,
        Command::RemoveTab,
        Command::RestoreTab,
        Command::MoveTabLeft,
        Command::MoveTabRight,
        Command::OpenVomnibar,
        Command::SearchTabs,
        Command::EnterInsertMode,
        Command::EnterVisualMode,
        Command::PassNextKey,
        Command::ShowHelp,
        Command::MoveLeft,
        Command::MoveRight,
        Command::MoveUp,
        Command::MoveDown,
        Command::WordForward,
        Command::WordBackward,
        Command::WordEnd,
        Command::LineStart,
        Command::LineEnd,
        Command::DocumentStart,
        Command::DocumentEnd,
        Command::ReverseSelection,
        Command::YankSelection,
        Command::ExitVisualMode,
    ];

    /// Config name, as accepted in keymap files.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ScrollDown => "scroll_down",
            Command::ScrollUp => "scroll_up",
            Command::ScrollLeft => "scroll_left",
            Command::ScrollRight => "scroll_right",
            Command::ScrollToTop => "scroll_to_top",
            Command::ScrollToBottom => "scroll_to_bottom",
            Command::ScrollToLeft => "scroll_to_left",
            Command::ScrollToRight => "scroll_to_right",
            Command::ScrollPageDown => "scroll_page_down",
            Command::ScrollPageUp => "scroll_page_up",
            Command::ScrollFullPageDown => "scroll_full_page_down",
            Command::ScrollFullPageUp => "scroll_full_page_up",
            Command::Reload => "reload",
            Command::CopyCurrentUrl => "copy_current_url",
            Command::OpenCopiedUrlInCurrentTab => "open_copied_url_in_current_tab",
            Command::OpenCopiedUrlInNewTab => "open_copied_url_in_new_tab",
            Command::GoUp => "go_up",
            Command::GoToRoot => "go_to_root",
            Command::GoPrevious => "go_previous",
            Command::GoNext => "go_next",
            Command::FocusInput => "focus_input",
            Command::ToggleViewSource => "toggle_view_source",
            Command::LinkHints => "link_hints",
            Command::LinkHintsNewTab => "link_hints_new_tab",
            Command::CopyLinkUrl => "copy_link_url",
            Command::CreateMark => "create_mark",
            Command::GotoMark => "goto_mark",
            Command::EnterFindMode => "enter_find_mode",
            Command::PerformFind => "perform_find",
            Command::PerformBackwardsFind => "perform_backwards_find",
            Command::GoBack => "go_back",
            Command::GoForward => "go_forward",
            Command::CreateTab => "create_tab",
            Command::NextTab => "next_tab",
            Command::PreviousTab => "previous_tab",
            Command::FirstTab => "first_tab",
            Command::LastTab => "last_tab",
            Command::VisitPreviousTab => "visit_previous_tab",
            Command::DuplicateTab => "duplicate_tab",
            Command::TogglePinTab => "toggle_pin_tab",
            Command::RemoveTab => "remove_tab",
            Command::RestoreTab => "restore_tab",
            Command::MoveTabLeft => "move_tab_left",
            Command::MoveTabRight => "move_tab_right",
            Command::OpenVomnibar => "open_vomnibar",
            Command::SearchTabs => "search_tabs",
            Command::EnterInsertMode => "enter_insert_mode",
            Command::EnterVisualMode => "enter_visual_mode",
            Command::PassNextKey => "pass_next_key",
            Command::ShowHelp => "show_help",
            Command::MoveLeft => "move_left",
            Command::MoveRight => "move_right",
            Command::MoveUp => "move_up",
            Command::MoveDown => "move_down",
            Command::WordForward => "word_forward",
            Command::WordBackward => "word_backward",
            Command::WordEnd => "word_end",
            Command::LineStart => "line_start",
            Command::LineEnd => "line_end",
            Command::DocumentStart => "document_start",
            Command::DocumentEnd => "document_end",
            Command::ReverseSelection => "reverse_selection",
            Command::YankSelection => "yank_selection",
            Command::ExitVisualMode => "exit_visual_mode",
        }
    }

    /// Get the default description for this command
    pub fn description(&self) -> &'static str {
        match self {
            Command::ScrollDown => "Scroll down",
            Command::ScrollUp => "Scroll up",
            Command::ScrollLeft => "Scroll left",
            Command::ScrollRight => "Scroll right",
            Command::ScrollToTop => "Scroll to the top of the page",
            Command::ScrollToBottom => "Scroll to the bottom of the page",
            Command::ScrollToLeft => "Scroll all the way to the left",
            Command::ScrollToRight => "Scroll all the way to the right",
            Command::ScrollPageDown => "Scroll a half page down",
            Command::ScrollPageUp => "Scroll a half page up",
            Command::ScrollFullPageDown => "Scroll a full page down",
            Command::ScrollFullPageUp => "Scroll a full page up",
            Command::Reload => "Reload the page",
            Command::CopyCurrentUrl => "Copy the current URL to the clipboard",
            Command::OpenCopiedUrlInCurrentTab => "Open the clipboard's URL in the current tab",
            Command::OpenCopiedUrlInNewTab => "Open the clipboard's URL in a new tab",
            Command::GoUp => "Go up the URL hierarchy",
            Command::GoToRoot => "Go to the root of the URL hierarchy",
            Command::GoPrevious => "Follow the link labeled previous",
            Command::GoNext => "Follow the link labeled next",
            Command::FocusInput => "Focus the first text input on the page",
            Command::ToggleViewSource => "View page source",
            Command::LinkHints => "Open a link in the current tab",
            Command::LinkHintsNewTab => "Open a link in a new tab",
            Command::CopyLinkUrl => "Copy a link URL to the clipboard",
            Command::CreateMark => "Create a new mark",
            Command::GotoMark => "Go to a mark",
            Command::EnterFindMode => "Enter find mode",
            Command::PerformFind => "Cycle forward to the next find match",
            Command::PerformBackwardsFind => "Cycle backward to the previous find match",
            Command::GoBack => "Go back in history",
            Command::GoForward => "Go forward in history",
            Command::CreateTab => "Create new tab",
            Command::NextTab => "Go one tab right",
            Command::PreviousTab => "Go one tab left",
            Command::FirstTab => "Go to the first tab",
            Command::LastTab => "Go to the last tab",
            Command::VisitPreviousTab => "Go to previously-visited tab",
            Command::DuplicateTab => "Duplicate current tab",
            Command::TogglePinTab => "Pin or unpin current tab",
            Command::RemoveTab => "Close current tab",
            Command::RestoreTab => "Restore closed tab",
            Command::MoveTabLeft => "Move tab to the left",
            Command::MoveTabRight => "Move tab to the right",
            Command::OpenVomnibar => "Open URL, bookmark or history entry",
            Command::SearchTabs => "Search through your open tabs",
            Command::EnterInsertMode => "Enter insert mode",
            Command::EnterVisualMode => "Enter visual mode",
            Command::PassNextKey => "Pass the next key to the page",
            Command::ShowHelp => "Show help",
            Command::MoveLeft => "Extend selection left",
            Command::MoveRight => "Extend selection right",
            Command::MoveUp => "Extend selection up a line",
            Command::MoveDown => "Extend selection down a line",
            Command::WordForward => "Extend selection to the next word",
            Command::WordBackward => "Extend selection to the previous word",
            Command::WordEnd => "Extend selection to the end of the word",
            Command::LineStart => "Extend selection to the start of the line",
            Command::LineEnd => "Extend selection to the end of the line",
            Command::DocumentStart => "Extend selection to the start of the document",
            Command::DocumentEnd => "Extend selection to the end of the document",
            Command::ReverseSelection => "Swap the selection anchor and focus",
            Command::YankSelection => "Copy the selection and leave visual mode",
            Command::ExitVisualMode => "Leave visual mode",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = KeymapError;

    /// Accepts `snake_case`, `kebab-case` and `camelCase`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s.trim());
        let normalized = match normalized.as_str() {
            // Older names for renamed commands
            "link_hints.activate_mode" => "link_hints",
            "link_hints.activate_mode_to_open_in_new_tab" => "link_hints_new_tab",
            "link_hints.activate_mode_to_copy_link_url" => "copy_link_url",
            "marks.activate_create_mode" => "create_mark",
            "marks.activate_goto_mode" => "goto_mark",
            "vomnibar.activate" => "open_vomnibar",
            "vomnibar.activate_tab_selection" => "search_tabs",
            "remove_tab" | "close_tab" => "remove_tab",
            other => other,
        };

        Command::ALL
            .iter()
            .copied()
            .find(|command| command.name() == normalized)
            .ok_or_else(|| KeymapError::UnknownCommand(s.to_string()))
    }
}

/// Lowercases and turns `-` and camelCase word breaks into `_`.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        match c {
            '-' => out.push('_'),
            c => out.push(c.to_ascii_lowercase()),
        }
    }
    out
}

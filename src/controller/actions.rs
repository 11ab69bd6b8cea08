//! Editor actions, their view names and keyboard bindings.

use egui::{Key, Modifiers};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Everything the controller can be asked to do to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Toggle strong emphasis (Ctrl+B)
    Bold,
    /// Toggle emphasis (Ctrl+I)
    Italic,
    /// Toggle strikethrough
    Strikethrough,
    /// Step the heading level (Ctrl+H)
    Heading,
    /// Ask for a URL and insert a link (Ctrl+L)
    Link,
    /// Ask for attachment markup and insert it (Ctrl+G)
    Attachment,
    /// Wrap in a code fence (Ctrl+K)
    Code,
    /// Insert a horizontal rule (Ctrl+D)
    HorizontalRule,
    /// Toggle a bullet list (Ctrl+U)
    List,
    /// Toggle a numbered list (Ctrl+O)
    NumberedList,
    Undo,
    Redo,
    /// Line break with list continuation (Enter)
    NewLine,
}

impl Action {
    /// Actions a view toolbar can trigger by name.
    pub const VIEW_ACTIONS: [Action; 12] = [
        Action::Bold,
        Action::Italic,
        Action::Strikethrough,
        Action::Heading,
        Action::Link,
        Action::Attachment,
        Action::Code,
        Action::HorizontalRule,
        Action::List,
        Action::NumberedList,
        Action::Undo,
        Action::Redo,
    ];

    /// Name used by views and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Bold => "bold",
            Action::Italic => "italic",
            Action::Strikethrough => "strikethrough",
            Action::Heading => "heading",
            Action::Link => "link",
            Action::Attachment => "attachment",
            Action::Code => "code",
            Action::HorizontalRule => "hr",
            Action::List => "list",
            Action::NumberedList => "numberedList",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::NewLine => "newline",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::VIEW_ACTIONS
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| Error::Application(format!("Unknown editor action: {}", s)))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Keymap
// ─────────────────────────────────────────────────────────────────────────────

/// Map a key press to an action.
///
/// Formatting shortcuts take Ctrl, or Cmd on macOS, without Alt. A bare
/// Enter continues lists.
pub fn action_for_key(key: Key, modifiers: Modifiers) -> Option<Action> {
    if key == Key::Enter && modifiers.is_none() {
        return Some(Action::NewLine);
    }
    let command = modifiers.ctrl || modifiers.mac_cmd || modifiers.command;
    if !command || modifiers.alt || modifiers.shift {
        return None;
    }

    match key {
        Key::B => Some(Action::Bold),
        Key::I => Some(Action::Italic),
        Key::H => Some(Action::Heading),
        Key::L => Some(Action::Link),
        Key::K => Some(Action::Code),
        Key::O => Some(Action::NumberedList),
        Key::U => Some(Action::List),
        Key::G => Some(Action::Attachment),
        Key::D => Some(Action::HorizontalRule),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_names_round_trip() {
        for action in Action::VIEW_ACTIONS {
            assert_eq!(action.name().parse::<Action>().unwrap(), action);
        }
        assert_eq!("numberedList".parse::<Action>().unwrap(), Action::NumberedList);
        assert_eq!("hr".parse::<Action>().unwrap(), Action::HorizontalRule);
    }

    #[test]
    fn test_unknown_name_is_error() {
        assert!("explode".parse::<Action>().is_err());
        assert!("newline".parse::<Action>().is_err());
    }

    #[test]
    fn test_ctrl_and_cmd_bindings() {
        assert_eq!(action_for_key(Key::B, Modifiers::CTRL), Some(Action::Bold));
        assert_eq!(action_for_key(Key::I, Modifiers::MAC_CMD), Some(Action::Italic));
        assert_eq!(action_for_key(Key::O, Modifiers::COMMAND), Some(Action::NumberedList));
        assert_eq!(action_for_key(Key::D, Modifiers::CTRL), Some(Action::HorizontalRule));
        assert_eq!(action_for_key(Key::G, Modifiers::CTRL), Some(Action::Attachment));
    }

    #[test]
    fn test_unbound_combinations() {
        assert_eq!(action_for_key(Key::B, Modifiers::NONE), None);
        assert_eq!(action_for_key(Key::B, Modifiers::CTRL | Modifiers::ALT), None);
        assert_eq!(action_for_key(Key::Z, Modifiers::CTRL), None);
    }

    #[test]
    fn test_enter_continues_lists() {
        assert_eq!(action_for_key(Key::Enter, Modifiers::NONE), Some(Action::NewLine));
        assert_eq!(action_for_key(Key::Enter, Modifiers::SHIFT), None);
    }
}

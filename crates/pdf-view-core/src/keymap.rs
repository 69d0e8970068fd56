//! Mapping from raw keyboard and wheel input to view actions

use std::fmt;
use std::str::FromStr;

/// Something the user asked the view to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    PreviousPage,
    NextPage,
    FirstPage,
    LastPage,
    ZoomIn,
    ZoomOut,
    FitToWidth,
    ToggleFullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }

    /// The action bound to this key press, if any
    pub fn action(self) -> Option<ViewAction> {
        match (self.key, self.ctrl) {
            (Key::ArrowLeft, false) => Some(ViewAction::PreviousPage),
            (Key::ArrowRight, false) => Some(ViewAction::NextPage),
            (Key::Home, false) => Some(ViewAction::FirstPage),
            (Key::End, false) => Some(ViewAction::LastPage),
            // '=' shares a key with '+' on most layouts
            (Key::Char('+' | '='), true) => Some(ViewAction::ZoomIn),
            (Key::Char('-'), true) => Some(ViewAction::ZoomOut),
            (Key::Char('0'), true) => Some(ViewAction::FitToWidth),
            (Key::Char('f' | 'F'), false) => Some(ViewAction::ToggleFullscreen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeyError(String);

impl fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized key: {:?}", self.0)
    }
}

impl std::error::Error for ParseKeyError {}

impl FromStr for KeyPress {
    type Err = ParseKeyError;

    /// Parses names like `Right`, `Home`, `Ctrl++`, `ctrl+0` or `f`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (ctrl, name) = match trimmed.get(..5) {
            Some(prefix) if prefix.eq_ignore_ascii_case("ctrl+") && trimmed.len() > 5 => {
                (true, &trimmed[5..])
            }
            _ => (false, trimmed),
        };

        let key = match name.to_ascii_lowercase().as_str() {
            "left" | "arrowleft" => Key::ArrowLeft,
            "right" | "arrowright" => Key::ArrowRight,
            "home" => Key::Home,
            "end" => Key::End,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return Err(ParseKeyError(s.to_string())),
                }
            }
        };

        Ok(Self { key, ctrl })
    }
}

/// Mouse wheel movement; negative `delta_y` scrolls up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta_y: f32,
    pub ctrl: bool,
}

impl WheelInput {
    /// Ctrl+wheel zooms; unmodified wheel input scrolls and is left to the UI
    pub fn action(self) -> Option<ViewAction> {
        if !self.ctrl || self.delta_y == 0.0 || self.delta_y.is_nan() {
            return None;
        }
        if self.delta_y < 0.0 {
            Some(ViewAction::ZoomIn)
        } else {
            Some(ViewAction::ZoomOut)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        assert_eq!(
            KeyPress::plain(Key::ArrowLeft).action(),
            Some(ViewAction::PreviousPage)
        );
        assert_eq!(
            KeyPress::plain(Key::ArrowRight).action(),
            Some(ViewAction::NextPage)
        );
        assert_eq!(KeyPress::plain(Key::Home).action(), Some(ViewAction::FirstPage));
        assert_eq!(KeyPress::plain(Key::End).action(), Some(ViewAction::LastPage));
        assert_eq!(
            KeyPress::ctrl(Key::Char('+')).action(),
            Some(ViewAction::ZoomIn)
        );
        assert_eq!(
            KeyPress::ctrl(Key::Char('-')).action(),
            Some(ViewAction::ZoomOut)
        );
        assert_eq!(
            KeyPress::ctrl(Key::Char('0')).action(),
            Some(ViewAction::FitToWidth)
        );
        assert_eq!(
            KeyPress::plain(Key::Char('f')).action(),
            Some(ViewAction::ToggleFullscreen)
        );
    }

    #[test]
    fn test_modifier_matters() {
        assert_eq!(KeyPress::plain(Key::Char('+')).action(), None);
        assert_eq!(KeyPress::plain(Key::Char('0')).action(), None);
        assert_eq!(KeyPress::ctrl(Key::ArrowRight).action(), None);
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!("Right".parse(), Ok(KeyPress::plain(Key::ArrowRight)));
        assert_eq!("arrowleft".parse(), Ok(KeyPress::plain(Key::ArrowLeft)));
        assert_eq!("Ctrl++".parse(), Ok(KeyPress::ctrl(Key::Char('+'))));
        assert_eq!("ctrl+0".parse(), Ok(KeyPress::ctrl(Key::Char('0'))));
        assert_eq!("CTRL+-".parse(), Ok(KeyPress::ctrl(Key::Char('-'))));
        assert_eq!("f".parse(), Ok(KeyPress::plain(Key::Char('f'))));
        assert!("PageDown".parse::<KeyPress>().is_err());
        assert!("".parse::<KeyPress>().is_err());
    }

    #[test]
    fn test_wheel_needs_ctrl() {
        let up = WheelInput {
            delta_y: -120.0,
            ctrl: true,
        };
        let down = WheelInput {
            delta_y: 120.0,
            ctrl: true,
        };
        assert_eq!(up.action(), Some(ViewAction::ZoomIn));
        assert_eq!(down.action(), Some(ViewAction::ZoomOut));
        assert_eq!(WheelInput { ctrl: false, ..up }.action(), None);
    }
}

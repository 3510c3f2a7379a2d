/// Toggle controls: where they go and what they show
use crate::countdown::format_countdown;
use crate::page::Anchor;
use crate::prefs::Theme;

pub const SHOW_LABEL: &str = "Show Hidden Content";
pub const HIDE_LABEL: &str = "Hide Content";
pub const HIDDEN_STATUS: &str = "You are escaping the algorithm 😎";
pub const REVEALED_STATUS: &str = "Don't get sucked in 😱";

/// Where a control is inserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// In flow, directly before the first element of the group
    BeforeFirstMatch,
    /// Fixed near the top of the viewport
    Floating,
    /// In flow, after the anchor's container; floating when the anchor is absent
    After(Anchor),
}

impl Placement {
    pub fn is_floating(&self) -> bool {
        matches!(self, Placement::Floating)
    }
}

/// A toggle control shared by every group that names the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub key: &'static str,
    pub placement: Placement,
}

impl Control {
    pub const fn new(key: &'static str, placement: Placement) -> Control {
        Control { key, placement }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
}

impl Palette {
    pub const DARK: Palette = Palette {
        background: "rgba(26, 26, 46, 0.9)",
        text: "#e0e0e0",
        accent: "#e94560",
    };

    pub const LIGHT: Palette = Palette {
        background: "rgba(255, 255, 255, 0.9)",
        text: "#333333",
        accent: "#e94560",
    };

    pub fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Dark => Palette::DARK,
            Theme::Light => Palette::LIGHT,
        }
    }
}

/// Everything a control displays for the current state
#[derive(Debug, Clone, PartialEq)]
pub struct ControlView {
    pub label: &'static str,
    pub status: &'static str,
    pub countdown: String,
    pub countdown_visible: bool,
    pub palette: Palette,
}

impl ControlView {
    pub fn new(hidden: bool, remaining_seconds: u32, palette: Palette) -> ControlView {
        ControlView {
            label: if hidden { SHOW_LABEL } else { HIDE_LABEL },
            status: if hidden { HIDDEN_STATUS } else { REVEALED_STATUS },
            countdown: format_countdown(remaining_seconds),
            countdown_visible: !hidden,
            palette,
        }
    }
}

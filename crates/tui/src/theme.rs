//! Light and dark palettes keyed by the host color scheme.
//!
//! The dark palette is Nord's Polar Night; the light palette inverts it onto
//! Snow Storm surfaces with deeper accents for contrast.

use std::fmt::Debug;

use ratatui::style::{Color, Modifier, Style};

/// Semantic color roles used throughout the UI.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    pub background: Color,
    pub border: Color,
    pub focus: Color,

    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    pub accent_primary: Color,

    pub info: Color,
    pub success: Color,
    pub error: Color,
}

/// Theme trait exposes semantic roles and common style builders.
pub trait Theme: Send + Sync + Debug {
    fn roles(&self) -> &ThemeRoles;

    fn base_style(&self) -> Style {
        Style::default().fg(self.roles().text).bg(self.roles().background)
    }
    fn text_primary_style(&self) -> Style {
        Style::default().fg(self.roles().text)
    }
    fn text_secondary_style(&self) -> Style {
        Style::default().fg(self.roles().text_secondary)
    }
    fn text_muted_style(&self) -> Style {
        Style::default().fg(self.roles().text_muted)
    }

    fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.roles().focus } else { self.roles().border };
        Style::default().fg(color)
    }

    fn status_info(&self) -> Style {
        Style::default().fg(self.roles().info)
    }
    fn status_success(&self) -> Style {
        Style::default().fg(self.roles().success)
    }
    fn status_error(&self) -> Style {
        Style::default().fg(self.roles().error)
    }

    fn accent_emphasis_style(&self) -> Style {
        Style::default().fg(self.roles().accent_primary).add_modifier(Modifier::BOLD)
    }
}

// Polar Night
const N0: Color = Color::Rgb(0x2E, 0x34, 0x40);
const N1: Color = Color::Rgb(0x3B, 0x42, 0x52);
const N3: Color = Color::Rgb(0x4C, 0x56, 0x6A);
// Snow Storm
const S0: Color = Color::Rgb(0xD8, 0xDE, 0xE9);
const S1: Color = Color::Rgb(0xE5, 0xE9, 0xF0);
const S2: Color = Color::Rgb(0xEC, 0xEF, 0xF4);
// Frost
const F1: Color = Color::Rgb(0x88, 0xC0, 0xD0);
const F2: Color = Color::Rgb(0x81, 0xA1, 0xC1);
const F3: Color = Color::Rgb(0x5E, 0x81, 0xAC);
// Aurora
const A_RED: Color = Color::Rgb(0xBF, 0x61, 0x6A);
const A_GREEN: Color = Color::Rgb(0xA3, 0xBE, 0x8C);
const A_GREEN_DEEP: Color = Color::Rgb(0x4F, 0x7A, 0x3A);
const A_RED_DEEP: Color = Color::Rgb(0x9E, 0x3B, 0x45);
const TEXT_MUTED_DARK: Color = Color::Rgb(0x61, 0x6E, 0x88);

#[derive(Debug)]
pub struct DarkTheme {
    roles: ThemeRoles,
}

impl Theme for DarkTheme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}

#[derive(Debug)]
pub struct LightTheme {
    roles: ThemeRoles,
}

impl Theme for LightTheme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}

static DARK: DarkTheme = DarkTheme {
    roles: ThemeRoles {
        background: N0,
        border: N3,
        focus: F1,
        text: S0,
        text_secondary: S1,
        text_muted: TEXT_MUTED_DARK,
        accent_primary: F1,
        info: F2,
        success: A_GREEN,
        error: A_RED,
    },
};

static LIGHT: LightTheme = LightTheme {
    roles: ThemeRoles {
        background: S2,
        border: S0,
        focus: F3,
        text: N0,
        text_secondary: N1,
        text_muted: N3,
        accent_primary: F3,
        info: F3,
        success: A_GREEN_DEEP,
        error: A_RED_DEEP,
    },
};

/// Palette for the current value of the theme flag.
pub fn theme_for(dark: bool) -> &'static dyn Theme {
    if dark { &DARK } else { &LIGHT }
}

//! Theme handling for chart styling.
//!
//! A theme is a binary light/dark mode plus the set of color tokens charts
//! use for ticks, legends, and grid lines in that mode. Series accents are
//! not part of the palette; they belong to the individual series.

/// Light or dark rendering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    /// Parses a persisted theme flag. Anything other than `"dark"` is light.
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("dark") {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, ThemeMode::Dark)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// The color tokens charts should render with in this mode.
    pub fn palette(self) -> Palette {
        match self {
            ThemeMode::Light => LIGHT,
            ThemeMode::Dark => DARK,
        }
    }
}

/// Chart color tokens for one theme mode.
///
/// Tokens are `#rrggbb` or `#rrggbbaa` hex strings; grid lines use the
/// alpha forms so they stay faint against either surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Chart background.
    pub surface: &'static str,
    /// Axis tick labels.
    pub tick: &'static str,
    /// Legend and caption text.
    pub legend: &'static str,
    /// Horizontal (value-axis) grid lines.
    pub grid_y: &'static str,
    /// Vertical (day-axis) grid lines.
    pub grid_x: &'static str,
}

const LIGHT: Palette = Palette {
    surface: "#ffffff",
    tick: "#374151",
    legend: "#374151",
    grid_y: "#00000011",
    grid_x: "#00000008",
};

const DARK: Palette = Palette {
    surface: "#111827",
    tick: "#d1d5db",
    legend: "#d1d5db",
    grid_y: "#37415122",
    grid_x: "#37415111",
};

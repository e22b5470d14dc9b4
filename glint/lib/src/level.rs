use std::fmt;

use serde::{Deserialize, Serialize};

/// How many colors a terminal can display.
///
/// Variants are ranked by richness, so comparisons such as
/// `level >= ColorLevel::Basic` read as "supports at least 16 colors".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ColorLevel {
    /// no color support
    #[default]
    None = 0,
    /// 16 colors (8 normal plus "bright" variants)
    Basic = 1,
    /// 256 color palette (8 bit)
    Extended = 2,
    /// 16 million colors (24 bit)
    TrueColor = 3,
}

impl ColorLevel {
    /// Every level, from poorest to richest.
    pub const ALL: [ColorLevel; 4] = [
        ColorLevel::None,
        ColorLevel::Basic,
        ColorLevel::Extended,
        ColorLevel::TrueColor,
    ];

    /// A human-readable description of the level.
    ///
    /// ## Examples
    ///
    /// ```
    /// use glint::ColorLevel;
    ///
    /// assert_eq!(
    ///     ColorLevel::Extended.description(),
    ///     "Extended color support (256 colors)"
    /// );
    /// ```
    pub const fn description(self) -> &'static str {
        match self {
            ColorLevel::None => "No color support",
            ColorLevel::Basic => "Basic ANSI color support (16 colors)",
            ColorLevel::Extended => "Extended color support (256 colors)",
            ColorLevel::TrueColor => "24-bit RGB color support (16,777,216 colors)",
        }
    }

    /// The number of distinct colors the level can display.
    pub const fn colors(self) -> u32 {
        match self {
            ColorLevel::None => 0,
            ColorLevel::Basic => 16,
            ColorLevel::Extended => 256,
            ColorLevel::TrueColor => 16_777_216,
        }
    }

    /// Whether any color escape codes may be emitted at this level.
    #[inline]
    pub const fn has_color(self) -> bool {
        !matches!(self, ColorLevel::None)
    }
}

impl fmt::Display for ColorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

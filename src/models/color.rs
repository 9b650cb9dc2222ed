use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The fixed palette shared by project types and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "#EF4444", alias = "#ef4444")]
    Red,
    #[serde(rename = "#F59E0B", alias = "#f59e0b")]
    Orange,
    #[serde(rename = "#EAB308", alias = "#eab308")]
    Yellow,
    #[serde(rename = "#10B981", alias = "#10b981")]
    Green,
    #[serde(rename = "#3B82F6", alias = "#3b82f6")]
    Blue,
    #[serde(rename = "#6366F1", alias = "#6366f1")]
    Indigo,
    #[serde(rename = "#8B5CF6", alias = "#8b5cf6")]
    Purple,
    #[serde(rename = "#EC4899", alias = "#ec4899")]
    Pink,
    #[serde(rename = "#6B7280", alias = "#6b7280")]
    Gray,
    #[serde(rename = "#475569")]
    Slate,
}

pub const PALETTE: [Color; 10] = [
    Color::Red,
    Color::Orange,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Indigo,
    Color::Purple,
    Color::Pink,
    Color::Gray,
    Color::Slate,
];

#[derive(Debug, thiserror::Error)]
#[error("Unknown color '{0}'. Use a palette name (e.g. 'blue') or its hex value")]
pub struct UnknownColorError(pub String);

impl Color {
    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Orange => "Orange",
            Color::Yellow => "Yellow",
            Color::Green => "Green",
            Color::Blue => "Blue",
            Color::Indigo => "Indigo",
            Color::Purple => "Purple",
            Color::Pink => "Pink",
            Color::Gray => "Gray",
            Color::Slate => "Slate",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Color::Red => "#EF4444",
            Color::Orange => "#F59E0B",
            Color::Yellow => "#EAB308",
            Color::Green => "#10B981",
            Color::Blue => "#3B82F6",
            Color::Indigo => "#6366F1",
            Color::Purple => "#8B5CF6",
            Color::Pink => "#EC4899",
            Color::Gray => "#6B7280",
            Color::Slate => "#475569",
        }
    }

    /// RGB triple for terminals with truecolor support.
    pub fn rgb(self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = UnknownColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        PALETTE
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(needle) || c.hex().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownColorError(s.to_string()))
    }
}

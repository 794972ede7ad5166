//! Master color palette

use serde::{Deserialize, Serialize};

/// Projectile/rule colors, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorId {
    Red,
    Green,
    Purple,
    Orange,
    Blue,
    Black,
}

/// Every color a Selective round can draw from
pub const MASTER_PALETTE: [ColorId; 6] = [
    ColorId::Red,
    ColorId::Green,
    ColorId::Purple,
    ColorId::Orange,
    ColorId::Blue,
    ColorId::Black,
];

impl ColorId {
    /// Name shown in rule text
    pub fn name(&self) -> &'static str {
        match self {
            ColorId::Red => "RED",
            ColorId::Green => "GREEN",
            ColorId::Purple => "PURPLE",
            ColorId::Orange => "ORANGE",
            ColorId::Blue => "BLUE",
            ColorId::Black => "BLACK",
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            ColorId::Red => [255, 0, 0],
            ColorId::Green => [0, 255, 0],
            ColorId::Purple => [128, 0, 128],
            ColorId::Orange => [255, 140, 0],
            ColorId::Blue => [0, 0, 255],
            ColorId::Black => [0, 0, 0],
        }
    }

    /// Uppercase `RRGGBB` (no leading #)
    pub fn hex(&self) -> String {
        let [r, g, b] = self.rgb();
        format!("{:02X}{:02X}{:02X}", r, g, b)
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        MASTER_PALETTE.get(index).copied()
    }
}

impl std::fmt::Display for ColorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

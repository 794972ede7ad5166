//! Block/ignore color rules with Stroop-style text
//!
//! A rule is an unordered pair of palette colors plus which of the two must be
//! blocked. Rule text always names a color in the ink of the *other* color.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::palette::{ColorId, MASTER_PALETTE};
use crate::settings::Variant;

/// The two fixed pairs a Stroop round alternates between
pub const STROOP_PAIRS: [[ColorId; 2]; 2] = [
    [ColorId::Red, ColorId::Green],
    [ColorId::Blue, ColorId::Orange],
];

/// Rejected rule construction
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleError {
    #[error("Rule pair needs two distinct colors, got {0} twice")]
    SameColor(ColorId),

    #[error("Block index {0} out of range (0 or 1)")]
    BlockIndex(usize),
}

/// Active color pair and roles. Always holds two distinct colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct RuleContext {
    colors: [ColorId; 2],
    /// Index into `colors` of the block color (the other one is ignore)
    block_index: usize,
}

/// Unchecked wire form, validated through [`RuleContext::new`]
#[derive(Deserialize)]
struct RawRule {
    colors: [ColorId; 2],
    block_index: usize,
}

impl TryFrom<RawRule> for RuleContext {
    type Error = RuleError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        let [a, b] = raw.colors;
        RuleContext::new(a, b, raw.block_index)
    }
}

/// One line of rule text: `word` printed in `ink`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleText {
    pub label: &'static str,
    pub word: ColorId,
    pub ink: ColorId,
}

impl RuleText {
    /// Rich-text markup for TMP-style text widgets
    pub fn markup(&self) -> String {
        format!(
            "{}: <b><color=#{}>{}</color></b>",
            self.label,
            self.ink.hex(),
            self.word.name()
        )
    }

    /// Same line without markup (logs, plain widgets)
    pub fn plain(&self) -> String {
        format!("{}: {}", self.label, self.word.name())
    }
}

impl RuleContext {
    /// Rule over `[a, b]` where `colors[block_index]` must be blocked
    pub fn new(a: ColorId, b: ColorId, block_index: usize) -> Result<Self, RuleError> {
        if a == b {
            return Err(RuleError::SameColor(a));
        }
        if block_index > 1 {
            return Err(RuleError::BlockIndex(block_index));
        }
        Ok(Self {
            colors: [a, b],
            block_index,
        })
    }

    pub fn colors(&self) -> [ColorId; 2] {
        self.colors
    }

    pub fn block_color(&self) -> ColorId {
        self.colors[self.block_index]
    }

    pub fn ignore_color(&self) -> ColorId {
        self.colors[1 - self.block_index]
    }

    /// Whether a ball of this color must be blocked
    pub fn is_danger(&self, color: ColorId) -> bool {
        color == self.block_color()
    }

    /// Unordered pair equality (roles ignored)
    pub fn same_pair(&self, other: &RuleContext) -> bool {
        same_colors(self.colors, other.colors)
    }

    /// "Block: X" with X inked in the ignore color
    pub fn block_text(&self) -> RuleText {
        RuleText {
            label: "Block",
            word: self.block_color(),
            ink: self.ignore_color(),
        }
    }

    /// "Ignore: Y" with Y inked in the block color
    pub fn ignore_text(&self) -> RuleText {
        RuleText {
            label: "Ignore",
            word: self.ignore_color(),
            ink: self.block_color(),
        }
    }

    /// Draw a rule for a variant. With `avoid` set, the new pair never equals it
    /// as an unordered pair.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, variant: Variant, avoid: Option<&RuleContext>) -> Self {
        let colors = match variant {
            Variant::Selective => draw_palette_pair(rng, avoid),
            Variant::Stroop => draw_stroop_pair(rng, avoid),
        };
        let block_index = rng.random_range(0..2);
        let rule = Self { colors, block_index };
        log::info!(
            "Rules drawn: block {} / ignore {}",
            rule.block_color(),
            rule.ignore_color()
        );
        rule
    }
}

fn same_colors([a, b]: [ColorId; 2], [c, d]: [ColorId; 2]) -> bool {
    (a == c && b == d) || (a == d && b == c)
}

/// Two distinct palette colors, rejecting the `avoid` pair in either order
fn draw_palette_pair<R: Rng + ?Sized>(rng: &mut R, avoid: Option<&RuleContext>) -> [ColorId; 2] {
    loop {
        let a = rng.random_range(0..MASTER_PALETTE.len());
        // Pick from the remaining five so b != a without retrying
        let mut b = rng.random_range(0..MASTER_PALETTE.len() - 1);
        if b >= a {
            b += 1;
        }
        let colors = [MASTER_PALETTE[a], MASTER_PALETTE[b]];
        let repeats = avoid.is_some_and(|cur| same_colors(cur.colors, colors));
        if !repeats {
            return colors;
        }
    }
}

/// One of the two fixed pairs; a change always switches to the other one
fn draw_stroop_pair<R: Rng + ?Sized>(rng: &mut R, avoid: Option<&RuleContext>) -> [ColorId; 2] {
    match avoid {
        Some(cur) => {
            if same_colors(cur.colors, STROOP_PAIRS[0]) {
                STROOP_PAIRS[1]
            } else {
                STROOP_PAIRS[0]
            }
        }
        None => STROOP_PAIRS[rng.random_range(0..STROOP_PAIRS.len())],
    }
}

//! Category colors for pact markers.

use std::fmt;

use pact_services::Pact;

/// Color for a pact with no category at all.
pub const NEUTRAL_COLOR: &str = "#8892a6";

const PRESETS: [(&str, &str); 6] = [
    ("work", "#4f46e5"),
    ("personal", "#10b981"),
    ("health", "#00ff00"),
    ("finance", "#f59e0b"),
    ("learning", "#06b6d4"),
    ("other", "#8b5cf6"),
];

const SATURATION: u8 = 65;
const LIGHTNESS: u8 = 55;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Hex(&'static str),
    Hsl { hue: u16, saturation: u8, lightness: u8 },
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Hex(hex) => f.write_str(hex),
            Color::Hsl {
                hue,
                saturation,
                lightness,
            } => write!(f, "hsl({}, {}%, {}%)", hue, saturation, lightness),
        }
    }
}

/// 32-bit `h = h * 31 + unit` over the UTF-16 code units of `text`.
pub fn category_hash(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Color for a category. Matching is case- and whitespace-insensitive;
/// unknown categories, including the empty one, get a hashed hue.
pub fn color_for(category: &str) -> Color {
    let key = category.trim().to_lowercase();

    if let Some(hex) = PRESETS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, hex)| *hex)
    {
        return Color::Hex(hex);
    }

    Color::Hsl {
        hue: (category_hash(&key) % 360) as u16,
        saturation: SATURATION,
        lightness: LIGHTNESS,
    }
}

pub fn color_for_pact(pact: &Pact) -> Color {
    match pact.category.as_deref() {
        Some(category) => color_for(category),
        None => Color::Hex(NEUTRAL_COLOR),
    }
}

//! RGB colour helpers shared by the simulation, the surface and the config.

use fastrand::Rng;

/// 8-bit RGB triple.
pub type Rgb = (u8, u8, u8);

pub const WHITE: Rgb = (255, 255, 255);
pub const BLACK: Rgb = (0, 0, 0);

/// Rocket trail colour (`#ffff00`).
pub const ROCKET_YELLOW: Rgb = (255, 255, 0);
/// Planet burst body (`#ff6b6b`).
pub const PLANET_RED: Rgb = (0xff, 0x6b, 0x6b);
/// Planet burst tilted ring (`#ffff99`).
pub const PLANET_RING: Rgb = (0xff, 0xff, 0x99);
/// Heart burst (`#ff1744`).
pub const HEART_RED: Rgb = (0xff, 0x17, 0x44);
/// Near-black used for the trailing fade (`#000003`).
pub const NIGHT: Rgb = (0x00, 0x00, 0x03);

/// Uniformly random colour over the whole RGB cube.
pub fn random(rng: &mut Rng) -> Rgb {
    (rng.u8(..), rng.u8(..), rng.u8(..))
}

pub fn parse_hex(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

pub fn to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Colour as linear `[0, 1]` channels.
#[inline]
pub fn to_unit(color: Rgb) -> [f32; 3] {
    [
        color.0 as f32 / 255.0,
        color.1 as f32 / 255.0,
        color.2 as f32 / 255.0,
    ]
}

#[inline]
pub fn from_unit(c: [f32; 3]) -> Rgb {
    (
        (c[0].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[1].clamp(0.0, 1.0) * 255.0).round() as u8,
        (c[2].clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Serde adapter storing colours as `"#rrggbb"` strings.
pub mod hex {
    use super::Rgb;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::to_hex(*color))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_hex(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid hex colour {s:?}, expected RRGGBB")))
    }
}

// SPDX-License-Identifier: MIT

//!
//! Parse, manipulate, and print colours used when drawing a timeline
//!

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can arise when parsing a [`Colour`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColourError {
    #[error("`{0}` is not a hex colour")]
    NotHex(String),
}

/// The `Colour` type (serialised as a `#rrggbb` string)
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Colour {
    r: u8,
    g: u8,
    b: u8,
}

impl Colour {
    /// Create a colour from RGB values
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Colour { r, g, b }
    }

    /// Create a colour from a hex colour (e.g. `#ab66ef`, `ab66ef`, `#ab66efff`).
    /// If the hex value has an alpha component, it is removed.
    pub fn from_hex(hex_colour: &str) -> Result<Self, ColourError> {
        let error = || ColourError::NotHex(hex_colour.to_string());
        let digits = hex_colour.strip_prefix('#').unwrap_or(hex_colour);
        if !digits.is_ascii() {
            return Err(error());
        }
        let digits = match digits.len() {
            6 => digits,
            8 => &digits[..6],
            _ => return Err(error()),
        };
        let component = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| error())
        };
        Ok(Colour::from_rgb(
            component(0..2)?,
            component(2..4)?,
            component(4..6)?,
        ))
    }

    /// Get a colour as RGB values
    pub fn as_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// e.g. `#0affc3` (for SVG/CSS attributes)
    pub fn as_hex(&self) -> String {
        // {:02x} means print as hex, requesting 2 chars (pad left with "0" if only 1 char otherwise)
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Get a lighter shade of the specified colour
    pub fn lightened_colour(colour: Colour) -> Colour {
        let lighten = |component: u8| {
            let old: f64 = component.into();
            (old + (0.5 * (255.0 - old))).round() as u8
        };
        Colour::from_rgb(lighten(colour.r), lighten(colour.g), lighten(colour.b))
    }
}

impl Serialize for Colour {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Colour {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Colour::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

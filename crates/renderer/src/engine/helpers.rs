// SPDX-License-Identifier: MIT

//!
//! Helper functions
//!

/// The decade a year falls in (rounding towards negative infinity)
pub(crate) fn floor_to_decade(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// The first decade at or after a year (rounding towards positive infinity)
pub(crate) fn ceiling_to_decade(year: i32) -> i32 {
    let floor = floor_to_decade(year);
    if floor == year { floor } else { floor + 10 }
}

/// Format a number for an SVG attribute
pub(crate) fn svg_number(value: f64) -> String {
    // Avoid "-0" in the output
    if value == 0.0 {
        return String::from("0");
    }
    format!("{value}")
}

/// The value of an SVG `rotate(...)` transform
pub(crate) fn rotate(degrees: f64, x: f64, y: f64) -> String {
    format!(
        "rotate({}, {}, {})",
        svg_number(degrees),
        svg_number(x),
        svg_number(y)
    )
}

/// The value of a pixel size style/attribute
pub(crate) fn px(value: f64) -> String {
    format!("{}px", svg_number(value))
}

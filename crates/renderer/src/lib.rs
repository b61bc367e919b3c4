// SPDX-License-Identifier: MIT

//!
//! *Part of the Chronolane project*
//!
//! This crate draws interactive, zoomable, multi-track timelines.  It can be
//! compiled for native use as well as to WASM for use in the browser.
//!
//! The core of the crate is a platform independent engine responsible for:
//!
//! - Mapping every track onto one shared time axis
//! - Laying out events and periods once
//! - Rescaling strokes, offsets and fonts as the user zooms
//! - Regenerating the date grid for the visible window
//! - Tracking which labels are pinned (and persisting them)
//!
//! The engine draws into anything implementing [`Scene`].  Two are offered:
//!
//! - [`MemoryScene`], held in memory and written out as SVG text
//! - [`frontends::svg_dom::SvgDomScene`], a live `<svg>` in the browser
//!
//! ## Usage
//!
//! To use in a browser one can use the following to compile to WASM:
//!
//! ```sh
//! wasm-pack build --target web
//! ```
//!
//! One can then construct a `ChronolaneSvg` from JavaScript and pass it the
//! loaded resources.
//!

extern crate console_error_panic_hook;

pub mod colour;
pub mod engine;
pub mod frontends;

pub use colour::*;
pub use engine::*;
pub use frontends::svg_dom::{ChronolaneSvg, LocalStoragePins, SvgDomScene};

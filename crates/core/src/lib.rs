// SPDX-License-Identifier: MIT

//!
//! *Part of the wider Chronolane project*
//!
//! This crate defines the basic datatypes used across the Chronolane project
//! (the renderer engine, the browser frontend, and the snapshot tool).
//!
//! Raw resources (a settings object and one item array per track) are parsed
//! into [`Track`]s holding [`Event`]s and [`Period`]s.  The shared time range
//! of the timeline is the [`global_extent`] of every focused item, and each
//! track spans its own [`local_extent`].
//!
//! This crate aims to provide APIs for each type so that if a type is
//! instantiated, the developer can be sure it's valid.
//!

mod dataset;
mod extent;
mod pin_key;
mod resources;
mod time_point;
mod track;

pub use dataset::*;
pub use extent::*;
pub use pin_key::*;
pub use resources::*;
pub use time_point::*;
pub use track::*;

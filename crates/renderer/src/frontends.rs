// SPDX-License-Identifier: MIT

//!
//! Frontends
//!

pub mod svg_dom;

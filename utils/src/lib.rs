//! Shared utilities for klient.
//!
//! This crate provides cross-cutting helpers that multiple klient crates need
//! but that don't belong in the domain-pure `klient-types` crate:
//!
//! - **`template`**: `${KEY}` / `${{KEY}}` placeholder interpolation
//! - **`text`**: literal replace-all, joins, random names, URL encoding
//! - **`kind`**: resource kind pluralization

pub mod kind;
pub mod template;
pub mod text;

pub use kind::plural_from_kind;
pub use template::interpolate;
pub use text::{
    coalesce, join, random_string, random_string_with_prefix, replace_all_literal, url_encode,
};

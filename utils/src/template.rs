//! Placeholder interpolation for YAML/JSON templates.
//!
//! Three placeholder forms are recognised for a binding `KEY -> VALUE`:
//!
//! | Template text   | Output  | Notes                                        |
//! |-----------------|---------|----------------------------------------------|
//! | `"${{KEY}}"`    | `VALUE` | surrounding double quotes are consumed       |
//! | `${KEY}`        | `VALUE` |                                              |
//! | `${{KEY}}`      | `VALUE` |                                              |
//!
//! The quoted double-brace form lets a template stay valid JSON/YAML while
//! still producing an unquoted scalar (`"replicas": "${{N}}"` -> `"replicas": 3`).
//!
//! # Ordering
//!
//! Bindings are applied one at a time in insertion order. For each binding the
//! three forms are replaced in the order shown above, each as a single
//! left-to-right literal pass. Text inserted by one pass is never rescanned by
//! that same pass, but later passes (and later bindings) do see it. A value
//! that itself contains placeholder syntax is therefore expanded only by
//! bindings that come after it.

use klient_types::Bindings;
use tracing::trace;

use crate::text::replace_all_literal;

/// Expand `${KEY}`, `${{KEY}}`, and `"${{KEY}}"` placeholders in `template`.
///
/// `None` bindings behave like an empty set. Entries with a missing key or
/// value are skipped. Returns the template unchanged when nothing matches.
#[must_use]
pub fn interpolate(template: &str, bindings: Option<&Bindings>) -> String {
    let Some(bindings) = bindings else {
        return template.to_owned();
    };

    let mut out = template.to_owned();
    for (key, value) in bindings.entries() {
        for pattern in placeholder_patterns(key) {
            if out.contains(&pattern) {
                trace!(key, pattern = %pattern, "Expanding placeholder");
                out = replace_all_literal(&out, &pattern, value);
            }
        }
    }
    out
}

/// The three literal patterns for `key`, in replacement order.
fn placeholder_patterns(key: &str) -> [String; 3] {
    [
        format!("\"${{{{{key}}}}}\""),
        format!("${{{key}}}"),
        format!("${{{{{key}}}}}"),
    ]
}

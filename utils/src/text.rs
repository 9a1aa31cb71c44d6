//! Small string helpers shared across klient crates.

use url::form_urlencoded;

/// Lowercase alphanumerics used by [`random_string`].
const RANDOM_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Replace every occurrence of `from` with `to`, treating both as plain text.
///
/// Scanning resumes after each inserted `to`, so a replacement that contains
/// `from` is never expanded again. An empty `from` matches nothing.
#[must_use]
pub fn replace_all_literal(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find(from) {
        out.push_str(&rest[..idx]);
        out.push_str(to);
        rest = &rest[idx + from.len()..];
    }
    out.push_str(rest);
    out
}

/// Join items with `separator`; absent items contribute an empty segment.
#[must_use]
pub fn join<I, S>(items: I, separator: char) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        if let Some(item) = item {
            out.push_str(item.as_ref());
        }
    }
    out
}

/// First present item, if any.
pub fn coalesce<'a, I>(items: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    items.into_iter().flatten().next()
}

/// Random string of `length` lowercase ASCII letters and digits.
#[must_use]
pub fn random_string(length: usize) -> String {
    (0..length)
        .map(|_| char::from(RANDOM_ALPHABET[rand::random_range(0..RANDOM_ALPHABET.len())]))
        .collect()
}

/// `prefix` followed by enough random characters to reach `length` in total.
///
/// The prefix is included in the result and counts toward `length`, so the
/// random tail is `length - prefix.len()` characters long. A prefix at least
/// as long as `length` is returned as-is.
#[must_use]
pub fn random_string_with_prefix(prefix: &str, length: usize) -> String {
    let mut out = prefix.to_owned();
    out.push_str(&random_string(length.saturating_sub(prefix.len())));
    out
}

/// Encode `value` as `application/x-www-form-urlencoded` (spaces become `+`).
#[must_use]
pub fn url_encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

//! One-time-passcode extraction from free-text message bodies.

use std::sync::LazyLock;

use regex::Regex;

/// Trigger vocabulary, up to two filler words, an optional colon, then a
/// digit run. The run length is validated separately because the pattern
/// itself cannot reject a 9th digit without lookahead.
static PASSCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:code|otp|is|enter)\b(?:\s+[a-z]+){0,2}\s*:?\s*(\d+)")
        .expect("passcode pattern is valid")
});

const MIN_DIGITS: usize = 4;
const MAX_DIGITS: usize = 8;

/// Scan `text` for a one-time passcode and return the first match in
/// left-to-right order.
///
/// A candidate is the full digit run following a trigger word; runs of 4–8
/// digits are returned whole, anything shorter or longer is rejected rather
/// than truncated, and scanning continues at the next trigger. Pure and
/// total: any input, including the empty string, yields at worst `None`.
pub fn extract(text: &str) -> Option<&str> {
    PASSCODE_RE.captures_iter(text).find_map(|caps| {
        let digits = caps.get(1)?.as_str();
        (MIN_DIGITS..=MAX_DIGITS)
            .contains(&digits.len())
            .then_some(digits)
    })
}

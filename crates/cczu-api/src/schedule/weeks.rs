//! Week-descriptor parsing.
//!
//! A descriptor is the compact fragment encoding which weeks of the term a
//! section meets: `1-16周`, `3周`, `2-8,11-14,`, `单 7-8,11-14,` and so on.
//! Ranges are inclusive, commas join sub-ranges, and a `单`/`双` modifier
//! restricts the result to odd or even weeks.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Marker glyph terminating most descriptors.
const WEEK_GLYPH: char = '周';
/// Odd-weeks-only modifier.
const ODD_GLYPH: char = '单';
/// Even-weeks-only modifier.
const EVEN_GLYPH: char = '双';

/// Bare numeric descriptors: `3`, `2-8`, `2-8,11-14` with an optional
/// trailing comma as the upstream emits them.
static NUMERIC_WEEKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(-\d+)?(,\d+(-\d+)?)*,?$").unwrap());

/// Whether a token is part of a week descriptor rather than a location.
///
/// Classification, not position, decides the split: padding and token order
/// vary across server responses, so anything carrying the week glyph, a
/// standalone parity modifier, or a bare number/range/comma pattern counts.
pub(crate) fn is_week_descriptor(token: &str) -> bool {
    token.contains(WEEK_GLYPH)
        || token == "单"
        || token == "双"
        || NUMERIC_WEEKS.is_match(token)
}

/// Expands a week descriptor into a sorted, de-duplicated list of week
/// numbers.
///
/// A descriptor without numeric content yields an empty list; nothing in
/// here errors, because the raw format is lossy and partial data beats a
/// hard failure.
pub fn parse_week_descriptor(descriptor: &str) -> Vec<u32> {
    let odd_only = descriptor.contains(ODD_GLYPH);
    let even_only = descriptor.contains(EVEN_GLYPH);

    // Strip the glyphs and any stray punctuation, keeping only the numeric
    // range syntax.
    let cleaned: String = descriptor
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '-')
        .collect();

    let keep = |week: u32| {
        if odd_only {
            week % 2 == 1
        } else if even_only {
            week % 2 == 0
        } else {
            true
        }
    };

    let mut weeks = BTreeSet::new();
    for segment in cleaned.split(',') {
        if segment.is_empty() {
            continue;
        }
        if let Some((start, end)) = segment.split_once('-') {
            if let (Ok(start), Ok(end)) = (start.parse::<u32>(), end.parse::<u32>()) {
                for week in start..=end {
                    if keep(week) {
                        weeks.insert(week);
                    }
                }
            }
        } else if let Ok(week) = segment.parse::<u32>() {
            if keep(week) {
                weeks.insert(week);
            }
        }
    }

    weeks.into_iter().collect()
}

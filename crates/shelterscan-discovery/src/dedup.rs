//! Cross-provider deduplication by quantized coordinate.
//!
//! The same physical shelter comes back from several synonym queries and from
//! both providers with slightly different coordinates. Rounding to four
//! decimal places (about 11 m) gives a key that collapses that jitter. The
//! first record seen for a key wins; later duplicates are dropped without
//! merging their fields.

use std::collections::HashSet;

use shelterscan_core::{Coordinate, Shelter};

const KEY_SCALE: f64 = 10_000.0;

/// Rounded `(lat, lon)` key for `coordinate` at four decimal places.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn location_key(coordinate: Coordinate) -> (i64, i64) {
    // Valid coordinates scaled by 1e4 stay far inside i64 range.
    (
        (coordinate.latitude * KEY_SCALE).round() as i64,
        (coordinate.longitude * KEY_SCALE).round() as i64,
    )
}

/// Removes shelters whose rounded coordinate was already seen, keeping the
/// earliest occurrence and the original order.
#[must_use]
pub fn deduplicate(shelters: Vec<Shelter>) -> Vec<Shelter> {
    let before = shelters.len();
    let mut seen = HashSet::with_capacity(before);
    let unique: Vec<Shelter> = shelters
        .into_iter()
        .filter(|s| seen.insert(location_key(s.coordinates)))
        .collect();
    tracing::debug!(before, after = unique.len(), "deduplicated shelters");
    unique
}

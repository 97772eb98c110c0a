//! Cache key generators for like-sets.
//!
//! Like-sets live under `<kind>:like:<id>` and hold user ids as decimal
//! strings. The per-kind marker `<kind>:likes:loaded` holds the ids of every
//! item whose durable likes have already been copied into the cache, and
//! `<kind>:likes:emptied` the ids whose like-set lost its last member since
//! the last flush.

use agora_core::{ContentId, ContentKind};

/// Key of the like-set for one item.
#[must_use]
pub fn like_set(kind: ContentKind, id: ContentId) -> String {
    format!("{}:like:{}", kind, id)
}

/// Key of the hydration marker set for a kind.
#[must_use]
pub fn loaded_marker(kind: ContentKind) -> String {
    format!("{}:likes:loaded", kind)
}

/// Key of the set of items emptied by an unlike since the last flush.
///
/// Empty sets cease to exist in the store, so these items cannot be found by
/// scanning like-set keys.
#[must_use]
pub fn emptied_marker(kind: ContentKind) -> String {
    format!("{}:likes:emptied", kind)
}

/// Pattern matching every like-set of a kind.
///
/// Does not match the markers, whose second segment is `likes`.
#[must_use]
pub fn like_set_pattern(kind: ContentKind) -> String {
    format!("{}:like:*", kind)
}

/// Extracts the content id from a like-set key of the given kind.
///
/// Returns `None` for keys of another kind or with a non-numeric suffix.
#[must_use]
pub fn parse_like_set_key(kind: ContentKind, key: &str) -> Option<ContentId> {
    key.strip_prefix(kind.as_str())?
        .strip_prefix(":like:")?
        .parse()
        .ok()
}

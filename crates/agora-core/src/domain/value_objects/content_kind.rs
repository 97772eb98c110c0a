//! Content kind value object.

use crate::AgoraError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of content a like refers to.
///
/// The lowercase name doubles as the cache key namespace, so it must stay
/// stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A forum post.
    Post,
    /// A comment on a post.
    Comment,
}

impl ContentKind {
    /// Every content kind, in flush order.
    pub const ALL: [Self; 2] = [Self::Post, Self::Comment];

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }

    /// Returns the entity name used in error messages.
    #[must_use]
    pub const fn resource_name(&self) -> &'static str {
        match self {
            Self::Post => "Post",
            Self::Comment => "Comment",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = AgoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "post" => Ok(Self::Post),
            "comment" => Ok(Self::Comment),
            other => Err(AgoraError::validation(format!("Unknown content kind: {}", other))),
        }
    }
}

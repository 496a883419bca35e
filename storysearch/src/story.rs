//! Story models: the raw shape returned by a stories source and the domain
//! shape handed to callers.

use serde::{Deserialize, Serialize};

/// A story as returned by the stories API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStory {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub comment_html: Option<String>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub vote_count: u32,
    pub created_at: String,
    #[serde(default)]
    pub links: RawStoryLinks,
}

/// Relationship ids attached to a [`RawStory`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStoryLinks {
    #[serde(default)]
    pub user: Option<u64>,
    #[serde(default)]
    pub comments: Vec<u64>,
    #[serde(default)]
    pub upvotes: Vec<u64>,
}

/// A story as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Story {
    pub id: u64,
    pub title: String,
    pub url: Option<String>,
    pub comment: Option<String>,
    pub comment_html: Option<String>,
    pub comment_count: u32,
    pub vote_count: u32,
    pub created_at: String,
    pub user_id: Option<u64>,
    pub comment_ids: Vec<u64>,
}

impl Story {
    /// True for self posts (no external link).
    pub fn is_discussion(&self) -> bool {
        self.url.is_none()
    }
}

/// Maps a raw story to its domain form. One-to-one; never fails.
pub fn to_story(raw: RawStory) -> Story {
    Story {
        id: raw.id,
        title: raw.title,
        url: raw.url.filter(|url| !url.is_empty()),
        comment: raw.comment,
        comment_html: raw.comment_html,
        comment_count: raw.comment_count,
        vote_count: raw.vote_count,
        created_at: raw.created_at,
        user_id: raw.links.user,
        comment_ids: raw.links.comments,
    }
}

impl From<RawStory> for Story {
    fn from(raw: RawStory) -> Self {
        to_story(raw)
    }
}

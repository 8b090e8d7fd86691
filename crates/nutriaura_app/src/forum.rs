//! Local community board.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::{Storage, StorageKey};

pub const COMMUNITY_TIPS: [&str; 3] = [
    "Feeling stressed? Try the 4-7-8 breathing technique: inhale for 4s, hold for 7s, exhale for 8s.",
    "For better sleep, try to get 10-15 minutes of morning sunlight. It helps regulate your circadian rhythm.",
    "A simple tip for hydration: keep a water bottle on your desk at all times. Out of sight, out of mind!",
];

pub const LOCAL_AUTHOR: &str = "You";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub author: String,
    pub content: String,
    /// RFC 3339.
    pub timestamp: String,
}

fn seed_posts(now: DateTime<Utc>) -> Vec<ForumPost> {
    vec![
        ForumPost {
            id: "1".into(),
            author: "WellnessExplorer".into(),
            content: "Just got my first analysis! The sleep score was a real eye-opener. \
                      Anyone have tips for winding down at night?"
                .into(),
            timestamp: (now - Duration::hours(2)).to_rfc3339(),
        },
        ForumPost {
            id: "2".into(),
            author: "GlowingGrace".into(),
            content: "My hydration score was low, so I bought a new water bottle to keep at \
                      my desk. Small changes!"
                .into(),
            timestamp: (now - Duration::days(1)).to_rfc3339(),
        },
    ]
}

/// Coarse relative age such as "3 hours ago". A unit is used only once more
/// than one whole unit has elapsed.
pub fn time_since(timestamp: &str, now: DateTime<Utc>) -> String {
    let Ok(then) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let seconds = (now - then.with_timezone(&Utc)).num_seconds().max(0);
    const UNITS: [(i64, &str); 5] = [
        (31_536_000, "years"),
        (2_592_000, "months"),
        (86_400, "days"),
        (3_600, "hours"),
        (60, "minutes"),
    ];
    for (size, name) in UNITS {
        if seconds > size {
            return format!("{} {name} ago", seconds / size);
        }
    }
    format!("{seconds} seconds ago")
}

#[derive(Clone)]
pub struct ForumBoard {
    storage: Storage,
}

impl ForumBoard {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Newest first. The first read of an empty board persists the sample posts.
    pub fn posts(&self) -> Vec<ForumPost> {
        match self.storage.load(StorageKey::ForumPosts) {
            Some(posts) => posts,
            None => {
                let seeded = seed_posts(Utc::now());
                self.storage.save(StorageKey::ForumPosts, &seeded);
                seeded
            }
        }
    }

    pub fn add_post(&self, content: &str) -> AppResult<ForumPost> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("post must not be empty".into()));
        }
        let post = ForumPost {
            id: Uuid::new_v4().to_string(),
            author: LOCAL_AUTHOR.to_string(),
            content: content.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let mut posts = self.posts();
        posts.insert(0, post.clone());
        self.storage.save(StorageKey::ForumPosts, &posts);
        Ok(post)
    }

    /// Flag a post for moderation. Nothing is removed locally.
    pub fn report(&self, id: &str) -> AppResult<()> {
        let post = self
            .posts()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("post {id}")))?;
        info!(post = %post.id, author = %post.author, "post reported");
        Ok(())
    }
}

//! Levels, Aura Points and the badge rule table.
//!
//! The store keeps a raw `{level, ap}` record where `ap` only ever grows;
//! the displayed [`UserProfile`] is always derived through [`normalize`].

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{Badge, FIRST_ANALYSIS, FIVE_GOALS, LEVEL_5};
use crate::error::{AppError, AppResult};
use crate::registry::BadgeRegistry;
use crate::store::{Storage, StorageKey};

/// Points granted for every completed analysis.
pub const ANALYSIS_REWARD: u32 = 100;

/// AP required to leave `level`.
pub fn threshold(level: u32) -> u32 {
    level.saturating_mul(100).saturating_add(100)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProgress {
    pub level: u32,
    pub ap: u32,
}

impl Default for RawProgress {
    fn default() -> Self {
        Self { level: 1, ap: 0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub level: u32,
    pub ap: u32,
    pub ap_for_next_level: u32,
}

impl UserProfile {
    /// Whole-number percentage of the way to the next level.
    pub fn progress_percent(&self) -> u8 {
        let pct = u64::from(self.ap) * 100 / u64::from(self.ap_for_next_level.max(1));
        pct.min(100) as u8
    }
}

pub fn normalize(raw: RawProgress) -> UserProfile {
    let mut level = raw.level.max(1);
    let mut ap = raw.ap;
    while ap >= threshold(level) {
        ap -= threshold(level);
        level += 1;
    }
    UserProfile {
        level,
        ap,
        ap_for_next_level: threshold(level),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Award {
    pub points: u32,
    pub before: UserProfile,
    pub after: UserProfile,
}

impl Award {
    pub fn leveled_up(&self) -> bool {
        self.after.level > self.before.level
    }
}

/// Things that can unlock a badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    AnalysisCompleted,
    PointsAwarded(UserProfile),
    GoalsChanged { total: usize },
}

struct BadgeRule {
    badge: &'static str,
    applies: fn(&ProgressEvent) -> bool,
}

fn analysis_completed(event: &ProgressEvent) -> bool {
    matches!(event, ProgressEvent::AnalysisCompleted)
}

fn reached_level_5(event: &ProgressEvent) -> bool {
    matches!(event, ProgressEvent::PointsAwarded(profile) if profile.level >= 5)
}

fn set_five_goals(event: &ProgressEvent) -> bool {
    matches!(event, ProgressEvent::GoalsChanged { total } if *total >= 5)
}

static BADGE_RULES: [BadgeRule; 3] = [
    BadgeRule {
        badge: FIRST_ANALYSIS,
        applies: analysis_completed,
    },
    BadgeRule {
        badge: LEVEL_5,
        applies: reached_level_5,
    },
    BadgeRule {
        badge: FIVE_GOALS,
        applies: set_five_goals,
    },
];

#[derive(Clone)]
pub struct ProgressionEngine {
    storage: Storage,
    badges: BadgeRegistry,
}

impl ProgressionEngine {
    pub fn new(storage: Storage) -> Self {
        Self {
            badges: BadgeRegistry::badges(storage.clone()),
            storage,
        }
    }

    pub fn badges(&self) -> &BadgeRegistry {
        &self.badges
    }

    fn raw(&self) -> RawProgress {
        self.storage.load_or_default(StorageKey::UserProfile)
    }

    pub fn profile(&self) -> UserProfile {
        normalize(self.raw())
    }

    pub fn award_points(&self, points: u32) -> AppResult<Award> {
        if points == 0 {
            return Err(AppError::Validation("points must be positive".into()));
        }
        let raw = self.raw();
        let before = normalize(raw);
        let updated = RawProgress {
            level: raw.level.max(1),
            ap: raw.ap.saturating_add(points),
        };
        self.storage.save(StorageKey::UserProfile, &updated);
        let after = normalize(updated);
        counter!("nutriaura_ap_awarded_total").increment(u64::from(points));
        let award = Award {
            points,
            before,
            after,
        };
        if award.leveled_up() {
            info!(from = before.level, to = after.level, "level up");
        }
        Ok(award)
    }

    /// Apply the rule table to `event` and return the badges newly earned.
    pub fn evaluate(&self, event: &ProgressEvent) -> Vec<&'static Badge> {
        let mut earned = Vec::new();
        for rule in BADGE_RULES.iter().filter(|rule| (rule.applies)(event)) {
            if self.badges.contains(rule.badge) {
                continue;
            }
            match self.badges.grant(rule.badge) {
                Ok(true) => {
                    if let Some(badge) = self.badges.get(rule.badge) {
                        info!(badge = badge.id, title = badge.title, "badge earned");
                        earned.push(badge);
                    }
                }
                Ok(false) => {}
                Err(e) => warn!(badge = rule.badge, error = %e, "badge rule misconfigured"),
            }
        }
        earned
    }
}

//! Personal goals and score-driven goal suggestions.

use chrono::{SecondsFormat, Utc};
use nutriaura_client::{AnalysisScores, ScoreKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::store::{Storage, StorageKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Nutrition,
    Sleep,
    Stress,
    Hydration,
    General,
}

impl From<ScoreKind> for GoalCategory {
    fn from(kind: ScoreKind) -> Self {
        match kind {
            ScoreKind::Nutrition => GoalCategory::Nutrition,
            ScoreKind::Sleep => GoalCategory::Sleep,
            ScoreKind::Stress => GoalCategory::Stress,
            ScoreKind::Hydration => GoalCategory::Hydration,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub text: String,
    pub category: GoalCategory,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GoalSuggestion {
    pub text: &'static str,
    pub category: GoalCategory,
}

fn suggestion_text(kind: ScoreKind) -> &'static str {
    match kind {
        ScoreKind::Sleep => "Get 7-8 hours of quality sleep.",
        ScoreKind::Stress => "Practice 5 minutes of mindfulness daily.",
        ScoreKind::Nutrition => "Add a serving of greens to one meal daily.",
        ScoreKind::Hydration => "Drink 8 glasses of water a day.",
    }
}

/// One suggestion for each of the two weakest scores, weakest first.
pub fn suggestions(scores: &AnalysisScores) -> Vec<GoalSuggestion> {
    let mut kinds = ScoreKind::ALL;
    // stable: ties keep the declaration order
    kinds.sort_by_key(|kind| scores.get(*kind));
    kinds
        .iter()
        .take(2)
        .map(|kind| GoalSuggestion {
            text: suggestion_text(*kind),
            category: (*kind).into(),
        })
        .collect()
}

#[derive(Clone)]
pub struct GoalBook {
    storage: Storage,
}

impl GoalBook {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> Vec<Goal> {
        self.storage.load_or_default(StorageKey::UserGoals)
    }

    fn save(&self, goals: &[Goal]) {
        self.storage.save(StorageKey::UserGoals, goals);
    }

    fn fresh_id(goals: &[Goal]) -> String {
        let base = Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true);
        let taken = |id: &str| goals.iter().any(|g| g.id == id);
        if !taken(&base) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Append a goal; the text is trimmed and must not be empty.
    pub fn add(&self, text: &str, category: GoalCategory) -> AppResult<Goal> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("goal text must not be empty".into()));
        }
        let mut goals = self.list();
        let goal = Goal {
            id: Self::fresh_id(&goals),
            text: text.to_string(),
            category,
            completed: false,
        };
        goals.push(goal.clone());
        self.save(&goals);
        debug!(id = %goal.id, total = goals.len(), "goal added");
        Ok(goal)
    }

    /// Flip the completed flag and return its new value.
    pub fn toggle(&self, id: &str) -> AppResult<bool> {
        let mut goals = self.list();
        let goal = goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| AppError::NotFound(format!("goal {id}")))?;
        goal.completed = !goal.completed;
        let completed = goal.completed;
        self.save(&goals);
        Ok(completed)
    }

    pub fn remove(&self, id: &str) -> AppResult<Goal> {
        let mut goals = self.list();
        let index = goals
            .iter()
            .position(|g| g.id == id)
            .ok_or_else(|| AppError::NotFound(format!("goal {id}")))?;
        let removed = goals.remove(index);
        self.save(&goals);
        Ok(removed)
    }
}

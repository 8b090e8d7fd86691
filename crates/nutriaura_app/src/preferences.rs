//! Display preferences: colour theme and novelty mode.

use nutriaura_client::{AnalysisResult, FindingIcon, KeyFinding, Recommendation};
use serde::{Deserialize, Serialize};

use crate::store::{Storage, StorageKey};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Clone)]
pub struct Preferences {
    storage: Storage,
}

impl Preferences {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn theme(&self) -> Theme {
        self.storage.load_or_default(StorageKey::Theme)
    }

    pub fn set_theme(&self, theme: Theme) {
        self.storage.save(StorageKey::Theme, &theme);
    }

    pub fn toggle_theme(&self) -> Theme {
        let next = self.theme().toggled();
        self.set_theme(next);
        next
    }

    pub fn novelty_mode(&self) -> bool {
        self.storage.load_or_default(StorageKey::NoveltyMode)
    }

    pub fn toggle_novelty_mode(&self) -> bool {
        let next = !self.novelty_mode();
        self.storage.save(StorageKey::NoveltyMode, &next);
        next
    }

    /// The result as it should be shown under the current settings.
    pub fn present(&self, result: &AnalysisResult) -> AnalysisResult {
        if self.novelty_mode() {
            apply_novelty(result)
        } else {
            result.clone()
        }
    }
}

/// A copy of `result` with the novelty finding and recommendation prepended.
pub fn apply_novelty(result: &AnalysisResult) -> AnalysisResult {
    let mut shown = result.clone();
    shown.key_findings.insert(
        0,
        KeyFinding {
            title: "Cosmic Pizza Alignment".into(),
            description: "Your facial scan indicates a severe deficiency in cheese and \
                          pepperoni. This is a critical wellness indicator."
                .into(),
            icon: FindingIcon::Pizza,
        },
    );
    shown.recommendations.insert(
        0,
        Recommendation {
            title: "Embrace the Chaos".into(),
            description: "Sometimes, the best plan is no plan. Your aura suggests a dose of \
                          pure, unadulterated fun."
                .into(),
            items: vec![
                "Eat pizza for breakfast.".into(),
                "Wear mismatched socks with confidence.".into(),
                "Replace one workout with a spontaneous dance party.".into(),
            ],
        },
    );
    shown
}

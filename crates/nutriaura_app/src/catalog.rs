//! Static badge, mission and challenge catalogs.

use serde::Serialize;

pub trait CatalogEntry: Sync + 'static {
    fn id(&self) -> &'static str;
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Daily,
    Weekly,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub kind: MissionKind,
    pub ap_reward: u32,
    pub icon: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub duration: &'static str,
    pub details: &'static [&'static str],
}

impl CatalogEntry for Badge {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl CatalogEntry for Mission {
    fn id(&self) -> &'static str {
        self.id
    }
}

impl CatalogEntry for Challenge {
    fn id(&self) -> &'static str {
        self.id
    }
}

pub const FIRST_ANALYSIS: &str = "first_analysis";
pub const LEVEL_5: &str = "level_5";
pub const FIVE_GOALS: &str = "five_goals";

pub static BADGES: [Badge; 3] = [
    Badge {
        id: FIRST_ANALYSIS,
        title: "Wellness Pioneer",
        description: "Completed your first wellness analysis.",
        icon: "trophy",
    },
    Badge {
        id: LEVEL_5,
        title: "Level 5!",
        description: "Reached Wellness Level 5.",
        icon: "badge",
    },
    Badge {
        id: FIVE_GOALS,
        title: "Goal Getter",
        description: "Set at least 5 personal goals.",
        icon: "badge",
    },
];

pub static MISSIONS: [Mission; 4] = [
    Mission {
        id: "daily_hydrate",
        title: "Hydration Heist",
        description: "Drink 8 glasses of water.",
        kind: MissionKind::Daily,
        ap_reward: 20,
        icon: "droplet",
    },
    Mission {
        id: "daily_meditate",
        title: "Mindful Moment",
        description: "Complete a 5-minute meditation session.",
        kind: MissionKind::Daily,
        ap_reward: 25,
        icon: "heart",
    },
    Mission {
        id: "weekly_sleep",
        title: "Sleep Saboteur",
        description: "Get 7+ hours of sleep for 3 nights in a row.",
        kind: MissionKind::Weekly,
        ap_reward: 150,
        icon: "moon",
    },
    Mission {
        id: "weekly_greens",
        title: "Fruit Ninja",
        description: "Eat 5 servings of fruits or vegetables in one day.",
        kind: MissionKind::Weekly,
        ap_reward: 100,
        icon: "leaf",
    },
];

pub static CHALLENGES: [Challenge; 3] = [
    Challenge {
        id: "hydration_challenge_month",
        title: "Hydration Challenge",
        description: "Drink 2L of water every day for a week.",
        icon: "droplet",
        duration: "7 days",
        details: &[
            "Carry a refillable bottle",
            "Log every glass",
            "Swap one sugary drink for water",
        ],
    },
    Challenge {
        id: "mindful_eating_week",
        title: "Mindful Eating Week",
        description: "Eat without distractions for at least one meal a day.",
        icon: "leaf",
        duration: "7 days",
        details: &[
            "Put the phone away at the table",
            "Chew slowly",
            "Notice when you feel full",
        ],
    },
    Challenge {
        id: "digital_detox_weekend",
        title: "Digital Detox Weekend",
        description: "Spend a weekend with minimal screen time.",
        icon: "moon",
        duration: "2 days",
        details: &[
            "No social media",
            "Screens off two hours before bed",
            "Spend an hour outdoors each day",
        ],
    },
];

//! Simulated community ranking.

use serde::Serialize;

use crate::progression::UserProfile;

pub const CURRENT_USER_NAME: &str = "You";

/// (name, level, ap)
const PEERS: [(&str, u32, u32); 5] = [
    ("GlowingGrace", 7, 420),
    ("WellnessExplorer", 5, 130),
    ("ZenZebra", 4, 310),
    ("HydroHero", 3, 90),
    ("SleepySloth", 1, 60),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub level: u32,
    pub ap: u32,
    pub is_current_user: bool,
}

/// Peers plus the current user, ordered by level then AP, highest first.
/// The current user wins ties.
pub fn leaderboard(profile: &UserProfile) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = std::iter::once(LeaderboardEntry {
        rank: 0,
        name: CURRENT_USER_NAME.to_string(),
        level: profile.level,
        ap: profile.ap,
        is_current_user: true,
    })
    .chain(PEERS.iter().map(|(name, level, ap)| LeaderboardEntry {
        rank: 0,
        name: (*name).to_string(),
        level: *level,
        ap: *ap,
        is_current_user: false,
    }))
    .collect();
    entries.sort_by(|a, b| (b.level, b.ap).cmp(&(a.level, a.ap)));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::{RawProgress, normalize};

    #[test]
    fn newcomer_ranks_last() {
        let board = leaderboard(&normalize(RawProgress { level: 1, ap: 10 }));
        assert_eq!(board.len(), PEERS.len() + 1);
        let me = board.last().unwrap();
        assert!(me.is_current_user);
        assert_eq!(me.rank, board.len());
    }

    #[test]
    fn ranks_by_level_then_ap() {
        let profile = normalize(RawProgress { level: 5, ap: 200 });
        let board = leaderboard(&profile);
        let names: Vec<_> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names[..3], ["GlowingGrace", CURRENT_USER_NAME, "WellnessExplorer"]);
        assert!(board.iter().enumerate().all(|(i, e)| e.rank == i + 1));
    }
}

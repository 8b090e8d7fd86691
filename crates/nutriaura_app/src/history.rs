//! Append-only record of analysis scores.

use chrono::{DateTime, Utc};
use nutriaura_client::{AnalysisScores, ScoreKind};
use serde::{Deserialize, Serialize};

use crate::store::{Storage, StorageKey};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WellnessDataPoint {
    /// RFC 3339.
    pub timestamp: String,
    pub scores: AnalysisScores,
}

impl WellnessDataPoint {
    pub fn new(at: DateTime<Utc>, scores: AnalysisScores) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            scores,
        }
    }

    /// Calendar date of the point, or the raw timestamp when it does not parse.
    pub fn date_label(&self) -> String {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub value: u8,
    pub label: String,
}

#[derive(Clone)]
pub struct WellnessHistory {
    storage: Storage,
}

impl WellnessHistory {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn points(&self) -> Vec<WellnessDataPoint> {
        self.storage.load_or_default(StorageKey::WellnessHistory)
    }

    /// Append and return the new length.
    pub fn append(&self, point: WellnessDataPoint) -> usize {
        let mut points = self.points();
        points.push(point);
        self.storage.save(StorageKey::WellnessHistory, &points);
        points.len()
    }

    pub fn series(&self, kind: ScoreKind) -> Vec<ChartPoint> {
        self.points()
            .iter()
            .map(|point| ChartPoint {
                value: point.scores.get(kind),
                label: point.date_label(),
            })
            .collect()
    }
}

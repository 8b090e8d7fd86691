//! Session core of the NutriAura wellness client.
//!
//! [`WellnessApp`] drives the screen flow, runs the selfie analysis through an
//! [`nutriaura_client::AnalysisClient`], and keeps history, progression,
//! goals, forum posts and preferences in a pluggable [`store::Storage`].

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod forum;
pub mod geolocation;
pub mod goals;
pub mod history;
pub mod leaderboard;
pub mod middleware;
pub mod navigation;
pub mod orchestrator;
pub mod preferences;
pub mod progression;
pub mod registry;
pub mod store;

mod test_utils;

pub use app::{AnalysisOutcome, AnalysisReport, MissionReward, WellnessApp};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use navigation::Screen;
pub use orchestrator::{AnalysisOrchestrator, AnalysisTicket, PipelineResult};
pub use store::{JsonFileStore, MemoryStore, Storage};

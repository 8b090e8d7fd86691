use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use nutriaura_app::cli::{Cli, Command};
use nutriaura_app::forum::{COMMUNITY_TIPS, time_since};
use nutriaura_app::geolocation::{FixedLocation, LocationProvider, NoLocation};
use nutriaura_app::goals::GoalCategory;
use nutriaura_app::middleware::LoggingMiddleware;
use nutriaura_app::{
    AnalysisOrchestrator, AnalysisOutcome, AppConfig, JsonFileStore, Screen, Storage, WellnessApp,
};
use nutriaura_client::config::Config;
use nutriaura_client::http_client::ReqwestAnalysisClient;
use nutriaura_client::utils::media_type_for_path;
use nutriaura_client::{AnalysisClient, CapturedImage, QuizAnswers, ScoreKind};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_answers(path: Option<&Path>) -> anyhow::Result<QuizAnswers> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading answers from {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(QuizAnswers::default()),
    }
}

async fn analyze(
    app: &mut WellnessApp,
    image: &Path,
    answers: Option<&Path>,
) -> anyhow::Result<()> {
    let data =
        std::fs::read(image).with_context(|| format!("reading image {}", image.display()))?;
    let answers = load_answers(answers)?;

    app.start()?;
    app.capture_photo(CapturedImage::new(media_type_for_path(image), data))?;
    app.confirm_photo()?;
    app.submit_quiz(answers)?;
    match app.analyze().await? {
        AnalysisOutcome::Completed(report) => {
            print_json(&app.displayed_result())?;
            for badge in &report.new_badges {
                println!("New badge: {} ({})", badge.title, badge.description);
            }
            println!(
                "+{} AP: level {} ({}/{})",
                report.award.points,
                report.award.after.level,
                report.award.after.ap,
                report.award.after.ap_for_next_level
            );
            for suggestion in app.goal_suggestions() {
                println!("Suggested goal: {}", suggestion.text);
            }
            Ok(())
        }
        AnalysisOutcome::Failed(message) => anyhow::bail!(message),
        AnalysisOutcome::Discarded | AnalysisOutcome::Skipped => {
            anyhow::bail!("analysis did not run")
        }
    }
}

fn build_client() -> anyhow::Result<Arc<dyn AnalysisClient>> {
    let config = Config::from_env()?;
    tracing::info!(model = %config.model, base = %config.base_url, "nutriaura: analysis client configured");
    let client = ReqwestAnalysisClient::from_config(&config)?;
    Ok(Arc::new(LoggingMiddleware::new(client)))
}

/// Placeholder used by commands that never reach the analysis service.
struct Offline;

#[async_trait::async_trait]
impl AnalysisClient for Offline {
    async fn analyze(
        &self,
        _image: &CapturedImage,
        _answers: &QuizAnswers,
        _location: Option<nutriaura_client::GeoLocation>,
    ) -> Result<nutriaura_client::AnalysisResult, nutriaura_client::AnalysisError> {
        Err(nutriaura_client::AnalysisError::Config(
            "analysis client not configured".into(),
        ))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `NUTRIAURA_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("NUTRIAURA_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    // Append per-target overrides to keep HTTP internals quiet by default
    let combined_filter = format!("{},hyper=warn,reqwest=warn", log_env);
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::debug!("nutriaura: log filter: {}", log_env);

    let command = Cli::parse().command;

    let config = AppConfig::from_env()?;
    let storage = Storage::new(Arc::new(JsonFileStore::new(&config.data_dir)));
    let client: Arc<dyn AnalysisClient> = match command {
        Command::Analyze { .. } => build_client()?,
        _ => Arc::new(Offline),
    };
    let locator: Arc<dyn LocationProvider> = match config.fixed_location {
        Some(location) => Arc::new(FixedLocation(location)),
        None => Arc::new(NoLocation),
    };
    let orchestrator = AnalysisOrchestrator::new(client)
        .with_locator(locator)
        .with_location_timeout(config.location_timeout);
    let mut app = WellnessApp::new(storage, orchestrator);

    match command {
        Command::Analyze { image, answers } => {
            analyze(&mut app, &image, answers.as_deref()).await?;
        }
        Command::Profile => {
            app.navigate_tab(Screen::Profile)?;
            let profile = app.profile();
            println!(
                "Level {} - {}/{} AP ({}%)",
                profile.level,
                profile.ap,
                profile.ap_for_next_level,
                profile.progress_percent()
            );
            for badge in app.earned_badges() {
                println!("Badge: {}", badge.title);
            }
            print_json(&app.leaderboard())?;
        }
        Command::History => {
            app.navigate_tab(Screen::Progress)?;
            for kind in ScoreKind::ALL {
                let series = app.history().series(kind);
                let values: Vec<String> = series
                    .iter()
                    .map(|p| format!("{} {}", p.label, p.value))
                    .collect();
                println!("{}: {}", kind.label(), values.join(", "));
            }
        }
        Command::Quests => {
            app.navigate_tab(Screen::Quests)?;
            let done = app.missions().memberships();
            for mission in app.missions().list() {
                let mark = if done.contains(mission.id) { "x" } else { " " };
                println!(
                    "[{mark}] {} - {} ({} AP)",
                    mission.id, mission.title, mission.ap_reward
                );
            }
        }
        Command::CompleteQuest { id } => match app.complete_mission(&id)? {
            Some(reward) => {
                println!("+{} AP for {}", reward.award.points, reward.mission.title);
                for badge in reward.new_badges {
                    println!("New badge: {}", badge.title);
                }
            }
            None => println!("{id} is already completed"),
        },
        Command::Challenges => {
            let joined = app.challenges().memberships();
            for challenge in app.challenges().list() {
                let mark = if joined.contains(challenge.id) { "joined" } else { "open" };
                println!(
                    "{} ({}, {}) - {}",
                    challenge.title, challenge.duration, mark, challenge.description
                );
            }
        }
        Command::JoinChallenge { id } => {
            if app.join_challenge(&id)? {
                println!("Joined {id}");
            } else {
                println!("Already joined {id}");
            }
        }
        Command::Forum => {
            app.navigate_tab(Screen::Forum)?;
            for tip in COMMUNITY_TIPS {
                println!("Tip: {tip}");
            }
            let now = Utc::now();
            for post in app.forum().posts() {
                println!(
                    "{} ({}): {}",
                    post.author,
                    time_since(&post.timestamp, now),
                    post.content
                );
            }
        }
        Command::Post { text } => {
            let post = app.forum().add_post(&text.join(" "))?;
            println!("Posted {}", post.id);
        }
        Command::Goals => {
            for goal in app.goals() {
                let mark = if goal.completed { "x" } else { " " };
                println!("[{mark}] {} {}", goal.id, goal.text);
            }
        }
        Command::AddGoal { text } => {
            let (goal, badges) = app.add_goal(&text.join(" "), GoalCategory::General)?;
            println!("Added goal {}", goal.id);
            for badge in badges {
                println!("New badge: {}", badge.title);
            }
        }
        Command::Theme => {
            let theme = app.preferences().toggle_theme();
            print_json(&theme)?;
        }
        Command::Chaos => {
            let on = app.preferences().toggle_novelty_mode();
            println!("Novelty mode {}", if on { "on" } else { "off" });
        }
    }

    Ok(())
}

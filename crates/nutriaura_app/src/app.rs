//! The wellness session: one user's navigation state plus the persistent
//! stores behind every screen.
//!
//! All mutation goes through `&mut self`. The only suspending step is the
//! analysis request, which [`WellnessApp::analyze`] runs inline; hosts that
//! need to keep handling input meanwhile use [`WellnessApp::begin_analysis`],
//! run [`AnalysisOrchestrator::execute`] themselves and hand the outcome back
//! through [`WellnessApp::complete_analysis`].

use std::sync::Arc;

use chrono::Utc;
use nutriaura_client::{AnalysisClient, AnalysisResult, CapturedImage, QuizAnswers};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::{Badge, Challenge, Mission};
use crate::error::{AppError, AppResult};
use crate::forum::ForumBoard;
use crate::goals::{Goal, GoalBook, GoalCategory, GoalSuggestion, suggestions};
use crate::history::{WellnessDataPoint, WellnessHistory};
use crate::leaderboard::{LeaderboardEntry, leaderboard};
use crate::navigation::{NavigationStack, Screen, ScreenMeta};
use crate::orchestrator::{
    AnalysisOrchestrator, AnalysisTicket, PipelineResult, Submission, user_message,
};
use crate::preferences::Preferences;
use crate::progression::{ANALYSIS_REWARD, Award, ProgressEvent, ProgressionEngine, UserProfile};
use crate::registry::{ChallengeRegistry, MissionRegistry};
use crate::store::Storage;

/// What a successful analysis changed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub result: AnalysisResult,
    pub award: AwardSummary,
    pub new_badges: Vec<&'static Badge>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AwardSummary {
    pub points: u32,
    pub before: UserProfile,
    pub after: UserProfile,
}

impl From<Award> for AwardSummary {
    fn from(award: Award) -> Self {
        Self {
            points: award.points,
            before: award.before,
            after: award.after,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisOutcome {
    Completed(AnalysisReport),
    /// The Error screen is showing this message.
    Failed(String),
    /// The result arrived for a screen visit that is no longer current.
    Discarded,
    /// Nothing to run: missing input, or this visit already ran.
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MissionReward {
    pub mission: &'static Mission,
    pub award: AwardSummary,
    pub new_badges: Vec<&'static Badge>,
}

struct InFlight {
    entry: u64,
    cancel: watch::Sender<bool>,
}

pub struct WellnessApp {
    nav: NavigationStack,
    progression: ProgressionEngine,
    missions: MissionRegistry,
    challenges: ChallengeRegistry,
    history: WellnessHistory,
    goals: GoalBook,
    forum: ForumBoard,
    preferences: Preferences,
    orchestrator: AnalysisOrchestrator,
    photo: Option<CapturedImage>,
    answers: Option<QuizAnswers>,
    result: Option<AnalysisResult>,
    error_message: Option<String>,
    in_flight: Option<InFlight>,
    last_run_entry: Option<u64>,
}

impl WellnessApp {
    pub fn new(storage: Storage, orchestrator: AnalysisOrchestrator) -> Self {
        Self {
            nav: NavigationStack::default(),
            progression: ProgressionEngine::new(storage.clone()),
            missions: MissionRegistry::missions(storage.clone()),
            challenges: ChallengeRegistry::challenges(storage.clone()),
            history: WellnessHistory::new(storage.clone()),
            goals: GoalBook::new(storage.clone()),
            forum: ForumBoard::new(storage.clone()),
            preferences: Preferences::new(storage),
            orchestrator,
            photo: None,
            answers: None,
            result: None,
            error_message: None,
            in_flight: None,
            last_run_entry: None,
        }
    }

    /// Session with the default orchestrator around `client`.
    pub fn with_client(storage: Storage, client: Arc<dyn AnalysisClient>) -> Self {
        Self::new(storage, AnalysisOrchestrator::new(client))
    }

    // ---- navigation -------------------------------------------------------

    pub fn current_screen(&self) -> Screen {
        self.nav.current()
    }

    pub fn stack(&self) -> Vec<Screen> {
        self.nav.screens()
    }

    pub fn screen_meta(&self) -> ScreenMeta {
        self.nav.current().meta()
    }

    pub fn shows_back_button(&self) -> bool {
        self.nav.shows_back_button()
    }

    fn expect_screen(&self, action: &'static str, screen: Screen) -> AppResult<()> {
        let current = self.nav.current();
        if current == screen {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                action,
                screen: current,
            })
        }
    }

    /// Cancel an in-flight analysis whose screen visit is no longer on top.
    fn after_navigation(&mut self) {
        let current = self.nav.current_entry();
        if let Some(job) = self.in_flight.take_if(|job| job.entry != current) {
            info!(entry = job.entry, "left the analysis screen; cancelling");
            job.cancel.send_replace(true);
        }
        debug!(screen = ?self.nav.current(), depth = self.nav.len(), "navigated");
    }

    pub fn start(&mut self) -> AppResult<()> {
        self.expect_screen("start", Screen::Welcome)?;
        self.nav.push(Screen::Camera);
        self.after_navigation();
        Ok(())
    }

    pub fn capture_photo(&mut self, image: CapturedImage) -> AppResult<()> {
        self.expect_screen("capture a photo", Screen::Camera)?;
        if image.is_empty() {
            return Err(AppError::Validation("captured image is empty".into()));
        }
        self.photo = Some(image);
        self.nav.push(Screen::ConfirmPhoto);
        self.after_navigation();
        Ok(())
    }

    pub fn retake_photo(&mut self) -> AppResult<()> {
        self.expect_screen("retake the photo", Screen::ConfirmPhoto)?;
        self.photo = None;
        self.nav.pop();
        self.after_navigation();
        Ok(())
    }

    pub fn confirm_photo(&mut self) -> AppResult<()> {
        self.expect_screen("confirm the photo", Screen::ConfirmPhoto)?;
        self.nav.push(Screen::Quiz);
        self.after_navigation();
        Ok(())
    }

    /// Record the questionnaire and move to the Analyzing screen.
    pub fn submit_quiz(&mut self, answers: QuizAnswers) -> AppResult<()> {
        self.expect_screen("submit the quiz", Screen::Quiz)?;
        answers
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.answers = Some(answers);
        self.nav.reset_to(Screen::Analyzing);
        self.after_navigation();
        Ok(())
    }

    pub fn navigate_tab(&mut self, tab: Screen) -> AppResult<()> {
        if !tab.meta().is_lateral_tab {
            return Err(AppError::Validation(format!("{tab:?} is not a tab")));
        }
        self.nav.reset_to(tab);
        self.after_navigation();
        Ok(())
    }

    pub fn open_algorithm_info(&mut self) -> AppResult<()> {
        self.expect_screen("open the algorithm info", Screen::Profile)?;
        self.nav.push(Screen::AlgorithmInfo);
        self.after_navigation();
        Ok(())
    }

    /// Pop one screen. Returns the screen left, or `None` at the root.
    pub fn back(&mut self) -> Option<Screen> {
        let left = self.nav.pop();
        self.after_navigation();
        left
    }

    /// Drop the session's transient state and return to Welcome.
    pub fn reset(&mut self) {
        self.photo = None;
        self.answers = None;
        self.result = None;
        self.error_message = None;
        self.nav.reset_to(Screen::Welcome);
        self.after_navigation();
    }

    // ---- analysis ---------------------------------------------------------

    pub fn orchestrator(&self) -> &AnalysisOrchestrator {
        &self.orchestrator
    }

    pub fn photo(&self) -> Option<&CapturedImage> {
        self.photo.as_ref()
    }

    /// Claim the analysis job for the current Analyzing visit.
    ///
    /// `Ok(None)` when there is nothing to do: the photo or answers are
    /// missing, or this visit already ran its job.
    pub fn begin_analysis(&mut self) -> AppResult<Option<AnalysisTicket>> {
        self.expect_screen("start an analysis", Screen::Analyzing)?;
        let entry = self.nav.current_entry();
        if self.in_flight.is_some() {
            return Err(AppError::AnalysisInFlight);
        }
        if self.last_run_entry == Some(entry) {
            debug!(entry, "analysis already ran for this visit");
            return Ok(None);
        }
        let (Some(image), Some(answers)) = (&self.photo, &self.answers) else {
            warn!("analysis requested without a photo and answers; ignoring");
            return Ok(None);
        };
        let submission = Submission {
            image: image.clone(),
            answers: answers.clone(),
        };
        let (cancel, cancel_rx) = watch::channel(false);
        self.in_flight = Some(InFlight { entry, cancel });
        self.last_run_entry = Some(entry);
        info!(entry, "analysis started");
        Ok(Some(AnalysisTicket::new(entry, submission, cancel_rx)))
    }

    /// Apply the outcome of `ticket`'s job, unless the user has moved on.
    pub fn complete_analysis(
        &mut self,
        ticket: AnalysisTicket,
        outcome: PipelineResult,
    ) -> AppResult<AnalysisOutcome> {
        let entry = ticket.entry();
        if self.in_flight.as_ref().is_some_and(|job| job.entry == entry) {
            self.in_flight = None;
        }
        if self.nav.current() != Screen::Analyzing || self.nav.current_entry() != entry {
            debug!(entry, "discarding result for a stale visit");
            return Ok(AnalysisOutcome::Discarded);
        }
        match outcome {
            PipelineResult::Cancelled => Ok(AnalysisOutcome::Discarded),
            PipelineResult::Success(result) => self.apply_success(result),
            PipelineResult::Failure(e) => {
                warn!(error = %e, "analysis failed");
                let message = user_message(&e);
                self.error_message = Some(message.clone());
                self.nav.reset_to(Screen::Error);
                self.after_navigation();
                Ok(AnalysisOutcome::Failed(message))
            }
        }
    }

    fn apply_success(&mut self, result: AnalysisResult) -> AppResult<AnalysisOutcome> {
        let total = self
            .history
            .append(WellnessDataPoint::new(Utc::now(), result.scores));
        let award = self.progression.award_points(ANALYSIS_REWARD)?;
        let mut new_badges = self.progression.evaluate(&ProgressEvent::AnalysisCompleted);
        new_badges.extend(
            self.progression
                .evaluate(&ProgressEvent::PointsAwarded(award.after)),
        );
        info!(
            history = total,
            level = award.after.level,
            badges = new_badges.len(),
            "analysis completed"
        );
        self.result = Some(result.clone());
        self.error_message = None;
        self.nav.reset_to(Screen::Results);
        self.after_navigation();
        Ok(AnalysisOutcome::Completed(AnalysisReport {
            result,
            award: award.into(),
            new_badges,
        }))
    }

    /// Claim, execute and apply in one step.
    pub async fn analyze(&mut self) -> AppResult<AnalysisOutcome> {
        let Some(ticket) = self.begin_analysis()? else {
            return Ok(AnalysisOutcome::Skipped);
        };
        let outcome = self.orchestrator.execute(&ticket).await;
        self.complete_analysis(ticket, outcome)
    }

    /// The latest result as it should be displayed.
    pub fn displayed_result(&self) -> Option<AnalysisResult> {
        self.result.as_ref().map(|r| self.preferences.present(r))
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn goal_suggestions(&self) -> Vec<GoalSuggestion> {
        self.result
            .as_ref()
            .map(|r| suggestions(&r.scores))
            .unwrap_or_default()
    }

    // ---- progression ------------------------------------------------------

    pub fn profile(&self) -> UserProfile {
        self.progression.profile()
    }

    pub fn earned_badges(&self) -> Vec<&'static Badge> {
        let badges = self.progression.badges();
        let earned = badges.memberships();
        badges
            .list()
            .iter()
            .filter(|b| earned.contains(b.id))
            .collect()
    }

    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        leaderboard(&self.profile())
    }

    pub fn missions(&self) -> &MissionRegistry {
        &self.missions
    }

    pub fn challenges(&self) -> &ChallengeRegistry {
        &self.challenges
    }

    /// Award a mission's points once. `Ok(None)` if it was already completed.
    pub fn complete_mission(&mut self, id: &str) -> AppResult<Option<MissionReward>> {
        let mission = self
            .missions
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("mission {id}")))?;
        if self.missions.contains(id) {
            debug!(mission = id, "mission already completed");
            return Ok(None);
        }
        let award = self.progression.award_points(mission.ap_reward)?;
        self.missions.grant(id)?;
        let new_badges = self
            .progression
            .evaluate(&ProgressEvent::PointsAwarded(award.after));
        info!(mission = id, points = mission.ap_reward, "mission completed");
        Ok(Some(MissionReward {
            mission,
            award: award.into(),
            new_badges,
        }))
    }

    /// Join a challenge. Returns `false` if already joined.
    pub fn join_challenge(&mut self, id: &str) -> AppResult<bool> {
        let joined = self.challenges.grant(id)?;
        if joined {
            info!(challenge = id, "challenge joined");
        }
        Ok(joined)
    }

    pub fn joined_challenges(&self) -> Vec<&'static Challenge> {
        let joined = self.challenges.memberships();
        self.challenges
            .list()
            .iter()
            .filter(|c| joined.contains(c.id))
            .collect()
    }

    // ---- goals ------------------------------------------------------------

    pub fn goals(&self) -> Vec<Goal> {
        self.goals.list()
    }

    fn goals_changed(&self) -> Vec<&'static Badge> {
        let total = self.goals.list().len();
        self.progression
            .evaluate(&ProgressEvent::GoalsChanged { total })
    }

    /// Add a goal; returns it with any badge the new total unlocked.
    pub fn add_goal(
        &mut self,
        text: &str,
        category: GoalCategory,
    ) -> AppResult<(Goal, Vec<&'static Badge>)> {
        let goal = self.goals.add(text, category)?;
        Ok((goal, self.goals_changed()))
    }

    pub fn toggle_goal(&mut self, id: &str) -> AppResult<bool> {
        let completed = self.goals.toggle(id)?;
        self.goals_changed();
        Ok(completed)
    }

    pub fn remove_goal(&mut self, id: &str) -> AppResult<Goal> {
        let goal = self.goals.remove(id)?;
        self.goals_changed();
        Ok(goal)
    }

    // ---- other stores -----------------------------------------------------

    pub fn history(&self) -> &WellnessHistory {
        &self.history
    }

    pub fn forum(&self) -> &ForumBoard {
        &self.forum
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }
}

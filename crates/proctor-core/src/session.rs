//! The exam session controller: state machine, countdown, and
//! write-through persistence of in-progress answers.
//!
//! Execution is single-threaded and cooperative — timer ticks, learner
//! input, and network completions interleave on one control flow. The
//! state machine is the sole submission gate: entering
//! [`SessionState::Submitting`] pauses the timer and blocks any second
//! submission until the first one resolves.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use crate::error::CoreError;
use crate::model::{AnswerMap, AnswerValue, Assessment, Question, QuestionKind};
use crate::results::SessionTiming;
use crate::store::{DraftMap, DraftStore};
use crate::timer::{CountdownTimer, TimerEvent};

/// Lifecycle states of an exam session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Intro,
    InProgress,
    Submitting,
    Results,
}

/// A live exam-taking session over one assessment.
///
/// Every answer mutation (including free-text drafts) is written
/// through to the [`DraftStore`] synchronously, so a crash or reload
/// resumes exactly where the learner left off.
pub struct ExamSession {
    assessment: Assessment,
    store: Arc<dyn DraftStore>,
    state: SessionState,
    timer: CountdownTimer,
    answers: AnswerMap,
    drafts: DraftMap,
    /// Presentation order as indices into `assessment.questions`.
    order: Vec<usize>,
    /// Position within `order`.
    current: usize,
    started_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for ExamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExamSession")
            .field("assessment", &self.assessment)
            .field("state", &self.state)
            .field("timer", &self.timer)
            .field("answers", &self.answers)
            .field("drafts", &self.drafts)
            .field("order", &self.order)
            .field("current", &self.current)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl ExamSession {
    /// Open a session, resuming any persisted answers and drafts.
    pub fn new(assessment: Assessment, store: Arc<dyn DraftStore>) -> Result<Self, CoreError> {
        if !assessment.settings.is_published {
            return Err(CoreError::Validation(format!(
                "assessment '{}' is not published",
                assessment.id
            )));
        }

        let answers = store.load_responses(&assessment.id);
        let drafts = store.load_drafts(&assessment.id);
        if !answers.is_empty() || !drafts.is_empty() {
            tracing::info!(
                assessment_id = %assessment.id,
                answers = answers.len(),
                drafts = drafts.len(),
                "resuming persisted session state"
            );
        }

        let order = (0..assessment.questions.len()).collect();
        let timer = CountdownTimer::new(assessment.time_limit_seconds());

        Ok(Self {
            assessment,
            store,
            state: SessionState::Idle,
            timer,
            answers,
            drafts,
            order,
            current: 0,
            started_at: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn assessment(&self) -> &Assessment {
        &self.assessment
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining_seconds()
    }

    /// Questions in presentation order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> + '_ {
        self.order.iter().map(|&i| &self.assessment.questions[i])
    }

    /// The question currently in front of the learner.
    pub fn current_question(&self) -> Option<&Question> {
        self.order
            .get(self.current)
            .map(|&i| &self.assessment.questions[i])
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// How many questions count as answered.
    pub fn answered_count(&self) -> usize {
        self.assessment
            .questions
            .iter()
            .filter(|q| crate::scoring::is_answered(q, self.answers.get(&q.id)))
            .count()
    }

    /// Show the intro screen once the resolver says the test is ready.
    pub fn begin_intro(&mut self) -> Result<(), CoreError> {
        self.expect_state(SessionState::Idle, "begin_intro")?;
        self.state = SessionState::Intro;
        Ok(())
    }

    /// Start the exam: arms the timer and fixes the presentation order.
    pub fn start(&mut self) -> Result<(), CoreError> {
        self.expect_state(SessionState::Intro, "start")?;

        if self.assessment.settings.shuffle_questions {
            self.order.shuffle(&mut rand::thread_rng());
        }

        self.started_at = Some(Utc::now());
        self.state = SessionState::InProgress;
        tracing::info!(
            assessment_id = %self.assessment.id,
            time_limit_secs = self.assessment.time_limit_seconds(),
            "session started"
        );
        Ok(())
    }

    /// Advance the countdown by one second. No-op outside `InProgress`.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.state != SessionState::InProgress {
            return None;
        }
        let event = self.timer.tick();
        if let Some(e) = &event {
            tracing::debug!(?e, remaining = self.timer.remaining_seconds(), "timer event");
        }
        event
    }

    /// Commit an mcq selection.
    pub fn select_option(&mut self, question_id: &str, option_text: &str) -> Result<(), CoreError> {
        self.expect_state(SessionState::InProgress, "select_option")?;
        let question = self.require_question(question_id)?;
        if question.kind != QuestionKind::Mcq {
            return Err(CoreError::Validation(format!(
                "question '{question_id}' is {}, not mcq",
                question.kind
            )));
        }
        if !question.options.iter().any(|o| o.text == option_text) {
            return Err(CoreError::Validation(format!(
                "question '{question_id}' has no option '{option_text}'"
            )));
        }

        self.answers
            .insert(question_id.to_string(), AnswerValue::Text(option_text.to_string()));
        self.persist_answers()
    }

    /// Commit a true-false selection. `false` is a real answer.
    pub fn set_true_false(&mut self, question_id: &str, value: bool) -> Result<(), CoreError> {
        self.expect_state(SessionState::InProgress, "set_true_false")?;
        let question = self.require_question(question_id)?;
        if question.kind != QuestionKind::TrueFalse {
            return Err(CoreError::Validation(format!(
                "question '{question_id}' is {}, not true-false",
                question.kind
            )));
        }

        self.answers
            .insert(question_id.to_string(), AnswerValue::Flag(value));
        self.persist_answers()
    }

    /// Record free text as it is typed, before it counts as an answer.
    pub fn update_draft(&mut self, question_id: &str, text: &str) -> Result<(), CoreError> {
        self.expect_state(SessionState::InProgress, "update_draft")?;
        let question = self.require_question(question_id)?;
        if !matches!(question.kind, QuestionKind::ShortAnswer | QuestionKind::Essay) {
            return Err(CoreError::Validation(format!(
                "question '{question_id}' is {}, which takes no free text",
                question.kind
            )));
        }

        self.drafts.insert(question_id.to_string(), text.to_string());
        self.persist_drafts()
    }

    /// Flush a free-text draft into the committed answer map. A draft
    /// that trims to empty clears the committed answer instead.
    pub fn commit_draft(&mut self, question_id: &str) -> Result<(), CoreError> {
        let Some(text) = self.drafts.get(question_id).cloned() else {
            return Ok(());
        };

        if text.trim().is_empty() {
            self.answers.remove(question_id);
        } else {
            self.answers
                .insert(question_id.to_string(), AnswerValue::Text(text));
        }
        self.persist_answers()
    }

    /// Jump to a question by presentation position, flushing the
    /// current draft first. Next/Previous are thin wrappers, so every
    /// navigation path commits pending free text.
    pub fn goto(&mut self, position: usize) -> Result<(), CoreError> {
        self.expect_state(SessionState::InProgress, "goto")?;
        if position >= self.order.len() {
            return Err(CoreError::Validation(format!(
                "question position {position} out of range ({} questions)",
                self.order.len()
            )));
        }

        self.flush_current_draft()?;
        self.current = position;
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), CoreError> {
        let target = (self.current + 1).min(self.order.len().saturating_sub(1));
        self.goto(target)
    }

    pub fn previous(&mut self) -> Result<(), CoreError> {
        let target = self.current.saturating_sub(1);
        self.goto(target)
    }

    /// Enter `Submitting`: stops the timer and takes the single
    /// submission slot. Rejected unless the session is `InProgress`, so
    /// a user click racing the expiry path can never dispatch twice.
    pub fn begin_submission(&mut self) -> Result<(), CoreError> {
        self.expect_state(SessionState::InProgress, "begin_submission")?;
        self.flush_current_draft()?;
        self.timer.pause();
        self.state = SessionState::Submitting;
        Ok(())
    }

    /// Return to `InProgress` after a failed submission; the timer
    /// resumes and no answers are lost.
    pub fn submission_failed(&mut self) {
        if self.state == SessionState::Submitting {
            self.state = SessionState::InProgress;
            self.timer.resume();
        }
    }

    /// Finalize after a confirmed successful submission; clears the
    /// persisted draft state.
    pub fn complete(&mut self) -> Result<(), CoreError> {
        self.expect_state(SessionState::Submitting, "complete")?;
        self.state = SessionState::Results;
        if let Err(e) = self.store.clear(&self.assessment.id) {
            // The submission already landed; stale local state is the
            // lesser problem.
            tracing::warn!(assessment_id = %self.assessment.id, error = %e, "failed to clear draft store");
        }
        Ok(())
    }

    /// Timer readings for the scoring engine.
    pub fn timing(&self) -> SessionTiming {
        let now = Utc::now();
        SessionTiming {
            time_limit_seconds: self.assessment.time_limit_seconds(),
            remaining_seconds: self.timer.remaining_seconds(),
            started_at: self.started_at.unwrap_or(now),
            ended_at: now,
        }
    }

    fn flush_current_draft(&mut self) -> Result<(), CoreError> {
        if let Some(question) = self.current_question() {
            let id = question.id.clone();
            self.commit_draft(&id)?;
        }
        Ok(())
    }

    fn expect_state(&self, expected: SessionState, action: &'static str) -> Result<(), CoreError> {
        if self.state != expected {
            return Err(CoreError::InvalidTransition {
                state: self.state,
                action,
            });
        }
        Ok(())
    }

    fn require_question(&self, question_id: &str) -> Result<&Question, CoreError> {
        self.assessment
            .question(question_id)
            .ok_or_else(|| CoreError::Validation(format!("unknown question '{question_id}'")))
    }

    fn persist_answers(&self) -> Result<(), CoreError> {
        self.store.save_responses(&self.assessment.id, &self.answers)
    }

    fn persist_drafts(&self) -> Result<(), CoreError> {
        self.store.save_drafts(&self.assessment.id, &self.drafts)
    }
}

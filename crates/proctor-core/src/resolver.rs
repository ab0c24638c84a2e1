//! Assignment resolution: which aptitude test, if any, a learner must take.
//!
//! The backend records the assigned test id in several inconsistent
//! shapes (plain hex string, object wrapping an `_id`, stringified
//! object). All of that is funneled through [`normalize_test_id`] with a
//! fixed precedence order instead of ad hoc checks at each call site.

use serde_json::Value;

use crate::error::CoreError;
use crate::model::{Enrollment, PendingTest};

/// How many resolution passes may run before the flow is declared stuck.
pub const MAX_RESOLUTION_ATTEMPTS: u32 = 3;

/// Outcome of a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentDecision {
    /// No usable test is assigned; the caller should request assignment
    /// and resolve again.
    RequiresAssignment,
    /// A test is assigned and can be started.
    Ready { test_id: String },
    /// The learner already took the test and did not pass.
    AlreadyFailed { test_id: String },
    /// Every relevant enrollment is completed and passed.
    NoActionNeeded,
}

/// Explicit attempt counter threaded through resolution calls.
///
/// The counter is carried in call context rather than ambient state: it
/// is armed by each pass, cleared on every settled decision, and trips
/// [`CoreError::RedirectLoop`] once a caller keeps re-resolving without
/// ever settling.
#[derive(Debug, Default, Clone)]
pub struct ResolutionContext {
    attempts: u32,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn record_attempt(&mut self) -> Result<(), CoreError> {
        self.attempts += 1;
        if self.attempts > MAX_RESOLUTION_ATTEMPTS {
            return Err(CoreError::RedirectLoop {
                attempts: self.attempts,
            });
        }
        Ok(())
    }

    fn settle(&mut self) {
        self.attempts = 0;
    }
}

/// Decide what to do about a learner's aptitude test.
///
/// Pending-test entries win over enrollment records: the first entry
/// (API response order) with a resolvable identifier is taken. Only
/// enrollments with `is_enrolled` set are considered after that.
pub fn resolve_assignment(
    pending: &[PendingTest],
    enrollments: &[Enrollment],
    ctx: &mut ResolutionContext,
) -> Result<AssignmentDecision, CoreError> {
    ctx.record_attempt()?;

    for entry in pending {
        if let Some(test_id) = normalize_test_id(&entry.test_id) {
            tracing::debug!(%test_id, "resolved from pending-assessments entry");
            ctx.settle();
            return Ok(AssignmentDecision::Ready { test_id });
        }
    }

    for enrollment in enrollments.iter().filter(|e| e.is_enrolled) {
        let Some(raw) = &enrollment.aptitude_test_id else {
            return Ok(AssignmentDecision::RequiresAssignment);
        };

        if !enrollment.aptitude_test_completed {
            return match normalize_test_id(raw) {
                Some(test_id) => {
                    ctx.settle();
                    Ok(AssignmentDecision::Ready { test_id })
                }
                None => {
                    tracing::warn!(
                        class_id = %enrollment.class_id,
                        "assigned test id is unresolvable; requesting reassignment"
                    );
                    Ok(AssignmentDecision::RequiresAssignment)
                }
            };
        }

        if !enrollment.aptitude_test_passed {
            ctx.settle();
            let test_id = normalize_test_id(raw).unwrap_or_else(|| raw.to_string());
            return Ok(AssignmentDecision::AlreadyFailed { test_id });
        }
    }

    ctx.settle();
    Ok(AssignmentDecision::NoActionNeeded)
}

/// Normalize a test identifier from any of the backend's shapes.
///
/// Precedence: direct hex match in a plain string, then a nested `_id`
/// field, then a scan of the stringified value. Returns `None` when no
/// 24-hex-char identifier can be extracted.
pub fn normalize_test_id(raw: &Value) -> Option<String> {
    match raw {
        Value::Null => None,
        Value::String(s) => find_hex24(s),
        Value::Object(map) => map
            .get("_id")
            .and_then(|id| match id {
                Value::String(s) => find_hex24(s),
                other => find_hex24(&other.to_string()),
            })
            .or_else(|| find_hex24(&raw.to_string())),
        other => find_hex24(&other.to_string()),
    }
}

/// First run of 24 consecutive ASCII hex digits in `s`.
///
/// A longer run yields its first 24 characters, matching how the
/// backend's object-id regex behaves.
pub fn find_hex24(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut run = 0usize;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_hexdigit() {
            run += 1;
            if run == 24 {
                return Some(s[i + 1 - 24..=i].to_string());
            }
        } else {
            run = 0;
        }
    }
    None
}

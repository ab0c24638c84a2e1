//! The `proctor status` command.

use std::path::PathBuf;

use anyhow::Result;

use proctor_client::{create_api, load_config_from};
use proctor_core::resolver::{resolve_assignment, AssignmentDecision, ResolutionContext};
use proctor_core::traits::LearningApi;

pub async fn execute(student: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let student_id = student
        .or(config.student_id.clone())
        .ok_or_else(|| anyhow::anyhow!("no student id given (use --student or set student_id)"))?;

    let api = create_api(&config);
    let pending = api.pending_assessments(&student_id).await?;
    let enrollments = api.enrollments(&student_id).await?;
    tracing::debug!(
        pending = pending.len(),
        enrollments = enrollments.len(),
        "fetched assignment data"
    );

    let mut ctx = ResolutionContext::new();
    let decision = resolve_assignment(&pending, &enrollments, &mut ctx)?;

    match decision {
        AssignmentDecision::RequiresAssignment => {
            println!("Student {student_id} has no usable aptitude test assigned.");
            println!("Run: proctor assign --student {student_id}");
        }
        AssignmentDecision::Ready { test_id } => {
            println!("Student {student_id} can start aptitude test {test_id}.");
        }
        AssignmentDecision::AlreadyFailed { test_id } => {
            println!("Student {student_id} already failed aptitude test {test_id}.");
        }
        AssignmentDecision::NoActionNeeded => {
            println!("Student {student_id} has passed every required aptitude test.");
        }
    }

    Ok(())
}

//! The `proctor assign` command.

use std::path::PathBuf;

use anyhow::Result;

use proctor_client::{create_api, load_config_from};
use proctor_core::traits::LearningApi;

pub async fn execute(student: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let student_id = student
        .or(config.student_id.clone())
        .ok_or_else(|| anyhow::anyhow!("no student id given (use --student or set student_id)"))?;

    let api = create_api(&config);
    api.assign_tests(&student_id).await?;

    println!("Assignment requested for student {student_id}.");
    println!("Run: proctor status --student {student_id}");
    Ok(())
}

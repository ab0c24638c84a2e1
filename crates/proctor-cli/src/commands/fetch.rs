//! The `proctor fetch` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use proctor_client::{create_api, load_config_from};
use proctor_core::traits::LearningApi;
use proctor_core::validation::validate_assessment;

pub async fn execute(
    assessment_id: String,
    out: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let api = create_api(&config);

    let assessment = api.assessment(&assessment_id).await?;

    let json = serde_json::to_string_pretty(&assessment)?;
    std::fs::write(&out, json).with_context(|| format!("failed to write {}", out.display()))?;

    println!(
        "Fetched '{}' ({} questions, {} points) to {}",
        assessment.title,
        assessment.questions.len(),
        assessment.max_possible_score(),
        out.display()
    );

    let warnings = validate_assessment(&assessment);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    Ok(())
}

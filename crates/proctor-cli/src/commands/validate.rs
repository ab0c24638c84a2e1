//! The `proctor validate` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use proctor_core::model::Assessment;
use proctor_core::validation::validate_assessment;

pub fn execute(path: PathBuf) -> Result<()> {
    let files = if path.is_dir() {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        anyhow::ensure!(!files.is_empty(), "no .json files in {}", path.display());
        files
    } else {
        vec![path]
    };

    let mut total_warnings = 0;

    for file in &files {
        let assessment = load_assessment(file)?;
        println!(
            "Assessment: {} ({} questions)",
            assessment.title,
            assessment.questions.len()
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
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All assessments valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn load_assessment(path: &Path) -> Result<Assessment> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

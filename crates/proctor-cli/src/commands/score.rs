//! The `proctor score` command: offline grading of a response sheet.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{Cell, Table};

use proctor_core::model::{AnswerMap, Assessment};
use proctor_core::results::{AssessmentResult, SessionTiming};
use proctor_core::scoring;

pub fn execute(
    assessment_path: PathBuf,
    responses_path: PathBuf,
    elapsed: Option<u32>,
    out: Option<PathBuf>,
) -> Result<()> {
    let assessment: Assessment = read_json(&assessment_path)?;
    let answers: AnswerMap = read_json(&responses_path)?;

    let limit = assessment.time_limit_seconds();
    let elapsed = elapsed.unwrap_or(limit).min(limit);
    let now = Utc::now();
    let timing = SessionTiming {
        time_limit_seconds: limit,
        remaining_seconds: limit.saturating_sub(elapsed),
        started_at: now - chrono::Duration::seconds(i64::from(elapsed)),
        ended_at: now,
    };

    let result = scoring::score(&assessment, &answers, &timing);
    print_breakdown(&assessment, &result);

    if let Some(path) = out {
        result
            .save_json(&path)
            .with_context(|| format!("failed to save result to {}", path.display()))?;
        println!("Result saved to: {}", path.display());
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_breakdown(assessment: &Assessment, result: &AssessmentResult) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Kind", "Answered", "Correct", "Score"]);

    for response in &result.question_responses {
        let kind = assessment
            .question(&response.question_id)
            .map(|q| q.kind.to_string())
            .unwrap_or_default();
        let points = assessment
            .question(&response.question_id)
            .map(|q| q.points)
            .unwrap_or_default();
        let correct = if response.needs_review {
            "review"
        } else if response.is_correct {
            "yes"
        } else {
            "no"
        };
        table.add_row(vec![
            Cell::new(&response.question_id),
            Cell::new(kind),
            Cell::new(if response.selected_answer.is_some() { "yes" } else { "no" }),
            Cell::new(correct),
            Cell::new(format!("{}/{points}", response.score)),
        ]);
    }

    println!("{table}");
    println!(
        "Total: {}/{} ({:.1}%) — {}",
        result.total_score,
        result.max_possible_score,
        result.percentage_score,
        if result.is_passed { "PASSED" } else { "FAILED" }
    );

    if !result.skill_scores.is_empty() {
        let mut skills = Table::new();
        skills.set_header(vec!["Skill", "Mastery"]);
        for (tag, pct) in &result.skill_scores {
            skills.add_row(vec![Cell::new(tag), Cell::new(format!("{pct:.1}%"))]);
        }
        println!("{skills}");
    }
}

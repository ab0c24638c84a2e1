//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn proctor() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("proctor").unwrap()
}

const ASSESSMENT_JSON: &str = r#"{
    "id": "66f2a9c1b4e8d05a3c7f1e20",
    "title": "Algebra Aptitude",
    "type": "aptitude",
    "classId": "class-9",
    "subjectId": "math",
    "questions": [
        {
            "id": "q1",
            "text": "2 + 2 = ?",
            "type": "mcq",
            "options": [
                {"text": "3"},
                {"text": "4", "isCorrect": true}
            ],
            "points": 2,
            "tags": ["arithmetic"]
        },
        {
            "id": "q2",
            "text": "3 * 3 = ?",
            "type": "mcq",
            "options": [
                {"text": "9", "isCorrect": true},
                {"text": "7"}
            ],
            "points": 3,
            "tags": ["arithmetic"]
        }
    ],
    "totalPoints": 5,
    "passingScore": 60,
    "settings": {"timeLimitMinutes": 10, "isPublished": true}
}"#;

fn write_fixtures(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let assessment = dir.path().join("assessment.json");
    let responses = dir.path().join("responses.json");
    std::fs::write(&assessment, ASSESSMENT_JSON).unwrap();
    std::fs::write(&responses, r#"{"q1": "4", "q2": "7"}"#).unwrap();
    (assessment, responses)
}

#[test]
fn score_partial_credit() {
    let dir = TempDir::new().unwrap();
    let (assessment, responses) = write_fixtures(&dir);

    proctor()
        .arg("score")
        .arg("--assessment")
        .arg(&assessment)
        .arg("--responses")
        .arg(&responses)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 2/5 (40.0%)"))
        .stdout(predicate::str::contains("FAILED"))
        .stdout(predicate::str::contains("arithmetic"));
}

#[test]
fn score_full_marks_passes() {
    let dir = TempDir::new().unwrap();
    let (assessment, _) = write_fixtures(&dir);
    let responses = dir.path().join("full.json");
    std::fs::write(&responses, r#"{"q1": "4", "q2": "9"}"#).unwrap();

    proctor()
        .arg("score")
        .arg("--assessment")
        .arg(&assessment)
        .arg("--responses")
        .arg(&responses)
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 5/5 (100.0%)"))
        .stdout(predicate::str::contains("PASSED"));
}

#[test]
fn score_writes_result_json() {
    let dir = TempDir::new().unwrap();
    let (assessment, responses) = write_fixtures(&dir);
    let out = dir.path().join("result.json");

    proctor()
        .arg("score")
        .arg("--assessment")
        .arg(&assessment)
        .arg("--responses")
        .arg(&responses)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(saved["totalScore"], 2);
    assert_eq!(saved["maxPossibleScore"], 5);
    assert_eq!(saved["skillScores"]["arithmetic"], 40.0);
}

#[test]
fn score_missing_file_errors() {
    proctor()
        .arg("score")
        .arg("--assessment")
        .arg("nonexistent.json")
        .arg("--responses")
        .arg("also-missing.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_clean_assessment() {
    let dir = TempDir::new().unwrap();
    let (assessment, _) = write_fixtures(&dir);

    proctor()
        .arg("validate")
        .arg("--assessment")
        .arg(&assessment)
        .assert()
        .success()
        .stdout(predicate::str::contains("Algebra Aptitude (2 questions)"))
        .stdout(predicate::str::contains("All assessments valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.json");
    // No correct option and a 0-point question.
    std::fs::write(
        &broken,
        r#"{
            "id": "66f2a9c1b4e8d05a3c7f1e20",
            "title": "Broken",
            "type": "chapter-test",
            "classId": "c1",
            "subjectId": "math",
            "questions": [{
                "id": "q1",
                "text": "?",
                "type": "mcq",
                "options": [{"text": "a"}],
                "points": 0
            }],
            "passingScore": 60,
            "settings": {"timeLimitMinutes": 10, "isPublished": true}
        }"#,
    )
    .unwrap();

    proctor()
        .arg("validate")
        .arg("--assessment")
        .arg(&broken)
        .assert()
        .success()
        .stdout(predicate::str::contains("no correct option"))
        .stdout(predicate::str::contains("0 points"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("algebra.json"), ASSESSMENT_JSON).unwrap();

    proctor()
        .arg("validate")
        .arg("--assessment")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Algebra Aptitude"));
}

#[test]
fn validate_nonexistent_file() {
    proctor()
        .arg("validate")
        .arg("--assessment")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_config_then_skips() {
    let dir = TempDir::new().unwrap();

    proctor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created proctor.toml"));

    assert!(dir.path().join("proctor.toml").exists());

    proctor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn drafts_empty_directory() {
    let dir = TempDir::new().unwrap();

    proctor()
        .arg("drafts")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No draft state"));
}

#[test]
fn drafts_lists_and_discards() {
    use proctor_core::model::{AnswerMap, AnswerValue};
    use proctor_core::store::{DraftStore, JsonDraftStore};

    let dir = TempDir::new().unwrap();
    let store = JsonDraftStore::new(dir.path());
    let answers = AnswerMap::from([("q1".to_string(), AnswerValue::from("4"))]);
    store
        .save_responses("66f2a9c1b4e8d05a3c7f1e20", &answers)
        .unwrap();

    proctor()
        .arg("drafts")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("66f2a9c1b4e8d05a3c7f1e20"))
        .stdout(predicate::str::contains("1 committed answer(s)"));

    proctor()
        .arg("drafts")
        .arg("--dir")
        .arg(dir.path())
        .arg("--discard")
        .arg("66f2a9c1b4e8d05a3c7f1e20")
        .assert()
        .success()
        .stdout(predicate::str::contains("Discarded"));

    assert!(store.list().is_empty());
}

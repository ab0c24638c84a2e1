//! Durable local storage for in-progress answer state.
//!
//! Two logical keys exist per assessment: `{assessment_id}:responses`
//! (committed answers) and `{assessment_id}:drafts` (free-text drafts
//! not yet committed). Both are cleared only after a confirmed
//! successful submission. Unparsable persisted state loads as empty —
//! a corrupt draft must never block a learner from starting.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::CoreError;
use crate::model::AnswerMap;

/// Free-text drafts keyed by question id.
pub type DraftMap = HashMap<String, String>;

/// Logical key for the committed-answer map of an assessment.
pub fn responses_key(assessment_id: &str) -> String {
    format!("{assessment_id}:responses")
}

/// Logical key for the draft map of an assessment.
pub fn drafts_key(assessment_id: &str) -> String {
    format!("{assessment_id}:drafts")
}

/// Durable store for per-assessment session state.
///
/// Loads are infallible by design: missing or corrupt state degrades to
/// empty. Writes surface their errors so the session can tell the
/// learner that persistence is broken.
pub trait DraftStore: Send + Sync {
    fn load_responses(&self, assessment_id: &str) -> AnswerMap;
    fn save_responses(&self, assessment_id: &str, responses: &AnswerMap) -> Result<(), CoreError>;
    fn load_drafts(&self, assessment_id: &str) -> DraftMap;
    fn save_drafts(&self, assessment_id: &str, drafts: &DraftMap) -> Result<(), CoreError>;
    /// Remove both keys for the assessment.
    fn clear(&self, assessment_id: &str) -> Result<(), CoreError>;
}

/// File-backed store: one JSON document per logical key under a root
/// directory, with `:` mapped to `.` in file names.
pub struct JsonDraftStore {
    root: PathBuf,
}

impl JsonDraftStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key.replace(':', ".")))
    }

    fn read_map<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return T::default(),
        };
        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unparsable draft state");
                T::default()
            }
        }
    }

    fn write_map<T: serde::Serialize>(&self, key: &str, map: &T) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| CoreError::Store(format!("failed to create {}: {e}", self.root.display())))?;
        let path = self.path_for(key);
        let json = serde_json::to_string(map)
            .map_err(|e| CoreError::Store(format!("failed to serialize {key}: {e}")))?;
        std::fs::write(&path, json)
            .map_err(|e| CoreError::Store(format!("failed to write {}: {e}", path.display())))
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Store(format!(
                "failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    /// Assessment ids with any persisted state under the root.
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter_map(|name| {
                name.strip_suffix(".responses.json")
                    .or_else(|| name.strip_suffix(".drafts.json"))
                    .map(str::to_string)
            })
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

impl DraftStore for JsonDraftStore {
    fn load_responses(&self, assessment_id: &str) -> AnswerMap {
        self.read_map(&responses_key(assessment_id))
    }

    fn save_responses(&self, assessment_id: &str, responses: &AnswerMap) -> Result<(), CoreError> {
        self.write_map(&responses_key(assessment_id), responses)
    }

    fn load_drafts(&self, assessment_id: &str) -> DraftMap {
        self.read_map(&drafts_key(assessment_id))
    }

    fn save_drafts(&self, assessment_id: &str, drafts: &DraftMap) -> Result<(), CoreError> {
        self.write_map(&drafts_key(assessment_id), drafts)
    }

    fn clear(&self, assessment_id: &str) -> Result<(), CoreError> {
        self.remove(&responses_key(assessment_id))?;
        self.remove(&drafts_key(assessment_id))
    }
}

/// In-memory store for tests and headless use.
#[derive(Default)]
pub struct MemoryDraftStore {
    responses: Mutex<HashMap<String, AnswerMap>>,
    drafts: Mutex<HashMap<String, DraftMap>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load_responses(&self, assessment_id: &str) -> AnswerMap {
        self.responses
            .lock()
            .unwrap()
            .get(assessment_id)
            .cloned()
            .unwrap_or_default()
    }

    fn save_responses(&self, assessment_id: &str, responses: &AnswerMap) -> Result<(), CoreError> {
        self.responses
            .lock()
            .unwrap()
            .insert(assessment_id.to_string(), responses.clone());
        Ok(())
    }

    fn load_drafts(&self, assessment_id: &str) -> DraftMap {
        self.drafts
            .lock()
            .unwrap()
            .get(assessment_id)
            .cloned()
            .unwrap_or_default()
    }

    fn save_drafts(&self, assessment_id: &str, drafts: &DraftMap) -> Result<(), CoreError> {
        self.drafts
            .lock()
            .unwrap()
            .insert(assessment_id.to_string(), drafts.clone());
        Ok(())
    }

    fn clear(&self, assessment_id: &str) -> Result<(), CoreError> {
        self.responses.lock().unwrap().remove(assessment_id);
        self.drafts.lock().unwrap().remove(assessment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerValue;

    const ID: &str = "66f2a9c1b4e8d05a3c7f1e20";

    fn sample_answers() -> AnswerMap {
        AnswerMap::from([
            ("q1".to_string(), AnswerValue::from("Paris")),
            ("q2".to_string(), AnswerValue::from(false)),
        ])
    }

    #[test]
    fn json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());

        let answers = sample_answers();
        let drafts = DraftMap::from([("q3".to_string(), "half-written".to_string())]);

        store.save_responses(ID, &answers).unwrap();
        store.save_drafts(ID, &drafts).unwrap();

        assert_eq!(store.load_responses(ID), answers);
        assert_eq!(store.load_drafts(ID), drafts);

        // Boolean answers survive the round trip as booleans.
        assert_eq!(store.load_responses(ID)["q2"], AnswerValue::Flag(false));
    }

    #[test]
    fn missing_state_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());
        assert!(store.load_responses(ID).is_empty());
        assert!(store.load_drafts(ID).is_empty());
    }

    #[test]
    fn corrupt_state_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());
        std::fs::write(
            dir.path().join(format!("{ID}.responses.json")),
            "{not json at all",
        )
        .unwrap();

        assert!(store.load_responses(ID).is_empty());
    }

    #[test]
    fn clear_removes_both_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());
        store.save_responses(ID, &sample_answers()).unwrap();
        store
            .save_drafts(ID, &DraftMap::from([("q1".to_string(), "text".to_string())]))
            .unwrap();

        store.clear(ID).unwrap();
        assert!(store.load_responses(ID).is_empty());
        assert!(store.load_drafts(ID).is_empty());
        assert!(store.list().is_empty());

        // Clearing again is harmless.
        store.clear(ID).unwrap();
    }

    #[test]
    fn list_reports_each_assessment_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDraftStore::new(dir.path());
        store.save_responses(ID, &sample_answers()).unwrap();
        store
            .save_drafts(ID, &DraftMap::from([("q1".to_string(), "text".to_string())]))
            .unwrap();
        store
            .save_responses("0123456789abcdef01234567", &AnswerMap::new())
            .unwrap();

        assert_eq!(store.list(), vec!["0123456789abcdef01234567".to_string(), ID.to_string()]);
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryDraftStore::new();
        let answers = sample_answers();
        store.save_responses(ID, &answers).unwrap();
        assert_eq!(store.load_responses(ID), answers);
        store.clear(ID).unwrap();
        assert!(store.load_responses(ID).is_empty());
    }
}

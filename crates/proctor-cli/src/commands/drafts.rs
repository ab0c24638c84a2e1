//! The `proctor drafts` command: inspect or discard local session state.

use std::path::PathBuf;

use anyhow::Result;

use proctor_client::load_config_from;
use proctor_core::store::{DraftStore, JsonDraftStore};

pub fn execute(
    dir: Option<PathBuf>,
    discard: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let dir = match dir {
        Some(d) => d,
        None => load_config_from(config_path.as_deref())?.draft_dir,
    };
    let store = JsonDraftStore::new(&dir);

    if let Some(assessment_id) = discard {
        store.clear(&assessment_id)?;
        println!("Discarded draft state for {assessment_id}.");
        return Ok(());
    }

    let ids = store.list();
    if ids.is_empty() {
        println!("No draft state under {}.", dir.display());
        return Ok(());
    }

    for id in ids {
        let answers = store.load_responses(&id);
        let drafts = store.load_drafts(&id);
        println!(
            "{id}: {} committed answer(s), {} draft(s)",
            answers.len(),
            drafts.len()
        );
    }

    Ok(())
}

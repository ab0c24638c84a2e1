//! The `proctor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("proctor.toml").exists() {
        println!("proctor.toml already exists, skipping.");
    } else {
        std::fs::write("proctor.toml", SAMPLE_CONFIG)?;
        println!("Created proctor.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit proctor.toml with your backend URL and token");
    println!("  2. Run: proctor status --student <id>");
    println!("  3. Run: proctor fetch --assessment <id> --out assessment.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# proctor configuration

# Base URL of the learning backend's REST API
base_url = "http://localhost:5000/api"

# Bearer token; ${VAR} references are resolved from the environment
api_token = "${PROCTOR_API_TOKEN}"

# Default student id for status/assign commands
# student_id = "s-1024"

# Where in-progress answer state is persisted
draft_dir = "./proctor-drafts"

request_timeout_secs = 30
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_parses() {
        let config: proctor_client::ProctorConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.draft_dir, std::path::PathBuf::from("./proctor-drafts"));
    }
}

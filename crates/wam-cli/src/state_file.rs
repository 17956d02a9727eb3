use std::fs;
use std::path::Path;

use wam_core::types::PersistedState;

/// Read a persisted state file. The file must exist; a mistyped path is an
/// error rather than an empty policy.
pub fn read_state(path: &Path) -> Result<PersistedState, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    PersistedState::from_json(&text)
        .map_err(|e| format!("Invalid state file '{}': {}", path.display(), e))
}

pub fn write_state(path: &Path, state: &PersistedState) -> Result<(), String> {
    let text = serde_json::to_string_pretty(state)
        .map_err(|e| format!("Failed to serialize state: {}", e))?;
    write_text(path, &text)
}

pub fn read_text(path: &Path) -> Result<String, String> {
    fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))
}

pub fn write_text(path: &Path, text: &str) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }
    }
    fs::write(path, text)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wam_core::types::StandardList;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("wam-cli-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn missing_file_is_an_error() {
        let path = scratch_path("does-not-exist.json");
        let err = read_state(&path).expect_err("missing file should fail");
        assert!(err.starts_with("Failed to read '"));
        assert!(err.contains("does-not-exist.json"));
    }

    #[test]
    fn state_round_trips_through_file() {
        let path = scratch_path("round-trip/state.json");
        let mut state = PersistedState::default();
        state
            .domain_rules
            .insert("a.com".to_string(), StandardList::from(&["Console API"][..]));
        state.should_log = true;

        write_state(&path, &state).expect("state should be written");
        let restored = read_state(&path).expect("state should be read");
        assert_eq!(restored, state);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn invalid_state_file_is_an_error() {
        let path = scratch_path("invalid/state.json");
        write_text(&path, "{not json").expect("text should be written");

        let err = read_state(&path).expect_err("invalid file should fail");
        assert!(err.contains("Invalid state file"));

        let _ = fs::remove_file(&path);
    }
}

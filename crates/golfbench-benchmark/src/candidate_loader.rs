use std::path::Path;

use golfbench_core::{CandidateSet, GolfBenchError, Result};

/// Load and validate one candidate set from a JSON file.
pub fn load_candidate_set(path: &Path) -> Result<CandidateSet> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        GolfBenchError::Config(format!("failed to read {}: {}", path.display(), e))
    })?;

    let set: CandidateSet = serde_json::from_str(&raw).map_err(|e| {
        GolfBenchError::InvalidCandidateSet(format!("{}: {}", path.display(), e))
    })?;

    set.validate()?;
    tracing::debug!(
        "Loaded candidate set '{}' ({} candidates) from {}",
        set.name,
        set.candidates.len(),
        path.display()
    );
    Ok(set)
}

/// Load every `*.json` candidate set in a directory, ordered by file name.
pub fn load_all_candidate_sets(dir: &Path) -> Result<Vec<CandidateSet>> {
    let mut paths = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    paths.iter().map(|p| load_candidate_set(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DOUBLES: &str = r#"{
        "name": "doubles",
        "function_name": "f",
        "inputs": [1, 2],
        "expected_outputs": [2, 4],
        "candidates": ["f=n=>n*2", "f=n=>n+n"]
    }"#;

    #[test]
    fn test_load_single_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doubles.json");
        fs::write(&path, DOUBLES).unwrap();

        let set = load_candidate_set(&path).unwrap();
        assert_eq!(set.name, "doubles");
        assert_eq!(set.candidates.len(), 2);
    }

    #[test]
    fn test_load_rejects_mismatched_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{"name":"bad","function_name":"f","inputs":[1,2],"expected_outputs":[2],"candidates":["f=n=>n"]}"#,
        )
        .unwrap();

        assert!(matches!(
            load_candidate_set(&path),
            Err(GolfBenchError::InvalidCandidateSet(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_candidate_set(Path::new("/nonexistent/golfbench.json"));
        assert!(matches!(result, Err(GolfBenchError::Config(_))));
    }

    #[test]
    fn test_bundled_sets_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sets");
        let sets = load_all_candidate_sets(&dir).unwrap();
        assert!(sets.iter().any(|s| s.name == "nqueens-short"));
    }

    #[test]
    fn test_load_all_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), DOUBLES.replace("doubles", "second")).unwrap();
        fs::write(dir.path().join("a.json"), DOUBLES).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let sets = load_all_candidate_sets(dir.path()).unwrap();
        let names: Vec<_> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["doubles", "second"]);
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ScriptLanguage;
use crate::{GolfBenchError, Result};

/// A named list of candidate definitions sharing one function name and one
/// set of input/expected-output pairs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateSet {
    pub name: String,
    #[serde(default)]
    pub language: ScriptLanguage,
    pub function_name: String,
    pub inputs: Vec<Value>,
    pub expected_outputs: Vec<Value>,
    pub candidates: Vec<String>,
}

impl CandidateSet {
    pub fn validate(&self) -> Result<()> {
        if self.function_name.trim().is_empty() {
            return Err(GolfBenchError::InvalidCandidateSet(format!(
                "'{}' has an empty function name",
                self.name
            )));
        }

        if self.inputs.len() != self.expected_outputs.len() {
            return Err(GolfBenchError::InvalidCandidateSet(format!(
                "'{}' has {} inputs but {} expected outputs",
                self.name,
                self.inputs.len(),
                self.expected_outputs.len()
            )));
        }

        if self.candidates.is_empty() {
            return Err(GolfBenchError::InvalidCandidateSet(format!(
                "'{}' has no candidates",
                self.name
            )));
        }

        Ok(())
    }

    pub fn case_count(&self) -> usize {
        self.inputs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> CandidateSet {
        CandidateSet {
            name: "sample".to_string(),
            language: ScriptLanguage::JavaScript,
            function_name: "f".to_string(),
            inputs: vec![json!(1), json!(2)],
            expected_outputs: vec![json!(2), json!(4)],
            candidates: vec!["f=n=>n*2".to_string()],
        }
    }

    #[test]
    fn test_valid_set() {
        assert!(sample().validate().is_ok());
        assert_eq!(sample().case_count(), 2);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut set = sample();
        set.expected_outputs.pop();
        let err = set.validate().unwrap_err();
        assert!(err.to_string().contains("2 inputs but 1 expected outputs"));
    }

    #[test]
    fn test_empty_function_name_rejected() {
        let mut set = sample();
        set.function_name = " ".to_string();
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_no_candidates_rejected() {
        let mut set = sample();
        set.candidates.clear();
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_language_defaults_when_missing() {
        let set: CandidateSet = serde_json::from_value(json!({
            "name": "doubles",
            "function_name": "f",
            "inputs": [1],
            "expected_outputs": [2],
            "candidates": ["f=n=>n*2"]
        }))
        .unwrap();
        assert_eq!(set.language, ScriptLanguage::JavaScript);
    }
}

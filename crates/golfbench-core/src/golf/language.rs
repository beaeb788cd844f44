use serde::{Deserialize, Serialize};

/// Language a harness program is written in, as understood by a sandbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    #[default]
    JavaScript,
}

impl ScriptLanguage {
    /// Tag sent to remote code interpreters.
    pub fn tag(&self) -> &'static str {
        match self {
            ScriptLanguage::JavaScript => "js",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            ScriptLanguage::JavaScript => "js",
        }
    }
}

// Passage corpus module
// Loads the static JSON corpus that seeds the vector store


use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ChatbotError, Result};

/// Default corpus location relative to the working directory.
pub const DEFAULT_CORPUS_PATH: &str = "data/passages.json";

/// One passage of the source corpus. Immutable after seeding; re-seeding is
/// the only way these change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passage {
    pub id: u32,
    pub kanda: String,
    pub topic: String,
    pub characters: Vec<String>,
    pub text: String,
}

impl Passage {
    /// Characters joined for storage and display.
    #[inline]
    pub fn characters_joined(&self) -> String {
        self.characters.join(", ")
    }
}

/// Load and validate the passage corpus. An empty or malformed corpus is a
/// fatal seed-time error.
#[inline]
pub fn load_passages(path: &Path) -> Result<Vec<Passage>> {
    if !path.exists() {
        return Err(ChatbotError::Corpus(format!(
            "Corpus file not found: {}",
            path.display()
        )));
    }

    let content = fs::read_to_string(path)?;

    let passages: Vec<Passage> = serde_json::from_str(&content).map_err(|e| {
        ChatbotError::Corpus(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    validate(&passages)?;

    info!(
        "Loaded {} passages from {}",
        passages.len(),
        path.display()
    );
    Ok(passages)
}

fn validate(passages: &[Passage]) -> Result<()> {
    if passages.is_empty() {
        return Err(ChatbotError::Corpus(
            "Corpus is empty; nothing to index".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for passage in passages {
        if passage.text.trim().is_empty() {
            return Err(ChatbotError::Corpus(format!(
                "Passage {} has empty text",
                passage.id
            )));
        }

        if !seen_ids.insert(passage.id) {
            return Err(ChatbotError::Corpus(format!(
                "Duplicate passage id: {}",
                passage.id
            )));
        }
    }

    Ok(())
}

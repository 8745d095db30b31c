//! Persistent store of known-good layouts.
//!
//! The memory bank remembers diagram specifications that scored well so a
//! generation step can prime itself with few-shot examples of layouts that
//! worked. Entries are keyed by the prompt that produced them
//! (case-insensitive, whitespace-trimmed), capped in count with FIFO
//! eviction, and persisted to a single JSON document on every mutation.
//!
//! Loading is lazy and tolerant: a missing or corrupt backing file starts
//! an empty store instead of failing the caller. Saving propagates errors,
//! since silently-lost persistence would corrupt the optimization loop's
//! assumptions.
//!
//! Known limitation: writes are full-document rewrites with no locking.
//! Concurrent instances pointed at the same path lose updates
//! last-writer-wins; intended usage is a single long-lived process.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum score a layout must reach to be remembered.
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.95;
/// Default maximum number of stored layouts.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

const STORE_VERSION: u32 = 1;

/// Persistence failures.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A diagram specification that scored well, with the prompt that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessfulLayout {
    /// The textual spec that generated the diagram
    pub prompt: String,
    /// The diagram specification itself
    pub json: serde_json::Value,
    pub score: f32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// On-disk document. The schema is additive-only: new optional fields must
/// not break old readers.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    version: u32,
    last_updated: DateTime<Utc>,
    layouts: Vec<SuccessfulLayout>,
}

/// Memory bank configuration.
#[derive(Debug, Clone)]
pub struct MemoryBankConfig {
    pub path: PathBuf,
    pub max_entries: usize,
    pub score_threshold: f32,
}

impl MemoryBankConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: DEFAULT_MAX_ENTRIES,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }
}

/// Persistent store of successful layouts.
pub struct MemoryBank {
    config: MemoryBankConfig,
    layouts: Vec<SuccessfulLayout>,
    loaded: bool,
}

impl MemoryBank {
    /// Creates a bank backed by the given file. The file is not read until
    /// first use.
    pub fn new(config: MemoryBankConfig) -> Self {
        Self {
            config,
            layouts: Vec::new(),
            loaded: false,
        }
    }

    /// Reads the backing file at most once per instance. Missing or
    /// unreadable files start an empty store.
    fn ensure_loaded(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        match fs::read_to_string(&self.config.path) {
            Ok(content) => match serde_json::from_str::<StoreDocument>(&content) {
                Ok(document) => {
                    debug!(
                        count = document.layouts.len(),
                        path:? = self.config.path;
                        "Memory bank loaded"
                    );
                    self.layouts = document.layouts;
                }
                Err(err) => {
                    warn!(err:? = err, path:? = self.config.path; "Memory bank file corrupt; starting empty");
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path:? = self.config.path; "No memory bank file yet; starting empty");
            }
            Err(err) => {
                warn!(err:? = err, path:? = self.config.path; "Memory bank unreadable; starting empty");
            }
        }
    }

    /// Writes the full document to disk, creating parent directories as
    /// needed.
    fn save(&self) -> Result<(), MemoryError> {
        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let document = StoreDocument {
            version: STORE_VERSION,
            last_updated: Utc::now(),
            layouts: self.layouts.clone(),
        };
        let content = serde_json::to_string_pretty(&document)?;
        fs::write(&self.config.path, content)?;
        Ok(())
    }

    /// Normalized dedup key for a prompt
    fn prompt_key(prompt: &str) -> String {
        prompt.trim().to_lowercase()
    }

    /// Stores a layout if it clears the score threshold.
    ///
    /// Sub-threshold layouts are rejected as a logged no-op returning
    /// `Ok(false)`; rejection is policy, not an error. A layout whose
    /// prompt matches an existing entry (case-insensitively, ignoring
    /// surrounding whitespace) replaces it in place. Once the store
    /// exceeds its maximum, the oldest entries are dropped first.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError`] when persisting the mutation fails.
    pub fn add_layout(&mut self, layout: SuccessfulLayout) -> Result<bool, MemoryError> {
        self.ensure_loaded();

        if layout.score < self.config.score_threshold {
            info!(
                score = layout.score,
                threshold = self.config.score_threshold;
                "Layout below memory threshold; not stored"
            );
            return Ok(false);
        }

        let key = Self::prompt_key(&layout.prompt);
        match self
            .layouts
            .iter()
            .position(|existing| Self::prompt_key(&existing.prompt) == key)
        {
            Some(index) => {
                debug!(prompt = layout.prompt.as_str(); "Replacing remembered layout");
                self.layouts[index] = layout;
            }
            None => self.layouts.push(layout),
        }

        // FIFO eviction by array order, not by score
        while self.layouts.len() > self.config.max_entries {
            let evicted = self.layouts.remove(0);
            debug!(prompt = evicted.prompt.as_str(); "Evicted oldest layout");
        }

        self.save()?;
        Ok(true)
    }

    /// The `limit` most recent layouts, most recent first.
    pub fn get_examples(&mut self, limit: usize) -> Vec<SuccessfulLayout> {
        self.ensure_loaded();
        let mut examples = self.layouts.clone();
        examples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        examples.truncate(limit);
        examples
    }

    /// The `limit` most recent layouts in a category, most recent first.
    pub fn get_examples_by_category(
        &mut self,
        category: &str,
        limit: usize,
    ) -> Vec<SuccessfulLayout> {
        self.ensure_loaded();
        let mut examples: Vec<SuccessfulLayout> = self
            .layouts
            .iter()
            .filter(|layout| layout.category.as_deref() == Some(category))
            .cloned()
            .collect();
        examples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        examples.truncate(limit);
        examples
    }

    /// Number of stored layouts.
    pub fn count(&mut self) -> usize {
        self.ensure_loaded();
        self.layouts.len()
    }

    /// Removes every stored layout and persists the empty store.
    pub fn clear(&mut self) -> Result<(), MemoryError> {
        self.ensure_loaded();
        self.layouts.clear();
        self.save()
    }

    /// Renders the top examples as a few-shot prompt block for a
    /// generation step. Returns an empty string when the store is empty.
    pub fn generate_few_shot_prompt(&mut self, limit: usize) -> String {
        let examples = self.get_examples(limit);
        if examples.is_empty() {
            return String::new();
        }

        let mut prompt = String::from(
            "Here are examples of diagram layouts that scored well:\n\n",
        );
        for (index, example) in examples.iter().enumerate() {
            let spec = serde_json::to_string_pretty(&example.json)
                .unwrap_or_else(|_| example.json.to_string());
            prompt.push_str(&format!(
                "Example {}:\nPrompt: {}\nDiagram:\n{}\n\n",
                index + 1,
                example.prompt,
                spec
            ));
        }
        prompt
    }
}

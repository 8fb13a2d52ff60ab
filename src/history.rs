//! What the user has said so far.
//!
//! A [`PromptHistory`] is a plain ordered list. A [`HistoryStore`] owns one
//! or more of them, keyed by session, and makes append-then-read atomic.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::consts::{PROMPT_SEPARATOR, prompt_label};

/// Ordered, append-only list of prompts. Duplicates are kept.
#[derive(Debug, Clone, Default)]
pub struct PromptHistory {
    prompts: Vec<String>,
}

impl PromptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a prompt and return the resulting view of the history.
    pub fn push(&mut self, text: &str) -> Snapshot {
        self.prompts.push(text.to_string());
        Snapshot {
            ordinal: self.prompts.len(),
            combined: self.combined(),
        }
    }

    /// All prompts joined in submission order.
    pub fn combined(&self) -> String {
        self.prompts.join(PROMPT_SEPARATOR)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

/// The history as seen right after one append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// 1-indexed position of the appended prompt.
    pub ordinal: usize,
    pub combined: String,
}

impl Snapshot {
    pub fn label(&self) -> String {
        prompt_label(self.ordinal)
    }

    /// `prompt_N: <combined>`, the text shown next to the images.
    pub fn caption(&self) -> String {
        format!("{}: {}", self.label(), self.combined)
    }
}

/// Whether sessions see one history or their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryScope {
    /// Every session appends to the same list.
    #[default]
    Shared,
    /// Each session key gets an isolated list.
    PerSession,
}

/// All prompt histories held by the process. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct HistoryStore {
    scope: HistoryScope,
    histories: Mutex<HashMap<String, PromptHistory>>,
}

impl HistoryStore {
    pub fn new(scope: HistoryScope) -> Self {
        Self {
            scope,
            histories: Mutex::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> HistoryScope {
        self.scope
    }

    fn key<'a>(&self, session: &'a str) -> &'a str {
        match self.scope {
            HistoryScope::Shared => "",
            HistoryScope::PerSession => session,
        }
    }

    /// Append under the lock, so the ordinal and combined string always
    /// describe the same state.
    pub async fn append(&self, session: &str, text: &str) -> Snapshot {
        let mut histories = self.histories.lock().await;
        histories
            .entry(self.key(session).to_string())
            .or_default()
            .push(text)
    }

    /// Copy of the prompts for a session, oldest first.
    pub async fn prompts(&self, session: &str) -> Vec<String> {
        let histories = self.histories.lock().await;
        histories
            .get(self.key(session))
            .map(|h| h.prompts().to_vec())
            .unwrap_or_default()
    }

    pub async fn len(&self, session: &str) -> usize {
        let histories = self.histories.lock().await;
        histories.get(self.key(session)).map_or(0, PromptHistory::len)
    }
}

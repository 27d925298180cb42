use serde::{Deserialize, Serialize};

use crate::constants::SYSTEM_PROMPT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry of the message array sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// The three form inputs captured at submission time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSelection {
    pub category: String,
    pub region: String,
    pub preferences: Vec<String>,
}

impl FormSelection {
    pub fn new(category: impl Into<String>, region: impl Into<String>, preferences: Vec<String>) -> Self {
        Self {
            category: category.into(),
            region: region.into(),
            preferences,
        }
    }

    /// Renders the selection as the user's chat message.
    pub fn render(&self) -> String {
        let restrictions = if self.preferences.is_empty() {
            "None".to_string()
        } else {
            self.preferences.join(", ")
        };
        format!(
            "Condition: {}\nRegion: {}\nRestrictions: {}",
            self.category, self.region, restrictions
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Answered,
    Failed,
}

/// A user message and the reply it got. Failed calls still produce a turn,
/// with the error text as the reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub user_text: String,
    pub assistant_text: String,
    pub status: TurnStatus,
}

impl Turn {
    pub fn answered(user_text: String, assistant_text: String) -> Self {
        Self { user_text, assistant_text, status: TurnStatus::Answered }
    }

    pub fn failed(user_text: String, error_text: String) -> Self {
        Self { user_text, assistant_text: error_text, status: TurnStatus::Failed }
    }

    pub fn is_failed(&self) -> bool {
        self.status == TurnStatus::Failed
    }
}

/// Append-only transcript of one UI session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionLog {
    turns: Vec<Turn>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drops every turn. There is no partial clear.
    pub fn clear(&mut self) {
        self.turns = Vec::new();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Builds the message array for one call: the system prompt, every prior
/// turn flattened into a user/assistant pair, then the new user message.
pub fn build_envelope(log: &SessionLog, selection: &FormSelection) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2 + 2 * log.len());
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    for turn in log.turns() {
        messages.push(ChatMessage::user(turn.user_text.clone()));
        messages.push(ChatMessage::assistant(turn.assistant_text.clone()));
    }
    messages.push(ChatMessage::user(selection.render()));
    messages
}

// Turn handling shared by the web UI and the `ask` command: parsing the
// submitted form into an action and running one request/append cycle.

use thiserror::Error;
use tracing::{info, instrument};

use crate::constants::{DEFAULT_CATEGORY, DEFAULT_REGION};
use crate::conversation::{build_envelope, FormSelection, SessionLog, Turn};
use crate::llm_interaction::CompletionClient;

/// What the user asked the form to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Submit(FormSelection),
    Clear,
}

#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("form did not name an action")]
    Missing,
    #[error("unknown action `{0}`")]
    Unknown(String),
}

impl Action {
    /// Looks up the `action` field and maps it to a handler.
    pub fn from_form(fields: &[(String, String)]) -> Result<Self, ActionError> {
        match form_value(fields, "action") {
            Some("submit") => Ok(Action::Submit(FormSelection::from_form(fields))),
            Some("clear") => Ok(Action::Clear),
            Some(other) => Err(ActionError::Unknown(other.to_string())),
            None => Err(ActionError::Missing),
        }
    }
}

impl FormSelection {
    /// Reads `category`, `region` and every `preferences` field. Missing
    /// dropdowns fall back to the form's defaults.
    pub fn from_form(fields: &[(String, String)]) -> Self {
        let category = form_value(fields, "category").unwrap_or(DEFAULT_CATEGORY);
        let region = form_value(fields, "region").unwrap_or(DEFAULT_REGION);
        let preferences = fields
            .iter()
            .filter(|(key, _)| key == "preferences")
            .map(|(_, value)| value.clone())
            .collect();
        FormSelection::new(category, region, preferences)
    }
}

pub(crate) fn form_value<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Asks the provider about `selection` given the prior turns. The returned
/// turn is not yet part of any log.
#[instrument(skip_all, fields(history = history.len()))]
pub async fn respond(client: &CompletionClient, history: &SessionLog, selection: &FormSelection) -> Turn {
    let user_text = selection.render();
    let messages = build_envelope(history, selection);
    match client.try_complete(&messages).await {
        Ok(reply) => Turn::answered(user_text, reply),
        Err(e) => {
            info!(error = %e, "Recording failed turn");
            Turn::failed(user_text, e.to_string())
        }
    }
}

/// Runs one full cycle against `log`: respond, then append.
pub async fn submit<'a>(
    client: &CompletionClient,
    log: &'a mut SessionLog,
    selection: &FormSelection,
) -> &'a SessionLog {
    let turn = respond(client, log, selection).await;
    log.push(turn);
    log
}

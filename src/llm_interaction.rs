use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::config::CompletionConfig;
use crate::conversation::ChatMessage;

// Structures matching the OpenAI-compatible /chat/completions endpoint
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    // usage, id, created etc. are ignored
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    content: String,
}

/// Ways a completion call can fail. The `Display` text is what the user
/// sees in the transcript, so each one starts with its own marker glyph.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("🚫 GROQ_API_KEY is missing or invalid. Please check your environment.")]
    InvalidCredential,
    #[error("❌ GROQ API Error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("⚠️ Failed to call GROQ API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("⚠️ Failed to call GROQ API: response contained no choices")]
    EmptyChoices,
}

/// Sends a message array to the chat-completion endpoint, one attempt per call.
pub struct CompletionClient {
    http: Client,
    config: CompletionConfig,
    credential_valid: bool,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        let credential_valid = config.has_valid_credential();
        if !credential_valid {
            debug!("Credential failed the prefix check; completion requests will be refused locally");
        }
        Self {
            http: Client::new(),
            config,
            credential_valid,
        }
    }

    /// Returns the assistant's reply, or the error text when the call fails.
    /// Never returns an error.
    pub async fn complete(&self, messages: &[ChatMessage]) -> String {
        self.try_complete(messages)
            .await
            .unwrap_or_else(|e| e.to_string())
    }

    #[instrument(skip_all, fields(model = %self.config.model, messages = messages.len()))]
    pub async fn try_complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        if !self.credential_valid {
            error!("GROQ_API_KEY is missing or invalid");
            return Err(CompletionError::InvalidCredential);
        }

        let payload = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        debug!(authorization_present = true, url = %self.config.api_url, "Sending chat completion request");

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Exception during GROQ request");
                e
            })?;

        let status = response.status();
        info!(status = status.as_u16(), "Request sent to GROQ");

        if status != StatusCode::OK {
            let body = response.text().await?;
            error!(%status, %body, "GROQ API error");
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "Failed to parse GROQ response");
            e
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyChoices)?;

        debug!(chars = content.len(), "Received completion");
        Ok(content.trim().to_string())
    }
}

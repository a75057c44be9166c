//! services/api/src/adapters/rewrite_llm.rs
//!
//! This module contains the adapter for the rewriting LLM.
//! It implements the `RewriteService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use revision_core::ports::{PortError, PortResult, RewriteService};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `RewriteService` using an OpenAI-compatible chat model.
#[derive(Clone)]
pub struct OpenAiRewriteAdapter {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAiRewriteAdapter {
    /// Creates a new `OpenAiRewriteAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String, system_prompt: String) -> Self {
        Self {
            client,
            model,
            system_prompt,
        }
    }

    /// The user message: the instruction, a separator, then the text to rewrite.
    fn user_message(original: &str, instruction: &str) -> String {
        format!("{}\n\n---\n\n{}", instruction, original)
    }

    fn build_messages(
        &self,
        original: &str,
        instruction: &str,
    ) -> PortResult<Vec<ChatCompletionRequestMessage>> {
        Ok(vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.as_str())
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::user_message(original, instruction))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ])
    }
}

/// Maps client errors onto the port error, keeping the service's own message
/// for non-success responses.
fn to_port_error(error: OpenAIError) -> PortError {
    match error {
        OpenAIError::ApiError(api_error) => PortError::Upstream(api_error.message),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// `RewriteService` Trait Implementation
//=========================================================================================

#[async_trait]
impl RewriteService for OpenAiRewriteAdapter {
    /// Sends the text and instruction to the chat model and returns its rewrite.
    async fn rewrite(&self, original: &str, instruction: &str) -> PortResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(self.build_messages(original, instruction)?)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(to_port_error)?;

        // A choice without text content is an empty, but valid, rewrite.
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            PortError::MalformedResponse(
                "Rewrite LLM returned no choices in its response.".to_string(),
            )
        })?;
        let suggestion = choice.message.content.unwrap_or_default();
        debug!("Rewrite LLM returned {} characters.", suggestion.len());
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_puts_instruction_before_text() {
        assert_eq!(
            OpenAiRewriteAdapter::user_message("The cat sat.", "make it formal"),
            "make it formal\n\n---\n\nThe cat sat."
        );
    }

    #[test]
    fn builds_system_and_user_messages() {
        let adapter = OpenAiRewriteAdapter::new(
            Client::with_config(OpenAIConfig::new().with_api_key("sk-test")),
            "gpt-4".to_string(),
            "You're an expert editor.".to_string(),
        );
        let messages = adapter.build_messages("text", "shorten").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }
}

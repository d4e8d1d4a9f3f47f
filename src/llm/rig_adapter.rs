//! Bridges rig-core's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::completion::CompletionModel;
use rig::message::{AssistantContent, Message};

use crate::error::GenerationError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role,
};

/// Adapter wrapping a rig completion model.
pub struct RigAdapter<M: CompletionModel> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

#[async_trait]
impl<M: CompletionModel> LlmProvider for RigAdapter<M> {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, GenerationError> {
        let (preamble, prompt) = split_messages(&request.messages);

        let mut builder = self.model.completion_request(Message::user(prompt));
        if let Some(preamble) = preamble {
            builder = builder.preamble(preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GenerationError::RequestFailed {
                provider: self.model_name.clone(),
                reason: e.to_string(),
            })?;

        let content: String = response
            .choice
            .into_iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if content.is_empty() {
            return Err(GenerationError::InvalidResponse {
                reason: "model returned no text content".to_string(),
            });
        }

        Ok(CompletionResponse { content })
    }
}

/// Collapse our chat messages into rig's (preamble, single user prompt) shape.
///
/// System messages concatenate into the preamble; user messages concatenate
/// into the prompt. The flows in this crate only ever send one of each.
fn split_messages(messages: &[ChatMessage]) -> (Option<String>, String) {
    let mut system_parts = Vec::new();
    let mut user_parts = Vec::new();

    for message in messages {
        match message.role {
            Role::System => system_parts.push(message.content.as_str()),
            Role::User => user_parts.push(message.content.as_str()),
        }
    }

    let preamble = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (preamble, user_parts.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_messages_separates_roles() {
        let messages = vec![
            ChatMessage::system("You are a legal expert."),
            ChatMessage::user("My landlord shut off my water."),
        ];
        let (preamble, prompt) = split_messages(&messages);
        assert_eq!(preamble.as_deref(), Some("You are a legal expert."));
        assert_eq!(prompt, "My landlord shut off my water.");
    }

    #[test]
    fn split_messages_without_system() {
        let messages = vec![ChatMessage::user("hello")];
        let (preamble, prompt) = split_messages(&messages);
        assert!(preamble.is_none());
        assert_eq!(prompt, "hello");
    }

    #[test]
    fn split_messages_joins_multiple_user_parts() {
        let messages = vec![ChatMessage::user("part one"), ChatMessage::user("part two")];
        let (_, prompt) = split_messages(&messages);
        assert_eq!(prompt, "part one\n\npart two");
    }
}

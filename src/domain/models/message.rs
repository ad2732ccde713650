#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: &str) -> ChatMessage {
        return ChatMessage {
            role,
            content: content.to_string(),
        };
    }
}

/// The two turns sent to the model: the system prompt first, then the user
/// request. Chat templates are positional, so the order is fixed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationRequest {
    messages: [ChatMessage; 2],
}

impl ConversationRequest {
    pub fn new(system_prompt: &str, user_request: &str) -> ConversationRequest {
        return ConversationRequest {
            messages: [
                ChatMessage::new(Role::System, system_prompt),
                ChatMessage::new(Role::User, user_request),
            ],
        };
    }

    pub fn messages(&self) -> &[ChatMessage] {
        return &self.messages;
    }
}

/// What a backend hands back after generation. Backends narrow their server
/// responses into this shape so callers never index into raw JSON.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub generated_turns: Vec<ChatMessage>,
}

impl GenerationOutput {
    /// Builds the output for servers that only return the new assistant turn.
    pub fn from_reply(request: &ConversationRequest, reply: ChatMessage) -> GenerationOutput {
        let mut generated_turns = request.messages().to_vec();
        generated_turns.push(reply);

        return GenerationOutput { generated_turns };
    }

    pub fn last_turn_text(&self) -> Result<&str> {
        if let Some(turn) = self.generated_turns.last() {
            return Ok(&turn.content);
        }

        bail!("The model returned no generated turns");
    }
}

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::RwLock;

use super::ConversationRequest;

#[derive(Default)]
struct PromptValues {
    system_prompt: String,
    user_request: String,
}

/// Live contents of the two prompt fields. The UI writes through on every
/// edit and generation reads whatever is current when it builds a request.
#[derive(Clone, Default)]
pub struct Prompts {
    inner: Arc<RwLock<PromptValues>>,
}

impl Prompts {
    pub fn new(system_prompt: &str, user_request: &str) -> Prompts {
        return Prompts {
            inner: Arc::new(RwLock::new(PromptValues {
                system_prompt: system_prompt.to_string(),
                user_request: user_request.to_string(),
            })),
        };
    }

    pub fn set_system_prompt(&self, text: &str) {
        let mut values = self.inner.write().unwrap_or_else(|err| return err.into_inner());
        values.system_prompt = text.to_string();
    }

    pub fn set_user_request(&self, text: &str) {
        let mut values = self.inner.write().unwrap_or_else(|err| return err.into_inner());
        values.user_request = text.to_string();
    }

    pub fn to_request(&self) -> ConversationRequest {
        let values = self.inner.read().unwrap_or_else(|err| return err.into_inner());
        return ConversationRequest::new(&values.system_prompt, &values.user_request);
    }
}

use super::Prompts;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConversationRequest;
use crate::domain::models::Role;

#[test]
fn it_builds_requests_from_current_values() {
    let prompts = Prompts::new("You are a helpful assistant.", "Tell me a funny joke.");
    assert_eq!(
        prompts.to_request(),
        ConversationRequest::new("You are a helpful assistant.", "Tell me a funny joke.")
    );
}

#[test]
fn it_shares_edits_between_clones() {
    let prompts = Prompts::new("a", "b");
    let ui_side = prompts.clone();

    ui_side.set_system_prompt("Talk like a pirate.");
    ui_side.set_user_request("Where is the treasure?");

    let req = prompts.to_request();
    assert_eq!(
        req.messages()[0],
        ChatMessage::new(Role::System, "Talk like a pirate.")
    );
    assert_eq!(
        req.messages()[1],
        ChatMessage::new(Role::User, "Where is the treasure?")
    );
}

#[test]
fn it_defaults_to_empty_fields() {
    let req = Prompts::default().to_request();
    assert_eq!(req, ConversationRequest::new("", ""));
}

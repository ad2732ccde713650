use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::ollama_chat_fixture;
use test_utils::ollama_show_fixture;

use super::Ollama;
use crate::domain::models::Backend;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConversationRequest;
use crate::domain::models::Device;
use crate::domain::models::GenerationOptions;
use crate::domain::models::LoadOptions;
use crate::domain::models::Precision;
use crate::domain::models::Role;

impl Ollama {
    fn with_url(url: String) -> Ollama {
        return Ollama {
            url,
            timeout: "200".to_string(),
        };
    }
}

fn q4_on(device: Device) -> LoadOptions {
    return LoadOptions {
        precision: Precision::Q4,
        device,
    };
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/").with_status(200).create_async().await;

    let backend = Ollama::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("GET", "/").with_status(500).create_async().await;

    let backend = Ollama::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_loads_and_generates() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let show_mock = server
        .mock("POST", "/api/show")
        .match_body(Matcher::PartialJson(json!({
            "model": "qwen2.5:0.5b-instruct"
        })))
        .with_status(200)
        .with_body(ollama_show_fixture("Q4_K_M"))
        .create_async()
        .await;
    let warmup_mock = server
        .mock("POST", "/api/generate")
        .match_body(Matcher::PartialJson(json!({
            "model": "qwen2.5:0.5b-instruct",
            "prompt": "",
            "stream": false,
            "options": { "num_gpu": 0 }
        })))
        .with_status(200)
        .with_body(r#"{"model":"qwen2.5:0.5b-instruct","response":"","done":true}"#)
        .create_async()
        .await;
    let chat_mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "model": "qwen2.5:0.5b-instruct",
            "stream": false,
            "messages": [
                { "role": "system", "content": "You are a helpful assistant." },
                { "role": "user", "content": "Tell me a funny joke." }
            ],
            "options": { "num_predict": 128, "num_gpu": 0 }
        })))
        .with_status(200)
        .with_body(ollama_chat_fixture("Why did the chicken join a band?"))
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let engine = backend
        .load("qwen2.5:0.5b-instruct", &q4_on(Device::Cpu))
        .await?;
    let output = engine
        .generate(
            &ConversationRequest::new("You are a helpful assistant.", "Tell me a funny joke."),
            &GenerationOptions::default(),
        )
        .await?;

    show_mock.assert_async().await;
    warmup_mock.assert_async().await;
    chat_mock.assert_async().await;

    assert_eq!(output.generated_turns.len(), 3);
    assert_eq!(
        output.generated_turns[2],
        ChatMessage::new(Role::Assistant, "Why did the chicken join a band?")
    );
    assert_eq!(
        output.last_turn_text()?,
        "Why did the chicken join a band?"
    );

    return Ok(());
}

#[tokio::test]
async fn it_fails_to_load_missing_models() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/show")
        .with_status(404)
        .with_body(r#"{"error":"model 'nope' not found"}"#)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let res = backend.load("nope", &q4_on(Device::Auto)).await;

    mock.assert_async().await;
    assert!(res.is_err());
    insta::assert_snapshot!(res.err().unwrap().to_string(), @"Ollama failed to find the model (status 404): model 'nope' not found");
}

#[tokio::test]
async fn it_rejects_mismatched_precision() {
    let mut server = mockito::Server::new_async().await;
    let show_mock = server
        .mock("POST", "/api/show")
        .with_status(200)
        .with_body(ollama_show_fixture("Q8_0"))
        .create_async()
        .await;
    let warmup_mock = server
        .mock("POST", "/api/generate")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let res = backend
        .load("qwen2.5:0.5b-instruct", &q4_on(Device::Auto))
        .await;

    show_mock.assert_async().await;
    warmup_mock.assert_async().await;
    insta::assert_snapshot!(res.err().unwrap().to_string(), @"Model qwen2.5:0.5b-instruct is quantized as Q8_0, which does not match the requested precision q4");
}

#[tokio::test]
async fn it_surfaces_warmup_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/show")
        .with_status(200)
        .with_body(ollama_show_fixture("Q4_K_M"))
        .create_async()
        .await;
    server
        .mock("POST", "/api/generate")
        .with_status(500)
        .with_body(r#"{"error":"device not supported"}"#)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let res = backend
        .load("qwen2.5:0.5b-instruct", &q4_on(Device::Gpu))
        .await;

    let err = res.err().unwrap().to_string();
    assert!(err.contains("device not supported"));
}

#[tokio::test]
async fn it_rejects_unexpected_chat_shapes() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/show")
        .with_status(200)
        .with_body(ollama_show_fixture("Q4_K_M"))
        .create_async()
        .await;
    server
        .mock("POST", "/api/generate")
        .with_status(200)
        .with_body(r#"{"done":true}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body(r#"{"done":true,"response":"wrong endpoint shape"}"#)
        .create_async()
        .await;

    let backend = Ollama::with_url(server.url());
    let engine = backend
        .load("qwen2.5:0.5b-instruct", &q4_on(Device::Auto))
        .await?;
    let res = engine
        .generate(
            &ConversationRequest::new("a", "b"),
            &GenerationOptions::default(),
        )
        .await;

    let err = res.err().unwrap().to_string();
    assert!(err.starts_with("Unexpected chat response from Ollama"));

    return Ok(());
}

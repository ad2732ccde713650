#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConversationRequest;
use crate::domain::models::Device;
use crate::domain::models::Engine;
use crate::domain::models::EngineBox;
use crate::domain::models::GenerationOptions;
use crate::domain::models::GenerationOutput;
use crate::domain::models::LoadOptions;
use crate::domain::models::Precision;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Model {
    id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    data: Vec<Model>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionChoiceResponse {
    message: ChatMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoiceResponse>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

fn with_token(req: reqwest::RequestBuilder, token: &str) -> reqwest::RequestBuilder {
    if token.is_empty() {
        return req;
    }

    return req.header("Authorization", format!("Bearer {token}"));
}

async fn response_error(res: reqwest::Response, action: &str) -> anyhow::Error {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|err| return err.error.message)
        .unwrap_or(body);

    tracing::error!(status, message, "OpenAI failed to {action}");
    if message.is_empty() {
        return anyhow!("OpenAI failed to {action} (status {status})");
    }

    return anyhow!("OpenAI failed to {action} (status {status}): {message}");
}

/// Any server speaking the OpenAI chat completions API, such as llama.cpp's
/// `llama-server`, LM Studio or vLLM.
pub struct OpenAI {
    url: String,
    token: String,
    timeout: String,
}

impl Default for OpenAI {
    fn default() -> OpenAI {
        return OpenAI {
            url: Config::get(ConfigKey::OpenAiURL),
            token: Config::get(ConfigKey::OpenAiToken),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for OpenAI {
    fn name(&self) -> BackendName {
        return BackendName::OpenAI;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("OpenAI URL is not defined");
        }

        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "OpenAI is not reachable");
                bail!("OpenAI is not reachable");
            }
        };

        // Servers differ on what the index returns, only server errors count.
        if status >= 500 {
            tracing::error!(status = status, "OpenAI health check failed");
            bail!("OpenAI health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn load(&self, model: &str, options: &LoadOptions) -> Result<EngineBox> {
        if options.precision != Precision::Auto || options.device != Device::Auto {
            tracing::warn!(
                precision = %options.precision,
                device = %options.device,
                "OpenAI compatible servers choose precision and device themselves, ignoring"
            );
        }

        let client = reqwest::Client::new();
        let res = with_token(
            client.get(format!("{url}/v1/models", url = self.url)),
            &self.token,
        )
        .send()
        .await?;

        if !res.status().is_success() {
            return Err(response_error(res, "list models").await);
        }

        let mut models = res
            .json::<ModelListResponse>()
            .await?
            .data
            .into_iter()
            .map(|model| {
                return model.id;
            })
            .collect::<Vec<String>>();
        models.sort();

        if !models.contains(&model.to_string()) {
            bail!(format!(
                "Model {model} is not served by {url}. Available models: {}",
                models.join(", "),
                url = self.url
            ));
        }

        return Ok(Arc::new(OpenAIEngine {
            client,
            url: self.url.to_string(),
            token: self.token.to_string(),
            model: model.to_string(),
        }));
    }
}

pub struct OpenAIEngine {
    client: reqwest::Client,
    url: String,
    token: String,
    model: String,
}

#[async_trait]
impl Engine for OpenAIEngine {
    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        request: &ConversationRequest,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput> {
        let req = CompletionRequest {
            model: self.model.to_string(),
            messages: request.messages().to_vec(),
            max_tokens: options.max_new_tokens,
            stream: false,
        };

        let res = with_token(
            self.client
                .post(format!("{url}/v1/chat/completions", url = self.url)),
            &self.token,
        )
        .json(&req)
        .send()
        .await?;

        if !res.status().is_success() {
            return Err(response_error(res, "generate a response").await);
        }

        let body = res.text().await?;
        let ores = serde_json::from_str::<CompletionResponse>(&body)
            .map_err(|err| return anyhow!("Unexpected completion response from OpenAI: {err}"))?;
        tracing::debug!(body = ?ores, "Completion response");

        if let Some(choice) = ores.choices.into_iter().last() {
            return Ok(GenerationOutput::from_reply(request, choice.message));
        }

        bail!("OpenAI returned no choices");
    }
}

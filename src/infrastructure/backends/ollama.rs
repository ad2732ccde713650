#[cfg(test)]
#[path = "ollama_test.rs"]
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

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ShowRequest {
    model: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelDetails {
    #[serde(default)]
    quantization_level: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ShowResponse {
    #[serde(default)]
    details: ModelDetails,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RuntimeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_gpu: Option<u32>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct WarmupRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: RuntimeOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: RuntimeOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
    #[serde(default)]
    done: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

fn num_gpu(device: Device) -> Option<u32> {
    match device {
        Device::Auto => return None,
        Device::Cpu => return Some(0),
        // Ollama caps this at the number of layers the model has.
        Device::Gpu => return Some(999),
    }
}

async fn response_error(res: reqwest::Response, action: &str) -> anyhow::Error {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|err| return err.error)
        .unwrap_or(body);

    tracing::error!(status, message, "Ollama failed to {action}");
    if message.is_empty() {
        return anyhow!("Ollama failed to {action} (status {status})");
    }

    return anyhow!("Ollama failed to {action} (status {status}): {message}");
}

pub struct Ollama {
    url: String,
    timeout: String,
}

impl Default for Ollama {
    fn default() -> Ollama {
        return Ollama {
            url: Config::get(ConfigKey::OllamaURL),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for Ollama {
    fn name(&self) -> BackendName {
        return BackendName::Ollama;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = reqwest::Client::new()
            .get(&self.url)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        if let Err(err) = res {
            tracing::error!(error = ?err, "Ollama is not running");
            bail!("Ollama is not running");
        }

        if let Ok(res) = res {
            if res.status() != 200 {
                tracing::error!(status = res.status().as_u16(), "Ollama health check failed");
                bail!("Ollama health check failed");
            }
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn load(&self, model: &str, options: &LoadOptions) -> Result<EngineBox> {
        let client = reqwest::Client::new();

        let res = client
            .post(format!("{url}/api/show", url = self.url))
            .json(&ShowRequest {
                model: model.to_string(),
            })
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(response_error(res, "find the model").await);
        }

        let show = res.json::<ShowResponse>().await?;
        let quantization = show.details.quantization_level;
        tracing::debug!(model, quantization, "Model details");
        if !options.precision.matches_quantization(&quantization) {
            bail!(format!(
                "Model {model} is quantized as {quantization}, which does not match the requested precision {}",
                options.precision
            ));
        }

        // An empty prompt makes Ollama load the weights and return right away.
        let res = client
            .post(format!("{url}/api/generate", url = self.url))
            .json(&WarmupRequest {
                model: model.to_string(),
                prompt: "".to_string(),
                stream: false,
                options: RuntimeOptions {
                    num_predict: None,
                    num_gpu: num_gpu(options.device),
                },
            })
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(response_error(res, "load the model").await);
        }

        return Ok(Arc::new(OllamaEngine {
            client,
            url: self.url.to_string(),
            model: model.to_string(),
            device: options.device,
        }));
    }
}

pub struct OllamaEngine {
    client: reqwest::Client,
    url: String,
    model: String,
    device: Device,
}

#[async_trait]
impl Engine for OllamaEngine {
    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        request: &ConversationRequest,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput> {
        let req = ChatRequest {
            model: self.model.to_string(),
            messages: request.messages().to_vec(),
            stream: false,
            options: RuntimeOptions {
                num_predict: Some(options.max_new_tokens),
                num_gpu: num_gpu(self.device),
            },
        };

        let res = self
            .client
            .post(format!("{url}/api/chat", url = self.url))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(response_error(res, "generate a response").await);
        }

        let body = res.text().await?;
        let ores = serde_json::from_str::<ChatResponse>(&body)
            .map_err(|err| return anyhow!("Unexpected chat response from Ollama: {err}"))?;
        tracing::debug!(body = ?ores, "Chat response");

        return Ok(GenerationOutput::from_reply(request, ores.message));
    }
}

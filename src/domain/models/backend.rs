#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::ConversationRequest;
use super::GenerationOutput;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Ollama,
    OpenAI,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

/// Numeric precision the model weights are expected to be quantized to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Precision {
    Auto,
    Q4,
    Q8,
    Fp16,
}

impl Precision {
    pub fn parse(text: String) -> Option<Precision> {
        return Precision::iter().find(|e| return e.to_string() == text);
    }

    /// Checks a quantization label as reported by a model server, such as
    /// `Q4_K_M`, `Q8_0` or `F16`.
    pub fn matches_quantization(&self, quantization: &str) -> bool {
        let quantization = quantization.trim().to_uppercase();
        match self {
            Precision::Auto => return true,
            Precision::Q4 => return quantization.starts_with("Q4"),
            Precision::Q8 => return quantization.starts_with("Q8"),
            Precision::Fp16 => return quantization == "F16" || quantization == "FP16",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Device {
    Auto,
    Cpu,
    Gpu,
}

impl Device {
    pub fn parse(text: String) -> Option<Device> {
        return Device::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    pub precision: Precision,
    pub device: Device,
}

impl Default for LoadOptions {
    fn default() -> LoadOptions {
        return LoadOptions {
            precision: Precision::Q4,
            device: Device::Auto,
        };
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationOptions {
    pub max_new_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> GenerationOptions {
        return GenerationOptions {
            max_new_tokens: 128,
        };
    }
}

pub type BackendBox = Box<dyn Backend>;
pub type EngineBox = Arc<dyn Engine>;

#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> BackendName;

    /// Used at startup to verify the model server is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Prepares a model for generation and returns a handle to it. This is
    /// the expensive step: the model server may need to read weights from
    /// disk and move them on to the requested device.
    async fn load(&self, model: &str, options: &LoadOptions) -> Result<EngineBox>;
}

#[async_trait]
pub trait Engine: Send + Sync {
    /// Runs the chat template over the request and generates a single
    /// assistant turn. The returned turns are the input turns followed by
    /// whatever the model produced.
    async fn generate(
        &self,
        request: &ConversationRequest,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput>;
}

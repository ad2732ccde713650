use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConversationRequest;
use crate::domain::models::Engine;
use crate::domain::models::EngineBox;
use crate::domain::models::GenerationOptions;
use crate::domain::models::GenerationOutput;
use crate::domain::models::LoadOptions;
use crate::domain::models::Role;

/// Everything the fake saw, shared with the test after the backend has been
/// moved into a session.
#[derive(Clone, Default)]
pub struct FakeProbe {
    loads: Arc<AtomicUsize>,
    load_calls: Arc<Mutex<Vec<(String, LoadOptions)>>>,
    requests: Arc<Mutex<Vec<(ConversationRequest, GenerationOptions)>>>,
}

impl FakeProbe {
    pub fn loads(&self) -> usize {
        return self.loads.load(Ordering::SeqCst);
    }

    pub fn load_calls(&self) -> Vec<(String, LoadOptions)> {
        return self.load_calls.lock().unwrap().clone();
    }

    pub fn requests(&self) -> Vec<(ConversationRequest, GenerationOptions)> {
        return self.requests.lock().unwrap().clone();
    }
}

#[derive(Default)]
pub struct FakeBackend {
    probe: FakeProbe,
    failing_loads: AtomicUsize,
    load_error: String,
    load_delay: Option<Duration>,
    load_gate: Option<Arc<Notify>>,
    output: Option<GenerationOutput>,
    generate_error: Option<String>,
}

impl FakeBackend {
    pub fn probe(&self) -> FakeProbe {
        return self.probe.clone();
    }

    /// Fails the next `count` loads with `message`.
    pub fn with_load_failures(mut self, count: usize, message: &str) -> FakeBackend {
        self.failing_loads = AtomicUsize::new(count);
        self.load_error = message.to_string();
        return self;
    }

    pub fn with_load_delay(mut self, delay: Duration) -> FakeBackend {
        self.load_delay = Some(delay);
        return self;
    }

    /// Loads block until the gate is notified.
    pub fn with_load_gate(mut self, gate: Arc<Notify>) -> FakeBackend {
        self.load_gate = Some(gate);
        return self;
    }

    pub fn with_output(mut self, output: GenerationOutput) -> FakeBackend {
        self.output = Some(output);
        return self;
    }

    pub fn with_generate_error(mut self, message: &str) -> FakeBackend {
        self.generate_error = Some(message.to_string());
        return self;
    }
}

#[async_trait]
impl Backend for FakeBackend {
    fn name(&self) -> BackendName {
        return BackendName::Ollama;
    }

    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    async fn load(&self, model: &str, options: &LoadOptions) -> Result<EngineBox> {
        self.probe.loads.fetch_add(1, Ordering::SeqCst);
        self.probe
            .load_calls
            .lock()
            .unwrap()
            .push((model.to_string(), *options));

        if let Some(gate) = &self.load_gate {
            gate.notified().await;
        }
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }

        let remaining = self.failing_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_loads.store(remaining - 1, Ordering::SeqCst);
            bail!(self.load_error.to_string());
        }

        return Ok(Arc::new(FakeEngine {
            probe: self.probe.clone(),
            output: self.output.clone(),
            error: self.generate_error.clone(),
        }));
    }
}

pub struct FakeEngine {
    probe: FakeProbe,
    output: Option<GenerationOutput>,
    error: Option<String>,
}

#[async_trait]
impl Engine for FakeEngine {
    async fn generate(
        &self,
        request: &ConversationRequest,
        options: &GenerationOptions,
    ) -> Result<GenerationOutput> {
        self.probe
            .requests
            .lock()
            .unwrap()
            .push((request.clone(), *options));

        if let Some(err) = &self.error {
            bail!(err.to_string());
        }

        if let Some(output) = &self.output {
            return Ok(output.clone());
        }

        return Ok(GenerationOutput::from_reply(
            request,
            ChatMessage::new(Role::Assistant, "Why did..."),
        ));
    }
}

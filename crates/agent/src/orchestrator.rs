//! The chat orchestrator — ties memory, template, and model together.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use confab_config::AppConfig;
use confab_core::model::{ChatModel, CompletionRequest};
use confab_core::{Error, Turn};
use confab_tools::ToolCatalog;

use crate::memory::WindowMemory;
use crate::template::PromptTemplate;

/// The persona presented to the model when no override is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Hello! I'm your friendly virtual assistant. \
I'm here to help you reflect on your experiences and emotions. \
Please tell me what you would like to discuss today.";

/// Orchestrates a single chat exchange: render the prompt, replay the
/// window, call the model, record the pair.
pub struct ChatOrchestrator {
    /// The model backend
    model: Arc<dyn ChatModel>,

    /// The model to request
    model_name: String,

    /// Temperature setting
    temperature: f32,

    /// Max tokens per reply (backend default when unset)
    max_tokens: Option<u32>,

    /// System persona, sent first on every request and never stored
    system_prompt: String,

    /// Pre-rendered prompt template
    template: PromptTemplate,

    /// One shared buffer per process: every caller continues the same
    /// conversation. Per-session memory would key buffers by a session id
    /// instead of sharing this one.
    memory: Mutex<WindowMemory>,
}

impl ChatOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        model: Arc<dyn ChatModel>,
        model_name: impl Into<String>,
        catalog: &ToolCatalog,
        window: usize,
    ) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            temperature: 0.7,
            max_tokens: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            template: PromptTemplate::new(catalog),
            memory: Mutex::new(WindowMemory::new(window)),
        }
    }

    /// Build an orchestrator from application configuration.
    pub fn from_config(
        model: Arc<dyn ChatModel>,
        catalog: &ToolCatalog,
        config: &AppConfig,
    ) -> Self {
        let mut orchestrator = Self::new(model, &config.model, catalog, config.memory.window)
            .with_temperature(config.temperature);
        if let Some(max_tokens) = config.max_tokens {
            orchestrator = orchestrator.with_max_tokens(max_tokens);
        }
        if let Some(prompt) = &config.system_prompt {
            orchestrator = orchestrator.with_system_prompt(prompt);
        }
        orchestrator
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Replace the default system persona.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Handle one user query and return the model's reply.
    ///
    /// On success the raw query and the reply are appended to memory as one
    /// adjacent pair. On any failure memory is untouched and the error is
    /// logged with its full cause chain before being returned.
    pub async fn handle_query(&self, query: &str) -> Result<String, Error> {
        let prompt = self.template.render(query);

        let mut turns = Vec::new();
        turns.push(Turn::system(&self.system_prompt));
        {
            let memory = self.memory.lock().await;
            turns.extend(memory.window());
        }
        turns.push(Turn::user(&prompt));

        debug!(turns = turns.len(), model = %self.model_name, "Assembled completion request");

        let mut request = CompletionRequest::new(&self.model_name, turns);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        // The remote call runs with the memory lock released; only the
        // append below takes it again.
        match self.model.complete(request).await {
            Ok(completion) => {
                if let Some(usage) = &completion.usage {
                    debug!(
                        total_tokens = usage.total_tokens,
                        model = %completion.model,
                        "Completion received"
                    );
                }

                let mut memory = self.memory.lock().await;
                memory.append(Turn::user(query));
                memory.append(Turn::assistant(&completion.content));
                drop(memory);

                info!(reply_chars = completion.content.len(), "Handled chat query");
                Ok(completion.content)
            }
            Err(e) => {
                let err = Error::from(e);
                error!(error = %err.chain(), "Failed to handle chat query");
                Err(err)
            }
        }
    }

    /// Snapshot of the retained conversation window, oldest first.
    pub async fn history(&self) -> Vec<Turn> {
        self.memory.lock().await.window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use confab_core::error::ModelError;
    use confab_core::model::{Completion, TokenUsage};
    use confab_core::Role;

    /// A mock model that returns a fixed reply.
    struct MockModel {
        response: String,
    }

    #[async_trait]
    impl ChatModel for MockModel {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<Completion, ModelError> {
            Ok(Completion {
                content: self.response.clone(),
                model: "mock-model".into(),
                usage: Some(TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
            })
        }
    }

    /// Echoes the final turn it was sent, after a short pause.
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError> {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            let last = request.turns.last().map(|t| t.content.clone()).unwrap_or_default();
            Ok(Completion {
                content: last,
                model: "echo-model".into(),
                usage: None,
            })
        }
    }

    /// Records every request it receives.
    struct CapturingModel {
        seen: std::sync::Mutex<Vec<CompletionRequest>>,
        response: String,
    }

    #[async_trait]
    impl ChatModel for CapturingModel {
        fn name(&self) -> &str {
            "capturing"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<Completion, ModelError> {
            self.seen.lock().unwrap().push(request);
            Ok(Completion {
                content: self.response.clone(),
                model: "capturing-model".into(),
                usage: None,
            })
        }
    }

    /// Always fails with an authentication error.
    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<Completion, ModelError> {
            Err(ModelError::AuthenticationFailed("invalid API key".into()))
        }
    }

    fn orchestrator(model: Arc<dyn ChatModel>, window: usize) -> ChatOrchestrator {
        ChatOrchestrator::new(model, "mock-model", &ToolCatalog::default(), window)
    }

    #[tokio::test]
    async fn success_appends_raw_query_and_reply() {
        let agent = orchestrator(
            Arc::new(MockModel {
                response: "That sounds like a good week.".into(),
            }),
            5,
        );

        let reply = agent.handle_query("My week was busy").await.unwrap();
        assert_eq!(reply, "That sounds like a good week.");

        let history = agent.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        // Raw text, not the rendered prompt
        assert_eq!(history[0].content, "My week was busy");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "That sounds like a good week.");
    }

    #[tokio::test]
    async fn failure_leaves_memory_unchanged() {
        let agent = orchestrator(Arc::new(FailingModel), 5);

        let err = agent.handle_query("hello").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::AuthenticationFailed(_))
        ));
        assert!(agent.history().await.is_empty());
    }

    #[tokio::test]
    async fn request_carries_system_window_and_prompt() {
        let model = Arc::new(CapturingModel {
            seen: std::sync::Mutex::new(Vec::new()),
            response: "ok".into(),
        });
        let agent = ChatOrchestrator::new(
            model.clone(),
            "mock-model",
            &ToolCatalog::default(),
            5,
        );

        agent.handle_query("first question").await.unwrap();
        agent.handle_query("second question").await.unwrap();

        let seen = model.seen.lock().unwrap();

        // First request: system + templated user turn, nothing else
        let first = &seen[0];
        assert_eq!(first.turns.len(), 2);
        assert_eq!(first.turns[0].role, Role::System);
        assert_eq!(first.turns[0].content, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(first.turns[1].role, Role::User);
        assert!(first.turns[1].content.ends_with("User message:\nfirst question"));

        // Second request replays the first exchange with raw contents
        let second = &seen[1];
        assert_eq!(second.turns.len(), 4);
        assert_eq!(second.turns[1].content, "first question");
        assert_eq!(second.turns[2].content, "ok");
        assert!(second.turns[3].content.ends_with("User message:\nsecond question"));
    }

    #[tokio::test]
    async fn six_exchanges_keep_only_five() {
        let agent = orchestrator(Arc::new(EchoModel), 5);

        for n in 1..=6 {
            agent.handle_query(&format!("question {n}")).await.unwrap();
        }

        let history = agent.history().await;
        assert_eq!(history.len(), 10);
        // Exchange 1 evicted, 2..=6 retained in order
        assert_eq!(history[0].content, "question 2");
        assert_eq!(history[8].content, "question 6");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_queries_keep_pairs_adjacent() {
        let agent = Arc::new(orchestrator(Arc::new(EchoModel), 16));

        let mut handles = Vec::new();
        for n in 0..8 {
            let agent = agent.clone();
            handles.push(tokio::spawn(async move {
                agent.handle_query(&format!("concurrent {n}")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let history = agent.history().await;
        assert_eq!(history.len(), 16);
        for pair in history.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            // The echoed reply embeds the raw query it belongs to
            assert!(pair[1].content.contains(&pair[0].content));
        }
    }

    #[tokio::test]
    async fn config_overrides_apply() {
        let mut config = AppConfig::default();
        config.system_prompt = Some("You are a terse assistant.".into());
        config.max_tokens = Some(256);

        let model = Arc::new(CapturingModel {
            seen: std::sync::Mutex::new(Vec::new()),
            response: "ok".into(),
        });
        let agent = ChatOrchestrator::from_config(model.clone(), &ToolCatalog::default(), &config);

        agent.handle_query("hi").await.unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].turns[0].content, "You are a terse assistant.");
        assert_eq!(seen[0].max_tokens, Some(256));
        assert_eq!(seen[0].model, "llama3-8b-8192");
    }
}

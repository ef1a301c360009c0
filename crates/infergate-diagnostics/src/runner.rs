//! Diagnostic runner: an ordered connectivity suite against one gateway.
//!
//! Stages run sequentially and later stages may read earlier verdicts.
//! An error inside a stage becomes that stage's verdict (LIMITED for tool
//! calling, FAIL elsewhere). A panic is always FAIL. The run always produces
//! four results.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use serde_json::{json, Value};
use tracing::{info, warn};

use infergate_core::config::schema::DEFAULT_EXPECTED_DIMENSIONS;
use infergate_core::config::DiagnosticsConfig;
use infergate_core::{
    cosine_similarity, ChatMessage, ConfigError, EmbeddingError, EndpointConfig, ToolError,
};
use infergate_providers::{ChatBackend, ChatClient, EmbeddingBackend, EmbeddingClient, ToolSet, ToolSpec};

use crate::report::{truncate_string, DiagnosticReport, DiagnosticResult, Stage, Verdict};

const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Respond in exactly one short sentence.";
const CHAT_USER_PROMPT: &str = "Say hello and confirm you are working.";

const TOOL_NAME: &str = "test_search";
const TOOL_PROMPT: &str = "Search for information about predictive maintenance";

const EMBEDDING_TEXT: &str = "Predictive maintenance for manufacturing equipment";

/// Two related texts and one unrelated; sim(0,1) should beat sim(0,2).
const SIMILARITY_TEXTS: [&str; 3] = [
    "Equipment failure prediction using vibration analysis",
    "Machine breakdown forecasting with sensor data",
    "The weather today is sunny and warm",
];

/// Models known to handle OpenAI-style tool calling on NIM.
const TOOL_CAPABLE_MODELS: [&str; 2] = ["meta/llama-3.1-70b-instruct", "meta/llama-3.1-8b-instruct"];

/// Tunables for a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticOptions {
    /// Dimensionality the embedding stage expects.
    pub expected_dimensions: usize,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        Self {
            expected_dimensions: DEFAULT_EXPECTED_DIMENSIONS,
        }
    }
}

impl From<&DiagnosticsConfig> for DiagnosticOptions {
    fn from(config: &DiagnosticsConfig) -> Self {
        Self {
            expected_dimensions: config.expected_dimensions,
        }
    }
}

/// Runs the four stages against any chat/embedding backends.
pub struct DiagnosticRunner {
    chat: Arc<dyn ChatBackend>,
    embeddings: Arc<dyn EmbeddingBackend>,
    options: DiagnosticOptions,
}

impl DiagnosticRunner {
    pub fn new(
        chat: Arc<dyn ChatBackend>,
        embeddings: Arc<dyn EmbeddingBackend>,
        options: DiagnosticOptions,
    ) -> Self {
        Self {
            chat,
            embeddings,
            options,
        }
    }

    /// Run every stage in order and collect the report.
    pub async fn run(&self) -> DiagnosticReport {
        let mut report = DiagnosticReport::default();

        for stage in Stage::ALL {
            let started = Instant::now();
            let outcome = AssertUnwindSafe(self.run_stage(stage, &report))
                .catch_unwind()
                .await;

            let mut result = outcome.unwrap_or_else(|_| {
                warn!(stage = stage.name(), "diagnostic stage panicked");
                DiagnosticResult::new(stage, Verdict::Fail, "stage aborted unexpectedly")
            });
            result.elapsed = started.elapsed();

            info!(
                stage = stage.name(),
                verdict = result.verdict.label(),
                elapsed_ms = result.elapsed.as_millis() as u64,
                "diagnostic stage finished"
            );
            report.push(result);
        }

        report
    }

    async fn run_stage(&self, stage: Stage, earlier: &DiagnosticReport) -> DiagnosticResult {
        match stage {
            Stage::ChatReachability => self.check_chat().await,
            Stage::ToolCalling => self.check_tool_calling(earlier).await,
            Stage::EmbeddingGeneration => self.check_embedding().await,
            Stage::SemanticSimilarity => self.check_similarity(earlier).await,
        }
    }

    // ── Stage 1 ──

    async fn check_chat(&self) -> DiagnosticResult {
        let stage = Stage::ChatReachability;
        let conversation = [
            ChatMessage::system(CHAT_SYSTEM_PROMPT),
            ChatMessage::human(CHAT_USER_PROMPT),
        ];

        match self.chat.invoke(&conversation).await {
            Ok(resp) if !resp.content.trim().is_empty() => DiagnosticResult::new(
                stage,
                Verdict::Pass,
                format!("{}: \"{}\"", self.chat.model(), truncate_string(resp.content.trim(), 100)),
            ),
            Ok(_) => DiagnosticResult::new(stage, Verdict::Fail, "model replied without any text")
                .with_hint(format!("Check that {} is a chat model", self.chat.model())),
            Err(e) => DiagnosticResult::new(stage, Verdict::Fail, e.to_string())
                .with_hint("Check that the gateway base URL is correct and reachable")
                .with_hint("Check that the API key is set, if the gateway requires one")
                .with_hint(format!("Check that {} is deployed on the gateway", self.chat.model())),
        }
    }

    // ── Stage 2 ──

    fn search_tools() -> Result<ToolSet, ToolError> {
        ToolSet::from_specs([ToolSpec::new(
            TOOL_NAME,
            "Search for information",
            json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "The search query" }
                },
                "required": ["query"]
            }),
            |args: &Value| {
                let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
                Ok(format!("Result for: {query}"))
            },
        )])
    }

    async fn check_tool_calling(&self, earlier: &DiagnosticReport) -> DiagnosticResult {
        let stage = Stage::ToolCalling;
        let tools = match Self::search_tools() {
            Ok(tools) => tools,
            Err(e) => return DiagnosticResult::new(stage, Verdict::Fail, e.to_string()),
        };
        let conversation = [ChatMessage::human(TOOL_PROMPT)];

        match self.chat.invoke_with_tools(&conversation, &tools).await {
            Ok(resp) if resp.has_tool_calls() => {
                let call = &resp.tool_calls[0];
                let output = tools
                    .dispatch(call)
                    .unwrap_or_else(|e| format!("not dispatched: {e}"));
                DiagnosticResult::new(
                    stage,
                    Verdict::Pass,
                    format!("called {} with {} -> {output}", call.name, call.arguments),
                )
            }
            Ok(resp) => with_tool_support_hints(DiagnosticResult::new(
                stage,
                Verdict::Limited,
                format!(
                    "no tool call; model replied with text: \"{}\"",
                    truncate_string(resp.content.trim(), 100)
                ),
            )),
            // Servers without tool support reject the request outright.
            Err(e) => {
                let result = DiagnosticResult::new(stage, Verdict::Limited, e.to_string());
                if earlier.verdict(Stage::ChatReachability) == Some(Verdict::Fail) {
                    result.with_hint("Chat endpoint is unreachable; fix the LLM connection first")
                } else {
                    with_tool_support_hints(result)
                }
            }
        }
    }

    // ── Stage 3 ──

    async fn check_embedding(&self) -> DiagnosticResult {
        let stage = Stage::EmbeddingGeneration;
        let expected = self.options.expected_dimensions;

        let vector = match self.embeddings.embed_one(EMBEDDING_TEXT).await {
            Ok(v) => v,
            Err(e) => {
                return DiagnosticResult::new(stage, Verdict::Fail, e.to_string())
                    .with_hint(format!(
                        "Check that {} is deployed on the gateway",
                        self.embeddings.model()
                    ))
                    .with_hint("Check that the gateway serves the /embeddings endpoint");
            }
        };

        let preview = vector
            .iter()
            .take(5)
            .map(|x| format!("{x:.4}"))
            .collect::<Vec<_>>()
            .join(", ");
        let detail = format!("{} dimensions, first values [{preview}...]", vector.len());

        if vector.len() == expected {
            DiagnosticResult::new(stage, Verdict::Pass, detail)
        } else {
            DiagnosticResult::new(
                stage,
                Verdict::Warn,
                format!("{detail}; expected {expected}"),
            )
            .with_hint(format!(
                "Dimensions ({}) differ from the vector index configuration ({expected})",
                vector.len()
            ))
            .with_hint(format!("Use an embedding model producing {expected} dimensions, or"))
            .with_hint("re-embed existing data and recreate the vector search indexes")
        }
    }

    // ── Stage 4 ──

    async fn check_similarity(&self, earlier: &DiagnosticReport) -> DiagnosticResult {
        let stage = Stage::SemanticSimilarity;
        let [t0, t1, t2] = SIMILARITY_TEXTS;

        // Wait for all three, then report every failure, not just the first.
        let (r0, r1, r2) = tokio::join!(
            self.embeddings.embed_one(t0),
            self.embeddings.embed_one(t1),
            self.embeddings.embed_one(t2),
        );

        let failures: Vec<String> = [(t0, &r0), (t1, &r1), (t2, &r2)]
            .into_iter()
            .filter_map(|(text, r)| r.as_ref().err().map(|e| describe_failure(text, e)))
            .collect();

        let (e0, e1, e2) = match (r0, r1, r2) {
            (Ok(a), Ok(b), Ok(c)) => (a, b, c),
            _ => {
                let result = DiagnosticResult::new(stage, Verdict::Fail, failures.join("; "));
                if earlier.verdict(Stage::EmbeddingGeneration) == Some(Verdict::Fail) {
                    return result.with_hint("Embedding generation already failed; fix that first");
                }
                return result;
            }
        };

        let sims = cosine_similarity(&e0, &e1).and_then(|related| {
            cosine_similarity(&e0, &e2).map(|unrelated| (related, unrelated))
        });
        let (related, unrelated) = match sims {
            Ok(pair) => pair,
            Err(e) => {
                return DiagnosticResult::new(stage, Verdict::Warn, format!("similarity undefined: {e}"))
            }
        };

        let detail = format!(
            "related {:.1}% vs unrelated {:.1}%",
            related * 100.0,
            unrelated * 100.0
        );
        if related > unrelated {
            DiagnosticResult::new(stage, Verdict::Pass, detail)
        } else {
            DiagnosticResult::new(stage, Verdict::Warn, format!("unexpected ordering: {detail}"))
                .with_hint(format!(
                    "{} may not be a semantic embedding model",
                    self.embeddings.model()
                ))
        }
    }
}

fn with_tool_support_hints(result: DiagnosticResult) -> DiagnosticResult {
    result
        .with_hint("This model may not support tool calling; agent workflows will be limited")
        .with_hint(format!(
            "Models with tool calling support: {}",
            TOOL_CAPABLE_MODELS.join(", ")
        ))
}

fn describe_failure(text: &str, err: &EmbeddingError) -> String {
    format!("\"{}\": {err}", truncate_string(text, 40))
}

/// Validate `config`, build HTTP clients, and run the full suite.
///
/// Invalid configuration is returned as an error before any stage runs.
pub async fn run_diagnostics(
    config: &EndpointConfig,
    options: DiagnosticOptions,
) -> Result<DiagnosticReport, ConfigError> {
    config.validate()?;

    let chat = ChatClient::new(config.clone());
    let embeddings = EmbeddingClient::new(config.clone())?;

    info!(
        base_url = config.base_url(),
        completion_model = config.completion_model(),
        embedding_model = config.embedding_model(),
        "running gateway diagnostics"
    );

    let runner = DiagnosticRunner::new(Arc::new(chat), Arc::new(embeddings), options);
    Ok(runner.run().await)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

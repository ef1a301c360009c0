//! Diagnostic report model: per-stage verdicts and the overall exit status.

use std::fmt;
use std::time::Duration;

/// Outcome of one diagnostic stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Pass,
    Fail,
    /// Reachable, but a capability is degraded (e.g. no tool calling).
    Limited,
    /// Works, but something deserves a look (dimension mismatch, odd similarity).
    Warn,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::Limited => "LIMITED",
            Verdict::Warn => "WARN",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four stages, in run order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    ChatReachability,
    ToolCalling,
    EmbeddingGeneration,
    SemanticSimilarity,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::ChatReachability,
        Stage::ToolCalling,
        Stage::EmbeddingGeneration,
        Stage::SemanticSimilarity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::ChatReachability => "LLM Connection",
            Stage::ToolCalling => "Tool Calling",
            Stage::EmbeddingGeneration => "Embeddings",
            Stage::SemanticSimilarity => "Semantic Similarity",
        }
    }

    /// A failed critical stage makes the whole run fail.
    pub fn is_critical(self) -> bool {
        matches!(self, Stage::ChatReachability | Stage::EmbeddingGeneration)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one stage.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticResult {
    pub stage: Stage,
    pub verdict: Verdict,
    pub detail: String,
    /// Remediation hints for the operator; empty on a clean pass.
    pub hints: Vec<String>,
    pub elapsed: Duration,
}

impl DiagnosticResult {
    pub fn new(stage: Stage, verdict: Verdict, detail: impl Into<String>) -> Self {
        Self {
            stage,
            verdict,
            detail: detail.into(),
            hints: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.stage.name()
    }
}

/// Ordered results of one run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiagnosticReport {
    results: Vec<DiagnosticResult>,
}

impl DiagnosticReport {
    pub fn push(&mut self, result: DiagnosticResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[DiagnosticResult] {
        &self.results
    }

    pub fn get(&self, stage: Stage) -> Option<&DiagnosticResult> {
        self.results.iter().find(|r| r.stage == stage)
    }

    pub fn verdict(&self, stage: Stage) -> Option<Verdict> {
        self.get(stage).map(|r| r.verdict)
    }

    /// `true` when no critical stage failed.
    pub fn is_healthy(&self) -> bool {
        !self
            .results
            .iter()
            .any(|r| r.stage.is_critical() && r.verdict == Verdict::Fail)
    }

    /// Process exit status: 0 when healthy, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_healthy() {
            0
        } else {
            1
        }
    }
}

/// Truncate to `max_len` characters, adding "..." if truncated. Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

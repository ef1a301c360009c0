//! Gateway diagnostics for Infergate.
//!
//! Four ordered stages probe one endpoint: chat reachability, tool calling,
//! embedding generation, and semantic similarity. [`run_diagnostics`] is the
//! entry point; [`DiagnosticRunner`] accepts any backends, which is how the
//! tests drive it.

pub mod report;
pub mod runner;

pub use report::{truncate_string, DiagnosticReport, DiagnosticResult, Stage, Verdict};
pub use runner::{run_diagnostics, DiagnosticOptions, DiagnosticRunner};

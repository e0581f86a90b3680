//! Workload definition structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// How request tokens are turned into read offsets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Free 64-bit tokens mixed with the previous read's first word
    Chained,
    /// Tokens are pre-bounded chunk indices; the dependency stays at zero
    Independent,
}

impl Default for DispatchMode {
    fn default() -> Self {
        Self::Chained
    }
}

/// What a run that saw worker errors does to the process exit status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkerErrorPolicy {
    /// Print worker errors, exit successfully
    Report,
    /// Print worker errors, exit with failure
    Fail,
}

impl Default for WorkerErrorPolicy {
    fn default() -> Self {
        Self::Report
    }
}

/// Result report format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Chained => write!(f, "chained"),
            DispatchMode::Independent => write!(f, "independent"),
        }
    }
}

impl fmt::Display for WorkerErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErrorPolicy::Report => write!(f, "report"),
            WorkerErrorPolicy::Fail => write!(f, "fail"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

use crate::domain::error::CollaboratorError;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    InitialAnalysis,
    TickerExtraction,
    SpecializedAnalysis,
    FinalDecision,
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::InitialAnalysis => write!(f, "initial analysis"),
            Stage::TickerExtraction => write!(f, "ticker extraction"),
            Stage::SpecializedAnalysis => write!(f, "specialized analysis"),
            Stage::FinalDecision => write!(f, "final decision"),
            Stage::Persistence => write!(f, "persistence"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StageErrorKind {
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("Malformed: {0}")]
    Malformed(String),

    #[error("Persistence: {0}")]
    Persistence(String),
}

/// A run that stopped early. Carries the execution log up to the failure.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{stage} failed: {kind}")]
pub struct StageError {
    pub stage: Stage,
    pub kind: StageErrorKind,
    pub execution_log: Vec<String>,
}

impl StageError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Persistence,
            kind: StageErrorKind::Persistence(message.into()),
            execution_log: Vec::new(),
        }
    }
}

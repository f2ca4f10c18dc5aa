//! Error taxonomy for the transition core.
//!
//! Matching and timing reads are total and never produce errors. Only the
//! mutators exposed by [`AnimationGenerator`](crate::AnimationGenerator) and the
//! JSON loaders return [`TransitionError`]; a failed mutation leaves the
//! generator untouched and is also recorded as a [`Diagnostic`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{LinkType, TimingId};

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransitionError {
    #[error("edge not found: {id} ({link_type})")]
    EdgeNotFound { id: String, link_type: LinkType },

    #[error("decoration not found: {id} ({link_type})")]
    DecorationNotFound { id: String, link_type: LinkType },

    #[error("object not found: {id}")]
    ObjectNotFound { id: String },

    #[error("dataset not found: {id}")]
    DatasetNotFound { id: String },

    #[error("field '{field}' cannot be used for sequencing")]
    UnsupportedSequencingField { field: String },

    #[error("shapes cannot be linked: {start} -> {end}")]
    IncompatibleShapes { start: String, end: String },

    #[error("timing {child:?} cannot be nested under {parent:?}: cycle")]
    TimingCycle { child: TimingId, parent: TimingId },

    #[error("invalid time value: {value}")]
    InvalidTime { value: f64 },

    #[error("template parse error: {0}")]
    TemplateParse(String),
}

pub type Result<T> = std::result::Result<T, TransitionError>;

/// A non-fatal failure reported by a mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub operation: String,
    pub error: TransitionError,
}

impl Diagnostic {
    pub fn new(operation: &str, error: TransitionError) -> Self {
        Self {
            operation: operation.to_string(),
            error,
        }
    }
}

//! Exception analysis and classification
//!
//! This module provides the strategy contract, the shared recognition helpers,
//! the request-time dispatch engine and the classification types every
//! analyzer produces.

pub mod classification;
pub mod engine;
pub mod raised;
pub mod strategy;

// Re-export main types for convenient access
pub use classification::{
    ClassificationResult, ContextFailure, DatabaseFailure, ErrorCategory, TestFailure,
    INTERNAL_SERVER_ERROR,
};
pub use engine::{fallback, AnalysisEngine};
pub use raised::{cause_chain, short_type_name, CauseChain, Raised, RaisedError, MAX_CHAIN_DEPTH};
pub use strategy::{
    build_base_context, extract_root_cause, AnalysisError, AnalysisStrategy, MessagePattern,
    Recognizer, MAX_CONTEXT_CAUSES,
};

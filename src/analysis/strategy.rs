//! The analysis strategy contract and the behavior shared by analyzers
//!
//! A strategy decides whether it recognizes a raised error and, if so,
//! classifies it. Recognition is delegated to a [`Recognizer`]: a set of known
//! type identities searched along the cause chain, plus regex patterns matched
//! against the top-level message.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use super::raised::{cause_chain, Raised};
use super::ClassificationResult;

/// Maximum number of type names recorded in the `causeChain` context entry.
pub const MAX_CONTEXT_CAUSES: usize = 5;

/// Errors raised while building or running a strategy.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The analyzer could not produce a classification.
    #[error("analyzer {analyzer} failed: {reason}")]
    Failed { analyzer: String, reason: String },

    /// A message pattern did not compile.
    #[error("invalid message pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

impl AnalysisError {
    pub fn failed(analyzer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            analyzer: analyzer.into(),
            reason: reason.into(),
        }
    }
}

/// A recognizer and classifier for one family of errors.
///
/// Strategies are built once and shared read-only between threads.
pub trait AnalysisStrategy: Send + Sync {
    /// Name used in logs and listings.
    fn name(&self) -> &str;

    /// Dispatch priority. The request-time engine prefers smaller values.
    fn priority(&self) -> i32;

    /// Returns true if this strategy recognizes the error.
    fn can_analyze(&self, error: &dyn Raised) -> bool;

    /// Classifies an error for which [`AnalysisStrategy::can_analyze`] returned true.
    fn analyze(&self, error: &dyn Raised) -> Result<ClassificationResult, AnalysisError>;
}

/// A compiled message pattern.
#[derive(Debug, Clone)]
pub struct MessagePattern {
    regex: Regex,
}

impl MessagePattern {
    /// Compiles a pattern known to be valid.
    ///
    /// # Panics
    /// Panics if the regex pattern is invalid. Use [`MessagePattern::try_new`]
    /// for patterns that come from configuration.
    pub fn new(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
        }
    }

    /// Compiles a pattern, returning an error if it is invalid.
    pub fn try_new(pattern: &str) -> Result<Self, AnalysisError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if the pattern occurs anywhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Recognized type identities plus message patterns.
#[derive(Debug, Clone, Default)]
pub struct Recognizer {
    types: HashSet<String>,
    patterns: Vec<MessagePattern>,
}

impl Recognizer {
    /// Builds a recognizer from static tables.
    ///
    /// # Panics
    /// Panics if any pattern is invalid.
    pub fn new(types: &[&str], patterns: &[&str]) -> Self {
        Self {
            types: types.iter().map(|t| t.to_string()).collect(),
            patterns: patterns.iter().map(|p| MessagePattern::new(p)).collect(),
        }
    }

    /// Adds a recognized type identity.
    pub fn add_type(&mut self, type_name: impl Into<String>) {
        self.types.insert(type_name.into());
    }

    /// Adds a message pattern.
    pub fn add_pattern(&mut self, pattern: MessagePattern) {
        self.patterns.push(pattern);
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn patterns(&self) -> &[MessagePattern] {
        &self.patterns
    }

    /// True if the error or any of its causes has a recognized type.
    pub fn in_hierarchy(&self, error: &dyn Raised) -> bool {
        cause_chain(error).any(|node| self.types.contains(node.type_name()))
    }

    /// True if the top-level message matches any pattern. Causes are not searched.
    pub fn matches_message(&self, error: &dyn Raised) -> bool {
        let message = error.message().unwrap_or("");
        self.patterns.iter().any(|pattern| pattern.matches(message))
    }

    /// The shared `can_analyze` rule.
    pub fn recognizes(&self, error: &dyn Raised) -> bool {
        self.in_hierarchy(error) || self.matches_message(error)
    }
}

/// `ShortTypeName: message` of the deepest distinct node in the cause chain.
pub fn extract_root_cause(error: &dyn Raised) -> String {
    let root = cause_chain(error).last().unwrap_or(error);
    format!(
        "{}: {}",
        root.short_type_name(),
        root.message().unwrap_or("No message available")
    )
}

/// Context shared by all analyzers: the full type name and up to
/// [`MAX_CONTEXT_CAUSES`] short type names along the cause chain.
pub fn build_base_context(error: &dyn Raised) -> Map<String, Value> {
    let causes: Vec<Value> = cause_chain(error)
        .take(MAX_CONTEXT_CAUSES)
        .map(|node| Value::from(node.short_type_name()))
        .collect();

    let mut context = Map::new();
    context.insert("exceptionType".into(), error.type_name().into());
    context.insert("causeChain".into(), Value::Array(causes));
    context
}

/// Lowercased top-level message, empty when absent.
pub(crate) fn lowercase_message(error: &dyn Raised) -> String {
    error.message().unwrap_or("").to_lowercase()
}

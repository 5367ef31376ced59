//! The raised-error model consumed by the analysis engine.
//!
//! The engine never owns the error it classifies. It reads it through the
//! [`Raised`] trait, which exposes a type identity, an optional message and an
//! optional cause. [`RaisedError`] is the owned implementation used by the
//! CLI, the tests and anything that captures a `std::error::Error` chain.

use serde::{Deserialize, Serialize};

/// Hard upper bound on the number of nodes visited while walking a cause chain.
pub const MAX_CHAIN_DEPTH: usize = 256;

/// Read-only view of a raised error and its causes.
pub trait Raised {
    /// Fully qualified type identity, e.g. `java.sql.SQLException` or `sqlx::Error`.
    fn type_name(&self) -> &str;

    /// The error message, if any.
    fn message(&self) -> Option<&str>;

    /// The underlying cause, if any. Implementations may return `self`.
    fn cause(&self) -> Option<&dyn Raised>;

    /// Stack frames captured with the error, most recent first.
    fn stack_frames(&self) -> &[String] {
        &[]
    }

    /// Last segment of [`Raised::type_name`].
    fn short_type_name(&self) -> &str {
        short_type_name(self.type_name())
    }
}

/// Returns the segment after the last `.` or `::` of a type identity.
pub fn short_type_name(type_name: &str) -> &str {
    let after_path = type_name.rsplit("::").next().unwrap_or(type_name);
    after_path.rsplit('.').next().unwrap_or(after_path)
}

fn node_addr(node: &dyn Raised) -> *const () {
    node as *const _ as *const ()
}

/// Iterator over an error and its causes, starting with the error itself.
///
/// Stops when a node has no cause, when the next node has already been
/// visited, or after [`MAX_CHAIN_DEPTH`] nodes.
pub struct CauseChain<'a> {
    next: Option<&'a dyn Raised>,
    visited: Vec<*const ()>,
}

impl<'a> Iterator for CauseChain<'a> {
    type Item = &'a dyn Raised;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if self.visited.len() >= MAX_CHAIN_DEPTH {
            return None;
        }
        let addr = node_addr(current);
        if self.visited.contains(&addr) {
            return None;
        }
        self.visited.push(addr);
        self.next = current.cause();
        Some(current)
    }
}

/// Walks `error` and its causes. See [`CauseChain`].
pub fn cause_chain(error: &dyn Raised) -> CauseChain<'_> {
    CauseChain {
        next: Some(error),
        visited: Vec::new(),
    }
}

/// An owned raised error with an optional boxed cause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaisedError {
    /// Fully qualified type identity.
    pub type_name: String,
    /// Error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Underlying cause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<RaisedError>>,
    /// Stack frames, most recent first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stack: Vec<String>,
}

impl RaisedError {
    /// Creates an error of the given type with no message and no cause.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: None,
            cause: None,
            stack: Vec::new(),
        }
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the underlying cause.
    pub fn caused_by(mut self, cause: RaisedError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Appends a stack frame.
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }

    /// Captures a `std::error::Error` and its `source()` chain.
    ///
    /// The top-level node gets the static type name of `E`. Sources are
    /// type-erased, so only `std::io::Error` keeps a concrete name; other
    /// sources are recorded as `std::error::Error`.
    pub fn capture<E>(error: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut captured = Self::new(std::any::type_name::<E>()).with_message(error.to_string());

        let mut sources = Vec::new();
        let mut next = error.source();
        while let Some(source) = next {
            if sources.len() >= MAX_CHAIN_DEPTH {
                break;
            }
            let type_name = if source.is::<std::io::Error>() {
                "std::io::Error"
            } else {
                "std::error::Error"
            };
            sources.push(Self::new(type_name).with_message(source.to_string()));
            next = source.source();
        }

        let chained = sources
            .into_iter()
            .rev()
            .reduce(|cause, outer| outer.caused_by(cause));
        if let Some(cause) = chained {
            captured = captured.caused_by(cause);
        }
        captured
    }
}

impl Raised for RaisedError {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn cause(&self) -> Option<&dyn Raised> {
        self.cause.as_deref().map(|cause| cause as &dyn Raised)
    }

    fn stack_frames(&self) -> &[String] {
        &self.stack
    }
}

impl std::fmt::Display for RaisedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.type_name, message),
            None => write!(f, "{}", self.type_name),
        }
    }
}

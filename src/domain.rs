//! Domain errors that already know how they should be reported.
//!
//! Application code raises a [`DomainError`] when it can state the status,
//! code and title itself. These skip classification and map straight onto an
//! error payload.

use serde_json::{Map, Value};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The kind of a domain error, which fixes its default status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DomainErrorKind {
    /// The request conflicts with current state (409).
    Conflict,
    /// The request is malformed or fails validation (400).
    InvalidInput,
    /// The addressed resource does not exist (404).
    ResourceNotFound,
    /// The caller may not perform the operation (403).
    Unauthorized,
    /// Any other application failure (500).
    Internal,
}

impl DomainErrorKind {
    pub fn status(&self) -> u16 {
        match self {
            Self::Conflict => 409,
            Self::InvalidInput => 400,
            Self::ResourceNotFound => 404,
            Self::Unauthorized => 403,
            Self::Internal => 500,
        }
    }

    pub fn default_code(&self) -> &'static str {
        match self {
            Self::Conflict => "CONFLICT",
            Self::InvalidInput => "INVALID_INPUT",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Conflict => "Conflict",
            Self::InvalidInput => "Invalid Input",
            Self::ResourceNotFound => "Resource Not Found",
            Self::Unauthorized => "Unauthorized",
            Self::Internal => "Internal Error",
        }
    }
}

/// An application error carrying its own status, code, title and context.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DomainError {
    kind: DomainErrorKind,
    message: String,
    status: Option<u16>,
    code: Option<String>,
    title: Option<String>,
    context: Map<String, Value>,
    #[source]
    source: Option<BoxError>,
}

impl DomainError {
    pub fn new(kind: DomainErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
            title: None,
            context: Map::new(),
            source: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Conflict, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::ResourceNotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(DomainErrorKind::Unauthorized, message)
    }

    /// Overrides the status implied by the kind.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn add_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> DomainErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status.unwrap_or_else(|| self.kind.status())
    }

    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or(self.kind.default_code())
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(self.kind.default_title())
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }
}

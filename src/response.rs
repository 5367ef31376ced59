//! Error response payloads
//!
//! Builds the uniform JSON error body returned to callers, either from a
//! classification or from a [`DomainError`]. Debug information is attached
//! only when a development profile is active.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::error;

use crate::analysis::{AnalysisEngine, ClassificationResult, Raised};
use crate::config::ExceptionProperties;
use crate::domain::DomainError;

/// Profiles under which debug information is included.
pub const DEVELOPMENT_PROFILES: &[&str] = &["dev", "local", "test", "development"];

/// Number of stack frames kept in the debug stack summary.
pub const STACK_SUMMARY_FRAMES: usize = 5;

/// The JSON error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub code: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_information: Option<Map<String, Value>>,
}

impl ErrorResponse {
    /// The status as an HTTP status code, 500 when out of range.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Builds [`ErrorResponse`] values for the active deployment profiles.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    active_profiles: Vec<String>,
}

impl ResponseBuilder {
    pub fn new<I, S>(active_profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active_profiles: active_profiles.into_iter().map(Into::into).collect(),
        }
    }

    /// Uses the profiles configured under `[response]`.
    pub fn from_properties(properties: &ExceptionProperties) -> Self {
        Self::new(properties.response.active_profiles.iter().cloned())
    }

    /// True when any active profile is a development profile.
    pub fn debug_enabled(&self) -> bool {
        self.active_profiles
            .iter()
            .any(|profile| DEVELOPMENT_PROFILES.contains(&profile.as_str()))
    }

    /// Payload for a classified error.
    pub fn from_classification(
        &self,
        result: &ClassificationResult,
        instance: &str,
        error: &dyn Raised,
    ) -> ErrorResponse {
        ErrorResponse {
            timestamp: Utc::now(),
            status: result.status,
            code: result.error_code.clone(),
            title: result.title.clone(),
            detail: result.message.clone(),
            instance: instance.to_string(),
            debug_information: self.debug_information(&result.context, error),
        }
    }

    /// Payload for a domain error, which is not classified.
    pub fn from_domain(&self, error: &DomainError, instance: &str) -> ErrorResponse {
        let debug_information = self.debug_enabled().then(|| {
            let mut info = error.context().clone();
            info.insert(
                "debug".into(),
                serde_json::json!({
                    "exceptionType": std::any::type_name::<DomainError>(),
                    "kind": format!("{:?}", error.kind()),
                }),
            );
            info
        });

        ErrorResponse {
            timestamp: Utc::now(),
            status: error.status(),
            code: error.code().to_string(),
            title: error.title().to_string(),
            detail: Some(error.message().to_string()),
            instance: instance.to_string(),
            debug_information,
        }
    }

    fn debug_information(
        &self,
        context: &Map<String, Value>,
        error: &dyn Raised,
    ) -> Option<Map<String, Value>> {
        if !self.debug_enabled() {
            return None;
        }
        let stack_summary = error
            .stack_frames()
            .iter()
            .take(STACK_SUMMARY_FRAMES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" -> ");

        let mut info = context.clone();
        info.insert(
            "debug".into(),
            serde_json::json!({
                "exceptionType": error.type_name(),
                "stackTrace": stack_summary,
            }),
        );
        Some(info)
    }
}

/// Classifies unhandled errors and turns them into payloads.
#[derive(Debug, Clone)]
pub struct ErrorHandler {
    engine: Arc<AnalysisEngine>,
    responses: ResponseBuilder,
}

impl ErrorHandler {
    pub fn new(engine: Arc<AnalysisEngine>, responses: ResponseBuilder) -> Self {
        Self { engine, responses }
    }

    /// Registers the enabled analyzers and uses the configured profiles.
    pub fn from_properties(properties: &ExceptionProperties) -> Self {
        Self::new(
            Arc::new(AnalysisEngine::from_properties(properties)),
            ResponseBuilder::from_properties(properties),
        )
    }

    pub fn engine(&self) -> &AnalysisEngine {
        &self.engine
    }

    /// Classifies `error` and builds its payload.
    pub fn handle(&self, error: &dyn Raised, instance: &str) -> ErrorResponse {
        error!(
            "Unhandled exception {}: {}",
            error.type_name(),
            error.message().unwrap_or("")
        );
        let result = self.engine.classify(error);
        self.responses.from_classification(&result, instance, error)
    }

    /// Builds the payload for a domain error.
    pub fn handle_domain(&self, error: &DomainError, instance: &str) -> ErrorResponse {
        self.responses.from_domain(error, instance)
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::new(
            Arc::new(AnalysisEngine::with_default_analyzers()),
            ResponseBuilder::default(),
        )
    }
}

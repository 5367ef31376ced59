//! End-to-end classification tests
//!
//! Exercise the public API the way an embedding application would: build the
//! engine from properties, classify raised errors, and turn the results into
//! payloads and startup reports.

use std::sync::Arc;

use faultlens::analysis::{AnalysisEngine, AnalysisStrategy, RaisedError};
use faultlens::analyzers::{DatabaseAnalyzer, TestContextAnalyzer, TestExecutionAnalyzer};
use faultlens::config::ExceptionProperties;
use faultlens::response::{ErrorHandler, ResponseBuilder};
use faultlens::startup::StartupFailureReporter;

fn context_load_failure() -> RaisedError {
    RaisedError::new("java.lang.IllegalStateException")
        .with_message("Failed to load ApplicationContext")
}

// ============================================================================
// Request-time classification
// ============================================================================

#[test]
fn test_access_denied_with_database_analyzer_only() {
    let engine = AnalysisEngine::new(vec![Arc::new(DatabaseAnalyzer::new())]);
    let error = RaisedError::new("java.sql.SQLException").with_message("Access denied for user");

    let result = engine.classify(&error);

    assert_eq!(result.error_code, "DB_AUTHENTICATION_FAILURE");
    assert_eq!(result.title, "Database Authentication Failure");
    assert_eq!(result.root_cause, "SQLException: Access denied for user");
    assert!(!result.recoverable);
    assert!(result.tags.contains("database"));
    assert!(result.tags.contains("authentication_failure"));
}

#[test]
fn test_unrecognized_error_gets_fallback() {
    let engine = AnalysisEngine::with_default_analyzers();
    let error = RaisedError::new("java.lang.NullPointerException").with_message("name is null");

    let result = engine.classify(&error);

    assert_eq!(result.status, 500);
    assert_eq!(result.error_code, "UNKNOWN_ERROR");
    assert_eq!(result.title, "NullPointerException");
    assert_eq!(result.message.as_deref(), Some("name is null"));
    assert!(!result.recoverable);
    assert!(result.is_fallback());
}

#[test]
fn test_database_type_deep_in_cause_chain() {
    let error = RaisedError::new("java.lang.RuntimeException")
        .with_message("Order lookup failed")
        .caused_by(
            RaisedError::new("org.springframework.dao.DataAccessException")
                .with_message("could not execute")
                .caused_by(
                    RaisedError::new("java.sql.SQLException").with_message("Connection refused"),
                ),
        );

    let result = AnalysisEngine::with_default_analyzers().classify(&error);

    // Rules look at the top-level message only.
    assert_eq!(result.error_code, "DB_GENERIC_ERROR");
    assert_eq!(result.root_cause, "SQLException: Connection refused");
    assert_eq!(
        result.context["causeChain"],
        serde_json::json!(["RuntimeException", "DataAccessException", "SQLException"])
    );
}

#[test]
fn test_request_time_and_startup_dispatch_differ() {
    let strategies: Vec<Arc<dyn AnalysisStrategy>> = vec![
        Arc::new(DatabaseAnalyzer::new()),
        Arc::new(TestExecutionAnalyzer::new()),
        Arc::new(TestContextAnalyzer::new()),
    ];
    let engine = AnalysisEngine::new(strategies.clone());
    let reporter = StartupFailureReporter::new(strategies);
    let error = context_load_failure();

    // Smallest priority value wins at request time, largest at startup.
    assert_eq!(engine.select(&error).map(|s| s.name()), Some("TestExecution"));
    assert_eq!(reporter.select(&error).map(|s| s.name()), Some("TestContext"));

    assert_eq!(
        engine.classify(&error).error_code,
        "TEST_CONTEXT_LOAD_FAILURE"
    );
    assert_eq!(
        reporter.classify(&error).unwrap().error_code,
        "TEST_CONTEXT_CONTEXT_LOAD_FAILURE"
    );
}

#[test]
fn test_priority_overrides_from_properties() {
    let properties = ExceptionProperties::from_toml_str(
        r#"
        [test_context_analyzer]
        priority = 10
        "#,
    )
    .unwrap();
    let engine = AnalysisEngine::from_properties(&properties);

    let result = engine.classify(&context_load_failure());
    assert_eq!(result.error_code, "TEST_CONTEXT_CONTEXT_LOAD_FAILURE");
}

#[test]
fn test_disabled_library_classifies_everything_as_unknown() {
    let properties = ExceptionProperties::from_toml_str("enabled = false").unwrap();
    let engine = AnalysisEngine::from_properties(&properties);
    let error = RaisedError::new("java.sql.SQLException").with_message("syntax error");

    assert_eq!(engine.strategy_count(), 0);
    assert_eq!(engine.classify(&error).error_code, "UNKNOWN_ERROR");
}

#[test]
fn test_shared_engine_across_threads() {
    let engine = Arc::new(AnalysisEngine::with_default_analyzers());
    let messages = [
        "Duplicate key value violates unique constraint",
        "Table 'shop.orders' doesn't exist",
        "You have an error in your SQL syntax error",
        "Access denied for user 'app'",
    ];
    let expected = [
        "DB_CONSTRAINT_VIOLATION",
        "DB_SCHEMA_ERROR",
        "DB_QUERY_ERROR",
        "DB_AUTHENTICATION_FAILURE",
    ];

    let codes: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = messages
            .iter()
            .map(|message| {
                let engine = Arc::clone(&engine);
                scope.spawn(move || {
                    let error = RaisedError::new("java.sql.SQLException").with_message(*message);
                    engine.classify(&error).error_code
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(codes, expected);
}

// ============================================================================
// Payloads
// ============================================================================

#[test]
fn test_captured_rust_error_is_classified() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    let error = RaisedError::capture(&io);

    let result = AnalysisEngine::with_default_analyzers().classify(&error);

    // Matched by the "connection.*refused" message pattern.
    assert_eq!(result.error_code, "DB_CONNECTION_FAILURE");
    assert!(result.recoverable);
    assert_eq!(result.context["timeoutThresholdMs"], 30_000);
}

#[test]
fn test_handler_payload_json_shape() {
    let handler = ErrorHandler::new(
        Arc::new(AnalysisEngine::with_default_analyzers()),
        ResponseBuilder::new(["local"]),
    );
    let error = RaisedError::new("org.junit.ComparisonFailure")
        .with_message("expected:<1> but was:<2>")
        .with_frame("OrderTest.total(OrderTest.java:18)");

    let json = serde_json::to_value(handler.handle(&error, "/api/orders")).unwrap();

    assert_eq!(json["status"], 500);
    assert_eq!(json["code"], "TEST_ASSERTION_FAILURE");
    assert_eq!(json["instance"], "/api/orders");
    assert_eq!(json["debugInformation"]["testFramework"], "JUnit 4");
    assert_eq!(
        json["debugInformation"]["debug"]["stackTrace"],
        "OrderTest.total(OrderTest.java:18)"
    );
}

#[tokio::test]
async fn test_error_response_into_axum_response() {
    use axum::response::IntoResponse;

    let handler = ErrorHandler::default();
    let error = RaisedError::new("java.sql.SQLException").with_message("Access denied");
    let response = handler.handle(&error, "/api/users").into_response();

    assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["code"], "DB_AUTHENTICATION_FAILURE");
    assert_eq!(json["title"], "Database Authentication Failure");
    assert!(json.get("debugInformation").is_none());
}

// ============================================================================
// Startup reports
// ============================================================================

#[test]
fn test_startup_report_for_schema_error() {
    let reporter = StartupFailureReporter::from_engine(&AnalysisEngine::with_default_analyzers());
    let error = RaisedError::new("org.hibernate.HibernateException")
        .with_message("Table 'app.users' doesn't exist");

    let report = reporter.report(&error);

    assert!(report.description.starts_with("Database Schema Error\n\n"));
    assert!(report
        .description
        .contains("Error Code: DB_SCHEMA_ERROR\nCategory: DATABASE\n"));
    assert!(report
        .description
        .contains("Root Cause: HibernateException: Table 'app.users' doesn't exist\n"));
    assert!(report
        .action
        .starts_with("Recommended Actions:\n\n1. Verify database schema and table existence\n"));
    assert!(report
        .action
        .contains("2. This is a critical issue requiring immediate attention\n"));
    assert!(report.action.contains("3. Related tags: database, schema_error\n"));
}

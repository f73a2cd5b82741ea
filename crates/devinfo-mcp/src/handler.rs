// crates/devinfo-mcp/src/handler.rs
// ============================================================================
// Module: Tool Handlers
// Description: Call contract for tool implementations.
// Purpose: Keep handlers opaque to the dispatcher beyond one async call.
// Dependencies: async-trait, thiserror, tokio
// ============================================================================

//! ## Overview
//! A [`ToolHandler`] turns validated arguments into a result string or a
//! [`ToolFailure`]. Handlers may suspend on I/O; the dispatcher awaits them
//! on a separate task so one slow tool never blocks unrelated requests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::validation::ValidatedArguments;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Tool implementation invoked by the dispatcher.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Executes the tool with validated arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolFailure`] when the tool cannot produce a result.
    async fn call(&self, arguments: ValidatedArguments) -> Result<String, ToolFailure>;
}

/// Handler backed by a synchronous function.
///
/// The function runs on the blocking pool so a slow tool never occupies an
/// async worker.
struct FnHandler<F> {
    /// Wrapped function.
    func: Arc<F>,
}

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(&ValidatedArguments) -> Result<String, ToolFailure> + Send + Sync + 'static,
{
    async fn call(&self, arguments: ValidatedArguments) -> Result<String, ToolFailure> {
        let func = Arc::clone(&self.func);
        match tokio::task::spawn_blocking(move || func(&arguments)).await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                Err(ToolFailure::new("tool handler panicked"))
            }
            Err(_) => Err(ToolFailure::new("tool handler was cancelled")),
        }
    }
}

/// Wraps a synchronous `(arguments) -> text` function as a handler.
#[must_use]
pub fn sync_handler<F>(func: F) -> Arc<dyn ToolHandler>
where
    F: Fn(&ValidatedArguments) -> Result<String, ToolFailure> + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        func: Arc::new(func),
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failure reported by a tool handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ToolFailure {
    /// Textual description surfaced to the client.
    message: String,
}

impl ToolFailure {
    /// Creates a failure with a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

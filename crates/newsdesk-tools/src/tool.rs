//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Trait for tools a run can call
///
/// The function's description and parameter schema live on the assistant
/// itself, so a tool only needs the name it is called by and a way to run.
/// That name has to match the function name configured on the assistant.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// # Arguments
    ///
    /// * `params` - Parsed JSON arguments of the tool call
    ///
    /// # Returns
    ///
    /// Tool output as JSON value; it is serialized to a string before being
    /// submitted back to the run.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;
}

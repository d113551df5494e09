//! Executes the tool calls a run is waiting on
//!
//! Every call produces exactly one [`ToolOutput`], keyed by the call's id.
//! A call that cannot be serviced (bad arguments, unknown tool, tool error)
//! is answered with an `{"error": "..."}` document so the run can carry on.

use std::sync::Arc;
use std::time::Instant;

use newsdesk_core::{ToolCall, ToolOutput};
use newsdesk_tools::{ToolError, ToolRegistry};
use serde_json::{Value, json};
use tracing::{info, warn};

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Execute every call in order, one output per call
    pub async fn execute_calls(&self, calls: &[&ToolCall]) -> Vec<ToolOutput> {
        info!(tool_count = calls.len(), "Starting tool execution");

        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            outputs.push(self.execute_call(call).await);
        }
        outputs
    }

    /// Execute one call, converting any failure into an error output
    pub async fn execute_call(&self, call: &ToolCall) -> ToolOutput {
        let args_preview: String = call.function.arguments.chars().take(500).collect();
        info!(
            tool_name = %call.function.name,
            tool_call_id = %call.id,
            arguments_preview = %args_preview,
            "Executing tool"
        );

        let start_time = Instant::now();
        let result = self.dispatch(call).await;
        let duration_ms = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(value) => {
                let output = serde_json::to_string(&value).unwrap_or_else(|_| value.to_string());
                info!(
                    tool_name = %call.function.name,
                    duration_ms = duration_ms,
                    output_length = output.len(),
                    "Tool execution succeeded"
                );
                ToolOutput::new(call.id.clone(), output)
            }
            Err(e) => {
                warn!(
                    tool_name = %call.function.name,
                    tool_call_id = %call.id,
                    duration_ms = duration_ms,
                    error = %e,
                    "Tool execution failed"
                );
                ToolOutput::new(call.id.clone(), json!({ "error": e.to_string() }).to_string())
            }
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let tool = self
            .registry
            .get(&call.function.name)
            .ok_or_else(|| ToolError::NotFound(call.function.name.clone()))?;

        let args: Value = call.parse_arguments()?;
        tool.execute(args).await
    }
}

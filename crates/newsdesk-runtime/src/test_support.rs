//! Scripted assistant vendor and helpers shared by the unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use newsdesk_assistant::{AssistantApi, AssistantError};
use newsdesk_core::{
    FunctionCall, MessageContent, RequiredAction, Role, Run, RunStatus, SubmitToolOutputs, Thread,
    ThreadMessage, ToolCall, ToolOutput,
};
use newsdesk_tools::{Tool, ToolError};
use serde_json::Value;

pub const THREAD: &str = "thread_1";
pub const RUN: &str = "run_1";

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

pub fn run(status: RunStatus) -> Run {
    Run {
        id: RUN.to_string(),
        thread_id: THREAD.to_string(),
        assistant_id: "asst_1".to_string(),
        status,
        required_action: None,
        last_error: None,
        created_at: 0,
    }
}

pub fn requires_action(calls: Vec<ToolCall>) -> Run {
    Run {
        required_action: Some(RequiredAction {
            kind: newsdesk_core::run::SUBMIT_TOOL_OUTPUTS.to_string(),
            submit_tool_outputs: Some(SubmitToolOutputs { tool_calls: calls }),
        }),
        ..run(RunStatus::RequiresAction)
    }
}

pub fn message(id: &str, role: Role, text: &str) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        thread_id: THREAD.to_string(),
        role,
        content: vec![MessageContent::text_part(text)],
        created_at: 0,
        run_id: None,
    }
}

/// Returns queued run states in order, then repeats the last one
pub struct ScriptedAssistant {
    runs: Mutex<VecDeque<Run>>,
    last: Mutex<Option<Run>>,
    messages: Vec<ThreadMessage>,
    pub added: Mutex<Vec<(String, String)>>,
    pub submissions: Mutex<Vec<Vec<ToolOutput>>>,
    pub retrieve_calls: AtomicU32,
    pub list_calls: AtomicU32,
}

impl ScriptedAssistant {
    pub fn new(runs: Vec<Run>, messages: Vec<ThreadMessage>) -> Self {
        Self {
            runs: Mutex::new(runs.into()),
            last: Mutex::new(None),
            messages,
            added: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            retrieve_calls: AtomicU32::new(0),
            list_calls: AtomicU32::new(0),
        }
    }

    pub fn submissions(&self) -> Vec<Vec<ToolOutput>> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn retrieves(&self) -> u32 {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    fn check_thread(thread_id: &str) -> newsdesk_assistant::Result<()> {
        if thread_id == THREAD {
            Ok(())
        } else {
            Err(AssistantError::NotFound(format!(
                "No thread found with id '{thread_id}'."
            )))
        }
    }
}

#[async_trait]
impl AssistantApi for ScriptedAssistant {
    async fn create_thread(&self) -> newsdesk_assistant::Result<Thread> {
        Ok(Thread {
            id: THREAD.to_string(),
            created_at: 0,
        })
    }

    async fn add_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> newsdesk_assistant::Result<ThreadMessage> {
        Self::check_thread(thread_id)?;
        self.added
            .lock()
            .unwrap()
            .push((thread_id.to_string(), content.to_string()));
        Ok(message("msg_user", Role::User, content))
    }

    async fn create_run(&self, thread_id: &str) -> newsdesk_assistant::Result<Run> {
        Self::check_thread(thread_id)?;
        Ok(run(RunStatus::Queued))
    }

    async fn retrieve_run(&self, thread_id: &str, _run_id: &str) -> newsdesk_assistant::Result<Run> {
        Self::check_thread(thread_id)?;
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.runs.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        last.clone()
            .ok_or_else(|| AssistantError::UnexpectedResponse("empty script".to_string()))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        _run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> newsdesk_assistant::Result<Run> {
        Self::check_thread(thread_id)?;
        self.submissions.lock().unwrap().push(outputs);
        Ok(run(RunStatus::Queued))
    }

    async fn list_messages(&self, thread_id: &str) -> newsdesk_assistant::Result<Vec<ThreadMessage>> {
        Self::check_thread(thread_id)?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.messages.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Echoes its arguments back, rejecting a missing `query`
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    async fn execute(&self, params: Value) -> newsdesk_tools::Result<Value> {
        if params.get("query").is_none() {
            return Err(ToolError::InvalidArguments("missing query".to_string()));
        }
        Ok(params)
    }

    fn name(&self) -> &str {
        "echo"
    }
}

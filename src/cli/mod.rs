use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::Mutex;
use serde_json::json;

use crate::error::{Result, ToolCallError};
use crate::i18n::MessageFormatter;
use crate::invocation::{
    InputOutputDetails, PreparedToolInvocation, SerializedToolInvocation, ToolConfirmationMessages,
    ToolData, ToolProgress, ToolProgressStep, ToolResult, ToolResultDetails, ToolSpecificData,
};
use crate::session::InvocationSession;
use crate::state::Transcript;

#[derive(Clone, Debug)]
pub struct SimulateOptions {
    pub tool_id: String,
    pub display_name: String,
    pub tool_call_id: String,
    pub confirmation: Option<String>,
    pub deny: bool,
    pub steps: u32,
    pub result_message: Option<String>,
    pub transcript: Option<Transcript>,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            tool_id: "demo.echo".to_string(),
            display_name: "Echo".to_string(),
            tool_call_id: "call-1".to_string(),
            confirmation: None,
            deny: false,
            steps: 3,
            result_message: None,
            transcript: None,
        }
    }
}

pub struct SimulationReport {
    pub snapshot: SerializedToolInvocation,
    pub progress: Vec<ToolProgress>,
}

/// 模拟一次完整的工具调用：确认 → 进度 → 完成
pub async fn simulate(
    options: SimulateOptions,
    formatter: Arc<dyn MessageFormatter>,
) -> Result<SimulationReport> {
    let session = InvocationSession::with_formatter("cli", formatter);
    let tool = ToolData::new(options.tool_id.clone(), options.display_name.clone());

    let mut prepared = PreparedToolInvocation::new()
        .with_past_tense_message(format!("Ran \"{}\"", options.display_name))
        .with_tool_specific_data(ToolSpecificData::Input {
            raw_input: json!({ "steps": options.steps }),
        });
    if let Some(title) = &options.confirmation {
        prepared = prepared.with_confirmation(ToolConfirmationMessages::new(
            title.clone(),
            format!("Allow \"{}\" to run?", options.display_name),
        ));
    }

    let invocation = session.begin(Some(prepared), &tool, options.tool_call_id.clone())?;

    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&progress);
    let _subscription = invocation
        .progress()
        .subscribe(move |value: &ToolProgress| sink.lock().push(value.clone()));

    let executor = {
        let invocation = Arc::clone(&invocation);
        let steps = options.steps;
        let result_message = options.result_message.clone();
        let display_name = options.display_name.clone();
        tokio::spawn(async move {
            if !invocation.wait_for_confirmation().await {
                invocation.complete(Some(
                    ToolResult::new().with_message(format!("Skipped \"{display_name}\"")),
                ));
                return;
            }
            for step in 1..=steps {
                invocation.accept_progress(
                    ToolProgressStep::new()
                        .increment(1.0)
                        .message(format!("step {step}/{steps}")),
                );
                tokio::task::yield_now().await;
            }
            let mut result = ToolResult::new().with_details(ToolResultDetails::InputOutput(
                InputOutputDetails {
                    input: json!({ "steps": steps }).to_string(),
                    output: Some(format!("completed {steps} steps")),
                    is_error: Some(false),
                },
            ));
            if let Some(message) = result_message {
                result = result.with_message(message);
            }
            invocation.complete(Some(result));
        })
    };

    if invocation.confirmation_messages().is_some() {
        invocation.confirm(!options.deny);
    }

    executor
        .await
        .map_err(|e| ToolCallError::Other(anyhow!("tool executor failed: {e}")))?;
    invocation.wait_for_completion().await;

    if let Some(transcript) = &options.transcript {
        session.persist(transcript).await?;
    }

    let snapshot = invocation.to_snapshot();
    let progress = progress.lock().clone();
    Ok(SimulationReport { snapshot, progress })
}

pub fn summarize(snapshot: &SerializedToolInvocation) -> String {
    let message = snapshot
        .past_tense_message
        .as_ref()
        .unwrap_or(&snapshot.invocation_message);
    let completion = if snapshot.is_complete {
        "complete"
    } else {
        "running"
    };
    let mut lines = vec![
        format!("{:<14} {}", "Tool call", snapshot.tool_call_id),
        format!("{:<14} {}", "Tool", snapshot.tool_id),
        format!(
            "{:<14} {} / {}",
            "State",
            snapshot.confirmation_state().as_str(),
            completion
        ),
        format!("{:<14} {}", "Message", message),
    ];
    if let Some(origin) = &snapshot.origin_message {
        lines.push(format!("{:<14} {}", "Origin", origin));
    }
    if let Some(details) = &snapshot.result_details {
        lines.push(format!("{:<14} {}", "Details", render_details(details)));
    }
    lines.join("\n")
}

fn render_details(details: &ToolResultDetails) -> String {
    match details {
        ToolResultDetails::References(references) => references
            .iter()
            .map(|reference| reference.uri.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        ToolResultDetails::InputOutput(io) => {
            let status = if io.is_error.unwrap_or(false) {
                "error"
            } else {
                "ok"
            };
            format!("{} -> {} ({status})", io.input, io.output.as_deref().unwrap_or("-"))
        }
    }
}

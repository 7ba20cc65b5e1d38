use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use toolcall::{
    ConfirmationState, MessageText, PreparedToolInvocation, ResultReference,
    ToolConfirmationMessages, ToolData, ToolInvocation, ToolProgress, ToolProgressStep, ToolResult,
    ToolResultDetails,
};

fn search_tool() -> ToolData {
    ToolData::new("vscode.search", "Search")
}

fn needs_confirmation() -> PreparedToolInvocation {
    PreparedToolInvocation::new()
        .with_invocation_message("Running `rm -rf build`")
        .with_confirmation(ToolConfirmationMessages::new(
            "Run command?",
            MessageText::markdown("`rm -rf build`"),
        ))
}

#[test]
fn auto_confirms_without_prompt() {
    let invocation = ToolInvocation::new(None, &search_tool(), "call-1");

    assert_eq!(invocation.is_confirmed(), Some(true));
    assert_eq!(invocation.confirmation_messages(), None);
    assert!(invocation.confirmed().is_settled());
    assert_eq!(invocation.confirmed().value(), Some(true));
    assert_eq!(invocation.confirmation_state(), ConfirmationState::Confirmed);
}

#[test]
fn pending_until_approved() {
    let invocation = ToolInvocation::new(Some(needs_confirmation()), &search_tool(), "call-2");

    assert_eq!(invocation.is_confirmed(), None);
    assert!(invocation.confirmation_messages().is_some());

    assert!(invocation.confirmed().complete(true));
    assert_eq!(invocation.is_confirmed(), Some(true));
    assert_eq!(invocation.confirmation_messages(), None);
}

#[test]
fn pending_until_denied() {
    let invocation = ToolInvocation::new(Some(needs_confirmation()), &search_tool(), "call-3");

    invocation.confirmed().complete(false);
    assert_eq!(invocation.is_confirmed(), Some(false));
    assert_eq!(invocation.confirmation_messages(), None);
    assert_eq!(invocation.confirmation_state(), ConfirmationState::Denied);
}

#[test]
fn first_confirmation_wins() {
    let invocation = ToolInvocation::new(Some(needs_confirmation()), &search_tool(), "call-4");

    assert!(invocation.confirmed().complete(true));
    assert!(!invocation.confirmed().complete(false));
    assert_eq!(invocation.is_confirmed(), Some(true));
}

#[test]
fn auto_confirmed_gate_ignores_denial() {
    let invocation = ToolInvocation::new(None, &search_tool(), "call-5");
    assert!(!invocation.confirm(false));
    assert_eq!(invocation.is_confirmed(), Some(true));
}

#[test]
fn first_completion_wins() {
    let prepared = PreparedToolInvocation::new().with_past_tense_message("Did X");
    let invocation = ToolInvocation::new(Some(prepared), &search_tool(), "call-6");
    let details = ToolResultDetails::References(vec![ResultReference::uri("file:///a.rs")]);

    assert!(invocation.complete(Some(
        ToolResult::new()
            .with_message("Did Y")
            .with_details(details.clone())
    )));
    assert!(!invocation.complete(Some(ToolResult::new().with_message("Did Z"))));
    assert!(!invocation.complete(None));

    assert!(invocation.is_complete());
    assert_eq!(invocation.past_tense_message(), Some(MessageText::plain("Did Y")));
    assert_eq!(invocation.result_details(), Some(details));
}

#[test]
fn progress_accumulates_and_replaces_message() {
    let invocation = ToolInvocation::new(None, &search_tool(), "call-7");
    assert_eq!(invocation.progress().get(), ToolProgress::default());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = invocation
        .progress()
        .subscribe(move |value: &ToolProgress| sink.lock().push(value.clone()));

    invocation.accept_progress(ToolProgressStep::new().increment(5.0).message("a"));
    invocation.accept_progress(ToolProgressStep::new().message("b"));
    invocation.accept_progress(ToolProgressStep::new().increment(2.0));

    let seen = seen.lock().clone();
    assert_eq!(
        seen,
        vec![
            ToolProgress {
                progress: 5.0,
                message: Some(MessageText::plain("a")),
            },
            ToolProgress {
                progress: 5.0,
                message: Some(MessageText::plain("b")),
            },
            ToolProgress {
                progress: 7.0,
                message: None,
            },
        ]
    );
}

#[test]
fn zero_increment_leaves_value() {
    let invocation = ToolInvocation::new(None, &search_tool(), "call-8");
    invocation.accept_progress(ToolProgressStep::new().increment(1.5));
    invocation.accept_progress(ToolProgressStep::new().increment(0.0).message("idle"));
    assert_eq!(invocation.progress().get().progress, 1.5);
}

#[test]
fn completion_overrides_past_tense_message() {
    let prepared = || PreparedToolInvocation::new().with_past_tense_message("Did X");

    let overridden = ToolInvocation::new(Some(prepared()), &search_tool(), "call-9");
    overridden.complete(Some(ToolResult::new().with_message("Did Y")));
    assert_eq!(
        overridden.past_tense_message(),
        Some(MessageText::plain("Did Y"))
    );

    let untouched = ToolInvocation::new(Some(prepared()), &search_tool(), "call-10");
    untouched.complete(None);
    assert_eq!(
        untouched.past_tense_message(),
        Some(MessageText::plain("Did X"))
    );
    assert_eq!(untouched.result_details(), None);
    assert!(untouched.is_complete());
}

#[test]
fn result_without_message_keeps_prepared_message() {
    let prepared = PreparedToolInvocation::new().with_past_tense_message("Did X");
    let invocation = ToolInvocation::new(Some(prepared), &search_tool(), "call-11");
    invocation.complete(Some(ToolResult::new()));
    assert_eq!(
        invocation.past_tense_message(),
        Some(MessageText::plain("Did X"))
    );
}

#[test]
fn default_invocation_message_names_tool() {
    let invocation = ToolInvocation::new(None, &search_tool(), "call-12");
    assert_eq!(
        invocation.invocation_message(),
        &MessageText::plain("Using \"Search\"")
    );
    assert_eq!(invocation.tool_id(), "vscode.search");
    assert_eq!(invocation.tool_call_id(), "call-12");
    assert_eq!(invocation.past_tense_message(), None);
    assert_eq!(invocation.origin_message(), None);
}

#[test]
fn injected_formatter_builds_default_message() {
    let formatter = |key: &str, _default: &str, args: &[&str]| format!("{key}:{}", args.join(","));
    let invocation = ToolInvocation::with_formatter(None, &search_tool(), "call-13", &formatter);
    assert_eq!(
        invocation.invocation_message().as_str(),
        "toolInvocationMessage:\"Search\""
    );
}

#[test]
fn completion_is_independent_of_confirmation() {
    let invocation = ToolInvocation::new(Some(needs_confirmation()), &search_tool(), "call-14");
    invocation.complete(None);

    assert!(invocation.is_complete());
    assert_eq!(invocation.is_confirmed(), None);

    invocation.confirm(false);
    assert_eq!(invocation.is_confirmed(), Some(false));
}

#[tokio::test]
async fn waiters_observe_projected_fields() {
    let invocation = Arc::new(ToolInvocation::new(
        Some(needs_confirmation()),
        &search_tool(),
        "call-15",
    ));

    let presenter = {
        let invocation = Arc::clone(&invocation);
        tokio::spawn(async move {
            let approved = invocation.wait_for_confirmation().await;
            (approved, invocation.confirmation_messages().is_none())
        })
    };
    let watcher = {
        let invocation = Arc::clone(&invocation);
        tokio::spawn(async move {
            invocation.wait_for_completion().await;
            invocation.is_complete()
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    invocation.confirm(true);
    invocation.complete(None);

    assert_eq!(presenter.await.expect("join"), (true, true));
    assert!(watcher.await.expect("join"));
}

#[test]
fn empty_plain_message_keeps_prepared_message() {
    let prepared = PreparedToolInvocation::new().with_past_tense_message("Did X");
    let invocation = ToolInvocation::new(Some(prepared), &search_tool(), "call-16");
    invocation.complete(Some(ToolResult::new().with_message("")));
    assert_eq!(
        invocation.past_tense_message(),
        Some(MessageText::plain("Did X"))
    );
}

#[test]
fn empty_markdown_message_overrides() {
    let prepared = PreparedToolInvocation::new().with_past_tense_message("Did X");
    let invocation = ToolInvocation::new(Some(prepared), &search_tool(), "call-17");
    invocation.complete(Some(ToolResult::new().with_message(MessageText::markdown(""))));
    assert_eq!(
        invocation.past_tense_message(),
        Some(MessageText::markdown(""))
    );
}

#[test]
fn settled_gate_implies_projected_fields_across_threads() {
    for round in 0..500 {
        let invocation = Arc::new(ToolInvocation::new(
            Some(needs_confirmation()),
            &search_tool(),
            format!("call-race-{round}"),
        ));

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let invocation = Arc::clone(&invocation);
                thread::spawn(move || loop {
                    if let Some(approved) = invocation.confirmed().value() {
                        return (
                            approved,
                            invocation.is_confirmed(),
                            invocation.confirmation_messages().is_none(),
                        );
                    }
                    thread::yield_now();
                })
            })
            .collect();

        invocation.confirm(true);
        for reader in readers {
            assert_eq!(reader.join().expect("reader"), (true, Some(true), true));
        }
    }
}

//! Tests for the orchestration state machine and caller contract.

use std::sync::Arc;

use serde_json::json;

use agenda_common::{Caller, StoreError};
use agenda_store::AppointmentStore;

use super::*;
use crate::executor::ToolResult;
use crate::protocol::{ChatRequest, ChatResponse};
use crate::testing::{appointment_executor, call, ScriptedClient};
use crate::{AiError, Message, Role};

fn alice() -> Caller {
    Caller::new("u-1", "Alice")
}

fn orchestrator(client: &Arc<ScriptedClient>, executor: Executor) -> Orchestrator {
    let client: Arc<dyn ReasoningClient> = client.clone();
    Orchestrator::new(client, executor)
}

fn haircut() -> serde_json::Value {
    json!({
        "title": "Haircut",
        "start_time": "2026-10-20T10:00:00Z",
        "end_time": "2026-10-20T10:30:00Z"
    })
}

#[tokio::test]
async fn direct_answer_is_the_only_display_message() {
    let client = Arc::new(ScriptedClient::new().answer("Hello Alice!"));
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let transcript = orch.run(vec![Message::user("hi")], &alice()).await.unwrap();

    assert_eq!(transcript.display, vec![DisplayMessage::reply("Hello Alice!")]);
    assert_eq!(
        transcript.states,
        vec![RunState::AwaitingModel, RunState::DirectAnswer, RunState::Done]
    );
    assert_eq!(transcript.model_rounds, 1);
    assert_eq!(transcript.tool_rounds, 0);
    assert_eq!(transcript.history.last(), Some(&Message::assistant("Hello Alice!")));
}

#[tokio::test]
async fn first_round_offers_the_catalogue() {
    let client = Arc::new(ScriptedClient::new().answer("ok"));
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    orch.run(vec![Message::user("hi")], &alice()).await.unwrap();

    let submissions = client.submissions();
    assert_eq!(submissions.len(), 1);
    let tools = submissions[0].tools.as_ref().unwrap();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "create_appointment",
            "get_appointments",
            "update_appointment",
            "delete_appointment"
        ]
    );
}

#[tokio::test]
async fn k_requests_produce_k_tool_messages_and_one_followup() {
    let calls = vec![
        call("call_a", "get_appointments", json!({})),
        call("call_b", "create_appointment", haircut()),
        call("call_c", "get_appointments", json!({})),
    ];
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", calls.clone())
            .answer("All set."),
    );
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let transcript = orch.run(vec![Message::user("go")], &alice()).await.unwrap();

    let submissions = client.submissions();
    assert_eq!(submissions.len(), 2, "follow-up must run exactly once");
    assert!(submissions[1].tools.is_none(), "follow-up offers no tools");

    let followup = &submissions[1].messages;
    let tool_msgs: Vec<_> = followup.iter().filter(|m| m.role == Role::Tool).collect();
    assert_eq!(tool_msgs.len(), 3);
    for (msg, call) in tool_msgs.iter().zip(&calls) {
        assert_eq!(msg.tool_call_id.as_deref(), Some(call.id.as_str()));
        assert_eq!(msg.tool_name.as_deref(), Some(call.name.as_str()));
    }

    let request = followup
        .iter()
        .find(|m| !m.tool_calls.is_empty())
        .unwrap();
    assert_eq!(request.tool_calls, calls);

    assert_eq!(
        transcript.states,
        vec![
            RunState::AwaitingModel,
            RunState::ToolRequested,
            RunState::ExecutingTools,
            RunState::AwaitingModelFollowup,
            RunState::Done
        ]
    );
    assert_eq!(transcript.tool_rounds, 1);
    assert_eq!(transcript.model_rounds, 2);
    assert_eq!(transcript.usage.total_tokens(), 30);
    let providers: Vec<_> = transcript
        .usage
        .providers()
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    assert_eq!(providers, vec!["scripted"]);
}

#[tokio::test]
async fn unknown_tool_still_completes() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "book_flight", json!({}))])
            .answer("I can't book flights."),
    );
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let transcript = orch.run(vec![Message::user("fly me")], &alice()).await.unwrap();

    assert_eq!(transcript.states.last(), Some(&RunState::Done));
    assert_eq!(transcript.reply(), Some("I can't book flights."));

    let result_msg = transcript
        .history
        .iter()
        .find(|m| m.role == Role::Tool)
        .unwrap();
    let result: ToolResult = serde_json::from_str(&result_msg.content).unwrap();
    assert_eq!(result, ToolResult::Failed("unknown tool: book_flight".into()));
}

#[tokio::test]
async fn haircut_booking_scenario() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "create_appointment", haircut())])
            .answer("Booked your haircut for 10:00 tomorrow."),
    );
    let (executor, store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let transcript = orch
        .run(
            vec![Message::user("book a haircut tomorrow at 10am for 30 min")],
            &alice(),
        )
        .await
        .unwrap();

    assert_eq!(
        transcript.display,
        vec![
            DisplayMessage::tool_notice("🔧 Using create_appointment"),
            DisplayMessage::reply("Booked your haircut for 10:00 tomorrow.")
        ]
    );

    let stored = store.list(Some("u-1")).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Haircut");

    let tool_msg = transcript.history.iter().find(|m| m.role == Role::Tool).unwrap();
    let result: ToolResult = serde_json::from_str(&tool_msg.content).unwrap();
    let ToolResult::Ok(record) = result else {
        panic!("expected Ok result");
    };
    assert_eq!(record["title"], "Haircut");
    assert_eq!(record["id"], stored[0].id);
}

#[tokio::test]
async fn empty_store_lists_as_ok_empty() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "get_appointments", json!({}))])
            .answer("You have no appointments."),
    );
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let transcript = orch
        .run(vec![Message::user("what's on?")], &alice())
        .await
        .unwrap();

    let tool_msg = transcript.history.iter().find(|m| m.role == Role::Tool).unwrap();
    assert_eq!(tool_msg.content, r#"{"status":"ok","data":[]}"#);
    assert_eq!(transcript.reply(), Some("You have no appointments."));
}

#[tokio::test]
async fn store_failure_does_not_abort_the_run() {
    let mut bad_span = haircut();
    bad_span["end_time"] = json!("2026-10-20T09:00:00Z");
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "create_appointment", bad_span)])
            .answer("That end time is before the start. When should it end?"),
    );
    let (executor, store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let transcript = orch.run(vec![Message::user("book")], &alice()).await.unwrap();

    let tool_msg = transcript.history.iter().find(|m| m.role == Role::Tool).unwrap();
    let result: ToolResult = serde_json::from_str(&tool_msg.content).unwrap();
    assert_eq!(
        result,
        ToolResult::Failed(format!(
            "store operation failed: {}",
            StoreError::InvalidRecord("end_time must be after start_time".into())
        ))
    );
    assert_eq!(transcript.states.last(), Some(&RunState::Done));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn tool_request_in_followup_is_a_protocol_violation() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "get_appointments", json!({}))])
            .tool_requests("", vec![call("c2", "get_appointments", json!({}))])
            .answer("never reached"),
    );
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let err = orch
        .run(vec![Message::user("loop")], &alice())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::ProtocolViolation(_)));
    assert_eq!(client.submissions().len(), 2, "no third round");
}

#[tokio::test]
async fn followup_violation_surfaces_one_error_message() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "get_appointments", json!({}))])
            .tool_requests("", vec![call("c2", "get_appointments", json!({}))]),
    );
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor).with_options(OrchestratorOptions {
        error_message: "Sorry, try again.".into(),
        ..OrchestratorOptions::default()
    });

    let reply = orch
        .respond(ChatRequest::new(vec![Message::user("loop")]).with_caller(&alice()))
        .await;

    assert_eq!(reply.status, 422);
    let ChatResponse::Failure {
        error,
        messages_to_display,
    } = reply.body
    else {
        panic!("expected failure body");
    };
    assert_eq!(error, "protocol violation");
    assert_eq!(messages_to_display, vec![DisplayMessage::error("Sorry, try again.")]);
}

#[tokio::test]
async fn reasoning_failure_is_service_unavailable() {
    let client = Arc::new(ScriptedClient::new().fail(AiError::Timeout));
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let err = orch.run(vec![Message::user("hi")], &alice()).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::ReasoningServiceUnavailable(AiError::Timeout)
    ));

    let reply = orch
        .respond(ChatRequest::new(vec![Message::user("hi")]))
        .await;
    assert_eq!(reply.status, 502);
}

#[tokio::test]
async fn followup_failure_aborts_after_tools_ran() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "create_appointment", haircut())])
            .fail(AiError::ServerError("HTTP 503".into())),
    );
    let (executor, store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let err = orch.run(vec![Message::user("book")], &alice()).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::ReasoningServiceUnavailable(_)));
    assert_eq!(store.len().await, 1, "committed tool effects are not rolled back");
}

#[tokio::test]
async fn invalid_history_is_rejected_before_any_round() {
    let client = Arc::new(ScriptedClient::new().answer("unused"));
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let orphan = Message::tool_result(&call("ghost", "get_appointments", json!({})), "[]");
    let err = orch
        .run(vec![Message::user("hi"), orphan], &alice())
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::ProtocolViolation(_)));

    let err = orch.run(Vec::new(), &alice()).await.unwrap_err();
    assert_eq!(err.status_code(), 422);
    assert!(client.submissions().is_empty());
}

#[tokio::test]
async fn system_prompt_is_prepended_but_not_stored() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "get_appointments", json!({}))])
            .answer("Nothing booked."),
    );
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor).with_options(OrchestratorOptions {
        system_prompt: Some("You help {user_name}.".into()),
        ..OrchestratorOptions::default()
    });

    let transcript = orch
        .run(vec![Message::user("anything?")], &alice())
        .await
        .unwrap();

    for submission in client.submissions() {
        assert_eq!(submission.messages[0], Message::system("You help Alice."));
    }
    assert!(transcript.history.iter().all(|m| m.role != Role::System));
}

#[tokio::test]
async fn notices_can_be_disabled() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "get_appointments", json!({}))])
            .answer("Nothing booked."),
    );
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor).with_options(OrchestratorOptions {
        tool_notice_prefix: None,
        ..OrchestratorOptions::default()
    });

    let transcript = orch.run(vec![Message::user("?")], &alice()).await.unwrap();
    assert_eq!(transcript.display, vec![DisplayMessage::reply("Nothing booked.")]);
}

#[tokio::test]
async fn respond_returns_only_display_messages() {
    let client = Arc::new(ScriptedClient::new().answer("Hi there."));
    let (executor, _store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let request: ChatRequest = serde_json::from_value(json!({
        "messages": [{"role": "user", "content": "hello"}],
        "userName": "Alice",
        "userId": 7
    }))
    .unwrap();
    let reply = orch.respond(request).await;

    assert_eq!(reply.status, 200);
    assert_eq!(
        serde_json::to_value(&reply.body).unwrap(),
        json!({"messages_to_display": [
            {"role": "assistant", "content": "Hi there.", "kind": "reply"}
        ]})
    );
}

#[tokio::test]
async fn caller_identity_scopes_tool_calls() {
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests("", vec![call("c1", "create_appointment", haircut())])
            .answer("Done."),
    );
    let (executor, store) = appointment_executor();
    let orch = orchestrator(&client, executor);

    let request =
        ChatRequest::new(vec![Message::user("book")]).with_caller(&Caller::new("u-9", "Zed"));
    orch.respond(request).await;

    assert_eq!(store.list(Some("u-9")).await.unwrap().len(), 1);
    assert!(store.list(Some("u-1")).await.unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_request_cannot_touch_owned_records() {
    let (executor, store) = appointment_executor();
    let owned = store
        .create(
            Some("u-1"),
            agenda_store::NewAppointment {
                title: "Haircut".into(),
                start_time: agenda_store::parse_timestamp("2026-10-20T10:00:00Z").unwrap(),
                end_time: agenda_store::parse_timestamp("2026-10-20T10:30:00Z").unwrap(),
            },
        )
        .await
        .unwrap();
    let client = Arc::new(
        ScriptedClient::new()
            .tool_requests(
                "",
                vec![call("c1", "delete_appointment", json!({"id": owned.id}))],
            )
            .answer("I couldn't find that appointment."),
    );
    let orch = orchestrator(&client, executor);

    let reply = orch
        .respond(ChatRequest::new(vec![Message::user("delete it")]))
        .await;

    assert_eq!(reply.status, 200);
    assert_eq!(store.list(Some("u-1")).await.unwrap(), vec![owned.clone()]);

    let followup = &client.submissions()[1].messages;
    let tool_msg = followup.iter().find(|m| m.role == Role::Tool).unwrap();
    assert_eq!(
        serde_json::from_str::<ToolResult>(&tool_msg.content).unwrap(),
        ToolResult::Failed(format!(
            "store operation failed: {}",
            StoreError::NotFound(owned.id)
        ))
    );
}

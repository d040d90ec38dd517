//! Tests for tool dispatch, validation, and failure folding.

use std::sync::atomic::Ordering;
use std::time::Duration;

use serde_json::json;

use agenda_common::Caller;

use super::*;
use crate::testing::{appointment_executor, call, executor_with, PanickingTool, SlowTool};

fn alice() -> Caller {
    Caller::new("u-1", "Alice")
}

fn dentist() -> serde_json::Value {
    json!({
        "title": "Dentist",
        "start_time": "2026-03-14T15:00:00Z",
        "end_time": "2026-03-14T16:00:00Z"
    })
}

#[test]
fn tool_result_wire_format() {
    let ok = ToolResult::Ok(json!({"id": 1}));
    assert_eq!(ok.to_content(), r#"{"status":"ok","data":{"id":1}}"#);

    let failed = ToolResult::Failed("unknown tool: nope".into());
    assert_eq!(
        failed.to_content(),
        r#"{"status":"failed","data":"unknown tool: nope"}"#
    );
    assert!(ok.is_ok());
    assert!(!failed.is_ok());
}

#[tokio::test]
async fn unknown_tool_fails_without_touching_store() {
    let (executor, store) = appointment_executor();
    let result = executor
        .execute(&call("c1", "cancel_everything", json!({})), &alice())
        .await;
    assert_eq!(
        result,
        ToolResult::Failed("unknown tool: cancel_everything".into())
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_invalid_arguments() {
    let (executor, store) = appointment_executor();
    let mut bad = call("c1", "create_appointment", json!({}));
    bad.arguments = "{\"title\": ".into();

    let result = executor.execute(&bad, &alice()).await;
    let ToolResult::Failed(reason) = result else {
        panic!("expected failure");
    };
    assert!(reason.starts_with("invalid arguments: arguments are not valid JSON"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn schema_violation_is_invalid_arguments() {
    let (executor, store) = appointment_executor();
    let result = executor
        .execute(
            &call("c1", "create_appointment", json!({"title": "Dentist"})),
            &alice(),
        )
        .await;
    assert_eq!(
        result,
        ToolResult::Failed("invalid arguments: missing required field 'start_time'".into())
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn empty_arguments_mean_no_arguments() {
    let (executor, _store) = appointment_executor();
    let mut list = call("c1", "get_appointments", json!({}));
    list.arguments = String::new();

    let result = executor.execute(&list, &alice()).await;
    assert_eq!(result, ToolResult::Ok(json!([])));
}

#[tokio::test]
async fn store_failure_is_reported() {
    let (executor, _store) = appointment_executor();
    let result = executor
        .execute(&call("c1", "delete_appointment", json!({"id": 7})), &alice())
        .await;
    assert_eq!(
        result,
        ToolResult::Failed("store operation failed: appointment 7 not found".into())
    );
}

#[tokio::test]
async fn closed_store_is_reported_as_store_failure() {
    let (executor, store) = appointment_executor();
    store.close();
    let result = executor
        .execute(&call("c1", "get_appointments", json!({})), &alice())
        .await;
    let ToolResult::Failed(reason) = result else {
        panic!("expected failure");
    };
    assert!(reason.starts_with("store operation failed: store unavailable"));
}

#[tokio::test]
async fn successful_create_persists_and_returns_record() {
    let (executor, store) = appointment_executor();
    let result = executor
        .execute(&call("c1", "create_appointment", dentist()), &alice())
        .await;
    let ToolResult::Ok(record) = result else {
        panic!("expected success");
    };
    assert_eq!(record["title"], "Dentist");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn repeated_read_is_stable() {
    let (executor, _store) = appointment_executor();
    executor
        .execute(&call("c1", "create_appointment", dentist()), &alice())
        .await;

    let list = call("c2", "get_appointments", json!({}));
    let first = executor.execute(&list, &alice()).await;
    let second = executor.execute(&list, &alice()).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn panicking_tool_becomes_failure() {
    let registry = ToolRegistry::builder()
        .register(PanickingTool)
        .build()
        .unwrap();
    let executor = executor_with(registry);

    let result = executor
        .execute(&call("c1", "explode", json!({})), &alice())
        .await;
    assert_eq!(result, ToolResult::Failed("tool execution failed: tool panicked: boom".into()));
}

#[tokio::test]
async fn slow_tool_times_out() {
    let registry = ToolRegistry::builder()
        .register(SlowTool::new(Duration::from_secs(5)))
        .build()
        .unwrap();
    let executor = executor_with(registry).with_timeout(Duration::from_millis(20));

    let result = executor
        .execute(&call("c1", "slow", json!({"tag": "a"})), &alice())
        .await;
    assert_eq!(
        result,
        ToolResult::Failed("tool execution failed: timed out after 20ms".into())
    );
}

#[tokio::test]
async fn batch_keeps_request_order_and_isolates_failures() {
    let (executor, store) = appointment_executor();
    let calls = vec![
        call("c1", "create_appointment", dentist()),
        call("c2", "no_such_tool", json!({})),
        call("c3", "get_appointments", json!({})),
    ];

    let results = executor.execute_all(&calls, &alice(), false).await;
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert_eq!(results[1], ToolResult::Failed("unknown tool: no_such_tool".into()));
    let ToolResult::Ok(listed) = &results[2] else {
        panic!("expected list");
    };
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn sequential_batch_does_not_overlap() {
    let tool = SlowTool::new(Duration::from_millis(10));
    let max_in_flight = tool.max_in_flight.clone();
    let executor = executor_with(ToolRegistry::builder().register(tool).build().unwrap());

    let calls: Vec<_> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, tag)| call(&format!("c{i}"), "slow", json!({"tag": tag})))
        .collect();
    let results = executor.execute_all(&calls, &alice(), false).await;

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(
        results,
        vec![
            ToolResult::Ok(json!("a")),
            ToolResult::Ok(json!("b")),
            ToolResult::Ok(json!("c"))
        ]
    );
}

#[tokio::test]
async fn parallel_batch_overlaps_but_keeps_order() {
    let tool = SlowTool::new(Duration::from_millis(50));
    let max_in_flight = tool.max_in_flight.clone();
    let executor = executor_with(ToolRegistry::builder().register(tool).build().unwrap());

    let calls: Vec<_> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, tag)| call(&format!("c{i}"), "slow", json!({"tag": tag})))
        .collect();
    let results = executor.execute_all(&calls, &alice(), true).await;

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 3);
    assert_eq!(
        results,
        vec![
            ToolResult::Ok(json!("a")),
            ToolResult::Ok(json!("b")),
            ToolResult::Ok(json!("c"))
        ]
    );
}

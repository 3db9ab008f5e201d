//! In-memory integration tests for agent lifecycle and command handling.

use std::time::Duration;

use super::helpers::{Stack, agent, echo_agent, run_command, stack};
use chrono::TimeDelta;
use conclave::{
    agent::domain::TurnRole,
    registry::services::RegistryError,
    sandbox::domain::SandboxPhase,
};
use rstest::rstest;
use tokio::task::JoinSet;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_agent_is_listed_and_id_is_exclusive(stack: Stack) {
    stack
        .manager
        .create(echo_agent("a1"))
        .await
        .expect("first create should succeed");

    let listed = stack.manager.list().await;
    let duplicate = stack.manager.create(echo_agent("a1")).await;

    assert!(listed.iter().any(|summary| summary.id() == &agent("a1")));
    assert!(matches!(duplicate, Err(RegistryError::AgentAlreadyExists(_))));
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn echo_command_output_reaches_the_model(stack: Stack) {
    stack
        .provider
        .push_invocations("", vec![run_command("call-1", "echo hello")])
        .expect("script writable");
    stack.provider.push_reply("the sandbox said hello").expect("script writable");
    stack.manager.create(echo_agent("a1")).await.expect("create a1");

    let reply = stack
        .manager
        .send_command(&agent("a1"), "echo hello")
        .await
        .expect("command answered");

    assert_eq!(reply, "the sandbox said hello");
    let requests = stack.provider.requests().expect("requests readable");
    let follow_up = requests.get(1).expect("follow-up completion requested");
    let tool_result = follow_up
        .history()
        .iter()
        .find(|turn| turn.role() == TurnRole::ToolResult)
        .expect("tool result in history");
    assert!(tool_result.content().contains("hello"));

    let specs = stack.runtime.created_specs().expect("specs readable");
    let spec = specs.first().expect("one container created");
    assert_eq!(spec.argv(), ["echo".to_owned(), "hello".to_owned()]);
    assert!(spec.mounts().is_empty());
    assert_eq!(stack.runtime.live_containers().expect("state readable"), 0);
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn killed_agent_no_longer_accepts_commands(stack: Stack) {
    stack.manager.create(echo_agent("a1")).await.expect("create a1");

    stack.manager.kill(&agent("a1")).await.expect("kill a1");

    assert!(stack.manager.list().await.is_empty());
    assert!(matches!(
        stack.manager.send_command(&agent("a1"), "echo hi").await,
        Err(RegistryError::AgentNotFound(_))
    ));
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn killing_an_agent_mid_command_removes_its_container(stack: Stack) {
    stack
        .runtime
        .stall_phase(SandboxPhase::Wait)
        .expect("stall registered");
    stack
        .provider
        .push_invocations("", vec![run_command("call-1", "echo stuck")])
        .expect("script writable");
    stack.manager.create(echo_agent("a1")).await.expect("create a1");

    let manager = stack.manager.clone();
    let command =
        tokio::spawn(async move { manager.send_command(&agent("a1"), "echo stuck").await });
    for _ in 0..100 {
        if stack.runtime.live_containers().expect("state readable") == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(stack.runtime.live_containers().expect("state readable"), 1);

    stack.manager.kill(&agent("a1")).await.expect("kill a1");

    let outcome = command.await.expect("task joins");
    assert!(matches!(outcome, Err(RegistryError::AgentTerminated(_))));
    for _ in 0..100 {
        if !stack.runtime.removed().expect("state readable").is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(stack.runtime.removed().expect("state readable").len(), 1);
    assert_eq!(stack.runtime.live_containers().expect("state readable"), 0);
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn idle_agent_is_gone_after_reaper_pass(stack: Stack) {
    stack.manager.create(echo_agent("sleepy")).await.expect("create sleepy");
    stack.clock.advance(TimeDelta::minutes(61));

    let before = stack.manager.list().await;
    let reaped = stack.manager.reap_idle().await;
    let after = stack.manager.list().await;

    assert_eq!(before.len(), 1);
    assert_eq!(reaped, vec![agent("sleepy")]);
    assert!(after.is_empty());
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn agents_serve_commands_concurrently(stack: Stack) {
    let ids = ["c1", "c2", "c3", "c4", "c5"];
    for id in ids {
        stack.manager.create(echo_agent(id)).await.expect("create agent");
        stack.provider.push_reply("ack").expect("script writable");
    }

    let mut pending = JoinSet::new();
    for id in ids {
        let manager = stack.manager.clone();
        pending.spawn(async move { manager.send_command(&agent(id), "status").await });
    }
    let mut answered = 0;
    while let Some(joined) = pending.join_next().await {
        let reply = joined.expect("task joins").expect("command answered");
        assert_eq!(reply, "ack");
        answered += 1;
    }

    assert_eq!(answered, ids.len());
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commands_to_one_agent_are_serialised(stack: Stack) {
    stack.manager.create(echo_agent("a1")).await.expect("create a1");
    stack.provider.push_reply("first").expect("script writable");
    stack.provider.push_reply("second").expect("script writable");

    let first = stack.manager.clone();
    let second = stack.manager.clone();
    let first_id = agent("a1");
    let (one, two) = tokio::join!(
        first.send_command(&first_id, "one"),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            second.send_command(&agent("a1"), "two").await
        }
    );

    assert_eq!(one.expect("first answered"), "first");
    assert_eq!(two.expect("second answered"), "second");
    let requests = stack.provider.requests().expect("requests readable");
    let last = requests.last().expect("two requests");
    let users: Vec<&str> = last
        .history()
        .iter()
        .filter(|turn| turn.role() == TurnRole::User)
        .map(|turn| turn.content())
        .collect();
    assert_eq!(users, vec!["one", "two"]);
    stack.manager.shutdown().await;
}

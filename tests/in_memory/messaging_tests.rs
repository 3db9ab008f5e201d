//! In-memory integration tests for messaging between running agents.

use super::helpers::{Stack, agent, echo_agent, publish, stack};
use conclave::{agent::domain::TurnRole, bus::domain::BusMessage};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn published_alert_is_drained_by_subscriber(stack: Stack) {
    stack.manager.create(echo_agent("a1")).await.expect("create a1");
    stack.manager.create(echo_agent("a2")).await.expect("create a2");
    stack.manager.subscribe(&agent("a2"), "alerts").await;
    stack
        .provider
        .push_invocations("", vec![publish("call-1", "alerts", "x")])
        .expect("script writable");
    stack.provider.push_reply("alert sent").expect("script writable");

    let reply = stack
        .manager
        .send_command(&agent("a1"), "raise an alert")
        .await
        .expect("command answered");
    let drained = stack.bus.drain(&agent("a2")).await;

    assert_eq!(reply, "alert sent");
    assert_eq!(drained, vec![BusMessage::new(agent("a1"), "alerts", "x")]);
    assert!(stack.bus.drain(&agent("a2")).await.is_empty());
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subscriber_sees_message_on_its_next_command(stack: Stack) {
    stack.manager.create(echo_agent("a1")).await.expect("create a1");
    stack.manager.create(echo_agent("a2")).await.expect("create a2");
    stack.manager.subscribe(&agent("a2"), "alerts").await;
    stack
        .provider
        .push_invocations("", vec![publish("call-1", "alerts", "disk full")])
        .expect("script writable");
    stack.provider.push_reply("sent").expect("script writable");
    stack.provider.push_reply("nothing to do").expect("script writable");
    stack
        .provider
        .push_reply("a1 reports the disk is full")
        .expect("script writable");

    stack
        .manager
        .send_command(&agent("a1"), "warn everyone")
        .await
        .expect("a1 answered");
    let reply = stack
        .manager
        .send_command(&agent("a2"), "anything new?")
        .await
        .expect("a2 answered");

    assert_eq!(reply, "a1 reports the disk is full");
    let requests = stack.provider.requests().expect("requests readable");
    let digest_request = requests.last().expect("digest request");
    let digest = digest_request
        .history()
        .iter()
        .rev()
        .find(|turn| turn.role() == TurnRole::System)
        .expect("digest turn");
    assert!(digest.content().contains("[alerts] a1: disk full"));
    stack.manager.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn publishing_to_unknown_topic_is_reported_as_tool_text(stack: Stack) {
    stack.manager.create(echo_agent("a1")).await.expect("create a1");
    stack
        .provider
        .push_invocations("", vec![publish("call-1", "nowhere", "x")])
        .expect("script writable");
    stack.provider.push_reply("could not send").expect("script writable");

    let reply = stack
        .manager
        .send_command(&agent("a1"), "broadcast")
        .await
        .expect("command answered");

    assert_eq!(reply, "could not send");
    let requests = stack.provider.requests().expect("requests readable");
    let follow_up = requests.last().expect("follow-up request");
    assert!(follow_up.history().iter().any(|turn| {
        turn.role() == TurnRole::ToolResult && turn.content() == "error: unknown topic 'nowhere'"
    }));
    stack.manager.shutdown().await;
}

//! Then steps for agent lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use conclave::{
    agent::domain::{AgentId, TurnRole},
    bridge::services::BridgeError,
    registry::services::RegistryError,
};
use eyre::WrapErr;
use rstest_bdd_macros::then;

#[then(r#"listing agents shows "{id}""#)]
fn listing_shows(world: &mut LifecycleWorld, id: String) -> Result<(), eyre::Report> {
    let listed = run_async(world.bridge.list_agents());
    if !listed.iter().any(|summary| summary.id().as_str() == id) {
        return Err(eyre::eyre!("expected '{id}' in listing"));
    }
    Ok(())
}

#[then("no agents are listed")]
fn no_agents_listed(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let listed = run_async(world.bridge.list_agents());
    if !listed.is_empty() {
        return Err(eyre::eyre!("expected no agents, found {}", listed.len()));
    }
    Ok(())
}

#[then("creation fails because the agent already exists")]
fn creation_fails_duplicate(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_create
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing create result in scenario world"))?;
    if !matches!(
        result,
        Err(BridgeError::Registry(RegistryError::AgentAlreadyExists(_)))
    ) {
        return Err(eyre::eyre!("expected AgentAlreadyExists, got {result:?}"));
    }
    Ok(())
}

#[then(r#"the reply is "{expected}""#)]
fn reply_is(world: &LifecycleWorld, expected: String) -> Result<(), eyre::Report> {
    let result = world
        .last_reply
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing command result in scenario world"))?;
    match result {
        Ok(reply) if *reply == expected => Ok(()),
        other => Err(eyre::eyre!("expected reply '{expected}', got {other:?}")),
    }
}

#[then(r#"the model saw a tool result containing "{text}""#)]
fn model_saw_tool_result(world: &LifecycleWorld, text: String) -> Result<(), eyre::Report> {
    let requests = world.provider.requests().wrap_err("read provider requests")?;
    let seen = requests.iter().any(|request| {
        request
            .history()
            .iter()
            .any(|turn| turn.role() == TurnRole::ToolResult && turn.content().contains(&text))
    });
    if !seen {
        return Err(eyre::eyre!("no tool result contained '{text}'"));
    }
    Ok(())
}

#[then(r#"agent "{reader}" drains {count:usize} message from "{sender}""#)]
fn agent_drains(
    world: &mut LifecycleWorld,
    reader: String,
    count: usize,
    sender: String,
) -> Result<(), eyre::Report> {
    let reader_id = AgentId::new(reader).wrap_err("parse reader id")?;
    let sender_id = AgentId::new(sender).wrap_err("parse sender id")?;
    let drained = run_async(world.bus.drain(&reader_id));
    if drained.len() != count {
        return Err(eyre::eyre!("expected {count} messages, drained {}", drained.len()));
    }
    if drained.iter().any(|message| message.from() != &sender_id) {
        return Err(eyre::eyre!("drained a message not sent by '{sender_id}'"));
    }
    Ok(())
}

#[then(r#"sending a command to "{id}" fails because the agent was not found"#)]
fn send_fails_not_found(world: &mut LifecycleWorld, id: String) -> Result<(), eyre::Report> {
    let result = run_async(world.bridge.send_command(&id, "hello"));
    if !matches!(
        result,
        Err(BridgeError::Registry(RegistryError::AgentNotFound(_)))
    ) {
        return Err(eyre::eyre!("expected AgentNotFound, got {result:?}"));
    }
    Ok(())
}

//! Given steps for agent lifecycle BDD scenarios.

use super::world::{LifecycleWorld, create_params, run_async};
use conclave::agent::domain::{AgentId, CapabilityInvocation, PUBLISH_MESSAGE, RUN_COMMAND};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;

#[given("a bridge backed by a scripted model")]
fn a_bridge(world: &mut LifecycleWorld) {
    world.last_create = None;
    world.last_reply = None;
}

#[given(r#"agent "{id}" is running with commands "{commands}""#)]
fn agent_running(
    world: &mut LifecycleWorld,
    id: String,
    commands: String,
) -> Result<(), eyre::Report> {
    run_async(world.bridge.create_agent(create_params(&id, &commands)))
        .wrap_err("create agent for scenario")?;
    Ok(())
}

#[given(r#"agent "{id}" is subscribed to "{topic}""#)]
fn agent_subscribed(
    world: &mut LifecycleWorld,
    id: String,
    topic: String,
) -> Result<(), eyre::Report> {
    run_async(world.bridge.subscribe_agent(&id, &topic)).wrap_err("subscribe agent")?;
    let subscribers = run_async(world.bus.subscribers(&topic));
    let expected = AgentId::new(id).wrap_err("parse agent id")?;
    if !subscribers.contains(&expected) {
        return Err(eyre::eyre!("subscription to '{topic}' was not recorded"));
    }
    Ok(())
}

#[given(r#"the model will run "{command}" and then reply "{reply}""#)]
fn model_runs_command(
    world: &mut LifecycleWorld,
    command: String,
    reply: String,
) -> Result<(), eyre::Report> {
    let invocation =
        CapabilityInvocation::new("call-1", RUN_COMMAND, json!({ "command": command }));
    world
        .provider
        .push_invocations("", vec![invocation])
        .wrap_err("script invocation")?;
    world.provider.push_reply(reply).wrap_err("script reply")?;
    Ok(())
}

#[given(r#"the model will publish "{content}" to "{topic}" and then reply "{reply}""#)]
fn model_publishes(
    world: &mut LifecycleWorld,
    content: String,
    topic: String,
    reply: String,
) -> Result<(), eyre::Report> {
    let invocation = CapabilityInvocation::new(
        "call-1",
        PUBLISH_MESSAGE,
        json!({ "topic": topic, "content": content }),
    );
    world
        .provider
        .push_invocations("", vec![invocation])
        .wrap_err("script invocation")?;
    world.provider.push_reply(reply).wrap_err("script reply")?;
    Ok(())
}

//! When steps for agent lifecycle BDD scenarios.

use super::world::{LifecycleWorld, create_params, run_async};
use rstest_bdd_macros::when;

#[when(r#"agent "{id}" is created allowing "{commands}""#)]
fn create_agent(world: &mut LifecycleWorld, id: String, commands: String) {
    world.last_create = Some(run_async(
        world.bridge.create_agent(create_params(&id, &commands)),
    ));
}

#[when(r#"command "{command}" is sent to agent "{id}""#)]
fn send_command(world: &mut LifecycleWorld, command: String, id: String) {
    world.last_reply = Some(run_async(world.bridge.send_command(&id, &command)));
}

#[when(r#"agent "{id}" is killed"#)]
fn kill_agent(world: &mut LifecycleWorld, id: String) -> Result<(), eyre::Report> {
    run_async(world.bridge.kill_agent(&id)).map_err(|err| eyre::eyre!("kill failed: {err}"))?;
    Ok(())
}

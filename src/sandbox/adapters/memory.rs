//! In-memory sandbox runtime for tests and deterministic local flows.

use crate::sandbox::{
    domain::{ContainerHandle, ContainerSpec, ExitStatus, SandboxPhase},
    ports::{SandboxRuntime, SandboxRuntimeError, SandboxRuntimeResult},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

/// Scripted result for a program run inside the in-memory sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ScriptedRun {
    output: String,
    exit_code: i64,
}

#[derive(Debug)]
struct SimulatedContainer {
    spec: ContainerSpec,
    started: bool,
}

/// In-memory sandbox runtime adapter.
///
/// Models the container lifecycle without touching a container engine.
/// `echo` is emulated; other programs produce empty output unless a script
/// is registered with [`InMemorySandboxRuntime::script`]. A phase can be
/// forced to fail with [`InMemorySandboxRuntime::fail_phase`] or to never
/// return with [`InMemorySandboxRuntime::stall_phase`].
#[derive(Debug, Clone, Default)]
pub struct InMemorySandboxRuntime {
    state: Arc<RwLock<InMemoryRuntimeState>>,
}

#[derive(Debug, Default)]
struct InMemoryRuntimeState {
    next_id: u64,
    containers: HashMap<ContainerHandle, SimulatedContainer>,
    scripts: HashMap<String, ScriptedRun>,
    failing_phases: HashSet<SandboxPhase>,
    stalled_phases: HashSet<SandboxPhase>,
    created: Vec<ContainerSpec>,
    removed: Vec<ContainerHandle>,
}

fn lock_error(err: &impl ToString) -> SandboxRuntimeError {
    SandboxRuntimeError::runtime(std::io::Error::other(err.to_string()))
}

impl InMemorySandboxRuntime {
    /// Creates an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the output and exit code produced by `program`.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn script(
        &self,
        program: impl Into<String>,
        output: impl Into<String>,
        exit_code: i64,
    ) -> SandboxRuntimeResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.scripts.insert(
            program.into(),
            ScriptedRun {
                output: output.into(),
                exit_code,
            },
        );
        Ok(())
    }

    /// Makes every subsequent call for `phase` fail.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn fail_phase(&self, phase: SandboxPhase) -> SandboxRuntimeResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.failing_phases.insert(phase);
        Ok(())
    }

    /// Makes every subsequent call for `phase` wait forever, as a command
    /// that never exits would.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn stall_phase(&self, phase: SandboxPhase) -> SandboxRuntimeResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.stalled_phases.insert(phase);
        Ok(())
    }

    async fn enter_phase(&self, phase: SandboxPhase) -> SandboxRuntimeResult<()> {
        let stalled = {
            let state = self.state.read().map_err(|err| lock_error(&err))?;
            state.check_phase(phase)?;
            state.stalled_phases.contains(&phase)
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    /// Returns every container specification passed to `create`.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn created_specs(&self) -> SandboxRuntimeResult<Vec<ContainerSpec>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.created.clone())
    }

    /// Returns the handles of removed containers, in removal order.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn removed(&self) -> SandboxRuntimeResult<Vec<ContainerHandle>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.removed.clone())
    }

    /// Returns the number of containers that still exist.
    ///
    /// # Errors
    ///
    /// Returns runtime errors when lock acquisition fails.
    pub fn live_containers(&self) -> SandboxRuntimeResult<usize> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.containers.len())
    }
}

impl InMemoryRuntimeState {
    fn check_phase(&self, phase: SandboxPhase) -> SandboxRuntimeResult<()> {
        if self.failing_phases.contains(&phase) {
            return Err(SandboxRuntimeError::CommandFailed(format!(
                "simulated {phase} failure"
            )));
        }
        Ok(())
    }

    fn container(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<&SimulatedContainer> {
        self.containers
            .get(handle)
            .ok_or_else(|| SandboxRuntimeError::NotFound(handle.clone()))
    }

    fn run(&self, spec: &ContainerSpec) -> ScriptedRun {
        let Some((program, args)) = spec.argv().split_first() else {
            return ScriptedRun {
                output: String::new(),
                exit_code: 0,
            };
        };
        if let Some(scripted) = self.scripts.get(program) {
            return scripted.clone();
        }
        let output = if program == "echo" {
            format!("{}\n", args.join(" "))
        } else {
            String::new()
        };
        ScriptedRun {
            output,
            exit_code: 0,
        }
    }
}

#[async_trait]
impl SandboxRuntime for InMemorySandboxRuntime {
    async fn create(&self, spec: &ContainerSpec) -> SandboxRuntimeResult<ContainerHandle> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state.check_phase(SandboxPhase::Create)?;
        state.next_id += 1;
        let handle = ContainerHandle::new(format!("sim-{}", state.next_id));
        state.created.push(spec.clone());
        state.containers.insert(
            handle.clone(),
            SimulatedContainer {
                spec: spec.clone(),
                started: false,
            },
        );
        Ok(handle)
    }

    async fn start(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<()> {
        self.enter_phase(SandboxPhase::Start).await?;
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let container = state
            .containers
            .get_mut(handle)
            .ok_or_else(|| SandboxRuntimeError::NotFound(handle.clone()))?;
        container.started = true;
        Ok(())
    }

    async fn wait(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<ExitStatus> {
        self.enter_phase(SandboxPhase::Wait).await?;
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let container = state.container(handle)?;
        if !container.started {
            return Err(SandboxRuntimeError::CommandFailed(format!(
                "container {handle} was never started"
            )));
        }
        Ok(ExitStatus::new(state.run(&container.spec).exit_code))
    }

    async fn logs(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<Vec<u8>> {
        self.enter_phase(SandboxPhase::Logs).await?;
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let container = state.container(handle)?;
        Ok(state.run(&container.spec).output.into_bytes())
    }

    async fn remove(&self, handle: &ContainerHandle) -> SandboxRuntimeResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        state
            .containers
            .remove(handle)
            .ok_or_else(|| SandboxRuntimeError::NotFound(handle.clone()))?;
        state.removed.push(handle.clone());
        Ok(())
    }
}

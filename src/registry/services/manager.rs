//! Supervises one task per running agent.

use crate::agent::{
    domain::{ActivityStamp, AgentDomainError, AgentId},
    services::{
        AgentCollaborators, AgentCommand, AgentSession, AgentSignals, AgentTurnError, AgentWorker,
    },
};
use crate::registry::domain::{AgentSummary, CreateAgentRequest, RegistryLimits};
use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{RwLock, mpsc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors returned by registry operations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The supplied agent id is invalid.
    #[error(transparent)]
    Domain(#[from] AgentDomainError),

    /// No live agent has the id.
    #[error("agent '{0}' not found")]
    AgentNotFound(AgentId),

    /// A live agent already has the id.
    #[error("agent '{0}' already exists")]
    AgentAlreadyExists(AgentId),

    /// The agent stopped while a command was pending.
    #[error("agent '{0}' terminated before answering")]
    AgentTerminated(AgentId),

    /// The manager has been shut down and accepts no new agents.
    #[error("agent manager is shut down")]
    ShutDown,

    /// The agent could not complete the command.
    #[error(transparent)]
    Turn(#[from] AgentTurnError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry-side handle on an agent task.
struct RunningAgent {
    inbox: mpsc::Sender<AgentCommand>,
    activity: Arc<ActivityStamp>,
    signals: AgentSignals,
    instance: Uuid,
}

impl RunningAgent {
    fn summary(&self, id: &AgentId) -> AgentSummary {
        AgentSummary::new(id.clone(), self.activity.last_active())
    }
}

type AgentMap = Arc<RwLock<HashMap<AgentId, RunningAgent>>>;

/// Creates, tracks and terminates agents.
///
/// Cloning yields another handle on the same registry. Every agent task and
/// the idle reaper run under one supervisor token, so [`Self::shutdown`]
/// stops all of them.
pub struct AgentManager<C = DefaultClock>
where
    C: Clock + Send + Sync + 'static,
{
    agents: AgentMap,
    collaborators: AgentCollaborators,
    clock: Arc<C>,
    limits: RegistryLimits,
    supervisor: CancellationToken,
    tracker: TaskTracker,
}

impl<C> Clone for AgentManager<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            agents: Arc::clone(&self.agents),
            collaborators: self.collaborators.clone(),
            clock: Arc::clone(&self.clock),
            limits: self.limits,
            supervisor: self.supervisor.clone(),
            tracker: self.tracker.clone(),
        }
    }
}

impl<C> AgentManager<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new(collaborators: AgentCollaborators, clock: Arc<C>, limits: RegistryLimits) -> Self {
        Self {
            agents: Arc::new(RwLock::new(HashMap::new())),
            collaborators,
            clock,
            limits,
            supervisor: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Returns the shared collaborators handed to every agent.
    #[must_use]
    pub const fn collaborators(&self) -> &AgentCollaborators {
        &self.collaborators
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> RegistryLimits {
        self.limits
    }

    /// Starts an agent and returns without waiting for it to do anything.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Domain`] for an invalid id,
    /// [`RegistryError::AgentAlreadyExists`] when the id is live and
    /// [`RegistryError::ShutDown`] after [`Self::shutdown`].
    pub async fn create(&self, request: CreateAgentRequest) -> RegistryResult<AgentSummary> {
        let id = AgentId::new(request.id())?;
        let mut agents = self.agents.write().await;
        if self.supervisor.is_cancelled() {
            return Err(RegistryError::ShutDown);
        }
        if agents.contains_key(&id) {
            return Err(RegistryError::AgentAlreadyExists(id));
        }

        let (inbox, receiver) = mpsc::channel(1);
        let activity = Arc::new(ActivityStamp::new(self.clock.utc()));
        let signals = AgentSignals::new(self.supervisor.child_token());
        let instance = Uuid::new_v4();
        let session = AgentSession::new(id.clone(), request.profile(), self.collaborators.clone());
        let worker = AgentWorker::new(
            session,
            receiver,
            Arc::clone(&activity),
            Arc::clone(&self.clock),
            signals.clone(),
        );
        self.tracker
            .spawn(supervise(worker, Arc::clone(&self.agents), id.clone(), instance));

        let entry = RunningAgent {
            inbox,
            activity,
            signals,
            instance,
        };
        let summary = entry.summary(&id);
        agents.insert(id.clone(), entry);
        info!(agent_id = %id, "agent created");
        Ok(summary)
    }

    /// Hands `text` to the agent and waits for its response.
    ///
    /// Waits while another command occupies the agent's inbox.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AgentNotFound`] when no such agent is live,
    /// [`RegistryError::AgentTerminated`] when it stops before answering and
    /// [`RegistryError::Turn`] when the command itself fails.
    pub async fn send_command(&self, id: &AgentId, text: &str) -> RegistryResult<String> {
        let (inbox, activity) = {
            let agents = self.agents.read().await;
            let entry = agents
                .get(id)
                .ok_or_else(|| RegistryError::AgentNotFound(id.clone()))?;
            (entry.inbox.clone(), Arc::clone(&entry.activity))
        };
        activity.touch(&*self.clock);

        let (command, response) = AgentCommand::new(text);
        inbox
            .send(command)
            .await
            .map_err(|_| RegistryError::AgentTerminated(id.clone()))?;
        let outcome = response
            .await
            .map_err(|_| RegistryError::AgentTerminated(id.clone()))?;
        outcome.map_err(RegistryError::from)
    }

    /// Returns every live agent, ordered by id.
    pub async fn list(&self) -> Vec<AgentSummary> {
        let agents = self.agents.read().await;
        let mut summaries: Vec<AgentSummary> = agents
            .iter()
            .map(|(id, entry)| entry.summary(id))
            .collect();
        summaries.sort_by(|left, right| left.id().cmp(right.id()));
        summaries
    }

    /// Stops the agent and removes it from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AgentNotFound`] when no such agent is live.
    pub async fn kill(&self, id: &AgentId) -> RegistryResult<()> {
        let entry = self
            .agents
            .write()
            .await
            .remove(id)
            .ok_or_else(|| RegistryError::AgentNotFound(id.clone()))?;
        entry.signals.stop();
        info!(agent_id = %id, "agent killed");
        Ok(())
    }

    /// Subscribes the agent to `topic` on the shared bus.
    ///
    /// The agent does not have to be live.
    pub async fn subscribe(&self, id: &AgentId, topic: &str) {
        self.collaborators.bus().subscribe(id, topic).await;
    }

    /// Runs one reaper pass and returns the ids it removed.
    ///
    /// Idle agents are chosen from a read-locked snapshot and removed under
    /// the write lock afterwards. An agent that receives a command between
    /// the two steps is still removed.
    pub async fn reap_idle(&self) -> Vec<AgentId> {
        let now = self.clock.utc();
        let threshold =
            TimeDelta::from_std(self.limits.idle_threshold()).unwrap_or(TimeDelta::MAX);
        let idle: Vec<AgentId> = {
            let agents = self.agents.read().await;
            agents
                .iter()
                .filter(|(_, entry)| {
                    now.signed_duration_since(entry.activity.last_active()) > threshold
                })
                .map(|(id, _)| id.clone())
                .collect()
        };
        if idle.is_empty() {
            return idle;
        }

        let mut reaped = Vec::with_capacity(idle.len());
        {
            let mut agents = self.agents.write().await;
            for id in idle {
                if let Some(entry) = agents.remove(&id) {
                    entry.signals.stop();
                    reaped.push(id);
                }
            }
        }
        for id in &reaped {
            info!(agent_id = %id, "idle agent reaped");
        }
        reaped
    }

    /// Starts the periodic idle reaper under the supervisor.
    ///
    /// The first pass runs one interval after the call.
    pub fn start_idle_reaper(&self) {
        let manager = self.clone();
        let period = self.limits.reaper_interval();
        self.tracker.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    () = manager.supervisor.cancelled() => break,
                    _ = ticker.tick() => {
                        manager.reap_idle().await;
                    }
                }
            }
            debug!("idle reaper stopped");
        });
        info!(interval_secs = period.as_secs(), "idle reaper started");
    }

    /// Stops every agent and the reaper, waits for their tasks and clears
    /// the registry. New agents are refused afterwards.
    pub async fn shutdown(&self) {
        self.supervisor.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        self.agents.write().await.clear();
        info!("agent manager shut down");
    }
}

/// Runs an agent to completion, then drops its registry entry unless a newer
/// agent has taken the id.
async fn supervise<C>(worker: AgentWorker<C>, agents: AgentMap, id: AgentId, instance: Uuid)
where
    C: Clock + Send + Sync + 'static,
{
    let exit = worker.run().await;
    let mut map = agents.write().await;
    if map.get(&id).is_some_and(|entry| entry.instance == instance) {
        map.remove(&id);
    }
    debug!(agent_id = %id, reason = %exit, "agent task finished");
}

//! The task that owns an agent session and serves its inbox.

use super::session::{AgentSession, AgentTurnResult};
use crate::agent::domain::ActivityStamp;
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A command waiting in an agent's inbox, paired with its reply channel.
#[derive(Debug)]
pub struct AgentCommand {
    text: String,
    reply: oneshot::Sender<AgentTurnResult<String>>,
}

impl AgentCommand {
    /// Creates a command and the receiver its response arrives on.
    ///
    /// The receiver reports a closed channel if the agent stops before
    /// answering.
    #[must_use]
    pub fn new(text: impl Into<String>) -> (Self, oneshot::Receiver<AgentTurnResult<String>>) {
        let (reply, response) = oneshot::channel();
        (
            Self {
                text: text.into(),
                reply,
            },
            response,
        )
    }

    /// Returns the command text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Why an agent loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentExit {
    /// The agent was killed or reaped.
    Terminated,
    /// The supervising token was cancelled.
    Cancelled,
    /// Every inbox sender was dropped.
    InboxClosed,
}

impl AgentExit {
    /// Returns the canonical exit reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Terminated => "terminated",
            Self::Cancelled => "cancelled",
            Self::InboxClosed => "inbox_closed",
        }
    }
}

impl fmt::Display for AgentExit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Stop signals observed by an agent loop.
#[derive(Debug, Clone, Default)]
pub struct AgentSignals {
    terminate: CancellationToken,
    cancel: CancellationToken,
}

impl AgentSignals {
    /// Creates signals with a fresh termination token and `cancel` as the
    /// cancellation handle.
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            terminate: CancellationToken::new(),
            cancel,
        }
    }

    /// Fires both the termination signal and the cancellation handle.
    pub fn stop(&self) {
        self.terminate.cancel();
        self.cancel.cancel();
    }

    /// Returns the termination token.
    #[must_use]
    pub const fn terminate(&self) -> &CancellationToken {
        &self.terminate
    }

    /// Returns the cancellation token.
    #[must_use]
    pub const fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Serves one agent's inbox until it is told to stop.
pub struct AgentWorker<C>
where
    C: Clock + Send + Sync,
{
    session: AgentSession,
    inbox: mpsc::Receiver<AgentCommand>,
    activity: Arc<ActivityStamp>,
    clock: Arc<C>,
    signals: AgentSignals,
}

impl<C> AgentWorker<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a worker.
    #[must_use]
    pub const fn new(
        session: AgentSession,
        inbox: mpsc::Receiver<AgentCommand>,
        activity: Arc<ActivityStamp>,
        clock: Arc<C>,
        signals: AgentSignals,
    ) -> Self {
        Self {
            session,
            inbox,
            activity,
            clock,
            signals,
        }
    }

    /// Runs the loop and returns why it stopped.
    ///
    /// Commands are processed strictly one at a time. Termination and
    /// cancellation are observed while idle and while a command is in
    /// flight; an interrupted command's reply channel is dropped unanswered.
    pub async fn run(self) -> AgentExit {
        let Self {
            mut session,
            mut inbox,
            activity,
            clock,
            signals,
        } = self;

        let exit = loop {
            let command = tokio::select! {
                biased;
                () = signals.terminate.cancelled() => break AgentExit::Terminated,
                () = signals.cancel.cancelled() => break AgentExit::Cancelled,
                received = inbox.recv() => match received {
                    Some(next) => next,
                    None => break AgentExit::InboxClosed,
                },
            };

            activity.touch(&*clock);
            let AgentCommand { text, reply } = command;
            debug!(agent_id = %session.id(), "agent received command");
            let outcome = tokio::select! {
                biased;
                () = signals.terminate.cancelled() => break AgentExit::Terminated,
                () = signals.cancel.cancelled() => break AgentExit::Cancelled,
                result = session.handle_command(&text) => result,
            };

            if reply.send(outcome).is_err() {
                debug!(agent_id = %session.id(), "command caller went away before the reply");
            }
        };

        session.terminate();
        inbox.close();
        info!(agent_id = %session.id(), reason = %exit, "agent stopped");
        exit
    }
}

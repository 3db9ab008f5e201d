//! Topic map with bounded per-topic queues.

use crate::agent::domain::AgentId;
use crate::bus::domain::BusMessage;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::debug;

/// Default number of messages a topic queue can hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default number of messages drained per topic per call.
pub const DEFAULT_DRAIN_BATCH: usize = 10;

/// Errors returned by bus operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    /// Nothing has ever subscribed to the topic, so it has no queue.
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),

    /// The topic queue is at capacity.
    #[error("queue for topic '{0}' is full")]
    QueueFull(String),
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;

/// Capacity limits applied to every topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusLimits {
    queue_capacity: usize,
    drain_batch: usize,
}

impl BusLimits {
    /// Creates limits; zero values are raised to one.
    #[must_use]
    pub fn new(queue_capacity: usize, drain_batch: usize) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            drain_batch: drain_batch.max(1),
        }
    }

    /// Returns the per-topic queue capacity.
    #[must_use]
    pub const fn queue_capacity(self) -> usize {
        self.queue_capacity
    }

    /// Returns the per-topic drain batch size.
    #[must_use]
    pub const fn drain_batch(self) -> usize {
        self.drain_batch
    }
}

impl Default for BusLimits {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY, DEFAULT_DRAIN_BATCH)
    }
}

type SharedReceiver = Arc<Mutex<mpsc::Receiver<BusMessage>>>;

struct TopicChannel {
    sender: mpsc::Sender<BusMessage>,
    receiver: SharedReceiver,
    subscribers: Vec<AgentId>,
}

impl TopicChannel {
    fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            subscribers: Vec::new(),
        }
    }
}

/// Publish/subscribe bus shared by every agent.
///
/// The topic map sits behind a read/write lock that is held only while queue
/// handles are looked up; enqueue and dequeue happen on the channels after
/// the lock is released.
pub struct MessageBus {
    topics: RwLock<HashMap<String, TopicChannel>>,
    limits: BusLimits,
}

impl MessageBus {
    /// Creates a bus with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(BusLimits::default())
    }

    /// Creates a bus with explicit limits.
    #[must_use]
    pub fn with_limits(limits: BusLimits) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            limits,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> BusLimits {
        self.limits
    }

    /// Subscribes `agent_id` to `topic`, creating the topic queue on first
    /// use.
    ///
    /// Repeated subscriptions are recorded as separate entries.
    pub async fn subscribe(&self, agent_id: &AgentId, topic: &str) {
        let mut topics = self.topics.write().await;
        let channel = topics
            .entry(topic.to_owned())
            .or_insert_with(|| TopicChannel::new(self.limits.queue_capacity));
        channel.subscribers.push(agent_id.clone());
        debug!(agent_id = %agent_id, topic = %topic, "agent subscribed to topic");
    }

    /// Enqueues `message` on its topic without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::UnknownTopic`] when the topic has no queue and
    /// [`BusError::QueueFull`] when the queue is at capacity.
    pub async fn publish(&self, message: BusMessage) -> BusResult<()> {
        let sender = {
            let topics = self.topics.read().await;
            topics
                .get(message.topic())
                .map(|channel| channel.sender.clone())
                .ok_or_else(|| BusError::UnknownTopic(message.topic().to_owned()))?
        };

        let topic = message.topic().to_owned();
        let from = message.from().clone();
        sender.try_send(message).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => BusError::QueueFull(topic.clone()),
            mpsc::error::TrySendError::Closed(_) => BusError::UnknownTopic(topic.clone()),
        })?;
        debug!(from = %from, topic = %topic, "message published");
        Ok(())
    }

    /// Dequeues up to the drain batch size from every topic `agent_id` is
    /// subscribed to. Never waits for new messages.
    ///
    /// Each topic is visited once per call even if the agent subscribed to it
    /// more than once.
    pub async fn drain(&self, agent_id: &AgentId) -> Vec<BusMessage> {
        let receivers: Vec<SharedReceiver> = {
            let topics = self.topics.read().await;
            topics
                .values()
                .filter(|channel| channel.subscribers.contains(agent_id))
                .map(|channel| Arc::clone(&channel.receiver))
                .collect()
        };

        let mut drained = Vec::new();
        for receiver in receivers {
            let mut queue = receiver.lock().await;
            for _ in 0..self.limits.drain_batch {
                match queue.try_recv() {
                    Ok(message) => drained.push(message),
                    Err(_) => break,
                }
            }
        }
        if !drained.is_empty() {
            debug!(agent_id = %agent_id, count = drained.len(), "drained bus messages");
        }
        drained
    }

    /// Returns the subscriber list of `topic`, duplicates included.
    pub async fn subscribers(&self, topic: &str) -> Vec<AgentId> {
        let topics = self.topics.read().await;
        topics
            .get(topic)
            .map(|channel| channel.subscribers.clone())
            .unwrap_or_default()
    }

    /// Returns the names of every topic that has a queue.
    pub async fn topics(&self) -> Vec<String> {
        let topics = self.topics.read().await;
        let mut names: Vec<String> = topics.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

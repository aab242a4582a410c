use std::collections::HashMap;

use chrono::{DateTime, Utc};
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::EventBusError;

/// Hierarchical channel name: lowercase dotted segments under a known domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Channel(String);

impl Channel {
    /// Create a new channel, validating its format.
    pub fn new(name: impl Into<String>) -> std::result::Result<Self, EventBusError> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(EventBusError::InvalidChannel(name))
        }
    }

    /// Check if a channel name is valid.
    pub fn is_valid(name: &str) -> bool {
        if name.is_empty() || name.starts_with('.') || name.ends_with('.') || name.contains("..") {
            return false;
        }

        if name
            .chars()
            .any(|c| !matches!(c, 'a'..='z' | '0'..='9' | '.'))
        {
            return false;
        }

        matches!(
            name.split('.').next().unwrap_or(""),
            "system" | "xmpp" | "ui"
        )
    }

    /// Get the domain (first segment) of the channel.
    pub fn domain(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The standard event envelope wrapping all notifications in the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Hierarchical channel name (e.g., "xmpp.chatstate.received")
    pub channel: Channel,

    /// When the event was created (UTC)
    pub timestamp: DateTime<Utc>,

    /// Unique identifier for this event
    pub id: Uuid,

    /// Source component that emitted this event
    pub source: EventSource,

    /// The typed event payload
    pub payload: EventPayload,
}

impl Event {
    pub fn new(channel: Channel, source: EventSource, payload: EventPayload) -> Self {
        Self {
            channel,
            timestamp: Utc::now(),
            id: Uuid::new_v4(),
            source,
            payload,
        }
    }
}

/// Identifies the component that emitted an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "camelCase")]
pub enum EventSource {
    /// Core system component
    System(String),
    /// XMPP subsystem
    Xmpp,
    /// User interface
    Ui,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum EventPayload {
    // ── Dispatch events ──────────────────────────────────────────
    /// A stanza went through the whole extension chain unclaimed.
    StanzaUnhandled {
        stanza: String,
    },

    // ── Extension events ─────────────────────────────────────────
    ChatStateReceived {
        from: String,
        state: ChatState,
    },
    RoomStatusChanged {
        room: String,
        codes: Vec<u16>,
    },
    ArchiveResultReceived {
        query_id: Option<String>,
        archive_id: String,
    },
    ServiceRequested {
        room: String,
        action: String,
        metadata: HashMap<String, String>,
    },
    CommandReceived {
        from: String,
        node: String,
        action: String,
    },
    RpcCallReceived {
        from: String,
        method: String,
    },
    RainbowMessageReceived {
        from: String,
        body: String,
    },

    // ── Status events ────────────────────────────────────────────
    EffectiveStatusChanged {
        availability: Availability,
        message: Option<String>,
    },
}

/// Chat state of a conversation partner (typing notifications).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatState {
    Active,
    Composing,
    Paused,
    Inactive,
    Gone,
}

/// Coarse availability degree of a status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Availability {
    Offline,
    Away,
    Available,
    Busy,
}

/// Publish/subscribe surface consumed by the dispatcher, the extension
/// handlers, and the status aggregator.
pub trait EventBus: Send + Sync + 'static {
    fn publish(&self, event: Event) -> std::result::Result<(), EventBusError>;
    fn subscribe(&self, pattern: &str) -> std::result::Result<EventSubscription, EventBusError>;
}

/// Event bus backed by a single tokio broadcast channel. Channel-pattern
/// filtering happens on the subscriber side, so a publish is one send.
#[derive(Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<Event>,
}

impl BroadcastEventBus {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl EventBus for BroadcastEventBus {
    fn publish(&self, event: Event) -> std::result::Result<(), EventBusError> {
        // A send with no live subscribers is not an error.
        let _ = self.sender.send(event);
        Ok(())
    }

    fn subscribe(&self, pattern: &str) -> std::result::Result<EventSubscription, EventBusError> {
        let matcher = Glob::new(pattern)
            .map_err(|_| EventBusError::InvalidPattern(pattern.to_string()))?
            .compile_matcher();

        Ok(EventSubscription {
            matcher,
            receiver: self.sender.subscribe(),
        })
    }
}

/// A filtered view of the event stream for one subscriber.
#[derive(Debug)]
pub struct EventSubscription {
    matcher: GlobMatcher,
    receiver: broadcast::Receiver<Event>,
}

impl EventSubscription {
    /// Wait for the next event whose channel matches the subscription pattern.
    pub async fn recv(&mut self) -> std::result::Result<Event, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.matcher.is_match(event.channel.as_str()) => return Ok(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Closed) => return Err(EventBusError::Closed),
                Err(broadcast::error::RecvError::Lagged(n)) => return Err(EventBusError::Lagged(n)),
            }
        }
    }

    /// Drain the next matching event without waiting, if one is queued.
    pub fn try_recv(&mut self) -> std::result::Result<Option<Event>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.matcher.is_match(event.channel.as_str()) => {
                    return Ok(Some(event));
                }
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => return Err(EventBusError::Closed),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Err(EventBusError::Lagged(n));
                }
            }
        }
    }
}

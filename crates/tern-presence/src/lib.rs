use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use tern_core::event::{Availability, Channel, Event, EventBus, EventPayload, EventSource};

/// One availability record from one status source.
///
/// Immutable after construction; a source supersedes its record by
/// submitting a new one, never by mutating the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    availability: Availability,
    /// Language-tagged human-readable messages. The first-inserted entry
    /// defines [`Status::message`], so insertion order is part of the
    /// contract even though keys are unique.
    messages: Vec<(String, String)>,
    /// Routing priority. Lower numbers take precedence over higher ones,
    /// matching the wire-protocol convention.
    priority: i32,
    date: DateTime<Utc>,
    until: Option<DateTime<Utc>>,
    apply: bool,
}

impl Status {
    pub fn new(availability: Availability) -> Self {
        Self {
            availability,
            messages: Vec::new(),
            priority: 0,
            date: Utc::now(),
            until: None,
            apply: true,
        }
    }

    /// Add or replace the message for a language tag. Replacing keeps the
    /// tag's original position.
    pub fn with_message(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        let lang = lang.into();
        let text = text.into();
        match self.messages.iter_mut().find(|(l, _)| *l == lang) {
            Some(entry) => entry.1 = text,
            None => self.messages.push((lang, text)),
        }
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_apply(mut self, apply: bool) -> Self {
        self.apply = apply;
        self
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// The externally observable message: the first-inserted language entry.
    pub fn message(&self) -> Option<&str> {
        self.messages.first().map(|(_, text)| text.as_str())
    }

    pub fn message_for(&self, lang: &str) -> Option<&str> {
        self.messages
            .iter()
            .find(|(l, _)| l == lang)
            .map(|(_, text)| text.as_str())
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn until(&self) -> Option<DateTime<Utc>> {
        self.until
    }

    pub fn apply(&self) -> bool {
        self.apply
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.until.is_some_and(|until| until <= now)
    }
}

impl Default for Status {
    /// The hard-coded fallback: available, no message, no expiry.
    fn default() -> Self {
        Self::new(Availability::Available)
    }
}

/// Merge candidate status records into the single effective one.
///
/// Records with `apply == false` and records expired at `now` are discarded.
/// Of the rest, the lowest priority number wins; ties go to the most recent
/// date. An empty field yields the default status. Inputs are never mutated
/// and the winner is returned as-is, messages included.
pub fn combine(statuses: &[Status], now: DateTime<Utc>) -> Status {
    select(statuses, now)
        .cloned()
        .unwrap_or_default()
}

fn select(statuses: &[Status], now: DateTime<Utc>) -> Option<&Status> {
    statuses
        .iter()
        .filter(|s| s.apply && !s.is_expired(now))
        .min_by(|a, b| a.priority.cmp(&b.priority).then(b.date.cmp(&a.date)))
}

/// Reconciles status records from multiple sources (local user input,
/// calendar feeds, external synchronization providers) into one externally
/// visible status.
///
/// Each source's newest record replaces its previous one, so updates from a
/// single source are observed in submission order. Across sources the winner
/// is decided by [`combine`], not by arrival order.
pub struct StatusAggregator {
    sources: RwLock<HashMap<String, Status>>,
    /// Most recent applied, non-expired submission; used when every live
    /// record is opted out or expired.
    last_applied: RwLock<Option<Status>>,
    event_bus: Arc<dyn EventBus>,
}

impl StatusAggregator {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self {
            sources: RwLock::new(HashMap::new()),
            last_applied: RwLock::new(None),
            event_bus,
        }
    }

    /// Record a source's newest status and announce the effective status if
    /// it changed.
    pub fn submit(&self, source: &str, status: Status) {
        let now = Utc::now();
        let before = self.effective(now);

        if status.apply && !status.is_expired(now) {
            *self.last_applied.write().unwrap() = Some(status.clone());
        }
        self.sources
            .write()
            .unwrap()
            .insert(source.to_string(), status);

        let after = self.effective(now);
        let visible = |s: &Status| (s.availability(), s.message().map(String::from));
        if visible(&after) != visible(&before) {
            debug!(
                source = %source,
                availability = ?after.availability(),
                "effective status changed"
            );
            let _ = self.event_bus.publish(Event::new(
                Channel::new("system.status.changed").unwrap(),
                EventSource::System("status".into()),
                EventPayload::EffectiveStatusChanged {
                    availability: after.availability(),
                    message: after.message().map(String::from),
                },
            ));
        }
    }

    /// The currently effective status as of `now`.
    ///
    /// Falls back to the most recently applied submission when every live
    /// record is filtered out, then to the default.
    pub fn effective(&self, now: DateTime<Utc>) -> Status {
        let sources = self.sources.read().unwrap();
        let statuses: Vec<Status> = sources.values().cloned().collect();
        drop(sources);

        if let Some(winner) = select(&statuses, now) {
            return winner.clone();
        }

        let last = self.last_applied.read().unwrap();
        match last.as_ref() {
            Some(status) if status.apply && !status.is_expired(now) => status.clone(),
            _ => Status::default(),
        }
    }
}

use std::sync::Arc;

use tracing::debug;

use tern_core::event::{Channel, Event, EventBus, EventPayload, EventSource};

use super::bare_jid;
use crate::handler::{HandlerResult, StanzaHandler};
use crate::stanza::{Stanza, StanzaKind};

pub const NS_MUC_USER: &str = "http://jabber.org/protocol/muc#user";

/// Room status codes carried on groupchat messages (104 configuration
/// changed, 170/171 logging toggled, and friends).
///
/// Continues the chain so the message body, when present, still reaches the
/// handlers that render it.
pub struct RoomStatusHandler {
    event_bus: Arc<dyn EventBus>,
}

impl RoomStatusHandler {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self { event_bus }
    }
}

impl StanzaHandler for RoomStatusHandler {
    fn feature(&self) -> &'static str {
        "room-status"
    }

    fn namespaces(&self) -> &'static [&'static str] {
        &[NS_MUC_USER]
    }

    fn kind(&self) -> StanzaKind {
        StanzaKind::Message
    }

    fn handle(&self, stanza: &Stanza) -> HandlerResult {
        let Stanza::Message(msg) = stanza else {
            return HandlerResult::Continue;
        };

        if msg.type_() != "groupchat" {
            return HandlerResult::Continue;
        }

        let Some(x) = msg.payload_named("x", NS_MUC_USER) else {
            return HandlerResult::Continue;
        };

        let codes: Vec<u16> = x
            .children()
            .filter(|child| child.is("status", NS_MUC_USER))
            .filter_map(|child| child.attr("code")?.parse().ok())
            .collect();

        // An x element without status codes is occupant bookkeeping,
        // not a room status change.
        if codes.is_empty() {
            return HandlerResult::Continue;
        }

        let room = bare_jid(msg.from().unwrap_or_default()).to_string();
        debug!(room = %room, ?codes, "room status changed");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.room.status.changed").unwrap(),
            EventSource::Xmpp,
            EventPayload::RoomStatusChanged { room, codes },
        ));

        HandlerResult::Continue
    }
}

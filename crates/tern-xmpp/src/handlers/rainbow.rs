use std::sync::Arc;

use tracing::debug;

use tern_core::event::{Channel, Event, EventBus, EventPayload, EventSource};

use crate::handler::{HandlerResult, StanzaHandler};
use crate::stanza::{NS_CLIENT, Stanza, StanzaKind};

pub const NS_RAINBOW: &str = "urn:tern:rainbow";

/// Rainbow-styled chat messages: a body tagged with a styling marker so the
/// display layer can animate it instead of rendering plain text.
pub struct RainbowMessageHandler {
    event_bus: Arc<dyn EventBus>,
}

impl RainbowMessageHandler {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self { event_bus }
    }
}

impl StanzaHandler for RainbowMessageHandler {
    fn feature(&self) -> &'static str {
        "rainbow-message"
    }

    fn namespaces(&self) -> &'static [&'static str] {
        &[NS_RAINBOW]
    }

    fn kind(&self) -> StanzaKind {
        StanzaKind::Message
    }

    fn handle(&self, stanza: &Stanza) -> HandlerResult {
        let Stanza::Message(msg) = stanza else {
            return HandlerResult::Continue;
        };

        if msg.payload_named("rainbow", NS_RAINBOW).is_none() {
            return HandlerResult::Continue;
        }

        // A marker with no body has nothing to style; let the chain go on.
        let Some(body) = msg.payload_named("body", NS_CLIENT).map(|el| el.text()) else {
            debug!("rainbow marker without body, not claiming");
            return HandlerResult::Continue;
        };

        let from = msg.from().unwrap_or_default().to_string();
        debug!(from = %from, "rainbow message received");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.rainbow.received").unwrap(),
            EventSource::Xmpp,
            EventPayload::RainbowMessageReceived { from, body },
        ));

        HandlerResult::Claimed
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use tern_core::event::{Channel, Event, EventBus, EventPayload, EventSource};

use super::bare_jid;
use crate::handler::{HandlerResult, StanzaHandler};
use crate::stanza::{Stanza, StanzaKind};

pub const NS_SERVICE: &str = "urn:tern:conference-service";

/// Named service actions on a room, carried as a flat parameter map.
pub struct ServiceRequestHandler {
    event_bus: Arc<dyn EventBus>,
}

impl ServiceRequestHandler {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self { event_bus }
    }
}

impl StanzaHandler for ServiceRequestHandler {
    fn feature(&self) -> &'static str {
        "conference-service"
    }

    fn namespaces(&self) -> &'static [&'static str] {
        &[NS_SERVICE]
    }

    fn kind(&self) -> StanzaKind {
        StanzaKind::Message
    }

    fn handle(&self, stanza: &Stanza) -> HandlerResult {
        let Stanza::Message(msg) = stanza else {
            return HandlerResult::Continue;
        };

        let Some(service) = msg.payload_named("service", NS_SERVICE) else {
            return HandlerResult::Continue;
        };

        // Our namespace but no action attribute: malformed, let the rest of
        // the chain have a look.
        let Some(action) = service.attr("action") else {
            debug!("service request without action, not claiming");
            return HandlerResult::Continue;
        };

        let metadata: HashMap<String, String> = service
            .children()
            .filter(|child| child.is("param", NS_SERVICE))
            .filter_map(|child| {
                Some((child.attr("name")?.to_string(), child.attr("value")?.to_string()))
            })
            .collect();

        let room = bare_jid(msg.from().unwrap_or_default()).to_string();
        debug!(room = %room, action = %action, params = metadata.len(), "service requested");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.service.requested").unwrap(),
            EventSource::Xmpp,
            EventPayload::ServiceRequested {
                room,
                action: action.to_string(),
                metadata,
            },
        ));

        HandlerResult::Claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::event::BroadcastEventBus;

    const SERVICE_XML: &[u8] = b"<message xmlns='jabber:client' \
        from='room@muc.example.com/system'>\
        <service xmlns='urn:tern:conference-service' action='recording-started'>\
            <param name='initiator' value='alice'/>\
            <param name='media' value='audio'/>\
        </service>\
    </message>";

    const NO_ACTION_XML: &[u8] = b"<message xmlns='jabber:client' \
        from='room@muc.example.com/system'>\
        <service xmlns='urn:tern:conference-service'/>\
    </message>";

    fn setup() -> (ServiceRequestHandler, Arc<BroadcastEventBus>) {
        let bus = Arc::new(BroadcastEventBus::default());
        (ServiceRequestHandler::new(bus.clone()), bus)
    }

    #[test]
    fn claims_and_builds_the_parameter_map() {
        let (handler, bus) = setup();
        let mut sub = bus.subscribe("xmpp.service.**").unwrap();

        let stanza = Stanza::parse(SERVICE_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Claimed);

        let event = sub.try_recv().unwrap().expect("should publish");
        let EventPayload::ServiceRequested { room, action, metadata } = event.payload else {
            panic!("expected service payload");
        };
        assert_eq!(room, "room@muc.example.com");
        assert_eq!(action, "recording-started");
        assert_eq!(metadata.get("initiator").map(String::as_str), Some("alice"));
        assert_eq!(metadata.get("media").map(String::as_str), Some("audio"));
    }

    #[test]
    fn missing_action_is_not_claimed() {
        let (handler, bus) = setup();
        let mut sub = bus.subscribe("xmpp.**").unwrap();

        let stanza = Stanza::parse(NO_ACTION_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Continue);
        assert!(sub.try_recv().unwrap().is_none());
    }
}

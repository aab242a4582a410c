use std::sync::Arc;

use minidom::Element;
use tracing::debug;

use tern_core::event::{Channel, Event, EventBus, EventPayload, EventSource};

use crate::handler::{HandlerResult, StanzaHandler};
use crate::outbound::StanzaSender;
use crate::stanza::{NS_CLIENT, Stanza, StanzaKind};

pub const NS_COMMANDS: &str = "http://jabber.org/protocol/commands";

/// Ad-hoc command invocations addressed to this client.
///
/// Claims the query and initiates a single acknowledgement send; the actual
/// command side effects are whatever the notification's consumer does.
pub struct AdHocCommandHandler {
    event_bus: Arc<dyn EventBus>,
    sender: Arc<dyn StanzaSender>,
}

impl AdHocCommandHandler {
    pub fn new(event_bus: Arc<dyn EventBus>, sender: Arc<dyn StanzaSender>) -> Self {
        Self { event_bus, sender }
    }
}

impl StanzaHandler for AdHocCommandHandler {
    fn feature(&self) -> &'static str {
        "ad-hoc-commands"
    }

    fn namespaces(&self) -> &'static [&'static str] {
        &[NS_COMMANDS]
    }

    fn kind(&self) -> StanzaKind {
        StanzaKind::Query
    }

    fn handle(&self, stanza: &Stanza) -> HandlerResult {
        let Stanza::Iq(iq) = stanza else {
            return HandlerResult::Continue;
        };

        if iq.type_() != "set" {
            return HandlerResult::Continue;
        }

        let Some(command) = iq.payload_named("command", NS_COMMANDS) else {
            return HandlerResult::Continue;
        };

        let Some(node) = command.attr("node") else {
            debug!("command without node, not claiming");
            return HandlerResult::Continue;
        };

        let action = command.attr("action").unwrap_or("execute");
        let from = iq.from().unwrap_or_default().to_string();

        debug!(from = %from, node = %node, action = %action, "ad-hoc command received");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.command.received").unwrap(),
            EventSource::Xmpp,
            EventPayload::CommandReceived {
                from: from.clone(),
                node: node.to_string(),
                action: action.to_string(),
            },
        ));

        // Acknowledge the invocation; anything beyond that is for the
        // request/response layer to correlate.
        if let (Some(to), Some(id)) = (iq.from(), iq.id()) {
            let reply = Element::builder("iq", NS_CLIENT)
                .attr("type", "result")
                .attr("id", id)
                .attr("to", to)
                .append(
                    Element::builder("command", NS_COMMANDS)
                        .attr("node", node)
                        .attr("status", "completed")
                        .build(),
                )
                .build();
            if let Ok(ack) = Stanza::from_element(reply) {
                self.sender.send(ack);
            }
        }

        HandlerResult::Claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outbound::QueueSender;
    use tern_core::event::BroadcastEventBus;

    const COMMAND_XML: &[u8] = b"<iq xmlns='jabber:client' type='set' id='cmd-1' \
        from='admin@example.com/console'>\
        <command xmlns='http://jabber.org/protocol/commands' \
            node='http://jabber.org/protocol/rc#set-status' action='execute'/>\
    </iq>";

    const NO_NODE_XML: &[u8] = b"<iq xmlns='jabber:client' type='set' id='cmd-2' \
        from='admin@example.com'>\
        <command xmlns='http://jabber.org/protocol/commands'/>\
    </iq>";

    fn setup() -> (
        AdHocCommandHandler,
        Arc<BroadcastEventBus>,
        tokio::sync::mpsc::UnboundedReceiver<Stanza>,
    ) {
        let bus = Arc::new(BroadcastEventBus::default());
        let (sender, rx) = QueueSender::new();
        (
            AdHocCommandHandler::new(bus.clone(), Arc::new(sender)),
            bus,
            rx,
        )
    }

    #[test]
    fn claims_and_acknowledges_the_invocation() {
        let (handler, bus, mut rx) = setup();
        let mut sub = bus.subscribe("xmpp.command.**").unwrap();

        let stanza = Stanza::parse(COMMAND_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Claimed);

        let event = sub.try_recv().unwrap().expect("should publish");
        let EventPayload::CommandReceived { from, node, action } = event.payload else {
            panic!("expected command payload");
        };
        assert_eq!(from, "admin@example.com/console");
        assert_eq!(node, "http://jabber.org/protocol/rc#set-status");
        assert_eq!(action, "execute");

        let ack = rx.try_recv().expect("should queue an acknowledgement");
        let Stanza::Iq(iq) = ack else {
            panic!("expected iq acknowledgement");
        };
        assert_eq!(iq.type_(), "result");
        assert_eq!(iq.id(), Some("cmd-1"));
        assert_eq!(iq.to(), Some("admin@example.com/console"));
    }

    #[test]
    fn missing_node_is_not_claimed() {
        let (handler, bus, mut rx) = setup();
        let mut sub = bus.subscribe("xmpp.**").unwrap();

        let stanza = Stanza::parse(NO_NODE_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Continue);
        assert!(sub.try_recv().unwrap().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn result_iqs_are_left_for_the_response_layer() {
        let (handler, _, mut rx) = setup();

        let stanza = Stanza::parse(
            b"<iq xmlns='jabber:client' type='result' id='cmd-3' from='admin@example.com'>\
                <command xmlns='http://jabber.org/protocol/commands' node='x'/>\
            </iq>",
        )
        .unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Continue);
        assert!(rx.try_recv().is_err());
    }
}

use std::sync::Arc;

use tracing::debug;

use tern_core::event::{Channel, Event, EventBus, EventPayload, EventSource};

use crate::handler::{HandlerResult, StanzaHandler};
use crate::stanza::{Stanza, StanzaKind};

pub const NS_RPC: &str = "jabber:iq:rpc";

/// Remote procedure call queries (XML-RPC over a query unit).
pub struct RpcHandler {
    event_bus: Arc<dyn EventBus>,
}

impl RpcHandler {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self { event_bus }
    }
}

impl StanzaHandler for RpcHandler {
    fn feature(&self) -> &'static str {
        "rpc"
    }

    fn namespaces(&self) -> &'static [&'static str] {
        &[NS_RPC]
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

        let Some(query) = iq.payload_named("query", NS_RPC) else {
            return HandlerResult::Continue;
        };

        // Namespace present but no parseable call: malformed, keep the
        // stanza moving.
        let method = query
            .get_child("methodCall", NS_RPC)
            .and_then(|call| call.get_child("methodName", NS_RPC))
            .map(|name| name.text());
        let Some(method) = method.filter(|m| !m.is_empty()) else {
            debug!("rpc query without method name, not claiming");
            return HandlerResult::Continue;
        };

        let from = iq.from().unwrap_or_default().to_string();
        debug!(from = %from, method = %method, "rpc call received");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.rpc.call").unwrap(),
            EventSource::Xmpp,
            EventPayload::RpcCallReceived { from, method },
        ));

        HandlerResult::Claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::event::BroadcastEventBus;

    const RPC_XML: &[u8] = b"<iq xmlns='jabber:client' type='set' id='rpc-1' \
        from='responder@example.com/tools'>\
        <query xmlns='jabber:iq:rpc'>\
            <methodCall>\
                <methodName>examples.getStateName</methodName>\
                <params><param><value><i4>6</i4></value></param></params>\
            </methodCall>\
        </query>\
    </iq>";

    const EMPTY_QUERY_XML: &[u8] = b"<iq xmlns='jabber:client' type='set' id='rpc-2' \
        from='responder@example.com'>\
        <query xmlns='jabber:iq:rpc'/>\
    </iq>";

    fn setup() -> (RpcHandler, Arc<BroadcastEventBus>) {
        let bus = Arc::new(BroadcastEventBus::default());
        (RpcHandler::new(bus.clone()), bus)
    }

    #[test]
    fn claims_and_publishes_the_method_name() {
        let (handler, bus) = setup();
        let mut sub = bus.subscribe("xmpp.rpc.**").unwrap();

        let stanza = Stanza::parse(RPC_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Claimed);

        let event = sub.try_recv().unwrap().expect("should publish");
        let EventPayload::RpcCallReceived { from, method } = event.payload else {
            panic!("expected rpc payload");
        };
        assert_eq!(from, "responder@example.com/tools");
        assert_eq!(method, "examples.getStateName");
    }

    #[test]
    fn query_without_method_call_is_not_claimed() {
        let (handler, bus) = setup();
        let mut sub = bus.subscribe("xmpp.**").unwrap();

        let stanza = Stanza::parse(EMPTY_QUERY_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Continue);
        assert!(sub.try_recv().unwrap().is_none());
    }
}

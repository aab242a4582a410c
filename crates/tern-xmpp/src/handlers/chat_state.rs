use std::sync::Arc;

use tracing::debug;

use tern_core::event::{Channel, ChatState, Event, EventBus, EventPayload, EventSource};

use crate::handler::{HandlerResult, StanzaHandler};
use crate::stanza::{Stanza, StanzaKind};

pub const NS_CHAT_STATES: &str = "http://jabber.org/protocol/chatstates";

const STATES: [(&str, ChatState); 5] = [
    ("active", ChatState::Active),
    ("composing", ChatState::Composing),
    ("paused", ChatState::Paused),
    ("inactive", ChatState::Inactive),
    ("gone", ChatState::Gone),
];

/// Typing-notification tags on direct messages.
///
/// Always continues the chain: a chat-state tag often rides alongside a
/// body or other payloads that later handlers care about.
pub struct ChatStateHandler {
    event_bus: Arc<dyn EventBus>,
}

impl ChatStateHandler {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self { event_bus }
    }
}

impl StanzaHandler for ChatStateHandler {
    fn feature(&self) -> &'static str {
        "chat-states"
    }

    fn namespaces(&self) -> &'static [&'static str] {
        &[NS_CHAT_STATES]
    }

    fn kind(&self) -> StanzaKind {
        StanzaKind::Message
    }

    fn handle(&self, stanza: &Stanza) -> HandlerResult {
        let Stanza::Message(msg) = stanza else {
            return HandlerResult::Continue;
        };

        if msg.type_() == "groupchat" || msg.type_() == "error" {
            return HandlerResult::Continue;
        }

        let state = msg.payloads().find_map(|el| {
            STATES
                .iter()
                .find(|(name, _)| el.is(*name, NS_CHAT_STATES))
                .map(|(_, state)| *state)
        });

        let Some(state) = state else {
            return HandlerResult::Continue;
        };

        let from = msg.from().unwrap_or_default().to_string();
        debug!(from = %from, state = ?state, "chat state received");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.chatstate.received").unwrap(),
            EventSource::Xmpp,
            EventPayload::ChatStateReceived { from, state },
        ));

        HandlerResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::event::BroadcastEventBus;

    const COMPOSING_XML: &[u8] = b"<message xmlns='jabber:client' type='chat' \
        from='alice@example.com' to='bob@example.com'>\
        <composing xmlns='http://jabber.org/protocol/chatstates'/>\
    </message>";

    const GROUPCHAT_XML: &[u8] = b"<message xmlns='jabber:client' type='groupchat' \
        from='room@muc.example.com/alice'>\
        <composing xmlns='http://jabber.org/protocol/chatstates'/>\
    </message>";

    const PLAIN_XML: &[u8] = b"<message xmlns='jabber:client' type='chat' \
        from='alice@example.com'><body>hi</body></message>";

    fn setup() -> (ChatStateHandler, Arc<BroadcastEventBus>) {
        let bus = Arc::new(BroadcastEventBus::default());
        (ChatStateHandler::new(bus.clone()), bus)
    }

    #[test]
    fn publishes_composing_and_continues() {
        let (handler, bus) = setup();
        let mut sub = bus.subscribe("xmpp.chatstate.**").unwrap();

        let stanza = Stanza::parse(COMPOSING_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Continue);

        let event = sub.try_recv().unwrap().expect("should publish");
        assert!(matches!(
            event.payload,
            EventPayload::ChatStateReceived {
                state: ChatState::Composing,
                ..
            }
        ));
    }

    #[test]
    fn ignores_groupchat_chat_states() {
        let (handler, bus) = setup();
        let mut sub = bus.subscribe("xmpp.**").unwrap();

        let stanza = Stanza::parse(GROUPCHAT_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Continue);
        assert!(sub.try_recv().unwrap().is_none());
    }

    #[test]
    fn ignores_messages_without_a_state_tag() {
        let (handler, bus) = setup();
        let mut sub = bus.subscribe("xmpp.**").unwrap();

        let stanza = Stanza::parse(PLAIN_XML).unwrap();
        assert_eq!(handler.handle(&stanza), HandlerResult::Continue);
        assert!(sub.try_recv().unwrap().is_none());
    }
}

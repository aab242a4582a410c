use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, trace};

use tern_core::event::{Channel, Event, EventBus, EventPayload, EventSource};

use crate::handler::HandlerResult;
use crate::registry::ExtensionRegistry;
use crate::stanza::Stanza;

/// Routes every inbound stanza through the ordered handler chain.
///
/// Called from the single inbound-dispatch thread: one stanza is processed
/// start-to-finish before the next, which is what gives handlers their
/// no-concurrent-invocation guarantee.
pub struct Dispatcher {
    registry: ExtensionRegistry,
    event_bus: Arc<dyn EventBus>,
}

impl Dispatcher {
    pub fn new(registry: ExtensionRegistry, event_bus: Arc<dyn EventBus>) -> Self {
        Self { registry, event_bus }
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    /// Offer the stanza to handlers strictly in registration order and stop
    /// at the first claim. Returns whether any handler claimed it; an
    /// unclaimed stanza is forwarded to the fallback sink exactly once.
    ///
    /// A handler that panics is logged under its feature identifier,
    /// treated as not-claiming, and the chain continues: one malfunctioning
    /// feature must never stop message flow for the rest.
    pub fn dispatch(&self, stanza: &Stanza) -> bool {
        for handler in self.registry.handlers() {
            if handler.kind() != stanza.kind() {
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(stanza))) {
                Ok(HandlerResult::Claimed) => {
                    trace!(feature = handler.feature(), "stanza claimed");
                    return true;
                }
                Ok(HandlerResult::Continue) => {}
                Err(_) => {
                    error!(
                        feature = handler.feature(),
                        "handler panicked during dispatch, continuing chain"
                    );
                }
            }
        }

        debug!(kind = ?stanza.kind(), "stanza unclaimed, forwarding to fallback");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.stanza.unhandled").unwrap(),
            EventSource::Xmpp,
            EventPayload::StanzaUnhandled {
                stanza: stanza.to_xml().unwrap_or_default(),
            },
        ));
        false
    }
}

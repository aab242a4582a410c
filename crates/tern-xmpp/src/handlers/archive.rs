use std::sync::Arc;

use tracing::debug;

use tern_core::event::{Channel, Event, EventBus, EventPayload, EventSource};

use crate::handler::{HandlerResult, StanzaHandler};
use crate::stanza::{Stanza, StanzaKind};

pub const NS_ARCHIVE: &str = "urn:xmpp:mam:2";

/// Archive query results forwarded by the server.
///
/// Claims the stanza: an archive result wraps a historical message that must
/// not be re-processed as live traffic by the rest of the chain.
pub struct ArchiveHandler {
    event_bus: Arc<dyn EventBus>,
}

impl ArchiveHandler {
    pub fn new(event_bus: Arc<dyn EventBus>) -> Self {
        Self { event_bus }
    }
}

impl StanzaHandler for ArchiveHandler {
    fn feature(&self) -> &'static str {
        "archive"
    }

    fn namespaces(&self) -> &'static [&'static str] {
        &[NS_ARCHIVE]
    }

    fn kind(&self) -> StanzaKind {
        StanzaKind::Message
    }

    fn handle(&self, stanza: &Stanza) -> HandlerResult {
        let Stanza::Message(msg) = stanza else {
            return HandlerResult::Continue;
        };

        let Some(result) = msg.payload_named("result", NS_ARCHIVE) else {
            return HandlerResult::Continue;
        };

        // A result without an archive id is malformed; leave it to the rest
        // of the chain instead of faulting.
        let Some(archive_id) = result.attr("id") else {
            debug!("archive result without id, not claiming");
            return HandlerResult::Continue;
        };

        let query_id = result.attr("queryid").map(String::from);
        debug!(archive_id = %archive_id, ?query_id, "archive result received");
        let _ = self.event_bus.publish(Event::new(
            Channel::new("xmpp.archive.result").unwrap(),
            EventSource::Xmpp,
            EventPayload::ArchiveResultReceived {
                query_id,
                archive_id: archive_id.to_string(),
            },
        ));

        HandlerResult::Claimed
    }
}

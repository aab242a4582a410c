use crate::stanza::{Stanza, StanzaKind};

/// What a handler decided about a stanza it was offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResult {
    /// The handler owns this stanza; later handlers never see it.
    Claimed,
    /// Keep offering the stanza down the chain. A handler may have emitted
    /// a notification and still continue, e.g. typing indicators that ride
    /// alongside payloads other features care about.
    Continue,
}

/// One protocol extension's inspection and reaction logic.
///
/// Implementations are registered once at client construction and are never
/// mutated afterwards. `handle` runs on the single inbound-dispatch thread,
/// so no handler is ever invoked concurrently with itself; it must restrict
/// itself to structural inspection plus at most one notification and/or one
/// outbound send initiation, and must never block on a round-trip reply;
/// response correlation belongs to the request/response layer.
pub trait StanzaHandler: Send + Sync + 'static {
    /// Unique feature identifier, used for registration conflicts and fault
    /// references.
    fn feature(&self) -> &'static str;

    /// Namespaces advertised to peers for capability discovery. Routing
    /// ignores these entirely; overlapping namespaces across handlers are
    /// legal and resolved by registration order.
    fn namespaces(&self) -> &'static [&'static str];

    /// The stanza kind this handler inspects.
    fn kind(&self) -> StanzaKind;

    fn handle(&self, stanza: &Stanza) -> HandlerResult;
}

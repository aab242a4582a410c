use crate::error::RegistryError;
use crate::handler::StanzaHandler;

/// The ordered set of installed feature handlers.
///
/// Registration order IS dispatch order: the first-registered handler is the
/// first offered every stanza. The handler set is fixed for a connection's
/// lifetime, so dispatch reads it without synchronization.
#[derive(Default)]
pub struct ExtensionRegistry {
    handlers: Vec<Box<dyn StanzaHandler>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to the chain. Rejects a feature identifier that is
    /// already registered, which would double-count the feature in
    /// capability discovery.
    pub fn register(&mut self, handler: Box<dyn StanzaHandler>) -> Result<(), RegistryError> {
        if self.handlers.iter().any(|h| h.feature() == handler.feature()) {
            return Err(RegistryError::DuplicateFeature(handler.feature().to_string()));
        }
        self.handlers.push(handler);
        Ok(())
    }

    /// Union of all handlers' declared namespaces, in registration order,
    /// for capability-discovery reporting. Has no effect on routing.
    pub fn namespaces(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for handler in &self.handlers {
            for ns in handler.namespaces() {
                if !seen.contains(ns) {
                    seen.push(ns);
                }
            }
        }
        seen
    }

    pub fn features(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.feature()).collect()
    }

    pub(crate) fn handlers(&self) -> &[Box<dyn StanzaHandler>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

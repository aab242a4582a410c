pub mod bridge;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod handlers;
pub mod outbound;
pub mod registry;
pub mod stanza;

pub use bridge::SyncBridge;
pub use dispatcher::Dispatcher;
pub use error::{BridgeError, RegistryError, SendError, StanzaError};
pub use handler::{HandlerResult, StanzaHandler};
pub use outbound::{QueueSender, StanzaSender};
pub use registry::ExtensionRegistry;
pub use stanza::{Stanza, StanzaKind};

mod adhoc;
mod archive;
mod chat_state;
mod rainbow;
mod room_status;
mod rpc;
mod service;

pub use adhoc::{AdHocCommandHandler, NS_COMMANDS};
pub use archive::{ArchiveHandler, NS_ARCHIVE};
pub use chat_state::{ChatStateHandler, NS_CHAT_STATES};
pub use rainbow::{NS_RAINBOW, RainbowMessageHandler};
pub use room_status::{RoomStatusHandler, NS_MUC_USER};
pub use rpc::{NS_RPC, RpcHandler};
pub use service::{NS_SERVICE, ServiceRequestHandler};

/// Strip the resource part of a JID.
pub(crate) fn bare_jid(jid: &str) -> &str {
    match jid.find('/') {
        Some(pos) => &jid[..pos],
        None => jid,
    }
}

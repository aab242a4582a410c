use std::str::FromStr;

use minidom::Element;

use crate::error::StanzaError;

pub const NS_CLIENT: &str = "jabber:client";

/// The two stanza kinds the dispatcher routes. Anything else arriving from
/// the decoder matches zero handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StanzaKind {
    /// A request/query unit (iq).
    Query,
    /// A message unit.
    Message,
}

/// A decoded inbound (or outbound) protocol object.
///
/// The body stays an opaque element tree; handlers inspect it through
/// structural lookup and never assume exclusive ownership, since an
/// unclaimed stanza is offered to later handlers as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum Stanza {
    Iq(Iq),
    Message(Message),
}

impl Stanza {
    pub fn parse(raw: &[u8]) -> Result<Self, StanzaError> {
        let xml = std::str::from_utf8(raw)
            .map_err(|error| StanzaError::ParseFailed(format!("invalid UTF-8 bytes: {error}")))?;
        let trimmed = xml.trim();
        if trimmed.is_empty() {
            return Err(StanzaError::ParseFailed("stanza payload is empty".to_string()));
        }

        let element = Element::from_str(trimmed)
            .map_err(|error| StanzaError::ParseFailed(format!("invalid stanza XML: {error}")))?;
        Self::from_element(element)
    }

    pub fn from_element(element: Element) -> Result<Self, StanzaError> {
        match element.name() {
            "iq" => Iq::from_element(element).map(Stanza::Iq),
            "message" => Ok(Stanza::Message(Message { element })),
            other => Err(StanzaError::ParseFailed(format!(
                "unsupported stanza element <{other}/>"
            ))),
        }
    }

    pub fn kind(&self) -> StanzaKind {
        match self {
            Stanza::Iq(_) => StanzaKind::Query,
            Stanza::Message(_) => StanzaKind::Message,
        }
    }

    /// Sender address, when the decoder supplied one.
    pub fn sender(&self) -> Option<&str> {
        match self {
            Stanza::Iq(iq) => iq.from(),
            Stanza::Message(msg) => msg.from(),
        }
    }

    pub fn element(&self) -> &Element {
        match self {
            Stanza::Iq(iq) => &iq.element,
            Stanza::Message(msg) => &msg.element,
        }
    }

    pub fn to_xml(&self) -> Result<String, StanzaError> {
        let mut payload = Vec::new();
        self.element()
            .write_to(&mut payload)
            .map_err(|error| StanzaError::SerializeFailed(error.to_string()))?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }
}

/// A request/query unit. The type attribute is validated at construction;
/// everything else is read lazily.
#[derive(Debug, Clone, PartialEq)]
pub struct Iq {
    element: Element,
}

impl Iq {
    fn from_element(element: Element) -> Result<Self, StanzaError> {
        match element.attr("type") {
            Some("get" | "set" | "result" | "error") => Ok(Self { element }),
            Some(other) => Err(StanzaError::ParseFailed(format!(
                "unknown iq type '{other}'"
            ))),
            None => Err(StanzaError::ParseFailed("iq without type".to_string())),
        }
    }

    pub fn from(&self) -> Option<&str> {
        self.element.attr("from")
    }

    pub fn to(&self) -> Option<&str> {
        self.element.attr("to")
    }

    pub fn id(&self) -> Option<&str> {
        self.element.attr("id")
    }

    pub fn type_(&self) -> &str {
        self.element.attr("type").unwrap_or("")
    }

    /// The query payload, normally the only child element.
    pub fn payload(&self) -> Option<&Element> {
        self.element.children().next()
    }

    pub fn payload_named(&self, name: &str, ns: &str) -> Option<&Element> {
        self.element.get_child(name, ns)
    }
}

/// A message unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    element: Element,
}

impl Message {
    pub fn from(&self) -> Option<&str> {
        self.element.attr("from")
    }

    pub fn to(&self) -> Option<&str> {
        self.element.attr("to")
    }

    pub fn id(&self) -> Option<&str> {
        self.element.attr("id")
    }

    pub fn type_(&self) -> &str {
        self.element.attr("type").unwrap_or("normal")
    }

    pub fn payloads(&self) -> impl Iterator<Item = &Element> {
        self.element.children()
    }

    pub fn payload_named(&self, name: &str, ns: &str) -> Option<&Element> {
        self.element.get_child(name, ns)
    }
}

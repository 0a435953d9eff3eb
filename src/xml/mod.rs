//! Streaming XML support for S3 response bodies.
//!
//! [`XmlReader`] turns any [`Read`] into a lazy sequence of [`XmlEvent`]s.
//! [`parse`] drives an [`EventHandler`] from the same sequence. The decoders
//! in [`decode`] are handlers for the listing and error documents S3 returns.

pub mod decode;
mod reader;

use std::{borrow::Cow, collections::HashMap, io::Read};

pub use reader::{XmlReader, parse_attributes, unescape};

use crate::error::Result;

/// One token of an XML document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlEvent {
    StartNode {
        name: String,
        attributes: HashMap<String, String>,
    },
    /// Trimmed, unescaped, never blank.
    Text { value: String },
    EndNode,
}

/// Callback surface for [`parse`].
pub trait EventHandler {
    fn start_node(&mut self, name: &str, attributes: &HashMap<String, String>) -> Result<()>;

    fn text(&mut self, value: &str) -> Result<()>;

    fn end_node(&mut self) -> Result<()>;
}

impl<H: EventHandler + ?Sized> EventHandler for &mut H {
    fn start_node(&mut self, name: &str, attributes: &HashMap<String, String>) -> Result<()> {
        (**self).start_node(name, attributes)
    }

    fn text(&mut self, value: &str) -> Result<()> {
        (**self).text(value)
    }

    fn end_node(&mut self) -> Result<()> {
        (**self).end_node()
    }
}

/// Feeds every event to both handlers, first `A` then `B`.
impl<A: EventHandler, B: EventHandler> EventHandler for (A, B) {
    fn start_node(&mut self, name: &str, attributes: &HashMap<String, String>) -> Result<()> {
        self.0.start_node(name, attributes)?;
        self.1.start_node(name, attributes)
    }

    fn text(&mut self, value: &str) -> Result<()> {
        self.0.text(value)?;
        self.1.text(value)
    }

    fn end_node(&mut self) -> Result<()> {
        self.0.end_node()?;
        self.1.end_node()
    }
}

/// Reads `input` to the end, dispatching each event to `handler`.
///
/// The first reader or handler error stops parsing and is returned.
pub fn parse<R, H>(input: R, handler: &mut H) -> Result<()>
where
    R: Read,
    H: EventHandler + ?Sized,
{
    for event in XmlReader::new(input) {
        match event? {
            XmlEvent::StartNode { name, attributes } => handler.start_node(&name, &attributes)?,
            XmlEvent::Text { value } => handler.text(&value)?,
            XmlEvent::EndNode => handler.end_node()?,
        }
    }
    Ok(())
}

/// Escapes the five predefined entities.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

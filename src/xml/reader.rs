use std::{
    borrow::Cow,
    collections::{HashMap, VecDeque},
    io::{self, BufReader, Read},
};

use super::XmlEvent;
use crate::error::{Error, Result};

/// Forward-only tokenizer producing [`XmlEvent`]s from a byte stream.
///
/// The reader understands the subset of XML that S3 listings and error
/// bodies use: elements, attributes, character entities, comments and
/// declarations. Namespaces are left in element names untouched. After the
/// first error the iterator is fused.
pub struct XmlReader<R: Read> {
    input: io::Bytes<BufReader<R>>,
    pending: VecDeque<XmlEvent>,
    text: Vec<u8>,
    done: bool,
}

impl<R: Read> XmlReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input: BufReader::new(input).bytes(),
            pending: VecDeque::new(),
            text: Vec::new(),
            done: false,
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        match self.input.next() {
            None => Ok(None),
            Some(Ok(b)) => Ok(Some(b)),
            Some(Err(e)) => Err(Error::decode("failed to read XML input", Some(Box::new(e)))),
        }
    }

    /// Reads up to (and consumes) `end`. `None` means the input ran out first.
    fn read_until(&mut self, end: u8) -> Result<Option<Vec<u8>>> {
        let mut out = Vec::new();
        while let Some(b) = self.next_byte()? {
            if b == end {
                return Ok(Some(out));
            }
            out.push(b);
        }
        Ok(None)
    }

    fn skip_comment(&mut self) -> Result<()> {
        let mut window = [0u8; 2];
        while let Some(b) = self.next_byte()? {
            if b == b'>' && window == *b"--" {
                return Ok(());
            }
            window = [window[1], b];
        }
        Err(Error::decode("unterminated comment", None))
    }

    fn flush_text(&mut self) -> Result<()> {
        let raw = std::mem::take(&mut self.text);
        let text = utf8(raw)?;
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.pending.push_back(XmlEvent::Text {
                value: unescape(trimmed).into_owned(),
            });
        }
        Ok(())
    }

    fn read_tag(&mut self) -> Result<()> {
        let raw = self
            .read_until(b'>')?
            .ok_or_else(|| Error::decode("unclosed tag", None))?;
        let body = utf8(raw)?;
        let body = body.trim();

        if body.is_empty() {
            return Err(Error::decode("empty tag", None));
        }

        if let Some(rest) = body.strip_prefix("!--") {
            if rest.len() < 2 || !rest.ends_with("--") {
                self.skip_comment()?;
            }
            return Ok(());
        }

        if body.starts_with('!') || body.starts_with('?') {
            return Ok(());
        }

        if body.starts_with('/') {
            self.pending.push_back(XmlEvent::EndNode);
            return Ok(());
        }

        let (body, self_closing) = match body.strip_suffix('/') {
            Some(inner) => (inner, true),
            None => (body, false),
        };

        let name_end = body
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(body.len());
        let name = &body[..name_end];
        if name.is_empty() {
            return Err(Error::decode(format!("invalid tag <{body}>"), None));
        }

        self.pending.push_back(XmlEvent::StartNode {
            name: name.to_string(),
            attributes: parse_attributes(&body[name_end..]),
        });
        if self_closing {
            self.pending.push_back(XmlEvent::EndNode);
        }
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        while self.pending.is_empty() {
            match self.next_byte()? {
                None => {
                    self.done = true;
                    return self.flush_text();
                }
                Some(b'<') => {
                    self.flush_text()?;
                    self.read_tag()?;
                }
                Some(b) => self.text.push(b),
            }
        }
        Ok(())
    }
}

impl<R: Read> Iterator for XmlReader<R> {
    type Item = Result<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.pop_front() {
            return Some(Ok(event));
        }
        if self.done {
            return None;
        }

        match self.advance() {
            Ok(()) => self.pending.pop_front().map(Ok),
            Err(e) => {
                self.done = true;
                self.pending.clear();
                Some(Err(e))
            }
        }
    }
}

fn utf8(raw: Vec<u8>) -> Result<String> {
    String::from_utf8(raw).map_err(|e| Error::decode("XML input is not valid UTF-8", Some(Box::new(e))))
}

/// Replaces the predefined entities and numeric character references.
/// Anything else starting with `&` is kept as written.
pub fn unescape(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let Some(semi) = rest.find(';') else {
            break;
        };
        match decode_entity(&rest[1..semi]) {
            Some(c) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Parses `name="value"`, `name='value'` and `name=value` pairs.
/// A name without `=` maps to an empty value.
pub fn parse_attributes(input: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let name_end = rest
            .find(|c: char| c == '=' || c.is_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let Some(after_eq) = rest.strip_prefix('=') else {
            out.insert(name.to_string(), String::new());
            continue;
        };
        let after_eq = after_eq.trim_start();

        let (value, remainder) = match after_eq.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &after_eq[1..];
                match inner.find(quote) {
                    Some(end) => (&inner[..end], &inner[end + 1..]),
                    None => (inner, ""),
                }
            }
            _ => {
                let end = after_eq
                    .find(char::is_whitespace)
                    .unwrap_or(after_eq.len());
                (&after_eq[..end], &after_eq[end..])
            }
        };

        if !name.is_empty() {
            out.insert(name.to_string(), unescape(value.trim()).into_owned());
        }
        rest = remainder.trim_start();
    }

    out
}

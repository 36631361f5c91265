// File: src/dix.rs
//! Reader for Apertium `.dix` dictionaries.
//!
//! Only the structure used by expansion and counting is kept: symbol
//! definitions, paradigms, sections and their entries. Blanks, joins and
//! groups mark an entry as multiword; `<re>` content is skipped.

use crate::core::types::{Dictionary, Entry, Node, Paradigm, Side};
use crate::error::{AnalysisError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

const DEFAULT_SECTION: &str = "main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SideKind {
    Left,
    Right,
    Identity,
}

#[derive(Default)]
struct Builder {
    dictionary: Dictionary,
    paradigm: Option<Paradigm>,
    section: Option<String>,
    entry: Option<Entry>,
    side: Option<(SideKind, Side)>,
    left: Option<Side>,
    in_regex: bool,
}

impl Builder {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<()> {
        match e.name().as_ref() {
            b"sdef" => {
                let name = required_attribute(e, "n")?;
                self.dictionary.symbols.push(name);
            }
            b"pardef" => {
                let name = required_attribute(e, "n")?;
                self.paradigm = Some(Paradigm::new(name, Vec::new()));
            }
            b"section" => {
                let id = attribute(e, "id")?.unwrap_or_else(|| DEFAULT_SECTION.to_string());
                self.section = Some(id);
            }
            b"e" => {
                if self.entry.is_some() {
                    return Err(AnalysisError::MalformedDictionary("nested <e>".into()));
                }
                self.entry = Some(Entry {
                    lemma: attribute(e, "lm")?,
                    restriction: attribute(e, "r")?,
                    ..Entry::default()
                });
            }
            b"l" => self.open_side(SideKind::Left)?,
            b"r" => self.open_side(SideKind::Right)?,
            b"i" => self.open_side(SideKind::Identity)?,
            b"s" => {
                let tag = required_attribute(e, "n")?;
                match self.side.as_mut() {
                    Some((_, side)) => side.tags.push(tag),
                    None => tracing::debug!(tag = %tag, "symbol outside of a side ignored"),
                }
            }
            b"par" => {
                let name = required_attribute(e, "n")?;
                self.entry_mut("par")?.children.push(Node::ParadigmRef(name));
            }
            b"b" => {
                self.push_text(" ");
                self.mark_multiword();
            }
            b"j" => {
                self.push_text("+");
                self.mark_multiword();
            }
            b"g" => self.mark_multiword(),
            b"re" => self.in_regex = true,
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"pardef" => {
                if let Some(paradigm) = self.paradigm.take() {
                    self.dictionary.add_paradigm(paradigm);
                }
            }
            b"section" => self.section = None,
            b"e" => self.close_entry()?,
            b"l" | b"r" | b"i" => self.close_side()?,
            b"re" => self.in_regex = false,
            _ => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.in_regex {
            return;
        }
        if let Some((_, side)) = self.side.as_mut() {
            side.text.push_str(text);
            return;
        }
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if let Some(entry) = self.entry.as_mut() {
            entry.children.push(Node::Text(text.to_string()));
        }
    }

    fn entry_mut(&mut self, element: &str) -> Result<&mut Entry> {
        self.entry
            .as_mut()
            .ok_or_else(|| AnalysisError::MalformedDictionary(format!("<{}> outside of <e>", element)))
    }

    fn open_side(&mut self, kind: SideKind) -> Result<()> {
        self.entry_mut("side")?;
        if self.side.is_some() {
            return Err(AnalysisError::MalformedDictionary("nested <l>, <r> or <i>".into()));
        }
        self.side = Some((kind, Side::default()));
        Ok(())
    }

    fn close_side(&mut self) -> Result<()> {
        let Some((kind, side)) = self.side.take() else {
            return Ok(());
        };
        match kind {
            SideKind::Left => self.left = Some(side),
            SideKind::Right => {
                let left = self.left.take().unwrap_or_default();
                self.entry_mut("r")?.children.push(Node::Pair { left, right: side });
            }
            SideKind::Identity => self.entry_mut("i")?.children.push(Node::Identity(side)),
        }
        Ok(())
    }

    fn close_entry(&mut self) -> Result<()> {
        let Some(entry) = self.entry.take() else {
            return Ok(());
        };
        if let Some(left) = self.left.take() {
            return Err(AnalysisError::MalformedDictionary(format!(
                "<l>{}</l> without a matching <r>",
                left.text
            )));
        }
        if let Some(paradigm) = self.paradigm.as_mut() {
            paradigm.rules.push(entry);
        } else {
            let section = self.section.as_deref().unwrap_or(DEFAULT_SECTION);
            self.dictionary.add_entry(section, entry);
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        if let Some((_, side)) = self.side.as_mut() {
            side.text.push_str(text);
        }
    }

    fn mark_multiword(&mut self) {
        if let Some(entry) = self.entry.as_mut() {
            entry.multiword = true;
        }
    }
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match e.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn required_attribute(e: &BytesStart<'_>, name: &str) -> Result<String> {
    attribute(e, name)?.ok_or_else(|| {
        AnalysisError::MalformedDictionary(format!(
            "<{}> without '{}' attribute",
            String::from_utf8_lossy(e.name().as_ref()),
            name
        ))
    })
}

/// Parses a whole `.dix` document.
pub fn parse_str(xml: &str) -> Result<Dictionary> {
    let mut reader = Reader::from_str(xml);
    let mut builder = Builder::default();

    loop {
        match reader.read_event()? {
            Event::Start(e) => builder.start(&e)?,
            Event::Empty(e) => {
                builder.start(&e)?;
                builder.end(e.name().as_ref())?;
            }
            Event::End(e) => builder.end(e.name().as_ref())?,
            Event::Text(t) => builder.text(&t.unescape()?),
            Event::CData(t) => builder.text(&String::from_utf8_lossy(&t)),
            Event::Eof => break,
            _ => {}
        }
    }

    let dictionary = builder.dictionary;
    tracing::debug!(
        symbols = dictionary.symbols.len(),
        paradigms = dictionary.paradigms.len(),
        entries = dictionary.entry_count(),
        "dictionary parsed"
    );
    Ok(dictionary)
}

/// Reads and parses a `.dix` file.
pub fn read_file(path: &Path) -> Result<Dictionary> {
    let xml = fs::read_to_string(path)?;
    let dictionary = parse_str(&xml)?;
    tracing::info!(
        path = %path.display(),
        paradigms = dictionary.paradigms.len(),
        entries = dictionary.entry_count(),
        "dictionary loaded"
    );
    Ok(dictionary)
}

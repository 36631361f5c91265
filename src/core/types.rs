// src/core/types.rs
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of a paradigm definition, e.g. `parl/ar__vblex`.
pub type ParadigmName = String;

/// One face of a rule: literal text followed by grammatical tags.
/// `<l>ar</l>` is `Side { text: "ar", tags: [] }`,
/// `<r>ar<s n="vblex"/><s n="inf"/></r>` is `Side { text: "ar", tags: ["vblex", "inf"] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Side {
    pub text: String,
    pub tags: Vec<String>,
}

impl Side {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), tags: Vec::new() }
    }

    pub fn with_tags<I, S>(text: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Renders the tags as `<tag1><tag2>...`, in order.
    pub fn tag_markers(&self) -> String {
        let mut out = String::new();
        for tag in &self.tags {
            out.push('<');
            out.push_str(tag);
            out.push('>');
        }
        out
    }

    pub fn first_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// A child of an entry or of a paradigm rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// Text identical on both sides (`<i>`).
    Identity(Side),
    /// Analysis (left) and generation (right) faces (`<p><l/><r/></p>`).
    Pair { left: Side, right: Side },
    /// Reference to a paradigm definition (`<par n="..."/>`).
    ParadigmRef(ParadigmName),
    /// Loose text directly under the entry.
    Text(String),
}

impl Node {
    pub fn pair(left: Side, right: Side) -> Self {
        Node::Pair { left, right }
    }

    pub fn paradigm(name: impl Into<String>) -> Self {
        Node::ParadigmRef(name.into())
    }
}

/// A dictionary entry (`<e>`), also used for every alternative rule of a paradigm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub children: Vec<Node>,
    /// `lm` attribute.
    pub lemma: Option<String>,
    /// Direction restriction label (`r="LR"` / `r="RL"`).
    pub restriction: Option<String>,
    /// Set when the entry contains blanks, joins or groups.
    pub multiword: bool,
}

impl Entry {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children, ..Self::default() }
    }

    pub fn with_restriction(mut self, label: impl Into<String>) -> Self {
        self.restriction = Some(label.into());
        self
    }

    /// Names of the paradigms this entry references directly, in order.
    pub fn paradigm_refs(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|node| match node {
            Node::ParadigmRef(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Pair rules directly under this entry.
    pub fn pairs(&self) -> impl Iterator<Item = (&Side, &Side)> {
        self.children.iter().filter_map(|node| match node {
            Node::Pair { left, right } => Some((left, right)),
            _ => None,
        })
    }
}

/// A named list of alternative rules (`<pardef>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paradigm {
    pub name: ParadigmName,
    pub rules: Vec<Entry>,
}

impl Paradigm {
    pub fn new(name: impl Into<String>, rules: Vec<Entry>) -> Self {
        Self { name: name.into(), rules }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub entries: Vec<Entry>,
}

/// An in-memory dictionary: symbol definitions, the paradigm table and the
/// entry sections. Read-only to expansion and counting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dictionary {
    pub symbols: Vec<String>,
    pub paradigms: HashMap<ParadigmName, Paradigm>,
    pub sections: Vec<Section>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_paradigm(&mut self, paradigm: Paradigm) {
        self.paradigms.insert(paradigm.name.clone(), paradigm);
    }

    /// Appends an entry to the section `id`, creating the section if needed.
    pub fn add_entry(&mut self, section_id: &str, entry: Entry) {
        if let Some(section) = self.sections.iter_mut().find(|s| s.id == section_id) {
            section.entries.push(entry);
        } else {
            self.sections.push(Section {
                id: section_id.to_string(),
                entries: vec![entry],
            });
        }
    }

    pub fn paradigm(&self, name: &str) -> Option<&Paradigm> {
        self.paradigms.get(name)
    }

    /// All entries of all sections, in document order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections.iter().flat_map(|section| section.entries.iter())
    }

    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Fails on the first paradigm that can reach itself through paradigm
    /// references. Expansion does not guard against cycles, so callers run
    /// this before expanding untrusted dictionaries.
    pub fn check_acyclic(&self) -> Result<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit<'a>(
            dic: &'a Dictionary,
            name: &'a str,
            marks: &mut HashMap<&'a str, Mark>,
        ) -> Result<()> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => return Err(AnalysisError::CyclicParadigm(name.to_string())),
                None => {}
            }
            // Dangling references expand to nothing; they cannot loop.
            let Some(paradigm) = dic.paradigms.get(name) else {
                return Ok(());
            };
            marks.insert(name, Mark::Visiting);
            for rule in &paradigm.rules {
                for next in rule.paradigm_refs() {
                    visit(dic, next, marks)?;
                }
            }
            marks.insert(name, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut names: Vec<&str> = self.paradigms.keys().map(String::as_str).collect();
        names.sort_unstable();
        for name in names {
            visit(self, name, &mut marks)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(children: Vec<Node>) -> Entry {
        Entry::new(children)
    }

    #[test]
    fn tag_markers_render_in_order() {
        let side = Side::with_tags("ar", ["vblex", "inf"]);
        assert_eq!(side.tag_markers(), "<vblex><inf>");
        assert_eq!(Side::new("x").tag_markers(), "");
    }

    #[test]
    fn add_entry_groups_by_section() {
        let mut dic = Dictionary::new();
        dic.add_entry("main", Entry::default());
        dic.add_entry("main", Entry::default());
        dic.add_entry("extra", Entry::default());
        assert_eq!(dic.sections.len(), 2);
        assert_eq!(dic.entry_count(), 3);
    }

    #[test]
    fn acyclic_chain_passes() {
        let mut dic = Dictionary::new();
        dic.add_paradigm(Paradigm::new("a", vec![rule(vec![Node::paradigm("b")])]));
        dic.add_paradigm(Paradigm::new("b", vec![rule(vec![Node::paradigm("missing")])]));
        assert!(dic.check_acyclic().is_ok());
    }

    #[test]
    fn cycle_is_reported() {
        let mut dic = Dictionary::new();
        dic.add_paradigm(Paradigm::new("a", vec![rule(vec![Node::paradigm("b")])]));
        dic.add_paradigm(Paradigm::new("b", vec![rule(vec![Node::paradigm("a")])]));
        match dic.check_acyclic() {
            Err(AnalysisError::CyclicParadigm(name)) => assert!(name == "a" || name == "b"),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut dic = Dictionary::new();
        dic.add_paradigm(Paradigm::new("loop", vec![rule(vec![Node::paradigm("loop")])]));
        assert!(matches!(dic.check_acyclic(), Err(AnalysisError::CyclicParadigm(_))));
    }
}

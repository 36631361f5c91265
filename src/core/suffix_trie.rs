// --- File: src/core/suffix_trie.rs
use crate::config::ClosedCategories;
use crate::core::candidate::Candidate;
use crate::core::expansion::expand_paradigm;
use crate::core::types::{Dictionary, ParadigmName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Serialize, Deserialize)]
struct SuffixNode {
    children: HashMap<char, usize>,
    /// Paradigms having the suffix spelled by the path from the root.
    paradigms: Vec<ParadigmName>,
}

impl SuffixNode {
    fn new() -> Self {
        Self { children: HashMap::new(), paradigms: Vec::new() }
    }
}

/// A trie of reversed analysis suffixes, one per suffix each paradigm can
/// append to a stem. Walking a surface form backwards yields every
/// (stem, paradigm) split able to produce it.
#[derive(Clone, Serialize, Deserialize)]
pub struct SuffixIndex {
    nodes: Vec<SuffixNode>,
}

impl SuffixIndex {
    pub fn new() -> Self {
        Self { nodes: vec![SuffixNode::new()] }
    }

    /// Indexes every paradigm of `dic`, skipping closed-category paradigms
    /// when `closed` is given.
    pub fn build(dic: &Dictionary, closed: Option<&ClosedCategories>) -> Self {
        let mut index = Self::new();
        let mut names: Vec<&ParadigmName> = dic.paradigms.keys().collect();
        names.sort();
        let mut skipped = 0usize;
        for name in names {
            if let (Some(closed), Some(paradigm)) = (closed, dic.paradigm(name)) {
                if closed.is_closed_paradigm(paradigm) {
                    skipped += 1;
                    continue;
                }
            }
            for suffix in expand_paradigm(name, "", false, dic).unwrap_or_default() {
                index.insert(&suffix, name);
            }
        }
        tracing::debug!(nodes = index.nodes.len(), skipped, "suffix index built");
        index
    }

    /// Inserts `suffix` for `paradigm`.
    /// O(k) complexity where k is suffix length.
    pub fn insert(&mut self, suffix: &str, paradigm: &str) {
        let mut node_idx = 0;
        for c in suffix.chars().rev() {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&c) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(SuffixNode::new());
                self.nodes[node_idx].children.insert(c, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
        }
        let paradigms = &mut self.nodes[node_idx].paradigms;
        if !paradigms.iter().any(|p| p == paradigm) {
            paradigms.push(paradigm.to_string());
        }
    }

    /// All candidates whose paradigm has a suffix ending `form` with a
    /// non-empty stem left over, sorted.
    /// O(k) node visits where k is the form length.
    pub fn candidates_for(&self, form: &str) -> Vec<Candidate> {
        let mut found = BTreeSet::new();
        let mut node_idx = 0;
        self.collect(node_idx, form, &mut found);
        for (i, c) in form.char_indices().rev() {
            let Some(&next_idx) = self.nodes[node_idx].children.get(&c) else {
                break;
            };
            node_idx = next_idx;
            self.collect(node_idx, &form[..i], &mut found);
        }
        found.into_iter().collect()
    }

    fn collect(&self, node_idx: usize, stem: &str, found: &mut BTreeSet<Candidate>) {
        if stem.is_empty() {
            return;
        }
        for paradigm in &self.nodes[node_idx].paradigms {
            found.insert(Candidate::new(stem, paradigm.as_str()));
        }
    }
}

impl Default for SuffixIndex {
    fn default() -> Self {
        Self::new()
    }
}

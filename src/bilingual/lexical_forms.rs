// File: src/bilingual/lexical_forms.rs
use crate::core::expansion::extract_stem_paradigm;
use crate::core::types::{Dictionary, Entry, Node, ParadigmName};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone)]
struct LexicalInfo {
    tags: Vec<String>,
    paradigm: ParadigmName,
}

/// The stem as it appears in lemmas: the `<i>` text, or the generation side
/// of the entry's pair, which differs from the analysis side for irregular
/// stems.
fn lemma_stem(entry: &Entry) -> Option<&str> {
    entry.children.iter().find_map(|node| match node {
        Node::Identity(side) => Some(side.text.as_str()),
        Node::Pair { right, .. } => Some(right.text.as_str()),
        _ => None,
    })
}

/// Lexical forms of a monolingual dictionary: for every well-formed entry,
/// the lemma stem joined to the generation text of each pair of its
/// paradigm's rules, with that pair's tags. Bilingual links are resolved
/// against it.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    forms: HashMap<String, Vec<LexicalInfo>>,
    wildcards: HashSet<String>,
}

impl LexicalIndex {
    pub fn build(dic: &Dictionary, wildcards: HashSet<String>) -> Self {
        let mut forms: HashMap<String, Vec<LexicalInfo>> = HashMap::new();
        let mut skipped = 0usize;
        for entry in dic.entries().filter(|e| !e.multiword) {
            let Some(candidate) = extract_stem_paradigm(entry) else {
                skipped += 1;
                continue;
            };
            let Some(paradigm) = dic.paradigm(&candidate.paradigm) else {
                tracing::warn!(paradigm = %candidate.paradigm, stem = %candidate.stem, "entry references an unknown paradigm");
                continue;
            };
            let stem = lemma_stem(entry).unwrap_or(&candidate.stem);
            for (_, right) in paradigm.rules.iter().flat_map(|rule| rule.pairs()) {
                forms.entry(format!("{}{}", stem, right.text)).or_default().push(LexicalInfo {
                    tags: right.tags.clone(),
                    paradigm: candidate.paradigm.clone(),
                });
            }
        }
        tracing::debug!(forms = forms.len(), skipped, "lexical index built");
        Self { forms, wildcards }
    }

    /// Paradigms of the entries that generate `stem` with tags starting with
    /// `tags`. A wildcard tag in `tags` matches anything. Empty when `tags`
    /// is empty or nothing matches.
    pub fn paradigms_for(&self, stem: &str, tags: &[String]) -> BTreeSet<ParadigmName> {
        let mut found = BTreeSet::new();
        if tags.is_empty() {
            return found;
        }
        let Some(infos) = self.forms.get(stem) else {
            return found;
        };
        for info in infos {
            if info.tags.len() < tags.len() {
                continue;
            }
            let matches = tags
                .iter()
                .zip(&info.tags)
                .all(|(want, have)| self.wildcards.contains(want) || want == have);
            if matches {
                found.insert(info.paradigm.clone());
            }
        }
        found
    }

}

// src/lib.rs
//! Analysis of Apertium-style morphological dictionaries: paradigm
//! expansion, bilingual paradigm relationships, candidate ranking and the
//! interactive review that narrows candidates down to one paradigm.

pub mod bilingual;
pub mod config;
pub mod core;
pub mod dix;
pub mod error;
pub mod persistence;
pub mod review;

pub use crate::config::{AnalyserConfig, ClosedCategories};
pub use crate::core::candidate::{Candidate, RankedCandidate};
pub use crate::core::cooccurrence::CoOccurrenceTable;
pub use crate::core::expansion::{expand_to_forms, expand_to_pairs, extract_stem_paradigm};
pub use crate::core::ranker::Ranker;
pub use crate::core::suffix_trie::SuffixIndex;
pub use crate::core::types::{Dictionary, Entry, Node, Paradigm, Side};
pub use crate::error::{AnalysisError, Result};
pub use crate::review::{Decision, ReviewSession};

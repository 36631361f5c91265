// src/core/mod.rs

pub mod candidate;
pub mod cooccurrence;
pub mod expansion;
pub mod ranker;
pub mod suffix_trie;
pub mod types;

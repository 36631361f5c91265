// src/bilingual/mod.rs

pub mod lexical_forms;
pub mod relationship;

pub use lexical_forms::LexicalIndex;
pub use relationship::{
    build_category_relationship, build_paradigm_relationship, CategoryRelationship,
    ParadigmRelationship, Relationship, RelationshipOptions,
};

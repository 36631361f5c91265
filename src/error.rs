// File: src/error.rs
use thiserror::Error;

/// Errors raised by the analyser outside the pure expansion/counting core.
///
/// Expected "no result" outcomes (an ambiguous entry, an unresolved bilingual
/// link) are `Option`s, never errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("malformed dictionary: {0}")]
    MalformedDictionary(String),
    #[error("malformed corpus: {0}")]
    MalformedCorpus(String),
    #[error("unknown paradigm: {0}")]
    UnknownParadigm(String),
    #[error("paradigm '{0}' references itself through its paradigm chain")]
    CyclicParadigm(String),
    #[error("binary serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persist error: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

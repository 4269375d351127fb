//! Text processing and analysis module

pub mod analyzer;
pub mod document;
pub mod embedding_manager;
pub mod embeddings;
pub mod gap_analyzer;
pub mod scorer;
pub mod text_processor;

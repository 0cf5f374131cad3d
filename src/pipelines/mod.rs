//! Render pipelines. Chunk batches all share the one pipeline in [`basic`].

pub mod basic;

//! Index builder collaborator: runs `cindex` and reports progress.

pub mod build;

pub use build::{IndexBuilder, IndexError, IndexListener, Indexer, SpinnerListener};

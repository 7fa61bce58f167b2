//! # YACS - Yet Another Code Search
//!
//! Editor-side plumbing for an indexed code search tool pair: `cindex` builds
//! a trigram index, `csearch` searches it. The interesting part is the pair of
//! small languages on either side of `csearch`:
//!
//! - the query a user types into a search prompt, parsed into a [`Query`] and
//!   serialized into `csearch` arguments
//! - the `filename:linenumber:line` text `csearch -n` prints, parsed into
//!   per-file [`FileMatchGroup`]s
//!
//! ## Modules
//!
//! - [`lexer`] - Cursor-based scanner driven by per-grammar state enums
//! - [`query`] - Query language lexer states, [`Query`] model and parser
//! - [`results`] - Search output lexer states, match groups and parser
//! - [`output`] - Results pane rendering (gap markers, go-to-file locations)
//! - [`settings`] - Per-project index and folder settings
//! - [`search`] - Runs `csearch` for a query
//! - [`index`] - Runs `cindex` with progress reporting
//! - [`utils`] - User configuration and progress helpers
//!
//! ## Quick Start
//!
//! ```
//! use yacs::{parse_query, parse_results};
//!
//! let query = parse_query(r#""Hello, World" printf file:.*c$"#).unwrap();
//! assert_eq!(query.to_args().unwrap(), ["-f", ".*c$", "(Hello, World|printf)"]);
//!
//! let groups = parse_results("a.c:3:printf(\"Hello, World\");\n").unwrap();
//! assert_eq!(groups[0].filename(), "a.c");
//! ```

pub mod error;
pub mod index;
pub mod lexer;
pub mod output;
pub mod query;
pub mod results;
pub mod search;
pub mod settings;
pub mod utils;

pub use error::{Error, LexError, Result};
pub use query::{Query, parse_query};
pub use results::{FileMatchGroup, MatchLine, parse_results};

/// Environment variable both tools read the index location from
pub const INDEX_ENV_VAR: &str = "CSEARCHINDEX";

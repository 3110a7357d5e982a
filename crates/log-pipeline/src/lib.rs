//! prettylog-pipeline -- turns a stream of JSON log lines into readable output.
//!
//! # Modules
//!
//! - [`classifier`]: maps JSON keys onto the level/message/timestamp slots
//! - [`matcher`]: wildcard field-name matching (`trace.*`, `*.id`, `*err*`)
//! - [`filter`]: level, where and ignore-list predicates; field selection
//! - [`truncate`]: per-field value truncation
//! - [`style`]: style resolution with highlight overrides
//! - [`render`]: single and multi-line layout
//! - [`pipeline`]: the two-stage async reader/renderer
//! - [`error`]: domain error type
//!
//! # Architecture
//!
//! ```text
//! raw line -> KeywordClassifier -> FilterEngine -> Truncate -> StyleResolver -> LineRenderer
//!                 (producer)       |------------------- consumer -------------------|
//! ```

pub mod classifier;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod truncate;

// --- re-exports ---

pub use classifier::{KeywordClassifier, Slot};
pub use error::LogPipelineError;
pub use filter::{FilterEngine, FilterSpec, FilterSpecBuilder, LevelFilter, Verdict, WhereClause};
pub use matcher::{PatternSet, matches_pattern};
pub use pipeline::{LogPipeline, LogPipelineBuilder, PipelineStats};
pub use render::{LineRenderer, RenderOptions};
pub use style::StyleResolver;
pub use truncate::{Truncate, TruncateLimit};

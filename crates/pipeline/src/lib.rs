//! # Tutor Pipeline
//!
//! The ordering and cross-reference core of the tutorial generator.
//!
//! ## Stages
//!
//! ```text
//! AbstractionSet + RelationshipGraph
//!     │
//!     ├──> Chapter Orderer (in-degree heuristic, cycle tolerant)
//!     │      └─> ChapterOrder: permutation of 0..N
//!     │
//!     ├──> Reference Resolver (slug + position prefix)
//!     │      └─> index -> ResolvedChapterRef, before any prose exists
//!     │
//!     ├──> Generation Driver (strictly sequential, bounded retry)
//!     │      └─> Chapter list, each aware of every sibling's filename
//!     │
//!     └──> Tutorial Assembler (index entries + broken-link check)
//! ```
//!
//! Every stage consumes its predecessor's complete output; nothing here is
//! streamed. The inputs are read-only snapshots, so the order and the
//! resolver mapping can be shared by reference with every generation call.

mod assemble;
mod driver;
mod error;
mod order;
mod resolve;

pub use assemble::{assemble, AssembledTutorial, BrokenLink, ChapterFile, IndexEntry, TutorialIndex};
pub use driver::{
    generate_chapters, Chapter, ChapterGenerator, ChapterListing, ChapterRequest, DriverConfig,
    GenerationFailure,
};
pub use error::{PipelineError, Result};
pub use order::{order_chapters, ChapterOrder};
pub use resolve::{resolve_refs, slugify, ResolvedChapterRef};

//! # Tutor LLM
//!
//! The injected text-generation capability for the tutorial pipeline.
//!
//! Every stage that talks to a model receives an explicit [`LlmContext`]
//! holding the generator, the response cache, and the retry policy; there
//! are no ambient singletons. The generator itself is a trait so the
//! ordering/resolution core stays testable without network access.
//!
//! ```text
//! LlmContext
//!     ├─ Arc<dyn TextGenerator>   (HTTP client or test mock)
//!     ├─ ResponseCache            (prompt-keyed JSON file, optional)
//!     └─ RetryPolicy              (bounded attempts, fixed wait)
//! ```

mod cache;
mod client;
mod context;
mod error;
mod generate;
mod retry;
mod yaml;

pub use cache::ResponseCache;
pub use client::{LlmConfig, OpenAiGenerator};
pub use context::LlmContext;
pub use error::{LlmError, Result};
pub use generate::TextGenerator;
pub use retry::{with_retries, RetryOutcome, RetryPolicy};
pub use yaml::{extract_yaml_block, parse_yaml_response};

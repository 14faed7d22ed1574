use crate::error::{PipelineError, Result};
use crate::order::ChapterOrder;
use crate::resolve::ResolvedChapterRef;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tutor_analysis::{Abstraction, AbstractionSet};

/// One row of the full chapter table handed to every generation call, so
/// a chapter may link forward or backward to any sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterListing {
    pub chapter_ref: ResolvedChapterRef,
    pub name: String,
}

/// Everything a single chapter-generation call may draw on.
#[derive(Debug)]
pub struct ChapterRequest<'a> {
    pub abstraction: &'a Abstraction,
    pub chapter_ref: &'a ResolvedChapterRef,
    /// Every chapter in teaching order, including this one.
    pub all_chapters: &'a [ChapterListing],
    /// Body of the previous chapter; `None` for the first. Used only for
    /// a natural transition, never to revise earlier content.
    pub previous_body: Option<&'a str>,
    /// Zero-based retry attempt for this position.
    pub attempt: u32,
}

/// Error surfaced by a [`ChapterGenerator`] attempt. Carried as data so
/// the driver can decide between retrying and aborting.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct GenerationFailure(pub String);

/// The external prose generator. The pipeline drives it; it never decides
/// ordering or filenames.
#[async_trait]
pub trait ChapterGenerator: Send + Sync {
    async fn generate_chapter(
        &self,
        request: ChapterRequest<'_>,
    ) -> std::result::Result<String, GenerationFailure>;
}

/// A generated chapter, paired with its pre-resolved identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub chapter_ref: ResolvedChapterRef,
    pub name: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub max_attempts: u32,
    pub retry_wait: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_wait: Duration::from_secs(20),
        }
    }
}

/// Drive the generator once per abstraction, strictly in chapter order.
///
/// Generation is intentionally sequential: each call receives the previous
/// chapter's body as continuity context, so position `p + 1` cannot start
/// before position `p` has finished. Each position gets a bounded number
/// of attempts; exhausting them aborts the whole run, because a missing
/// chapter would leave dangling links in every sibling. Cancellation is
/// honored between positions, never mid-call.
pub async fn generate_chapters(
    generator: &dyn ChapterGenerator,
    set: &AbstractionSet,
    order: &ChapterOrder,
    refs: &BTreeMap<usize, ResolvedChapterRef>,
    config: DriverConfig,
    cancel: &AtomicBool,
) -> Result<Vec<Chapter>> {
    let all_chapters = chapter_listings(set, order, refs)?;

    let mut chapters: Vec<Chapter> = Vec::with_capacity(order.len());
    let mut previous_body: Option<String> = None;

    for (offset, index) in order.iter().enumerate() {
        let position = offset + 1;
        if cancel.load(Ordering::SeqCst) {
            return Err(PipelineError::Cancelled { position });
        }

        let listing = &all_chapters[offset];
        let abstraction = set.get(index).ok_or_else(|| {
            PipelineError::InvariantViolation(format!("order references unknown index {index}"))
        })?;

        log::info!(
            "Generating chapter {position}/{}: {}",
            order.len(),
            listing.name
        );

        let max_attempts = config.max_attempts.max(1);
        let mut body = None;
        let mut last_message = String::new();
        for attempt in 0..max_attempts {
            if attempt > 0 {
                log::warn!(
                    "Retrying chapter {position} (attempt {} of {max_attempts})",
                    attempt + 1
                );
                tokio::time::sleep(config.retry_wait).await;
            }
            let request = ChapterRequest {
                abstraction,
                chapter_ref: &listing.chapter_ref,
                all_chapters: &all_chapters,
                previous_body: previous_body.as_deref(),
                attempt,
            };
            match generator.generate_chapter(request).await {
                Ok(text) => {
                    body = Some(text);
                    break;
                }
                Err(err) => {
                    log::warn!("Chapter {position} attempt {} failed: {err}", attempt + 1);
                    last_message = err.0;
                }
            }
        }

        let Some(body) = body else {
            return Err(PipelineError::GenerationFailed {
                position,
                name: listing.name.clone(),
                attempts: max_attempts,
                message: last_message,
            });
        };

        previous_body = Some(body.clone());
        chapters.push(Chapter {
            chapter_ref: listing.chapter_ref.clone(),
            name: listing.name.clone(),
            body,
        });
    }

    Ok(chapters)
}

fn chapter_listings(
    set: &AbstractionSet,
    order: &ChapterOrder,
    refs: &BTreeMap<usize, ResolvedChapterRef>,
) -> Result<Vec<ChapterListing>> {
    order
        .iter()
        .map(|index| {
            let chapter_ref = refs.get(&index).ok_or_else(|| {
                PipelineError::InvariantViolation(format!(
                    "no resolved reference for abstraction {index}"
                ))
            })?;
            let name = set
                .get(index)
                .map(|a| a.name.clone())
                .ok_or_else(|| {
                    PipelineError::InvariantViolation(format!(
                        "order references unknown index {index}"
                    ))
                })?;
            Ok(ChapterListing {
                chapter_ref: chapter_ref.clone(),
                name,
            })
        })
        .collect()
}

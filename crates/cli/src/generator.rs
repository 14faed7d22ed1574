use async_trait::async_trait;
use indicatif::ProgressBar;
use std::sync::Arc;
use tutor_analysis::{AbstractionSet, LanguageContext, RelationshipGraph};
use tutor_crawler::FileSet;
use tutor_llm::LlmContext;
use tutor_pipeline::{Chapter, ChapterGenerator, ChapterRequest, GenerationFailure};

/// Chapter prose generator backed by the shared [`LlmContext`].
///
/// The pipeline driver owns sequencing and retries; this type only builds
/// the prompt for one position, runs a single model call (cache bypassed
/// on retry attempts), and normalizes the returned heading.
pub struct LlmChapterGenerator {
    ctx: Arc<LlmContext>,
    files: Arc<FileSet>,
    project_name: String,
    language: String,
    progress: ProgressBar,
}

impl LlmChapterGenerator {
    pub fn new(
        ctx: Arc<LlmContext>,
        files: Arc<FileSet>,
        project_name: String,
        language: String,
        progress: ProgressBar,
    ) -> Self {
        Self {
            ctx,
            files,
            project_name,
            language,
            progress,
        }
    }

    fn build_prompt(&self, request: &ChapterRequest<'_>) -> String {
        let lang = LanguageContext::new(&self.language);
        let language_instruction = if lang.is_non_english {
            format!(
                "IMPORTANT: Write this ENTIRE chapter in **{cap}**. Translate all \
explanations and technical prose into {cap}; keep code syntax and proper \
nouns as they are.\n\n",
                cap = lang.capitalized
            )
        } else {
            String::new()
        };

        let chapter_listing: String = request
            .all_chapters
            .iter()
            .map(|listing| {
                format!(
                    "{}. [{}]({})\n",
                    listing.chapter_ref.position, listing.name, listing.chapter_ref.filename
                )
            })
            .collect();

        let mut file_context = String::new();
        for &index in &request.abstraction.file_indices {
            if let Some(file) = self.files.get(index) {
                file_context.push_str(&format!(
                    "--- File: {} ---\n{}\n\n",
                    file.path, file.content
                ));
            }
        }
        if file_context.is_empty() {
            file_context.push_str("No specific code snippets are available for this abstraction.\n");
        }

        let previous = request
            .previous_body
            .unwrap_or("This is the first chapter; there is no earlier material.");

        format!(
            "## Role and Task
You are an expert technical writer. Write chapter {position} of a tutorial \
about the `{project}` codebase. The chapter explains the \"{name}\" \
abstraction to a developer reading the tutorial front to back.

## Critical Requirements
Base the chapter ONLY on the code provided below. Do not invent names, \
behavior, or dependencies that are not visible in it; if uncertain, omit. \
Keep code excerpts under 20 lines and only quote code that appears in the \
context.

{language_instruction}## Context
**Project**: `{project}`
**Chapter subject**: {name}
**Subject description**:
{summary}

**Complete chapter structure** (link to other chapters with these exact \
markdown links):
{chapter_listing}
**Previous chapter content** (for a natural opening transition only; never \
restate or revise it):
{previous}

**Code context**:
{file_context}
## Output
Start with the heading `# {name}`, open with a short transition from the \
previous chapter where one exists, explain the abstraction's purpose, walk \
through the key code, and close by pointing to the most relevant next \
chapter using the links above. Provide ONLY the markdown content.",
            position = request.chapter_ref.position,
            project = self.project_name,
            name = request.abstraction.name,
            summary = request.abstraction.summary,
        )
    }
}

/// Make sure the body starts with the chapter's own `# Name` heading,
/// replacing a wrong leading heading or prepending a missing one.
fn normalize_heading(name: &str, body: &str) -> String {
    let heading = format!("# {name}");
    let trimmed = body.trim();
    if trimmed.starts_with(&heading) {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.first().is_some_and(|line| line.trim_start().starts_with('#')) {
        lines[0] = &heading;
        return lines.join("\n");
    }
    format!("{heading}\n\n{trimmed}")
}

#[async_trait]
impl ChapterGenerator for LlmChapterGenerator {
    async fn generate_chapter(
        &self,
        request: ChapterRequest<'_>,
    ) -> Result<String, GenerationFailure> {
        let prompt = self.build_prompt(&request);
        let body = self
            .ctx
            .generate(&prompt, request.attempt)
            .await
            .map_err(|err| GenerationFailure(err.to_string()))?;

        let body = normalize_heading(&request.abstraction.name, &body);
        self.progress.inc(1);
        Ok(body)
    }
}

/// Prompt for the beginner-friendly overview document, built from the
/// finished chapters.
pub fn overview_prompt(
    project_name: &str,
    language: &str,
    set: &AbstractionSet,
    graph: &RelationshipGraph,
    chapters: &[Chapter],
) -> String {
    let lang = LanguageContext::new(language);
    let language_instruction = if lang.is_non_english {
        format!(
            "IMPORTANT: Write this ENTIRE document in **{}**.\n\n",
            lang.capitalized
        )
    } else {
        String::new()
    };

    let abstractions_overview: String = set
        .iter()
        .map(|(_, a)| format!("- {}: {}\n", a.name, a.summary))
        .collect();

    let combined: String = chapters
        .iter()
        .map(|chapter| format!("{}\n\n", chapter.body))
        .collect();

    format!(
        "{language_instruction}## Role and Task
You are an expert technical writer and educator. Transform the detailed \
tutorial below into a single beginner-friendly overview of `{project_name}` \
that a non-technical reader can follow without oversimplifying the ideas.

## Project Summary
{summary}

## Core Abstractions
{abstractions_overview}
## Tutorial Chapters
{combined}
## Output
Prefer prose over lists, explain jargon in plain language, and focus on what \
the system does and why. Provide ONLY the markdown content.",
        summary = graph.project_summary,
    )
}

use crate::error::{AnalysisError, Result};
use crate::lang::LanguageContext;
use crate::prompts::{is_contextual_path, STRICT_ACCURACY};
use crate::types::{parse_index_entry, Abstraction, AbstractionSet};
use serde::Deserialize;
use tutor_crawler::FileSet;
use tutor_llm::{parse_yaml_response, with_retries, LlmContext, LlmError, RetryOutcome};

/// Knobs shared by both analysis steps.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub project_name: String,
    pub language: String,
    pub max_abstractions: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            project_name: "project".to_string(),
            language: "english".to_string(),
            max_abstractions: 20,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawAbstraction {
    name: String,
    description: String,
    file_indices: Vec<serde_yaml::Value>,
}

/// Ask the model for the codebase's core abstractions.
///
/// The response must be a fenced YAML list of `{name, description,
/// file_indices}`; out-of-range file indices are a validation failure and
/// trigger a retry (with the cache bypassed), not a silent drop.
pub async fn identify_abstractions(
    ctx: &LlmContext,
    files: &FileSet,
    options: &AnalysisOptions,
) -> Result<AbstractionSet> {
    let prompt = build_prompt(files, options);
    log::info!("Identifying abstractions ({} files)", files.len());

    let file_count = files.len();
    let max_abstractions = options.max_abstractions;
    let prompt_text: &str = &prompt;
    let outcome = with_retries(ctx.policy(), move |attempt| {
        attempt_identify(ctx, prompt_text, file_count, max_abstractions, attempt)
    })
    .await;

    match outcome {
        RetryOutcome::Success { value, attempts } => {
            if attempts > 1 {
                log::info!("Abstraction identification succeeded on attempt {attempts}");
            }
            log::info!("Identified {} abstractions", value.len());
            Ok(value)
        }
        RetryOutcome::Exhausted {
            attempts,
            last_error,
        } => Err(AnalysisError::Exhausted {
            attempts,
            last_error,
        }),
    }
}

async fn attempt_identify(
    ctx: &LlmContext,
    prompt: &str,
    file_count: usize,
    max_abstractions: usize,
    attempt: u32,
) -> std::result::Result<AbstractionSet, LlmError> {
    let response = ctx.generate(prompt, attempt).await?;
    validate(&response, file_count, max_abstractions)
}

fn validate(
    response: &str,
    file_count: usize,
    max_abstractions: usize,
) -> std::result::Result<AbstractionSet, LlmError> {
    let raw: Vec<RawAbstraction> = parse_yaml_response(response)?;

    if raw.is_empty() {
        return Err(LlmError::InvalidResponse(
            "model returned zero abstractions".to_string(),
        ));
    }

    let mut abstractions = Vec::with_capacity(raw.len());
    for item in &raw {
        let name = item.name.trim();
        if name.is_empty() {
            return Err(LlmError::InvalidResponse(
                "abstraction with empty name".to_string(),
            ));
        }

        let mut indices = Vec::new();
        for entry in &item.file_indices {
            let idx = parse_index_entry(entry).ok_or_else(|| {
                LlmError::InvalidResponse(format!(
                    "could not parse file index entry {entry:?} for '{name}'"
                ))
            })?;
            if idx >= file_count {
                return Err(LlmError::InvalidResponse(format!(
                    "file index {idx} out of range for '{name}' (max {})",
                    file_count.saturating_sub(1)
                )));
            }
            indices.push(idx);
        }
        indices.sort_unstable();
        indices.dedup();

        abstractions.push(Abstraction {
            name: name.to_string(),
            summary: item.description.trim().to_string(),
            file_indices: indices,
        });
    }

    if abstractions.len() > max_abstractions {
        log::warn!(
            "Model returned {} abstractions, keeping the first {max_abstractions}",
            abstractions.len()
        );
        abstractions.truncate(max_abstractions);
    }

    Ok(AbstractionSet::new(abstractions))
}

fn build_prompt(files: &FileSet, options: &AnalysisOptions) -> String {
    let lang = LanguageContext::new(&options.language);
    let language_instruction =
        lang.instruction("the `name` and `description` for each abstraction");

    // Documentation-like files first, so the model reads project context
    // before implementation details.
    let mut contextual = Vec::new();
    let mut code = Vec::new();
    for (index, file) in files.iter() {
        if is_contextual_path(&file.path) {
            contextual.push((index, file));
        } else {
            code.push((index, file));
        }
    }

    let mut listing = String::new();
    let mut context = String::new();
    if !contextual.is_empty() {
        context.push_str("=== PROJECT CONTEXT AND DOCUMENTATION ===\n\n");
        for (index, file) in &contextual {
            listing.push_str(&format!("- {index} # {}\n", file.path));
            context.push_str(&format!(
                "--- File Index {index}: {} ---\n{}\n\n",
                file.path, file.content
            ));
        }
        context.push_str("=== CODE FILES ===\n\n");
    }
    for (index, file) in &code {
        listing.push_str(&format!("- {index} # {}\n", file.path));
        context.push_str(&format!(
            "--- File Index {index}: {} ---\n{}\n\n",
            file.path, file.content
        ));
    }

    format!(
        "## Role and Task
You are an expert software architect. Identify the 1-{max} core abstractions \
of this codebase for a tutorial that teaches new contributors how it works.

## Critical Requirements
{STRICT_ACCURACY}

## Context
**Project**: `{project}`
**Available Files**:
{listing}
## Codebase to Analyze
{context}
{language_instruction}## Required Output Format
Provide your analysis as a fenced YAML list following this exact structure:

```yaml
- name: |
    Request Router{hint}
  description: |
    Dispatches incoming requests to the matching handler.
    Serves as the central entry point of the service.{hint}
  file_indices:
    - 0 # src/router.rs
    - 2 # src/handlers/mod.rs
```",
        max = options.max_abstractions,
        project = options.project_name,
        hint = lang.field_hint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validate_accepts_well_formed_yaml() {
        let response = concat!(
            "```yaml\n",
            "- name: Router\n",
            "  description: Dispatches requests.\n",
            "  file_indices:\n",
            "    - 0 # src/router.rs\n",
            "    - 1\n",
            "    - 1\n",
            "```"
        );
        let set = validate(response, 3, 20).unwrap();
        assert_eq!(set.len(), 1);
        let abstraction = set.get(0).unwrap();
        assert_eq!(abstraction.name, "Router");
        assert_eq!(abstraction.file_indices, vec![0, 1]);
    }

    #[test]
    fn validate_rejects_out_of_range_file_index() {
        let response = concat!(
            "```yaml\n",
            "- name: Router\n",
            "  description: Dispatches requests.\n",
            "  file_indices:\n",
            "    - 9\n",
            "```"
        );
        let err = validate(response, 3, 20).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn validate_caps_abstraction_count() {
        let response = concat!(
            "```yaml\n",
            "- name: A\n",
            "  description: a\n",
            "  file_indices: []\n",
            "- name: B\n",
            "  description: b\n",
            "  file_indices: []\n",
            "```"
        );
        let set = validate(response, 1, 1).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).unwrap().name, "A");
    }
}

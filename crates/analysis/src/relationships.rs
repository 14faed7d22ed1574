use crate::error::{AnalysisError, Result};
use crate::identify::AnalysisOptions;
use crate::lang::LanguageContext;
use crate::prompts::STRICT_ACCURACY;
use crate::types::{parse_index_entry, AbstractionSet, RelationshipEdge, RelationshipGraph};
use serde::Deserialize;
use std::collections::BTreeSet;
use tutor_crawler::FileSet;
use tutor_llm::{parse_yaml_response, with_retries, LlmContext, LlmError, RetryOutcome};

#[derive(Debug, Deserialize)]
struct RawRelationships {
    summary: String,
    relationships: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    from_abstraction: serde_yaml::Value,
    to_abstraction: serde_yaml::Value,
    label: String,
}

/// Ask the model how the identified abstractions relate, plus a short
/// project summary.
///
/// Endpoint indices in the response are validated against the abstraction
/// count; a bad index fails the attempt and triggers a retry.
pub async fn analyze_relationships(
    ctx: &LlmContext,
    files: &FileSet,
    set: &AbstractionSet,
    options: &AnalysisOptions,
) -> Result<RelationshipGraph> {
    if set.is_empty() {
        return Ok(RelationshipGraph::default());
    }

    let prompt = build_prompt(files, set, options);
    log::info!("Analyzing relationships between {} abstractions", set.len());

    let count = set.len();
    let prompt_text: &str = &prompt;
    let outcome = with_retries(ctx.policy(), move |attempt| {
        attempt_analyze(ctx, prompt_text, count, attempt)
    })
    .await;

    match outcome {
        RetryOutcome::Success { value, .. } => {
            log::info!("Mapped {} relationships", value.edges.len());
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

async fn attempt_analyze(
    ctx: &LlmContext,
    prompt: &str,
    count: usize,
    attempt: u32,
) -> std::result::Result<RelationshipGraph, LlmError> {
    let response = ctx.generate(prompt, attempt).await?;
    validate(&response, count)
}

fn validate(response: &str, count: usize) -> std::result::Result<RelationshipGraph, LlmError> {
    let raw: RawRelationships = parse_yaml_response(response)?;

    if raw.summary.trim().is_empty() {
        return Err(LlmError::InvalidResponse(
            "empty project summary".to_string(),
        ));
    }

    let mut edges = Vec::with_capacity(raw.relationships.len());
    for rel in &raw.relationships {
        let from = parse_index_entry(&rel.from_abstraction).ok_or_else(|| {
            LlmError::InvalidResponse(format!(
                "could not parse relationship endpoint {:?}",
                rel.from_abstraction
            ))
        })?;
        let to = parse_index_entry(&rel.to_abstraction).ok_or_else(|| {
            LlmError::InvalidResponse(format!(
                "could not parse relationship endpoint {:?}",
                rel.to_abstraction
            ))
        })?;
        if from >= count || to >= count {
            return Err(LlmError::InvalidResponse(format!(
                "relationship {from} -> {to} out of range (max {})",
                count - 1
            )));
        }
        edges.push(RelationshipEdge {
            from,
            to,
            label: rel.label.trim().to_string(),
        });
    }

    Ok(RelationshipGraph {
        project_summary: raw.summary.trim().to_string(),
        edges,
    })
}

fn build_prompt(files: &FileSet, set: &AbstractionSet, options: &AnalysisOptions) -> String {
    let lang = LanguageContext::new(&options.language);
    let language_instruction =
        lang.instruction("the `summary` and relationship `label` fields");

    let mut listing = String::new();
    let mut relevant: BTreeSet<usize> = BTreeSet::new();
    let mut details = String::from("Identified Abstractions:\n");
    for (index, abstraction) in set.iter() {
        listing.push_str(&format!("- {index} # {}\n", abstraction.name));
        let file_list = abstraction
            .file_indices
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        details.push_str(&format!(
            "- Index {index}: {} (Relevant file indices: [{file_list}])\n  Description: {}\n",
            abstraction.name, abstraction.summary
        ));
        relevant.extend(abstraction.file_indices.iter().copied());
    }

    details.push_str("\nRelevant File Snippets (Referenced by Index and Path):\n");
    for index in relevant {
        if let Some(file) = files.get(index) {
            details.push_str(&format!(
                "--- File {index} # {} ---\n{}\n\n",
                file.path, file.content
            ));
        }
    }

    format!(
        "## Role and Task
You are an expert software architect. Analyze how these code abstractions \
relate to and depend on one another, and write a concise project summary.

## Critical Requirements
{STRICT_ACCURACY}

Base your analysis ONLY on the abstractions and code provided. Prioritize \
architecturally significant relationships over minor interactions, and make \
sure every abstraction appears in at least one relationship.

## Context
**Project**: `{project}`
**Identified Abstractions**{note}:
{listing}
**Detailed Analysis Context**:
{details}
{language_instruction}## Required Output Format
Provide a fenced YAML response:

```yaml
summary: |
  One or two sentences describing what the project does and how the
  pieces fit together.{hint}
relationships:
  - from_abstraction: 0 # RequestRouter
    to_abstraction: 1 # HandlerRegistry
    label: \"Dispatches to\"{hint}
  - from_abstraction: 2 # ConfigLoader
    to_abstraction: 0 # RequestRouter
    label: \"Configures\"{hint}
```",
        project = options.project_name,
        note = lang.listing_note,
        hint = lang.field_hint,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn validate_parses_summary_and_edges() {
        let response = concat!(
            "```yaml\n",
            "summary: |\n",
            "  A small web service.\n",
            "relationships:\n",
            "  - from_abstraction: 0 # Router\n",
            "    to_abstraction: 1 # Logger\n",
            "    label: \"Logs through\"\n",
            "```"
        );
        let graph = validate(response, 2).unwrap();
        assert_eq!(graph.project_summary, "A small web service.");
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].from, 0);
        assert_eq!(graph.edges[0].to, 1);
        assert_eq!(graph.edges[0].label, "Logs through");
    }

    #[test]
    fn validate_rejects_out_of_range_endpoint() {
        let response = concat!(
            "```yaml\n",
            "summary: ok\n",
            "relationships:\n",
            "  - from_abstraction: 0\n",
            "    to_abstraction: 5\n",
            "    label: uses\n",
            "```"
        );
        let err = validate(response, 2).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}

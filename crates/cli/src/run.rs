use crate::generator::{overview_prompt, LlmChapterGenerator};
use crate::patterns;
use crate::render::{mermaid_diagram, render_index, IndexMetadata, FOOTER};
use crate::Args;
use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tutor_analysis::{analyze_relationships, identify_abstractions, AnalysisOptions};
use tutor_crawler::{
    crawl_git, crawl_local, parse_git_url, render_directory_tree, CrawlConfig, FileSet, RepoInfo,
    TreeLimits,
};
use tutor_llm::{LlmContext, OpenAiGenerator, RetryOutcome, RetryPolicy};
use tutor_pipeline::{
    assemble, generate_chapters, order_chapters, resolve_refs, DriverConfig, IndexEntry,
};

const OVERVIEW_FILENAME: &str = "overview.md";

/// Execute the whole pipeline. Returns the process exit code: zero on a
/// clean run, non-zero when the finished tutorial carries broken links.
pub async fn run(args: Args) -> anyhow::Result<i32> {
    let crawl_config = CrawlConfig {
        include: patterns::include_or_default(&args.include),
        exclude: patterns::exclude_or_default(&args.exclude),
        max_file_size: args.max_size,
    };

    let (files, repo_info, project_name) = fetch(&args, &crawl_config).await?;
    log::info!("Fetched {} files for '{project_name}'", files.len());

    let policy = RetryPolicy {
        max_attempts: args.max_retries,
        wait: Duration::from_secs(args.retry_wait),
    };
    let endpoint = OpenAiGenerator::from_env().context("configuring the LLM endpoint")?;
    let mut ctx = LlmContext::new(Arc::new(endpoint), policy);
    if !args.no_cache {
        ctx = ctx.with_cache(&args.cache_file);
    }
    let ctx = Arc::new(ctx);

    let options = AnalysisOptions {
        project_name: project_name.clone(),
        language: args.language.clone(),
        max_abstractions: args.max_abstractions,
    };

    let files = Arc::new(files);
    let set = identify_abstractions(&ctx, &files, &options).await?;
    let graph = analyze_relationships(&ctx, &files, &set, &options).await?;

    let order = order_chapters(&set, &graph)?;
    let refs = resolve_refs(&order, &set);
    log::info!("Chapter order: {:?}", order.as_slice());

    // Ctrl-c stops the run between chapters, never mid-call.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received; stopping before the next chapter");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let progress = ProgressBar::new(order.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} chapters")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let chapter_generator = LlmChapterGenerator::new(
        ctx.clone(),
        files.clone(),
        project_name.clone(),
        args.language.clone(),
        progress.clone(),
    );
    let driver_config = DriverConfig {
        max_attempts: args.max_retries,
        retry_wait: Duration::from_secs(args.retry_wait),
    };

    let chapters = generate_chapters(
        &chapter_generator,
        &set,
        &order,
        &refs,
        driver_config,
        &cancel,
    )
    .await?;
    progress.finish_and_clear();

    let assembled = assemble(&graph.project_summary, &set, &chapters);
    let mut index = assembled.index.clone();

    let overview = if args.no_overview {
        None
    } else {
        log::info!("Generating beginner-friendly overview");
        let prompt = overview_prompt(&project_name, &args.language, &set, &graph, &chapters);
        match ctx.generate_with_retries(&prompt).await {
            RetryOutcome::Success { value, .. } => Some(value),
            RetryOutcome::Exhausted {
                attempts,
                last_error,
            } => bail!("overview generation failed after {attempts} attempts: {last_error}"),
        }
    };
    if overview.is_some() {
        index.entries.push(IndexEntry {
            filename: OVERVIEW_FILENAME.to_string(),
            name: "Beginner-Friendly Overview".to_string(),
            summary: "A high-level walkthrough of the project for non-technical readers."
                .to_string(),
        });
    }

    let out_dir = args.output.join(&project_name);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let tree = render_directory_tree(&files.paths(), TreeLimits::default());
    let diagram = mermaid_diagram(&set, &graph);
    let metadata = IndexMetadata::now(repo_info);
    let index_md = render_index(&project_name, &index, &diagram, &tree, &metadata);

    write_doc(&out_dir, "index.md", &index_md)?;
    for chapter in &assembled.chapters {
        write_doc(&out_dir, &chapter.filename, &chapter.body)?;
    }
    if let Some(overview) = &overview {
        write_doc(&out_dir, OVERVIEW_FILENAME, overview)?;
    }

    log::info!("Tutorial generation complete: {}", out_dir.display());

    if assembled.broken_links.is_empty() {
        Ok(0)
    } else {
        log::warn!(
            "{} broken link(s) detected; see warnings above",
            assembled.broken_links.len()
        );
        Ok(1)
    }
}

async fn fetch(
    args: &Args,
    config: &CrawlConfig,
) -> anyhow::Result<(FileSet, Option<RepoInfo>, String)> {
    if let Some(url) = &args.repo {
        let source = parse_git_url(url)?;
        let name = args
            .name
            .clone()
            .unwrap_or_else(|| source.project_name());
        let (files, info) = crawl_git(&source, config).await?;
        return Ok((files, Some(info), name));
    }

    let dir = args
        .dir
        .as_ref()
        .context("either --repo or --dir is required")?;
    let name = args.name.clone().unwrap_or_else(|| directory_name(dir));
    let files = crawl_local(dir, config)?;
    Ok((files, None, name))
}

fn directory_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string())
}

fn write_doc(out_dir: &Path, filename: &str, body: &str) -> anyhow::Result<()> {
    let path = out_dir.join(filename);
    std::fs::write(&path, format!("{body}{FOOTER}"))
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("  - Wrote {}", path.display());
    Ok(())
}

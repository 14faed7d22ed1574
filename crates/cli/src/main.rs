//! Repo Tutor CLI
//!
//! Turns a source repository into an ordered, cross-linked markdown
//! tutorial: one chapter per core abstraction, taught foundations first,
//! with an index document tying everything together.
//!
//! ## Usage
//!
//! ```text
//! repo-tutor --dir ./my-project
//! repo-tutor --repo https://github.com/acme/widgets --language german
//! ```
//!
//! The LLM endpoint is configured through `OPENAI_API_KEY`,
//! `OPENAI_BASE_URL`, and `OPENAI_MODEL`.

use clap::Parser;
use std::path::PathBuf;

mod generator;
mod patterns;
mod render;
mod run;

#[derive(Parser, Debug)]
#[command(name = "repo-tutor", version, about = "Generate a tutorial from a codebase")]
pub struct Args {
    /// Git repository URL to crawl (GitHub /tree/<branch>/<subdir> suffixes supported)
    #[arg(long, required_unless_present = "dir", conflicts_with = "dir")]
    pub repo: Option<String>,

    /// Local directory to crawl
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Project name (derived from the URL or directory when omitted)
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Base output directory; files land in <output>/<project name>/
    #[arg(short = 'o', long, default_value = "output")]
    pub output: PathBuf,

    /// Include glob (repeatable); defaults to common source patterns
    #[arg(short = 'i', long = "include")]
    pub include: Vec<String>,

    /// Exclude glob (repeatable); defaults to build/vendor directories
    #[arg(short = 'e', long = "exclude")]
    pub exclude: Vec<String>,

    /// Maximum file size in bytes
    #[arg(long, default_value_t = 100_000)]
    pub max_size: u64,

    /// Tutorial output language
    #[arg(long, default_value = "english")]
    pub language: String,

    /// Maximum number of abstractions to identify
    #[arg(long, default_value_t = 20)]
    pub max_abstractions: usize,

    /// Disable the LLM response cache
    #[arg(long)]
    pub no_cache: bool,

    /// LLM response cache file
    #[arg(long, default_value = ".llm_cache.json")]
    pub cache_file: PathBuf,

    /// Attempts per LLM step before giving up
    #[arg(long, default_value_t = 5)]
    pub max_retries: u32,

    /// Seconds to wait between retry attempts
    #[arg(long, default_value_t = 20)]
    pub retry_wait: u64,

    /// Skip the beginner-friendly overview document
    #[arg(long)]
    pub no_overview: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let exit_code = run::run(args).await?;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}

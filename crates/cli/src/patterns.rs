//! Default crawl filters, applied when the user passes no explicit globs.

pub const DEFAULT_INCLUDE: &[&str] = &[
    "**/*.rs",
    "**/*.py",
    "**/*.js",
    "**/*.ts",
    "**/*.go",
    "**/*.java",
    "**/*.c",
    "**/*.h",
    "**/*.cc",
    "**/*.cpp",
    "**/*.rb",
    "**/*.md",
    "**/*.toml",
    "**/*.yaml",
    "**/*.yml",
    "**/Dockerfile",
    "**/Makefile",
];

pub const DEFAULT_EXCLUDE: &[&str] = &[
    "**/target/**",
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/vendor/**",
    "**/venv/**",
    "**/__pycache__/**",
    "**/*.min.js",
    "**/*.lock",
    "**/package-lock.json",
];

pub fn include_or_default(include: &[String]) -> Vec<String> {
    if include.is_empty() {
        DEFAULT_INCLUDE.iter().map(|s| (*s).to_string()).collect()
    } else {
        include.to_vec()
    }
}

pub fn exclude_or_default(exclude: &[String]) -> Vec<String> {
    if exclude.is_empty() {
        DEFAULT_EXCLUDE.iter().map(|s| (*s).to_string()).collect()
    } else {
        exclude.to_vec()
    }
}

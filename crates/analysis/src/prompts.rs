//! Shared prompt fragments for the analysis steps.

pub(crate) const STRICT_ACCURACY: &str = "\
**STRICT ACCURACY**: Do NOT invent, fabricate, or assume any information not \
explicitly present in the provided code. This includes variable, function, or \
type names not shown in the code; configuration values not evident in the \
files; dependencies or external libraries not explicitly referenced; and \
relationships not clearly evident in the provided context. If uncertain about \
any detail, omit it rather than fabricate.";

/// Files whose names suggest documentation rather than code; surfaced first
/// in analysis prompts so the model sees project context before internals.
pub(crate) fn is_contextual_path(path: &str) -> bool {
    let filename = path.rsplit('/').next().unwrap_or(path).to_lowercase();
    ["readme", "doc", "guide", "overview", "architecture"]
        .iter()
        .any(|marker| filename.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_contextual_paths() {
        assert!(is_contextual_path("README.md"));
        assert!(is_contextual_path("docs/overview.md"));
        assert!(is_contextual_path("ARCHITECTURE.txt"));
        assert!(!is_contextual_path("src/main.rs"));
    }
}

/// Hints injected into prompts when the tutorial's target language is not
/// English: translation instructions plus per-field notes.
#[derive(Debug, Clone, Default)]
pub struct LanguageContext {
    pub is_non_english: bool,
    pub capitalized: String,
    pub field_hint: String,
    pub listing_note: String,
}

impl LanguageContext {
    #[must_use]
    pub fn new(language: &str) -> Self {
        let is_non_english = !language.trim().eq_ignore_ascii_case("english");
        if !is_non_english {
            return Self::default();
        }

        let capitalized = capitalize(language.trim());
        Self {
            field_hint: format!(" (value in {capitalized})"),
            listing_note: format!(" (Note: values may be in {capitalized})"),
            capitalized,
            is_non_english,
        }
    }

    /// Leading prompt instruction demanding translated fields, or empty.
    #[must_use]
    pub fn instruction(&self, fields: &str) -> String {
        if !self.is_non_english {
            return String::new();
        }
        format!(
            "IMPORTANT: Generate {fields} in **{}**. Do NOT use English for these fields.\n\n",
            self.capitalized
        )
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_yields_no_hints() {
        let ctx = LanguageContext::new("English");
        assert!(!ctx.is_non_english);
        assert!(ctx.field_hint.is_empty());
        assert!(ctx.instruction("the `name` field").is_empty());
    }

    #[test]
    fn non_english_yields_hints() {
        let ctx = LanguageContext::new("german");
        assert!(ctx.is_non_english);
        assert_eq!(ctx.capitalized, "German");
        assert!(ctx.field_hint.contains("German"));
        assert!(ctx.instruction("the `name` field").contains("**German**"));
    }
}

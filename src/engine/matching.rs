use crate::model::MatchMode;

/// A query lowered and split once, so the per-record check stays a plain
/// `contains` no matter how large the sheet is.
#[derive(Debug)]
pub struct CompiledQuery {
    mode: MatchMode,
    phrase: String,
    words: Vec<String>,
}

impl CompiledQuery {
    pub fn new(query: &str, mode: MatchMode) -> Self {
        let phrase = query.trim().to_lowercase();
        let words = phrase.split_whitespace().map(str::to_string).collect();
        Self { mode, phrase, words }
    }

    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        match self.mode {
            MatchMode::Phrase => name.contains(&self.phrase),
            MatchMode::AnyWord => self.words.iter().any(|w| name.contains(w)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phrase_is_case_insensitive_containment() {
        let q = CompiledQuery::new("Widget Pro", MatchMode::Phrase);
        assert!(q.matches("Acme WIDGET PRO 2000"));
        assert!(!q.matches("Acme Widget Lite"));
    }

    #[test]
    fn phrase_requires_the_words_together() {
        let q = CompiledQuery::new("widget pro", MatchMode::Phrase);
        assert!(!q.matches("pro-grade widget"));
    }

    #[test]
    fn any_word_matches_on_overlap() {
        let q = CompiledQuery::new("widget gadget", MatchMode::AnyWord);
        assert!(q.matches("Gadget Max"));
        assert!(q.matches("Widget Lite"));
        assert!(!q.matches("Sprocket Mini"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let q = CompiledQuery::new("  widget  ", MatchMode::Phrase);
        assert!(q.matches("widget pro"));
    }
}

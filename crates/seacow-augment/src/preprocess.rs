//! Query preprocessing: turn the latest user utterance into a search query.
//!
//! Pure text transforms, no I/O.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use seacow_chat::{ChatMessage, Role};

use crate::sources::{DataSourceProfile, SourceRegistry};

/// Clients append directives after this marker; they are not part of the question.
pub const INSTRUCTION_MARKER: &str = "[INSTRUCTIONS]";

static YOUR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\byour\b").unwrap());
static YOU_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\byou\b").unwrap());

/// A preprocessed query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    /// Marker-stripped, pronoun-rewritten question.
    pub base: String,
    /// `base` with the source's site restriction prepended.
    pub filtered: String,
}

/// Content of the most recent user message.
pub fn latest_user_message(messages: &[ChatMessage]) -> Option<&str> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
}

/// Drop everything from the first instruction marker on, then trim.
pub fn strip_instructions(text: &str) -> &str {
    match text.find(INSTRUCTION_MARKER) {
        Some(idx) => text[..idx].trim(),
        None => text.trim(),
    }
}

/// Rewrite whole-word "your" then "you" for the given source.
pub fn substitute_pronouns(text: &str, profile: &DataSourceProfile) -> String {
    let text = YOUR_RE.replace_all(text, NoExpand(profile.possessive_form.as_str()));
    YOU_RE
        .replace_all(&text, NoExpand(profile.object_form.as_str()))
        .into_owned()
}

/// Prepend the site restriction for a source. Unknown sources are a no-op.
pub fn apply_site_filter(query: &str, source: Option<&str>, registry: &SourceRegistry) -> String {
    match source.and_then(|key| registry.get(key)) {
        Some(profile) if profile.is_composite() => format!("{} {}", profile.domain_filter, query),
        Some(profile) => format!("site:{} {}", profile.domain_filter, query),
        None => query.to_string(),
    }
}

/// Full preprocessing of a raw user utterance.
pub fn preprocess(raw: &str, source: Option<&str>, registry: &SourceRegistry) -> PreparedQuery {
    let stripped = strip_instructions(raw);
    let base = match source.and_then(|key| registry.get(key)) {
        Some(profile) => substitute_pronouns(stripped, profile),
        None => stripped.to_string(),
    };
    let filtered = apply_site_filter(&base, source, registry);
    PreparedQuery { base, filtered }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bryan() -> DataSourceProfile {
        SourceRegistry::builtin().get("bryancounty").unwrap().clone()
    }

    #[test]
    fn test_strip_instructions_discards_tail() {
        assert_eq!(
            strip_instructions("  what is the budget? [INSTRUCTIONS] answer in French [INSTRUCTIONS] x"),
            "what is the budget?"
        );
        assert_eq!(strip_instructions(" plain question "), "plain question");
        assert_eq!(strip_instructions("[INSTRUCTIONS] only directives"), "");
    }

    #[test]
    fn test_pronouns_whole_word_case_insensitive() {
        let out = substitute_pronouns("What is YOUR population and where are you?", &bryan());
        assert_eq!(out, "What is Bryan County's population and where are Bryan County?");
    }

    #[test]
    fn test_pronouns_leave_larger_words_alone() {
        let text = "Do it yourself, young youth; yours truly.";
        assert_eq!(substitute_pronouns(text, &bryan()), text);
    }

    #[test]
    fn test_pronouns_idempotent_without_tokens() {
        let text = "median household income 2021";
        let once = substitute_pronouns(text, &bryan());
        assert_eq!(once, text);
        assert_eq!(substitute_pronouns(&once, &bryan()), once);
    }

    #[test]
    fn test_replacement_text_is_literal() {
        let profile = DataSourceProfile {
            possessive_form: "$1 County's".into(),
            ..bryan()
        };
        assert_eq!(substitute_pronouns("your taxes", &profile), "$1 County's taxes");
    }

    #[test]
    fn test_site_filter_per_source_kind() {
        let registry = SourceRegistry::builtin();
        assert_eq!(
            apply_site_filter("parks", Some("savannah"), &registry),
            "site:savannahga.gov parks"
        );
        let all = apply_site_filter("parks", Some("all"), &registry);
        let composite = &registry.get("all").unwrap().domain_filter;
        assert_eq!(all, format!("{} parks", composite));
        assert_eq!(apply_site_filter("parks", Some("atlanta"), &registry), "parks");
        assert_eq!(apply_site_filter("parks", None, &registry), "parks");
    }

    #[test]
    fn test_every_single_site_source_gets_site_prefix() {
        let registry = SourceRegistry::builtin();
        for key in registry.keys() {
            let profile = registry.get(key).unwrap();
            if profile.is_composite() {
                continue;
            }
            let out = apply_site_filter("q", Some(key), &registry);
            assert!(out.starts_with(&format!("site:{} ", profile.domain_filter)));
        }
    }

    #[test]
    fn test_preprocess_pipeline() {
        let registry = SourceRegistry::builtin();
        let q = preprocess(
            "What is your unemployment rate? [INSTRUCTIONS] be brief",
            Some("bryancounty"),
            &registry,
        );
        assert_eq!(q.base, "What is Bryan County's unemployment rate?");
        assert_eq!(
            q.filtered,
            "site:bryancountyga.org What is Bryan County's unemployment rate?"
        );

        let q = preprocess("How are you?", Some("unknown"), &registry);
        assert_eq!(q.base, "How are you?");
        assert_eq!(q.filtered, "How are you?");
    }

    #[test]
    fn test_latest_user_message_skips_assistant() {
        let messages = vec![
            ChatMessage::system("sys"),
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
            ChatMessage::assistant("reply 2"),
        ];
        assert_eq!(latest_user_message(&messages), Some("second"));
        assert_eq!(latest_user_message(&[ChatMessage::system("s")]), None);
    }
}

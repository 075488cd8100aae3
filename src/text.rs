//! Best-effort text extraction and summarization.
//!
//! Feed descriptions arrive as HTML fragments of wildly varying quality.
//! [`extract_text`] flattens a fragment to its visible text and
//! [`summarize`] condenses that text into a bounded-length snippet,
//! preferring whole sentences over mid-sentence cuts.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};

/// Tags whose entire subtree carries no visible text.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "svg", "head"];

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Flatten an HTML fragment into its visible text.
///
/// Text segments are trimmed and joined with single spaces in document
/// order. Content inside [`SKIP_TAGS`] is excluded entirely, including
/// nested text. Malformed markup never reaches the caller; the html5ever
/// parser recovers from anything, so the worst case is an empty string.
pub fn extract_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut segments: Vec<String> = Vec::new();

    // Depth-first walk that skips whole subtrees of non-content tags.
    let mut stack: Vec<_> = fragment.tree.root().children().rev().collect();
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    segments.push(trimmed.to_string());
                }
            }
            Node::Element(element) => {
                if !SKIP_TAGS.contains(&element.name()) {
                    stack.extend(node.children().rev());
                }
            }
            _ => {}
        }
    }

    segments.join(" ")
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Condense text into a snippet of at most `max_chars` characters.
///
/// Sentences (split on `.`/`!`/`?` followed by whitespace) are accumulated
/// until appending the next one would exceed the budget. If not even the
/// first sentence fits, the text is hard-truncated instead, so the bound
/// holds for every input. Empty input yields empty output.
pub fn summarize(text: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() || max_chars == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut out_chars = 0usize;
    for sentence in split_sentences(&collapsed) {
        let sentence_chars = sentence.chars().count();
        let needed = if out.is_empty() {
            sentence_chars
        } else {
            out_chars + 1 + sentence_chars
        };
        if needed > max_chars {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(sentence);
        out_chars = needed;
    }

    if out.is_empty() {
        out = collapsed.chars().take(max_chars).collect();
    }
    out.trim_end().to_string()
}

/// Truncate to at most `max_chars` characters, marking the cut with an
/// ellipsis. Used for market-news summaries where sentence boundaries do
/// not matter.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }
    let mut out: String = collapsed
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect();
    out = out.trim_end().to_string();
    out.push('…');
    out
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    for boundary in SENTENCE_END_RE.find_iter(text) {
        // Boundary punctuation is a single ASCII byte; keep it.
        sentences.push(&text[start..boundary.start() + 1]);
        start = boundary.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_skips_script_content() {
        assert_eq!(extract_text("<script>ignored</script>visible"), "visible");
    }

    #[test]
    fn test_extract_skips_nested_content() {
        let html = "<div>before<style>p { color: red; }<span>deep</span></style>after</div>";
        assert_eq!(extract_text(html), "before after");
    }

    #[test]
    fn test_extract_joins_segments_in_document_order() {
        let html = "<p>First paragraph.</p><p>Second <b>bold</b> word.</p>";
        assert_eq!(extract_text(html), "First paragraph. Second bold word.");
    }

    #[test]
    fn test_extract_malformed_markup_does_not_panic() {
        assert_eq!(extract_text("<div><p>unclosed"), "unclosed");
        assert_eq!(extract_text("<"), "");
        assert_eq!(extract_text(""), "");
    }

    #[test]
    fn test_extract_plain_text_passes_through() {
        assert_eq!(extract_text("just text"), "just text");
    }

    #[test]
    fn test_summarize_prefers_sentence_boundaries() {
        // Budget fits exactly "A. B." so the third sentence is dropped
        // whole instead of being cut mid-sentence.
        assert_eq!(summarize("A. B. C.", 5), "A. B.");
    }

    #[test]
    fn test_summarize_respects_bound_for_all_budgets() {
        let text = "The quick brown fox jumps over the lazy dog. Again! And again? Done.";
        for budget in 0..=text.len() + 5 {
            let out = summarize(text, budget);
            assert!(
                out.chars().count() <= budget,
                "budget {budget} violated: {out:?}"
            );
        }
    }

    #[test]
    fn test_summarize_hard_truncates_oversized_first_sentence() {
        let out = summarize("no sentence boundary here at all", 10);
        assert_eq!(out.chars().count(), 10);
        assert_eq!(out, "no sentenc");
    }

    #[test]
    fn test_summarize_collapses_whitespace() {
        assert_eq!(summarize("One  two\n\tthree. Four.", 20), "One two three. Four.");
    }

    #[test]
    fn test_summarize_empty_input() {
        assert_eq!(summarize("", 200), "");
        assert_eq!(summarize("   \n ", 200), "");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 180), "short");

        let long = "x".repeat(200);
        let out = truncate_with_ellipsis(&long, 180);
        assert_eq!(out.chars().count(), 180);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_split_sentences_on_boundary_punctuation() {
        assert_eq!(
            split_sentences("One. Two! Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
    }

    #[test]
    fn test_split_sentences_no_trailing_whitespace_needed() {
        // Punctuation not followed by whitespace is not a boundary.
        assert_eq!(split_sentences("v1.2 released"), vec!["v1.2 released"]);
    }
}

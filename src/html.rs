//! Markup detection and stripping for translation source text.

use regex::Regex;
use std::sync::OnceLock;

static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static STRIP_REGEX: OnceLock<Regex> = OnceLock::new();

fn tag_regex() -> &'static Regex {
    TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag regex is valid"))
}

// Also matches empty `<>`, which detection ignores
fn strip_regex() -> &'static Regex {
    STRIP_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("strip regex is valid"))
}

/// Check whether `text` contains at least one markup tag
pub fn is_html(text: &str) -> bool {
    tag_regex().is_match(text)
}

/// Remove every markup tag from `text`, leaving the text between tags intact
pub fn strip_html_tags(text: &str) -> String {
    strip_regex().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_html_detects_tags() {
        assert!(is_html("<b>Hello</b>"));
        assert!(is_html("Click <a href=\"/x\">here</a>"));
        assert!(is_html("line<br/>break"));
    }

    #[test]
    fn test_is_html_plain_text() {
        assert!(!is_html("Hello"));
        assert!(!is_html("a < b"));
        assert!(!is_html("c > d"));
        assert!(!is_html("<>"));
        assert!(!is_html(""));
    }

    #[test]
    fn test_comparison_operators_read_as_a_tag() {
        // Anything between `<` and a later `>` counts as markup
        assert!(is_html("a < b and c > d"));
        assert_eq!(strip_html_tags("a < b and c > d"), "a  d");
    }

    #[test]
    fn test_strip_html_tags_removes_empty_brackets() {
        assert_eq!(strip_html_tags("<b>Hi</b><>"), "Hi");
        assert_eq!(strip_html_tags("<>"), "");
    }

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(strip_html_tags("<b>Hello</b>"), "Hello");
        assert_eq!(
            strip_html_tags("<p>Save <em>and</em> close</p>"),
            "Save and close"
        );
        assert_eq!(strip_html_tags("  <div> Hi </div>  "), "   Hi   ");
    }

    #[test]
    fn test_strip_html_tags_without_markup() {
        assert_eq!(strip_html_tags("No markup here"), "No markup here");
    }

    proptest! {
        #[test]
        fn stripped_text_has_no_tags(s in "[a-z <>/=\"]{0,64}") {
            prop_assert!(!is_html(&strip_html_tags(&s)));
        }

        #[test]
        fn text_without_angle_brackets_is_untouched(s in "[^<>]{0,64}") {
            prop_assert!(!is_html(&s));
            prop_assert_eq!(strip_html_tags(&s), s);
        }
    }
}

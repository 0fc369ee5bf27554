//! Word-boundary phrase matching for free-text case fields.
//!
//! Delay reasons, passenger notes and conversation turns are matched against
//! configured keyword lists. Matching is case-insensitive and works on whole
//! words, so "around" does not fire on "surrounding" and "strike" does not
//! fire on "strikethrough".

/// Split text into lowercase words.
///
/// Apostrophes stay inside words so "don't" is a single token; typographic
/// apostrophes are folded to ASCII.
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|w| w.trim_matches(|c| c == '\'' || c == '\u{2019}'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase().replace('\u{2019}', "'"))
        .collect()
}

/// True when the word sequence `needle` occurs contiguously in `haystack`.
pub fn contains_words(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// True when `phrase` occurs in `text` on word boundaries.
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    contains_words(&words(text), &words(phrase))
}

/// The phrases from `phrases` that occur in `text`, in list order.
pub fn matching_phrases<'a>(text: &str, phrases: &'a [String]) -> Vec<&'a str> {
    let haystack = words(text);
    phrases
        .iter()
        .filter(|p| contains_words(&haystack, &words(p)))
        .map(|p| p.as_str())
        .collect()
}

/// True when any phrase from `phrases` occurs in `text`.
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    let haystack = words(text);
    phrases.iter().any(|p| contains_words(&haystack, &words(p)))
}

/// Split text into trimmed, non-empty clauses at punctuation. A full stop
/// between two digits is a decimal point, not a boundary.
pub fn clauses(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);
        let boundary = match c {
            ',' | ';' | '!' | '?' | '\n' => true,
            '.' => {
                !(prev.is_some_and(|p| p.is_ascii_digit())
                    && next.is_some_and(|n| n.is_ascii_digit()))
            }
            _ => false,
        };
        if boundary {
            out.push(&text[start..i]);
            start = i + c.len_utf8();
        }
        prev = Some(c);
    }
    out.push(&text[start..]);
    out.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Hours stated in clauses that also contain one of `cues`.
///
/// "We landed 5 hours late. The flight is 2 hours normally." yields only 5.0.
pub fn delay_hours_mentioned(text: &str, cues: &[String]) -> Vec<f64> {
    clauses(text)
        .into_iter()
        .filter(|clause| contains_any(clause, cues))
        .flat_map(hours_mentioned)
        .collect()
}

/// Durations stated in hours, e.g. "5 hours", "2.5h", "a 3-hour delay".
pub fn hours_mentioned(text: &str) -> Vec<f64> {
    let tokens: Vec<String> = text
        .split(|c: char| c.is_whitespace() || c == '-')
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric() && c != '.')
                .trim_end_matches('.')
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect();

    let mut hours = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        let digits_end = token
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(token.len());
        if digits_end == 0 {
            continue;
        }
        let Ok(value) = token[..digits_end].parse::<f64>() else {
            continue;
        };
        let unit = if digits_end < token.len() {
            &token[digits_end..]
        } else {
            tokens.get(i + 1).map(String::as_str).unwrap_or("")
        };
        if matches!(unit, "h" | "hr" | "hrs" | "hour" | "hours") {
            hours.push(value);
        }
    }
    hours
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn words_lowercase_and_split_punctuation() {
        assert_eq!(
            words("Operational Reasons, apparently!"),
            vec!["operational", "reasons", "apparently"]
        );
    }

    #[test]
    fn words_keep_apostrophes() {
        assert_eq!(words("I don\u{2019}t remember"), vec!["i", "don't", "remember"]);
    }

    #[test]
    fn phrase_respects_word_boundaries() {
        assert!(contains_phrase("it was around 5", "around"));
        assert!(!contains_phrase("the surrounding area", "around"));
        assert!(contains_phrase("Bird strike on approach", "bird strike"));
        assert!(!contains_phrase("strike", "bird strike"));
    }

    #[test]
    fn empty_phrase_never_matches() {
        assert!(!contains_phrase("anything", ""));
        assert!(!contains_phrase("", "anything"));
    }

    #[test]
    fn matching_phrases_in_list_order() {
        let phrases = list(&["weather", "strike", "security"]);
        assert_eq!(
            matching_phrases("security queue and a strike", &phrases),
            vec!["strike", "security"]
        );
    }

    #[test]
    fn contains_any_hyphenated_phrase() {
        let phrases = list(&["code-share"]);
        assert!(contains_any("this is a code share flight", &phrases));
    }

    #[test]
    fn hours_in_various_forms() {
        assert_eq!(hours_mentioned("The delay was 5 hours."), vec![5.0]);
        assert_eq!(hours_mentioned("maybe 2.5h, not 3 hrs"), vec![2.5, 3.0]);
        assert_eq!(hours_mentioned("a 3-hour wait"), vec![3.0]);
    }

    #[test]
    fn clauses_keep_decimals_whole() {
        assert_eq!(
            clauses("Stuck for 5.5 hours. Then, finally, we left!"),
            vec!["Stuck for 5.5 hours", "Then", "finally", "we left"]
        );
        assert!(clauses(" ,. ").is_empty());
    }

    #[test]
    fn delay_hours_only_from_delay_clauses() {
        let cues = list(&["late", "delayed", "wait"]);
        assert_eq!(
            delay_hours_mentioned(
                "We landed 5 hours late. The flight itself is only 2 hours normally.",
                &cues
            ),
            vec![5.0]
        );
        assert_eq!(delay_hours_mentioned("a 3-hour wait", &cues), vec![3.0]);
        assert!(delay_hours_mentioned("a 9 hour layover in Calgary", &cues).is_empty());
    }

    #[test]
    fn hours_ignores_other_numbers() {
        assert!(hours_mentioned("Flight AC123 at gate 42").is_empty());
        assert!(hours_mentioned("waited 40 minutes").is_empty());
    }
}

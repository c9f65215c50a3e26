//! Text normalisation shared by the classifier, handlers and local validators.

/// Lowercases and replaces every non-alphanumeric character with a single space.
/// The result is padded with one leading and trailing space so whole-word checks
/// can be written as `contains(" word ")`.
pub fn normalize_text(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len() + 2);
    normalized.push(' ');
    let mut last_was_space = true;
    for character in text.chars().flat_map(char::to_lowercase) {
        if character.is_alphanumeric() {
            normalized.push(character);
            last_was_space = false;
        } else if !last_was_space {
            normalized.push(' ');
            last_was_space = true;
        }
    }
    if !last_was_space {
        normalized.push(' ');
    }
    normalized
}

pub fn tokenize(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}

/// Matches a keyword against normalized text. A trailing `*` marks a stem that may
/// be followed by more letters (`recommend*` matches "recommendations").
pub fn matches_keyword(normalized: &str, keyword: &str) -> bool {
    match keyword.strip_suffix('*') {
        Some(stem) => normalized.contains(&format!(" {stem}")),
        None => normalized.contains(&format!(" {keyword} ")),
    }
}

pub fn count_keywords(normalized: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|keyword| matches_keyword(normalized, keyword)).count()
}

/// Digits, decimal points and signs of every number in `text`, in order.
pub fn numbers_in(text: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut current = String::new();
    for character in text.chars() {
        if character.is_ascii_digit() || (character == '.' && !current.is_empty()) {
            current.push(character);
        } else if character == ',' && !current.is_empty() {
            continue;
        } else if !current.is_empty() {
            numbers.push(current.trim_end_matches('.').to_owned());
            current.clear();
        }
    }
    if !current.is_empty() {
        numbers.push(current.trim_end_matches('.').to_owned());
    }
    numbers
}

#[cfg(test)]
mod tests {
    use super::{matches_keyword, normalize_text, numbers_in, tokenize};

    #[test]
    fn normalization_pads_and_collapses_punctuation() {
        let normalized = normalize_text("What's   the % of Korean-content?");
        assert_eq!(normalized, " what s the of korean content ");
        assert_eq!(tokenize(&normalized).len(), 6);
    }

    #[test]
    fn keywords_match_whole_words_or_stems() {
        let normalized = normalize_text("Any recommendations for a planet documentary?");
        assert!(matches_keyword(&normalized, "recommend*"));
        assert!(!matches_keyword(&normalized, "plan"));
        assert!(matches_keyword(&normalized, "planet"));
    }

    #[test]
    fn numbers_are_extracted_with_decimals_and_grouping() {
        assert_eq!(numbers_in("20.5% of 1,000 titles."), vec!["20.5", "1000"]);
        assert!(numbers_in("no digits here").is_empty());
    }
}

//! Tokenization shared by both BM25 levels: split camelCase/PascalCase
//! boundaries first, lowercase, then split on punctuation. Short tokens are
//! dropped but duplicates are kept, since term frequency is what BM25 scores.

fn split_case_boundaries(word: &str) -> Vec<String> {
    let mut components = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = word.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && !current.is_empty() {
            let current_has_lower = current.chars().any(|ch| ch.is_lowercase());
            let next_is_lower = chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if current_has_lower || next_is_lower {
                components.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        components.push(current);
    }
    components
}

fn is_separator(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\n' | '\r' | '_' | '-' | '.' | '/' | '\\' | ':' | ';' | ',' | '(' | ')' | '[' | ']' | '{' | '}'
    )
}

/// Split on `[\s_\-./\\:;,()\[\]{}]+`, then split each run further on
/// camelCase/PascalCase boundaries, lowercase, and drop tokens shorter than
/// two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for run in text.split(is_separator).filter(|s| !s.is_empty()) {
        for piece in split_case_boundaries(run) {
            let lower = piece.to_lowercase();
            if lower.chars().count() >= 2 {
                tokens.push(lower);
            }
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case_and_lowercases() {
        assert_eq!(tokenize("ReadsFromTable"), vec!["reads", "from", "table"]);
    }

    #[test]
    fn splits_on_punctuation() {
        assert_eq!(tokenize("pipeline:wf_Load_Customers"), vec!["pipeline", "wf", "load", "customers"]);
    }

    #[test]
    fn drops_single_character_tokens() {
        assert_eq!(tokenize("a bb c"), vec!["bb"]);
    }

    #[test]
    fn preserves_duplicate_tokens() {
        assert_eq!(tokenize("table table"), vec!["table", "table"]);
    }

    #[test]
    fn keeps_acronym_as_single_token() {
        assert_eq!(tokenize("SQLQuery"), vec!["sql", "query"]);
    }
}

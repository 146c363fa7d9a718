use crate::analysis::token::Token;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Splits on runs of whitespace
#[derive(Clone, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace()
            .map(|word| Token::new(word.to_string()))
            .collect()
    }
}

/// Lowercase `text` and squeeze every run of spaces or tabs to its first
/// character. Line breaks are kept as-is.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for c in text.chars() {
        let squeezable = c.is_whitespace() && c != '\n' && c != '\r';
        if squeezable {
            if !in_run {
                out.push(c);
            }
            in_run = true;
        } else {
            in_run = false;
            out.push(c);
        }
    }

    out.to_lowercase()
}

// src/encoder.rs
// Text to Morse token encoder

use crate::symbols::{self, CLOSING_SIGNAL, Mark, Symbol};
use std::io::Read;

/// Intermediate representation between encoding and synthesis.
///
/// Durations are not stored here; they come from the timing model. The gap
/// between two marks of the same letter is never a token, the synthesizer
/// infers it from adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Dot,
    Dash,
    LetterGap,
    WordGap,
}

impl Token {
    pub fn is_mark(self) -> bool {
        matches!(self, Token::Dot | Token::Dash)
    }
}

impl From<Mark> for Token {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::Dot => Token::Dot,
            Mark::Dash => Token::Dash,
        }
    }
}

/// Incremental encoder. Feed characters with [`Encoder::push`], then call
/// [`Encoder::finish`] to append the closing signal.
#[derive(Debug, Default)]
pub struct Encoder {
    tokens: Vec<Token>,
    skipped: usize,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ch: char) {
        match symbols::lookup(ch) {
            Some(Symbol::Letter(marks)) => self.push_letter(marks),
            Some(Symbol::WordSeparator) => self.push_word_gap(),
            None => self.skipped += 1,
        }
    }

    pub fn push_str(&mut self, text: &str) {
        text.chars().for_each(|ch| self.push(ch));
    }

    /// Number of input characters dropped so far because the table has no entry.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(mut self) -> Vec<Token> {
        if self.skipped > 0 {
            log::debug!("Skipped {} unmapped input characters", self.skipped);
        }
        // A trailing separator doubles as the gap before the closing signal.
        if self.tokens.last() != Some(&Token::WordGap) {
            self.tokens.push(Token::WordGap);
        }
        self.tokens.extend(CLOSING_SIGNAL.iter().copied().map(Token::from));
        self.tokens
    }

    fn push_letter(&mut self, marks: &[Mark]) {
        if self.tokens.last().is_some_and(|t| t.is_mark()) {
            self.tokens.push(Token::LetterGap);
        }
        self.tokens.extend(marks.iter().copied().map(Token::from));
    }

    fn push_word_gap(&mut self) {
        self.tokens.push(Token::WordGap);
    }
}

/// Encodes a complete message, closing signal included.
pub fn encode(text: &str) -> Vec<Token> {
    let mut encoder = Encoder::new();
    encoder.push_str(text);
    encoder.finish()
}

/// Encodes everything readable from `reader`. Invalid UTF-8 decodes to
/// replacement characters, which the table does not map.
pub fn encode_reader<R: Read>(mut reader: R) -> std::io::Result<Vec<Token>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(encode(&String::from_utf8_lossy(&bytes)))
}

/// Dot/dash text of a token sequence, letters separated by a space and words by ` / `.
pub fn preview(tokens: &[Token]) -> String {
    let mut out = String::with_capacity(tokens.len() * 2);
    for token in tokens {
        match token {
            Token::Dot => out.push('.'),
            Token::Dash => out.push('-'),
            Token::LetterGap => out.push(' '),
            Token::WordGap => out.push_str(" / "),
        }
    }
    out.trim().to_string()
}

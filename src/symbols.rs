// src/symbols.rs
// International Morse Code symbol table

/// A single keyed element inside a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Dot,
    Dash,
}

impl Mark {
    /// Length of the mark in dit units.
    pub fn units(self) -> u32 {
        match self {
            Mark::Dot => 1,
            Mark::Dash => 3,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Mark::Dot => '.',
            Mark::Dash => '-',
        }
    }
}

/// What an input character maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Letter(&'static [Mark]),
    WordSeparator,
}

use Mark::{Dash, Dot};

/// End-of-message procedural signal appended after every message body.
pub const CLOSING_SIGNAL: &[Mark] = &[Dash, Dot, Dash, Dot, Dash];

/// Every character the table knows about, in table order.
pub const SUPPORTED: &str = "abcdefghijklmnopqrstuvwxyz0123456789+-, ";

/// Looks up a character, ignoring case. Unsupported characters return `None`.
pub fn lookup(ch: char) -> Option<Symbol> {
    let marks: &'static [Mark] = match ch.to_ascii_lowercase() {
        'a' => &[Dot, Dash],
        'b' => &[Dash, Dot, Dot, Dot],
        'c' => &[Dash, Dot, Dash, Dot],
        'd' => &[Dash, Dot, Dot],
        'e' => &[Dot],
        'f' => &[Dot, Dot, Dash, Dot],
        'g' => &[Dash, Dash, Dot],
        'h' => &[Dot, Dot, Dot, Dot],
        'i' => &[Dot, Dot],
        'j' => &[Dot, Dash, Dash, Dash],
        'k' => &[Dash, Dot, Dash],
        'l' => &[Dot, Dash, Dot, Dot],
        'm' => &[Dash, Dash],
        'n' => &[Dash, Dot],
        'o' => &[Dash, Dash, Dash],
        'p' => &[Dot, Dash, Dash, Dot],
        'q' => &[Dash, Dash, Dot, Dash],
        'r' => &[Dot, Dash, Dot],
        's' => &[Dot, Dot, Dot],
        't' => &[Dash],
        'u' => &[Dot, Dot, Dash],
        'v' => &[Dot, Dot, Dot, Dash],
        'w' => &[Dot, Dash, Dash],
        'x' => &[Dash, Dot, Dot, Dash],
        'y' => &[Dash, Dot, Dash, Dash],
        'z' => &[Dash, Dash, Dot, Dot],
        '0' => &[Dash, Dash, Dash, Dash, Dash],
        '1' => &[Dot, Dash, Dash, Dash, Dash],
        '2' => &[Dot, Dot, Dash, Dash, Dash],
        '3' => &[Dot, Dot, Dot, Dash, Dash],
        '4' => &[Dot, Dot, Dot, Dot, Dash],
        '5' => &[Dot, Dot, Dot, Dot, Dot],
        '6' => &[Dash, Dot, Dot, Dot, Dot],
        '7' => &[Dash, Dash, Dot, Dot, Dot],
        '8' => &[Dash, Dash, Dash, Dot, Dot],
        '9' => &[Dash, Dash, Dash, Dash, Dot],
        '+' => &[Dot, Dash, Dot, Dash, Dot],
        '-' => &[Dash, Dot, Dot, Dot, Dot, Dash],
        ',' => &[Dash, Dash, Dot, Dot, Dash, Dash],
        ' ' => return Some(Symbol::WordSeparator),
        _ => return None,
    };
    Some(Symbol::Letter(marks))
}

/// Reverse lookup from a mark pattern to its (lowercase) character.
pub fn char_for(marks: &[Mark]) -> Option<char> {
    SUPPORTED
        .chars()
        .find(|&ch| matches!(lookup(ch), Some(Symbol::Letter(m)) if m == marks))
}

/// Renders marks as the familiar `.`/`-` text.
pub fn pattern_string(marks: &[Mark]) -> String {
    marks.iter().map(|m| m.as_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup('S'), lookup('s'));
        assert_eq!(lookup('Q'), Some(Symbol::Letter(&[Dash, Dash, Dot, Dash])));
    }

    #[test]
    fn space_is_word_separator() {
        assert_eq!(lookup(' '), Some(Symbol::WordSeparator));
    }

    #[test]
    fn unsupported_characters_miss() {
        for ch in ['?', '.', '\n', '\t', '/', 'é', '\0'] {
            assert_eq!(lookup(ch), None, "{ch:?} should not be in the table");
        }
    }

    #[test]
    fn table_is_bijective() {
        let mut seen = HashSet::new();
        for ch in SUPPORTED.chars().filter(|&c| c != ' ') {
            let Some(Symbol::Letter(marks)) = lookup(ch) else {
                panic!("{ch:?} missing from table");
            };
            assert!(seen.insert(marks), "duplicate pattern for {ch:?}");
            assert_eq!(char_for(marks), Some(ch));
        }
        assert_eq!(seen.len(), 39);
    }

    #[test]
    fn pattern_strings() {
        assert_eq!(pattern_string(CLOSING_SIGNAL), "-.-.-");
        let Some(Symbol::Letter(comma)) = lookup(',') else {
            panic!("comma missing from table");
        };
        assert_eq!(pattern_string(comma), "--..--");
    }
}

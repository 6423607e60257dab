//! Tagged input sentences with span constraints.

use crate::error::ParseError;
use ccg_core::category::is_punctuation_symbol;
use serde::{Deserialize, Serialize};

/// Sentence type, which decides the admissible root categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Declarative,
    Interrogative,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub word: String,
    pub tag: String,
}

impl Token {
    pub fn new(word: &str, tag: &str) -> Self {
        Self {
            word: word.to_string(),
            tag: tag.to_string(),
        }
    }

    pub fn is_punctuation(&self) -> bool {
        is_punctuation_symbol(&self.tag)
    }
}

/// Inclusive token span `[start, end]`.
pub type Span = (usize, usize);

/// A part-of-speech tagged sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    pub mood: Mood,
    /// No chart span may cross one of these.
    pub brackets: Vec<Span>,
    /// No chart span may partially overlap one of these.
    pub entities: Vec<Span>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        let mood = infer_mood(&tokens);
        Self {
            tokens,
            mood,
            brackets: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Parse `"word/TAG word/TAG ..."`.
    ///
    /// The tag is whatever follows the last slash, so words may contain
    /// slashes themselves.
    pub fn from_tagged(text: &str) -> Result<Self, ParseError> {
        let tokens = text
            .split_whitespace()
            .map(|raw| match raw.rsplit_once('/') {
                Some((word, tag)) if !word.is_empty() && !tag.is_empty() => {
                    Ok(Token::new(word, tag))
                }
                _ => Err(ParseError::MalformedToken {
                    token: raw.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(tokens))
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = mood;
        self
    }

    pub fn with_brackets(mut self, brackets: Vec<Span>) -> Self {
        self.brackets = brackets;
        self
    }

    pub fn with_entities(mut self, entities: Vec<Span>) -> Self {
        self.entities = entities;
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|t| t.tag.as_str())
    }

    /// Check that every bracket and entity lies inside the sentence.
    pub fn validate_spans(&self) -> Result<(), ParseError> {
        let len = self.tokens.len();
        match self
            .brackets
            .iter()
            .chain(&self.entities)
            .find(|&&(start, end)| start > end || end >= len)
        {
            Some(&(start, end)) => Err(ParseError::InvalidSpan { start, end, len }),
            None => Ok(()),
        }
    }

    /// The sentence with punctuation tokens removed and constraint spans
    /// remapped onto the remaining positions. Spans outside the sentence
    /// are dropped.
    pub fn without_punctuation(&self) -> Sentence {
        let mut position = Vec::with_capacity(self.tokens.len());
        let mut kept = Vec::new();
        for token in &self.tokens {
            position.push(kept.len());
            if !token.is_punctuation() {
                kept.push(token.clone());
            }
        }

        let remap = |spans: &[Span]| -> Vec<Span> {
            spans
                .iter()
                .filter_map(|&(start, end)| {
                    let tokens = self.tokens.get(start..=end)?;
                    let first = tokens.iter().position(|t| !t.is_punctuation())?;
                    let last = tokens.iter().rposition(|t| !t.is_punctuation())?;
                    Some((position[start + first], position[start + last]))
                })
                .collect()
        };

        Sentence {
            brackets: remap(&self.brackets),
            entities: remap(&self.entities),
            tokens: kept,
            mood: self.mood,
        }
    }

    /// Whether the span `[start, end]` respects every bracket and entity.
    pub fn span_allowed(&self, start: usize, end: usize) -> bool {
        let crosses_bracket = self
            .brackets
            .iter()
            .any(|&(a, b)| crosses((start, end), (a, b)));
        let splits_entity = self.entities.iter().any(|&(a, b)| {
            let overlaps = start <= b && a <= end;
            let contains = start <= a && b <= end;
            let inside = a <= start && end <= b;
            overlaps && !contains && !inside
        });
        !crosses_bracket && !splits_entity
    }
}

/// Two spans overlap without either containing the other.
fn crosses((i, j): Span, (a, b): Span) -> bool {
    (i < a && a <= j && j < b) || (a < i && i <= b && b < j)
}

fn infer_mood(tokens: &[Token]) -> Mood {
    match tokens.last().map(|t| t.word.as_str()) {
        Some("?") => Mood::Interrogative,
        Some(".") | Some("!") => Mood::Declarative,
        _ => Mood::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tagged() {
        let s = Sentence::from_tagged("the/DT cat/NN sleeps/VBZ ./.").unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(s.tokens[1], Token::new("cat", "NN"));
        assert_eq!(s.mood, Mood::Declarative);

        let q = Sentence::from_tagged("who/WP sleeps/VBZ ?/.").unwrap();
        assert_eq!(q.mood, Mood::Interrogative);

        let slashed = Sentence::from_tagged("and/or/CC").unwrap();
        assert_eq!(slashed.tokens[0].word, "and/or");
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            Sentence::from_tagged("the/DT cat"),
            Err(ParseError::MalformedToken { token }) if token == "cat"
        ));
    }

    #[test]
    fn test_brackets_forbid_crossing_spans() {
        let s = Sentence::from_tagged("a/DT b/NN c/VB d/NN")
            .unwrap()
            .with_brackets(vec![(1, 2)]);
        assert!(s.span_allowed(1, 2));
        assert!(s.span_allowed(0, 3));
        assert!(s.span_allowed(1, 1));
        assert!(!s.span_allowed(0, 1));
        assert!(!s.span_allowed(2, 3));
    }

    #[test]
    fn test_entities_forbid_partial_overlap() {
        let s = Sentence::from_tagged("New/NNP York/NNP City/NNP hums/VBZ")
            .unwrap()
            .with_entities(vec![(0, 2)]);
        assert!(s.span_allowed(0, 2));
        assert!(s.span_allowed(0, 3));
        assert!(s.span_allowed(1, 2));
        assert!(!s.span_allowed(2, 3));
    }

    #[test]
    fn test_without_punctuation_remaps_spans() {
        let s = Sentence::from_tagged("a/DT ,/, b/NN c/NN ./.")
            .unwrap()
            .with_brackets(vec![(1, 3)]);
        let stripped = s.without_punctuation();
        assert_eq!(stripped.len(), 3);
        assert_eq!(stripped.brackets, vec![(1, 2)]);
        assert_eq!(stripped.mood, Mood::Declarative);
    }

    #[test]
    fn test_out_of_range_spans() {
        let s = Sentence::from_tagged("a/DT ,/, b/NN")
            .unwrap()
            .with_brackets(vec![(1, 7)]);
        assert!(matches!(
            s.validate_spans(),
            Err(ParseError::InvalidSpan { start: 1, end: 7, len: 3 })
        ));
        assert!(s.without_punctuation().brackets.is_empty());

        let reversed = Sentence::from_tagged("a/DT b/NN")
            .unwrap()
            .with_entities(vec![(1, 0)]);
        assert!(reversed.validate_spans().is_err());
        assert!(reversed.without_punctuation().entities.is_empty());

        let fine = Sentence::from_tagged("a/DT b/NN")
            .unwrap()
            .with_brackets(vec![(0, 1)]);
        assert!(fine.validate_spans().is_ok());
    }
}

//! Recursive-descent parsing of category strings.
//!
//! The grammar is small:
//!
//! ```text
//! category := operand [ '[conj]' ]
//!           | operand ('/' | '\') category
//! operand  := '(' category ')' | atom
//! atom     := SYMBOL [ '[' FEATURE ']' ]
//! ```
//!
//! A trailing `[conj]` is stripped first; the first slash at bracket depth
//! zero then splits result from argument.

use crate::category::{Category, Direction, CONJ};
use crate::error::CategoryError;
use std::str::FromStr;

const CONJ_MARKER: &str = "[conj]";

impl FromStr for Category {
    type Err = CategoryError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse(text)
    }
}

/// Parse a category string such as `(S[dcl]\NP)/NP`.
pub fn parse(text: &str) -> Result<Category, CategoryError> {
    parse_inner(text.trim(), text)
}

fn parse_inner(text: &str, original: &str) -> Result<Category, CategoryError> {
    if text.is_empty() {
        return Err(CategoryError::malformed(original, "empty category"));
    }

    // The marker belongs to the whole category only when what precedes it is
    // one operand; in `S/NP[conj]` it belongs to the argument.
    if let Some(rest) = text.strip_suffix(CONJ_MARKER) {
        if !rest.is_empty() && (is_wrapped(rest) || split_point(rest, original)?.is_none()) {
            return Ok(parse_inner(rest, original)?.with_conj(true));
        }
    }

    if is_wrapped(text) {
        return parse_inner(&text[1..text.len() - 1], original);
    }

    match split_point(text, original)? {
        Some((index, direction)) => {
            let (left, right) = (&text[..index], &text[index + 1..]);
            if left.is_empty() || right.is_empty() {
                return Err(CategoryError::malformed(original, "slash without operand"));
            }
            let result = parse_inner(left, original)?;
            let argument = parse_inner(right, original)?;
            Ok(Category::complex(result, argument, direction))
        }
        None => parse_atom(text, original),
    }
}

/// Whether the outer parentheses enclose the whole string.
fn is_wrapped(text: &str) -> bool {
    if !text.starts_with('(') || !text.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i == text.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// Byte index of the first depth-zero slash.
fn split_point(text: &str, original: &str) -> Result<Option<(usize, Direction)>, CategoryError> {
    let mut depth: i32 = 0;
    let mut split = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(CategoryError::malformed(original, "unbalanced ')'"));
                }
            }
            '/' if depth == 0 && split.is_none() => split = Some((i, Direction::Forward)),
            '\\' if depth == 0 && split.is_none() => split = Some((i, Direction::Backward)),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(CategoryError::malformed(original, "unbalanced '('"));
    }
    Ok(split)
}

fn parse_atom(text: &str, original: &str) -> Result<Category, CategoryError> {
    let (symbol, feature) = match text.find('[') {
        Some(open) => {
            let rest = &text[open + 1..];
            let feature = rest
                .strip_suffix(']')
                .ok_or_else(|| CategoryError::malformed(original, "unterminated feature"))?;
            if feature.is_empty() || feature.contains(['[', ']']) {
                return Err(CategoryError::malformed(original, "bad feature"));
            }
            (&text[..open], Some(feature))
        }
        None => (text, None),
    };

    if symbol.is_empty() {
        return Err(CategoryError::malformed(original, "empty atom"));
    }
    if symbol.contains(['(', ')', ']', '/', '\\']) {
        return Err(CategoryError::malformed(
            original,
            format!("illegal character in atom '{}'", symbol),
        ));
    }
    if feature == Some(CONJ) {
        // `X[conj]` is handled before atoms are reached.
        return Err(CategoryError::malformed(original, "misplaced conj marker"));
    }

    Ok(match feature {
        Some(feature) => Category::atomic_with_feature(symbol, feature),
        None => Category::atomic(symbol),
    })
}

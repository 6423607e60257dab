//! Category proposals from adjacent tags.
//!
//! For a tag bigram `A B` where `B` is a content tag, `A` may modify `B`
//! (`X/X`) or take it as an argument (`R/X`), for every category `X`
//! already licensed for `B` and every `R` licensed for `A`. The backward
//! mirror applies to `B` when `A` is a content tag. Conjunction and
//! punctuation tags keep their seed categories and never receive proposals.

use crate::proposals::ProposalBuffer;
use crate::seed::SeedTags;
use ccg_core::Category;
use ccg_parser::{Grammar, ParseError, Sentence};

/// Add bigram proposals for every adjacent pair of tags in `sentence`.
pub fn propose_from_context(
    grammar: &Grammar,
    tags: &SeedTags,
    sentence: &Sentence,
    buffer: &mut ProposalBuffer,
) -> Result<(), ParseError> {
    for pair in sentence.tokens.windows(2) {
        let (a, b) = (&pair[0].tag, &pair[1].tag);
        if tags.is_function_tag(a) || tags.is_function_tag(b) {
            continue;
        }
        let left = grammar.lexical_categories(a)?;
        let right = grammar.lexical_categories(b)?;

        for x in content(&right) {
            buffer.propose(a, x.forward(x));
            for r in content(&left) {
                buffer.propose(a, r.forward(x));
            }
        }
        for x in content(&left) {
            buffer.propose(b, x.backward(x));
            for r in content(&right) {
                buffer.propose(b, r.backward(x));
            }
        }
    }
    Ok(())
}

/// Categories that can take part in a proposal.
fn content(categories: &[Category]) -> impl Iterator<Item = &Category> {
    categories
        .iter()
        .filter(|c| !(c.is_conjunction() || c.is_punctuation() || c.is_top()))
}

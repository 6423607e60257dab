//! Category proposals from partial parses.
//!
//! A lexical `X/Y` at position `i` followed by a constituent `Y` over
//! `[i+1, j]` and any constituent `Z` over `[j+1, k]` suggests that the
//! word also takes `Z`: propose `(X/Z)/Y` for its tag. Mirror image for a
//! lexical `X\Y` at position `k` preceded by `Y` over `[j+1, k-1]` and `Z`
//! over `[i, j]`, which proposes `(X\Z)\Y`.

use crate::proposals::ProposalBuffer;
use ccg_core::{CatId, Category, Direction, RuleType};
use ccg_parser::{Chart, Grammar, ParseError};
use std::collections::HashSet;

/// Add partial-parse proposals for every lexical functor in `chart`.
pub fn propose_from_chart(
    chart: &Chart,
    grammar: &Grammar,
    buffer: &mut ProposalBuffer,
) -> Result<(), ParseError> {
    let n = chart.len();
    let mut seen: HashSet<(usize, Category)> = HashSet::new();

    for item in chart.items() {
        if item.key.rule_type != RuleType::Lex {
            continue;
        }
        let position = item.key.start;
        let functor = grammar.category(item.key.category)?;
        let Some((result, argument, direction)) = functor.split() else {
            continue;
        };
        // an argument that was never interned labels no constituent
        let Some(argument_id) = grammar.categories().get(argument) else {
            continue;
        };

        let extras = match direction {
            Direction::Forward => forward_extras(chart, grammar, position, argument_id, n)?,
            Direction::Backward => backward_extras(chart, grammar, position, argument_id)?,
        };
        for z in extras {
            let proposal = match direction {
                Direction::Forward => result.forward(&z).forward(argument),
                Direction::Backward => result.backward(&z).backward(argument),
            };
            if seen.insert((position, proposal.clone())) {
                buffer.propose(&chart.tokens()[position].tag, proposal);
            }
        }
    }
    Ok(())
}

/// Categories `Z` over `[j+1, k]` for every `Y` over `[i+1, j]`.
fn forward_extras(
    chart: &Chart,
    grammar: &Grammar,
    i: usize,
    argument: CatId,
    n: usize,
) -> Result<Vec<Category>, ParseError> {
    let mut extras = Vec::new();
    for j in i + 1..n {
        if chart.cell(i + 1, j).with_category(argument).is_empty() {
            continue;
        }
        for k in j + 1..n {
            collect(chart, grammar, j + 1, k, &mut extras)?;
        }
    }
    Ok(extras)
}

/// Categories `Z` over `[i, j]` for every `Y` over `[j+1, k-1]`.
fn backward_extras(
    chart: &Chart,
    grammar: &Grammar,
    k: usize,
    argument: CatId,
) -> Result<Vec<Category>, ParseError> {
    let mut extras = Vec::new();
    for j in (0..k.saturating_sub(1)).rev() {
        if chart.cell(j + 1, k - 1).with_category(argument).is_empty() {
            continue;
        }
        for i in 0..=j {
            collect(chart, grammar, i, j, &mut extras)?;
        }
    }
    Ok(extras)
}

fn collect(
    chart: &Chart,
    grammar: &Grammar,
    start: usize,
    end: usize,
    out: &mut Vec<Category>,
) -> Result<(), ParseError> {
    for id in chart.cell(start, end).categories() {
        let category = grammar.category(id)?;
        if category.is_top() || category.is_punctuation() || category.is_conjunction() {
            continue;
        }
        if category.is_conj() {
            continue;
        }
        if !out.contains(&category) {
            out.push(category);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccg_parser::{Parser, ParserConfig, Sentence, UniformScorer};

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    fn chart(grammar: &Grammar, text: &str) -> Chart {
        let parser = Parser::new(ParserConfig::default()).unwrap();
        let sentence = Sentence::from_tagged(text).unwrap();
        parser.parse(grammar, &UniformScorer, &sentence).unwrap()
    }

    #[test]
    fn test_forward_functor_takes_extra_argument() {
        let grammar = Grammar::new(&ParserConfig::default()).unwrap();
        grammar.add_lexical("VB", &cat("S/N")).unwrap();
        grammar.add_lexical("NN", &cat("N")).unwrap();
        grammar.add_lexical("RP", &cat("P")).unwrap();

        // give/VB book/NN away/RP: S/N N P
        let chart = chart(&grammar, "give/VB book/NN away/RP");
        assert!(!chart.has_parse());

        let mut buffer = ProposalBuffer::new();
        propose_from_chart(&chart, &grammar, &mut buffer).unwrap();
        assert_eq!(buffer.count("VB", &cat("(S/P)/N")), 1);
        assert!(buffer.proposals("NN").next().is_none());
    }

    #[test]
    fn test_backward_functor_takes_extra_argument() {
        let grammar = Grammar::new(&ParserConfig::default()).unwrap();
        grammar.add_lexical("NNP", &cat("N")).unwrap();
        grammar.add_lexical("RB", &cat("P")).unwrap();
        grammar.add_lexical("VBZ", &cat("S\\P")).unwrap();

        // John/NNP quickly/RB runs/VBZ: N P S\P
        let chart = chart(&grammar, "John/NNP quickly/RB runs/VBZ");
        let mut buffer = ProposalBuffer::new();
        propose_from_chart(&chart, &grammar, &mut buffer).unwrap();
        assert_eq!(buffer.count("VBZ", &cat("(S\\N)\\P")), 1);
    }

    #[test]
    fn test_atoms_propose_nothing() {
        let grammar = Grammar::new(&ParserConfig::default()).unwrap();
        grammar.add_lexical("NN", &cat("N")).unwrap();
        let chart = chart(&grammar, "a/NN b/NN c/NN");
        let mut buffer = ProposalBuffer::new();
        propose_from_chart(&chart, &grammar, &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }
}

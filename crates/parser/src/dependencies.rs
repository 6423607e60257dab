//! Word-to-word dependencies of ranked derivations.

use crate::error::ParseError;
use crate::forest::{Chart, ItemId};
use crate::grammar::Grammar;
use ccg_core::derive::{derive_binary, derive_unary};
use ccg_core::{CoordinationStyle, DependencyEdge, DerivationContext, Rule, WorkingCategory};

/// Filled dependencies of derivation `rank` of `id`, ordered by head,
/// slot and argument position.
///
/// The rank must already have been produced by [`Chart::kbest`].
pub fn dependencies(
    chart: &Chart,
    grammar: &Grammar,
    id: ItemId,
    rank: usize,
    style: CoordinationStyle,
) -> Result<Vec<DependencyEdge>, ParseError> {
    let mut ctx = DerivationContext::new();
    let working = replay(chart, grammar, &mut ctx, id, rank, style)?;
    let mut edges = working.filled;
    edges.sort_by(|a, b| {
        (a.head_index, a.slot, a.arg_index).cmp(&(b.head_index, b.slot, b.arg_index))
    });
    edges.dedup();
    Ok(edges)
}

fn replay(
    chart: &Chart,
    grammar: &Grammar,
    ctx: &mut DerivationContext,
    id: ItemId,
    rank: usize,
    style: CoordinationStyle,
) -> Result<WorkingCategory, ParseError> {
    let derivation = chart.ranked(id, rank)?;
    let item = chart.item(id)?;
    let bp = *item
        .backpointers
        .get(derivation.backpointer)
        .ok_or(ParseError::UnknownItem { item: id.0 })?;
    let missing = ParseError::UnknownItem { item: id.0 };

    match bp.rule {
        Rule::Lexical { parent, .. } => {
            let index = item.key.start;
            let word = chart
                .tokens()
                .get(index)
                .map(|t| t.word.clone())
                .ok_or(missing)?;
            Ok(ctx.lexical(&word, &grammar.category(parent)?, index))
        }
        Rule::Unary {
            parent, rule_type, ..
        } => {
            let child_id = bp.left.ok_or(missing)?;
            let child = replay(chart, grammar, ctx, child_id, derivation.left_rank, style)?;
            Ok(derive_unary(ctx, rule_type, &child, &grammar.category(parent)?)?)
        }
        Rule::Binary {
            rule_type, arity, ..
        } => {
            let (left_id, right_id) = match (bp.left, bp.right) {
                (Some(l), Some(r)) => (l, r),
                _ => return Err(missing),
            };
            let left = replay(chart, grammar, ctx, left_id, derivation.left_rank, style)?;
            let right = replay(chart, grammar, ctx, right_id, derivation.right_rank, style)?;
            Ok(derive_binary(ctx, rule_type, arity, &left, &right, style)?)
        }
    }
}

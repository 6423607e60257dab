//! Inside and outside passes over a packed forest.
//!
//! The inside pass walks items in id order, which is bottom-up:
//!
//! ```text
//! alpha(p) = Σ_bp P(bp) · alpha(left) · alpha(right)
//! ```
//!
//! The outside pass runs the other way, from TOP down. It is the forest's
//! reverse-mode sweep: every parent pushes `beta(p) · P(bp) · alpha(sibling)`
//! into each child, and a child is expanded once all of its parents have
//! contributed.
//!
//! All values are logarithms and must stay probabilities; anything outside
//! `(0, 1]` is a fatal error.

use super::chart::Chart;
use super::item::ItemId;
use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::scorer::{ExpectedCounts, Scorer};
use ccg_prob::{log_add, log_sum, validate, LOG_ONE, LOG_ZERO};
use petgraph::graph::NodeIndex;
use petgraph::visit::Dfs;
use petgraph::Direction;
use std::collections::VecDeque;

/// Score every backpointer and fill `alpha` and the derivation counts.
pub fn inside<S: Scorer + ?Sized>(
    chart: &mut Chart,
    grammar: &Grammar,
    scorer: &S,
) -> Result<(), ParseError> {
    let items = chart.items_mut();
    for i in 0..items.len() {
        let (below, rest) = items.split_at_mut(i);
        let item = &mut rest[0];
        let parent = item.key.category;

        let child = |id: ItemId| {
            below
                .get(id.index())
                .map(|c| (c.alpha, c.derivations))
                .ok_or(ParseError::UnknownItem { item: id.0 })
        };

        let mut terms = Vec::with_capacity(item.backpointers.len());
        let mut derivations = 0.0;
        for bp in &mut item.backpointers {
            bp.log_prob = validate(scorer.probability(grammar, parent, &bp.rule)?)?;
            let mut term = bp.log_prob;
            let mut count = 1.0;
            for id in bp.children() {
                let (alpha, n) = child(id)?;
                term += alpha;
                count *= n;
            }
            terms.push(term);
            derivations += count;
        }

        item.alpha = validate(log_sum(terms))?;
        item.derivations = derivations;
    }
    Ok(())
}

/// Fill `beta` for every item below TOP. Requires [`inside`] first.
pub fn outside(chart: &mut Chart) -> Result<(), ParseError> {
    let Some(top) = chart.top() else {
        return Ok(());
    };

    let graph = chart.graph();
    let mut reachable = vec![false; graph.node_count()];
    let mut dfs = Dfs::new(&graph, NodeIndex::new(top.index()));
    while let Some(node) = dfs.next(&graph) {
        reachable[node.index()] = true;
    }

    // Outstanding parent contributions per item.
    let mut pending: Vec<usize> = graph
        .node_indices()
        .map(|node| {
            graph
                .neighbors_directed(node, Direction::Incoming)
                .filter(|p| reachable[p.index()])
                .count()
        })
        .collect();

    let items = chart.items_mut();
    for item in items.iter_mut() {
        item.beta = LOG_ZERO;
    }
    items[top.index()].beta = LOG_ONE;

    let mut queue = VecDeque::from([top]);
    while let Some(id) = queue.pop_front() {
        let beta = validate(items[id.index()].beta)?;
        items[id.index()].beta = beta;

        let backpointers = items[id.index()].backpointers.clone();
        for bp in backpointers {
            let (left, right) = (bp.left, bp.right);
            let alpha_of = |child: Option<ItemId>| child.map_or(LOG_ONE, |c| items[c.index()].alpha);
            let (left_alpha, right_alpha) = (alpha_of(left), alpha_of(right));

            for (child, sibling_alpha) in [(left, right_alpha), (right, left_alpha)] {
                let Some(child) = child else { continue };
                let target = &mut items[child.index()];
                target.beta = log_add(target.beta, beta + bp.log_prob + sibling_alpha);
                pending[child.index()] -= 1;
                if pending[child.index()] == 0 {
                    queue.push_back(child);
                }
            }
        }
    }
    Ok(())
}

/// Add every backpointer's posterior weight to `counts`.
///
/// The weight of a backpointer is `beta(p) · P(bp) · Π alpha(child) / alpha(TOP)`.
pub fn expected_counts<S: Scorer + ?Sized>(
    chart: &Chart,
    scorer: &S,
    counts: &mut ExpectedCounts,
) -> Result<(), ParseError> {
    let Some(top) = chart.top() else {
        return Ok(());
    };
    let items = chart.items();
    let z = items[top.index()].alpha;

    for item in items.iter().filter(|it| it.beta != LOG_ZERO) {
        for bp in &item.backpointers {
            let mut log_weight = item.beta + bp.log_prob - z;
            for child in bp.children() {
                log_weight += items[child.index()].alpha;
            }
            scorer.accumulate_counts(counts, item.key.category, &bp.rule, log_weight.exp())?;
        }
    }
    Ok(())
}

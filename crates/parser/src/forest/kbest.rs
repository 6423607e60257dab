//! Lazy k-best derivation extraction.
//!
//! Each item keeps a ranking: the derivations found so far in score order,
//! plus a frontier of candidates. A candidate is a backpointer together with
//! one rank per child. Popping the best candidate appends it to the ranking
//! and pushes its neighbours, formed by bumping one child's rank.
//!
//! Rankings live in a cache keyed by item, each behind its own lock. A
//! ranking only ever grows, so asking for rank `r - 1` after rank `r`
//! reads the cache.
//!
//! Locks are taken parent first and children only have smaller ids, so
//! concurrent callers cannot deadlock.

use super::chart::Chart;
use super::item::ItemId;
use crate::error::ParseError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

/// One ranked derivation of an item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    /// Log probability of the whole derivation.
    pub score: f64,
    /// Index into the item's backpointers.
    pub backpointer: usize,
    pub left_rank: usize,
    pub right_rank: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate(Derivation);

impl Candidate {
    fn signature(&self) -> (usize, usize, usize) {
        (self.0.backpointer, self.0.left_rank, self.0.right_rank)
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Higher score first; ties go to the earlier backpointer and lower ranks.
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .total_cmp(&other.0.score)
            .then_with(|| other.signature().cmp(&self.signature()))
    }
}

#[derive(Debug, Default)]
struct Ranking {
    ranked: Vec<Derivation>,
    frontier: BinaryHeap<Candidate>,
    seen: HashSet<(usize, usize, usize)>,
    seeded: bool,
}

impl Ranking {
    fn offer(&mut self, candidate: Derivation) {
        let candidate = Candidate(candidate);
        if self.seen.insert(candidate.signature()) {
            self.frontier.push(candidate);
        }
    }
}

/// Per-chart memo of item rankings.
#[derive(Debug, Default)]
pub struct KBestCache {
    rankings: Mutex<HashMap<ItemId, Arc<Mutex<Ranking>>>>,
}

impl KBestCache {
    fn ranking(&self, id: ItemId) -> Arc<Mutex<Ranking>> {
        self.rankings.lock().entry(id).or_default().clone()
    }

    fn cached(&self, id: ItemId) -> Option<Arc<Mutex<Ranking>>> {
        self.rankings.lock().get(&id).cloned()
    }
}

impl Chart {
    /// The best `k` derivations of `id`, best first. Fewer are returned
    /// when the item has fewer derivations.
    pub fn kbest(&self, id: ItemId, k: usize) -> Result<Vec<Derivation>, ParseError> {
        let ranking = self.kbest_cache().ranking(id);
        let mut ranking = ranking.lock();
        self.extend(id, &mut ranking, k)?;
        Ok(ranking.ranked.iter().take(k).copied().collect())
    }

    /// A derivation already produced by [`Chart::kbest`].
    pub fn ranked(&self, id: ItemId, rank: usize) -> Result<Derivation, ParseError> {
        let missing = ParseError::RankNotComputed { item: id.0, rank };
        let ranking = self.kbest_cache().cached(id).ok_or(missing.clone())?;
        let ranking = ranking.lock();
        ranking.ranked.get(rank).copied().ok_or(missing)
    }

    /// Derivation `rank` of `id`, computing it if needed.
    fn derivation_at(&self, id: ItemId, rank: usize) -> Result<Option<Derivation>, ParseError> {
        let ranking = self.kbest_cache().ranking(id);
        let mut ranking = ranking.lock();
        self.extend(id, &mut ranking, rank + 1)?;
        Ok(ranking.ranked.get(rank).copied())
    }

    /// Score of a candidate with the given child ranks, if every child has
    /// a derivation at that rank.
    fn candidate(
        &self,
        id: ItemId,
        backpointer: usize,
        left_rank: usize,
        right_rank: usize,
    ) -> Result<Option<Derivation>, ParseError> {
        let bp = self
            .item(id)?
            .backpointers
            .get(backpointer)
            .copied()
            .ok_or(ParseError::UnknownItem { item: id.0 })?;
        let mut score = bp.log_prob;
        if let Some(left) = bp.left {
            match self.derivation_at(left, left_rank)? {
                Some(d) => score += d.score,
                None => return Ok(None),
            }
        }
        if let Some(right) = bp.right {
            match self.derivation_at(right, right_rank)? {
                Some(d) => score += d.score,
                None => return Ok(None),
            }
        }
        Ok(Some(Derivation {
            score,
            backpointer,
            left_rank,
            right_rank,
        }))
    }

    fn extend(&self, id: ItemId, ranking: &mut Ranking, k: usize) -> Result<(), ParseError> {
        if !ranking.seeded {
            ranking.seeded = true;
            for b in 0..self.item(id)?.backpointers.len() {
                if let Some(candidate) = self.candidate(id, b, 0, 0)? {
                    ranking.offer(candidate);
                }
            }
        }

        while ranking.ranked.len() < k {
            let Some(Candidate(best)) = ranking.frontier.pop() else {
                break;
            };
            ranking.ranked.push(best);

            let bp = self.item(id)?.backpointers[best.backpointer];
            if bp.left.is_some() {
                if let Some(next) =
                    self.candidate(id, best.backpointer, best.left_rank + 1, best.right_rank)?
                {
                    ranking.offer(next);
                }
            }
            if bp.right.is_some() {
                if let Some(next) =
                    self.candidate(id, best.backpointer, best.left_rank, best.right_rank + 1)?
                {
                    ranking.offer(next);
                }
            }
        }
        Ok(())
    }
}

//! The packed forest of one sentence.

use super::item::{BackPointer, ChartItem, ItemId, ItemKey};
use super::kbest::KBestCache;
use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::sentence::{Mood, Sentence, Token};
use ccg_core::{CatId, SymbolId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All items over one span `[start, end]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cell {
    pub start: usize,
    pub end: usize,
    items: Vec<ItemId>,
    #[serde(skip)]
    by_category: HashMap<CatId, Vec<ItemId>>,
}

impl Cell {
    fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ..Self::default()
        }
    }

    fn push(&mut self, id: ItemId, category: CatId) {
        self.items.push(id);
        self.by_category.entry(category).or_default().push(id);
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Items with the given category, in creation order.
    pub fn with_category(&self, category: CatId) -> &[ItemId] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct categories in the cell.
    pub fn categories(&self) -> impl Iterator<Item = CatId> + '_ {
        self.by_category.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Chart of one sentence: cells, items and the TOP item.
#[derive(Debug, Serialize, Deserialize)]
pub struct Chart {
    tokens: Vec<Token>,
    words: Vec<SymbolId>,
    tags: Vec<SymbolId>,
    mood: Mood,
    /// Indexed by `start * n + end`.
    cells: Vec<Cell>,
    items: Vec<ChartItem>,
    top: Option<ItemId>,
    allowed: Vec<bool>,
    #[serde(skip)]
    keys: HashMap<ItemKey, ItemId>,
    #[serde(skip)]
    kbest: KBestCache,
}

impl Chart {
    pub fn new(sentence: &Sentence, grammar: &Grammar) -> Self {
        let n = sentence.len();
        let mut cells = Vec::with_capacity(n * n);
        let mut allowed = Vec::with_capacity(n * n);
        for start in 0..n {
            for end in 0..n {
                cells.push(Cell::new(start, end));
                allowed.push(start <= end && sentence.span_allowed(start, end));
            }
        }
        Self {
            words: sentence.tokens.iter().map(|t| grammar.word(&t.word)).collect(),
            tags: sentence.tokens.iter().map(|t| grammar.tag(&t.tag)).collect(),
            tokens: sentence.tokens.clone(),
            mood: sentence.mood,
            cells,
            items: Vec::new(),
            top: None,
            allowed,
            keys: HashMap::new(),
            kbest: KBestCache::default(),
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn word_ids(&self) -> &[SymbolId] {
        &self.words
    }

    pub fn tag_ids(&self) -> &[SymbolId] {
        &self.tags
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn cell(&self, start: usize, end: usize) -> &Cell {
        &self.cells[start * self.len() + end]
    }

    pub fn span_allowed(&self, start: usize, end: usize) -> bool {
        self.allowed
            .get(start * self.len() + end)
            .copied()
            .unwrap_or(false)
    }

    pub fn items(&self) -> &[ChartItem] {
        &self.items
    }

    pub(crate) fn items_mut(&mut self) -> &mut [ChartItem] {
        &mut self.items
    }

    pub fn item(&self, id: ItemId) -> Result<&ChartItem, ParseError> {
        self.items
            .get(id.index())
            .ok_or(ParseError::UnknownItem { item: id.0 })
    }

    pub fn top(&self) -> Option<ItemId> {
        self.top
    }

    pub(crate) fn set_top(&mut self, id: ItemId) {
        self.top = Some(id);
    }

    pub(crate) fn kbest_cache(&self) -> &KBestCache {
        &self.kbest
    }

    /// The item for `key`, created if missing. Returns whether it is new.
    pub fn add_item(&mut self, key: ItemKey) -> (ItemId, bool) {
        if let Some(&id) = self.keys.get(&key) {
            return (id, false);
        }
        let id = ItemId(self.items.len() as u32);
        self.items.push(ChartItem::new(id, key));
        self.keys.insert(key, id);
        let n = self.len();
        self.cells[key.start * n + key.end].push(id, key.category);
        (id, true)
    }

    pub fn find(&self, key: &ItemKey) -> Option<ItemId> {
        self.keys.get(key).copied()
    }

    /// Attach a local derivation to `id`, ignoring exact duplicates.
    pub fn add_backpointer(&mut self, id: ItemId, backpointer: BackPointer) -> Result<bool, ParseError> {
        for child in backpointer.children() {
            if child >= id {
                return Err(ParseError::UnknownItem { item: child.0 });
            }
        }
        let item = self
            .items
            .get_mut(id.index())
            .ok_or(ParseError::UnknownItem { item: id.0 })?;
        if item
            .backpointers
            .iter()
            .any(|bp| bp.same_derivation(&backpointer))
        {
            return Ok(false);
        }
        item.backpointers.push(backpointer);
        Ok(true)
    }

    /// Number of derivations reaching TOP; zero for a failed parse.
    pub fn parses(&self) -> f64 {
        self.top
            .and_then(|id| self.items.get(id.index()))
            .map_or(0.0, |item| item.derivations)
    }

    pub fn has_parse(&self) -> bool {
        self.top.is_some()
    }

    /// `ln P(sentence)`, or `None` without a parse.
    pub fn log_likelihood(&self) -> Option<f64> {
        self.top
            .and_then(|id| self.items.get(id.index()))
            .map(|item| item.alpha)
    }

    /// Parent → child graph of the forest. Node `i` is item `i`.
    pub fn graph(&self) -> DiGraph<ItemId, ()> {
        let mut graph = DiGraph::with_capacity(self.items.len(), self.items.len());
        for item in &self.items {
            graph.add_node(item.id);
        }
        for item in &self.items {
            for bp in &item.backpointers {
                for child in bp.children() {
                    graph.add_edge(NodeIndex::new(item.id.index()), NodeIndex::new(child.index()), ());
                }
            }
        }
        graph
    }

    /// Drop every item not reachable from TOP, renumbering the rest.
    ///
    /// Relative order is kept, so ids stay topologically sorted.
    pub fn trim(&mut self) {
        let Some(top) = self.top else {
            return;
        };
        let graph = self.graph();
        let mut reachable = vec![false; self.items.len()];
        let mut dfs = Dfs::new(&graph, NodeIndex::new(top.index()));
        while let Some(node) = dfs.next(&graph) {
            reachable[node.index()] = true;
        }

        let mut remap = vec![None; self.items.len()];
        let mut next = 0u32;
        for (old, keep) in reachable.iter().enumerate() {
            if *keep {
                remap[old] = Some(ItemId(next));
                next += 1;
            }
        }
        let renumber = |id: Option<ItemId>| id.and_then(|i| remap[i.index()]);

        let old_items = std::mem::take(&mut self.items);
        for cell in &mut self.cells {
            cell.items.clear();
            cell.by_category.clear();
        }
        self.keys.clear();

        let n = self.len();
        for mut item in old_items.into_iter().filter(|it| reachable[it.id.index()]) {
            item.id = ItemId(self.items.len() as u32);
            for bp in &mut item.backpointers {
                bp.left = renumber(bp.left);
                bp.right = renumber(bp.right);
            }
            self.keys.insert(item.key, item.id);
            self.cells[item.key.start * n + item.key.end].push(item.id, item.key.category);
            self.items.push(item);
        }
        self.top = renumber(Some(top));
        self.kbest = KBestCache::default();
    }

    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string(self).map_err(|e| ParseError::Persistence {
            reason: e.to_string(),
        })
    }

    /// Restore a chart written by [`Chart::to_json`].
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        let mut chart: Chart = serde_json::from_str(json).map_err(|e| ParseError::Persistence {
            reason: e.to_string(),
        })?;
        chart.reindex()?;
        Ok(chart)
    }

    fn reindex(&mut self) -> Result<(), ParseError> {
        let n = self.len();
        if self.cells.len() != n * n || self.allowed.len() != n * n {
            return Err(ParseError::Persistence {
                reason: format!("expected {} cells for {} tokens", n * n, n),
            });
        }
        self.keys.clear();
        for cell in &mut self.cells {
            cell.by_category.clear();
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.id.index() != index {
                return Err(ParseError::Persistence {
                    reason: format!("item {} stored at position {}", item.id, index),
                });
            }
            self.keys.insert(item.key, item.id);
            self.cells[item.key.start * n + item.key.end]
                .by_category
                .entry(item.key.category)
                .or_default()
                .push(item.id);
        }
        Ok(())
    }
}

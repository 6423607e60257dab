//! # Working Categories
//!
//! Dependency extraction replays a derivation bottom-up over *working*
//! categories: category trees whose nodes carry variables, so that head
//! words flow through unification and fill the argument slots of every
//! functor that consumed them.
//!
//! Nodes live in an append-only arena owned by a [`DerivationContext`] and
//! are never mutated. Every combinator step builds new nodes for its
//! result, so two derivations never share a node they could both change.
//! The context also owns the variable counter; nothing here is global.
//!
//! ```text
//! "eat" : (S\NP)/NP
//!
//!   node   category    var
//!   n4     (S\NP)/NP   v0  ── head "eat"
//!   n2     S\NP        v0
//!   n0     S           v0
//!   n1     NP          v1  ── unfilled: eat →1 v1
//!   n3     NP          v2  ── unfilled: eat →2 v2
//! ```

use crate::category::{Category, Direction};
use crate::error::CategoryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A unification variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub u32);

/// Handle to a node in a [`DerivationContext`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Shape of a working node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    Atomic,
    Complex {
        result: NodeId,
        argument: NodeId,
        direction: Direction,
    },
}

/// An immutable working-category node.
#[derive(Debug, Clone)]
pub struct Node {
    pub category: Category,
    pub shape: NodeShape,
    pub var: Var,
}

/// A lexical head: word, its lexical category and sentence position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeadWord {
    pub word: String,
    pub category: Category,
    pub index: usize,
}

/// Ordered list of head words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadWordList(Vec<HeadWord>);

impl HeadWordList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(head: HeadWord) -> Self {
        Self(vec![head])
    }

    /// Append the heads of `other` not already present.
    pub fn append(&mut self, other: &HeadWordList) {
        for head in &other.0 {
            if !self.0.iter().any(|h| h.index == head.index && h.word == head.word) {
                self.0.push(head.clone());
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeadWord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A filled word-to-word dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub head_word: String,
    pub head_category: Category,
    pub head_index: usize,
    pub arg_word: String,
    pub arg_category: Category,
    pub arg_index: usize,
    /// Argument slot of the head category, innermost argument first.
    pub slot: u8,
    pub extracted: bool,
    pub bounded: bool,
    pub modifier: bool,
}

impl DependencyEdge {
    pub fn between(head: &HeadWord, arg: &HeadWord, slot: u8, marker: Marker, modifier: bool) -> Self {
        Self {
            head_word: head.word.clone(),
            head_category: head.category.clone(),
            head_index: head.index,
            arg_word: arg.word.clone(),
            arg_category: arg.category.clone(),
            arg_index: arg.index,
            slot,
            extracted: marker.extracted,
            bounded: marker.bounded,
            modifier,
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{} {} {} {}_{}",
            self.head_word,
            self.head_index,
            self.head_category,
            self.slot,
            self.arg_word,
            self.arg_index
        )?;
        if self.extracted {
            write!(f, " {}", if self.bounded { "[X]" } else { "[UB]" })?;
        }
        Ok(())
    }
}

/// A dependency waiting for its argument variable to acquire heads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnfilledDependency {
    pub head: HeadWord,
    pub slot: u8,
    pub var: Var,
    pub modifier: bool,
}

/// Island-constraint bookkeeping for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub extracted: bool,
    pub bounded: bool,
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            extracted: false,
            bounded: true,
        }
    }
}

impl Marker {
    /// Extracted if either side is; bounded only if both are.
    pub fn merge(self, other: Marker) -> Marker {
        Marker {
            extracted: self.extracted || other.extracted,
            bounded: self.bounded && other.bounded,
        }
    }
}

/// A category mid-derivation, with its dependency state.
#[derive(Debug, Clone)]
pub struct WorkingCategory {
    pub root: NodeId,
    pub heads: BTreeMap<Var, HeadWordList>,
    pub markers: BTreeMap<Var, Marker>,
    pub unfilled: Vec<UnfilledDependency>,
    pub filled: Vec<DependencyEdge>,
    /// Heads of the conjunction, set between conjoin and coordinate.
    pub conj_heads: Option<HeadWordList>,
}

impl WorkingCategory {
    pub(crate) fn bare(root: NodeId) -> Self {
        Self {
            root,
            heads: BTreeMap::new(),
            markers: BTreeMap::new(),
            unfilled: Vec::new(),
            filled: Vec::new(),
            conj_heads: None,
        }
    }

    pub fn marker(&self, var: Var) -> Marker {
        self.markers.get(&var).copied().unwrap_or_default()
    }

    pub fn heads_of(&self, var: Var) -> HeadWordList {
        self.heads.get(&var).cloned().unwrap_or_default()
    }
}

/// Per-derivation arena and variable supply.
#[derive(Debug, Default)]
pub struct DerivationContext {
    nodes: Vec<Node>,
    next_var: u32,
}

impl DerivationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_var(&mut self) -> Var {
        let var = Var(self.next_var);
        self.next_var += 1;
        var
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, CategoryError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(CategoryError::DanglingNode {
                node: id.0,
                len: self.nodes.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push(&mut self, category: Category, shape: NodeShape, var: Var) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            category,
            shape,
            var,
        });
        id
    }

    pub(crate) fn push_complex(
        &mut self,
        result: NodeId,
        argument: NodeId,
        direction: Direction,
        var: Var,
    ) -> Result<NodeId, CategoryError> {
        let category = Category::complex(
            self.node(result)?.category.clone(),
            self.node(argument)?.category.clone(),
            direction,
        );
        Ok(self.push(
            category,
            NodeShape::Complex {
                result,
                argument,
                direction,
            },
            var,
        ))
    }

    /// A copy of `id` with a different top-level category label.
    pub(crate) fn recategorize(
        &mut self,
        id: NodeId,
        category: Category,
    ) -> Result<NodeId, CategoryError> {
        let node = self.node(id)?;
        let (shape, var) = (node.shape, node.var);
        Ok(self.push(category, shape, var))
    }

    /// The grammar category of a working category's root.
    pub fn category(&self, working: &WorkingCategory) -> Result<Category, CategoryError> {
        Ok(self.node(working.root)?.category.clone())
    }

    /// Variable of a working category's root.
    pub fn root_var(&self, working: &WorkingCategory) -> Result<Var, CategoryError> {
        Ok(self.node(working.root)?.var)
    }

    /// Build the working category for `word` at `index` with lexical
    /// category `category`.
    ///
    /// The head's result chain shares one variable bound to the word.
    /// Arguments get fresh variables, and each argument on the head chain
    /// registers an unfilled dependency, innermost argument as slot 1.
    /// A modifier's result is its argument node.
    pub fn lexical(&mut self, word: &str, category: &Category, index: usize) -> WorkingCategory {
        let head = HeadWord {
            word: word.to_string(),
            category: category.clone(),
            index,
        };
        let head_var = self.fresh_var();
        let mut slots = Vec::new();
        let root = self.build_head(category, head_var, &mut slots);

        let mut working = WorkingCategory::bare(root);
        working
            .heads
            .insert(head_var, HeadWordList::single(head.clone()));
        let modifier = category.is_modifier();
        working.unfilled = slots
            .into_iter()
            .enumerate()
            .map(|(i, var)| UnfilledDependency {
                head: head.clone(),
                slot: (i + 1) as u8,
                var,
                modifier,
            })
            .collect();
        working
    }

    fn build_head(&mut self, category: &Category, head_var: Var, slots: &mut Vec<Var>) -> NodeId {
        match category.split() {
            None => self.push(category.clone(), NodeShape::Atomic, head_var),
            Some((result, argument, direction)) => {
                let (result_node, argument_node) = if category.is_modifier() {
                    let arg = self.build_argument(argument);
                    (arg, arg)
                } else {
                    let res = self.build_head(result, head_var, slots);
                    (res, self.build_argument(argument))
                };
                slots.push(self.nodes[argument_node.0 as usize].var);
                self.push(
                    category.clone(),
                    NodeShape::Complex {
                        result: result_node,
                        argument: argument_node,
                        direction,
                    },
                    head_var,
                )
            }
        }
    }

    /// Build an argument (or otherwise unheaded) structure with a fresh
    /// variable along its result chain.
    pub(crate) fn build_argument(&mut self, category: &Category) -> NodeId {
        let var = self.fresh_var();
        self.build_with_var(category, var)
    }

    pub(crate) fn build_with_var(&mut self, category: &Category, var: Var) -> NodeId {
        match category.split() {
            None => self.push(category.clone(), NodeShape::Atomic, var),
            Some((result, argument, direction)) => {
                let (result_node, argument_node) = if category.is_modifier() {
                    let arg = self.build_argument(argument);
                    (arg, arg)
                } else {
                    let res = self.build_with_var(result, var);
                    (res, self.build_argument(argument))
                };
                self.push(
                    category.clone(),
                    NodeShape::Complex {
                        result: result_node,
                        argument: argument_node,
                        direction,
                    },
                    var,
                )
            }
        }
    }
}

//! Unification of working categories.
//!
//! A [`Unifier`] records variable equivalences discovered by walking two
//! node trees in lockstep, then rebuilds nodes with every variable
//! replaced by its class representative. Head words of merged variables
//! are appended, a feature present on either side wins, and extraction
//! markers merge as *extracted if either*, *bounded only if both*.
//!
//! Once classes are known, [`Unifier::merge`] folds the dependency state
//! of the operands into one and fills every pending dependency whose
//! argument variable now has head words.

use crate::category::Category;
use crate::error::CategoryError;
use crate::working::{
    DependencyEdge, DerivationContext, NodeId, NodeShape, Var, WorkingCategory,
};
use std::collections::HashMap;

/// Variable equivalence classes for one combinator step.
#[derive(Debug, Default)]
pub struct Unifier {
    parent: HashMap<Var, Var>,
    features: HashMap<Var, String>,
    memo: HashMap<NodeId, NodeId>,
}

impl Unifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Class representative of `var`.
    pub fn find(&self, var: Var) -> Var {
        let mut current = var;
        while let Some(&next) = self.parent.get(&current) {
            current = next;
        }
        current
    }

    fn union(&mut self, a: Var, b: Var) -> Var {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return ra;
        }
        self.parent.insert(rb, ra);
        if let Some(feature) = self.features.remove(&rb) {
            self.features.entry(ra).or_insert(feature);
        }
        ra
    }

    /// Unify two node trees of matching shape.
    pub fn unify_nodes(
        &mut self,
        ctx: &DerivationContext,
        a: NodeId,
        b: NodeId,
    ) -> Result<(), CategoryError> {
        let (na, nb) = (ctx.node(a)?, ctx.node(b)?);
        let rep = self.union(na.var, nb.var);

        match (na.shape, nb.shape) {
            (NodeShape::Atomic, NodeShape::Atomic) => {
                for feature in [na.category.feature(), nb.category.feature()]
                    .into_iter()
                    .flatten()
                {
                    self.features
                        .entry(rep)
                        .or_insert_with(|| feature.to_string());
                }
                Ok(())
            }
            (
                NodeShape::Complex {
                    result: r1,
                    argument: a1,
                    ..
                },
                NodeShape::Complex {
                    result: r2,
                    argument: a2,
                    ..
                },
            ) => {
                self.unify_nodes(ctx, r1, r2)?;
                self.unify_nodes(ctx, a1, a2)
            }
            _ => Err(CategoryError::UnhandledCombination {
                rule: "unify".to_string(),
                operands: format!("{} and {}", na.category, nb.category),
            }),
        }
    }

    /// Rebuild `node` with every variable replaced by its representative.
    ///
    /// Shared sub-nodes stay shared in the copy; untouched nodes are reused.
    pub fn substitute(
        &mut self,
        ctx: &mut DerivationContext,
        node: NodeId,
    ) -> Result<NodeId, CategoryError> {
        if let Some(&done) = self.memo.get(&node) {
            return Ok(done);
        }
        let original = ctx.node(node)?.clone();
        let var = self.find(original.var);

        let rebuilt = match original.shape {
            NodeShape::Atomic => {
                let category = match (original.category.feature(), self.features.get(&var)) {
                    (None, Some(feature)) => original.category.with_feature(Some(feature.as_str())),
                    _ => original.category.clone(),
                };
                if var == original.var && category == original.category {
                    node
                } else {
                    ctx.push(category, NodeShape::Atomic, var)
                }
            }
            NodeShape::Complex {
                result,
                argument,
                direction,
            } => {
                let new_result = self.substitute(ctx, result)?;
                let new_argument = self.substitute(ctx, argument)?;
                if var == original.var && new_result == result && new_argument == argument {
                    node
                } else {
                    let category = Category::complex(
                        ctx.node(new_result)?.category.clone(),
                        ctx.node(new_argument)?.category.clone(),
                        direction,
                    )
                    .with_conj(original.category.is_conj());
                    ctx.push(
                        category,
                        NodeShape::Complex {
                            result: new_result,
                            argument: new_argument,
                            direction,
                        },
                        var,
                    )
                }
            }
        };
        self.memo.insert(node, rebuilt);
        Ok(rebuilt)
    }

    /// Fold operand states into one rooted at `root` and fill dependencies.
    pub fn merge(&self, root: NodeId, operands: &[&WorkingCategory]) -> WorkingCategory {
        let mut merged = WorkingCategory::bare(root);
        for operand in operands {
            for (var, heads) in &operand.heads {
                merged.heads.entry(self.find(*var)).or_default().append(heads);
            }
            for (var, marker) in &operand.markers {
                let rep = self.find(*var);
                let current = merged.marker(rep);
                merged.markers.insert(rep, current.merge(*marker));
            }
            merged.filled.extend(operand.filled.iter().cloned());
            merged
                .unfilled
                .extend(operand.unfilled.iter().cloned().map(|mut dep| {
                    dep.var = self.find(dep.var);
                    dep
                }));
        }
        fill(&mut merged);
        merged
    }
}

/// Turn every unfilled dependency whose variable has heads into edges.
pub fn fill(working: &mut WorkingCategory) {
    let pending = std::mem::take(&mut working.unfilled);
    for dep in pending {
        match working.heads.get(&dep.var) {
            Some(heads) if !heads.is_empty() => {
                let marker = working.marker(dep.var);
                for arg in heads.iter() {
                    working
                        .filled
                        .push(DependencyEdge::between(&dep.head, arg, dep.slot, marker, dep.modifier));
                }
            }
            _ => working.unfilled.push(dep),
        }
    }
}

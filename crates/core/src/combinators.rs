//! # Combinators
//!
//! The grammar-level combinatory rules. Each rule family has its own
//! predicate/constructor function returning `None` when the operands
//! cannot combine; [`combine`] enumerates every family allowed by a
//! [`CombinatorConfig`] for an ordered pair of categories.
//!
//! | Rule | Form | Degree |
//! |------|------|--------|
//! | `>`  | `X/Y  Y → X` | 0 |
//! | `<`  | `Y  X\Y → X` | 0 |
//! | `>B^n` | `X/Y  (Y/Z1)|..|Zn → X/Z1|..|Zn` | n |
//! | `<B^n` | `(Y\Z1)|..|Zn  X\Y → X\Z1|..|Zn` | n |
//! | `>S` | `(X/Y)/Z  Y/Z → X/Z` | 0 |
//! | `<Sx` | `Y/Z  (X\Y)/Z → X/Z` | 0 |
//! | `>Φ` | `conj  X → X[conj]` | 0 |
//! | `<Φ` | `X  X[conj] → X` | 0 |
//! | `>P`/`<P` | `p X → X`, `X p → X` | 0 |
//!
//! Composition is crossed when the innermost passed-through argument has
//! the opposite slash to the primary functor.

use crate::category::{symbols_compatible, Category, CategoryKind, Direction, FEATURE_NB};
use crate::config::CombinatorConfig;
use crate::rule::{HeadDirection, RuleType};

/// One way a pair of categories can combine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub parent: Category,
    pub rule_type: RuleType,
    /// Composition degree; zero for non-composition rules.
    pub arity: u8,
    pub head: HeadDirection,
}

/// Whether `actual` can fill an argument slot expecting `expected`.
///
/// Atoms match on compatible symbols (`N` ≈ `NP`) and compatible features
/// (either side unspecified, or equal). A conjunction-marked category
/// never fills an argument slot.
pub fn matches(expected: &Category, actual: &Category) -> bool {
    !actual.is_conj() && matches_structure(expected, actual)
}

fn matches_structure(expected: &Category, actual: &Category) -> bool {
    match (expected.kind(), actual.kind()) {
        (
            CategoryKind::Atomic {
                symbol: s1,
                feature: f1,
                ..
            },
            CategoryKind::Atomic {
                symbol: s2,
                feature: f2,
                ..
            },
        ) => symbols_compatible(s1, s2) && features_compatible(f1.as_deref(), f2.as_deref()),
        (
            CategoryKind::Complex {
                result: r1,
                argument: a1,
                direction: d1,
                ..
            },
            CategoryKind::Complex {
                result: r2,
                argument: a2,
                direction: d2,
                ..
            },
        ) => d1 == d2 && matches_structure(r1, r2) && matches_structure(a1, a2),
        _ => false,
    }
}

fn features_compatible(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Unify an expected argument with the category that fills it.
///
/// The filler's symbols are kept; a feature present on only one side wins.
pub fn unify(expected: &Category, actual: &Category) -> Option<Category> {
    if !matches(expected, actual) {
        return None;
    }
    Some(unify_structure(expected, actual))
}

fn unify_structure(expected: &Category, actual: &Category) -> Category {
    match (expected.kind(), actual.kind()) {
        (CategoryKind::Atomic { feature: f1, .. }, CategoryKind::Atomic { feature: f2, .. }) => {
            match (f1, f2) {
                (Some(f), None) => actual.with_feature(Some(f.as_str())),
                _ => actual.clone(),
            }
        }
        (
            CategoryKind::Complex {
                result: r1,
                argument: a1,
                ..
            },
            CategoryKind::Complex {
                result: r2,
                argument: a2,
                direction,
                conj,
                ..
            },
        ) => Category::complex(unify_structure(r1, r2), unify_structure(a1, a2), *direction)
            .with_conj(*conj),
        _ => actual.clone(),
    }
}

/// The category produced when `functor` consumes `argument`.
///
/// A modifier returns the unified argument; `NP[nb]` results lose the
/// bare-noun feature once their noun is supplied.
fn application_result(functor: &Category, argument: &Category) -> Option<Category> {
    let (result, expected, _) = functor.split()?;
    let unified = unify(expected, argument)?;
    if functor.is_modifier() {
        return Some(unified.with_conj(false));
    }
    if result.feature() == Some(FEATURE_NB) {
        return Some(result.with_feature(None));
    }
    Some(result.with_conj(false))
}

/// `X/Y  Y → X`
pub fn forward_apply(left: &Category, right: &Category) -> Option<Category> {
    if left.is_conj() || left.direction()? != Direction::Forward {
        return None;
    }
    application_result(left, right)
}

/// `Y  X\Y → X`
pub fn backward_apply(left: &Category, right: &Category) -> Option<Category> {
    if right.is_conj() || right.direction()? != Direction::Backward {
        return None;
    }
    application_result(right, left)
}

/// Strip `degree` arguments off the result chain of `secondary`, returning
/// the base and the stripped arguments innermost first.
fn peel(secondary: &Category, degree: u8) -> Option<(Category, Vec<(Category, Direction)>)> {
    let mut passed = Vec::with_capacity(degree as usize);
    let mut current = secondary.clone();
    for _ in 0..degree {
        let (result, argument, direction) = current.split()?;
        passed.push((argument.clone(), direction));
        current = result.clone();
    }
    passed.reverse();
    Some((current, passed))
}

fn compose(
    functor: &Category,
    secondary: &Category,
    direction: Direction,
    degree: u8,
) -> Option<(Category, bool)> {
    if degree == 0 || functor.is_conj() || secondary.is_conj() {
        return None;
    }
    if functor.direction()? != direction {
        return None;
    }
    let (result, expected, _) = functor.split()?;
    let (base, passed) = peel(secondary, degree)?;
    let unified = unify(expected, &base)?;

    let crossed = passed.first()?.1 != direction;
    let mut parent = if functor.is_modifier() {
        unified
    } else {
        result.clone()
    };
    for (argument, slash) in passed {
        parent = Category::complex(parent, argument, slash);
    }
    Some((parent, crossed))
}

/// Forward composition of degree `degree`; the flag reports crossing.
pub fn forward_compose(left: &Category, right: &Category, degree: u8) -> Option<(Category, bool)> {
    compose(left, right, Direction::Forward, degree)
}

/// Backward composition of degree `degree`; the flag reports crossing.
pub fn backward_compose(left: &Category, right: &Category, degree: u8) -> Option<(Category, bool)> {
    compose(right, left, Direction::Backward, degree)
}

/// `(X/Y)/Z  Y/Z → X/Z`
pub fn forward_substitute(left: &Category, right: &Category) -> Option<Category> {
    if left.is_conj() || right.is_conj() {
        return None;
    }
    let (inner, z1, d1) = left.split()?;
    let (x, y1, d2) = inner.split()?;
    let (y2, z2, d3) = right.split()?;
    if d1 != Direction::Forward || d2 != Direction::Forward || d3 != Direction::Forward {
        return None;
    }
    if !matches(y1, y2) || !matches(z1, z2) {
        return None;
    }
    Some(x.forward(z1))
}

/// `Y/Z  (X\Y)/Z → X/Z`
pub fn backward_crossed_substitute(left: &Category, right: &Category) -> Option<Category> {
    if left.is_conj() || right.is_conj() {
        return None;
    }
    let (y1, z1, d1) = left.split()?;
    let (inner, z2, d2) = right.split()?;
    let (x, y2, d3) = inner.split()?;
    if d1 != Direction::Forward || d2 != Direction::Forward || d3 != Direction::Backward {
        return None;
    }
    if !matches(y2, y1) || !matches(z2, z1) {
        return None;
    }
    Some(x.forward(z2))
}

/// Categories that can introduce a conjunct: `conj`, `,` and `;`.
pub fn is_conjunction_like(category: &Category) -> bool {
    !category.is_conj() && matches!(category.symbol(), Some("conj") | Some(",") | Some(";"))
}

/// `conj  X → X[conj]`
pub fn conjoin(left: &Category, right: &Category) -> Option<Category> {
    if !is_conjunction_like(left) {
        return None;
    }
    if right.is_conj() || right.is_punctuation() || right.is_conjunction() || right.is_top() {
        return None;
    }
    Some(right.with_conj(true))
}

/// `X  X[conj] → X`
pub fn coordinate(left: &Category, right: &Category) -> Option<Category> {
    if left.is_conj() || !right.is_conj() {
        return None;
    }
    (right.with_conj(false) == *left).then(|| left.clone())
}

/// `p  X → X`
pub fn forward_punct(left: &Category, right: &Category) -> Option<Category> {
    (left.is_punctuation() && !right.is_punctuation() && !right.is_top()).then(|| right.clone())
}

/// `X  p → X`
pub fn backward_punct(left: &Category, right: &Category) -> Option<Category> {
    (right.is_punctuation() && !left.is_punctuation() && !left.is_top()).then(|| left.clone())
}

/// `X → T/(T\X)` (forward) or `X → T\(T/X)` (backward).
pub fn type_raise(category: &Category, target: &Category, direction: Direction) -> Option<Category> {
    if category.is_conj() || target.is_complex() {
        return None;
    }
    let raised = match direction {
        Direction::Forward => target.forward(&target.backward(category)),
        Direction::Backward => target.backward(&target.forward(category)),
    };
    Some(raised)
}

/// Every combination of `left` and `right` allowed under `config`.
pub fn combine(left: &Category, right: &Category, config: &CombinatorConfig) -> Vec<Combination> {
    let mut out = Vec::new();
    let mut push = |parent: Category, rule_type: RuleType, arity: u8, head: HeadDirection| {
        out.push(Combination {
            parent,
            rule_type,
            arity,
            head,
        });
    };

    if let Some(parent) = forward_punct(left, right) {
        push(parent, RuleType::FwPunct, 0, HeadDirection::Right);
    }
    if let Some(parent) = backward_punct(left, right) {
        push(parent, RuleType::BwPunct, 0, HeadDirection::Left);
    }
    if let Some(parent) = conjoin(left, right) {
        push(parent, RuleType::FwConjoin, 0, HeadDirection::Right);
    }
    if let Some(parent) = coordinate(left, right) {
        push(parent, RuleType::BwConjoin, 0, HeadDirection::Left);
    }

    if let Some(parent) = forward_apply(left, right) {
        let head = functor_head(left, HeadDirection::Left);
        push(parent, RuleType::FwApply, 0, head);
    }
    if let Some(parent) = backward_apply(left, right) {
        let head = functor_head(right, HeadDirection::Right);
        push(parent, RuleType::BwApply, 0, head);
    }

    let forward_primary_ok = !config.modifier_primary_only || left.is_modifier();
    let backward_primary_ok = !config.modifier_primary_only || right.is_modifier();
    for degree in 1..=config.composition_degree {
        if forward_primary_ok {
            if let Some((parent, crossed)) = forward_compose(left, right, degree) {
                if !crossed || config.crossed_composition {
                    let rule_type = if crossed {
                        RuleType::FwXCompose
                    } else {
                        RuleType::FwCompose
                    };
                    push(parent, rule_type, degree, functor_head(left, HeadDirection::Left));
                }
            }
        }
        if backward_primary_ok {
            if let Some((parent, crossed)) = backward_compose(left, right, degree) {
                if !crossed || config.crossed_composition {
                    let rule_type = if crossed {
                        RuleType::BwXCompose
                    } else {
                        RuleType::BwCompose
                    };
                    push(parent, rule_type, degree, functor_head(right, HeadDirection::Right));
                }
            }
        }
    }

    if config.substitution {
        if let Some(parent) = forward_substitute(left, right) {
            push(parent, RuleType::FwSubstitute, 0, HeadDirection::Left);
        }
        if let Some(parent) = backward_crossed_substitute(left, right) {
            push(parent, RuleType::BwXSubstitute, 0, HeadDirection::Right);
        }
    }

    out
}

/// A modifier passes the head of its argument through.
fn functor_head(functor: &Category, side: HeadDirection) -> HeadDirection {
    match (functor.is_modifier(), side) {
        (false, side) => side,
        (true, HeadDirection::Left) => HeadDirection::Right,
        (true, HeadDirection::Right) => HeadDirection::Left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    #[test]
    fn test_matching() {
        assert!(matches(&cat("NP"), &cat("NP")));
        assert!(matches(&cat("NP"), &cat("N")));
        assert!(matches(&cat("S"), &cat("S[dcl]")));
        assert!(matches(&cat("S[dcl]"), &cat("S")));
        assert!(!matches(&cat("S[dcl]"), &cat("S[q]")));
        assert!(!matches(&cat("NP"), &cat("NP[conj]")));
        assert!(matches(&cat("S\\NP"), &cat("S[dcl]\\NP")));
        assert!(!matches(&cat("S\\NP"), &cat("S/NP")));
    }

    #[test]
    fn test_application() {
        let vp = cat("S\\NP");
        assert_eq!(backward_apply(&cat("NP"), &vp), Some(cat("S")));
        assert_eq!(forward_apply(&cat("(S\\NP)/NP"), &cat("NP")), Some(vp.clone()));
        assert_eq!(forward_apply(&vp, &cat("NP")), None);
        assert_eq!(backward_apply(&cat("NP[conj]"), &vp), None);
    }

    #[test]
    fn test_bare_noun_phrase_application() {
        let parent = forward_apply(&cat("NP[nb]/N"), &cat("N")).unwrap();
        assert_eq!(parent, cat("NP"));
        assert_eq!(parent.feature(), None);
    }

    #[test]
    fn test_modifier_application_keeps_feature() {
        let parent = backward_apply(&cat("S[dcl]"), &cat("S\\S")).unwrap();
        assert_eq!(parent, cat("S[dcl]"));
    }

    #[test]
    fn test_forward_composition() {
        let (parent, crossed) = forward_compose(&cat("X/Y"), &cat("Y/Z"), 1).unwrap();
        assert_eq!(parent, cat("X/Z"));
        assert!(!crossed);

        let (parent, crossed) = forward_compose(&cat("X/Z"), &cat("Z/W"), 1).unwrap();
        assert_eq!(parent, cat("X/W"));
        assert!(!crossed);

        let (parent, crossed) = forward_compose(&cat("X/Y"), &cat("Y\\Z"), 1).unwrap();
        assert_eq!(parent, cat("X\\Z"));
        assert!(crossed);
    }

    #[test]
    fn test_generalized_composition() {
        let (parent, _) = forward_compose(&cat("X/Y"), &cat("(Y/Z)/W"), 2).unwrap();
        assert_eq!(parent, cat("(X/Z)/W"));
        assert_eq!(forward_compose(&cat("X/Y"), &cat("(Y/Z)/W"), 3), None);
        // Degree one does not reach the base.
        assert_eq!(forward_compose(&cat("X/Y"), &cat("(Y/Z)/W"), 1), None);

        let (parent, crossed) = backward_compose(&cat("(Y\\Z)\\W"), &cat("X\\Y"), 2).unwrap();
        assert_eq!(parent, cat("(X\\Z)\\W"));
        assert!(!crossed);
    }

    #[test]
    fn test_substitution() {
        assert_eq!(
            forward_substitute(&cat("(X/Y)/Z"), &cat("Y/Z")),
            Some(cat("X/Z"))
        );
        assert_eq!(
            backward_crossed_substitute(&cat("Y/Z"), &cat("(X\\Y)/Z")),
            Some(cat("X/Z"))
        );
        assert_eq!(forward_substitute(&cat("(X/Y)/Z"), &cat("Y/W")), None);
    }

    #[test]
    fn test_coordination() {
        let np = cat("NP");
        let marked = conjoin(&cat("conj"), &np).unwrap();
        assert_eq!(marked, cat("NP[conj]"));
        assert_eq!(coordinate(&np, &marked), Some(np.clone()));
        assert_eq!(coordinate(&cat("S"), &marked), None);
        assert_eq!(conjoin(&cat(","), &np), Some(marked.clone()));
        assert_eq!(conjoin(&cat("conj"), &marked), None);
    }

    #[test]
    fn test_punctuation_is_identity() {
        let vp = cat("S\\NP");
        assert_eq!(forward_punct(&cat(","), &vp), Some(vp.clone()));
        assert_eq!(backward_punct(&vp, &cat(".")), Some(vp.clone()));
        assert_eq!(backward_punct(&cat(","), &cat(".")), None);
    }

    #[test]
    fn test_type_raise() {
        let s = cat("S");
        let np = cat("NP");
        assert_eq!(
            type_raise(&np, &s, Direction::Forward),
            Some(cat("S/(S\\NP)"))
        );
        assert_eq!(
            type_raise(&np, &s, Direction::Backward),
            Some(cat("S\\(S/NP)"))
        );
    }

    #[test]
    fn test_combine_respects_config() {
        let left = cat("X/Y");
        let right = cat("Y/Z");
        let none = combine(&left, &right, &CombinatorConfig::application_only());
        assert!(none.is_empty());

        let some = combine(&left, &right, &CombinatorConfig::with_composition(1));
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].rule_type, RuleType::FwCompose);
        assert_eq!(some[0].arity, 1);

        let restricted = CombinatorConfig {
            modifier_primary_only: true,
            ..CombinatorConfig::with_composition(1)
        };
        assert!(combine(&left, &right, &restricted).is_empty());
        assert_eq!(combine(&cat("Y/Y"), &right, &restricted).len(), 1);
    }

    fn arb_category() -> impl Strategy<Value = Category> {
        let atom = prop_oneof![
            Just(cat("S")),
            Just(cat("S[dcl]")),
            Just(cat("NP")),
            Just(cat("NP[nb]")),
            Just(cat("N")),
        ];
        atom.prop_recursive(3, 16, 2, |inner| {
            (inner.clone(), inner, any::<bool>()).prop_map(|(result, argument, forward)| {
                let direction = if forward {
                    Direction::Forward
                } else {
                    Direction::Backward
                };
                Category::complex(result, argument, direction)
            })
        })
    }

    proptest! {
        #[test]
        fn prop_unify_is_idempotent(a in arb_category(), b in arb_category()) {
            if let Some(unified) = unify(&a, &b) {
                prop_assert_eq!(unify(&unified, &unified), Some(unified.clone()));
            }
            prop_assert_eq!(unify(&a, &a), Some(a.clone()));
        }
    }

    #[test]
    fn test_modifier_head_is_argument() {
        let combos = combine(&cat("N/N"), &cat("N"), &CombinatorConfig::application_only());
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].head, HeadDirection::Right);
    }
}

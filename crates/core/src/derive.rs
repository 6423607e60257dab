//! # Dependency-Propagating Combinators
//!
//! The working-category counterparts of [`crate::combinators`]. Each rule
//! family has its own function; [`derive_binary`] and [`derive_unary`]
//! dispatch on [`RuleType`] with an exhaustive match.
//!
//! Operands are never modified. Every step unifies through a fresh
//! [`Unifier`] and returns a new [`WorkingCategory`] whose filled
//! dependencies include everything the step completed.
//!
//! Coordination attaches the conjunction's arcs according to a
//! [`CoordinationStyle`]; arcs between the conjunction and the second
//! conjunct are added when they meet (`conj X2 → X2[conj]`), arcs involving
//! the first conjunct when the coordination closes (`X1 X2[conj] → X`).

use crate::category::{Category, Direction, FEATURE_NB};
use crate::config::CoordinationStyle;
use crate::error::CategoryError;
use crate::rule::RuleType;
use crate::unify::Unifier;
use crate::working::{
    DependencyEdge, DerivationContext, HeadWordList, Marker, NodeId, NodeShape, WorkingCategory,
};

fn unhandled(rule: RuleType, operands: String) -> CategoryError {
    CategoryError::UnhandledCombination {
        rule: rule.to_string(),
        operands,
    }
}

fn split_node(
    ctx: &DerivationContext,
    node: NodeId,
    rule: RuleType,
) -> Result<(NodeId, NodeId, Direction), CategoryError> {
    let n = ctx.node(node)?;
    match n.shape {
        NodeShape::Complex {
            result,
            argument,
            direction,
        } => Ok((result, argument, direction)),
        NodeShape::Atomic => Err(unhandled(rule, format!("atomic functor {}", n.category))),
    }
}

/// Functor application in either direction.
pub fn apply(
    ctx: &mut DerivationContext,
    functor: &WorkingCategory,
    argument: &WorkingCategory,
    rule: RuleType,
) -> Result<WorkingCategory, CategoryError> {
    let (result, expected, _) = split_node(ctx, functor.root, rule)?;
    let mut unifier = Unifier::new();
    unifier.unify_nodes(ctx, expected, argument.root)?;
    let mut root = unifier.substitute(ctx, result)?;

    let functor_is_modifier = ctx.node(functor.root)?.category.is_modifier();
    let category = ctx.node(root)?.category.clone();
    if !functor_is_modifier && category.feature() == Some(FEATURE_NB) {
        root = ctx.recategorize(root, category.with_feature(None))?;
    } else if category.is_conj() {
        root = ctx.recategorize(root, category.with_conj(false))?;
    }
    Ok(unifier.merge(root, &[functor, argument]))
}

/// Generalised composition of degree `degree`.
///
/// The arguments passed through from the secondary functor become
/// extracted; they stay bounded only if both the functor's argument and
/// the passed argument were bounded.
pub fn compose(
    ctx: &mut DerivationContext,
    functor: &WorkingCategory,
    secondary: &WorkingCategory,
    degree: u8,
    rule: RuleType,
) -> Result<WorkingCategory, CategoryError> {
    if degree == 0 {
        return Err(unhandled(rule, "composition of degree 0".to_string()));
    }
    let (result, expected, _) = split_node(ctx, functor.root, rule)?;

    let mut passed = Vec::with_capacity(degree as usize);
    let mut base = secondary.root;
    for _ in 0..degree {
        let (inner, argument, direction) = split_node(ctx, base, rule)?;
        passed.push((argument, direction));
        base = inner;
    }
    passed.reverse();

    let mut unifier = Unifier::new();
    unifier.unify_nodes(ctx, expected, base)?;
    let mut root = unifier.substitute(ctx, result)?;
    let head_var = ctx.node(root)?.var;
    let mut rebuilt = Vec::with_capacity(passed.len());
    for (argument, direction) in passed {
        let argument = unifier.substitute(ctx, argument)?;
        root = ctx.push_complex(root, argument, direction, head_var)?;
        rebuilt.push(argument);
    }

    let mut merged = unifier.merge(root, &[functor, secondary]);
    let expected_bounded = merged.marker(unifier.find(ctx.node(expected)?.var)).bounded;
    for argument in rebuilt {
        let var = ctx.node(argument)?.var;
        let passed_marker = merged.marker(var);
        merged.markers.insert(
            var,
            Marker {
                extracted: true,
                bounded: expected_bounded && passed_marker.bounded,
            },
        );
    }
    Ok(merged)
}

/// `(X/Y)/Z  Y/Z → X/Z` for `>S`, `Y/Z  (X\Y)/Z → X/Z` for `<Sx`.
pub fn substitute(
    ctx: &mut DerivationContext,
    left: &WorkingCategory,
    right: &WorkingCategory,
    rule: RuleType,
) -> Result<WorkingCategory, CategoryError> {
    let (functor, other) = match rule {
        RuleType::FwSubstitute => (left, right),
        _ => (right, left),
    };
    let (inner, z_functor, direction) = split_node(ctx, functor.root, rule)?;
    let (x, y_functor, _) = split_node(ctx, inner, rule)?;
    let (y_other, z_other, _) = split_node(ctx, other.root, rule)?;

    let mut unifier = Unifier::new();
    unifier.unify_nodes(ctx, y_functor, y_other)?;
    unifier.unify_nodes(ctx, z_functor, z_other)?;
    let x = unifier.substitute(ctx, x)?;
    let z = unifier.substitute(ctx, z_functor)?;
    let var = ctx.node(x)?.var;
    let root = ctx.push_complex(x, z, direction, var)?;
    Ok(unifier.merge(root, &[left, right]))
}

fn arcs(
    from: &HeadWordList,
    to: &HeadWordList,
    slot: u8,
    out: &mut Vec<DependencyEdge>,
) {
    for head in from.iter() {
        for arg in to.iter() {
            out.push(DependencyEdge::between(head, arg, slot, Marker::default(), false));
        }
    }
}

/// `conj  X2 → X2[conj]`
pub fn conjoin(
    ctx: &mut DerivationContext,
    conjunction: &WorkingCategory,
    conjunct: &WorkingCategory,
    style: CoordinationStyle,
) -> Result<WorkingCategory, CategoryError> {
    let cc = conjunction.heads_of(ctx.root_var(conjunction)?);
    let x2 = conjunct.heads_of(ctx.root_var(conjunct)?);

    let category = ctx.category(conjunct)?.with_conj(true);
    let root = ctx.recategorize(conjunct.root, category)?;
    let unifier = Unifier::new();
    let mut merged = unifier.merge(root, &[conjunction, conjunct]);

    match style {
        CoordinationStyle::ConjunctionHeads | CoordinationStyle::Chain => {
            arcs(&cc, &x2, 2, &mut merged.filled)
        }
        CoordinationStyle::SecondConjunctHeads => arcs(&x2, &cc, 1, &mut merged.filled),
        CoordinationStyle::ConjunctChain => arcs(&x2, &cc, 2, &mut merged.filled),
        CoordinationStyle::FirstConjunctHeads => {}
    }
    merged.conj_heads = Some(cc);
    Ok(merged)
}

/// `X1  X2[conj] → X`
pub fn coordinate(
    ctx: &mut DerivationContext,
    first: &WorkingCategory,
    second: &WorkingCategory,
    style: CoordinationStyle,
) -> Result<WorkingCategory, CategoryError> {
    let x1 = first.heads_of(ctx.root_var(first)?);
    let x2 = second.heads_of(ctx.root_var(second)?);
    let cc = second.conj_heads.clone().unwrap_or_default();

    let mut unifier = Unifier::new();
    unifier.unify_nodes(ctx, first.root, second.root)?;
    let root = unifier.substitute(ctx, first.root)?;
    let mut merged = unifier.merge(root, &[first, second]);

    let filled = &mut merged.filled;
    match style {
        CoordinationStyle::ConjunctionHeads => arcs(&cc, &x1, 1, filled),
        CoordinationStyle::FirstConjunctHeads => {
            arcs(&x1, &cc, 1, filled);
            arcs(&x1, &x2, 2, filled);
        }
        CoordinationStyle::Chain => arcs(&x1, &cc, 1, filled),
        CoordinationStyle::SecondConjunctHeads => arcs(&x2, &x1, 2, filled),
        CoordinationStyle::ConjunctChain => arcs(&x1, &x2, 1, filled),
    }
    merged.conj_heads = None;
    Ok(merged)
}

/// `X → T/(T\X)` or `X → T\(T/X)`.
pub fn type_raise(
    ctx: &mut DerivationContext,
    child: &WorkingCategory,
    target: &Category,
    direction: Direction,
) -> Result<WorkingCategory, CategoryError> {
    let var = ctx.fresh_var();
    let t = ctx.build_with_var(target, var);
    let inner = ctx.push_complex(t, child.root, direction.flip(), var)?;
    let root = ctx.push_complex(t, inner, direction, var)?;
    let mut raised = child.clone();
    raised.root = root;
    Ok(raised)
}

/// `X → Y`: the new category's head chain inherits `X`'s head.
pub fn type_change(
    ctx: &mut DerivationContext,
    child: &WorkingCategory,
    parent: &Category,
) -> Result<WorkingCategory, CategoryError> {
    let var = ctx.root_var(child)?;
    let root = ctx.build_with_var(parent, var);
    let mut changed = child.clone();
    changed.root = root;
    Ok(changed)
}

/// Replay one binary step.
pub fn derive_binary(
    ctx: &mut DerivationContext,
    rule: RuleType,
    degree: u8,
    left: &WorkingCategory,
    right: &WorkingCategory,
    style: CoordinationStyle,
) -> Result<WorkingCategory, CategoryError> {
    match rule {
        RuleType::FwApply => apply(ctx, left, right, rule),
        RuleType::BwApply => apply(ctx, right, left, rule),
        RuleType::FwCompose | RuleType::FwXCompose => compose(ctx, left, right, degree, rule),
        RuleType::BwCompose | RuleType::BwXCompose => compose(ctx, right, left, degree, rule),
        RuleType::FwSubstitute | RuleType::BwXSubstitute => substitute(ctx, left, right, rule),
        RuleType::FwConjoin => conjoin(ctx, left, right, style),
        RuleType::BwConjoin => coordinate(ctx, left, right, style),
        RuleType::FwPunct => Ok(right.clone()),
        RuleType::BwPunct => Ok(left.clone()),
        RuleType::Lex
        | RuleType::FwTypeRaise
        | RuleType::BwTypeRaise
        | RuleType::TypeChange
        | RuleType::Top => Err(unhandled(
            rule,
            format!("{} and {}", ctx.category(left)?, ctx.category(right)?),
        )),
    }
}

/// Replay one unary step producing `parent`.
pub fn derive_unary(
    ctx: &mut DerivationContext,
    rule: RuleType,
    child: &WorkingCategory,
    parent: &Category,
) -> Result<WorkingCategory, CategoryError> {
    match rule {
        RuleType::FwTypeRaise | RuleType::BwTypeRaise => {
            let target = parent
                .result()
                .ok_or_else(|| unhandled(rule, format!("raised category {}", parent)))?;
            let direction = if rule == RuleType::FwTypeRaise {
                Direction::Forward
            } else {
                Direction::Backward
            };
            type_raise(ctx, child, target, direction)
        }
        RuleType::TypeChange => type_change(ctx, child, parent),
        RuleType::Top => Ok(child.clone()),
        RuleType::Lex
        | RuleType::FwApply
        | RuleType::BwApply
        | RuleType::FwCompose
        | RuleType::BwCompose
        | RuleType::FwXCompose
        | RuleType::BwXCompose
        | RuleType::FwSubstitute
        | RuleType::BwXSubstitute
        | RuleType::FwConjoin
        | RuleType::BwConjoin
        | RuleType::FwPunct
        | RuleType::BwPunct => Err(unhandled(rule, format!("{}", ctx.category(child)?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    fn deps(working: &WorkingCategory) -> Vec<(String, String, u8)> {
        let mut out: Vec<_> = working
            .filled
            .iter()
            .map(|d| (d.head_word.clone(), d.arg_word.clone(), d.slot))
            .collect();
        out.sort();
        out
    }

    #[test]
    fn test_transitive_verb_fills_both_slots() {
        let mut ctx = DerivationContext::new();
        let cat_np = ctx.lexical("cat", &cat("NP"), 0);
        let eat = ctx.lexical("eat", &cat("(S\\NP)/NP"), 1);
        let fish = ctx.lexical("fish", &cat("NP"), 2);

        let vp = derive_binary(&mut ctx, RuleType::FwApply, 0, &eat, &fish, Default::default())
            .unwrap();
        assert_eq!(ctx.category(&vp).unwrap(), cat("S\\NP"));
        assert_eq!(deps(&vp), vec![("eat".into(), "fish".into(), 2)]);

        let s = derive_binary(&mut ctx, RuleType::BwApply, 0, &cat_np, &vp, Default::default())
            .unwrap();
        assert_eq!(ctx.category(&s).unwrap(), cat("S"));
        assert_eq!(
            deps(&s),
            vec![
                ("eat".into(), "cat".into(), 1),
                ("eat".into(), "fish".into(), 2)
            ]
        );
        assert!(s.unfilled.is_empty());
        // The sentence is headed by the verb.
        let heads = s.heads_of(ctx.root_var(&s).unwrap());
        assert_eq!(heads.iter().next().map(|h| h.word.as_str()), Some("eat"));
    }

    #[test]
    fn test_bare_noun_phrase_loses_feature() {
        let mut ctx = DerivationContext::new();
        let det = ctx.lexical("the", &cat("NP[nb]/N"), 0);
        let noun = ctx.lexical("dog", &cat("N"), 1);
        let np = apply(&mut ctx, &det, &noun, RuleType::FwApply).unwrap();
        assert_eq!(ctx.category(&np).unwrap(), cat("NP"));
        assert_eq!(deps(&np), vec![("the".into(), "dog".into(), 1)]);
    }

    #[test]
    fn test_modifier_passes_argument_head() {
        let mut ctx = DerivationContext::new();
        let adj = ctx.lexical("big", &cat("N/N"), 0);
        let noun = ctx.lexical("dog", &cat("N"), 1);
        let np = apply(&mut ctx, &adj, &noun, RuleType::FwApply).unwrap();
        let heads = np.heads_of(ctx.root_var(&np).unwrap());
        assert_eq!(heads.iter().next().map(|h| h.word.as_str()), Some("dog"));
        assert!(np.filled[0].modifier);
    }

    #[test]
    fn test_composition_marks_extraction() {
        // "what I ate": S/(S\NP) composed with (S\NP)/NP gives S/NP.
        let mut ctx = DerivationContext::new();
        let subject = ctx.lexical("I", &cat("NP"), 0);
        let raised = type_raise(&mut ctx, &subject, &cat("S"), Direction::Forward).unwrap();
        assert_eq!(ctx.category(&raised).unwrap(), cat("S/(S\\NP)"));

        let verb = ctx.lexical("ate", &cat("(S\\NP)/NP"), 1);
        let composed = derive_binary(
            &mut ctx,
            RuleType::FwCompose,
            1,
            &raised,
            &verb,
            Default::default(),
        )
        .unwrap();
        assert_eq!(ctx.category(&composed).unwrap(), cat("S/NP"));
        assert_eq!(deps(&composed), vec![("ate".into(), "I".into(), 1)]);

        let object = ctx.lexical("what", &cat("NP"), 2);
        let done = apply(&mut ctx, &composed, &object, RuleType::FwApply).unwrap();
        let edge = done
            .filled
            .iter()
            .find(|d| d.arg_word == "what")
            .unwrap();
        assert_eq!(edge.slot, 2);
        assert!(edge.extracted);
        assert!(edge.bounded);
    }

    fn coordinated(style: CoordinationStyle) -> Vec<(String, String, u8)> {
        let mut ctx = DerivationContext::new();
        let x1 = ctx.lexical("cats", &cat("NP"), 0);
        let cc = ctx.lexical("and", &cat("conj"), 1);
        let x2 = ctx.lexical("dogs", &cat("NP"), 2);
        let marked = derive_binary(&mut ctx, RuleType::FwConjoin, 0, &cc, &x2, style).unwrap();
        assert_eq!(ctx.category(&marked).unwrap(), cat("NP[conj]"));
        let np = derive_binary(&mut ctx, RuleType::BwConjoin, 0, &x1, &marked, style).unwrap();
        assert_eq!(ctx.category(&np).unwrap(), cat("NP"));
        let heads: Vec<_> = np
            .heads_of(ctx.root_var(&np).unwrap())
            .iter()
            .map(|h| h.word.clone())
            .collect();
        assert_eq!(heads, vec!["cats", "dogs"]);
        deps(&np)
    }

    #[test]
    fn test_coordination_styles() {
        let t = |h: &str, a: &str, s: u8| (h.to_string(), a.to_string(), s);
        assert_eq!(
            coordinated(CoordinationStyle::ConjunctionHeads),
            vec![t("and", "cats", 1), t("and", "dogs", 2)]
        );
        assert_eq!(
            coordinated(CoordinationStyle::FirstConjunctHeads),
            vec![t("cats", "and", 1), t("cats", "dogs", 2)]
        );
        assert_eq!(
            coordinated(CoordinationStyle::Chain),
            vec![t("and", "dogs", 2), t("cats", "and", 1)]
        );
        assert_eq!(
            coordinated(CoordinationStyle::SecondConjunctHeads),
            vec![t("dogs", "and", 1), t("dogs", "cats", 2)]
        );
        assert_eq!(
            coordinated(CoordinationStyle::ConjunctChain),
            vec![t("cats", "dogs", 1), t("dogs", "and", 2)]
        );
    }

    #[test]
    fn test_coordinated_verbs_share_subject() {
        let mut ctx = DerivationContext::new();
        let subject = ctx.lexical("John", &cat("NP"), 0);
        let v1 = ctx.lexical("sings", &cat("S\\NP"), 1);
        let cc = ctx.lexical("and", &cat("conj"), 2);
        let v2 = ctx.lexical("dances", &cat("S\\NP"), 3);
        let style = CoordinationStyle::ConjunctionHeads;

        let marked = conjoin(&mut ctx, &cc, &v2, style).unwrap();
        let vp = coordinate(&mut ctx, &v1, &marked, style).unwrap();
        let s = apply(&mut ctx, &vp, &subject, RuleType::BwApply).unwrap();

        let subjects: Vec<_> = s
            .filled
            .iter()
            .filter(|d| d.arg_word == "John")
            .map(|d| d.head_word.clone())
            .collect();
        assert_eq!(subjects.len(), 2);
        assert!(subjects.contains(&"sings".to_string()));
        assert!(subjects.contains(&"dances".to_string()));
    }

    #[test]
    fn test_substitution() {
        let mut ctx = DerivationContext::new();
        let left = ctx.lexical("f", &cat("(S/NP)/N"), 0);
        let right = ctx.lexical("g", &cat("NP/N"), 1);
        let out = substitute(&mut ctx, &left, &right, RuleType::FwSubstitute).unwrap();
        assert_eq!(ctx.category(&out).unwrap(), cat("S/N"));
    }

    #[test]
    fn test_unhandled_combination() {
        let mut ctx = DerivationContext::new();
        let np = ctx.lexical("a", &cat("NP"), 0);
        let other = ctx.lexical("b", &cat("NP"), 1);
        let err = derive_binary(&mut ctx, RuleType::Top, 0, &np, &other, Default::default());
        assert!(matches!(err, Err(CategoryError::UnhandledCombination { .. })));
        let err = apply(&mut ctx, &np, &other, RuleType::FwApply);
        assert!(matches!(err, Err(CategoryError::UnhandledCombination { .. })));
    }

    #[test]
    fn test_type_change_keeps_head() {
        let mut ctx = DerivationContext::new();
        let noun = ctx.lexical("dogs", &cat("N"), 0);
        let np = derive_unary(&mut ctx, RuleType::TypeChange, &noun, &cat("NP")).unwrap();
        assert_eq!(ctx.category(&np).unwrap(), cat("NP"));
        let heads = np.heads_of(ctx.root_var(&np).unwrap());
        assert_eq!(heads.len(), 1);
    }
}

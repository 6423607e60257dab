//! Integration tests for the category algebra.
//!
//! These tests exercise the public surface end to end:
//! - Categories parse, print and intern consistently across threads
//! - Grammar-level combinators agree with their dependency-propagating
//!   counterparts
//! - Every coordination convention attaches exactly two arcs

use ccg_core::derive::{derive_binary, derive_unary};
use ccg_core::{
    combinators, ArityLimits, Category, CategoryInterner, CombinatorConfig, CoordinationStyle,
    DerivationContext, Direction, RuleType,
};
use std::sync::Arc;
use std::thread;

fn cat(text: &str) -> Category {
    text.parse().unwrap()
}

// ============================================================================
// Parsing and interning
// ============================================================================

#[test]
fn printed_categories_reparse() {
    for text in [
        "N",
        "S[dcl]\\NP",
        "((S\\NP)/(S\\NP))/NP",
        "(S\\NP)[conj]",
        "NP[nb]/N",
        "conj",
    ] {
        let category = cat(text);
        assert_eq!(cat(&category.to_string()), category, "{text}");
    }
}

#[test]
fn concurrent_interning_yields_one_handle() {
    let interner = Arc::new(CategoryInterner::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let interner = Arc::clone(&interner);
            thread::spawn(move || {
                ["(S\\NP)/NP", "NP", "S\\NP", "NP/N"]
                    .iter()
                    .map(|t| interner.intern_str(t).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for ids in &results[1..] {
        assert_eq!(ids, &results[0]);
    }
    assert_eq!(interner.len(), 4);
}

// ============================================================================
// Combinators
// ============================================================================

#[test]
fn bare_noun_phrase_loses_feature() {
    let np = combinators::forward_apply(&cat("NP[nb]/N"), &cat("N")).unwrap();
    assert_eq!(np, cat("NP"));
}

#[test]
fn composition_degrees_are_recorded() {
    let config = CombinatorConfig::with_composition(2);
    let first = combinators::combine(&cat("X/Y"), &cat("Y/Z"), &config);
    let composed = first
        .iter()
        .find(|c| c.rule_type == RuleType::FwCompose)
        .unwrap();
    assert_eq!(composed.parent, cat("X/Z"));
    assert_eq!(composed.arity, 1);

    let second = combinators::combine(&cat("X/Y"), &cat("(Y/Z)/W"), &config);
    let composed = second
        .iter()
        .find(|c| c.rule_type == RuleType::FwCompose)
        .unwrap();
    assert_eq!(composed.parent, cat("(X/Z)/W"));
    assert_eq!(composed.arity, 2);

    let bounded = CombinatorConfig::with_composition(1);
    assert!(combinators::combine(&cat("X/Y"), &cat("(Y/Z)/W"), &bounded)
        .iter()
        .all(|c| !c.rule_type.is_composition()));
}

#[test]
fn type_raising_builds_functor_over_functor() {
    let raised = combinators::type_raise(&cat("NP"), &cat("S"), Direction::Forward).unwrap();
    assert_eq!(raised, cat("S/(S\\NP)"));
    assert!(combinators::type_raise(&cat("NP"), &cat("S\\NP"), Direction::Forward).is_none());
}

#[test]
fn raised_subject_composes_into_verb() {
    let mut ctx = DerivationContext::new();
    let john = ctx.lexical("John", &cat("NP"), 0);
    let likes = ctx.lexical("likes", &cat("(S\\NP)/NP"), 1);
    let mary = ctx.lexical("Mary", &cat("NP"), 2);

    let raised = derive_unary(&mut ctx, RuleType::FwTypeRaise, &john, &cat("S/(S\\NP)")).unwrap();
    let style = CoordinationStyle::default();
    let partial = derive_binary(&mut ctx, RuleType::FwCompose, 1, &raised, &likes, style).unwrap();
    assert_eq!(ctx.category(&partial).unwrap(), cat("S/NP"));

    let sentence = derive_binary(&mut ctx, RuleType::FwApply, 0, &partial, &mary, style).unwrap();
    assert_eq!(ctx.category(&sentence).unwrap(), cat("S"));

    let mut arcs: Vec<_> = sentence
        .filled
        .iter()
        .map(|d| (d.head_word.as_str(), d.arg_word.as_str(), d.slot))
        .collect();
    arcs.sort();
    assert_eq!(arcs, vec![("likes", "John", 1), ("likes", "Mary", 2)]);
}

#[test]
fn every_coordination_style_adds_two_arcs() {
    for style in CoordinationStyle::ALL {
        let mut ctx = DerivationContext::new();
        let cats = ctx.lexical("cats", &cat("NP"), 0);
        let and = ctx.lexical("and", &cat("conj"), 1);
        let dogs = ctx.lexical("dogs", &cat("NP"), 2);

        let right = derive_binary(&mut ctx, RuleType::FwConjoin, 0, &and, &dogs, style).unwrap();
        assert_eq!(ctx.category(&right).unwrap(), cat("NP[conj]"));
        let np = derive_binary(&mut ctx, RuleType::BwConjoin, 0, &cats, &right, style).unwrap();
        assert_eq!(ctx.category(&np).unwrap(), cat("NP"));
        assert_eq!(np.filled.len(), 2, "{style:?}");
    }
}

// ============================================================================
// Admissibility
// ============================================================================

#[test]
fn induced_categories_respect_limits() {
    let limits = ArityLimits::default();
    assert!(limits.admits(&cat("(S\\NP)/NP")));
    assert!(limits.admits(&cat("N/N")));
    assert!(!limits.admits(&cat("NP/(N/N)")));
    assert!(!limits.admits(&cat("S/conj")));
    assert!(!limits.admits(&cat("(((S\\NP)/NP)/NP)/NP")));
}

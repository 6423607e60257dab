//! The Category Algebra
//!
//! Run with: cargo run -p ccg-core --example category_algebra
//!
//! Parses a few categories, combines them with the grammar-level
//! combinators, and replays a small derivation to see which word-to-word
//! dependencies it fills.

use ccg_core::derive::derive_binary;
use ccg_core::{
    combinators, ArityLimits, Category, CategoryError, CategoryInterner, CombinatorConfig,
    CoordinationStyle, DerivationContext, RuleType,
};

fn main() -> Result<(), CategoryError> {
    println!("=== The Category Algebra ===\n");

    // -------------------------------------------------------------------------
    // 1. Categories
    // -------------------------------------------------------------------------
    println!("1. Categories");
    println!("-------------\n");

    let interner = CategoryInterner::new();
    for text in ["NP", "S\\NP", "(S\\NP)/NP", "(S\\NP)\\(S\\NP)", "NP[nb]/N"] {
        let category: Category = text.parse()?;
        let id = interner.intern(&category)?;
        println!(
            "  {:<18} id {:<2} arity {}  modifier {}",
            category.to_string(),
            id.0,
            category.arity(),
            category.is_modifier()
        );
    }
    println!();

    // -------------------------------------------------------------------------
    // 2. Combinators
    // -------------------------------------------------------------------------
    println!("2. Combinators");
    println!("--------------\n");

    let config = CombinatorConfig::with_composition(2);
    let pairs = [
        ("(S\\NP)/NP", "NP"),
        ("NP", "S\\NP"),
        ("S/(S\\NP)", "(S\\NP)/NP"),
        ("conj", "NP"),
        ("NP", "NP[conj]"),
    ];
    for (left, right) in pairs {
        let (l, r): (Category, Category) = (left.parse()?, right.parse()?);
        for combination in combinators::combine(&l, &r, &config) {
            println!(
                "  {} {}  =>  {}  ({}, degree {})",
                l, r, combination.parent, combination.rule_type, combination.arity
            );
        }
    }
    println!();

    // -------------------------------------------------------------------------
    // 3. Dependencies
    // -------------------------------------------------------------------------
    println!("3. Dependencies of 'cats eat fish'");
    println!("----------------------------------\n");

    let mut ctx = DerivationContext::new();
    let cats = ctx.lexical("cats", &"NP".parse()?, 0);
    let eat = ctx.lexical("eat", &"(S\\NP)/NP".parse()?, 1);
    let fish = ctx.lexical("fish", &"NP".parse()?, 2);
    let style = CoordinationStyle::default();
    let vp = derive_binary(&mut ctx, RuleType::FwApply, 0, &eat, &fish, style)?;
    let s = derive_binary(&mut ctx, RuleType::BwApply, 0, &cats, &vp, style)?;
    println!("  result: {}", ctx.category(&s)?);
    for edge in &s.filled {
        println!("  {} --{}--> {}", edge.head_word, edge.slot, edge.arg_word);
    }
    println!();

    // -------------------------------------------------------------------------
    // 4. Admissibility
    // -------------------------------------------------------------------------
    println!("4. Admissibility of induced categories");
    println!("--------------------------------------\n");

    let limits = ArityLimits::default();
    for text in ["N/N", "(S\\NP)/NP", "NP/(N/N)", "S/conj"] {
        let category: Category = text.parse()?;
        match limits.rejection(&category) {
            None => println!("  {:<12} admitted", text),
            Some(reason) => println!("  {:<12} rejected: {}", text, reason),
        }
    }

    println!("\n=== Done ===");
    Ok(())
}

//! Parsing a Tagged Sentence with a Packed Forest
//!
//! Run with: cargo run -p ccg-parser --example parse_sentence
//!
//! Builds a tiny hand-written grammar, charts an ambiguous sentence and
//! walks the forest: inside value of TOP, the k best derivations, and the
//! dependencies of the best one.

use ccg_core::{Category, CoordinationStyle};
use ccg_parser::{dependencies, Grammar, ParseError, Parser, ParserConfig, Sentence, UniformScorer};

fn main() -> Result<(), ParseError> {
    println!("=== Parsing a Tagged Sentence ===\n");

    // -------------------------------------------------------------------------
    // 1. A small lexicon
    // -------------------------------------------------------------------------
    println!("1. Lexicon");
    println!("----------\n");

    let config = ParserConfig::default();
    let grammar = Grammar::new(&config)?;
    let entries = [
        ("PRP", "NP"),
        ("VBD", "(S\\NP)/NP"),
        ("DT", "NP/N"),
        ("NN", "N"),
        ("IN", "(NP\\NP)/NP"),
        ("IN", "((S\\NP)\\(S\\NP))/NP"),
        (".", "."),
    ];
    for (tag, text) in entries {
        let category: Category = text.parse()?;
        grammar.add_lexical(tag, &category)?;
        println!("  {:<4} := {}", tag, category);
    }
    grammar.add_top(&Category::s())?;
    println!("\n  lexicon size: {}\n", grammar.lexicon_size());

    // -------------------------------------------------------------------------
    // 2. Charting
    // -------------------------------------------------------------------------
    println!("2. Chart");
    println!("--------\n");

    let sentence =
        Sentence::from_tagged("I/PRP saw/VBD the/DT man/NN with/IN the/DT telescope/NN ./.")?;
    let parser = Parser::new(config)?;
    let chart = parser.parse(&grammar, &UniformScorer, &sentence)?;

    println!("  tokens:      {}", chart.len());
    println!("  mood:        {:?}", chart.mood());
    println!("  items:       {}", chart.items().len());
    println!("  derivations: {}", chart.parses());
    if let Some(ll) = chart.log_likelihood() {
        println!("  log P(TOP):  {:.4}", ll);
    }
    println!();

    let Some(top) = chart.top() else {
        println!("  no parse");
        return Ok(());
    };

    // -------------------------------------------------------------------------
    // 3. k-best derivations
    // -------------------------------------------------------------------------
    println!("3. k-best (top_k = {})", parser.config().top_k);
    println!("--------------------\n");

    let best = parser.best(&chart)?;
    for (rank, derivation) in best.iter().enumerate() {
        let tree = chart.derivation_tree(&grammar, top, rank)?;
        let supertags: Vec<String> = tree.supertags().iter().map(ToString::to_string).collect();
        println!("  #{} score {:.4}: {}", rank, derivation.score, supertags.join(" "));
    }
    println!();
    print!("{}", chart.derivation_tree(&grammar, top, 0)?);
    println!();

    // -------------------------------------------------------------------------
    // 4. Dependencies of the best derivation
    // -------------------------------------------------------------------------
    println!("4. Dependencies");
    println!("---------------\n");

    for edge in dependencies(&chart, &grammar, top, 0, CoordinationStyle::default())? {
        println!(
            "  {}_{} --{}--> {}_{}",
            edge.head_word, edge.head_index, edge.slot, edge.arg_word, edge.arg_index
        );
    }

    println!("\n=== Done ===");
    Ok(())
}

//! Inducing a CCG Lexicon with EM
//!
//! Run with: cargo run -p ccg-induction --example induce_grammar
//!
//! Starts from atomic seed categories, lets two rounds of bigram and
//! partial-parse proposals grow the lexicon, then re-estimates rule
//! probabilities until the corpus log-likelihood settles.

use ccg_induction::{InductionError, Trainer, TrainerConfig};
use ccg_parser::Sentence;

const CORPUS: &[&str] = &[
    "the/DT dog/NN barks/VBZ ./.",
    "a/DT cat/NN sleeps/VBZ ./.",
    "dogs/NNS chase/VBP cats/NNS ./.",
    "the/DT big/JJ dog/NN chases/VBZ a/DT cat/NN ./.",
    "cats/NNS and/CC dogs/NNS sleep/VBP ./.",
    "John/NNP sees/VBZ the/DT cat/NN ./.",
];

fn main() -> Result<(), InductionError> {
    println!("=== Inducing a CCG Lexicon ===\n");

    let corpus = CORPUS
        .iter()
        .map(|s| Sentence::from_tagged(s))
        .collect::<Result<Vec<_>, _>>()?;

    // -------------------------------------------------------------------------
    // 1. Training
    // -------------------------------------------------------------------------
    println!("1. Training");
    println!("-----------\n");

    let config = TrainerConfig::default()
        .with_threads(4)
        .with_max_iterations(10)
        .with_induction_rounds(2);
    let mut trainer = Trainer::new(config)?;
    let report = trainer.train(&corpus)?;

    for stats in &report.iterations {
        println!(
            "  iteration {:>2}: parsed {}/{}  log-likelihood {:>10.4}  lexicon {:>3} (+{})",
            stats.iteration,
            stats.parsed,
            stats.sentences,
            stats.log_likelihood,
            stats.lexicon_size,
            stats.proposals.added
        );
    }
    println!("\n  converged: {}\n", report.converged);

    // -------------------------------------------------------------------------
    // 2. The induced lexicon
    // -------------------------------------------------------------------------
    println!("2. Lexicon");
    println!("----------\n");

    for tag in ["DT", "JJ", "NN", "NNS", "NNP", "VBZ", "VBP", "CC", "."] {
        let entries: Vec<String> = trainer
            .grammar()
            .lexical_categories(tag)?
            .iter()
            .map(ToString::to_string)
            .collect();
        println!("  {:<4} {}", tag, entries.join("  "));
    }
    println!();

    // -------------------------------------------------------------------------
    // 3. Parsing with the trained model
    // -------------------------------------------------------------------------
    println!("3. Best parse of an unseen sentence");
    println!("-----------------------------------\n");

    let sentence = Sentence::from_tagged("a/DT big/JJ cat/NN sees/VBZ John/NNP ./.")?;
    let chart = trainer.parse(&sentence)?;
    let best = trainer.best(&chart)?;
    match (chart.top(), best.first()) {
        (Some(top), Some(derivation)) => {
            println!("  score {:.4} ({} ranked)\n", derivation.score, best.len());
            print!("{}", chart.derivation_tree(trainer.grammar(), top, 0)?);
        }
        _ => println!("  no parse"),
    }

    println!("\n=== Done ===");
    Ok(())
}

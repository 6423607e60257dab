//! Worker-per-sentence EM training.
//!
//! Each iteration fans the corpus out over a fixed pool of workers. A
//! worker charts its sentences under the current model, folds expected
//! rule counts and category proposals into private tables, and the tables
//! are reduced into one after every worker has finished:
//!
//! ```text
//!   sentences ──┬── worker ─ counts, proposals ──┐
//!               ├── worker ─ counts, proposals ──┼── reduce ── M-step ── merge proposals
//!               └── worker ─ counts, proposals ──┘
//! ```
//!
//! The grammar store is the only state the workers share. Every chart is
//! built before any is scored, so rules discovered by one worker cannot
//! change the probabilities another worker sees. A failure on any sentence
//! abandons the whole iteration.

use crate::config::TrainerConfig;
use crate::context::propose_from_context;
use crate::error::InductionError;
use crate::model::CountModel;
use crate::partial::propose_from_chart;
use crate::proposals::{MergeReport, ProposalBuffer};
use crate::seed::seed_lexicon;
use ccg_parser::{
    expected_counts, Chart, Derivation, ExpectedCounts, Grammar, ParseError, Parser, Sentence,
};
use log::{debug, info};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Outcome of one EM iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    pub iteration: usize,
    pub sentences: usize,
    /// Sentences with at least one derivation.
    pub parsed: usize,
    /// Sum of `ln P(sentence)` over parsed sentences.
    pub log_likelihood: f64,
    pub lexicon_size: usize,
    pub proposals: MergeReport,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingReport {
    pub iterations: Vec<IterationStats>,
    pub converged: bool,
}

impl TrainingReport {
    pub fn last(&self) -> Option<&IterationStats> {
        self.iterations.last()
    }
}

/// One worker's share of an E-step.
#[derive(Debug, Default)]
struct Expectation {
    counts: ExpectedCounts,
    proposals: ProposalBuffer,
    log_likelihood: f64,
    parsed: usize,
    sentences: usize,
}

impl Expectation {
    fn merge(mut self, other: Expectation) -> Self {
        self.counts.merge(other.counts);
        self.proposals.absorb(other.proposals);
        self.log_likelihood += other.log_likelihood;
        self.parsed += other.parsed;
        self.sentences += other.sentences;
        self
    }
}

/// EM trainer owning the grammar, the rule model and the worker pool.
pub struct Trainer {
    config: TrainerConfig,
    grammar: Grammar,
    parser: Parser,
    model: CountModel,
    pool: ThreadPool,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self, InductionError> {
        config.validate()?;
        let grammar = Grammar::new(&config.parser)?;
        let parser = Parser::new(config.parser.clone())?;
        let model = CountModel::new(config.alpha)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .thread_name(|i| format!("ccg-worker-{i}"))
            .build()
            .map_err(|e| InductionError::WorkerPool {
                reason: e.to_string(),
            })?;
        Ok(Self {
            config,
            grammar,
            parser,
            model,
            pool,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn model(&self) -> &CountModel {
        &self.model
    }

    /// Seed the lexicon from the tags in `corpus`.
    pub fn seed(&self, corpus: &[Sentence]) -> Result<usize, InductionError> {
        let added = seed_lexicon(&self.grammar, &self.config.seed, corpus)?;
        info!("seeded {added} lexical entries");
        Ok(added)
    }

    /// Chart one sentence under the current model.
    pub fn parse(&self, sentence: &Sentence) -> Result<Chart, InductionError> {
        Ok(self.parser.parse(&self.grammar, &self.model, sentence)?)
    }

    /// The configured number of best derivations of a parsed chart.
    pub fn best(&self, chart: &Chart) -> Result<Vec<Derivation>, InductionError> {
        Ok(self.parser.best(chart)?)
    }

    /// Seed, then iterate until the log-likelihood settles or the
    /// iteration limit is reached.
    pub fn train(&mut self, corpus: &[Sentence]) -> Result<TrainingReport, InductionError> {
        if corpus.is_empty() {
            return Err(InductionError::EmptyCorpus);
        }
        self.seed(corpus)?;

        let mut report = TrainingReport::default();
        let mut previous: Option<IterationStats> = None;
        for iteration in 0..self.config.max_iterations {
            let propose = iteration < self.config.induction_rounds;
            let stats = self.iterate(iteration, corpus, propose)?;
            report.iterations.push(stats);

            if let Some(prev) = previous {
                if has_converged(&prev, &stats, self.config.convergence) {
                    info!("converged after {} iterations", iteration + 1);
                    report.converged = true;
                    break;
                }
            }
            // likelihoods are only comparable under an unchanged lexicon
            previous = (!propose || stats.proposals.added == 0).then_some(stats);
        }
        Ok(report)
    }

    /// One E-step over `corpus`, the M-step, and, if `propose` is set, a
    /// merge of the collected proposals into the lexicon.
    pub fn iterate(
        &mut self,
        iteration: usize,
        corpus: &[Sentence],
        propose: bool,
    ) -> Result<IterationStats, InductionError> {
        let expectation = self.expectation(iteration, corpus, propose)?;
        let Expectation {
            counts,
            mut proposals,
            log_likelihood,
            parsed,
            sentences,
        } = expectation;

        debug!(
            "iteration {iteration}: {} count parents, {} proposals",
            counts.len(),
            proposals.len()
        );
        self.model.reestimate(counts);

        let merged = if propose {
            proposals.merge_into(&self.grammar, &self.config.limits)?
        } else {
            MergeReport::default()
        };

        let stats = IterationStats {
            iteration,
            sentences,
            parsed,
            log_likelihood,
            lexicon_size: self.grammar.lexicon_size(),
            proposals: merged,
        };
        info!(
            "iteration {}: log-likelihood {:.4}, parsed {}/{}, lexicon {} (+{}, {} dropped)",
            iteration,
            log_likelihood,
            parsed,
            sentences,
            stats.lexicon_size,
            merged.added,
            merged.dropped
        );
        Ok(stats)
    }

    fn expectation(
        &self,
        iteration: usize,
        corpus: &[Sentence],
        propose: bool,
    ) -> Result<Expectation, InductionError> {
        let in_sentence = |index: usize, source: ParseError| InductionError::Sentence {
            iteration,
            index,
            source,
        };
        self.pool.install(|| {
            // rule discovery settles before anything is scored
            let charts = corpus
                .par_iter()
                .enumerate()
                .map(|(index, sentence)| {
                    self.chart(sentence)
                        .map_err(|source| in_sentence(index, source))
                })
                .collect::<Result<Vec<_>, _>>()?;

            corpus
                .par_iter()
                .zip(charts)
                .enumerate()
                .try_fold(
                    Expectation::default,
                    |mut acc, (index, (sentence, chart))| -> Result<Expectation, InductionError> {
                        self.observe(sentence, chart, propose, &mut acc)
                            .map_err(|source| in_sentence(index, source))?;
                        Ok(acc)
                    },
                )
                .try_reduce(Expectation::default, |a, b| Ok(a.merge(b)))
        })
    }

    /// Fill the chart of `sentence`. `None` when nothing is left to chart
    /// once punctuation is stripped.
    fn chart(&self, sentence: &Sentence) -> Result<Option<Chart>, ParseError> {
        match self.parser.chart(&self.grammar, &self.model, sentence) {
            Ok(chart) => Ok(Some(chart)),
            Err(ParseError::EmptySentence) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn observe(
        &self,
        sentence: &Sentence,
        chart: Option<Chart>,
        propose: bool,
        acc: &mut Expectation,
    ) -> Result<(), ParseError> {
        acc.sentences += 1;
        let Some(mut chart) = chart else {
            return Ok(());
        };
        self.parser.score(&mut chart, &self.grammar, &self.model)?;

        if let Some(ll) = chart.log_likelihood() {
            acc.parsed += 1;
            acc.log_likelihood += ll;
            expected_counts(&chart, &self.model, &mut acc.counts)?;
        }
        if propose {
            propose_from_context(&self.grammar, &self.config.seed, sentence, &mut acc.proposals)?;
            propose_from_chart(&chart, &self.grammar, &mut acc.proposals)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("config", &self.config)
            .field("grammar", &self.grammar)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

/// Relative change in log-likelihood below `threshold`, with the same
/// sentences parsed both times.
fn has_converged(previous: &IterationStats, current: &IterationStats, threshold: f64) -> bool {
    if previous.parsed != current.parsed || current.parsed == 0 {
        return false;
    }
    let scale = previous.log_likelihood.abs().max(f64::MIN_POSITIVE);
    (current.log_likelihood - previous.log_likelihood).abs() / scale < threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(parsed: usize, log_likelihood: f64) -> IterationStats {
        IterationStats {
            iteration: 0,
            sentences: 4,
            parsed,
            log_likelihood,
            lexicon_size: 0,
            proposals: MergeReport::default(),
        }
    }

    #[test]
    fn test_convergence_is_relative() {
        assert!(has_converged(&stats(3, -100.0), &stats(3, -100.001), 1e-4));
        assert!(!has_converged(&stats(3, -100.0), &stats(3, -99.0), 1e-4));
    }

    #[test]
    fn test_convergence_needs_same_coverage() {
        assert!(!has_converged(&stats(2, -50.0), &stats(3, -50.0), 1e-4));
        assert!(!has_converged(&stats(0, 0.0), &stats(0, 0.0), 1e-4));
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let mut trainer = Trainer::new(TrainerConfig::default().with_threads(1)).unwrap();
        assert!(matches!(
            trainer.train(&[]),
            Err(InductionError::EmptyCorpus)
        ));
    }
}

//! The CYK chart parser.
//!
//! Spans are filled bottom-up. For each span every split point pairs the
//! categories of the two sub-cells and asks the grammar for their rules;
//! each rule that passes the normal form and the arity bound adds a
//! backpointer to the parent's equivalence class. A few unary passes then
//! apply type-changing and type-raising rules inside the cell.
//!
//! The whole sentence gets a TOP item when its cell holds a category that
//! suits the sentence mood and is licensed as a root. The finished chart is
//! trimmed to what TOP reaches and scored with inside and outside passes.

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::forest::{self, BackPointer, Chart, Derivation, ItemId, ItemKey, PunctHistory};
use crate::grammar::Grammar;
use crate::normal_form::Step;
use crate::scorer::Scorer;
use crate::sentence::Sentence;
use ccg_core::{Rule, RuleType};
use log::debug;

/// CYK parser over a shared grammar.
#[derive(Debug, Clone)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Result<Self, ParseError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Chart `sentence` and score it. A sentence without a root-compatible
    /// spanning item yields a chart with zero parses, not an error.
    pub fn parse<S: Scorer + ?Sized>(
        &self,
        grammar: &Grammar,
        scorer: &S,
        sentence: &Sentence,
    ) -> Result<Chart, ParseError> {
        let mut chart = self.chart(grammar, scorer, sentence)?;
        self.score(&mut chart, grammar, scorer)?;
        Ok(chart)
    }

    /// Fill the chart of `sentence` without scoring it. The scorer is only
    /// consulted for test-time gating.
    pub fn chart<S: Scorer + ?Sized>(
        &self,
        grammar: &Grammar,
        scorer: &S,
        sentence: &Sentence,
    ) -> Result<Chart, ParseError> {
        sentence.validate_spans()?;
        let sentence = if self.config.punctuation {
            sentence.clone()
        } else {
            sentence.without_punctuation()
        };
        if sentence.is_empty() {
            return Err(ParseError::EmptySentence);
        }

        let mut run = Run {
            config: &self.config,
            grammar,
            scorer,
            chart: Chart::new(&sentence, grammar),
        };
        let n = sentence.len();

        for i in 0..n {
            run.lexical(i)?;
            run.unary_closure(i, i)?;
        }
        for span in 1..n {
            for start in 0..n - span {
                let end = start + span;
                if !run.chart.span_allowed(start, end) {
                    continue;
                }
                for split in start..end {
                    run.combine(start, split, end)?;
                }
                run.unary_closure(start, end)?;
            }
        }
        run.root()?;

        debug!(
            "charted {} tokens: {} items, parse found: {}",
            n,
            run.chart.items().len(),
            run.chart.has_parse()
        );
        Ok(run.chart)
    }

    /// Trim a parsed chart to what TOP reaches, then run the inside and
    /// outside passes. Unparsed charts only get inside values.
    pub fn score<S: Scorer + ?Sized>(
        &self,
        chart: &mut Chart,
        grammar: &Grammar,
        scorer: &S,
    ) -> Result<(), ParseError> {
        if chart.has_parse() {
            chart.trim();
            forest::inside(chart, grammar, scorer)?;
            forest::outside(chart)?;
        } else {
            forest::inside(chart, grammar, scorer)?;
        }
        debug!(
            "scored {} items: {} parses",
            chart.items().len(),
            chart.parses()
        );
        Ok(())
    }

    /// The best `top_k` derivations of the chart's TOP item, or none when
    /// the sentence did not parse.
    pub fn best(&self, chart: &Chart) -> Result<Vec<Derivation>, ParseError> {
        match chart.top() {
            Some(top) => chart.kbest(top, self.config.top_k),
            None => Ok(Vec::new()),
        }
    }
}

/// State of one `parse` call.
struct Run<'a, S: ?Sized> {
    config: &'a ParserConfig,
    grammar: &'a Grammar,
    scorer: &'a S,
    chart: Chart,
}

impl<S: Scorer + ?Sized> Run<'_, S> {
    fn gated(&self, rule: &Rule) -> bool {
        self.config.test_time && !self.scorer.is_rule_required(rule)
    }

    fn step(&self, id: ItemId) -> Result<Step, ParseError> {
        let key = self.chart.item(id)?.key;
        Ok(Step::new(key.rule_type, key.arity).with_punct(key.punct))
    }

    fn lexical(&mut self, i: usize) -> Result<(), ParseError> {
        let tag = self.chart.tag_ids()[i];
        for category in self.grammar.lexical(tag) {
            let rule = Rule::Lexical {
                parent: category,
                tag,
            };
            if self.gated(&rule) {
                continue;
            }
            let (id, _) = self.chart.add_item(ItemKey {
                category,
                start: i,
                end: i,
                rule_type: RuleType::Lex,
                arity: 0,
                punct: PunctHistory::None,
            });
            self.chart.add_backpointer(id, BackPointer::lexical(rule))?;
        }
        Ok(())
    }

    fn combine(&mut self, start: usize, split: usize, end: usize) -> Result<(), ParseError> {
        let left_categories: Vec<_> = self.chart.cell(start, split).categories().collect();
        let right_categories: Vec<_> = self.chart.cell(split + 1, end).categories().collect();

        for &lc in &left_categories {
            for &rc in &right_categories {
                let rules = self.grammar.lookup_binary(lc, rc)?;
                if rules.is_empty() {
                    continue;
                }
                let left_items = self.chart.cell(start, split).with_category(lc).to_vec();
                let right_items = self.chart.cell(split + 1, end).with_category(rc).to_vec();
                for rule in rules.iter() {
                    for &l in &left_items {
                        for &r in &right_items {
                            self.binary(*rule, l, r, start, end)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn binary(
        &mut self,
        rule: Rule,
        left: ItemId,
        right: ItemId,
        start: usize,
        end: usize,
    ) -> Result<(), ParseError> {
        let rule_type = rule.rule_type();
        let (left_step, right_step) = (self.step(left)?, self.step(right)?);
        let parent_step = Step::new(rule_type, rule.arity());
        if !self
            .config
            .normal_form
            .permits(parent_step, Some(left_step), Some(right_step))
        {
            return Ok(());
        }

        let arity = if rule_type.is_composition() {
            let primary = if rule_type.is_forward() {
                left_step
            } else {
                right_step
            };
            let chained = primary.rule_type.is_composition()
                && primary.rule_type.is_forward() == rule_type.is_forward();
            rule.arity() + if chained { primary.arity } else { 0 }
        } else {
            0
        };
        if arity > self.config.combinators.composition_degree {
            return Ok(());
        }
        if self.gated(&rule) {
            return Ok(());
        }

        let (id, _) = self.chart.add_item(ItemKey {
            category: rule.parent(),
            start,
            end,
            rule_type,
            arity,
            punct: PunctHistory::of(rule_type),
        });
        self.chart
            .add_backpointer(id, BackPointer::binary(rule, left, right))?;
        Ok(())
    }

    fn unary_closure(&mut self, start: usize, end: usize) -> Result<(), ParseError> {
        for _ in 0..self.config.unary_passes {
            let not_unary = |t: RuleType| !(t == RuleType::TypeChange || t.is_type_raise());
            let mut added =
                self.unary_phase(start, end, not_unary, |t| t == RuleType::TypeChange)?;
            if self.config.combinators.type_raising {
                let not_raised = |t: RuleType| !t.is_type_raise();
                added |= self.unary_phase(start, end, not_raised, RuleType::is_type_raise)?;
            }
            if !added {
                break;
            }
        }
        Ok(())
    }

    /// Apply every unary rule accepted by `rule_filter` to the items of a
    /// cell whose rule type passes `child_filter`.
    fn unary_phase(
        &mut self,
        start: usize,
        end: usize,
        child_filter: impl Fn(RuleType) -> bool,
        rule_filter: impl Fn(RuleType) -> bool,
    ) -> Result<bool, ParseError> {
        let mut added = false;
        let children = self.chart.cell(start, end).items().to_vec();
        for child in children {
            let child_step = self.step(child)?;
            if !child_filter(child_step.rule_type) {
                continue;
            }
            let category = self.chart.item(child)?.category();
            for rule in self.grammar.lookup_unary(category)? {
                let rule_type = rule.rule_type();
                if !rule_filter(rule_type) || self.gated(&rule) {
                    continue;
                }
                if !self
                    .config
                    .normal_form
                    .permits(Step::new(rule_type, 0), Some(child_step), None)
                {
                    continue;
                }
                let (id, _) = self.chart.add_item(ItemKey {
                    category: rule.parent(),
                    start,
                    end,
                    rule_type,
                    arity: 0,
                    punct: PunctHistory::None,
                });
                added |= self.chart.add_backpointer(id, BackPointer::unary(rule, child))?;
            }
        }
        Ok(added)
    }

    fn root(&mut self) -> Result<(), ParseError> {
        let end = self.chart.len() - 1;
        let mut roots = Vec::new();
        for &id in self.chart.cell(0, end).items() {
            let category = self.chart.item(id)?.category();
            let Some(rule) = self.grammar.top_rule(category) else {
                continue;
            };
            if self.gated(&rule) {
                continue;
            }
            if Grammar::root_compatible(&self.grammar.category(category)?, self.chart.mood()) {
                roots.push((rule, id));
            }
        }
        if roots.is_empty() {
            return Ok(());
        }

        let (top, _) = self.chart.add_item(ItemKey {
            category: self.grammar.top_id(),
            start: 0,
            end,
            rule_type: RuleType::Top,
            arity: 0,
            punct: PunctHistory::None,
        });
        for (rule, child) in roots {
            self.chart.add_backpointer(top, BackPointer::unary(rule, child))?;
        }
        self.chart.set_top(top);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normal_form::NormalForm;
    use crate::UniformScorer;
    use ccg_core::{Category, CombinatorConfig};

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    fn setup(config: ParserConfig) -> (Parser, Grammar) {
        let grammar = Grammar::new(&config).unwrap();
        (Parser::new(config).unwrap(), grammar)
    }

    #[test]
    fn test_empty_sentence() {
        let (parser, grammar) = setup(ParserConfig::default());
        let result = parser.parse(&grammar, &UniformScorer, &Sentence::default());
        assert!(matches!(result, Err(ParseError::EmptySentence)));
    }

    #[test]
    fn test_out_of_range_bracket() {
        let config = ParserConfig {
            punctuation: false,
            ..ParserConfig::default()
        };
        let (parser, grammar) = setup(config);
        grammar.add_lexical("DT", &cat("NP/N")).unwrap();
        grammar.add_lexical("NN", &cat("N")).unwrap();
        let sentence = Sentence::from_tagged("a/DT ,/, b/NN")
            .unwrap()
            .with_brackets(vec![(1, 7)]);

        let result = parser.parse(&grammar, &UniformScorer, &sentence);
        assert!(matches!(result, Err(ParseError::InvalidSpan { end: 7, .. })));
    }

    #[test]
    fn test_transitive_sentence() {
        let (parser, grammar) = setup(ParserConfig::default());
        grammar.add_lexical("NN", &cat("NP")).unwrap();
        grammar.add_lexical("VBD", &cat("(S\\NP)/NP")).unwrap();
        grammar.add_top(&cat("S")).unwrap();

        let sentence = Sentence::from_tagged("cats/NN ate/VBD fish/NN").unwrap();
        let chart = parser.parse(&grammar, &UniformScorer, &sentence).unwrap();
        assert_eq!(chart.parses(), 1.0);
        assert!(chart.log_likelihood().unwrap() <= 0.0);
    }

    #[test]
    fn test_mood_blocks_root() {
        let (parser, grammar) = setup(ParserConfig::default());
        grammar.add_lexical("NN", &cat("N")).unwrap();
        grammar.add_top(&cat("N")).unwrap();

        let unknown = Sentence::from_tagged("cats/NN").unwrap();
        assert!(parser.parse(&grammar, &UniformScorer, &unknown).unwrap().has_parse());

        let declarative = unknown.clone().with_mood(crate::Mood::Declarative);
        let chart = parser.parse(&grammar, &UniformScorer, &declarative).unwrap();
        assert!(!chart.has_parse());
        assert_eq!(chart.parses(), 0.0);
    }

    #[test]
    fn test_composition_arity_bound() {
        // X/Y Y/Z Z/W W: with B^1 only, the chained composition is rejected
        // but application still parses.
        let config = ParserConfig {
            combinators: CombinatorConfig::with_composition(1),
            normal_form: NormalForm::None,
            ..ParserConfig::default()
        };
        let (parser, grammar) = setup(config);
        grammar.add_lexical("A", &cat("X/Y")).unwrap();
        grammar.add_lexical("B", &cat("Y/Z")).unwrap();
        grammar.add_lexical("C", &cat("Z/W")).unwrap();
        grammar.add_lexical("D", &cat("W")).unwrap();
        grammar.add_top(&cat("X")).unwrap();

        let sentence = Sentence::from_tagged("a/A b/B c/C d/D").unwrap();
        let chart = parser.parse(&grammar, &UniformScorer, &sentence).unwrap();
        assert!(chart.has_parse());
        for item in chart.items() {
            assert!(item.key.arity <= 1);
        }
    }

    #[test]
    fn test_punctuation_toggle() {
        let config = ParserConfig {
            punctuation: false,
            ..ParserConfig::default()
        };
        let (parser, grammar) = setup(config);
        grammar.add_lexical("NN", &cat("N")).unwrap();
        grammar.add_top(&cat("N")).unwrap();

        let sentence = Sentence::from_tagged("cats/NN ,/,").unwrap();
        let chart = parser.parse(&grammar, &UniformScorer, &sentence).unwrap();
        assert_eq!(chart.len(), 1);
        assert!(chart.has_parse());
    }
}

//! The shared grammar store.
//!
//! One [`Grammar`] is shared by every worker of an EM iteration. Reads
//! dominate: each chart cell asks for the rules of many category pairs.
//! Writes happen when an unseen pair is resolved through the combinators
//! (open discovery) and between iterations, when induced categories are
//! merged into the lexicon.
//!
//! Rule tables are first-writer-wins: when two workers resolve the same
//! pair concurrently, the entry that lands first is kept and both callers
//! receive that same `Arc`.

use crate::config::{DiscoveryMode, ParserConfig, TypeRaiseTarget};
use crate::error::ParseError;
use crate::sentence::Mood;
use crate::validity::{RuleKey, Validity, ValidityTable};
use ccg_core::category::FEATURE_Q;
use ccg_core::combinators;
use ccg_core::{
    CatId, Category, CategoryInterner, CombinatorConfig, Direction, HeadDirection, Rule, RuleType,
    SymbolId, Vocab,
};
use log::trace;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

type RuleList = Arc<[Rule]>;

fn no_rules() -> RuleList {
    Arc::from(Vec::new())
}

/// Categories, lexicon and rule tables.
pub struct Grammar {
    categories: CategoryInterner,
    tags: Vocab,
    words: Vocab,
    combinators: CombinatorConfig,
    type_raise_targets: Vec<TypeRaiseTarget>,
    discovery: RwLock<DiscoveryMode>,
    top: CatId,

    lexicon: RwLock<HashMap<SymbolId, Vec<CatId>>>,
    binary: RwLock<HashMap<(CatId, CatId), RuleList>>,
    unary: RwLock<HashMap<CatId, RuleList>>,
    tops: RwLock<HashMap<CatId, Rule>>,
    validity: ValidityTable,
    expansions: RwLock<HashMap<CatId, HashSet<Rule>>>,
}

impl Grammar {
    pub fn new(config: &ParserConfig) -> Result<Self, ParseError> {
        config.validate()?;
        let categories = CategoryInterner::new();
        let top = categories.intern(&Category::top())?;
        Ok(Self {
            categories,
            tags: Vocab::new(),
            words: Vocab::new(),
            combinators: config.combinators.clone(),
            type_raise_targets: config.type_raise_targets.clone(),
            discovery: RwLock::new(config.discovery),
            top,
            lexicon: RwLock::new(HashMap::new()),
            binary: RwLock::new(HashMap::new()),
            unary: RwLock::new(HashMap::new()),
            tops: RwLock::new(HashMap::new()),
            validity: ValidityTable::new(),
            expansions: RwLock::new(HashMap::new()),
        })
    }

    // ---- interning ----

    pub fn intern(&self, category: &Category) -> Result<CatId, ParseError> {
        Ok(self.categories.intern(category)?)
    }

    pub fn intern_str(&self, text: &str) -> Result<CatId, ParseError> {
        Ok(self.categories.intern_str(text)?)
    }

    pub fn category(&self, id: CatId) -> Result<Category, ParseError> {
        Ok(self.categories.resolve(id)?)
    }

    pub fn categories(&self) -> &CategoryInterner {
        &self.categories
    }

    pub fn tag(&self, name: &str) -> SymbolId {
        self.tags.intern(name)
    }

    pub fn tag_name(&self, id: SymbolId) -> Option<String> {
        self.tags.name(id)
    }

    pub fn word(&self, name: &str) -> SymbolId {
        self.words.intern(name)
    }

    pub fn word_name(&self, id: SymbolId) -> Option<String> {
        self.words.name(id)
    }

    pub fn top_id(&self) -> CatId {
        self.top
    }

    pub fn combinators(&self) -> &CombinatorConfig {
        &self.combinators
    }

    pub fn discovery(&self) -> DiscoveryMode {
        *self.discovery.read()
    }

    pub fn set_discovery(&self, mode: DiscoveryMode) {
        *self.discovery.write() = mode;
    }

    pub fn validity(&self) -> &ValidityTable {
        &self.validity
    }

    // ---- lexicon ----

    /// License `category` for words tagged `tag`. An entry taken out with
    /// [`remove_rule`](Self::remove_rule) stays out.
    pub fn add_lexical(&self, tag: &str, category: &Category) -> Result<Rule, ParseError> {
        let tag = self.tag(tag);
        let parent = self.intern(category)?;
        let rule = Rule::Lexical { parent, tag };
        let key = RuleKey::Lexical {
            tag,
            category: parent,
        };
        if self.validity.record_live(key, Validity::Valid) == Validity::Unused {
            return Ok(rule);
        }
        {
            let mut lexicon = self.lexicon.write();
            let entries = lexicon.entry(tag).or_default();
            if !entries.contains(&parent) {
                entries.push(parent);
            }
        }
        self.register_expansions(&[rule]);
        Ok(rule)
    }

    /// Whether `category` was licensed for `tag` and then removed.
    pub fn is_removed(&self, tag: &str, category: &Category) -> Result<bool, ParseError> {
        let Some(tag) = self.tags.get(tag) else {
            return Ok(false);
        };
        let category = self.intern(category)?;
        Ok(self.validity.get(&RuleKey::Lexical { tag, category }) == Validity::Unused)
    }

    /// Categories currently licensed for a tag.
    pub fn lexical(&self, tag: SymbolId) -> Vec<CatId> {
        let lexicon = self.lexicon.read();
        let Some(entries) = lexicon.get(&tag) else {
            return Vec::new();
        };
        entries
            .iter()
            .copied()
            .filter(|&category| {
                self.validity.get(&RuleKey::Lexical { tag, category }) == Validity::Valid
            })
            .collect()
    }

    /// Categories licensed for a tag name, resolved.
    pub fn lexical_categories(&self, tag: &str) -> Result<Vec<Category>, ParseError> {
        match self.tags.get(tag) {
            Some(id) => self
                .lexical(id)
                .into_iter()
                .map(|c| self.category(c))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    /// Number of licensed (tag, category) entries.
    pub fn lexicon_size(&self) -> usize {
        let lexicon = self.lexicon.read();
        lexicon
            .iter()
            .map(|(&tag, entries)| {
                entries
                    .iter()
                    .filter(|&&category| {
                        self.validity.get(&RuleKey::Lexical { tag, category }) == Validity::Valid
                    })
                    .count()
            })
            .sum()
    }

    // ---- binary rules ----

    /// Rules combining `left` with `right`, in that order.
    pub fn lookup_binary(&self, left: CatId, right: CatId) -> Result<RuleList, ParseError> {
        let key = RuleKey::Binary { left, right };
        match self.validity.get(&key) {
            Validity::Valid => {
                return Ok(self
                    .binary
                    .read()
                    .get(&(left, right))
                    .cloned()
                    .unwrap_or_else(no_rules));
            }
            Validity::Invalid | Validity::Unused => return Ok(no_rules()),
            Validity::Unknown => {}
        }
        if self.discovery() == DiscoveryMode::Closed {
            return Ok(no_rules());
        }
        self.discover_binary(left, right)
    }

    fn discover_binary(&self, left: CatId, right: CatId) -> Result<RuleList, ParseError> {
        let l = self.category(left)?;
        let r = self.category(right)?;

        let mut rules: Vec<Rule> = Vec::new();
        for combination in combinators::combine(&l, &r, &self.combinators) {
            let rule = Rule::Binary {
                parent: self.intern(&combination.parent)?,
                left,
                right,
                rule_type: combination.rule_type,
                arity: combination.arity,
                head: combination.head,
            };
            if !rules.contains(&rule) {
                rules.push(rule);
            }
        }

        let stored = {
            let mut table = self.binary.write();
            if let Some(existing) = table.get(&(left, right)) {
                existing.clone()
            } else if rules.is_empty() {
                no_rules()
            } else {
                let list: RuleList = Arc::from(rules);
                table.insert((left, right), list.clone());
                list
            }
        };

        let validity = if stored.is_empty() {
            Validity::Invalid
        } else {
            Validity::Valid
        };
        self.validity
            .record(RuleKey::Binary { left, right }, validity);
        self.register_expansions(&stored);
        trace!("{} {} → {} rules", l, r, stored.len());
        Ok(stored)
    }

    /// Insert a binary rule explicitly, as when loading a fixed grammar.
    pub fn add_binary(
        &self,
        left: &Category,
        right: &Category,
        parent: &Category,
        rule_type: RuleType,
        arity: u8,
        head: HeadDirection,
    ) -> Result<Rule, ParseError> {
        let left = self.intern(left)?;
        let right = self.intern(right)?;
        let rule = Rule::Binary {
            parent: self.intern(parent)?,
            left,
            right,
            rule_type,
            arity,
            head,
        };
        {
            let mut table = self.binary.write();
            let entry = table.entry((left, right)).or_insert_with(no_rules);
            if !entry.contains(&rule) {
                let mut rules = entry.to_vec();
                rules.push(rule);
                *entry = Arc::from(rules);
            }
        }
        self.validity
            .record(RuleKey::Binary { left, right }, Validity::Valid);
        self.register_expansions(&[rule]);
        Ok(rule)
    }

    // ---- unary rules ----

    /// Type-raising and type-changing rules over `child`.
    pub fn lookup_unary(&self, child: CatId) -> Result<Vec<Rule>, ParseError> {
        let rules = self.unary_entry(child)?;
        Ok(rules
            .iter()
            .copied()
            .filter(|rule| self.rule_validity(rule.parent(), child) == Validity::Valid)
            .collect())
    }

    /// The unary entry for `child`, with standing type-raising rules
    /// installed on first access.
    fn unary_entry(&self, child: CatId) -> Result<RuleList, ParseError> {
        if let Some(rules) = self.unary.read().get(&child) {
            return Ok(rules.clone());
        }

        let mut raised = Vec::new();
        if self.combinators.type_raising {
            let category = self.category(child)?;
            for target in self.type_raise_targets.iter().filter(|t| t.from == category) {
                for (direction, rule_type) in [
                    (Direction::Forward, RuleType::FwTypeRaise),
                    (Direction::Backward, RuleType::BwTypeRaise),
                ] {
                    if let Some(parent) = combinators::type_raise(&category, &target.to, direction)
                    {
                        raised.push(Rule::Unary {
                            parent: self.intern(&parent)?,
                            child,
                            rule_type,
                        });
                    }
                }
            }
        }

        let stored = self
            .unary
            .write()
            .entry(child)
            .or_insert_with(|| Arc::from(raised))
            .clone();
        for rule in stored.iter() {
            self.validity.record(
                RuleKey::Unary {
                    parent: rule.parent(),
                    child,
                },
                Validity::Valid,
            );
        }
        self.register_expansions(&stored);
        Ok(stored)
    }

    /// License the type change `child → parent`.
    pub fn add_type_change(&self, child: &Category, parent: &Category) -> Result<Rule, ParseError> {
        let child = self.intern(child)?;
        let rule = Rule::Unary {
            parent: self.intern(parent)?,
            child,
            rule_type: RuleType::TypeChange,
        };
        self.unary_entry(child)?;
        let key = RuleKey::Unary {
            parent: rule.parent(),
            child,
        };
        if self.validity.record_live(key, Validity::Valid) == Validity::Unused {
            return Ok(rule);
        }
        {
            let mut table = self.unary.write();
            let entry = table.entry(child).or_insert_with(no_rules);
            if !entry.contains(&rule) {
                let mut rules = entry.to_vec();
                rules.push(rule);
                *entry = Arc::from(rules);
            }
        }
        self.register_expansions(&[rule]);
        Ok(rule)
    }

    /// Validity of the unary pair `(parent, child)`.
    pub fn rule_validity(&self, parent: CatId, child: CatId) -> Validity {
        self.validity.get(&RuleKey::Unary { parent, child })
    }

    // ---- root rules ----

    /// License `category` as a sentence root.
    pub fn add_top(&self, category: &Category) -> Result<Rule, ParseError> {
        let child = self.intern(category)?;
        let rule = Rule::Unary {
            parent: self.top,
            child,
            rule_type: RuleType::Top,
        };
        self.tops.write().entry(child).or_insert(rule);
        self.validity.record(
            RuleKey::Unary {
                parent: self.top,
                child,
            },
            Validity::Valid,
        );
        self.register_expansions(&[rule]);
        Ok(rule)
    }

    /// The root rule over `child`, if one is in use.
    pub fn top_rule(&self, child: CatId) -> Option<Rule> {
        let rule = *self.tops.read().get(&child)?;
        (self.rule_validity(self.top, child) == Validity::Valid).then_some(rule)
    }

    /// Whether a root category suits a sentence of the given mood.
    pub fn root_compatible(category: &Category, mood: Mood) -> bool {
        if !category.is_atomic() || category.is_conj() {
            return false;
        }
        match mood {
            Mood::Declarative => {
                category.symbol() == Some("S") && category.feature() != Some(FEATURE_Q)
            }
            Mood::Interrogative => {
                category.symbol() == Some("Q")
                    || (category.symbol() == Some("S") && category.feature() == Some(FEATURE_Q))
            }
            Mood::Unknown => true,
        }
    }

    // ---- removal ----

    /// Switch a rule off. The pair is marked `Unused`, so open discovery
    /// will not bring it back.
    pub fn remove_rule(&self, rule: &Rule) {
        match *rule {
            Rule::Lexical { parent, tag } => {
                self.validity.set(
                    RuleKey::Lexical {
                        tag,
                        category: parent,
                    },
                    Validity::Unused,
                );
            }
            Rule::Unary { parent, child, .. } => {
                self.validity
                    .set(RuleKey::Unary { parent, child }, Validity::Unused);
            }
            Rule::Binary { left, right, .. } => {
                let mut table = self.binary.write();
                let remaining: Vec<Rule> = table
                    .get(&(left, right))
                    .map(|rules| rules.iter().copied().filter(|r| r != rule).collect())
                    .unwrap_or_default();
                if remaining.is_empty() {
                    table.remove(&(left, right));
                    self.validity
                        .set(RuleKey::Binary { left, right }, Validity::Unused);
                } else {
                    table.insert((left, right), Arc::from(remaining));
                }
            }
        }
    }

    // ---- expansions ----

    fn register_expansions(&self, rules: &[Rule]) {
        if rules.is_empty() {
            return;
        }
        let mut expansions = self.expansions.write();
        for rule in rules {
            expansions.entry(rule.parent()).or_default().insert(*rule);
        }
    }

    /// Number of distinct outcomes ever registered under `parent`.
    pub fn expansions(&self, parent: CatId) -> usize {
        self.expansions.read().get(&parent).map_or(0, HashSet::len)
    }

    /// Number of resolved binary pairs holding rules.
    pub fn binary_rule_count(&self) -> usize {
        self.binary.read().values().map(|r| r.len()).sum()
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("categories", &self.categories.len())
            .field("lexicon", &self.lexicon_size())
            .field("binary_rules", &self.binary_rule_count())
            .field("discovery", &self.discovery())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    fn grammar() -> Grammar {
        Grammar::new(&ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_open_discovery_records_validity() {
        let g = grammar();
        let det = g.intern(&cat("NP/N")).unwrap();
        let noun = g.intern(&cat("N")).unwrap();

        let rules = g.lookup_binary(det, noun).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].rule_type(), RuleType::FwApply);
        assert_eq!(g.category(rules[0].parent()).unwrap(), cat("NP"));
        assert_eq!(
            g.validity().get(&RuleKey::Binary { left: det, right: noun }),
            Validity::Valid
        );

        assert!(g.lookup_binary(noun, det).unwrap().is_empty());
        assert_eq!(
            g.validity().get(&RuleKey::Binary { left: noun, right: det }),
            Validity::Invalid
        );
    }

    #[test]
    fn test_closed_discovery_uses_known_rules_only() {
        let g = grammar();
        g.set_discovery(DiscoveryMode::Closed);
        let det = g.intern(&cat("NP/N")).unwrap();
        let noun = g.intern(&cat("N")).unwrap();
        assert!(g.lookup_binary(det, noun).unwrap().is_empty());

        g.add_binary(
            &cat("NP/N"),
            &cat("N"),
            &cat("NP"),
            RuleType::FwApply,
            0,
            HeadDirection::Right,
        )
        .unwrap();
        assert_eq!(g.lookup_binary(det, noun).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_rule_blocks_rediscovery() {
        let g = grammar();
        let det = g.intern(&cat("NP/N")).unwrap();
        let noun = g.intern(&cat("N")).unwrap();
        let rule = g.lookup_binary(det, noun).unwrap()[0];
        let parent = rule.parent();
        let before = g.expansions(parent);

        g.remove_rule(&rule);
        assert!(g.lookup_binary(det, noun).unwrap().is_empty());
        assert_eq!(
            g.validity().get(&RuleKey::Binary { left: det, right: noun }),
            Validity::Unused
        );
        assert_eq!(g.expansions(parent), before);
    }

    #[test]
    fn test_lexicon() {
        let g = grammar();
        let rule = g.add_lexical("NN", &cat("N")).unwrap();
        g.add_lexical("NN", &cat("N")).unwrap();
        g.add_lexical("DT", &cat("NP/N")).unwrap();
        assert_eq!(g.lexicon_size(), 2);
        assert_eq!(g.lexical_categories("NN").unwrap(), vec![cat("N")]);
        assert!(g.lexical_categories("VB").unwrap().is_empty());

        g.remove_rule(&rule);
        assert!(g.lexical(g.tag("NN")).is_empty());
        assert_eq!(g.lexicon_size(), 1);
    }

    #[test]
    fn test_removed_entries_stay_removed() {
        let g = grammar();
        let rule = g.add_lexical("NN", &cat("N")).unwrap();
        assert!(!g.is_removed("NN", &cat("N")).unwrap());
        g.remove_rule(&rule);

        assert_eq!(g.add_lexical("NN", &cat("N")).unwrap(), rule);
        assert!(g.lexical_categories("NN").unwrap().is_empty());
        assert!(g.is_removed("NN", &cat("N")).unwrap());
        assert!(!g.is_removed("VB", &cat("S")).unwrap());

        let change = g.add_type_change(&cat("N"), &cat("NP")).unwrap();
        g.remove_rule(&change);
        g.add_type_change(&cat("N"), &cat("NP")).unwrap();
        let n = g.intern(&cat("N")).unwrap();
        assert!(g.lookup_unary(n).unwrap().is_empty());
    }

    #[test]
    fn test_type_raising_is_standing() {
        let mut config = ParserConfig::default();
        config.combinators.type_raising = true;
        let g = Grammar::new(&config).unwrap();
        let np = g.intern(&cat("NP")).unwrap();

        let rules = g.lookup_unary(np).unwrap();
        let parents: Vec<Category> = rules.iter().map(|r| g.category(r.parent()).unwrap()).collect();
        assert_eq!(parents, vec![cat("S/(S\\NP)"), cat("S\\(S/NP)")]);

        let pp = g.intern(&cat("PP")).unwrap();
        assert!(g.lookup_unary(pp).unwrap().is_empty());
    }

    #[test]
    fn test_type_change_and_removal() {
        let g = grammar();
        let rule = g.add_type_change(&cat("N"), &cat("NP")).unwrap();
        let n = g.intern(&cat("N")).unwrap();
        assert_eq!(g.lookup_unary(n).unwrap(), vec![rule]);
        assert_eq!(g.rule_validity(rule.parent(), n), Validity::Valid);

        g.remove_rule(&rule);
        assert!(g.lookup_unary(n).unwrap().is_empty());
        assert_eq!(g.rule_validity(rule.parent(), n), Validity::Unused);
    }

    #[test]
    fn test_top_rules_and_mood() {
        let g = grammar();
        let s = g.intern(&cat("S")).unwrap();
        assert!(g.top_rule(s).is_none());
        let rule = g.add_top(&cat("S")).unwrap();
        assert_eq!(g.top_rule(s), Some(rule));
        assert_eq!(g.expansions(g.top_id()), 1);

        assert!(Grammar::root_compatible(&cat("S[dcl]"), Mood::Declarative));
        assert!(!Grammar::root_compatible(&cat("S[q]"), Mood::Declarative));
        assert!(Grammar::root_compatible(&cat("S[q]"), Mood::Interrogative));
        assert!(Grammar::root_compatible(&cat("Q"), Mood::Interrogative));
        assert!(!Grammar::root_compatible(&cat("NP"), Mood::Interrogative));
        assert!(Grammar::root_compatible(&cat("NP"), Mood::Unknown));
        assert!(!Grammar::root_compatible(&cat("S\\NP"), Mood::Unknown));
    }
}

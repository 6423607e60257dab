//! Initial lexicon from tag classes.
//!
//! Training starts from a handful of atomic categories: nouns are `N`,
//! verbs are `S`, conjunctions are `conj` and punctuation marks are their
//! own atom. Everything else is left to induction.

use ccg_core::category::is_punctuation_symbol;
use ccg_core::Category;
use ccg_parser::{Grammar, ParseError, Sentence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tag classes that receive an atomic category before training.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedTags {
    pub nouns: Vec<String>,
    pub verbs: Vec<String>,
    pub conjunctions: Vec<String>,
    /// Also license `N` as a root.
    pub noun_roots: bool,
}

impl Default for SeedTags {
    fn default() -> Self {
        let tags = |list: &[&str]| list.iter().map(|t| t.to_string()).collect();
        Self {
            nouns: tags(&["NN", "NNS", "NNP", "NNPS", "PRP"]),
            verbs: tags(&["VB", "VBD", "VBG", "VBN", "VBP", "VBZ", "MD"]),
            conjunctions: tags(&["CC"]),
            noun_roots: false,
        }
    }
}

impl SeedTags {
    /// The seed category of `tag`, if it belongs to a class.
    pub fn category_for(&self, tag: &str) -> Option<Category> {
        let contains = |list: &[String]| list.iter().any(|t| t == tag);
        if contains(&self.nouns) {
            Some(Category::n())
        } else if contains(&self.verbs) {
            Some(Category::s())
        } else if contains(&self.conjunctions) {
            Some(Category::conj())
        } else if is_punctuation_symbol(tag) {
            Some(Category::atomic(tag))
        } else {
            None
        }
    }

    /// Whether `tag` is a conjunction or punctuation tag.
    pub fn is_function_tag(&self, tag: &str) -> bool {
        is_punctuation_symbol(tag) || self.conjunctions.iter().any(|t| t == tag)
    }
}

/// Seed `grammar` with the tags observed in `corpus` and install the root
/// rules. Returns the number of lexical entries added.
pub fn seed_lexicon(
    grammar: &Grammar,
    tags: &SeedTags,
    corpus: &[Sentence],
) -> Result<usize, ParseError> {
    let observed: BTreeSet<&str> = corpus.iter().flat_map(Sentence::tags).collect();

    let mut added = 0;
    for tag in observed {
        let Some(category) = tags.category_for(tag) else {
            continue;
        };
        if grammar.lexical_categories(tag)?.contains(&category) {
            continue;
        }
        grammar.add_lexical(tag, &category)?;
        added += 1;
    }

    grammar.add_top(&Category::s())?;
    if tags.noun_roots {
        grammar.add_top(&Category::n())?;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccg_parser::ParserConfig;

    fn corpus() -> Vec<Sentence> {
        vec![
            Sentence::from_tagged("dogs/NNS bark/VBP ./.").unwrap(),
            Sentence::from_tagged("the/DT cat/NN and/CC dog/NN sleep/VBP").unwrap(),
        ]
    }

    #[test]
    fn test_tag_classes() {
        let tags = SeedTags::default();
        assert_eq!(tags.category_for("NNS"), Some(Category::n()));
        assert_eq!(tags.category_for("VBZ"), Some(Category::s()));
        assert_eq!(tags.category_for("CC"), Some(Category::conj()));
        assert_eq!(tags.category_for(","), Some(Category::atomic(",")));
        assert_eq!(tags.category_for("DT"), None);
        assert!(tags.is_function_tag("CC"));
        assert!(tags.is_function_tag("."));
        assert!(!tags.is_function_tag("JJ"));
    }

    #[test]
    fn test_seed_only_observed_tags() {
        let grammar = Grammar::new(&ParserConfig::default()).unwrap();
        let added = seed_lexicon(&grammar, &SeedTags::default(), &corpus()).unwrap();

        // NNS, VBP, ., NN, CC
        assert_eq!(added, 5);
        assert_eq!(grammar.lexicon_size(), 5);
        assert!(grammar.lexical_categories("DT").unwrap().is_empty());
        assert!(grammar.lexical_categories("VBZ").unwrap().is_empty());

        let s = grammar.intern(&Category::s()).unwrap();
        assert!(grammar.top_rule(s).is_some());
        let n = grammar.intern(&Category::n()).unwrap();
        assert!(grammar.top_rule(n).is_none());
    }

    #[test]
    fn test_seeding_twice_adds_nothing() {
        let grammar = Grammar::new(&ParserConfig::default()).unwrap();
        let tags = SeedTags {
            noun_roots: true,
            ..SeedTags::default()
        };
        seed_lexicon(&grammar, &tags, &corpus()).unwrap();
        assert_eq!(seed_lexicon(&grammar, &tags, &corpus()).unwrap(), 0);

        let n = grammar.intern(&Category::n()).unwrap();
        assert!(grammar.top_rule(n).is_some());
    }
}

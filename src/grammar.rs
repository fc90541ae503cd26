use std::{collections::HashMap, fs, path::Path};

use crate::error::{Error, Result};

pub type GrammarRules = HashMap<String, Vec<String>>;

/// Loads a grammar-description resource: each line either declares
/// `non_terminal ::= alt1 | alt2 | …` or continues the most recently
/// declared non-terminal with further `|`-separated alternatives. The
/// result is inert data; the parser never consults it.
pub fn load_grammar(path: &Path) -> Result<GrammarRules> {
    parse_grammar(&fs::read_to_string(path)?)
}

pub fn parse_grammar(content: &str) -> Result<GrammarRules> {
    let mut rules = GrammarRules::new();
    let mut current: Option<String> = None;

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some((head, tail)) = line.split_once("::=") {
            let non_terminal = head.trim().to_string();
            rules.insert(non_terminal.clone(), split_alternatives(tail));
            current = Some(non_terminal);
        } else {
            let Some(non_terminal) = &current else {
                return Err(Error::Grammar {
                    line: index + 1,
                    message: "continuation line before any rule declaration".to_string(),
                });
            };

            if let Some(alternatives) = rules.get_mut(non_terminal) {
                alternatives.extend(split_alternatives(line));
            }
        }
    }

    Ok(rules)
}

fn split_alternatives(text: &str) -> Vec<String> {
    text.split('|')
        .map(|alternative| alternative.trim().to_string())
        .filter(|alternative| !alternative.is_empty())
        .collect()
}

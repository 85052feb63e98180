use indexmap::IndexMap;

use crate::error::{Result, WhosInSpaceError};

/// Names the roster spells differently from Supercluster's page slugs.
const BUILTIN_ALIASES: [(&str, &str); 2] = [
    ("Kjell Lindgren", "Kjell N. Lindgren"),
    ("Bob Hines", "Robert Hines"),
];

/// Maps roster-reported names to the canonical names the profile site uses.
///
/// No alias target may itself be an alias of some other name, which keeps
/// `normalize` idempotent.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    aliases: IndexMap<String, String>,
}

impl NameNormalizer {
    /// Builds a normalizer from an explicit alias table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a target name is also the source of
    /// a different alias (e.g. `A -> B` together with `B -> C`).
    pub fn new(aliases: IndexMap<String, String>) -> Result<Self> {
        for (from, to) in &aliases {
            if let Some(next) = aliases.get(to).filter(|next| *next != to) {
                return Err(WhosInSpaceError::Config(format!(
                    "alias '{from}' -> '{to}' chains into '{to}' -> '{next}'"
                )));
            }
        }

        Ok(Self { aliases })
    }

    /// The built-in aliases with `extra` merged over them.
    pub fn with_extra_aliases(extra: &IndexMap<String, String>) -> Result<Self> {
        let mut aliases = builtin_aliases();
        aliases.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self::new(aliases)
    }

    pub fn normalize(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self {
            aliases: builtin_aliases(),
        }
    }
}

fn builtin_aliases() -> IndexMap<String, String> {
    BUILTIN_ALIASES
        .iter()
        .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
        .collect()
}

use std::collections::{BTreeMap, BTreeSet};

/// Páry slugů, které označují stejný tým (oficiální název ↔ hovorová zkratka)
pub const DEFAULT_ALIAS_PAIRS: &[(&str, &str)] = &[
    ("manchester-city",         "man-city"),
    ("manchester-united",       "man-utd"),
    ("manchester-united",       "man-united"),
    ("tottenham",               "spurs"),
    ("wolverhampton-wanderers", "wolves"),
    ("west-ham",                "west-ham-united"),
    ("bournemouth",             "bmouth"),
    ("newcastle-united",        "newcastle"),
    ("nottingham-forest",       "forest"),
    ("nottingham-forest",       "nott-m-forest"),
    ("sheffield-united",        "sheff-utd"),
    ("sheffield-united",        "sheffield-utd"),
    ("crystal-palace",          "palace"),
];

/// Symetrická tabulka aliasů.
///
/// Uzávěr se počítá jednou v konstruktoru: každý slug ukazuje na celou
/// komponentu (bez sebe), takže řetězec `man-utd ↔ manchester-united ↔ man-united`
/// je propojený oběma směry.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    closure: BTreeMap<String, BTreeSet<String>>,
}

impl AliasTable {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut adjacency: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (a, b) in pairs {
            if a == b {
                continue;
            }
            adjacency.entry(a.to_string()).or_default().insert(b.to_string());
            adjacency.entry(b.to_string()).or_default().insert(a.to_string());
        }

        let mut closure = BTreeMap::new();
        for start in adjacency.keys() {
            let mut seen = BTreeSet::new();
            let mut stack = vec![start.clone()];
            while let Some(slug) = stack.pop() {
                if !seen.insert(slug.clone()) {
                    continue;
                }
                if let Some(next) = adjacency.get(&slug) {
                    stack.extend(next.iter().filter(|s| !seen.contains(*s)).cloned());
                }
            }
            seen.remove(start);
            closure.insert(start.clone(), seen);
        }

        Self { closure }
    }

    /// Tabulka s vestavěnými EPL aliasy
    pub fn builtin() -> Self {
        Self::from_pairs(DEFAULT_ALIAS_PAIRS.iter().copied())
    }

    /// Všechny aliasy slugu (bez něj samotného). Neznámý slug → prázdná množina.
    pub fn aliases_of(&self, slug: &str) -> BTreeSet<String> {
        self.closure.get(slug).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.closure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closure.is_empty()
    }

    /// (slug, aliasy) v abecedním pořadí
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.closure.iter()
    }
}

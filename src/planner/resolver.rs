//! Exercise name resolution - exact, alias and fuzzy matching against the catalog

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

use crate::catalog::Catalog;

/// Minimum similarity ratio for a fuzzy match to be accepted.
const ACCEPT_RATIO: f64 = 0.84;
/// Ratio at which the candidate scan short-circuits.
const SHORTCUT_RATIO: f64 = 0.93;
/// Cap on the candidate pool when no token overlap exists and the whole
/// catalog has to be scanned. Keeps pathological inputs O(cap), not O(n).
const MAX_FALLBACK_CANDIDATES: usize = 5000;

static PARENS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Colloquial name -> canonical catalog name. Both sides are normalized at
/// index build time.
const ALIASES: &[(&str, &str)] = &[
    ("bench press", "dumbbell bench press"),
    ("bench", "dumbbell bench press"),
    ("squat", "barbell back squat"),
    ("squats", "barbell back squat"),
    ("back squat", "barbell back squat"),
    ("front squat", "barbell front squat"),
    ("deadlift", "barbell deadlift"),
    ("deadlifts", "barbell deadlift"),
    ("rdl", "barbell romanian deadlift"),
    ("romanian deadlift", "barbell romanian deadlift"),
    ("overhead press", "barbell overhead press"),
    ("ohp", "barbell overhead press"),
    ("military press", "barbell overhead press"),
    ("shoulder press", "dumbbell shoulder press"),
    ("row", "barbell bent over row"),
    ("rows", "barbell bent over row"),
    ("bent over row", "barbell bent over row"),
    ("dumbbell row", "one arm dumbbell row"),
    ("lat pulldown", "cable lat pulldown"),
    ("pulldown", "cable lat pulldown"),
    ("pullup", "pull-up"),
    ("pullups", "pull-up"),
    ("chinup", "chin-up"),
    ("pushup", "push-up"),
    ("pushups", "push-up"),
    ("press up", "push-up"),
    ("dips", "triceps dip"),
    ("bicep curl", "dumbbell curl"),
    ("biceps curl", "dumbbell curl"),
    ("hammer curl", "dumbbell hammer curl"),
    ("tricep pushdown", "cable triceps pushdown"),
    ("triceps pushdown", "cable triceps pushdown"),
    ("skull crusher", "lying triceps extension"),
    ("lunge", "dumbbell walking lunge"),
    ("lunges", "dumbbell walking lunge"),
    ("walking lunge", "dumbbell walking lunge"),
    ("split squat", "dumbbell bulgarian split squat"),
    ("bulgarian split squat", "dumbbell bulgarian split squat"),
    ("hip thrust", "barbell hip thrust"),
    ("hip thrusts", "barbell hip thrust"),
    ("lateral raise", "dumbbell lateral raise"),
    ("side raise", "dumbbell lateral raise"),
    ("face pull", "cable face pull"),
    ("calf raise", "standing calf raise"),
    ("calf raises", "standing calf raise"),
    ("sit up", "crunch"),
    ("situps", "crunch"),
    ("crunches", "crunch"),
    ("leg raise", "hanging leg raise"),
    ("swing", "kettlebell swing"),
    ("kb swing", "kettlebell swing"),
    ("farmers carry", "farmers walk"),
    ("burpees", "burpee"),
];

/// How a name was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Exact,
    Alias,
    Fuzzy,
    None,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Exact => "exact",
            MatchMethod::Alias => "alias",
            MatchMethod::Fuzzy => "fuzzy",
            MatchMethod::None => "none",
        }
    }
}

/// Result of a resolution attempt.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub exercise_id: Option<String>,
    pub matched_name: String,
    pub method: MatchMethod,
}

/// Normalize a free-text exercise name for matching: fold to ASCII,
/// lowercase, drop parenthetical content, treat hyphens/slashes as spaces,
/// strip everything that is not alphanumeric, collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let stripped = PARENS_RE.replace_all(raw, " ");
    let mut out = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        let c = fold_char(c).to_ascii_lowercase();
        let c = if c == '-' || c == '/' { ' ' } else { c };
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with(' ') {
            out.push(' ');
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Fold common accented Latin characters to their ASCII base. Anything
/// else outside ASCII becomes a word boundary.
fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'ø' | 'Ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        c if c.is_ascii() => c,
        _ => ' ',
    }
}

struct Index {
    /// Normalized record name -> record position.
    by_norm: HashMap<String, usize>,
    /// Normalized alias -> normalized canonical name.
    aliases: HashMap<String, String>,
    /// Token -> record positions whose normalized name contains the token.
    tokens: HashMap<String, Vec<usize>>,
    /// Normalized name per record position.
    norm_names: Vec<String>,
}

impl Index {
    fn build(catalog: &Catalog) -> Self {
        let mut by_norm = HashMap::new();
        let mut tokens: HashMap<String, Vec<usize>> = HashMap::new();
        let mut norm_names = Vec::with_capacity(catalog.len());

        for (pos, record) in catalog.records().iter().enumerate() {
            let norm = normalize_name(&record.name);
            by_norm.entry(norm.clone()).or_insert(pos);
            for token in norm.split_whitespace() {
                let posting = tokens.entry(token.to_string()).or_default();
                if posting.last() != Some(&pos) {
                    posting.push(pos);
                }
            }
            norm_names.push(norm);
        }

        let aliases = ALIASES
            .iter()
            .map(|(from, to)| (normalize_name(from), normalize_name(to)))
            .collect();

        Self { by_norm, aliases, tokens, norm_names }
    }
}

/// Resolves free-text exercise names to catalog ids. The lookup index is
/// built lazily on first use and cached for the life of the resolver.
pub struct NameResolver {
    catalog: Arc<Catalog>,
    index: OnceCell<Index>,
}

impl NameResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog, index: OnceCell::new() }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn index(&self) -> &Index {
        self.index.get_or_init(|| Index::build(&self.catalog))
    }

    /// Resolve a free-text name. Pure: no side effects beyond the one-time
    /// index construction.
    pub fn resolve(&self, name: &str) -> Resolution {
        let index = self.index();
        let norm = normalize_name(name);
        if norm.is_empty() {
            return Resolution {
                exercise_id: None,
                matched_name: String::new(),
                method: MatchMethod::None,
            };
        }

        if let Some(&pos) = index.by_norm.get(&norm) {
            return self.hit(pos, MatchMethod::Exact);
        }

        let query = match index.aliases.get(&norm) {
            Some(canonical) => {
                if let Some(&pos) = index.by_norm.get(canonical) {
                    return self.hit(pos, MatchMethod::Alias);
                }
                canonical.clone()
            }
            None => norm,
        };

        match self.fuzzy(index, &query) {
            Some(pos) => self.hit(pos, MatchMethod::Fuzzy),
            None => Resolution {
                exercise_id: None,
                matched_name: name.to_string(),
                method: MatchMethod::None,
            },
        }
    }

    fn hit(&self, pos: usize, method: MatchMethod) -> Resolution {
        let record = &self.catalog.records()[pos];
        Resolution {
            exercise_id: Some(record.exercise_id.clone()),
            matched_name: record.name.clone(),
            method,
        }
    }

    /// Token-narrowed fuzzy scan. Candidates share at least one token with
    /// the query; without any overlap the whole catalog is scanned, capped
    /// at `MAX_FALLBACK_CANDIDATES`.
    fn fuzzy(&self, index: &Index, query: &str) -> Option<usize> {
        let mut candidates: Vec<usize> = Vec::new();
        for token in query.split_whitespace() {
            if let Some(posting) = index.tokens.get(token) {
                candidates.extend_from_slice(posting);
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        if candidates.is_empty() {
            candidates = (0..index.norm_names.len().min(MAX_FALLBACK_CANDIDATES)).collect();
        }

        let mut best: Option<(usize, f64)> = None;
        for pos in candidates {
            let ratio = similarity(query, &index.norm_names[pos]);
            if ratio >= SHORTCUT_RATIO {
                return Some(pos);
            }
            if best.map_or(true, |(_, b)| ratio > b) {
                best = Some((pos, ratio));
            }
        }
        best.filter(|&(_, ratio)| ratio >= ACCEPT_RATIO).map(|(pos, _)| pos)
    }
}

/// Canonical alias targets, in declaration order. Used by the reconciler
/// to pick substitutes for duplicate exercises.
pub fn alias_targets() -> impl Iterator<Item = &'static str> {
    ALIASES.iter().map(|(_, to)| *to)
}

/// Similarity ratio in [0, 1] based on Levenshtein distance over the
/// normalized (ASCII) strings.
fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a.as_bytes(), b.as_bytes()) as f64 / max_len as f64
}

fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

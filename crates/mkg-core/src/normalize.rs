//! Text Normalizer: canonicalizes entity surface forms into the
//! stable key the graph store indexes nodes by.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Medical abbreviations that are themselves the canonical clinical spelling
/// and must survive normalization in their original mixed case.
const PRESERVED_ABBREVIATIONS: &[(&str, &str)] = &[
    ("egfr", "eGFR"),
    ("hba1c", "HbA1c"),
    ("ckd", "CKD"),
];

/// Token-wise expansions for Vietnamese clinical shorthand.
const ABBREVIATION_EXPANSIONS: &[(&str, &str)] = &[
    ("btm", "bệnh thận mạn"),
    ("đtđ", "đái tháo đường"),
];

/// Canonical term -> colloquial variants, collapsed by substring replacement.
const SYNONYM_GROUPS: &[(&str, &[&str])] = &[
    ("đái tháo đường", &["bệnh tiểu đường", "tiểu đường"]),
    ("bệnh thận mạn", &["suy thận mạn tính", "suy thận mạn"]),
];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\([^)]*\)|\[[^\]]*\]|\bv\d+(?:\.\d+)*\b|\bphiên bản\s*\d+\b|\btrang\s*\d+\b|\bpage\s*\d+\b",
        )
        .unwrap()
    })
}

/// Canonicalizes a raw entity surface form. Pure, total, and idempotent:
/// `normalize(normalize(x)) == normalize(x)` for all `x`.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "Unknown".to_string();
    }

    let nfc: String = raw.nfc().collect();
    let lowered = whitespace_re()
        .replace_all(nfc.trim(), " ")
        .to_lowercase();

    let expanded = lowered
        .split(' ')
        .map(expand_token)
        .collect::<Vec<_>>()
        .join(" ");

    let mut collapsed = expanded;
    for (canonical, variants) in SYNONYM_GROUPS {
        for variant in *variants {
            if collapsed.contains(variant) {
                collapsed = collapsed.replace(variant, canonical);
            }
        }
    }

    let stripped = noise_re().replace_all(&collapsed, "");
    let recollapsed = whitespace_re().replace_all(stripped.trim(), " ");

    let result = capitalize_first(&recollapsed);
    if result.is_empty() {
        "Unknown".to_string()
    } else {
        result
    }
}

fn expand_token(tok: &str) -> String {
    for (key, canonical) in PRESERVED_ABBREVIATIONS {
        if tok == *key {
            return canonical.to_string();
        }
    }
    for (key, expansion) in ABBREVIATION_EXPANSIONS {
        if tok == *key {
            return expansion.to_string();
        }
    }
    tok.to_string()
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

use once_cell::sync::Lazy;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Common surname prefixes (case-insensitive).
static SURNAME_PREFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "van", "von", "de", "del", "della", "der", "den", "di", "da", "du", "al", "el", "la", "le",
        "ben", "ibn", "mac", "mc", "o",
    ]
    .into_iter()
    .collect()
});

/// Name suffixes to strip.
static NAME_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["jr", "sr", "ii", "iii", "iv", "phd", "md", "esq"]
        .into_iter()
        .collect()
});

/// Titles that may precede a name.
static HONORIFICS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "dr", "prof", "professor", "mr", "mrs", "ms", "miss", "sir", "dame", "rev",
    ]
    .into_iter()
    .collect()
});

/// A person name split into given names and surname, case- and accent-folded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedName {
    given: Vec<String>,
    surname: String,
}

/// Check whether two author names plausibly refer to the same person.
///
/// Tolerates initials (`"R. Takahashi"` vs `"Ryo Takahashi"`), the
/// `"Surname, Given"` ordering, family-name-first ordering, honorifics,
/// generational suffixes, and accents. Surnames must agree; given names only
/// need to be compatible where both sides provide them.
pub fn names_match(name_a: &str, name_b: &str) -> bool {
    let (Some(a), Some(b)) = (parse_name(name_a), parse_name(name_b)) else {
        return false;
    };

    if same_person(&a, &b) {
        return true;
    }

    // Family-name-first reading ("Takahashi Ryo") of a bare two-word name.
    let rev_a = reversed_reading(name_a);
    let rev_b = reversed_reading(name_b);
    rev_a.as_ref().is_some_and(|ra| same_person(ra, &b))
        || rev_b.as_ref().is_some_and(|rb| same_person(&a, rb))
}

fn same_person(a: &ParsedName, b: &ParsedName) -> bool {
    squash(&a.surname) == squash(&b.surname) && given_compatible(&a.given, &b.given)
}

/// Compare given names position by position; an initial matches any name
/// sharing its first letter. A missing given name is compatible with anything.
fn given_compatible(a: &[String], b: &[String]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| {
        if x == y {
            return true;
        }
        if x.chars().count() == 1 || y.chars().count() == 1 {
            return x.chars().next() == y.chars().next();
        }
        false
    })
}

/// Drop spaces and hyphens so "Van Bavel", "VanBavel" and "Van-Bavel" agree.
fn squash(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Lowercase, strip accents, and split a name into tokens.
///
/// Dots separate tokens, so `"R.Takahashi"` and `"R. Takahashi"` agree.
fn tokenize(name: &str) -> Vec<String> {
    let folded: String = name
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    folded
        .split(|c: char| c.is_whitespace() || c == '.')
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
        .map(|t| t.trim_matches('-'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Remove leading honorifics and trailing suffixes.
fn strip_decorations(mut parts: Vec<String>) -> Vec<String> {
    while parts.len() >= 2 && HONORIFICS.contains(parts[0].as_str()) {
        parts.remove(0);
    }
    while parts.len() >= 2
        && parts
            .last()
            .is_some_and(|p| NAME_SUFFIXES.contains(p.as_str()))
    {
        parts.pop();
    }
    parts
}

/// Split hyphenated given names so "Jean-Pierre" lines up with "J.-P.".
fn split_given(parts: &[String]) -> Vec<String> {
    parts
        .iter()
        .flat_map(|p| p.split('-'))
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Number of trailing tokens that make up the surname.
fn surname_len(parts: &[String]) -> usize {
    // Three-part surnames like "De La Cruz"
    if parts.len() >= 4 && SURNAME_PREFIXES.contains(parts[parts.len() - 3].as_str()) {
        return 3;
    }
    // Two-part surnames like "Van Bavel"
    if parts.len() >= 3 && SURNAME_PREFIXES.contains(parts[parts.len() - 2].as_str()) {
        return 2;
    }
    1
}

fn parse_name(name: &str) -> Option<ParsedName> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    // "Surname, Given" format
    if let Some((surname, given)) = name.split_once(',') {
        let surname_parts = strip_decorations(tokenize(surname));
        if surname_parts.is_empty() {
            return None;
        }
        let given_parts: Vec<String> = tokenize(given)
            .into_iter()
            .filter(|p| !NAME_SUFFIXES.contains(p.as_str()) && !HONORIFICS.contains(p.as_str()))
            .collect();
        return Some(ParsedName {
            given: split_given(&given_parts),
            surname: surname_parts.join(" "),
        });
    }

    let parts = strip_decorations(tokenize(name));
    if parts.is_empty() {
        return None;
    }
    if parts.len() == 1 {
        return Some(ParsedName {
            given: vec![],
            surname: parts[0].clone(),
        });
    }

    let split = parts.len() - surname_len(&parts);
    Some(ParsedName {
        given: split_given(&parts[..split]),
        surname: parts[split..].join(" "),
    })
}

/// Read a two-token name with the family name first.
fn reversed_reading(name: &str) -> Option<ParsedName> {
    if name.contains(',') {
        return None;
    }
    let parts = strip_decorations(tokenize(name));
    if parts.len() != 2 {
        return None;
    }
    Some(ParsedName {
        given: split_given(&parts[1..]),
        surname: parts[0].clone(),
    })
}

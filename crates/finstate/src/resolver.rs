//! Company name to corporate identifier resolution.

use finstate_core::CorporateDirectoryEntry;
use tracing::debug;

/// Quality of a name match, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchClass {
    Exact,
    Substring,
}

/// Finds the directory entry for a company name.
///
/// An entry whose name equals `name` beats any entry that merely contains it,
/// wherever the two sit in the directory. Within a match class the earliest
/// entry wins. Blank names never match.
#[must_use]
pub fn resolve_entry<'a>(
    name: &str,
    directory: &'a [CorporateDirectoryEntry],
) -> Option<&'a CorporateDirectoryEntry> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut best: Option<(MatchClass, &CorporateDirectoryEntry)> = None;
    for entry in directory {
        let class = if entry.display_name == name {
            MatchClass::Exact
        } else if entry.display_name.contains(name) {
            MatchClass::Substring
        } else {
            continue;
        };

        if best.is_none_or(|(seen, _)| class < seen) {
            best = Some((class, entry));
        }
        if class == MatchClass::Exact {
            break;
        }
    }

    match best {
        Some((class, entry)) => {
            debug!(
                name,
                corp_code = %entry.identifier,
                display_name = %entry.display_name,
                match_class = ?class,
                "Resolved company name"
            );
            Some(entry)
        }
        None => {
            debug!(name, "No directory entry matches company name");
            None
        }
    }
}

/// Resolves a company name to its corporate identifier.
///
/// Returns `None` when no entry matches; that is an expected outcome, not an error.
#[must_use]
pub fn resolve<'a>(name: &str, directory: &'a [CorporateDirectoryEntry]) -> Option<&'a str> {
    resolve_entry(name, directory).map(|entry| entry.identifier.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(entries: &[(&str, &str)]) -> Vec<CorporateDirectoryEntry> {
        entries
            .iter()
            .map(|(id, name)| CorporateDirectoryEntry::new(*id, *name))
            .collect()
    }

    #[test]
    fn test_exact_beats_earlier_substring() {
        let dir = directory(&[("A", "Sam Electronics Sub"), ("B", "Sam")]);
        assert_eq!(resolve("Sam", &dir), Some("B"));
    }

    #[test]
    fn test_exact_beats_later_substring() {
        let dir = directory(&[("B", "Sam"), ("A", "Sam Electronics Sub")]);
        assert_eq!(resolve("Sam", &dir), Some("B"));
    }

    #[test]
    fn test_first_substring_wins() {
        let dir = directory(&[
            ("X", "Korea Gas"),
            ("A", "Samsung Electronics"),
            ("C", "Samsung C&T"),
        ]);
        assert_eq!(resolve("Samsung", &dir), Some("A"));
    }

    #[test]
    fn test_first_exact_wins_among_duplicates() {
        let dir = directory(&[("A", "다코"), ("B", "다코")]);
        assert_eq!(resolve("다코", &dir), Some("A"));
    }

    #[test]
    fn test_no_match() {
        let dir = directory(&[("A", "삼성전자"), ("B", "SK하이닉스")]);
        assert_eq!(resolve("LG화학", &dir), None);
        assert_eq!(resolve("LG화학", &[]), None);
    }

    #[test]
    fn test_blank_name() {
        let dir = directory(&[("A", "삼성전자")]);
        assert_eq!(resolve("", &dir), None);
        assert_eq!(resolve("   ", &dir), None);
    }

    #[test]
    fn test_resolve_entry_returns_entry() {
        let dir = vec![CorporateDirectoryEntry::new("00126380", "삼성전자").with_stock_code("005930")];
        let entry = resolve_entry("삼성", &dir).unwrap();
        assert_eq!(entry.stock_code.as_deref(), Some("005930"));
    }
}

//! Page selection: "all", "current", or a free-form range expression.
//!
//! Expressions are 1-based on the way in ("1, 3, 5-7") and 0-based on the
//! way out. Any invalid token fails the whole parse; selections never
//! silently drop pages.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::PdfDeskError;

/// How the caller names the pages an operation applies to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PageSelection {
    /// Every page of the document.
    All,
    /// The single page the user is looking at (zero-based).
    Current { index: usize },
    /// A free-form expression of comma-separated singles and ranges.
    Expression { expr: String },
}

impl PageSelection {
    /// Resolve to a normalized, deduplicated, ascending set of zero-based
    /// page indices, validated against the document's page count.
    pub fn resolve(&self, total_pages: usize) -> Result<Vec<usize>, PdfDeskError> {
        if total_pages == 0 {
            return Err(PdfDeskError::InvalidSelection(
                "document has no pages".into(),
            ));
        }
        match self {
            PageSelection::All => Ok((0..total_pages).collect()),
            PageSelection::Current { index } => {
                if *index >= total_pages {
                    return Err(PdfDeskError::InvalidSelection(format!(
                        "page index {} out of range (document has {} pages)",
                        index, total_pages
                    )));
                }
                Ok(vec![*index])
            }
            PageSelection::Expression { expr } => parse_expression(expr, total_pages),
        }
    }
}

/// Parse a range expression like "1-3, 5, 8-10" into sorted unique
/// zero-based indices.
pub fn parse_expression(expr: &str, total_pages: usize) -> Result<Vec<usize>, PdfDeskError> {
    let mut pages = BTreeSet::new();

    for part in expr.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_bound(start, total_pages)?;
            let end = parse_bound(end, total_pages)?;
            if start > end {
                return Err(PdfDeskError::InvalidSelection(format!(
                    "range '{}': start {} > end {}",
                    part, start, end
                )));
            }
            for page in start..=end {
                pages.insert(page - 1);
            }
        } else {
            pages.insert(parse_bound(part, total_pages)? - 1);
        }
    }

    if pages.is_empty() {
        return Err(PdfDeskError::InvalidSelection(format!(
            "'{}' selects no pages",
            expr
        )));
    }
    Ok(pages.into_iter().collect())
}

fn parse_bound(token: &str, total_pages: usize) -> Result<usize, PdfDeskError> {
    let page: usize = token
        .trim()
        .parse()
        .map_err(|_| PdfDeskError::InvalidSelection(format!("invalid page number: '{}'", token.trim())))?;
    if page == 0 {
        return Err(PdfDeskError::InvalidSelection(
            "page 0 is invalid (pages start at 1)".into(),
        ));
    }
    if page > total_pages {
        return Err(PdfDeskError::InvalidSelection(format!(
            "page {} exceeds document page count ({})",
            page, total_pages
        )));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_selects_every_page() {
        assert_eq!(PageSelection::All.resolve(4).unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_current_validates_against_total() {
        assert_eq!(
            PageSelection::Current { index: 2 }.resolve(5).unwrap(),
            vec![2]
        );
        assert!(PageSelection::Current { index: 5 }.resolve(5).is_err());
    }

    #[test]
    fn test_empty_document_rejected() {
        assert!(PageSelection::All.resolve(0).is_err());
    }

    #[test]
    fn test_expression_mixed() {
        assert_eq!(
            parse_expression("1,3,5-7", 10).unwrap(),
            vec![0, 2, 4, 5, 6]
        );
    }

    #[test]
    fn test_expression_deduplicates_and_sorts() {
        assert_eq!(parse_expression("5, 1-3, 2-4", 10).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_expression_whitespace_tolerated() {
        assert_eq!(parse_expression(" 1 , 3 - 5 ", 5).unwrap(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_reversed_range_fails() {
        let err = parse_expression("5-3", 10).unwrap_err();
        assert!(err.to_string().contains("5-3"), "error names the token: {}", err);
    }

    #[test]
    fn test_out_of_bounds_fails_whole_expression() {
        // "1" alone would be fine; the bad token rejects everything.
        assert!(parse_expression("1, 99", 10).is_err());
        assert!(parse_expression("1, 5-20", 10).is_err());
    }

    #[test]
    fn test_non_numeric_token_fails() {
        let err = parse_expression("1, two, 3", 10).unwrap_err();
        assert!(err.to_string().contains("two"));
    }

    #[test]
    fn test_page_zero_fails() {
        assert!(parse_expression("0", 10).is_err());
        assert!(parse_expression("0-3", 10).is_err());
    }

    #[test]
    fn test_expression_selecting_nothing_fails() {
        assert!(parse_expression("", 10).is_err());
        assert!(parse_expression(" , , ", 10).is_err());
    }

    #[test]
    fn test_selection_json_round_trip() {
        let sel: PageSelection = serde_json::from_str(r#"{"type":"expression","expr":"1-3"}"#).unwrap();
        assert_eq!(
            sel,
            PageSelection::Expression {
                expr: "1-3".to_string()
            }
        );
        let sel: PageSelection = serde_json::from_str(r#"{"type":"all"}"#).unwrap();
        assert_eq!(sel, PageSelection::All);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Valid expressions resolve to strictly ascending, in-bounds,
            // duplicate-free indices.
            #[test]
            fn resolved_indices_are_normalized(
                total in 1usize..50,
                starts in proptest::collection::vec(1usize..50, 1..6),
                lens in proptest::collection::vec(0usize..5, 1..6),
            ) {
                let tokens: Vec<String> = starts
                    .iter()
                    .zip(&lens)
                    .map(|(&s, &l)| {
                        let start = (s % total.max(1)).max(1).min(total);
                        let end = (start + l).min(total);
                        if end > start {
                            format!("{}-{}", start, end)
                        } else {
                            format!("{}", start)
                        }
                    })
                    .collect();
                let expr = tokens.join(",");
                let resolved = parse_expression(&expr, total).unwrap();
                prop_assert!(!resolved.is_empty());
                prop_assert!(resolved.windows(2).all(|w| w[0] < w[1]));
                prop_assert!(resolved.iter().all(|&p| p < total));
            }
        }
    }
}

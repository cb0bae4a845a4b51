//! Page range expressions.
//!
//! Range expressions are what users type into page selectors: `"1-3,5,8"`,
//! `"all"`, or nothing at all. Parsing is best-effort: references outside the
//! document and tokens that are not numbers are dropped rather than reported.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A sorted, duplicate-free set of zero-based page indices.
///
/// Every index is below the page count the set was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageRangeSet {
    indices: Vec<usize>,
}

impl PageRangeSet {
    /// Parse a range expression against a document with `total_pages` pages.
    ///
    /// Values are 1-based in the expression and 0-based in the result.
    ///
    /// # Example
    ///
    /// ```
    /// use folio::PageRangeSet;
    ///
    /// let set = PageRangeSet::parse("1-3,5,8", 6);
    /// assert_eq!(set.indices(), &[0, 1, 2, 4]);
    /// ```
    pub fn parse(expr: &str, total_pages: usize) -> Self {
        let expr = expr.trim();
        if expr.is_empty() || expr.eq_ignore_ascii_case("all") {
            return Self::all(total_pages);
        }

        let mut pages = BTreeSet::new();
        for part in expr.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((start, end)) = part.split_once('-') {
                let (Ok(start), Ok(end)) = (start.trim().parse::<i64>(), end.trim().parse::<i64>())
                else {
                    log::debug!("Skipping malformed range token {:?}", part);
                    continue;
                };
                // Clamp before iterating so "1-999999999" stays cheap.
                let first = start.max(1);
                let last = end.min(total_pages as i64);
                for page in first..=last {
                    pages.insert((page - 1) as usize);
                }
            } else {
                match part.parse::<i64>() {
                    Ok(page) if page >= 1 && page <= total_pages as i64 => {
                        pages.insert((page - 1) as usize);
                    }
                    Ok(_) => {}
                    Err(_) => log::debug!("Skipping malformed page token {:?}", part),
                }
            }
        }

        Self {
            indices: pages.into_iter().collect(),
        }
    }

    /// Every page of a document with `total_pages` pages.
    pub fn all(total_pages: usize) -> Self {
        Self {
            indices: (0..total_pages).collect(),
        }
    }

    /// An empty selection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from arbitrary zero-based indices, dropping those outside
    /// `[0, total_pages)`.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>, total_pages: usize) -> Self {
        let set: BTreeSet<usize> = indices.into_iter().filter(|&i| i < total_pages).collect();
        Self {
            indices: set.into_iter().collect(),
        }
    }

    /// The selected zero-based indices in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Iterate over the selected indices.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Whether `index` (zero-based) is selected.
    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// Number of selected pages.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// First selected index.
    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    /// Last selected index.
    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// Selected pages as 1-based page numbers.
    pub fn page_numbers(&self) -> Vec<usize> {
        self.indices.iter().map(|i| i + 1).collect()
    }
}

impl IntoIterator for PageRangeSet {
    type Item = usize;
    type IntoIter = std::vec::IntoIter<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.into_iter()
    }
}

impl<'a> IntoIterator for &'a PageRangeSet {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_expression() {
        let set = PageRangeSet::parse("1-3,5,8", 6);
        assert_eq!(set.indices(), &[0, 1, 2, 4]);
    }

    #[test]
    fn test_parse_all_and_empty() {
        assert_eq!(PageRangeSet::parse("", 4).indices(), &[0, 1, 2, 3]);
        assert_eq!(PageRangeSet::parse("all", 4).indices(), &[0, 1, 2, 3]);
        assert_eq!(PageRangeSet::parse("  ALL ", 4).indices(), &[0, 1, 2, 3]);
        assert!(PageRangeSet::parse("all", 0).is_empty());
    }

    #[test]
    fn test_parse_deduplicates_and_sorts() {
        let set = PageRangeSet::parse("5, 2-4, 3, 1, 5", 10);
        assert_eq!(set.indices(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_skips_malformed_tokens() {
        let set = PageRangeSet::parse("abc, 2, x-4, 3-y, -1, 2.5, ,4", 5);
        assert_eq!(set.indices(), &[1, 3]);
    }

    #[test]
    fn test_parse_clamps_partial_ranges() {
        let set = PageRangeSet::parse("0-2, 4-100", 5);
        assert_eq!(set.indices(), &[0, 1, 3, 4]);
    }

    #[test]
    fn test_parse_out_of_bounds_is_empty() {
        let set = PageRangeSet::parse("9-12, 15", 3);
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_parse_reversed_range_selects_nothing() {
        assert!(PageRangeSet::parse("4-2", 5).is_empty());
    }

    #[test]
    fn test_parse_huge_range_is_bounded() {
        let set = PageRangeSet::parse("1-999999999999", 3);
        assert_eq!(set.indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_from_indices_filters() {
        let set = PageRangeSet::from_indices([4, 1, 1, 9], 5);
        assert_eq!(set.indices(), &[1, 4]);
        assert!(set.contains(4));
        assert!(!set.contains(9));
        assert_eq!(set.page_numbers(), vec![2, 5]);
    }
}

//! Normalized Digital Object Identifiers and their extraction from ORCID works.

use std::{collections::BTreeSet, fmt};

use log::{debug, trace};

use crate::api::orcid::WorkSummary;

const DOI_PREFIX: &str = "doi:";

/// A normalized DOI.
///
/// A `Doi` is trimmed, has no `doi:` prefix and is lower-cased, which makes two spellings of the
/// same identifier compare equal. A `Doi` is never empty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Doi(String);

impl Doi {
    /// Normalizes the `raw` identifier, returning `None` when nothing is left.
    ///
    /// Normalizing is idempotent: normalizing the string of a `Doi` yields the same `Doi`.
    ///
    /// # Examples
    ///
    /// ```
    /// use orcbib::Doi;
    ///
    /// let doi = Doi::normalize(" DOI:10.1/ABC ").unwrap();
    /// assert_eq!("10.1/abc", doi.as_str());
    /// assert_eq!(Some(doi.clone()), Doi::normalize(doi.as_str()));
    ///
    /// assert!(Doi::normalize("doi:").is_none());
    /// ```
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let mut value = raw.trim();
        while value
            .get(..DOI_PREFIX.len())
            .map_or(false, |p| p.eq_ignore_ascii_case(DOI_PREFIX))
        {
            value = value[DOI_PREFIX.len()..].trim();
        }

        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_lowercase()))
        }
    }

    /// The normalized identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Doi {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Pulls every DOI out of the external identifiers of the `works`.
///
/// Identifiers of other types are ignored. The result has no duplicates and is sorted.
pub fn extract_dois<'a, I>(works: I) -> Vec<Doi>
where
    I: IntoIterator<Item = &'a WorkSummary>,
{
    let mut dois = BTreeSet::new();

    for work in works {
        let mut found = false;
        for id in work
            .external_ids()
            .filter(|id| id.kind().trim().eq_ignore_ascii_case("doi"))
        {
            if let Some(doi) = Doi::normalize(id.value()) {
                trace!("Found DOI '{doi}'");
                found = true;
                dois.insert(doi);
            }
        }

        if !found {
            debug!(
                "No DOI for the work '{}'",
                work.title().unwrap_or("without a title")
            );
        }
    }

    dois.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dois(works: &[WorkSummary]) -> Vec<String> {
        extract_dois(works)
            .into_iter()
            .map(|d| d.as_str().to_owned())
            .collect()
    }

    #[test]
    fn normalize_strips_prefix_and_case() {
        assert_eq!("10.1/abc", Doi::normalize("DOI:10.1/ABC").unwrap().as_str());
        assert_eq!("10.1/abc", Doi::normalize("  doi: 10.1/abc\n").unwrap().as_str());
        assert_eq!("10.1/abc", Doi::normalize("Doi:doi:10.1/Abc").unwrap().as_str());
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["DOI:10.1/ABC", " doi: doi:10.5555/X ", "10.1038/NPHYS1170"] {
            let once = Doi::normalize(raw).unwrap();
            let twice = Doi::normalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "normalizing '{raw}' twice changed it");
        }
    }

    #[test]
    fn normalize_rejects_empty() {
        assert!(Doi::normalize("").is_none());
        assert!(Doi::normalize("   ").is_none());
        assert!(Doi::normalize("DOI: ").is_none());
    }

    #[test]
    fn doi_and_other_types_from_two_groups() {
        let works = [
            WorkSummary::with_ids(&[("DOI", "DOI:10.1/ABC")]),
            WorkSummary::with_ids(&[("isbn", "123")]),
        ];

        assert_eq!(vec!["10.1/abc"], dois(&works));
    }

    #[test]
    fn same_doi_in_different_spellings_is_deduplicated() {
        let works = [
            WorkSummary::with_ids(&[("doi", "10.1/ABC")]),
            WorkSummary::with_ids(&[("DOI", "doi:10.1/abc"), ("doi", " 10.1/Abc ")]),
        ];

        assert_eq!(vec!["10.1/abc"], dois(&works));
    }

    #[test]
    fn non_doi_types_are_ignored() {
        let works = [WorkSummary::with_ids(&[
            ("isbn", "978-3-16-148410-0"),
            ("eid", "2-s2.0-85000000000"),
            ("uri", "doi:10.1/looks-like-a-doi"),
        ])];

        assert!(dois(&works).is_empty());
    }

    #[test]
    fn result_is_sorted() {
        let works = [
            WorkSummary::with_ids(&[("doi", "10.3/c")]),
            WorkSummary::with_ids(&[("doi", "10.1/a")]),
            WorkSummary::with_ids(&[("doi", "10.2/b")]),
        ];

        assert_eq!(vec!["10.1/a", "10.2/b", "10.3/c"], dois(&works));
    }

    #[test]
    fn works_without_ids_yield_nothing() {
        let works = [WorkSummary::default()];

        assert!(dois(&works).is_empty());
    }
}

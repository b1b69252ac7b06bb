use biblatex::{Bibliography, Chunk, Entry};

use crate::{Error, ErrorKind};

use super::Format;

/// A type wrapper around [`String`] to represent a `BibTex` format string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BibTex(String);

impl Format for BibTex {
    fn new(val: String) -> Self {
        Self(val)
    }

    fn as_str(&self) -> &str {
        &self.0
    }

    fn raw(self) -> String {
        self.0
    }

    fn name() -> &'static str {
        "BibTex"
    }

    fn ext() -> &'static str {
        "bib"
    }
}

impl BibTex {
    /// Joins the `records` into a single bibliography.
    ///
    /// Records are separated by a blank line and the result ends with a newline.
    ///
    /// # Examples
    ///
    /// ```
    /// use orcbib::format::{BibTex, Format};
    ///
    /// let joined = BibTex::join(vec![
    ///     BibTex::new("@misc{a, title={A}}".to_owned()),
    ///     BibTex::new("@misc{b, title={B}}".to_owned()),
    /// ]);
    ///
    /// assert_eq!("@misc{a, title={A}}\n\n@misc{b, title={B}}\n", joined.as_str());
    /// ```
    #[must_use]
    pub fn join<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut joined = records
            .into_iter()
            .map(Self::raw)
            .collect::<Vec<_>>()
            .join("\n\n");
        joined.push('\n');
        Self(joined)
    }

    /// Parses the entries of this bibliography in the order they appear.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::Deserialize`] error when the text is not empty but no entry can be parsed.
    pub fn entries(&self) -> Result<Vec<Entry>, Error> {
        if self.0.trim().is_empty() {
            return Ok(Vec::new());
        }

        Bibliography::parse(&self.0)
            .filter(|b| b.len() != 0)
            .map(|b| b.into_iter().collect())
            .ok_or_else(|| Error::new(ErrorKind::Deserialize, "Unable to parse string as BibTeX"))
    }
}

/// Reads the field `name` of the `entry` as plain text.
pub(crate) fn field_text(entry: &Entry, name: &str) -> Option<String> {
    entry
        .fields
        .get(name)
        .map(|chunks| {
            chunks
                .iter()
                .map(|c| match c {
                    Chunk::Normal(s) | Chunk::Verbatim(s) => s.as_str(),
                })
                .collect::<String>()
        })
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CROSSREF_BIB: &str = include_str!("../../tests/data/crossref.bib");

    #[test]
    fn join_single_record() {
        let joined = BibTex::join(vec![BibTex::new("@misc{a, title={A}}".to_owned())]);

        assert_eq!("@misc{a, title={A}}\n", joined.raw());
    }

    #[test]
    fn entries_keep_file_order() {
        let entries = BibTex::new(CROSSREF_BIB.to_owned()).entries().unwrap();
        let keys = entries.iter().map(|e| e.key.as_str()).collect::<Vec<_>>();

        assert_eq!(vec!["Doe_2021", "Roe_2019", "Poe_2018"], keys);
    }

    #[test]
    fn field_text_flattens_braces() {
        let entries = BibTex::new(CROSSREF_BIB.to_owned()).entries().unwrap();

        assert_eq!(
            Some("Deep Learning for Protein Structure".to_owned()),
            field_text(&entries[0], "title")
        );
        assert_eq!(None, field_text(&entries[0], "booktitle"));
    }

    #[test]
    fn empty_text_has_no_entries() {
        assert!(BibTex::new("\n".to_owned()).entries().unwrap().is_empty());
    }

    #[test]
    fn not_bibtex_is_a_deserialize_error() {
        let err = BibTex::new("This is not valid BibTeX".to_owned())
            .entries()
            .unwrap_err();

        assert_eq!(ErrorKind::Deserialize, err.kind());
    }
}

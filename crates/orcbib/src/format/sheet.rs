use serde::de::DeserializeOwned;

use crate::{Error, ErrorKind};

use super::Format;

/// A type wrapper around [`String`] to represent a comma separated spreadsheet with a header
/// line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csv(String);

impl Format for Csv {
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
        "CSV"
    }

    fn ext() -> &'static str {
        "csv"
    }
}

impl Csv {
    /// Deserializes every row, using the header line for the field names.
    ///
    /// Fields are trimmed and an empty field is `None` for an optional value. Columns without
    /// a matching field are ignored.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::Deserialize`] error naming the row that cannot be read.
    pub fn rows<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        // spreadsheet exports often start with a byte order mark
        let text = self.0.trim_start_matches('\u{feff}');

        ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_reader(text.as_bytes())
            .deserialize()
            .enumerate()
            .map(|(i, row)| {
                row.map_err(|e| {
                    Error::wrap_with(
                        ErrorKind::Deserialize,
                        e,
                        format!("Cannot read row {} of the {} file", i + 1, Self::name()),
                    )
                })
            })
            .collect()
    }
}

//! Markdown pages for the education entries of a CV spreadsheet.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    format::Csv,
    publication::{double_quoted, slugify, write_pages},
    Error,
};

#[derive(Debug, Deserialize)]
struct Row {
    start_date: Option<String>,
    end_date: Option<String>,
    expected_end_date: Option<String>,
    qualification: Option<String>,
    institution: Option<String>,
    city: Option<String>,
}

/// A qualification, finished or expected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Education {
    start: String,
    end: String,
    qualification: String,
    institution: String,
    city: String,
}

impl Education {
    fn from_row(row: Row) -> Self {
        Self {
            start: row.start_date.unwrap_or_default(),
            end: row
                .end_date
                .or(row.expected_end_date)
                .unwrap_or_default(),
            qualification: row.qualification.unwrap_or_default(),
            institution: row.institution.unwrap_or_default(),
            city: row.city.unwrap_or_default(),
        }
    }

    /// The qualification, e.g. `MSc Physics`.
    #[must_use]
    pub fn qualification(&self) -> &str {
        &self.qualification
    }

    /// The end date, or the expected end date when the qualification is not finished yet.
    #[must_use]
    pub fn end(&self) -> &str {
        &self.end
    }

    /// The name of the markdown file, `{end}-{slug}.md`.
    ///
    /// The start date is used when there is no end date at all.
    #[must_use]
    pub fn file_name(&self) -> String {
        let date = if self.end.is_empty() {
            &self.start
        } else {
            &self.end
        };
        format!("{date}-{}.md", slugify(&self.qualification))
    }

    /// The front-matter block of the entry.
    #[must_use]
    pub fn front_matter(&self) -> String {
        [
            "---".to_owned(),
            format!("start : {}", self.start),
            format!("end : {}", self.end),
            format!("qualification: {}", double_quoted(&self.qualification)),
            format!("institution: {}", double_quoted(&self.institution)),
            format!("city: {}", double_quoted(&self.city)),
            "---".to_owned(),
        ]
        .join("\n")
    }
}

/// Reads every row of the `csv` as an [`Education`] entry.
///
/// The `start_date`, `end_date`, `expected_end_date`, `qualification`, `institution` and
/// `city` columns are used. Dates are kept as written.
///
/// # Errors
///
/// An [`crate::ErrorKind::Deserialize`] error when a row cannot be read.
pub fn education(csv: &Csv) -> Result<Vec<Education>, Error> {
    Ok(csv
        .rows::<Row>()?
        .into_iter()
        .map(Education::from_row)
        .collect())
}

/// Writes a markdown file for every entry into `dir`, creating it when missing.
///
/// # Errors
///
/// An [`crate::ErrorKind::IO`] error when the directory or a file cannot be written.
pub fn write_education(entries: &[Education], dir: &Path) -> Result<Vec<PathBuf>, Error> {
    write_pages(
        dir,
        entries.iter().map(|e| (e.file_name(), e.front_matter())),
    )
}

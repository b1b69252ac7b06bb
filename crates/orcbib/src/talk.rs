//! Markdown pages for the talks of a spreadsheet exported from a reference manager.

use std::path::{Path, PathBuf};

use log::trace;
use serde::Deserialize;

use crate::{
    format::Csv,
    publication::{double_quoted, format_date, slugify, write_pages},
    Error, ErrorKind,
};

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Place")]
    place: Option<String>,
    #[serde(rename = "Meeting Name")]
    meeting_name: Option<String>,
}

/// A talk given at a meeting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Talk {
    title: String,
    date: String,
    venue: String,
    location: String,
}

impl Talk {
    fn from_row(row: Row) -> Result<Self, Error> {
        let title = row
            .title
            .as_deref()
            .map(|t| t.trim_matches(|c| c == '{' || c == '}').to_owned())
            .unwrap_or_else(|| "Untitled".to_owned());

        let raw_date = row.date.ok_or_else(|| {
            Error::new(
                ErrorKind::NoValue,
                format!("The talk '{title}' has no date"),
            )
        })?;

        Ok(Self {
            date: iso_date(&raw_date),
            title,
            venue: row.meeting_name.unwrap_or_default(),
            location: row.place.unwrap_or_default(),
        })
    }

    /// The title of the talk.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The day of the talk as `YYYY-MM-DD`.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The name of the markdown file, `{date}-{slug}.md`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-{}.md", self.date, slugify(&self.title))
    }

    /// The front-matter block of the talk.
    #[must_use]
    pub fn front_matter(&self) -> String {
        let permalink = format!("/talks/{}-{}", self.date, slugify(&self.title));

        [
            "---".to_owned(),
            format!("title: {}", double_quoted(&self.title)),
            "collection: talks".to_owned(),
            "type: \"Talk\"".to_owned(),
            format!("permalink: {}", double_quoted(&permalink)),
            format!("venue: {}", double_quoted(&self.venue)),
            format!("date: {}", double_quoted(&self.date)),
            format!("location: {}", double_quoted(&self.location)),
            "---".to_owned(),
        ]
        .join("\n")
    }
}

/// Reads every row of the `csv` as a [`Talk`].
///
/// The `Title`, `Date`, `Place` and `Meeting Name` columns are used, every other column is
/// ignored. Dates are read as `YYYY-MM-DD`, a time after the day is dropped.
///
/// # Errors
///
/// An [`ErrorKind::Deserialize`] error when a row cannot be read and an [`ErrorKind::NoValue`]
/// error when a talk has no date.
pub fn talks(csv: &Csv) -> Result<Vec<Talk>, Error> {
    csv.rows::<Row>()?.into_iter().map(Talk::from_row).collect()
}

/// Writes a markdown file for every talk into `dir`, creating it when missing.
///
/// # Errors
///
/// An [`ErrorKind::IO`] error when the directory or a file cannot be written.
pub fn write_talks(talks: &[Talk], dir: &Path) -> Result<Vec<PathBuf>, Error> {
    write_pages(dir, talks.iter().map(|t| (t.file_name(), t.front_matter())))
}

fn iso_date(raw: &str) -> String {
    let day = raw
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or_default();
    trace!("Talk date '{raw}' read as '{day}'");

    let mut parts = day.splitn(3, '-');
    let year = parts.next().unwrap_or_default();
    format_date(year, parts.next(), parts.next())
}

#[cfg(test)]
mod tests {
    use assert_fs::TempDir;

    use crate::format::Format;

    use super::*;

    const TALKS_CSV: &str = "\
Key,Item Type,Title,Author,Date,Place,Meeting Name,Date Added
K1,presentation,{Sparse Methods in Practice},\"Roe, Richard\",2023-05-12,Berlin,Example Conference,2023-06-01 10:00:00
K2,presentation,Untimely Results,,2022-11-03 14:30:00,,Winter Workshop,
K3,presentation,,,2021,Online,,
";

    fn fixture() -> Vec<Talk> {
        talks(&Csv::new(TALKS_CSV.to_owned())).unwrap()
    }

    #[test]
    fn rows_become_talks() {
        let talks = fixture();

        assert_eq!(3, talks.len());
        assert_eq!("Sparse Methods in Practice", talks[0].title());
        assert_eq!("2023-05-12", talks[0].date());
        assert_eq!("2022-11-03", talks[1].date());
        assert_eq!("Untitled", talks[2].title());
        assert_eq!("2021-01-01", talks[2].date());
    }

    #[test]
    fn front_matter_layout() {
        let expected = "---
title: \"Sparse Methods in Practice\"
collection: talks
type: \"Talk\"
permalink: \"/talks/2023-05-12-sparse-methods-in-practice\"
venue: \"Example Conference\"
date: \"2023-05-12\"
location: \"Berlin\"
---";

        assert_eq!(expected, fixture()[0].front_matter());
    }

    #[test]
    fn missing_place_and_meeting_are_empty() {
        let front = fixture()[1].front_matter();

        assert!(front.contains("venue: \"Winter Workshop\"\n"));
        assert!(front.contains("location: \"\"\n"));
    }

    #[test]
    fn talk_without_date_is_an_error() {
        let csv = Csv::new("Title,Date\nLost Talk,\n".to_owned());

        let err = talks(&csv).unwrap_err();

        assert_eq!(ErrorKind::NoValue, err.kind());
        assert!(err.to_string().contains("Lost Talk"));
    }

    #[test]
    fn invalid_date_falls_back_to_new_year() {
        assert_eq!("2020-01-01", iso_date("2020-02-30"));
        assert_eq!("2019-07-01", iso_date("2019-07"));
    }

    #[test]
    fn files_are_named_by_date_and_slug() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("_talks");

        let paths = write_talks(&fixture(), &out).unwrap();

        assert_eq!(
            vec![
                out.join("2023-05-12-sparse-methods-in-practice.md"),
                out.join("2022-11-03-untimely-results.md"),
                out.join("2021-01-01-untitled.md"),
            ],
            paths
        );

        let content = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(content.starts_with("---\ntitle: \"Untimely Results\"\n"));
        assert!(content.ends_with("---\n"));
    }
}

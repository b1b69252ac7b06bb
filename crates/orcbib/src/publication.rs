//! Markdown files with Jekyll-style front-matter, one per bibliography entry.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, trace};

use crate::{
    format::{field_text, BibTex},
    Error, ErrorKind,
};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Site specific values shared by every generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// The collection the publications belong to, also the first permalink segment.
    pub collection: String,
    /// The category of every publication.
    pub category: String,
    /// URL of the slides, `{num}` is replaced by the 1-based index of the entry.
    pub slides_url: Option<String>,
    /// URL of the BibTeX file, `{num}` is replaced by the 1-based index of the entry.
    pub bibtex_url: Option<String>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            collection: "publications".to_owned(),
            category: "manuscripts".to_owned(),
            slides_url: None,
            bibtex_url: None,
        }
    }
}

/// The parts of a bibliography entry shown on a publication page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Publication {
    title: String,
    year: String,
    date: String,
    venue: String,
    authors: String,
    excerpt: String,
    paper_url: String,
}

impl Publication {
    /// Reads a publication from a parsed BibTeX `entry`, filling in defaults for missing fields.
    #[must_use]
    pub fn from_entry(entry: &biblatex::Entry) -> Self {
        let field = |name| field_text(entry, name);

        let title = field("title").unwrap_or_else(|| "Untitled".to_owned());
        let year = field("year").unwrap_or_else(|| "1900".to_owned());
        let date = format_date(&year, field("month").as_deref(), field("day").as_deref());
        let venue = field("journal")
            .or_else(|| field("booktitle"))
            .unwrap_or_else(|| "Unknown venue".to_owned());

        Self {
            title,
            year,
            date,
            venue,
            authors: field("author").unwrap_or_else(|| "Anonymous".to_owned()),
            excerpt: field("abstract")
                .map(|s| s.replace("\n  ", " "))
                .unwrap_or_default(),
            paper_url: field("url").unwrap_or_else(|| "#".to_owned()),
        }
    }

    /// The title of the publication.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The publication date as `YYYY-MM-DD`.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// The URL friendly form of the title.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// The name of the markdown file, `{date}-{slug}.md`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-{}.md", self.date, self.slug())
    }

    /// The front-matter block of the publication.
    ///
    /// `num` is the 1-based position of the entry in its bibliography and is substituted into
    /// the URL templates.
    #[must_use]
    pub fn front_matter(&self, num: usize, template: &Template) -> String {
        let citation = format!(
            "{}. ({}). \"{}.\" <i>{}</i>.",
            self.authors, self.year, self.title, self.venue
        );

        let mut lines = vec![
            "---".to_owned(),
            format!("title: {}", double_quoted(&self.title)),
            format!("collection: {}", template.collection),
            format!("category: {}", template.category),
            format!(
                "permalink: /{}/{}-{}",
                template.collection,
                self.date,
                self.slug()
            ),
            format!("excerpt: {}", single_quoted(&self.excerpt)),
            format!("date: {}", self.date),
            format!("venue: {}", single_quoted(&self.venue)),
        ];
        if let Some(url) = &template.slides_url {
            lines.push(format!("slidesurl: {}", single_quoted(&numbered(url, num))));
        }
        lines.push(format!("paperurl: {}", single_quoted(&self.paper_url)));
        if let Some(url) = &template.bibtex_url {
            lines.push(format!("bibtexurl: {}", single_quoted(&numbered(url, num))));
        }
        lines.push(format!("citation: {}", single_quoted(&citation)));
        lines.push("---".to_owned());

        lines.join("\n")
    }
}

/// Reads every entry of the `bibtex` as a [`Publication`].
///
/// # Errors
///
/// An [`ErrorKind::Deserialize`] error when the text cannot be parsed as BibTeX.
pub fn publications(bibtex: &BibTex) -> Result<Vec<Publication>, Error> {
    Ok(bibtex
        .entries()?
        .iter()
        .map(Publication::from_entry)
        .collect())
}

/// Writes a markdown file for every publication into `dir`, creating it when missing.
///
/// Existing files with the same name are overwritten. Returns the written paths in order.
///
/// # Errors
///
/// An [`ErrorKind::IO`] error when the directory or a file cannot be written.
pub fn write_publications(
    publications: &[Publication],
    dir: &Path,
    template: &Template,
) -> Result<Vec<PathBuf>, Error> {
    let pages = publications.iter().enumerate().map(|(i, publication)| {
        (
            publication.file_name(),
            publication.front_matter(i + 1, template),
        )
    });
    write_pages(dir, pages)
}

/// Writes every `(file name, front-matter)` page into `dir`, creating it when missing.
pub(crate) fn write_pages<I>(dir: &Path, pages: I) -> Result<Vec<PathBuf>, Error>
where
    I: IntoIterator<Item = (String, String)>,
{
    fs::create_dir_all(dir).map_err(|e| {
        Error::wrap_with(
            ErrorKind::IO,
            e,
            format!("Cannot create the directory '{}'", dir.display()),
        )
    })?;

    pages
        .into_iter()
        .map(|(file_name, mut content)| {
            let path = dir.join(file_name);
            content.push('\n');

            fs::write(&path, content).map_err(|e| {
                Error::wrap_with(
                    ErrorKind::IO,
                    e,
                    format!("Cannot write '{}'", path.display()),
                )
            })?;
            info!("{}", path.display());
            Ok(path)
        })
        .collect()
}

/// Lower-cases `text`, drops everything but word characters, whitespace and `-`, and joins the
/// words with `-`.
///
/// # Examples
///
/// ```
/// assert_eq!("its-a-preprint", orcbib::publication::slugify("It's a Preprint!"));
/// assert_eq!("sparse-methods-a-survey", orcbib::publication::slugify("Sparse Methods: A Survey"));
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    let kept = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect::<String>();

    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_owned()
}

/// The ISO date of `year`, `month` and `day`.
///
/// A missing month or day is the first. Months can be numbers or English names. When the parts
/// do not make a valid date the first of January of `year` is used.
#[must_use]
pub fn format_date(year: &str, month: Option<&str>, day: Option<&str>) -> String {
    let fallback = || format!("{year}-01-01");

    let year_num = match year.trim().parse::<u32>() {
        Ok(y) if (1..=9999).contains(&y) => y,
        _ => return fallback(),
    };
    let month = match month.map_or(Some(1), parse_month) {
        Some(m) => m,
        None => return fallback(),
    };
    let day = match day.map_or(Ok(1), |d| d.trim().parse::<u32>()) {
        Ok(d) if d >= 1 && d <= days_in_month(year_num, month) => d,
        _ => return fallback(),
    };

    trace!("Date of {year}/{month}/{day}");
    format!("{year_num:04}-{month:02}-{day:02}")
}

fn parse_month(month: &str) -> Option<u32> {
    let month = month.trim();
    if let Ok(m) = month.parse::<u32>() {
        return (1..=12).contains(&m).then(|| m);
    }

    let lower = month.to_lowercase();
    MONTHS
        .iter()
        .position(|m| lower.len() >= 3 && lower.starts_with(m))
        .and_then(|i| u32::try_from(i + 1).ok())
}

const fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn numbered(template: &str, num: usize) -> String {
    template.replace("{num}", &num.to_string())
}

fn single_quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn double_quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

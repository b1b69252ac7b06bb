use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::file;

use orcbib::{
    education,
    format::{BibTex, Csv},
    publication::{self, Template},
    talk, Config, Outcome,
};

use clap::{Args, Subcommand};
use eyre::{eyre, Context};
use log::{trace, warn};

#[derive(Subcommand)]
#[non_exhaustive]
pub enum Commands {
    /// Build a BibTeX bibliography from the DOIs listed on an ORCID profile
    ///
    /// Every DOI of the public works is looked up on Crossref and the entries found are written
    /// to a single file. DOIs unknown to Crossref are skipped with a warning.
    Fetch {
        #[clap(flatten)]
        registry: RegistryOpts,

        /// The file the bibliography is written to
        #[clap(short, long, parse(from_os_str), default_value = orcbib::DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Seconds to wait after every Crossref request
        #[clap(long, parse(try_from_str = parse_seconds), default_value = "1")]
        rate_limit: Duration,
    },

    /// List the DOIs of the public works on an ORCID profile
    Dois {
        #[clap(flatten)]
        registry: RegistryOpts,
    },

    /// Write a markdown page with front-matter for every entry of a bibliography
    Markdown {
        /// The bibliography to read, defaults to the only .bib file in the current directory
        #[clap(short, long, parse(from_os_str))]
        file: Option<PathBuf>,

        /// The directory the markdown files are written to
        #[clap(short, long, parse(from_os_str), default_value = "_publications")]
        out_dir: PathBuf,

        /// The collection of the pages, also used in the permalink
        #[clap(long, default_value = "publications")]
        collection: String,

        /// The category of the pages
        #[clap(long, default_value = "manuscripts")]
        category: String,

        /// URL of the slides, `{num}` is replaced by the position of the entry
        #[clap(long)]
        slides_url: Option<String>,

        /// URL of the BibTeX file, `{num}` is replaced by the position of the entry
        #[clap(long)]
        bibtex_url: Option<String>,
    },

    /// Write a markdown page for every talk of a spreadsheet
    ///
    /// The Title, Date, Place and Meeting Name columns are used, as exported by a reference
    /// manager.
    Talks {
        /// The spreadsheet to read
        #[clap(short, long, parse(from_os_str), default_value = "talks.csv")]
        file: PathBuf,

        /// The directory the markdown files are written to
        #[clap(short, long, parse(from_os_str), default_value = "_talks")]
        out_dir: PathBuf,
    },

    /// Write a markdown page for every qualification of an education spreadsheet
    Education {
        /// The spreadsheet to read
        #[clap(short, long, parse(from_os_str), default_value = "education.csv")]
        file: PathBuf,

        /// The directory the markdown files are written to
        #[clap(short, long, parse(from_os_str), default_value = "_education")]
        out_dir: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RegistryOpts {
    /// The ORCID iD of the researcher, e.g. 0000-0002-7205-7554
    #[clap(env = "ORCID_ID")]
    orcid: String,

    /// Seconds before a request times out
    #[clap(long, parse(try_from_str = parse_seconds), default_value = "10")]
    timeout: Duration,

    /// Base URL of the ORCID API
    #[clap(long, default_value = orcbib::ORCID_API)]
    orcid_api: String,

    /// Base URL of the Crossref works API
    #[clap(long, default_value = orcbib::CROSSREF_API)]
    crossref_api: String,

    /// Contact address sent to Crossref with every request
    #[clap(long, env = "CROSSREF_MAILTO")]
    mailto: Option<String>,
}

impl RegistryOpts {
    fn into_config(self) -> Config {
        Config::new(self.orcid)
            .with_timeout(self.timeout)
            .with_orcid_api(self.orcid_api)
            .with_crossref_api(self.crossref_api)
            .with_mailto(self.mailto)
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs = s
        .parse::<f64>()
        .map_err(|e| format!("'{s}' is not a number of seconds: {e}"))?;

    if secs < 0.0 {
        return Err(format!("'{s}' is not a positive number of seconds"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("'{s}' is not a valid duration: {e}"))
}

impl Commands {
    /// Runs the command, returning the message for stdout if there is one.
    pub fn execute(self) -> eyre::Result<Option<String>> {
        match self {
            Commands::Fetch {
                registry,
                output,
                rate_limit,
            } => {
                let config = registry
                    .into_config()
                    .with_output(output)
                    .with_rate_limit(rate_limit);
                trace!("fetch subcommand called with {config:?}");

                let outcome = orcbib::bibliography_by_orcid(&config).wrap_err_with(|| {
                    eyre!("Failed to build the bibliography of '{}'", config.orcid())
                })?;

                Ok(outcome_message(outcome))
            }
            Commands::Dois { registry } => {
                let config = registry.into_config();
                trace!("dois subcommand called with {config:?}");

                let dois = orcbib::dois_by_orcid(&config)
                    .wrap_err_with(|| eyre!("Failed to fetch ORCID data of '{}'", config.orcid()))?;

                if dois.is_empty() {
                    warn!("No DOIs found for this ORCID iD");
                    Ok(None)
                } else {
                    let lines = dois.iter().map(orcbib::Doi::as_str).collect::<Vec<_>>();
                    Ok(Some(lines.join("\n")))
                }
            }
            Commands::Markdown {
                file,
                out_dir,
                collection,
                category,
                slides_url,
                bibtex_url,
            } => {
                let (path, bibtex) = file::read_format_file::<BibTex>(file)?;
                let publications = publication::publications(&bibtex)
                    .wrap_err_with(|| eyre!("Cannot read '{}'", path.display()))?;

                if publications.is_empty() {
                    warn!("No entries found in '{}'", path.display());
                    return Ok(None);
                }

                let template = Template {
                    collection,
                    category,
                    slides_url,
                    bibtex_url,
                };
                let written = publication::write_publications(&publications, &out_dir, &template)?;

                Ok(Some(written_message(written.len(), &out_dir)))
            }
            Commands::Talks { file, out_dir } => {
                let (path, csv) = file::read_format_file::<Csv>(Some(file))?;
                let talks =
                    talk::talks(&csv).wrap_err_with(|| eyre!("Cannot read '{}'", path.display()))?;

                if talks.is_empty() {
                    warn!("No talks found in '{}'", path.display());
                    return Ok(None);
                }

                let written = talk::write_talks(&talks, &out_dir)?;
                Ok(Some(written_message(written.len(), &out_dir)))
            }
            Commands::Education { file, out_dir } => {
                let (path, csv) = file::read_format_file::<Csv>(Some(file))?;
                let entries = education::education(&csv)
                    .wrap_err_with(|| eyre!("Cannot read '{}'", path.display()))?;

                if entries.is_empty() {
                    warn!("No education entries found in '{}'", path.display());
                    return Ok(None);
                }

                let written = education::write_education(&entries, &out_dir)?;
                Ok(Some(written_message(written.len(), &out_dir)))
            }
        }
    }
}

fn written_message(count: usize, dir: &Path) -> String {
    format!("All {count} markdown files written to: {}", dir.display())
}

fn outcome_message(outcome: Outcome) -> Option<String> {
    match outcome {
        Outcome::Written {
            path,
            count,
            skipped,
        } => {
            if !skipped.is_empty() {
                warn!("{} DOI(s) could not be resolved", skipped.len());
            }
            Some(format!("Wrote {count} entries to {}", path.display()))
        }
        // the warnings have already been logged
        Outcome::NoIdentifiers | Outcome::NoRecords { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_accept_fractions() {
        assert_eq!(Ok(Duration::from_millis(1500)), parse_seconds("1.5"));
        assert_eq!(Ok(Duration::ZERO), parse_seconds("0"));
    }

    #[test]
    fn seconds_reject_negative_and_text() {
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("NaN").is_err());
        assert!(parse_seconds("soon").is_err());
        assert!(parse_seconds("inf").is_err());
        assert!(parse_seconds("1e30").is_err());
    }

    #[test]
    fn empty_outcomes_have_no_message() {
        assert_eq!(None, outcome_message(Outcome::NoIdentifiers));
        assert_eq!(
            None,
            outcome_message(Outcome::NoRecords {
                skipped: Vec::new()
            })
        );
    }

    #[test]
    fn written_outcome_reports_count() {
        let message = outcome_message(Outcome::Written {
            path: PathBuf::from("output.bib"),
            count: 3,
            skipped: Vec::new(),
        });

        assert_eq!(Some("Wrote 3 entries to output.bib".to_owned()), message);
    }
}

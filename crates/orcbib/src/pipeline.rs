//! The ORCID → Crossref → `.bib` pipeline.
//!
//! A run goes through four phases that never loop back:
//!
//! 1. harvest the work summaries of a researcher from ORCID (fatal on failure),
//! 2. extract the normalized DOIs,
//! 3. fetch a BibTeX record per DOI from Crossref, pausing after every attempt,
//! 4. join the records and write them once.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{info, trace, warn};

use crate::{
    api::{cross_ref, orcid, Client},
    doi::{extract_dois, Doi},
    format::{BibTex, Format},
    Config, Error, ErrorKind,
};

/// A pause taken between two Crossref requests.
///
/// Implemented for every `FnMut(Duration)`, so [`std::thread::sleep`] can be used directly and
/// tests can pass a closure that only records the calls.
pub trait Delay {
    /// Pause for the `duration`.
    fn pause(&mut self, duration: Duration);
}

impl<F> Delay for F
where
    F: FnMut(Duration),
{
    fn pause(&mut self, duration: Duration) {
        self(duration);
    }
}

/// A DOI for which no record could be fetched.
#[derive(Debug)]
pub struct Skipped {
    doi: Doi,
    status: Option<u16>,
    reason: String,
}

impl std::fmt::Display for Skipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "Error on Crossref: {} (status: {status})", self.doi),
            None => write!(f, "Error on Crossref: {} ({})", self.doi, self.reason),
        }
    }
}

impl Skipped {
    /// The DOI that was skipped.
    #[must_use]
    pub const fn doi(&self) -> &Doi {
        &self.doi
    }

    /// The HTTP status Crossref answered with, `None` when no response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Why the DOI was skipped.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The records fetched from Crossref and the DOIs that were skipped.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Fetched records in the order their DOIs were requested.
    pub records: Vec<BibTex>,
    /// DOIs without a record.
    pub skipped: Vec<Skipped>,
}

/// How a successful run of the pipeline ended.
#[derive(Debug)]
#[must_use]
pub enum Outcome {
    /// The researcher has no works with a DOI, nothing was fetched or written.
    NoIdentifiers,
    /// DOIs were found but no record could be fetched, nothing was written.
    NoRecords {
        /// Every DOI that was tried.
        skipped: Vec<Skipped>,
    },
    /// The combined bibliography was written.
    Written {
        /// Where the bibliography was written.
        path: PathBuf,
        /// The number of records written.
        count: usize,
        /// DOIs without a record.
        skipped: Vec<Skipped>,
    },
}

/// Harvests the sorted, deduplicated DOIs of the researcher in the `config`.
///
/// # Errors
///
/// The error of the ORCID request when the works cannot be listed.
pub fn harvest<C: Client>(client: &C, config: &Config) -> Result<Vec<Doi>, Error> {
    let works = orcid::get_work_summaries(client, config.orcid_api(), config.orcid())?;
    let dois = extract_dois(&works);
    info!("Found {} DOI(s) in {} work(s)", dois.len(), works.len());
    Ok(dois)
}

/// Fetches the BibTeX record of a single `doi`.
///
/// A failure is never fatal: a warning naming the DOI and the status code is logged and the
/// [`Skipped`] DOI is returned instead.
///
/// # Errors
///
/// The [`Skipped`] DOI when Crossref does not answer with a record.
pub fn fetch_record<C: Client>(client: &C, config: &Config, doi: &Doi) -> Result<BibTex, Skipped> {
    trace!("Fetching BibTeX for '{doi}'");
    cross_ref::get_bibtex_by_doi(client, config.crossref_api(), doi).map_err(|err| {
        let skipped = Skipped {
            doi: doi.clone(),
            status: err.status_code(),
            reason: err.to_string(),
        };
        warn!("{skipped}");
        skipped
    })
}

/// Fetches a record for every DOI in order, pausing for the configured rate limit after every
/// attempt whether it succeeded or not.
pub fn fetch_all<C, D>(client: &C, config: &Config, dois: &[Doi], delay: &mut D) -> FetchReport
where
    C: Client,
    D: Delay + ?Sized,
{
    let mut report = FetchReport::default();

    for (i, doi) in dois.iter().enumerate() {
        info!("[{}/{}] {doi}", i + 1, dois.len());
        match fetch_record(client, config, doi) {
            Ok(record) => report.records.push(record),
            Err(skipped) => report.skipped.push(skipped),
        }
        delay.pause(config.rate_limit());
    }

    report
}

/// Writes the `records` as one bibliography to `path`.
///
/// # Errors
///
/// An [`ErrorKind::IO`] error when the file cannot be written.
pub fn write_bibliography(path: &Path, records: Vec<BibTex>) -> Result<usize, Error> {
    let count = records.len();
    let bibliography = BibTex::join(records);

    fs::write(path, bibliography.as_str()).map_err(|e| {
        Error::wrap_with(
            ErrorKind::IO,
            e,
            format!("Cannot write the bibliography to '{}'", path.display()),
        )
    })?;

    trace!("{} bytes written to '{}'", bibliography.as_str().len(), path.display());
    Ok(count)
}

/// Runs the whole pipeline for the `config`.
///
/// `client` is used for every request and `delay` is called once after every Crossref request.
///
/// # Errors
///
/// An `Err` is returned when the works of the researcher cannot be listed or when the
/// bibliography cannot be written. A DOI without a record is not an error, see
/// [`Outcome`].
pub fn run<C, D>(config: &Config, client: &C, mut delay: D) -> Result<Outcome, Error>
where
    C: Client,
    D: Delay,
{
    let dois = harvest(client, config)?;
    if dois.is_empty() {
        warn!("No DOIs found for the ORCID iD '{}'", config.orcid());
        return Ok(Outcome::NoIdentifiers);
    }

    let FetchReport { records, skipped } = fetch_all(client, config, &dois, &mut delay);

    if records.is_empty() {
        warn!("No BibTeX entries retrieved for {} DOI(s)", dois.len());
        return Ok(Outcome::NoRecords { skipped });
    }

    let count = write_bibliography(config.output(), records)?;
    info!("Wrote {count} entries to '{}'", config.output().display());

    Ok(Outcome::Written {
        path: config.output().to_owned(),
        count,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use assert_fs::{fixture::PathChild, TempDir};

    use crate::api::{impl_text_producer, MockClient, NetworkErrorProducer, URL_SINK};

    use super::*;

    const WORKS_JSON: &str = include_str!("../tests/data/orcid_works.json");

    // Works listing for two DOIs, `10.1/a` and `10.1/b`, where Crossref has no record for `b`.
    impl_text_producer! {
        TwoDoiProducer => |url| {
            if url.ends_with("/works") {
                Ok(r#"{"group": [
                    {"work-summary": [{"external-ids": {"external-id": [
                        {"external-id-type": "doi", "external-id-value": "10.1/B"}
                    ]}}]},
                    {"work-summary": [{"external-ids": {"external-id": [
                        {"external-id-type": "doi", "external-id-value": "doi:10.1/a"}
                    ]}}]}
                ]}"#.to_owned())
            } else if url.contains("10.1/b") {
                Err(Error::status(404, url))
            } else {
                Ok(format!("@article{{a, title={{A}}, note={{{url}}}}}\n"))
            }
        },
        FixtureWorksProducer => |url| {
            if url.ends_with("/works") {
                Ok(WORKS_JSON.to_owned())
            } else {
                Ok(format!("@misc{{x, note={{{url}}}}}"))
            }
        },
        NoDoiProducer => |url| Ok(r#"{"group": [{"work-summary": [{"external-ids": {"external-id": [
            {"external-id-type": "isbn", "external-id-value": "123"}
        ]}}]}]}"#.to_owned()),
        NoRecordProducer => |url| {
            if url.ends_with("/works") {
                TwoDoiProducer::produce(url)
            } else {
                Err(Error::status(503, url))
            }
        },
    }

    use crate::api::Producer;

    fn config(dir: &TempDir) -> Config {
        Config::new("0000-0002-7205-7554")
            .with_output(dir.child("output.bib").path())
            .with_rate_limit(Duration::from_millis(250))
    }

    #[derive(Default)]
    struct Pauses(RefCell<Vec<Duration>>);

    impl Pauses {
        fn recorder(&self) -> impl FnMut(Duration) + '_ {
            move |d| self.0.borrow_mut().push(d)
        }

        fn total(&self) -> Duration {
            self.0.borrow().iter().sum()
        }

        fn count(&self) -> usize {
            self.0.borrow().len()
        }
    }

    #[test]
    fn harvest_fixture_yields_sorted_normalized_dois() {
        let dir = TempDir::new().unwrap();
        let client = MockClient::<FixtureWorksProducer>::default();
        let dois = harvest(&client, &config(&dir)).unwrap();

        let dois = dois.iter().map(Doi::as_str).collect::<Vec<_>>();
        assert_eq!(vec!["10.1000/xyz123", "10.2000/abc.456"], dois);
    }

    #[test]
    fn one_failed_fetch_is_skipped() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let client = MockClient::<TwoDoiProducer>::default();
        let pauses = Pauses::default();

        let outcome = run(&config, &client, pauses.recorder()).unwrap();

        match outcome {
            Outcome::Written {
                path,
                count,
                skipped,
            } => {
                assert_eq!(config.output(), path);
                assert_eq!(1, count);
                assert_eq!(1, skipped.len());
                assert_eq!("10.1/b", skipped[0].doi().as_str());
                assert_eq!(Some(404), skipped[0].status());
                assert!(skipped[0].reason().contains("404"));
                assert_eq!(
                    "Error on Crossref: 10.1/b (status: 404)",
                    skipped[0].to_string()
                );
            }
            other => panic!("expected a written bibliography, got {other:?}"),
        }

        let written = std::fs::read_to_string(config.output()).unwrap();
        assert_eq!(
            format!(
                "@article{{a, title={{A}}, note={{{}/10.1/a/transform}}}}\n",
                config.crossref_api()
            ),
            written
        );
    }

    #[test]
    fn dois_are_fetched_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        let client = MockClient::<TwoDoiProducer>::default();
        let pauses = Pauses::default();

        let _outcome = run(&config(&dir), &client, pauses.recorder()).unwrap();

        let urls = URL_SINK.with(|sink| {
            sink.borrow()
                .iter()
                .map(|(url, _)| url.clone())
                .collect::<Vec<_>>()
        });
        assert_eq!(
            vec![
                "https://pub.orcid.org/v3.0/0000-0002-7205-7554/works",
                "https://api.crossref.org/works/10.1/a/transform",
                "https://api.crossref.org/works/10.1/b/transform",
            ],
            urls
        );
    }

    #[test]
    fn delay_follows_every_attempt() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let client = MockClient::<TwoDoiProducer>::default();
        let pauses = Pauses::default();

        let _outcome = run(&config, &client, pauses.recorder()).unwrap();

        assert_eq!(2, pauses.count());
        assert!(pauses.total() >= config.rate_limit() * 2);
    }

    #[test]
    fn no_dois_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let client = MockClient::<NoDoiProducer>::default();
        let pauses = Pauses::default();

        let outcome = run(&config, &client, pauses.recorder()).unwrap();

        assert!(matches!(outcome, Outcome::NoIdentifiers));
        assert_eq!(0, pauses.count());
        assert!(!config.output().exists());
    }

    #[test]
    fn no_records_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let client = MockClient::<NoRecordProducer>::default();
        let pauses = Pauses::default();

        let outcome = run(&config, &client, pauses.recorder()).unwrap();

        match outcome {
            Outcome::NoRecords { skipped } => {
                let statuses = skipped.iter().map(Skipped::status).collect::<Vec<_>>();
                assert_eq!(vec![Some(503), Some(503)], statuses);
            }
            other => panic!("expected no records, got {other:?}"),
        }
        assert_eq!(2, pauses.count());
        assert!(!config.output().exists());
    }

    #[test]
    fn failed_harvest_is_fatal() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let client = MockClient::<NetworkErrorProducer>::default();
        let pauses = Pauses::default();

        let err = run(&config, &client, pauses.recorder()).unwrap_err();

        assert_eq!(ErrorKind::IO, err.kind());
        assert_eq!(0, pauses.count());
        assert!(!config.output().exists());
    }

    #[test]
    fn unwritable_output_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).with_output(dir.child("missing/dir/output.bib").path());
        let client = MockClient::<TwoDoiProducer>::default();
        let pauses = Pauses::default();

        let err = run(&config, &client, pauses.recorder()).unwrap_err();

        assert_eq!(ErrorKind::IO, err.kind());
    }

    #[test]
    fn fetch_all_keeps_encounter_order() {
        let dir = TempDir::new().unwrap();
        let client = MockClient::<FixtureWorksProducer>::default();
        let dois = ["10.3/c", "10.1/a", "10.2/b"]
            .iter()
            .filter_map(|s| Doi::normalize(s))
            .collect::<Vec<_>>();
        let mut pauses = 0;

        let report = fetch_all(&client, &config(&dir), &dois, &mut |_: Duration| pauses += 1);

        let records = report
            .records
            .iter()
            .map(Format::as_str)
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                "@misc{x, note={https://api.crossref.org/works/10.3/c/transform}}",
                "@misc{x, note={https://api.crossref.org/works/10.1/a/transform}}",
                "@misc{x, note={https://api.crossref.org/works/10.2/b/transform}}",
            ],
            records
        );
        assert!(report.skipped.is_empty());
        assert_eq!(3, pauses);
    }

    #[test]
    fn skipped_without_status_names_the_reason() {
        let dir = TempDir::new().unwrap();
        let client = MockClient::<NetworkErrorProducer>::default();
        let doi = Doi::normalize("10.1/a").unwrap();

        let skipped = fetch_record(&client, &config(&dir), &doi).unwrap_err();

        assert_eq!(None, skipped.status());
        assert_eq!(
            format!("Error on Crossref: 10.1/a ({})", skipped.reason()),
            skipped.to_string()
        );
    }
}

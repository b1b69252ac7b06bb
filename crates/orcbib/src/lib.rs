#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::perf,
    clippy::style,
    clippy::missing_safety_doc,
    clippy::missing_const_for_fn
)]
#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions)]

//! # orcbib
//!
//! orcbib builds a BibTeX bibliography from the public works of a researcher. The DOIs listed
//! on an [ORCID](https://orcid.org) profile are harvested, a BibTeX entry for every DOI is
//! fetched from [Crossref](https://www.crossref.org) and the entries are written to a single
//! `.bib` file. The [`publication`] module turns such a file into markdown pages for a static
//! site generator, and the [`talk`] and [`education`] modules do the same for the rows of
//! the talks and education spreadsheets.
//!
//! ```no_run
//! use orcbib::{Config, Outcome};
//!
//! fn main() -> Result<(), orcbib::Error> {
//!     let config = Config::new("0000-0002-7205-7554");
//!     let client = orcbib::http_client(&config)?;
//!
//!     match orcbib::run(&config, &client, std::thread::sleep)? {
//!         Outcome::Written { count, .. } => println!("{count} entries written"),
//!         Outcome::NoIdentifiers | Outcome::NoRecords { .. } => println!("Nothing written"),
//!     }
//!     Ok(())
//! }
//! ```

mod api;
mod config;
mod doi;
pub mod education;
mod error;
pub mod format;
mod pipeline;
pub mod publication;
pub mod talk;

pub use api::{http_client, Client};
pub use api::orcid::{ExternalId, WorkSummary};
pub use config::{Config, CROSSREF_API, DEFAULT_OUTPUT, ORCID_API};
pub use doi::{extract_dois, Doi};
pub use error::{Error, ErrorKind};
pub use pipeline::{
    fetch_all, fetch_record, harvest, run, write_bibliography, Delay, FetchReport, Outcome,
    Skipped,
};

use log::trace;

/// Lists the sorted, normalized DOIs of the researcher in the `config` using the default
/// client.
///
/// # Errors
///
/// An `Err` is returned when the client cannot be built or the works cannot be listed.
#[inline]
pub fn dois_by_orcid(config: &Config) -> Result<Vec<Doi>, Error> {
    trace!("Search DOIs of ORCID iD '{}'", config.orcid());
    let client = http_client(config)?;
    harvest(&client, config)
}

/// Runs the whole pipeline for the `config` with the default client, sleeping the thread
/// between Crossref requests.
///
/// # Errors
///
/// See [`run`].
#[inline]
pub fn bibliography_by_orcid(config: &Config) -> Result<Outcome, Error> {
    trace!("Build the bibliography of ORCID iD '{}'", config.orcid());
    let client = http_client(config)?;
    run(config, &client, std::thread::sleep)
}

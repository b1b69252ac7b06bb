//! Settings for a single run of the DOI to bibliography pipeline.

use std::{path::PathBuf, time::Duration};

/// Base URL of the public ORCID API (v3.0).
pub const ORCID_API: &str = "https://pub.orcid.org/v3.0";

/// Base URL of the Crossref works API.
pub const CROSSREF_API: &str = "https://api.crossref.org/works";

/// Default location of the combined bibliography.
pub const DEFAULT_OUTPUT: &str = "output.bib";

/// Default pause between two Crossref requests.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(1);

/// Default timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration passed to [`crate::run`] and the API clients.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use orcbib::Config;
///
/// let config = Config::new("0000-0002-7205-7554")
///     .with_output("papers.bib")
///     .with_rate_limit(Duration::from_millis(500));
///
/// assert_eq!("0000-0002-7205-7554", config.orcid());
/// assert_eq!(Duration::from_secs(10), config.timeout());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    orcid: String,
    output: PathBuf,
    rate_limit: Duration,
    timeout: Duration,
    orcid_api: String,
    crossref_api: String,
    mailto: Option<String>,
}

impl Config {
    /// Creates a configuration for the researcher with the `orcid` iD using the default values
    /// for everything else.
    pub fn new<S: Into<String>>(orcid: S) -> Self {
        Self {
            orcid: orcid.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            rate_limit: DEFAULT_RATE_LIMIT,
            timeout: DEFAULT_TIMEOUT,
            orcid_api: ORCID_API.to_owned(),
            crossref_api: CROSSREF_API.to_owned(),
            mailto: None,
        }
    }

    /// Sets the path the combined bibliography is written to.
    #[must_use]
    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    /// Sets the pause taken after every Crossref request.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Sets the timeout of every request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the base URL of the ORCID API, e.g. `https://pub.sandbox.orcid.org/v3.0`.
    #[must_use]
    pub fn with_orcid_api<S: Into<String>>(mut self, url: S) -> Self {
        self.orcid_api = trim_base(url.into());
        self
    }

    /// Sets the base URL of the Crossref works API.
    #[must_use]
    pub fn with_crossref_api<S: Into<String>>(mut self, url: S) -> Self {
        self.crossref_api = trim_base(url.into());
        self
    }

    /// Sets the contact address sent to Crossref in the `User-Agent` header.
    #[must_use]
    pub fn with_mailto<S: Into<String>>(mut self, mailto: Option<S>) -> Self {
        self.mailto = mailto.map(Into::into);
        self
    }

    /// The ORCID iD of the researcher.
    #[must_use]
    pub fn orcid(&self) -> &str {
        &self.orcid
    }

    /// Where the combined bibliography is written.
    #[must_use]
    pub fn output(&self) -> &std::path::Path {
        &self.output
    }

    /// The pause taken after every Crossref request.
    #[must_use]
    pub const fn rate_limit(&self) -> Duration {
        self.rate_limit
    }

    /// The timeout of every request.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base URL of the ORCID API without a trailing slash.
    #[must_use]
    pub fn orcid_api(&self) -> &str {
        &self.orcid_api
    }

    /// Base URL of the Crossref works API without a trailing slash.
    #[must_use]
    pub fn crossref_api(&self) -> &str {
        &self.crossref_api
    }

    /// The `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let agent = concat!("orcbib/", env!("CARGO_PKG_VERSION"));
        match &self.mailto {
            Some(mailto) => format!("{agent} (mailto:{mailto})"),
            None => agent.to_owned(),
        }
    }
}

fn trim_base(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

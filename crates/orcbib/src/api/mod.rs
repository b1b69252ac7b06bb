//! Blocking HTTP access to the ORCID and Crossref registries.

use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;

pub(crate) mod cross_ref;
pub(crate) mod orcid;

use crate::{Config, Error, ErrorKind};

/// The capabilities the pipeline needs from an HTTP client.
///
/// Implemented for [`reqwest::blocking::Client`]; tests substitute their own implementations so
/// no real network calls are made.
pub trait Client {
    /// Fetch `url` as JSON and deserialize the body into `T`.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::IO`] error when the request fails or times out, an
    /// [`ErrorKind::Status`] error for non-success responses and an
    /// [`ErrorKind::Deserialize`] error when the body is not the expected JSON.
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned;

    /// Fetch `url` as text, negotiating the representation with the `accept` media type.
    ///
    /// # Errors
    ///
    /// An [`ErrorKind::IO`] error when the request fails or times out and an
    /// [`ErrorKind::Status`] error for non-success responses.
    fn get_text(&self, url: &str, accept: &str) -> Result<String, Error>;
}

impl Client for reqwest::blocking::Client {
    fn get_json<T>(&self, url: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        self.get(url)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| Error::wrap(ErrorKind::IO, e))
            .and_then(|r| check_status(url, r))
            .and_then(|r| r.json().map_err(|e| Error::wrap(ErrorKind::Deserialize, e)))
    }

    fn get_text(&self, url: &str, accept: &str) -> Result<String, Error> {
        let resp = self
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .map_err(|e| Error::wrap(ErrorKind::IO, e))?;

        check_status(url, resp)?
            .text()
            .map_err(|e| Error::wrap(ErrorKind::IO, e))
    }
}

fn check_status(
    url: &str,
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, Error> {
    let status = resp.status();
    log::trace!("{url} responded with {status}");
    if status.is_success() {
        Ok(resp)
    } else {
        Err(Error::status(status.as_u16(), url))
    }
}

/// Builds the blocking client used against the real registries.
///
/// The client applies the configured timeout to every request and identifies itself with
/// [`Config::user_agent`].
///
/// # Errors
///
/// An [`ErrorKind::IO`] error when the TLS backend cannot be initialised.
pub fn http_client(config: &Config) -> Result<reqwest::blocking::Client, Error> {
    let mut headers = reqwest::header::HeaderMap::new();
    let agent = reqwest::header::HeaderValue::from_str(&config.user_agent())
        .map_err(|e| Error::wrap_with(ErrorKind::IO, e, "Invalid mailto address"))?;
    headers.insert(USER_AGENT, agent);

    reqwest::blocking::Client::builder()
        .timeout(config.timeout())
        .default_headers(headers)
        .build()
        .map_err(|e| Error::wrap_with(ErrorKind::IO, e, "Cannot build the HTTP client"))
}

#[cfg(test)]
pub(crate) use test::{
    assert_url, impl_text_producer, MockClient, NetworkErrorProducer, NotFoundProducer, Producer,
    URL_SINK,
};

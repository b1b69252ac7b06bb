use crate::{
    doi::Doi,
    format::{BibTex, Format},
    Error, ErrorKind,
};

use super::Client;

const BIBTEX_MEDIA_TYPE: &str = "application/x-bibtex";

/// Fetches the BibTeX entry Crossref holds for the `doi`.
///
/// An empty response body is treated as an error, there is nothing to cite.
#[inline]
pub(crate) fn get_bibtex_by_doi<C: Client>(
    client: &C,
    base: &str,
    doi: &Doi,
) -> Result<BibTex, Error> {
    let url = format!("{base}/{doi}/transform");
    let text = client.get_text(&url, BIBTEX_MEDIA_TYPE)?;
    let text = text.trim();

    if text.is_empty() {
        Err(Error::new(
            ErrorKind::NoValue,
            format!("{url} responded with an empty body"),
        ))
    } else {
        Ok(BibTex::new(text.to_owned()))
    }
}

use log::{info, trace};
use serde::Deserialize;

use crate::Error;

use super::Client;

/// Fetches the work summaries of the researcher with the `orcid` iD.
///
/// A group may hold several versions of the same work, only the first version of every group is
/// returned so a work is never counted twice.
pub(crate) fn get_work_summaries<C: Client>(
    client: &C,
    base: &str,
    orcid: &str,
) -> Result<Vec<WorkSummary>, Error> {
    let url = format!("{base}/{orcid}/works");
    info!("Fetching works for ORCID iD '{orcid}'");

    let Works { group } = client.get_json(&url)?;
    trace!("ORCID listed {} group(s) of works", group.len());

    Ok(group
        .into_iter()
        .filter_map(|g| g.work_summary.into_iter().next())
        .collect())
}

#[derive(Deserialize)]
struct Works {
    #[serde(default)]
    group: Vec<Group>,
}

#[derive(Deserialize)]
struct Group {
    #[serde(rename = "work-summary", default)]
    work_summary: Vec<WorkSummary>,
}

/// A single version of a work as listed by ORCID.
#[derive(Debug, Default, Deserialize)]
pub struct WorkSummary {
    #[serde(default)]
    title: Option<WorkTitle>,
    #[serde(rename = "external-ids", default)]
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct WorkTitle {
    #[serde(default)]
    title: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Value {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalIds {
    #[serde(rename = "external-id", default)]
    external_id: Vec<ExternalId>,
}

/// An identifier of a work in some other registry, e.g. a DOI or an ISBN.
#[derive(Debug, Default, Deserialize)]
pub struct ExternalId {
    #[serde(rename = "external-id-type", default)]
    kind: Option<String>,
    #[serde(rename = "external-id-value", default)]
    value: Option<String>,
}

impl WorkSummary {
    /// The title of the work, if ORCID has one.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title
            .as_ref()
            .and_then(|t| t.title.as_ref())
            .and_then(|v| v.value.as_deref())
    }

    /// All external identifiers of the work.
    pub fn external_ids(&self) -> impl Iterator<Item = &ExternalId> {
        self.external_ids
            .iter()
            .flat_map(|ids| ids.external_id.iter())
    }

    #[cfg(test)]
    pub(crate) fn with_ids(ids: &[(&str, &str)]) -> Self {
        Self {
            title: None,
            external_ids: Some(ExternalIds {
                external_id: ids
                    .iter()
                    .map(|(kind, value)| ExternalId {
                        kind: Some((*kind).to_owned()),
                        value: Some((*value).to_owned()),
                    })
                    .collect(),
            }),
        }
    }
}

impl ExternalId {
    /// The declared type of the identifier, e.g. `doi`.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or_default()
    }

    /// The raw identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

//! Container summaries as returned by a node's list call

use serde::{Deserialize, Serialize};

/// Length of the shortened container id shown to operators
pub const SHORT_ID_LEN: usize = 12;

/// One entry of a node's container list
///
/// Field names follow the Docker Engine list format (`Id`, `Names`, ...).
/// Produced fresh by each list call and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "Id", default)]
    pub id: String,
    #[serde(rename = "Image", default)]
    pub image: String,
    #[serde(rename = "Names", default)]
    pub names: Vec<String>,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "State", default)]
    pub state: String,
}

impl ContainerSummary {
    /// First name without Docker's leading `/`, or an empty string
    pub fn primary_name(&self) -> String {
        self.names
            .first()
            .map(|name| name.trim_start_matches('/').to_string())
            .unwrap_or_default()
    }

    pub fn short_id(&self) -> String {
        self.id.chars().take(SHORT_ID_LEN).collect()
    }

    /// Case-insensitive substring match over id, image, status, state and names
    ///
    /// `query` must already be lowercased. An empty query matches every container.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let names = self.names.join(" ");
        let haystack = [
            self.id.as_str(),
            self.image.as_str(),
            self.status.as_str(),
            self.state.as_str(),
            names.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

        haystack.contains(query)
    }
}

use serde::{Deserialize, Serialize};

use crate::model::{Attributes, Candidate, lenient_attributes};

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query_text: &'a str,
    pub top_k: usize,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
pub struct Hit {
    pub id: String,
    #[serde(default, alias = "metadata", deserialize_with = "lenient_attributes")]
    pub attributes: Attributes,
    pub distance: f32,
}

impl From<Hit> for Candidate {
    fn from(hit: Hit) -> Self {
        Candidate {
            id: hit.id,
            attributes: hit.attributes,
            distance: hit.distance.max(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "message", alias = "detail")]
    pub error: Option<String>,
}

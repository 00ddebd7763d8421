use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsQuery {
    pub page: Option<usize>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

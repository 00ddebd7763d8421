use serde::Deserialize;

use crate::utils::helpers::non_blank;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsQuery {
    pub page_token: Option<String>,
    pub max_results: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    pub id: Option<String>,
}

impl PostQuery {
    /// Blogger post ids are numeric; anything else never reaches the upstream path.
    pub fn validate(&self) -> Result<&str, String> {
        let id = non_blank(&self.id).ok_or_else(|| "id is required".to_string())?;
        if !id.bytes().all(|b| b.is_ascii_digit()) {
            return Err("id must be numeric".to_string());
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(id: Option<&str>) -> PostQuery {
        PostQuery {
            id: id.map(str::to_string),
        }
    }

    #[test]
    fn numeric_id_is_trimmed() {
        assert_eq!(query(Some(" 7312 ")).validate(), Ok("7312"));
    }

    #[test]
    fn path_segments_are_rejected() {
        assert!(query(Some("../../x/posts/1")).validate().is_err());
        assert!(query(Some("12?key=other")).validate().is_err());
        assert_eq!(query(None).validate(), Err("id is required".to_string()));
    }
}

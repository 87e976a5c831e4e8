use serde::Deserialize;

use super::error::ClientError;

/// A post as consumed by the window math. Only the ID takes part in any
/// computation; the rest of the DAPI payload is dropped at mapping time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
}

/// Gelbooru 0.2.5 wraps the post list in a `post` key and leaves the key
/// out entirely when a search has no results. Older DAPI deployments
/// answer with the bare array instead.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum PostListResponse {
    Wrapped {
        #[serde(default)]
        post: Vec<RawPost>,
    },
    Bare(Vec<RawPost>),
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawPost {
    pub id: Option<u64>,
}

impl PostListResponse {
    /// Maps the wire posts down to [`Post`]. A post list without IDs is
    /// no use to the window math, so it is treated as an invalid answer
    /// rather than silently passed along as an empty page.
    pub(crate) fn into_posts(self) -> Result<Vec<Post>, ClientError> {
        let raw = match self {
            Self::Wrapped { post } => post,
            Self::Bare(posts) => posts,
        };

        raw.into_iter()
            .map(|p| p.id.map(|id| Post { id }).ok_or(ClientError::InvalidServerResponse))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn wrapped_response_maps_to_posts() {
        let body = r#"{"@attributes": {"limit": 100, "offset": 0, "count": 2},
                       "post": [{"id": 8, "md5": "aa"}, {"id": 9, "md5": "bb"}]}"#;

        let parsed = serde_json::from_str::<PostListResponse>(body).unwrap();
        assert_eq!(
            parsed.into_posts().unwrap(),
            vec![Post { id: 8 }, Post { id: 9 }]
        );
    }

    #[test]
    fn bare_array_response_maps_to_posts() {
        let body = r#"[{"id": 1}, {"id": 2}, {"id": 3}]"#;

        let parsed = serde_json::from_str::<PostListResponse>(body).unwrap();
        assert_eq!(
            parsed.into_posts().unwrap(),
            vec![Post { id: 1 }, Post { id: 2 }, Post { id: 3 }]
        );
    }

    #[test]
    fn empty_search_omits_the_post_key() {
        let body = r#"{"@attributes": {"limit": 100, "offset": 0, "count": 0}}"#;

        let parsed = serde_json::from_str::<PostListResponse>(body).unwrap();
        assert_eq!(parsed.into_posts().unwrap(), vec![]);
    }

    #[test]
    fn posts_without_ids_are_an_invalid_response() {
        let body = r#"{"post": [{"md5": "aa"}]}"#;

        let parsed = serde_json::from_str::<PostListResponse>(body).unwrap();
        assert!(matches!(
            parsed.into_posts(),
            Err(ClientError::InvalidServerResponse)
        ));
    }
}

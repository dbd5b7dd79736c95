//! Conversion from feed API wire types into core port types.

use crate::error::{FeedHttpError, FeedHttpResult};
use crate::models::{ApiPost, LookupResponse, SearchResponse};
use chrono::{DateTime, Utc};
use threadcast_core::{FeedAuthor, FeedPost, RootPost};

/// Parse an RFC 3339 timestamp, dropping values that do not parse.
pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(raw, error = %e, "Ignoring unparseable created_at");
            None
        }
    }
}

fn to_feed_post(post: ApiPost) -> FeedPost {
    FeedPost {
        created_at: parse_timestamp(post.created_at.as_deref()),
        id: post.id,
        text: post.text,
        author_id: post.author_id,
    }
}

/// Convert a lookup response into the root post.
///
/// A response without `data` is a failure: if the API attached an `errors`
/// array (the usual shape for deleted or protected posts) it is reported as
/// not found, otherwise as an invalid response.
pub fn parse_lookup(response: LookupResponse) -> FeedHttpResult<RootPost> {
    let Some(data) = response.data else {
        return Err(match response.errors {
            Some(errors) => FeedHttpError::NotFound {
                body: errors.to_string(),
            },
            None => FeedHttpError::InvalidResponse {
                message: "lookup response has no data".to_string(),
            },
        });
    };

    let author = data.author_id.as_deref().map(|author_id| {
        let user = response
            .includes
            .as_ref()
            .and_then(|includes| includes.users.iter().find(|u| u.id == author_id));
        FeedAuthor {
            id: author_id.to_string(),
            username: user.and_then(|u| u.username.clone()),
            display_name: user.and_then(|u| u.name.clone()),
        }
    });
    let conversation_id = data.conversation_id.clone();

    Ok(RootPost {
        post: to_feed_post(data),
        conversation_id,
        author,
    })
}

/// Convert a search response into posts, preserving upstream order.
///
/// The API omits `data` entirely when nothing matched.
pub fn parse_search(response: SearchResponse) -> Vec<FeedPost> {
    if let Some(meta) = &response.meta {
        tracing::debug!(
            result_count = ?meta.result_count,
            has_more = meta.next_token.is_some(),
            "Parsed conversation search"
        );
    }
    response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(to_feed_post)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup(value: serde_json::Value) -> LookupResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn lookup_resolves_expanded_author() {
        let root = parse_lookup(lookup(json!({
            "data": {
                "id": "42",
                "text": "Thread start",
                "author_id": "7",
                "conversation_id": "42",
                "created_at": "2024-05-01T10:00:00.000Z"
            },
            "includes": { "users": [
                { "id": "9", "name": "Someone Else", "username": "else" },
                { "id": "7", "name": "Alice", "username": "alice" }
            ]}
        })))
        .unwrap();

        assert_eq!(root.post.id, "42");
        assert_eq!(root.conversation_id.as_deref(), Some("42"));
        let author = root.author.unwrap();
        assert_eq!(author.id, "7");
        assert_eq!(author.username.as_deref(), Some("alice"));
        assert_eq!(author.display_name.as_deref(), Some("Alice"));
        assert!(root.post.created_at.is_some());
    }

    #[test]
    fn lookup_without_includes_keeps_bare_author_id() {
        let root = parse_lookup(lookup(json!({
            "data": { "id": "42", "text": "x", "author_id": "7" }
        })))
        .unwrap();
        let author = root.author.unwrap();
        assert_eq!(author.id, "7");
        assert!(author.username.is_none());
        assert!(root.conversation_id.is_none());
    }

    #[test]
    fn lookup_with_errors_only_is_not_found() {
        let err = parse_lookup(lookup(json!({
            "errors": [{ "title": "Not Found Error", "detail": "Could not find tweet" }]
        })))
        .unwrap_err();
        assert!(matches!(err, FeedHttpError::NotFound { ref body } if body.contains("Not Found")));
    }

    #[test]
    fn lookup_with_nothing_is_invalid() {
        let err = parse_lookup(lookup(json!({}))).unwrap_err();
        assert!(matches!(err, FeedHttpError::InvalidResponse { .. }));
    }

    #[test]
    fn bad_timestamp_is_dropped() {
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
        assert!(parse_timestamp(Some("2024-05-01T10:00:00+02:00")).is_some());
    }

    #[test]
    fn empty_search_yields_no_posts() {
        let response: SearchResponse =
            serde_json::from_value(json!({ "meta": { "result_count": 0 } })).unwrap();
        assert!(parse_search(response).is_empty());
    }

    #[test]
    fn search_preserves_order() {
        let response: SearchResponse = serde_json::from_value(json!({
            "data": [
                { "id": "44", "text": "third", "created_at": "2024-05-01T10:02:00Z" },
                { "id": "43", "text": "second", "created_at": "2024-05-01T10:01:00Z" }
            ],
            "meta": { "result_count": 2 }
        }))
        .unwrap();
        let ids: Vec<_> = parse_search(response).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["44", "43"]);
    }
}

//! URL construction helpers for the feed API.
//!
//! Pure functions, so every request is built the same way.

use crate::models::FeedConfig;
use url::Url;

/// Fields requested on every post object.
const POST_FIELDS: &str = "author_id,conversation_id,created_at";

/// Fields requested on expanded user objects.
const USER_FIELDS: &str = "name,username";

/// Smallest and largest page sizes the search endpoint accepts.
const SEARCH_MIN_RESULTS: u8 = 10;
const SEARCH_MAX_RESULTS: u8 = 100;

fn with_path(config: &FeedConfig, suffix: &str) -> Url {
    let mut url = config.base_url.clone();
    let base_path = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base_path}/{suffix}"));
    url
}

/// Build the single-post lookup URL, expanding the author.
pub fn build_lookup_url(config: &FeedConfig, post_id: &str) -> Url {
    let mut url = with_path(config, &format!("tweets/{post_id}"));
    url.query_pairs_mut()
        .append_pair("tweet.fields", POST_FIELDS)
        .append_pair("expansions", "author_id")
        .append_pair("user.fields", USER_FIELDS);
    url
}

/// Build the conversation search query string.
pub fn conversation_query(conversation_id: &str, author: &str) -> String {
    format!("conversation_id:{conversation_id} from:{author}")
}

/// Build the recent-search URL for one conversation by one author.
pub fn build_search_url(
    config: &FeedConfig,
    conversation_id: &str,
    author: &str,
    max_results: u8,
) -> Url {
    let mut url = with_path(config, "tweets/search/recent");
    let max_results = max_results.clamp(SEARCH_MIN_RESULTS, SEARCH_MAX_RESULTS);
    url.query_pairs_mut()
        .append_pair("query", &conversation_query(conversation_id, author))
        .append_pair("max_results", &max_results.to_string())
        .append_pair("tweet.fields", POST_FIELDS);
    url
}

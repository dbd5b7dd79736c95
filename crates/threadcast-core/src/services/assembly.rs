//! Thread Assembly: turn a post URL or pasted text into a [`ThreadPayload`].
//!
//! The remote path fetches the root post, then searches its conversation for
//! posts by the same author. Only the root fetch is terminal: when the
//! root carries no conversation/author or the search fails, the result
//! degrades to the root post alone (with a warning for search failures).

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::{Segment, ThreadPayload};
use crate::ports::{FeedError, FeedPort, FeedPost, RootPost};
use crate::utils::{clean_text, extract_status_id, split_lines};

/// Maximum number of posts requested from the conversation search.
pub const SEARCH_PAGE_SIZE: u8 = 100;

/// Title used when the author's display name is unknown.
const GENERIC_TITLE: &str = "Thread";

/// Terminal assembly failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// No numeric status identifier could be found in the URL.
    #[error("Could not find a status id in URL: {0}")]
    InvalidUrl(String),

    /// No feed credential is configured.
    #[error("Feed API credential not configured")]
    MissingCredential,

    /// The root post could not be fetched.
    #[error("Upstream request failed with status {status}")]
    Upstream {
        /// Upstream (or transport-equivalent) status code
        status: u16,
        /// Upstream response body or transport error text
        body: String,
    },
}

impl AssemblyError {
    /// HTTP-class status for surfacing this failure to a caller.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidUrl(_) => 400,
            Self::MissingCredential => 501,
            Self::Upstream { .. } => 502,
        }
    }
}

impl From<FeedError> for AssemblyError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Upstream { status, body } => Self::Upstream { status, body },
            FeedError::Network(msg) | FeedError::InvalidResponse(msg) => {
                Self::Upstream { status: 502, body: msg }
            }
        }
    }
}

/// `"<author> (<n> posts)"`, or `"Thread (<n> posts)"` without an author name.
pub fn thread_title(author_name: Option<&str>, count: usize) -> String {
    let name = author_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(GENERIC_TITLE);
    format!("{name} ({count} posts)")
}

/// Assemble a payload from pasted text, one segment per non-blank line.
///
/// If no non-blank line survives, the payload holds a single segment with
/// the whole trimmed input (possibly empty). Callers should treat blank
/// input as a disabled action; the playback engine ends immediately on such
/// a degenerate payload.
pub fn assemble_text(raw: &str) -> ThreadPayload {
    let lines = split_lines(raw);

    let segments: Vec<Segment> = if lines.is_empty() {
        vec![Segment::new(local_id(0), raw.trim())]
    } else {
        lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| Segment::new(local_id(i), line))
            .collect()
    };

    let title = format!("Pasted text ({} segments)", segments.len());
    tracing::debug!(segments = segments.len(), "Assembled pasted text");
    ThreadPayload::new(title, segments)
}

fn local_id(index: usize) -> String {
    format!("local-{}", index + 1)
}

/// Builds [`ThreadPayload`]s from remote threads or pasted text.
///
/// Holds the feed port as an `Option`: `None` means no credential is
/// configured and every remote assembly fails with
/// [`AssemblyError::MissingCredential`].
#[derive(Clone)]
pub struct ThreadAssembler {
    feed: Option<Arc<dyn FeedPort>>,
}

impl ThreadAssembler {
    pub fn new(feed: Option<Arc<dyn FeedPort>>) -> Self {
        Self { feed }
    }

    /// An assembler with no feed credential.
    pub fn unconfigured() -> Self {
        Self { feed: None }
    }

    pub fn is_configured(&self) -> bool {
        self.feed.is_some()
    }

    /// Local/demo path; see [`assemble_text`].
    pub fn assemble_text(&self, raw: &str) -> ThreadPayload {
        assemble_text(raw)
    }

    /// Remote path: assemble the thread a post URL belongs to.
    pub async fn assemble_url(&self, url: &str) -> Result<ThreadPayload, AssemblyError> {
        let url = url.trim();
        let status_id =
            extract_status_id(url).ok_or_else(|| AssemblyError::InvalidUrl(url.to_string()))?;
        let feed = self.feed.as_ref().ok_or(AssemblyError::MissingCredential)?;

        tracing::info!(status_id = %status_id, "Fetching root post");
        let root = feed.fetch_post(&status_id).await.map_err(|e| {
            tracing::warn!(status_id = %status_id, error = %e, "Root post fetch failed");
            AssemblyError::from(e)
        })?;

        let (Some(conversation_id), Some(author)) =
            (root.conversation_id.as_deref(), root.author.as_ref())
        else {
            tracing::info!(
                status_id = %status_id,
                has_conversation = root.conversation_id.is_some(),
                has_author = root.author.is_some(),
                "Root post has no thread metadata, returning it alone"
            );
            return Ok(root_only(&root, url));
        };

        match feed
            .search_conversation(conversation_id, author, SEARCH_PAGE_SIZE)
            .await
        {
            Ok(posts) => {
                let payload = thread_from_posts(&root, posts, url);
                tracing::info!(
                    conversation_id = %conversation_id,
                    segments = payload.len(),
                    "Assembled thread"
                );
                Ok(payload)
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Conversation search failed, degrading to root post"
                );
                Ok(root_only(&root, url).with_warning(format!(
                    "Could not load the rest of the thread ({e}); showing the linked post only."
                )))
            }
        }
    }
}

impl std::fmt::Debug for ThreadAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadAssembler")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn author_name(root: &RootPost) -> Option<&str> {
    root.author.as_ref().and_then(|a| a.display_name.as_deref())
}

fn author_handle(root: &RootPost) -> Option<String> {
    root.author.as_ref().and_then(|a| a.username.clone())
}

fn to_segments(posts: impl IntoIterator<Item = FeedPost>) -> Vec<Segment> {
    posts
        .into_iter()
        .map(|post| Segment::new(post.id, clean_text(&post.text)))
        .filter(Segment::is_speakable)
        .collect()
}

fn root_only(root: &RootPost, url: &str) -> ThreadPayload {
    let segments = to_segments([root.post.clone()]);
    ThreadPayload::new(thread_title(author_name(root), segments.len()), segments)
        .with_author_handle(author_handle(root))
        .with_source_url(url)
}

fn thread_from_posts(root: &RootPost, posts: Vec<FeedPost>, url: &str) -> ThreadPayload {
    let mut seen = HashSet::new();
    let mut ordered: Vec<FeedPost> = Vec::with_capacity(posts.len() + 1);

    if !posts.iter().any(|p| p.id == root.post.id) {
        seen.insert(root.post.id.clone());
        ordered.push(root.post.clone());
    }
    for post in posts {
        if seen.insert(post.id.clone()) {
            ordered.push(post);
        }
    }

    // Stable: equal timestamps keep response order; undated posts go last.
    ordered.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let segments = to_segments(ordered);
    ThreadPayload::new(thread_title(author_name(root), segments.len()), segments)
        .with_author_handle(author_handle(root))
        .with_source_url(url)
}

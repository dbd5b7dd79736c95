//! # threadcast-core
//!
//! Domain types and pure logic shared by every threadcast adapter:
//!
//! - [`domain`]: the Segment Model ([`ThreadPayload`], [`Segment`]) and [`Voice`].
//! - [`ports`]: the upstream feed port ([`FeedPort`]) implemented by `threadcast-feed`.
//! - [`services`]: [`ThreadAssembler`], which turns a post URL or pasted text
//!   into a [`ThreadPayload`], degrading when upstream data is partial.
//! - [`utils`]: text cleaning, identifier extraction and the
//!   last-write-wins [`RequestGate`].
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod services;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{Segment, ThreadPayload, Voice};
pub use ports::{CoreError, FeedAuthor, FeedError, FeedPort, FeedPost, RootPost};
pub use services::{AssemblyError, SEARCH_PAGE_SIZE, ThreadAssembler, assemble_text, thread_title};
pub use utils::{RequestGate, RequestTicket, clean_text, extract_status_id};


pub mod aggregator;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod models;
pub mod render;
pub mod source;
pub mod time_window;

pub use client::{Auth, DEFAULT_TIMEOUT, JiraClient, JiraConfig};
pub use error::{Error, Result};
pub use models::*;

pub use aggregator::UserAggregator;
pub use coordinator::{Coordinator, DEFAULT_MAX_PARALLEL, SummarizerConfig};
pub use filter::{filter_comments, filter_status_transitions};
pub use render::{OutputFormat, render};
pub use source::IssueSource;
pub use time_window::{DateWindow, day_key, parse_jira_timestamp};

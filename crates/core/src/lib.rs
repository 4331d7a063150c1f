//! Core of the a2t (agent-to-tool) protocol: the catalog model, the query
//! engine, the provider contract and meta responses.
//!
//! Transport lives in `a2t-server`; everything here is independent of HTTP.

pub mod error;
pub mod meta;
pub mod provider;
pub mod query;
pub mod types;

pub use error::{A2tError, A2tResult, ErrorCode};
pub use meta::MetaResponse;
pub use provider::{
    GroupProvider, GroupedProvider, SimpleProvider, ToolError, ToolExecutor, ToolOutput,
    ToolParams, ToolProvider, ToolRegistry,
};
pub use query::{filter_and_paginate, matches_query, Page, PageRequest};
pub use types::*;

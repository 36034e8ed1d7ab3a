//! Microsoft Graph directory adapter.

mod client;
mod dto;
mod token;

pub use client::{classify_graph_error, odata_string_literal, GraphDirectory};
pub use token::TokenCache;

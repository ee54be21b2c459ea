//! Client for the Warlot SQL-over-HTTP gateway.
//!
//! Requests go through one retrying [`executor::Executor`]; SQL results can
//! be buffered, streamed row by row with [`stream::RowStream`], or paged with
//! [`pager::Pager`].

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod logging;
pub mod migrate;
pub mod pager;
pub mod retry;
pub mod stream;

pub use cancel::CancelToken;
pub use client::models::*;
pub use client::{query, Client, ClientConfig, Project};
pub use error::{ApiError, Error};
pub use executor::{CallOptions, Hooks};
pub use migrate::Migrator;
pub use pager::Pager;
pub use retry::RetryPolicy;
pub use stream::{RowStream, StreamError};

#![forbid(unsafe_code)]

//! HTTP transport for vidra: a small [`Net`] trait over `reqwest`, retry and
//! timeout decorators, and the timed [`SegmentFetcher`] that turns each
//! completed transfer into a throughput sample.

mod client;
mod error;
mod fetcher;
mod retry;
mod timeout;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    fetcher::{Fetch, FetchSource, FetchedChunk, SegmentFetcher},
    retry::{DefaultRetryPolicy, RetryNet},
    timeout::TimeoutNet,
    traits::{Net, NetExt, NetResponse},
    types::{Headers, NetOptions, RetryPolicy},
};

#[cfg(feature = "mock")]
pub mod mock {
    //! Unimock APIs for the [`Net`](crate::Net) and [`Fetch`](crate::Fetch)
    //! traits, for use from downstream crate tests.
    pub use crate::{fetcher::FetchMock, traits::NetMock};
}

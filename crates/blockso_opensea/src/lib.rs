//! Opensea API client.
//!
//! Opensea allows 4 requests per second and answers 429 with a `Retry-After`
//! header beyond that. Every request made by [`OpenseaClient`] passes the
//! configured throttle first and is retried on 429 until it goes through.
//!
//! Requests accept a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! so a caller that no longer needs the asset (a closed view, a superseded
//! lookup) can abandon it. Cancellation is reported as an error and is never
//! mistaken for throttling.

mod asset;
mod client;

pub use asset::Asset;
pub use client::OpenseaClient;

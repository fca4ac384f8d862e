//! Single-file HTTP GET for archive entries.
//!
//! Only the status line and headers are awaited here; the body is returned as
//! a lazy byte stream that the encoder pulls from while writing the entry.

use futures_util::stream::{StreamExt, TryStreamExt};
use reqwest::Client;
use std::io;

use crate::config::HttpOptions;
use crate::descriptor::FileDescriptor;
use crate::encoder::EntryBody;
use crate::error::{FetchError, ZipStreamError};

/// HTTP client for fetching entries. Cheap to clone; clones share a
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(opts: &HttpOptions) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .connect_timeout(opts.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(10));
        if let Some(timeout) = opts.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(ua) = &opts.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if opts.no_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wraps an existing client (e.g. one shared with other parts of an application).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Issues one GET for `descriptor` and returns its body stream once a 2xx
    /// response has arrived.
    pub async fn fetch(&self, descriptor: &FileDescriptor) -> Result<EntryBody, ZipStreamError> {
        let fail = |source: FetchError| ZipStreamError::Fetch {
            name: descriptor.name.clone(),
            url: descriptor.source_location.clone(),
            source,
        };

        let response = self
            .client
            .get(&descriptor.source_location)
            .send()
            .await
            .map_err(|e| fail(FetchError::Request(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(FetchError::Status(status.as_u16())));
        }

        Ok(response.bytes_stream().map_err(io::Error::other).boxed())
    }
}

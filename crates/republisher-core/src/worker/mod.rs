//! Per-identifier republish worker.
//!
//! A [`Republisher`] resolves one identifier at a time by walking the
//! [`CollectionTable`] in order:
//!
//! 1. **Read** - `GET {read}/{collection}/{id}`. Transport errors and any
//!    status other than `200 OK` move on to the next collection; `404` is the
//!    expected miss and is not logged above `debug`.
//! 2. **Publish** - on the first `200 OK`, the read response body is streamed
//!    unchanged into `POST {publish}` with the collection's origin tag in
//!    [`ORIGIN_SYSTEM_HEADER`]. The identifier is resolved after this step
//!    whatever the publish result is.
//! 3. **Exhausted** - no collection had the content.
//!
//! Every branch ends in a [`RepublishOutcome`]; nothing is returned as an
//! error. Response bodies are owned by the branch that received them and
//! dropped when it returns.

use crate::{
    collection::{Collection, CollectionTable},
    common::{ContentId, RepublishOutcome},
    endpoint::Endpoints,
};
use reqwest::{Body, Client, Response, StatusCode};
use tokio_util::sync::CancellationToken;


/// Header carrying the origin system tag of republished content.
pub const ORIGIN_SYSTEM_HEADER: &str = "X-Origin-System-Id";

/// Probes collections for an identifier and republishes what it finds.
///
/// Cheap to share behind an `Arc`: the [`Client`] pools connections
/// internally and the rest is read-only configuration.
#[derive(Debug)]
pub struct Republisher {
    client: Client,
    endpoints: Endpoints,
    collections: CollectionTable,
}

impl Republisher {
    pub const fn new(client: Client, endpoints: Endpoints, collections: CollectionTable) -> Self {
        Self {
            client,
            endpoints,
            collections,
        }
    }

    pub const fn collections(&self) -> &CollectionTable {
        &self.collections
    }

    pub const fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Resolves `id` against each collection in order.
    ///
    /// Returns [`RepublishOutcome::Cancelled`] as soon as `cancel` fires;
    /// the in-flight request is dropped with it.
    #[tracing::instrument(name = "republish", skip_all, fields(uuid = %id))]
    pub async fn republish(&self, id: &ContentId, cancel: &CancellationToken) -> RepublishOutcome {
        for collection in self.collections.iter() {
            let found = tokio::select! {
                biased;
                () = cancel.cancelled() => return RepublishOutcome::Cancelled,
                found = self.read(collection, id) => found,
            };
            let Some(content) = found else {
                continue;
            };

            return tokio::select! {
                biased;
                () = cancel.cancelled() => RepublishOutcome::Cancelled,
                outcome = self.publish(collection, id, content) => outcome,
            };
        }

        tracing::warn!(
            "Content with UUID [{id}] could not be found in collections {}",
            self.collections
        );
        RepublishOutcome::NotFound
    }

    /// Returns the response only when the collection holds the content.
    async fn read(&self, collection: &Collection, id: &ContentId) -> Option<Response> {
        let url = self.endpoints.read_url(collection, id);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("GET request failure for UUID [{id}]: [{e}].");
                return None;
            }
        };

        match response.status() {
            StatusCode::OK => Some(response),
            StatusCode::NOT_FOUND => {
                tracing::debug!("UUID [{id}] not in collection [{}]", collection.name());
                None
            }
            status => {
                tracing::warn!(
                    "GET request unsuccessful. Unexpected status [{status}] UUID [{id}] collection [{}].",
                    collection.name()
                );
                None
            }
        }
    }

    async fn publish(
        &self,
        collection: &Collection,
        id: &ContentId,
        content: Response,
    ) -> RepublishOutcome {
        let failed = || RepublishOutcome::PublishFailed {
            collection: collection.name().to_owned(),
        };

        let request = match self
            .client
            .post(self.endpoints.publish_url().clone())
            .header(ORIGIN_SYSTEM_HEADER, collection.origin_system_id().clone())
            .body(Body::from(content))
            .build()
        {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Failure in creating POST request for UUID [{id}]: [{e}]");
                return failed();
            }
        };

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("POST request failure for UUID [{id}]: [{e}]");
                return failed();
            }
        };

        match response.status() {
            StatusCode::OK => {
                tracing::info!(
                    "Content with UUID [{id}] republished successfully from [{}].",
                    collection.name()
                );
                RepublishOutcome::Published {
                    collection: collection.name().to_owned(),
                }
            }
            status => {
                tracing::warn!(
                    "POST request unsuccessful. Unexpected status [{status}] UUID [{id}]."
                );
                failed()
            }
        }
    }
}

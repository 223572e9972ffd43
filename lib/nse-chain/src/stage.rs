//! Stage framework for chained request/close processing

use anyhow::Result;
use nse_api::{Connection, NetworkServiceRequest};
use std::sync::Arc;
use tracing::{span, Instrument, Level};

/// One link of the request chain.
///
/// A stage either handles the call and hands it to `next`, returning what the
/// rest of the chain returns, or fails without calling `next`.
#[async_trait::async_trait]
pub trait Stage: Send + Sync {
    /// Stage name (for logging)
    fn name(&self) -> &'static str {
        "UnnamedStage"
    }

    /// Called for a connection request
    async fn request(
        &self,
        request: &mut NetworkServiceRequest,
        next: Next<'_>,
    ) -> Result<Connection> {
        next.request(request).await
    }

    /// Called when a connection is closed
    async fn close(&self, conn: &Connection, next: Next<'_>) -> Result<()> {
        next.close(conn).await
    }
}

/// Continuation over the stages after the current one
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
}

impl<'a> Next<'a> {
    pub fn new(stages: &'a [Arc<dyn Stage>]) -> Self {
        Self { stages }
    }

    /// Pass the request to the next stage. Past the last stage the request's
    /// connection is returned as the result.
    pub async fn request(self, request: &mut NetworkServiceRequest) -> Result<Connection> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let span = span!(Level::DEBUG, "stage", name = stage.name());
                stage
                    .request(request, Next::new(rest))
                    .instrument(span)
                    .await
            }
            None => Ok(request.connection.clone()),
        }
    }

    /// Pass the close to the next stage
    pub async fn close(self, conn: &Connection) -> Result<()> {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let span = span!(Level::DEBUG, "stage", name = stage.name());
                stage.close(conn, Next::new(rest)).instrument(span).await
            }
            None => Ok(()),
        }
    }
}

/// Chain of stages to execute in order
pub struct Chain {
    stages: Vec<Arc<dyn Stage>>,
}

impl Chain {
    /// Create a new, empty chain
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Add a stage to the end of the chain
    pub fn add<S: Stage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Run a connection request through the chain
    pub async fn request(&self, request: &mut NetworkServiceRequest) -> Result<Connection> {
        Next::new(&self.stages).request(request).await
    }

    /// Run a connection close through the chain
    pub async fn close(&self, conn: &Connection) -> Result<()> {
        Next::new(&self.stages).close(conn).await
    }

    /// Stage names in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

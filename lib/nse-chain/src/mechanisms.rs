//! Mechanism selection: dispatch to a per-mechanism stage

use anyhow::Result;
use nse_api::{Connection, NetworkServiceRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::stage::{Next, Stage};
use crate::ChainError;

/// Dispatches requests and closes to the stage registered for the connection's
/// mechanism type.
///
/// A request whose connection has no mechanism yet tries the client's mechanism
/// preferences in order, each on a copy of the request. Only the attempt that
/// succeeds is written back; a failed request leaves the caller's request as it was.
pub struct MechanismsServer {
    stages: HashMap<String, Arc<dyn Stage>>,
}

impl MechanismsServer {
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// Register the stage handling a mechanism type
    pub fn with<S: Stage + 'static>(mut self, mechanism_type: &str, stage: S) -> Self {
        self.stages.insert(mechanism_type.to_string(), Arc::new(stage));
        self
    }

    /// Check whether a mechanism type is supported
    pub fn supports(&self, mechanism_type: &str) -> bool {
        self.stages.contains_key(mechanism_type)
    }

    fn stage_for(&self, conn: &Connection) -> std::result::Result<&Arc<dyn Stage>, ChainError> {
        let mechanism_type = conn
            .mechanism_type()
            .ok_or_else(|| ChainError::MissingMechanism(conn.id.clone()))?;
        self.stages
            .get(mechanism_type)
            .ok_or_else(|| ChainError::UnsupportedMechanism(mechanism_type.to_string()))
    }
}

impl Default for MechanismsServer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Stage for MechanismsServer {
    fn name(&self) -> &'static str {
        "MechanismsServer"
    }

    async fn request(
        &self,
        request: &mut NetworkServiceRequest,
        next: Next<'_>,
    ) -> Result<Connection> {
        if request.connection.mechanism.is_some() {
            let stage = self.stage_for(&request.connection)?;
            return stage.request(request, next).await;
        }

        let preferences = request.mechanism_preferences.clone();
        let mut last_error = None;
        for preference in preferences {
            let Some(stage) = self.stages.get(&preference.mechanism_type) else {
                debug!("Skipping unsupported mechanism: {}", preference.mechanism_type);
                continue;
            };

            // A failed attempt must not leak context stamped by later stages.
            let mechanism_type = preference.mechanism_type.clone();
            let mut attempt = request.clone();
            attempt.connection.mechanism = Some(preference);
            match stage.request(&mut attempt, next).await {
                Ok(conn) => {
                    *request = attempt;
                    return Ok(conn);
                }
                Err(e) => {
                    debug!("Mechanism {} failed: {}", mechanism_type, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ChainError::NoSupportedMechanism(request.connection.network_service.clone()).into()
        }))
    }

    async fn close(&self, conn: &Connection, next: Next<'_>) -> Result<()> {
        let stage = self.stage_for(conn)?;
        stage.close(conn, next).await
    }
}

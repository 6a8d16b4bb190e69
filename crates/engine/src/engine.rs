//! Engine trait.

use crate::{CommandOutcome, ObjectInfo, Result};
use std::future::Future;
use tracing::warn;

/// A live, queryable GeoGebra instance.
///
/// Implementations are single-writer: callers must not have two commands
/// in flight against the same instance. [`EnginePool`](crate::EnginePool)
/// enforces that when instances are shared between requests.
pub trait Engine: Send + Sync {
    /// Evaluate one command string.
    fn eval_command(&self, command: &str) -> impl Future<Output = Result<CommandOutcome>> + Send;

    /// Look up an object by name. `None` when it does not exist.
    fn object_info(&self, name: &str) -> impl Future<Output = Result<Option<ObjectInfo>>> + Send;

    /// Names of every object in the construction.
    fn object_names(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// Start a fresh, empty construction.
    fn new_construction(&self) -> impl Future<Output = Result<()>> + Send;

    /// Export the graphics view as a base64-encoded PNG.
    fn export_png(&self) -> impl Future<Output = Result<String>> + Send;
}

/// Collect the summary of every object currently in the construction.
///
/// Objects that vanish between listing and lookup are skipped.
pub async fn snapshot<E: Engine>(engine: &E) -> Result<Vec<ObjectInfo>> {
    let names = engine.object_names().await?;
    let mut objects = Vec::with_capacity(names.len());
    for name in names {
        match engine.object_info(&name).await? {
            Some(info) => objects.push(info),
            None => warn!(object = %name, "object disappeared during snapshot"),
        }
    }
    Ok(objects)
}

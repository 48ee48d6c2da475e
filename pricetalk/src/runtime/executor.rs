use std::borrow::Cow;

use redis::aio::ConnectionLike;
use serde_json::Value;

use crate::{
    errors::{EngageError, StoreError},
    runtime::{commands::WriteBatch, scripts::WRITE_BATCH_SCRIPT},
    types::EntityKind,
};

/// Outcome of a batch that reached the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
    Applied { written: u64, deleted: u64 },
    /// A guarded document moved on since it was read; nothing was written.
    Conflict { key: String, expected: u64, actual: u64 },
}

pub async fn execute_batch<C>(conn: &mut C, batch: &WriteBatch) -> Result<BatchResult, EngageError>
where
    C: ConnectionLike + Send,
{
    let payload = serde_json::to_string(batch)?;
    log::debug!(
        "write batch: {} guards, {} sets, {} deletes",
        batch.guards.len(),
        batch.sets.len(),
        batch.deletes.len()
    );

    let mut invocation = WRITE_BATCH_SCRIPT.prepare_invoke();
    invocation.arg(payload);
    let raw: String = invocation.invoke_async(conn).await?;

    let value: Value = serde_json::from_str(&raw).map_err(|err| StoreError::Script {
        message: Cow::Owned(format!("failed to parse lua response: {err}")),
    })?;
    interpret_response(&value)
}

fn interpret_response(value: &Value) -> Result<BatchResult, EngageError> {
    let Some(error) = value.get("error") else {
        return Ok(BatchResult::Applied {
            written: value.get("written").and_then(Value::as_u64).unwrap_or(0),
            deleted: value.get("deleted").and_then(Value::as_u64).unwrap_or(0),
        });
    };

    match error.as_str() {
        Some("version_conflict") => Ok(BatchResult::Conflict {
            key: value.get("key").and_then(Value::as_str).unwrap_or_default().to_string(),
            expected: value.get("expected").and_then(Value::as_u64).unwrap_or(0),
            actual: value.get("actual").and_then(Value::as_u64).unwrap_or(0),
        }),
        Some("entity_not_found") => {
            let kind = value
                .get("kind")
                .and_then(Value::as_str)
                .and_then(|kind| kind.parse::<EntityKind>().ok())
                .ok_or_else(|| StoreError::Script {
                    message: Cow::Borrowed("entity_not_found without a kind"),
                })?;
            let id = value.get("entity_id").and_then(Value::as_str).unwrap_or_default();
            Err(EngageError::not_found(kind, id))
        }
        Some(other) => Err(StoreError::Script {
            message: Cow::Owned(other.to_string()),
        }
        .into()),
        None => Err(StoreError::Script {
            message: Cow::Borrowed("lua_error"),
        }
        .into()),
    }
}

#[allow(async_fn_in_trait)]
pub trait BatchExecutor {
    async fn execute(&mut self, batch: &WriteBatch) -> Result<BatchResult, EngageError>;
}

pub struct RedisExecutor<'a, C>
where
    C: ConnectionLike + Send,
{
    connection: &'a mut C,
}

impl<'a, C> RedisExecutor<'a, C>
where
    C: ConnectionLike + Send,
{
    pub fn new(connection: &'a mut C) -> Self {
        Self { connection }
    }
}

impl<'a, C> BatchExecutor for RedisExecutor<'a, C>
where
    C: ConnectionLike + Send,
{
    async fn execute(&mut self, batch: &WriteBatch) -> Result<BatchResult, EngageError> {
        execute_batch(self.connection, batch).await
    }
}

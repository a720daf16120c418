//! Numeric per-user counters stored under `<user>:<counter>`.

use async_trait::async_trait;
use serde_json::{Number, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;
use crate::store::{KvStore, Update};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
}

/// `current op delta`, exact for integers and falling back to float
/// arithmetic otherwise. `None` when the result is not finite.
fn combine(current: &Number, delta: &Number, op: Op) -> Option<Number> {
    if let (Some(a), Some(b)) = (current.as_i64(), delta.as_i64()) {
        let exact = match op {
            Op::Add => a.checked_add(b),
            Op::Sub => a.checked_sub(b),
        };
        if let Some(n) = exact {
            return Some(n.into());
        }
    }
    let (a, b) = (current.as_f64()?, delta.as_f64()?);
    Number::from_f64(match op {
        Op::Add => a + b,
        Op::Sub => a - b,
    })
}

async fn apply<S>(store: &S, key: StoreKey, delta: Number, op: Op) -> StoreResult<Number>
where
    S: KvStore + ?Sized,
{
    let id = key.physical();
    let total = store
        .update(&id, |current| {
            let current = match current {
                None => Number::from(0),
                Some(Value::Number(n)) => n,
                Some(_) => return Err(StoreError::NotANumber { id: id.clone() }),
            };
            let total =
                combine(&current, &delta, op).ok_or_else(|| StoreError::LossyValue { id: id.clone() })?;
            Ok(Update::Write(Value::Number(total.clone()), total))
        })
        .await?;
    debug!(id = %id, ?op, %total, "counter updated");
    Ok(total)
}

#[async_trait]
pub trait CounterOps: KvStore {
    /// Overwrite the counter, whatever it held before.
    async fn set_user_value<N>(&self, user_id: &str, name: &str, value: N) -> StoreResult<()>
    where
        N: Into<Number> + Send,
    {
        let id = StoreKey::counter(user_id, name).physical();
        self.set_object(&id, Value::Number(value.into())).await
    }

    async fn get_user_value(&self, user_id: &str, name: &str) -> StoreResult<Option<Number>> {
        let id = StoreKey::counter(user_id, name).physical();
        match self.get_object(&id).await? {
            Some(Value::Number(n)) => Ok(Some(n)),
            Some(_) => Err(StoreError::NotANumber { id }),
            None => Ok(None),
        }
    }

    /// Add `delta` to the counter, treating a missing counter as zero.
    async fn add_user_value<N>(&self, user_id: &str, name: &str, delta: N) -> StoreResult<Number>
    where
        N: Into<Number> + Send,
    {
        apply(self, StoreKey::counter(user_id, name), delta.into(), Op::Add).await
    }

    /// Subtract `delta` from the counter. The result may go negative.
    async fn remove_user_value<N>(
        &self,
        user_id: &str,
        name: &str,
        delta: N,
    ) -> StoreResult<Number>
    where
        N: Into<Number> + Send,
    {
        apply(self, StoreKey::counter(user_id, name), delta.into(), Op::Sub).await
    }
}

impl<S: KvStore> CounterOps for S {}

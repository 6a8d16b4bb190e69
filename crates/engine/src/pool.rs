//! Checkout pool for single-writer engines.

use crate::{Engine, Error, Result};
use std::ops::Deref;
use std::sync::Mutex;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::debug;

/// A fixed set of engines, each checked out by at most one caller.
///
/// `acquire` waits while every engine is busy. Dropping the returned
/// [`PooledEngine`] puts the engine back.
pub struct EnginePool<E> {
    idle: Mutex<Vec<E>>,
    permits: Semaphore,
    size: usize,
}

impl<E: Engine> EnginePool<E> {
    /// Build a pool over `engines`. An empty set is refused, since every
    /// `acquire` on it would wait forever.
    pub fn new(engines: Vec<E>) -> Result<Self> {
        if engines.is_empty() {
            return Err(Error::EmptyPool);
        }
        let size = engines.len();
        Ok(Self {
            idle: Mutex::new(engines),
            permits: Semaphore::new(size),
            size,
        })
    }

    /// Total number of engines managed by the pool.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Engines not currently checked out.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Check out an engine, waiting until one is free.
    pub async fn acquire(&self) -> Result<PooledEngine<'_, E>> {
        let permit = self.permits.acquire().await.map_err(|_| Error::PoolClosed)?;
        let engine = self
            .idle
            .lock()
            .map_err(|_| Error::PoolClosed)?
            .pop()
            .ok_or(Error::PoolClosed)?;
        debug!(available = self.available(), "engine checked out");
        Ok(PooledEngine {
            engine: Some(engine),
            pool: self,
            _permit: permit,
        })
    }

    /// Stop handing out engines. Pending and future `acquire` calls fail.
    pub fn close(&self) {
        self.permits.close();
    }
}

/// An engine checked out of an [`EnginePool`].
pub struct PooledEngine<'a, E> {
    engine: Option<E>,
    pool: &'a EnginePool<E>,
    // Released after the engine is back in `idle` (fields drop after `drop`).
    _permit: SemaphorePermit<'a>,
}

impl<E> Deref for PooledEngine<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.engine
            .as_ref()
            .expect("engine is present until the checkout is dropped")
    }
}

impl<E> Drop for PooledEngine<'_, E> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            if let Ok(mut idle) = self.pool.idle.lock() {
                idle.push(engine);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandOutcome, ObjectInfo};
    use std::sync::Arc;
    use std::time::Duration;

    struct FakeEngine(u32);

    impl Engine for FakeEngine {
        async fn eval_command(&self, _command: &str) -> Result<CommandOutcome> {
            Ok(CommandOutcome::accepted())
        }
        async fn object_info(&self, _name: &str) -> Result<Option<ObjectInfo>> {
            Ok(None)
        }
        async fn object_names(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        async fn new_construction(&self) -> Result<()> {
            Ok(())
        }
        async fn export_png(&self) -> Result<String> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn checkout_is_exclusive_and_returns_on_drop() {
        let pool = EnginePool::new(vec![FakeEngine(7)]).unwrap();
        assert_eq!(pool.size(), 1);

        let first = pool.acquire().await.unwrap();
        assert_eq!(first.0, 7);
        assert_eq!(pool.available(), 0);

        let second = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(second.is_err(), "second checkout must wait");

        drop(first);
        assert_eq!(pool.available(), 1);
        let again = pool.acquire().await.unwrap();
        assert_eq!(again.0, 7);
    }

    #[tokio::test]
    async fn waiting_caller_gets_engine_after_release() {
        let pool = Arc::new(EnginePool::new(vec![FakeEngine(1)]).unwrap());
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.acquire().await.map(|e| e.0) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        assert_eq!(waiter.await.unwrap().unwrap(), 1);
    }

    #[test]
    fn empty_pool_is_refused() {
        let result = EnginePool::<FakeEngine>::new(Vec::new());
        assert!(matches!(result, Err(Error::EmptyPool)));
    }

    #[tokio::test]
    async fn closed_pool_refuses_checkout() {
        let pool = EnginePool::new(vec![FakeEngine(1)]).unwrap();
        pool.close();
        assert!(matches!(pool.acquire().await, Err(Error::PoolClosed)));
    }
}

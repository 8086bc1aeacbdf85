//! Background Job Queue
//!
//! Bounded queue for side effects that must never sit on a request's critical
//! path (partner provisioning, ops notifications). Producers use
//! [`JobQueue::enqueue`], which never waits: a full queue rejects the job and
//! the caller logs it.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Semaphore, mpsc, mpsc::error::TrySendError};

/// Consumer side of a [`JobQueue`]
#[trait_variant::make(JobHandler: Send)]
pub trait LocalJobHandler<J> {
    /// Run one job. Failures are the handler's to log; nothing is returned.
    async fn handle(&self, job: J);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("job queue is full")]
    Full,
    #[error("job queue is closed")]
    Closed,
}

/// Queue sizing
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Jobs buffered before `enqueue` starts rejecting
    pub capacity: usize,
    /// Jobs running at the same time
    pub max_in_flight: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 512,
            max_in_flight: 16,
        }
    }
}

/// Producer handle; cheap to clone
pub struct JobQueue<J> {
    name: &'static str,
    tx: mpsc::Sender<J>,
}

impl<J> Clone for JobQueue<J> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<J> JobQueue<J>
where
    J: Send + 'static,
{
    /// Spawn the dispatcher loop on the current tokio runtime
    pub fn start<H>(name: &'static str, config: QueueConfig, handler: H) -> Self
    where
        H: JobHandler<J> + Clone + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<J>(config.capacity.max(1));
        let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let Ok(permit) = permits.clone().acquire_owned().await else {
                    break;
                };
                let handler = handler.clone();

                tokio::spawn(async move {
                    handler.handle(job).await;
                    drop(permit);
                });
            }
            tracing::debug!(queue = name, "Job queue closed");
        });

        tracing::info!(
            queue = name,
            capacity = config.capacity,
            max_in_flight = config.max_in_flight,
            "Job queue started"
        );

        Self { name, tx }
    }

    /// Hand a job to the queue without waiting
    pub fn enqueue(&self, job: J) -> Result<(), QueueError> {
        self.tx.try_send(job).map_err(|e| {
            let err = match e {
                TrySendError::Full(_) => QueueError::Full,
                TrySendError::Closed(_) => QueueError::Closed,
            };
            tracing::warn!(queue = self.name, error = %err, "Job dropped");
            err
        })
    }
}

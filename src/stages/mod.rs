//! The five analysis stages behind one uniform contract.
//!
//! Each stage takes one typed input bundle and returns one typed output or a
//! hard fault. Reasoning stages absorb unparseable replies into low-confidence
//! results instead of failing.

pub mod care_plan;
pub mod document_processing;
pub mod symptom_reasoning;
pub mod triage;
pub mod voice_intake;

pub use care_plan::*;
pub use document_processing::*;
pub use symptom_reasoning::*;
pub use triage::*;
pub use voice_intake::*;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

/// A pipeline stage: `invoke(input) -> output`
#[async_trait]
pub trait Stage<I: Send + 'static, O>: Send + Sync {
    async fn invoke(&self, input: I) -> Result<O>;
}

type BlockingFn<I, O> = dyn Fn(I) -> Result<O> + Send + Sync;

/// Runs a synchronous stage body on the blocking worker pool
pub struct BlockingStage<I, O> {
    body: Arc<BlockingFn<I, O>>,
}

impl<I, O> BlockingStage<I, O> {
    pub fn new(body: impl Fn(I) -> Result<O> + Send + Sync + 'static) -> Self {
        Self { body: Arc::new(body) }
    }
}

#[async_trait]
impl<I, O> Stage<I, O> for BlockingStage<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    async fn invoke(&self, input: I) -> Result<O> {
        let body = Arc::clone(&self.body);
        tokio::task::spawn_blocking(move || body(input))
            .await
            .context("Blocking stage panicked")?
    }
}

/// Adapts an async closure into a [`Stage`]
pub struct FnStage<F> {
    body: F,
}

impl<F> FnStage<F> {
    pub fn new(body: F) -> Self {
        Self { body }
    }
}

#[async_trait]
impl<I, O, F, Fut> Stage<I, O> for FnStage<F>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O>> + Send + 'static,
{
    async fn invoke(&self, input: I) -> Result<O> {
        (self.body)(input).await
    }
}

//! Per-call deadline for a provider.
//!
//! Every `complete` and `embed` call is bounded by a timeout. There is no
//! retry: an expired call surfaces as `ProviderError::Timeout`.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use vahed_core::error::ProviderError;
use vahed_core::provider::*;

/// A provider wrapper that bounds every call with a deadline.
pub struct DeadlineProvider {
    inner: Arc<dyn Provider>,
    timeout: Duration,
}

impl DeadlineProvider {
    pub fn new(inner: Arc<dyn Provider>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    fn expired(&self, call: &str) -> ProviderError {
        warn!(
            provider = %self.inner.name(),
            call,
            timeout_secs = self.timeout.as_secs(),
            "Provider call timed out"
        );
        ProviderError::Timeout(format!(
            "Provider '{}' {call} timed out after {}s",
            self.inner.name(),
            self.timeout.as_secs()
        ))
    }
}

#[async_trait]
impl Provider for DeadlineProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        tokio::time::timeout(self.timeout, self.inner.complete(request))
            .await
            .map_err(|_| self.expired("completion"))?
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        tokio::time::timeout(self.timeout, self.inner.embed(request))
            .await
            .map_err(|_| self.expired("embedding"))?
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        match tokio::time::timeout(self.timeout, self.inner.health_check()).await {
            Ok(result) => result,
            Err(_) => Ok(false),
        }
    }
}

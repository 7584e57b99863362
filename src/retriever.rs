use crate::{
    provider::{FetchOutcome, FetchedSources, SourceProvider},
    Error,
};
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Sources of the first provider that had the address.
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievedSources {
    pub provider: String,
    pub contract_name: Option<String>,
    pub sources: BTreeMap<String, String>,
    pub compiler_options: serde_json::Value,
}

/// What a single provider attempt means for the fallback loop.
#[derive(Debug)]
enum Attempt {
    /// The provider could not answer; try the next one.
    Skip,
    /// The provider has the address in a language that cannot be compiled.
    /// No other provider is expected to do better.
    ShortCircuit { language: String },
    Succeed(FetchedSources),
}

#[derive(Clone, Debug)]
pub struct SourceRetriever {
    language: String,
}

impl SourceRetriever {
    /// `language` is the only source language the downstream compiler accepts.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Queries providers one by one, in order, until one of them has sources
    /// for the address.
    pub async fn retrieve(
        &self,
        providers: &[Box<dyn SourceProvider>],
        address: &str,
        cancellation: &CancellationToken,
    ) -> Result<RetrievedSources, Error> {
        for provider in providers {
            if cancellation.is_cancelled() {
                return Err(Error::Cancelled {
                    address: address.to_string(),
                });
            }

            let attempt = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    return Err(Error::Cancelled { address: address.to_string() });
                }
                attempt = self.attempt(provider.as_ref(), address) => attempt,
            };

            match attempt {
                Attempt::Skip => continue,
                Attempt::ShortCircuit { language } => {
                    return Err(Error::UnsupportedLanguage {
                        address: address.to_string(),
                        provider: provider.name(),
                        language,
                        expected: self.language.clone(),
                    })
                }
                Attempt::Succeed(found) => {
                    tracing::info!(
                        address,
                        provider = %provider.name(),
                        files = found.sources.len(),
                        "retrieved verified sources"
                    );
                    return Ok(RetrievedSources {
                        provider: provider.name(),
                        contract_name: found.contract_name,
                        sources: found.sources,
                        compiler_options: found.compiler_options,
                    });
                }
            }
        }

        Err(Error::Exhausted {
            address: address.to_string(),
        })
    }

    async fn attempt(&self, provider: &dyn SourceProvider, address: &str) -> Attempt {
        match provider.fetch_sources_for_address(address).await {
            Err(err) => {
                tracing::warn!(
                    address,
                    provider = %provider.name(),
                    "provider failed to fetch sources: {err:#}"
                );
                Attempt::Skip
            }
            Ok(FetchOutcome::NotFound) => {
                tracing::debug!(address, provider = %provider.name(), "no sources found");
                Attempt::Skip
            }
            Ok(FetchOutcome::Found(found)) if found.language != self.language => {
                Attempt::ShortCircuit {
                    language: found.language,
                }
            }
            Ok(FetchOutcome::Found(found)) if found.sources.is_empty() => {
                tracing::warn!(
                    address,
                    provider = %provider.name(),
                    "provider returned an empty set of sources"
                );
                Attempt::Skip
            }
            Ok(FetchOutcome::Found(found)) => Attempt::Succeed(found),
        }
    }
}

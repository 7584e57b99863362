mod registry;

pub use registry::{ProviderRegistry, RegistryError};

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Verified sources as a provider reports them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchedSources {
    /// Name of the deployed contract, when the provider knows it.
    pub contract_name: Option<String>,
    /// Source file path to its content.
    pub sources: BTreeMap<String, String>,
    pub language: String,
    /// Compiler settings the contract was verified with; opaque to the resolver.
    pub compiler_options: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    /// The provider has no record for the address.
    NotFound,
    Found(FetchedSources),
}

/// A provider already validated for one network.
///
/// Instances are created per resolution by [`ProviderDescriptor::for_network`]
/// and dropped when it finishes.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    fn name(&self) -> String;

    async fn fetch_sources_for_address(&self, address: &str) -> anyhow::Result<FetchOutcome>;
}

/// Result of probing a provider against a network id.
pub enum NetworkSupport {
    Supported(Box<dyn SourceProvider>),
    Unsupported,
}

impl std::fmt::Debug for NetworkSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkSupport::Supported(provider) => f
                .debug_tuple("Supported")
                .field(&provider.name())
                .finish(),
            NetworkSupport::Unsupported => f.write_str("Unsupported"),
        }
    }
}

/// Entry of the [`ProviderRegistry`]: a known source provider that can be
/// instantiated for a network.
#[async_trait]
pub trait ProviderDescriptor: Send + Sync {
    /// Unique name the provider is referred to by in configuration.
    fn name(&self) -> &str;

    /// Read-only check of the network. Errors other than an unsupported network
    /// are systemic faults and abort provider selection.
    async fn for_network(
        &self,
        network_id: u64,
        options: Option<&serde_json::Value>,
    ) -> anyhow::Result<NetworkSupport>;
}

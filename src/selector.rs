use crate::{
    provider::{NetworkSupport, ProviderDescriptor, ProviderRegistry, SourceProvider},
    Error,
};
use std::{collections::BTreeMap, sync::Arc};

/// What provider selection is configured with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionConfig {
    /// Explicit priority order of provider names. The registry order is used if absent.
    pub order: Option<Vec<String>>,
    /// Provider-specific options keyed by provider name.
    pub options: BTreeMap<String, serde_json::Value>,
    pub network_id: u64,
}

#[derive(Clone, Debug)]
pub struct ProviderSelector {
    registry: Arc<ProviderRegistry>,
}

impl ProviderSelector {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    /// Returns providers supporting the configured network, in priority order.
    ///
    /// All descriptors are probed concurrently. Providers that do not support
    /// the network are dropped; any probe error aborts the selection.
    pub async fn select(
        &self,
        config: &SelectionConfig,
    ) -> Result<Vec<Box<dyn SourceProvider>>, Error> {
        let descriptors = self.registry.resolve_order(config.order.as_deref())?;

        let probes = descriptors
            .iter()
            .map(|descriptor| probe(descriptor.as_ref(), config));
        let supported = futures::future::try_join_all(probes).await?;

        Ok(supported.into_iter().flatten().collect())
    }
}

async fn probe(
    descriptor: &dyn ProviderDescriptor,
    config: &SelectionConfig,
) -> Result<Option<Box<dyn SourceProvider>>, Error> {
    let name = descriptor.name();
    let support = descriptor
        .for_network(config.network_id, config.options.get(name))
        .await
        .map_err(|source| Error::Probe {
            provider: name.to_string(),
            network_id: config.network_id,
            source,
        })?;

    match support {
        NetworkSupport::Supported(provider) => Ok(Some(provider)),
        NetworkSupport::Unsupported => {
            tracing::debug!(
                provider = name,
                network_id = config.network_id,
                "provider does not support the network, skipping"
            );
            Ok(None)
        }
    }
}

use crate::{
    compiler::{CompilationResult, CompileInvoker, CompiledContract, Compiler},
    errors::Stage,
    matcher::ContractMatcher,
    provider::ProviderRegistry,
    retriever::SourceRetriever,
    selector::{ProviderSelector, SelectionConfig},
    settings::{NetworkContext, Settings},
    store::{
        MigratedArtifact, MigratedNetwork, Migration, NameAssignments, NetworkAddress,
        ProjectStore, StoredContract, StoredNetwork,
    },
    Error,
};
use std::{collections::BTreeMap, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// The compiled contract found to be deployed at the requested address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedContract {
    pub contract: CompiledContract,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkAssignment {
    pub network_name: String,
    pub network_id: u64,
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: ResolvedContract,
    pub record: StoredContract,
    pub network: StoredNetwork,
    pub assignment: NetworkAssignment,
}

/// Resolves verified sources of a deployed contract and records the result
/// in the project store.
///
/// Stages run strictly one after another:
/// select providers, retrieve sources, compile, match, persist, assign network.
/// The first failing stage aborts the resolution; nothing is retried.
pub struct Resolver {
    selector: ProviderSelector,
    retriever: SourceRetriever,
    compiler: CompileInvoker,
    matcher: ContractMatcher,
    store: Arc<dyn ProjectStore>,
    selection: SelectionConfig,
    network: NetworkContext,
}

impl Resolver {
    /// Fails if the configured provider order names an unregistered provider.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        compiler: Arc<dyn Compiler>,
        store: Arc<dyn ProjectStore>,
        settings: &Settings,
    ) -> Result<Self, Error> {
        if let Some(order) = &settings.source_fetchers {
            registry.validate_names(order)?;
        }

        let compiler = CompileInvoker::new(compiler)
            .with_language(settings.compiler.language.clone())
            .with_docker(settings.compiler.docker.clone());
        Ok(Self {
            selector: ProviderSelector::new(registry),
            retriever: SourceRetriever::new(compiler.language()),
            compiler,
            matcher: ContractMatcher,
            store,
            selection: settings.selection(),
            network: settings.network.clone(),
        })
    }

    pub async fn resolve(
        &self,
        address: &str,
        network: &NetworkContext,
    ) -> Result<Resolution, Error> {
        self.resolve_with_cancellation(address, network, &CancellationToken::new())
            .await
    }

    /// Resolves the contract on the network the resolver was configured with.
    pub async fn resolve_on_configured_network(&self, address: &str) -> Result<Resolution, Error> {
        self.resolve(address, &self.network).await
    }

    #[instrument(skip_all, fields(address = address, network = %network.name), level = "info")]
    pub async fn resolve_with_cancellation(
        &self,
        address: &str,
        network: &NetworkContext,
        cancellation: &CancellationToken,
    ) -> Result<Resolution, Error> {
        let selection = SelectionConfig {
            network_id: network.id,
            ..self.selection.clone()
        };
        let providers = self.selector.select(&selection).await?;

        let retrieved = self
            .retriever
            .retrieve(&providers, address, cancellation)
            .await?;
        // Provider instances live for a single resolution only.
        drop(providers);

        let result = self.compiler.compile(address, &retrieved).await?;

        let matched = self.matcher.find_contract(
            &result.contracts,
            retrieved.contract_name.as_deref(),
            address,
        )?;
        let resolved = ResolvedContract {
            contract: matched.clone(),
            address: address.to_string(),
        };

        let record = self.persist(&result, &resolved).await?;
        let assignment = NetworkAssignment {
            network_name: network.name.clone(),
            network_id: network.id,
            address: address.to_string(),
        };
        let network = self.assign_network(&record, &assignment).await?;

        tracing::info!(
            contract_name = %resolved.contract.contract_name,
            provider = %retrieved.provider,
            "contract resolved"
        );
        Ok(Resolution {
            resolved,
            record,
            network,
            assignment,
        })
    }

    async fn persist(
        &self,
        result: &CompilationResult,
        resolved: &ResolvedContract,
    ) -> Result<StoredContract, Error> {
        let store_error = |source| Error::Store {
            address: resolved.address.clone(),
            stage: Stage::Persisting,
            source,
        };

        let records = self.store.load_compile(result).await.map_err(store_error)?;
        let record = records
            .into_iter()
            .find(|record| {
                record.contract.contract_name == resolved.contract.contract_name
                    && record.contract.source_path == resolved.contract.source_path
            })
            .ok_or_else(|| Error::NotLoaded {
                address: resolved.address.clone(),
                contract_name: resolved.contract.contract_name.clone(),
            })?;

        self.store
            .assign_names(&NameAssignments::Contracts(vec![record.clone()]))
            .await
            .map_err(store_error)?;

        Ok(record)
    }

    async fn assign_network(
        &self,
        record: &StoredContract,
        assignment: &NetworkAssignment,
    ) -> Result<StoredNetwork, Error> {
        let store_error = |source| Error::Store {
            address: assignment.address.clone(),
            stage: Stage::AssigningNetwork,
            source,
        };

        let migration = Migration {
            network: MigratedNetwork {
                name: assignment.network_name.clone(),
            },
            artifacts: vec![MigratedArtifact {
                contract: record.contract.clone(),
                networks: BTreeMap::from([(
                    assignment.network_id.to_string(),
                    NetworkAddress {
                        address: assignment.address.clone(),
                    },
                )]),
            }],
        };
        let network = self
            .store
            .load_migrate(&migration)
            .await
            .map_err(store_error)?;

        self.store
            .assign_names(&NameAssignments::Networks(vec![network.clone()]))
            .await
            .map_err(store_error)?;

        Ok(network)
    }
}

use crate::compiler::{CompilationResult, CompiledContract};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contract record persisted by the project store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContract {
    /// Store identifier of the record.
    pub id: String,
    pub contract: CompiledContract,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNetwork {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAddress {
    pub address: String,
}

/// Contract artifact together with the addresses it is deployed at, keyed by network id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigratedArtifact {
    #[serde(flatten)]
    pub contract: CompiledContract,
    pub networks: BTreeMap<String, NetworkAddress>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigratedNetwork {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Migration {
    pub network: MigratedNetwork,
    pub artifacts: Vec<MigratedArtifact>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameAssignments {
    Contracts(Vec<StoredContract>),
    Networks(Vec<StoredNetwork>),
}

/// Persistent contract and project store the resolution results are handed to.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Ingests compiler output and returns the persisted contract records.
    async fn load_compile(&self, result: &CompilationResult)
        -> anyhow::Result<Vec<StoredContract>>;

    async fn assign_names(&self, assignments: &NameAssignments) -> anyhow::Result<()>;

    /// Records where the artifacts are deployed and returns the network record.
    async fn load_migrate(&self, migration: &Migration) -> anyhow::Result<StoredNetwork>;
}

use mockall::mock;
use pretty_assertions::assert_eq;
use source_resolver::{
    CompilationResult, CompileOptions, CompiledContract, Error, FetchOutcome, FetchedSources,
    Migration, NameAssignments, NetworkContext, NetworkSupport, ProjectStore, ProviderDescriptor,
    ProviderRegistry, Resolver, Settings, SourceProvider, StoredContract, StoredNetwork,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

const ADDRESS: &str = "0xDEAD";
const TOKEN_SOURCE: &str = r#"
    pragma solidity ^0.8.7;
    // SPDX-License-Identifier: MIT

    contract Token {
        mapping(address => uint256) public balanceOf;
    }"#;

mock! {
    Compiler {}

    #[async_trait::async_trait]
    impl source_resolver::Compiler for Compiler {
        async fn compile_sources(
            &self,
            sources: &BTreeMap<String, String>,
            options: &CompileOptions,
        ) -> anyhow::Result<CompilationResult>;
    }
}

/// Provider answering every fetch the same way and counting fetches.
struct Provider {
    name: &'static str,
    outcome: FetchOutcome,
    fetches: Arc<Mutex<Vec<String>>>,
}

#[async_trait::async_trait]
impl SourceProvider for Provider {
    fn name(&self) -> String {
        self.name.to_string()
    }

    async fn fetch_sources_for_address(&self, address: &str) -> anyhow::Result<FetchOutcome> {
        self.fetches.lock().unwrap().push(address.to_string());
        Ok(self.outcome.clone())
    }
}

struct Descriptor {
    name: &'static str,
    network_id: u64,
    outcome: FetchOutcome,
    fetches: Arc<Mutex<Vec<String>>>,
}

impl Descriptor {
    fn new(name: &'static str, network_id: u64, outcome: FetchOutcome) -> Arc<Self> {
        Arc::new(Self {
            name,
            network_id,
            outcome,
            fetches: Default::default(),
        })
    }

    fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProviderDescriptor for Descriptor {
    fn name(&self) -> &str {
        self.name
    }

    async fn for_network(
        &self,
        network_id: u64,
        _options: Option<&serde_json::Value>,
    ) -> anyhow::Result<NetworkSupport> {
        if network_id != self.network_id {
            return Ok(NetworkSupport::Unsupported);
        }
        Ok(NetworkSupport::Supported(Box::new(Provider {
            name: self.name,
            outcome: self.outcome.clone(),
            fetches: self.fetches.clone(),
        })))
    }
}

/// In-memory store recording every call it receives.
#[derive(Default)]
struct RecordingStore {
    loaded: Mutex<Vec<CompilationResult>>,
    assignments: Mutex<Vec<NameAssignments>>,
    migrations: Mutex<Vec<Migration>>,
}

#[async_trait::async_trait]
impl ProjectStore for RecordingStore {
    async fn load_compile(
        &self,
        result: &CompilationResult,
    ) -> anyhow::Result<Vec<StoredContract>> {
        self.loaded.lock().unwrap().push(result.clone());
        Ok(result
            .contracts
            .iter()
            .enumerate()
            .map(|(index, contract)| StoredContract {
                id: format!("contract-{index}"),
                contract: contract.clone(),
            })
            .collect())
    }

    async fn assign_names(&self, assignments: &NameAssignments) -> anyhow::Result<()> {
        self.assignments.lock().unwrap().push(assignments.clone());
        Ok(())
    }

    async fn load_migrate(&self, migration: &Migration) -> anyhow::Result<StoredNetwork> {
        self.migrations.lock().unwrap().push(migration.clone());
        Ok(StoredNetwork {
            id: "network-0".into(),
            name: migration.network.name.clone(),
        })
    }
}

fn token_sources() -> FetchedSources {
    FetchedSources {
        contract_name: Some("Token".into()),
        sources: BTreeMap::from([("Token.sol".to_string(), TOKEN_SOURCE.to_string())]),
        language: "Solidity".into(),
        compiler_options: serde_json::json!({
            "version": "0.8.7+commit.e28d00a7",
            "settings": { "optimizer": { "enabled": false, "runs": 200 } }
        }),
    }
}

fn token_contract() -> CompiledContract {
    CompiledContract {
        contract_name: "Token".into(),
        source_path: "Token.sol".into(),
        source: TOKEN_SOURCE.into(),
        artifacts: serde_json::json!({ "abi": [], "bytecode": "0x6080604052" }),
    }
}

fn registry(descriptors: &[Arc<Descriptor>]) -> Arc<ProviderRegistry> {
    let descriptors = descriptors
        .iter()
        .map(|descriptor| descriptor.clone() as Arc<dyn ProviderDescriptor>)
        .collect();
    Arc::new(ProviderRegistry::new(descriptors).expect("valid registry"))
}

fn settings(network: &NetworkContext) -> Settings {
    Settings {
        network: network.clone(),
        source_fetchers: Some(vec!["etherscan".into(), "sourcify".into()]),
        ..Default::default()
    }
}

#[tokio::test]
async fn resolves_contract_from_fallback_provider() {
    let network = NetworkContext {
        name: "mainnet".into(),
        id: 1,
    };
    let etherscan = Descriptor::new("etherscan", 1, FetchOutcome::NotFound);
    let sourcify = Descriptor::new("sourcify", 1, FetchOutcome::Found(token_sources()));

    let mut compiler = MockCompiler::new();
    compiler
        .expect_compile_sources()
        .withf(|sources, options| sources == &token_sources().sources && options.quiet)
        .times(1)
        .returning(|_, _| {
            Ok(CompilationResult {
                contracts: vec![token_contract()],
            })
        });
    let store = Arc::new(RecordingStore::default());

    let resolver = Resolver::new(
        registry(&[sourcify.clone(), etherscan.clone()]),
        Arc::new(compiler),
        store.clone(),
        &settings(&network),
    )
    .expect("valid configuration");
    let resolution = resolver
        .resolve(ADDRESS, &network)
        .await
        .expect("resolution succeeds");

    assert_eq!(resolution.resolved.contract, token_contract());
    assert_eq!(resolution.resolved.address, ADDRESS);
    assert_eq!(etherscan.fetches(), vec![ADDRESS]);
    assert_eq!(sourcify.fetches(), vec![ADDRESS]);

    assert_eq!(store.loaded.lock().unwrap().len(), 1);
    let stored_token = StoredContract {
        id: "contract-0".into(),
        contract: token_contract(),
    };
    let stored_network = StoredNetwork {
        id: "network-0".into(),
        name: "mainnet".into(),
    };
    assert_eq!(
        *store.assignments.lock().unwrap(),
        vec![
            NameAssignments::Contracts(vec![stored_token]),
            NameAssignments::Networks(vec![stored_network]),
        ]
    );

    let migrations = store.migrations.lock().unwrap();
    assert_eq!(migrations.len(), 1);
    assert_eq!(migrations[0].network.name, "mainnet");
    assert_eq!(migrations[0].artifacts.len(), 1);
    assert_eq!(migrations[0].artifacts[0].contract, token_contract());
    assert_eq!(migrations[0].artifacts[0].networks["1"].address, ADDRESS);
}

#[tokio::test]
async fn unsupported_network_leaves_nothing_to_query() {
    let network = NetworkContext {
        name: "sepolia".into(),
        id: 11155111,
    };
    let etherscan = Descriptor::new("etherscan", 1, FetchOutcome::NotFound);
    let sourcify = Descriptor::new("sourcify", 1, FetchOutcome::Found(token_sources()));
    let store = Arc::new(RecordingStore::default());

    let resolver = Resolver::new(
        registry(&[etherscan.clone(), sourcify.clone()]),
        Arc::new(MockCompiler::new()),
        store.clone(),
        &settings(&network),
    )
    .expect("valid configuration");
    let err = resolver
        .resolve(ADDRESS, &network)
        .await
        .expect_err("no provider supports the network");

    assert!(matches!(err, Error::Exhausted { .. }));
    assert!(etherscan.fetches().is_empty());
    assert!(sourcify.fetches().is_empty());
    assert!(store.assignments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn vyper_sources_are_not_compiled() {
    let network = NetworkContext {
        name: "mainnet".into(),
        id: 1,
    };
    let vyper = FetchedSources {
        language: "Vyper".into(),
        sources: BTreeMap::from([("Token.vy".to_string(), "# @version 0.3.7".to_string())]),
        ..token_sources()
    };
    let etherscan = Descriptor::new("etherscan", 1, FetchOutcome::Found(vyper));
    let sourcify = Descriptor::new("sourcify", 1, FetchOutcome::Found(token_sources()));

    let resolver = Resolver::new(
        registry(&[etherscan.clone(), sourcify.clone()]),
        Arc::new(MockCompiler::new()),
        Arc::new(RecordingStore::default()),
        &settings(&network),
    )
    .expect("valid configuration");
    let err = resolver
        .resolve(ADDRESS, &network)
        .await
        .expect_err("language mismatch");

    assert_eq!(
        err.to_string(),
        "etherscan has sources for 0xDEAD in Vyper; only Solidity sources can be compiled"
    );
    assert!(sourcify.fetches().is_empty());
}

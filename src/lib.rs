mod compiler;
mod errors;
mod matcher;
mod provider;
mod resolver;
mod retriever;
mod selector;
mod settings;
mod store;


pub use compiler::{
    CompilationResult, CompileInvoker, CompileOptions, CompiledContract, Compiler,
    DEFAULT_LANGUAGE,
};
pub use errors::{Error, Stage};
pub use matcher::ContractMatcher;
pub use provider::{
    FetchOutcome, FetchedSources, NetworkSupport, ProviderDescriptor, ProviderRegistry,
    RegistryError, SourceProvider,
};
pub use resolver::{NetworkAssignment, Resolution, ResolvedContract, Resolver};
pub use retriever::{RetrievedSources, SourceRetriever};
pub use selector::{ProviderSelector, SelectionConfig};
pub use settings::{CompilerSettings, NetworkContext, Settings, SERVICE_NAME};
pub use store::{
    MigratedArtifact, MigratedNetwork, Migration, NameAssignments, NetworkAddress, ProjectStore,
    StoredContract, StoredNetwork,
};
pub use tokio_util::sync::CancellationToken;

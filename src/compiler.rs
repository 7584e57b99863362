use crate::{retriever::RetrievedSources, Error};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};
use tracing::instrument;

pub const DEFAULT_LANGUAGE: &str = "Solidity";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledContract {
    pub contract_name: String,
    pub source_path: String,
    pub source: String,
    /// Bytecode, abi and the rest of the compiler output for the contract.
    #[serde(default)]
    pub artifacts: serde_json::Value,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationResult {
    pub contracts: Vec<CompiledContract>,
}

/// Options an external compilation is run with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Compiler settings reported by the provider, merged with local overrides.
    pub settings: serde_json::Value,
    pub quiet: bool,
}

/// Compiler backend turning source files into contract artifacts.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile_sources(
        &self,
        sources: &BTreeMap<String, String>,
        options: &CompileOptions,
    ) -> anyhow::Result<CompilationResult>;
}

#[derive(Clone)]
pub struct CompileInvoker {
    compiler: Arc<dyn Compiler>,
    language: String,
    docker: Option<serde_json::Value>,
}

impl CompileInvoker {
    pub fn new(compiler: Arc<dyn Compiler>) -> Self {
        Self {
            compiler,
            language: DEFAULT_LANGUAGE.to_string(),
            docker: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Docker setting of the local compiler configuration; it replaces the one
    /// reported by the provider.
    pub fn with_docker(mut self, docker: Option<serde_json::Value>) -> Self {
        self.docker = docker;
        self
    }

    /// The only source language the wrapped compiler accepts.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Provider options with local overrides applied.
    ///
    /// A local docker setting can only be merged into an options object; any
    /// other options value is rejected rather than compiled without it.
    pub fn options(&self, compiler_options: &serde_json::Value) -> anyhow::Result<CompileOptions> {
        let mut settings = match compiler_options {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            options => options.clone(),
        };
        if let Some(docker) = &self.docker {
            match &mut settings {
                serde_json::Value::Object(settings) => {
                    settings.insert("docker".to_string(), docker.clone());
                }
                other => {
                    return Err(anyhow::anyhow!(
                        "cannot apply local docker setting to compiler options {other}"
                    ));
                }
            }
        }

        Ok(CompileOptions {
            settings,
            quiet: true,
        })
    }

    /// Compilation is deterministic, so failures are returned as is and never retried.
    #[instrument(
        name = "compile_external_sources",
        skip_all,
        fields(provider = %retrieved.provider),
        level = "debug"
    )]
    pub async fn compile(
        &self,
        address: &str,
        retrieved: &RetrievedSources,
    ) -> Result<CompilationResult, Error> {
        let compilation_error = |source| Error::Compilation {
            address: address.to_string(),
            provider: retrieved.provider.clone(),
            source,
        };

        let options = self
            .options(&retrieved.compiler_options)
            .map_err(compilation_error)?;
        self.compiler
            .compile_sources(&retrieved.sources, &options)
            .await
            .map_err(compilation_error)
    }
}

impl std::fmt::Debug for CompileInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileInvoker")
            .field("language", &self.language)
            .field("docker", &self.docker)
            .finish_non_exhaustive()
    }
}

use std::fmt;
use thiserror::Error;

/// Step of the resolution pipeline an error originated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Selecting,
    Retrieving,
    Compiling,
    Matching,
    Persisting,
    AssigningNetwork,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Stage::Selecting => "selecting providers",
            Stage::Retrieving => "retrieving sources",
            Stage::Compiling => "compiling sources",
            Stage::Matching => "matching contract",
            Stage::Persisting => "persisting contract",
            Stage::AssigningNetwork => "assigning network",
        };
        f.write_str(stage)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown external source service {0}")]
    UnknownProvider(String),
    #[error("Probing {provider} for network {network_id} failed: {source:#}")]
    Probe {
        provider: String,
        network_id: u64,
        #[source]
        source: anyhow::Error,
    },
    #[error(
        "{provider} has sources for {address} in {language}; only {expected} sources can be compiled"
    )]
    UnsupportedLanguage {
        address: String,
        provider: String,
        language: String,
        expected: String,
    },
    #[error("Unable to find verified sources for {address}")]
    Exhausted { address: String },
    #[error("Resolution of {address} was cancelled")]
    Cancelled { address: String },
    #[error("Compilation of sources for {address} fetched from {provider} failed: {source:#}")]
    Compilation {
        address: String,
        provider: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("{}", no_match_message(.address, .contract_name, .matches))]
    NoMatch {
        address: String,
        contract_name: Option<String>,
        matches: usize,
    },
    #[error("Contract {contract_name} not loaded into the project store")]
    NotLoaded {
        address: String,
        contract_name: String,
    },
    #[error("Project store failed while {stage} for {address}: {source:#}")]
    Store {
        address: String,
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },
}

fn no_match_message(address: &str, contract_name: &Option<String>, matches: &usize) -> String {
    match contract_name {
        None => format!("Sources for {address} do not name the deployed contract"),
        Some(name) if *matches == 0 => {
            format!("No compiled contract named {name} found for {address}")
        }
        Some(name) => {
            format!("{matches} compiled contracts named {name} found for {address}; refusing to guess")
        }
    }
}

impl Error {
    pub fn stage(&self) -> Stage {
        match self {
            Error::UnknownProvider(_) | Error::Probe { .. } => Stage::Selecting,
            Error::UnsupportedLanguage { .. }
            | Error::Exhausted { .. }
            | Error::Cancelled { .. } => Stage::Retrieving,
            Error::Compilation { .. } => Stage::Compiling,
            Error::NoMatch { .. } => Stage::Matching,
            Error::NotLoaded { .. } => Stage::Persisting,
            Error::Store { stage, .. } => *stage,
        }
    }

    /// Address the failed resolution was started for, if the error is tied to one.
    pub fn address(&self) -> Option<&str> {
        match self {
            Error::UnknownProvider(_) | Error::Probe { .. } => None,
            Error::UnsupportedLanguage { address, .. }
            | Error::Exhausted { address }
            | Error::Cancelled { address }
            | Error::Compilation { address, .. }
            | Error::NoMatch { address, .. }
            | Error::NotLoaded { address, .. }
            | Error::Store { address, .. } => Some(address),
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::UnknownProvider(_))
    }
}

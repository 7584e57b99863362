use super::ProviderDescriptor;
use crate::Error;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error as DeriveError;

#[derive(Debug, DeriveError, PartialEq, Eq)]
pub enum RegistryError {
    #[error("source provider {0} is registered more than once")]
    DuplicateName(String),
}

/// Process-wide catalog of known source providers.
///
/// Registration order is the default priority order. The registry is
/// immutable once built, so it may be shared between concurrent resolutions.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    descriptors: Vec<Arc<dyn ProviderDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl ProviderRegistry {
    pub fn new(descriptors: Vec<Arc<dyn ProviderDescriptor>>) -> Result<Self, RegistryError> {
        let mut by_name = HashMap::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            let name = descriptor.name().to_string();
            if by_name.insert(name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateName(name));
            }
        }
        Ok(Self {
            descriptors,
            by_name,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ProviderDescriptor>> {
        self.by_name.get(name).map(|index| &self.descriptors[*index])
    }

    /// Looks up descriptors in the requested order, or takes the whole
    /// registry in registration order when no order is given.
    pub fn resolve_order(
        &self,
        order: Option<&[String]>,
    ) -> Result<Vec<Arc<dyn ProviderDescriptor>>, Error> {
        match order {
            Some(names) => names
                .iter()
                .map(|name| {
                    self.get(name)
                        .cloned()
                        .ok_or_else(|| Error::UnknownProvider(name.clone()))
                })
                .collect(),
            None => Ok(self.descriptors.clone()),
        }
    }

    pub fn validate_names(&self, names: &[String]) -> Result<(), Error> {
        match names.iter().find(|name| !self.by_name.contains_key(name.as_str())) {
            Some(unknown) => Err(Error::UnknownProvider(unknown.clone())),
            None => Ok(()),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|descriptor| descriptor.name())
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

use crate::{compiler::CompiledContract, Error};

/// Picks the compiled contract deployed at the address.
///
/// Only an exact, unique name match is accepted. When the name is missing or
/// matches zero or several contracts no guess is made, as a wrong match would
/// end up persisted.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContractMatcher;

impl ContractMatcher {
    pub fn find_contract<'a>(
        &self,
        contracts: &'a [CompiledContract],
        contract_name: Option<&str>,
        address: &str,
    ) -> Result<&'a CompiledContract, Error> {
        let no_match = |matches| Error::NoMatch {
            address: address.to_string(),
            contract_name: contract_name.map(str::to_string),
            matches,
        };

        let name = contract_name.ok_or_else(|| no_match(0))?;
        let mut matching = contracts
            .iter()
            .filter(|contract| contract.contract_name == name);

        match (matching.next(), matching.next()) {
            (Some(contract), None) => Ok(contract),
            (None, _) => Err(no_match(0)),
            (Some(_), Some(_)) => Err(no_match(2 + matching.count())),
        }
    }
}

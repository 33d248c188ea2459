//! Network and parameter resolution.
//!
//! Turns a network identifier into a validated [`NetworkProfile`] and caller input (project
//! labels/addresses and decimal amounts) into a [`RetirementRequest`] in smallest units. Static
//! checks run before any chain access, so malformed input never costs an RPC call.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, U256};
use carbon_retirement_types::{NetworkProfile, RetirementRequest};
use tracing::debug;

use crate::{
    config::{NetworkEntry, NetworksConfig},
    contracts::calls,
    errors::{ConfigurationError, OrchestrationError},
    executor::ChainReader,
    utils::{
        address::parse_address,
        units::{is_zero_decimal, parse_units},
    },
};

/// Amount as supplied by a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Amount {
    /// Decimal in whole tokens (eg, `"0.0001"`), scaled with the pool token's `decimals()`.
    Human(String),
    /// Already in the token's smallest unit.
    Raw(U256),
}

impl Amount {
    pub fn parse(value: &str, raw: bool) -> Result<Self, ConfigurationError> {
        if !raw {
            return Ok(Amount::Human(value.trim().to_string()));
        }
        U256::from_str_radix(value.trim(), 10)
            .map(Amount::Raw)
            .map_err(|e| ConfigurationError::InvalidAmount {
                value: value.to_string(),
                reason: e.to_string(),
            })
    }
}

/// Validated network profiles keyed by name.
#[derive(Clone, Debug, Default)]
pub struct NetworkRegistry {
    profiles: BTreeMap<String, NetworkProfile>,
}

impl NetworkRegistry {
    /// Validate every configured network. Rejects the whole configuration on the first error.
    pub fn from_config(config: &NetworksConfig) -> Result<Self, ConfigurationError> {
        let mut profiles = BTreeMap::new();
        let mut chain_names: HashMap<u64, String> = HashMap::new();
        let mut address_chains: HashMap<Address, u64> = HashMap::new();

        for (name, entry) in &config.networks {
            let profile = validate_entry(name, entry)?;

            if let Some(first) = chain_names.insert(profile.chain_id, name.clone()) {
                return Err(ConfigurationError::DuplicateChainId {
                    chain_id: profile.chain_id,
                    first,
                    second: name.clone(),
                });
            }
            for (_, address) in profile.contracts() {
                let chain = *address_chains.entry(address).or_insert(profile.chain_id);
                if chain != profile.chain_id {
                    return Err(ConfigurationError::CrossChainAddress {
                        address,
                        expected: chain,
                        found: profile.chain_id,
                    });
                }
            }
            profiles.insert(name.clone(), profile);
        }

        Ok(Self { profiles })
    }

    pub fn builtin() -> Result<Self, ConfigurationError> {
        Self::from_config(&NetworksConfig::builtin())
    }

    /// Look a profile up by name, or by decimal chain id.
    pub fn profile(&self, network_id: &str) -> Result<&NetworkProfile, ConfigurationError> {
        let id = network_id.trim();
        if let Some(profile) = self.profiles.get(id) {
            return Ok(profile);
        }
        id.parse::<u64>()
            .ok()
            .and_then(|chain_id| self.profiles.values().find(|p| p.chain_id == chain_id))
            .ok_or_else(|| ConfigurationError::UnknownNetwork(network_id.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Resolve `network_id` and shape the caller's project/amount lists into a request.
    pub async fn resolve<R: ChainReader + ?Sized>(
        &self,
        reader: &R,
        network_id: &str,
        projects: &[String],
        amounts: &[Amount],
    ) -> Result<(NetworkProfile, RetirementRequest), ConfigurationError> {
        let profile = self.profile(network_id)?;
        let request = resolve_request(reader, profile, projects, amounts).await?;
        Ok((profile.clone(), request))
    }
}

fn validate_entry(name: &str, entry: &NetworkEntry) -> Result<NetworkProfile, ConfigurationError> {
    let field = |field: &str, value: &str| -> Result<Address, ConfigurationError> {
        let address = parse_address(value).ok_or_else(|| ConfigurationError::InvalidAddress {
            network: name.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        })?;
        if address == Address::ZERO {
            return Err(ConfigurationError::ZeroAddress {
                network: name.to_string(),
                field: field.to_string(),
            });
        }
        Ok(address)
    };

    let pool = field("pool", &entry.pool)?;
    let helper = field("helper", &entry.helper)?;
    let allowance_token = match &entry.allowance_token {
        Some(value) => field("allowance_token", value)?,
        None => pool,
    };
    if allowance_token != pool {
        return Err(ConfigurationError::AllowanceTokenMismatch {
            network: name.to_string(),
            pool,
            allowance_token,
        });
    }
    let swapper = entry
        .swapper
        .as_deref()
        .map(|value| field("swapper", value))
        .transpose()?;
    let projects = entry
        .projects
        .iter()
        .map(|(label, value)| {
            let address = field(&format!("project `{label}`"), value)?;
            Ok::<_, ConfigurationError>((label.clone(), address))
        })
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(NetworkProfile {
        name: name.to_string(),
        chain_id: entry.chain_id,
        pool,
        helper,
        allowance_token,
        swapper,
        projects,
        rpc_url: entry.rpc_url.clone(),
    })
}

/// Shape positionally correlated project and amount lists into a request for `profile`.
///
/// Human amounts are scaled with the pool token's declared precision, read once and only when
/// at least one human amount is present.
pub async fn resolve_request<R: ChainReader + ?Sized>(
    reader: &R,
    profile: &NetworkProfile,
    projects: &[String],
    amounts: &[Amount],
) -> Result<RetirementRequest, ConfigurationError> {
    if projects.len() != amounts.len() {
        return Err(ConfigurationError::LengthMismatch {
            tokens: projects.len(),
            amounts: amounts.len(),
        });
    }
    if projects.is_empty() {
        return Err(ConfigurationError::EmptyRequest);
    }

    let tokens = projects
        .iter()
        .map(|project| resolve_project(profile, project))
        .collect::<Result<Vec<_>, _>>()?;

    // Syntax and zero checks need no chain access; only the precision check needs decimals.
    for (index, amount) in amounts.iter().enumerate() {
        let zero = match amount {
            Amount::Raw(value) => value.is_zero(),
            Amount::Human(value) => is_zero_decimal(value)?,
        };
        if zero {
            return Err(ConfigurationError::NonPositiveAmount { index });
        }
    }

    let mut decimals = None;
    let mut scaled = Vec::with_capacity(amounts.len());
    for amount in amounts {
        let value = match amount {
            Amount::Raw(value) => *value,
            Amount::Human(value) => {
                let precision = match decimals {
                    Some(precision) => precision,
                    None => {
                        let precision = token_decimals(reader, profile.allowance_token).await?;
                        decimals = Some(precision);
                        precision
                    }
                };
                parse_units(value, precision)?
            }
        };
        scaled.push(value);
    }

    debug!(target: "retirement", network = %profile.name, projects = tokens.len(), ?decimals, "request_resolved");
    RetirementRequest::new(profile.pool, tokens, scaled)
}

/// A `0x` address, or a project label known to the profile.
pub fn resolve_project(profile: &NetworkProfile, project: &str) -> Result<Address, ConfigurationError> {
    let project = project.trim();
    let looks_like_address = project
        .get(..2)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("0x"));
    if looks_like_address {
        let address = parse_address(project).ok_or_else(|| ConfigurationError::InvalidAddress {
            network: profile.name.clone(),
            field: "project".to_string(),
            value: project.to_string(),
        })?;
        if address == Address::ZERO {
            return Err(ConfigurationError::ZeroAddress {
                network: profile.name.clone(),
                field: "project".to_string(),
            });
        }
        return Ok(address);
    }
    profile
        .projects
        .get(project)
        .copied()
        .ok_or_else(|| ConfigurationError::UnknownProject(project.to_string()))
}

pub async fn token_decimals<R: ChainReader + ?Sized>(
    reader: &R,
    token: Address,
) -> Result<u8, ConfigurationError> {
    let out = reader
        .read(token, calls::decimals())
        .await
        .map_err(|e| ConfigurationError::Decimals(e.to_string()))?;
    calls::decode_decimals(&out).map_err(|e| ConfigurationError::Decimals(e.to_string()))
}

/// Reject a reader connected to a different chain than `profile` describes.
pub async fn verify_chain<R: ChainReader + ?Sized>(
    reader: &R,
    profile: &NetworkProfile,
) -> Result<(), OrchestrationError> {
    let actual = reader
        .chain_id()
        .await
        .map_err(OrchestrationError::Provider)?;
    if actual != profile.chain_id {
        return Err(ConfigurationError::ChainMismatch {
            network: profile.name.clone(),
            expected: profile.chain_id,
            actual,
        }
        .into());
    }
    Ok(())
}

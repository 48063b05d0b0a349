// Network Registry
// ================
//
// Holds one ParameterSet per network and the single write-once "active network" cell.
// Selection happens once, before any worker starts reading; after that every access is a
// plain shared reference and needs no locking.

use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use tracing::{info, warn};

use crate::{
    error::{ChainParamsError, ConfigurationError, UninitializedError},
    params::{NetworkId, ParameterSet},
};

/// The network intents resolved from `-testnet` / `-regtest`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkSelection {
    pub testnet: bool,
    pub regtest: bool,
}

impl NetworkSelection {
    /// Main unless exactly one of the flags is set; both set is an error.
    pub fn resolve(&self) -> Result<NetworkId, ConfigurationError> {
        match (self.testnet, self.regtest) {
            (true, true) => Err(ConfigurationError::ConflictingNetworkFlags),
            (true, false) => Ok(NetworkId::Testnet),
            (false, true) => Ok(NetworkId::Regtest),
            (false, false) => Ok(NetworkId::Main),
        }
    }

    /// Like [`NetworkSelection::resolve`], with `env` as the default when no flag is set.
    pub fn resolve_with_env(&self, env: Option<NetworkId>) -> Result<NetworkId, ConfigurationError> {
        let from_flags = self.resolve()?;
        let any_flag = self.testnet || self.regtest;
        match env {
            Some(env) if any_flag && env != from_flags => {
                Err(ConfigurationError::FlagEnvMismatch {
                    flags: from_flags,
                    env,
                })
            }
            Some(env) if !any_flag => Ok(env),
            _ => Ok(from_flags),
        }
    }
}

pub struct NetworkRegistry {
    main: ParameterSet,
    testnet: ParameterSet,
    regtest: ParameterSet,
    active: OnceCell<NetworkId>,
}

impl NetworkRegistry {
    /// Constructs all three parameter sets; nothing is active yet.
    pub fn new() -> Result<Self, ConfigurationError> {
        let registry = NetworkRegistry {
            main: ParameterSet::for_network(NetworkId::Main)?,
            testnet: ParameterSet::for_network(NetworkId::Testnet)?,
            regtest: ParameterSet::for_network(NetworkId::Regtest)?,
            active: OnceCell::new(),
        };

        for (i, a) in NetworkId::ALL.iter().enumerate() {
            for b in NetworkId::ALL.iter().skip(i + 1) {
                if registry.params(*a).message_start() == registry.params(*b).message_start() {
                    return Err(ConfigurationError::DuplicateMessageStart {
                        network: *b,
                        other: *a,
                    });
                }
            }
        }

        Ok(registry)
    }

    /// The parameters of `network`, whether or not it is active
    pub fn params(&self, network: NetworkId) -> &ParameterSet {
        match network {
            NetworkId::Main => &self.main,
            NetworkId::Testnet => &self.testnet,
            NetworkId::Regtest => &self.regtest,
        }
    }

    pub fn mainnet_params(&self) -> &ParameterSet {
        &self.main
    }

    pub fn testnet_params(&self) -> &ParameterSet {
        &self.testnet
    }

    /// Marks `network` active. Only the first call succeeds; any later call, including a
    /// concurrent one, fails instead of racing.
    pub fn select(&self, network: NetworkId) -> Result<&ParameterSet, ConfigurationError> {
        if self.active.set(network).is_err() {
            let active = self.active.get().copied().unwrap_or(network);
            warn!(%active, requested = %network, "Rejected network reselection");
            return Err(ConfigurationError::AlreadySelected {
                active,
                requested: network,
            });
        }

        let params = self.params(network);
        info!(
            network = %network,
            port = params.default_port(),
            rpc_port = params.rpc_port(),
            "Selected chain parameters"
        );
        Ok(params)
    }

    pub fn select_from_flags(
        &self,
        selection: NetworkSelection,
    ) -> Result<&ParameterSet, ConfigurationError> {
        self.select(selection.resolve()?)
    }

    pub fn active_network(&self) -> Option<NetworkId> {
        self.active.get().copied()
    }

    pub fn try_active(&self) -> Result<&ParameterSet, UninitializedError> {
        self.active
            .get()
            .map(|network| self.params(*network))
            .ok_or(UninitializedError)
    }

    /// The active parameters.
    ///
    /// # Panics
    ///
    /// Panics if no network has been selected. Querying consensus parameters before selection
    /// is a programming error.
    pub fn active(&self) -> &ParameterSet {
        match self.try_active() {
            Ok(params) => params,
            Err(e) => panic!("{e}"),
        }
    }

    /// Clears the active network. Requires exclusive access, so a shared registry can never
    /// be reset while readers hold references into it.
    pub fn reset(&mut self) {
        self.active = OnceCell::new();
    }
}

lazy_static! {
    static ref REGISTRY: Result<NetworkRegistry, ConfigurationError> = NetworkRegistry::new();
}

/// The process-wide registry
pub fn registry() -> Result<&'static NetworkRegistry, ConfigurationError> {
    REGISTRY.as_ref().map_err(Clone::clone)
}

pub fn select_params(network: NetworkId) -> Result<&'static ParameterSet, ConfigurationError> {
    registry()?.select(network)
}

/// Resolves `-testnet` / `-regtest` and selects the result.
pub fn select_params_from_flags(
    selection: NetworkSelection,
) -> Result<&'static ParameterSet, ConfigurationError> {
    registry()?.select_from_flags(selection)
}

pub fn try_params() -> Result<&'static ParameterSet, ChainParamsError> {
    Ok(registry()?.try_active()?)
}

/// The active process-wide parameters.
///
/// # Panics
///
/// Panics if no network has been selected.
pub fn params() -> &'static ParameterSet {
    match try_params() {
        Ok(params) => params,
        Err(e) => panic!("{e}"),
    }
}

pub fn mainnet_params() -> Result<&'static ParameterSet, ConfigurationError> {
    Ok(registry()?.mainnet_params())
}

pub fn testnet_params() -> Result<&'static ParameterSet, ConfigurationError> {
    Ok(registry()?.testnet_params())
}

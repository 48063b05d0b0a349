// Exercises the process-wide registry. Each file under tests/ runs as its own process, so the
// write-once active cell is selected exactly once here.

use spectre_consensus_core::{
    mainnet_params, params, select_params_from_flags, testnet_params, try_params, AddressKind,
    ChainParamsError, ConfigurationError, ForkId, NetworkId, NetworkSelection, UninitializedError,
};

#[test]
fn test_select_testnet_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    assert_eq!(
        try_params().err(),
        Some(ChainParamsError::Uninitialized(UninitializedError))
    );

    let conflicting = NetworkSelection {
        testnet: true,
        regtest: true,
    };
    assert_eq!(
        select_params_from_flags(conflicting).err(),
        Some(ConfigurationError::ConflictingNetworkFlags)
    );

    let selection = NetworkSelection {
        testnet: true,
        regtest: false,
    };
    let selected = select_params_from_flags(selection)?;
    assert_eq!(selected.network_id(), NetworkId::Testnet);

    let active = params();
    let main = mainnet_params()?;
    assert_eq!(active.default_port(), 37111);
    assert_eq!(active.message_start().to_bytes(), [0x12, 0x36, 0x24, 0x4a]);
    assert_ne!(active.default_port(), main.default_port());
    assert_ne!(active.message_start(), main.message_start());
    assert!(std::ptr::eq(active, testnet_params()?));

    // Foreign-network address lookups still go through the fixed sets
    assert_eq!(main.base58_prefix(AddressKind::PubkeyAddress), &[63]);
    assert_eq!(active.base58_prefix(AddressKind::PubkeyAddress), &[127]);

    // Gates read the active set
    assert_eq!(active.fork_id(active.fork_v4_time()), ForkId::V4);

    let again = select_params_from_flags(NetworkSelection::default());
    assert_eq!(
        again.err(),
        Some(ConfigurationError::AlreadySelected {
            active: NetworkId::Testnet,
            requested: NetworkId::Main,
        })
    );
    assert_eq!(params().network_id(), NetworkId::Testnet);
    Ok(())
}

//! Solidity bindings of the contracts touched by a native-asset deposit.
#![allow(missing_docs)]

use alloy::sol;

sol! {
    #[sol(rpc)]
    contract L1StandardBridge {
        function depositETH(uint32 _minGasLimit, bytes calldata _extraData) external payable;
        function depositETHTo(address _to, uint32 _minGasLimit, bytes calldata _extraData) external payable;
    }
}

sol! {
    contract OptimismPortal {
        event TransactionDeposited(
            address indexed from,
            address indexed to,
            uint256 indexed version,
            bytes opaqueData
        );
    }
}

sol! {
    contract L2CrossDomainMessenger {
        event RelayedMessage(bytes32 indexed msgHash);
        event FailedRelayedMessage(bytes32 indexed msgHash);
    }
}

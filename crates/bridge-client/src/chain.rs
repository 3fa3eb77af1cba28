//! Access to a single ledger through its JSON-RPC interface.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, RpcError},
};
use rollup_deposit_primitives::types::LedgerEndpoint;
use tracing::{debug, info};

use crate::{
    constants::NATIVE_TRANSFER_GAS,
    errors::{ChainError, TransferError},
};

/// A signing client connected to one ledger.
///
/// Cloning is cheap; clones share the underlying connection.
#[derive(Clone)]
pub struct ChainClient {
    endpoint: LedgerEndpoint,
    provider: DynProvider,
    signer: Address,
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("endpoint", &self.endpoint)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl ChainClient {
    /// Connects to the ledger at `endpoint`, signing with `signer`.
    ///
    /// Fails if the node cannot be reached or serves a different chain than `endpoint` names.
    pub async fn connect(
        endpoint: LedgerEndpoint,
        signer: PrivateKeySigner,
    ) -> Result<Self, ChainError> {
        let url = endpoint
            .rpc_url()
            .parse::<Url>()
            .map_err(|e| ChainError::InvalidUrl {
                url: endpoint.rpc_url().to_string(),
                reason: e.to_string(),
            })?;

        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::new(signer))
            .on_http(url)
            .erased();

        let actual = provider.get_chain_id().await?;
        if actual != endpoint.chain_id() {
            return Err(ChainError::ChainIdMismatch {
                expected: endpoint.chain_id(),
                actual,
            });
        }
        info!(event = "connected to ledger", url = %endpoint.rpc_url(), chain_id = %actual, signer = %address);

        Ok(Self {
            endpoint,
            provider,
            signer: address,
        })
    }

    /// The endpoint this client is connected to.
    pub const fn endpoint(&self) -> &LedgerEndpoint {
        &self.endpoint
    }

    /// The account of the configured signer.
    pub const fn signer_address(&self) -> Address {
        self.signer
    }

    /// The underlying provider, for contract calls.
    pub(crate) const fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Reads the balance of `account`, in wei.
    pub async fn balance(&self, account: Address) -> Result<U256, ChainError> {
        Ok(self.provider.get_balance(account).await?)
    }

    /// Reads the receipt of `tx`, or [`None`] if it is not included yet.
    pub async fn receipt(&self, tx: TxHash) -> Result<Option<TransactionReceipt>, ChainError> {
        Ok(self.provider.get_transaction_receipt(tx).await?)
    }

    /// Reads the height of the latest block.
    pub async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.provider.get_block_number().await?)
    }

    /// Reads the current gas price, in wei.
    pub async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(self.provider.get_gas_price().await?)
    }

    /// Sends `amount` wei from the signer to `to` in a plain legacy transfer and returns the hash
    /// of the broadcast transaction.
    ///
    /// The signer must be able to afford `amount` plus the full fee at the current gas price.
    pub async fn transfer_native(&self, to: Address, amount: U256) -> Result<TxHash, TransferError> {
        let balance = self.balance(self.signer).await?;
        let gas_price = self.gas_price().await?;
        let total = U256::from(gas_price) * U256::from(NATIVE_TRANSFER_GAS) + amount;

        if balance < total {
            return Err(TransferError::InsufficientFunds {
                balance,
                gas_price,
                gas: NATIVE_TRANSFER_GAS,
                amount,
                total,
            });
        }

        let tx = TransactionRequest::default()
            .with_from(self.signer)
            .with_to(to)
            .with_value(amount)
            .with_gas_limit(NATIVE_TRANSFER_GAS)
            .with_gas_price(gas_price)
            .with_chain_id(self.endpoint.chain_id());

        debug!(action = "sending native transfer", %to, %amount, %gas_price);
        let pending = self.provider.send_transaction(tx).await.map_err(|e| match e {
            RpcError::ErrorResp(payload) => TransferError::Rejected(payload.to_string()),
            other => TransferError::Chain(other.into()),
        })?;

        let tx_hash = *pending.tx_hash();
        info!(event = "native transfer broadcast", %tx_hash, %to, %amount);

        Ok(tx_hash)
    }
}

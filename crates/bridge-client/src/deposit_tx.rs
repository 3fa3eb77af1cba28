//! Derivation of the destination-ledger deposit transaction from its source-ledger event.
//!
//! Every deposit accepted by the `OptimismPortal` emits a `TransactionDeposited` event. The
//! destination ledger turns that event into a deposit transaction (type `0x7E`) whose hash is
//! fully determined by the event and its position on the source ledger. Looking up the receipt of
//! that hash on the destination ledger tells whether the message has been derived and executed.

use alloy::{
    primitives::{keccak256, Address, Bytes, B256, U256},
    rlp::{Encodable, Header, EMPTY_STRING_CODE},
    rpc::types::{Log, TransactionReceipt},
    sol_types::SolEvent,
};
use thiserror::Error;

use crate::contracts::OptimismPortal::TransactionDeposited;

/// EIP-2718 type byte of a deposit transaction.
pub const DEPOSIT_TX_TYPE: u8 = 0x7E;

/// The only deposit event version understood by this module.
const DEPOSIT_VERSION_0: u64 = 0;

/// Length of the fixed prefix of version-0 opaque data: mint, value, gas limit and creation flag.
const OPAQUE_PREFIX_LEN: usize = 32 + 32 + 8 + 1;

/// Errors raised while turning a deposit event into a deposit transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepositDecodeError {
    /// The event carries a version this module does not know.
    #[error("unsupported deposit version {0}")]
    UnsupportedVersion(U256),

    /// The opaque data is shorter than its fixed prefix.
    #[error("opaque data is {0} bytes, expected at least {OPAQUE_PREFIX_LEN}")]
    TruncatedOpaqueData(usize),

    /// The event log lacks its block hash or index, i.e. it is not from a mined receipt.
    #[error("deposit log is missing its position in the source block")]
    MissingLogPosition,

    /// The log could not be decoded as a `TransactionDeposited` event.
    #[error("could not decode deposit event: {0}")]
    InvalidEvent(String),
}

/// A user deposit transaction as executed on the destination ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositTransaction {
    /// Uniquely identifies the source event of the deposit.
    pub source_hash: B256,
    /// The (possibly aliased) sender.
    pub from: Address,
    /// The recipient, [`None`] for contract creation.
    pub to: Option<Address>,
    /// Wei minted on the destination ledger.
    pub mint: U256,
    /// Wei transferred to the recipient.
    pub value: U256,
    /// Gas limit of the destination execution.
    pub gas_limit: u64,
    /// Whether this is a system transaction; always `false` for user deposits.
    pub is_system_tx: bool,
    /// Calldata of the destination execution.
    pub data: Bytes,
}

/// Computes the source hash of a user deposit emitted as log `log_index` of the source block
/// `block_hash`.
pub fn user_deposit_source_hash(block_hash: B256, log_index: u64) -> B256 {
    let mut deposit_id = [0u8; 64];
    deposit_id[..32].copy_from_slice(block_hash.as_slice());
    deposit_id[32..].copy_from_slice(&B256::from(U256::from(log_index))[..]);
    let deposit_id_hash = keccak256(deposit_id);

    // User deposits use domain 0.
    let mut domain_input = [0u8; 64];
    domain_input[32..].copy_from_slice(deposit_id_hash.as_slice());
    keccak256(domain_input)
}

impl DepositTransaction {
    /// Builds the deposit transaction from the fields of a `TransactionDeposited` event.
    pub fn from_event(
        source_hash: B256,
        from: Address,
        to: Address,
        version: U256,
        opaque_data: &[u8],
    ) -> Result<Self, DepositDecodeError> {
        if version != U256::from(DEPOSIT_VERSION_0) {
            return Err(DepositDecodeError::UnsupportedVersion(version));
        }
        if opaque_data.len() < OPAQUE_PREFIX_LEN {
            return Err(DepositDecodeError::TruncatedOpaqueData(opaque_data.len()));
        }

        let mint = U256::from_be_slice(&opaque_data[0..32]);
        let value = U256::from_be_slice(&opaque_data[32..64]);
        let mut gas = [0u8; 8];
        gas.copy_from_slice(&opaque_data[64..72]);
        let is_creation = opaque_data[72] != 0;
        let data = Bytes::copy_from_slice(&opaque_data[OPAQUE_PREFIX_LEN..]);

        Ok(Self {
            source_hash,
            from,
            to: (!is_creation).then_some(to),
            mint,
            value,
            gas_limit: u64::from_be_bytes(gas),
            is_system_tx: false,
            data,
        })
    }

    /// Builds the deposit transaction from a `TransactionDeposited` log of a mined receipt.
    pub fn from_log(log: &Log) -> Result<Self, DepositDecodeError> {
        let (Some(block_hash), Some(log_index)) = (log.block_hash, log.log_index) else {
            return Err(DepositDecodeError::MissingLogPosition);
        };

        let decoded = log
            .log_decode::<TransactionDeposited>()
            .map_err(|e| DepositDecodeError::InvalidEvent(e.to_string()))?;
        let event = decoded.inner.data;

        Self::from_event(
            user_deposit_source_hash(block_hash, log_index),
            event.from,
            event.to,
            event.version,
            &event.opaqueData,
        )
    }

    /// Finds the first deposit emitted by `portal` in `receipt`, if any.
    pub fn find_in_receipt(
        receipt: &TransactionReceipt,
        portal: Address,
    ) -> Option<Result<Self, DepositDecodeError>> {
        receipt
            .inner
            .logs()
            .iter()
            .find(|log| {
                log.inner.address == portal
                    && log.inner.data.topics().first() == Some(&TransactionDeposited::SIGNATURE_HASH)
            })
            .map(Self::from_log)
    }

    fn fields_len(&self) -> usize {
        let to_len = self.to.as_ref().map_or(1, Encodable::length);
        self.source_hash.length()
            + self.from.length()
            + to_len
            + self.mint.length()
            + self.value.length()
            + self.gas_limit.length()
            + self.is_system_tx.length()
            + self.data.length()
    }

    /// The typed encoding of the transaction: the type byte followed by the RLP list of fields.
    pub fn encoded(&self) -> Vec<u8> {
        let payload_length = self.fields_len();
        let header = Header {
            list: true,
            payload_length,
        };

        let mut out = Vec::with_capacity(1 + header.length() + payload_length);
        out.push(DEPOSIT_TX_TYPE);
        header.encode(&mut out);
        self.source_hash.encode(&mut out);
        self.from.encode(&mut out);
        match &self.to {
            Some(to) => to.encode(&mut out),
            None => out.push(EMPTY_STRING_CODE),
        }
        self.mint.encode(&mut out);
        self.value.encode(&mut out);
        self.gas_limit.encode(&mut out);
        self.is_system_tx.encode(&mut out);
        self.data.encode(&mut out);
        out
    }

    /// The hash of the transaction on the destination ledger.
    pub fn tx_hash(&self) -> B256 {
        keccak256(self.encoded())
    }
}

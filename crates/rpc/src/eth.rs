//! The `eth_*` read surface.

use crate::{
    errors::{into_rpc_err, RpcError},
    node::NodeHandle,
    types::{
        block_to_rpc, call_request_data, hex_bytes, hex_u256, hex_u64, log_to_rpc,
        parse_address, parse_hash, parse_hex_u64, receipt_to_rpc, transaction_to_rpc,
        AddressFilter, FilterParams, RpcBlock, RpcCallRequest, RpcLog, RpcReceipt,
        RpcTransaction,
    },
};
use alloy_primitives::{Address, BloomInput, B256, U256};
use jsonrpsee::{
    core::{async_trait, RpcResult},
    proc_macros::rpc,
};
use veda_executor::{execute_call, CallRequest};
use veda_primitives::SealedHeader;
use veda_state::State;

/// The `eth` namespace.
#[rpc(server, namespace = "eth")]
pub trait EthApi {
    /// Returns the accounts owned by the node. Always empty; there is no wallet.
    #[method(name = "accounts")]
    async fn accounts(&self) -> RpcResult<Vec<String>>;

    /// Returns the number of the canonical tip.
    #[method(name = "blockNumber")]
    async fn block_number(&self) -> RpcResult<String>;

    /// Returns the chain id.
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<String>;

    /// Returns the coinbase address. Always zero.
    #[method(name = "coinbase")]
    async fn coinbase(&self) -> RpcResult<String>;

    /// Executes a call against the state at the given block without persisting.
    #[method(name = "call")]
    async fn call(&self, request: RpcCallRequest, block: Option<String>) -> RpcResult<String>;

    /// Estimates the gas needed by a call.
    #[method(name = "estimateGas")]
    async fn estimate_gas(
        &self,
        request: RpcCallRequest,
        block: Option<String>,
    ) -> RpcResult<String>;

    /// Returns the configured gas price.
    #[method(name = "gasPrice")]
    async fn gas_price(&self) -> RpcResult<String>;

    /// Returns the balance of an account. Always zero; balances are never debited.
    #[method(name = "getBalance")]
    async fn get_balance(&self, address: String, block: Option<String>) -> RpcResult<String>;

    /// Returns a block by its identity.
    #[method(name = "getBlockByHash")]
    async fn get_block_by_hash(&self, hash: String, full: bool) -> RpcResult<RpcBlock>;

    /// Returns a canonical block by number or tag.
    #[method(name = "getBlockByNumber")]
    async fn get_block_by_number(&self, block: String, full: bool) -> RpcResult<RpcBlock>;

    /// Returns the number of transactions in the block with the given identity.
    #[method(name = "getBlockTransactionCountByHash")]
    async fn get_block_transaction_count_by_hash(&self, hash: String) -> RpcResult<String>;

    /// Returns the number of transactions in the canonical block at the given number.
    #[method(name = "getBlockTransactionCountByNumber")]
    async fn get_block_transaction_count_by_number(&self, block: String) -> RpcResult<String>;

    /// Returns the code at an address.
    #[method(name = "getCode")]
    async fn get_code(&self, address: String, block: Option<String>) -> RpcResult<String>;

    /// Returns the value of a storage slot.
    #[method(name = "getStorageAt")]
    async fn get_storage_at(
        &self,
        address: String,
        position: String,
        block: Option<String>,
    ) -> RpcResult<String>;

    /// Returns the logs matching a filter.
    #[method(name = "getLogs")]
    async fn get_logs(&self, filter: FilterParams) -> RpcResult<Vec<RpcLog>>;

    /// Returns a canonical transaction by its identity.
    #[method(name = "getTransactionByHash")]
    async fn get_transaction_by_hash(&self, hash: String) -> RpcResult<RpcTransaction>;

    /// Returns a transaction by block identity and position.
    #[method(name = "getTransactionByBlockHashAndIndex")]
    async fn get_transaction_by_block_hash_and_index(
        &self,
        hash: String,
        index: String,
    ) -> RpcResult<RpcTransaction>;

    /// Returns a transaction by canonical block number and position.
    #[method(name = "getTransactionByBlockNumberAndIndex")]
    async fn get_transaction_by_block_number_and_index(
        &self,
        block: String,
        index: String,
    ) -> RpcResult<RpcTransaction>;

    /// Returns the nonce of an account.
    #[method(name = "getTransactionCount")]
    async fn get_transaction_count(
        &self,
        address: String,
        block: Option<String>,
    ) -> RpcResult<String>;

    /// Returns the receipt of a canonical transaction.
    #[method(name = "getTransactionReceipt")]
    async fn get_transaction_receipt(&self, hash: String) -> RpcResult<RpcReceipt>;

    /// Returns the number of uncles of a block. Always zero.
    #[method(name = "getUncleCountByBlockHash")]
    async fn get_uncle_count_by_block_hash(&self, hash: String) -> RpcResult<String>;

    /// Returns the number of uncles of a block. Always zero.
    #[method(name = "getUncleCountByBlockNumber")]
    async fn get_uncle_count_by_block_number(&self, block: String) -> RpcResult<String>;

    /// Unsupported: there are no uncles.
    #[method(name = "getUncleByBlockHashAndIndex")]
    async fn get_uncle_by_block_hash_and_index(
        &self,
        hash: String,
        index: String,
    ) -> RpcResult<String>;

    /// Unsupported: there are no uncles.
    #[method(name = "getUncleByBlockNumberAndIndex")]
    async fn get_uncle_by_block_number_and_index(
        &self,
        block: String,
        index: String,
    ) -> RpcResult<String>;

    /// Unsupported: writes come only through the sync RPC.
    #[method(name = "sendRawTransaction")]
    async fn send_raw_transaction(&self, raw: String) -> RpcResult<String>;

    /// Unsupported: there is no local miner.
    #[method(name = "hashrate")]
    async fn hashrate(&self) -> RpcResult<String>;

    /// Returns `false`: there is no local miner.
    #[method(name = "mining")]
    async fn mining(&self) -> RpcResult<bool>;

    /// Returns the protocol version.
    #[method(name = "protocolVersion")]
    async fn protocol_version(&self) -> RpcResult<String>;

    /// Returns `false`: the verifier drives the chain, the node is never "syncing".
    #[method(name = "syncing")]
    async fn syncing(&self) -> RpcResult<bool>;
}

/// The `eth` namespace implementation.
#[derive(Debug)]
pub struct EthRpc {
    node: NodeHandle,
}

impl EthRpc {
    /// Creates the read surface over `node`.
    pub const fn new(node: NodeHandle) -> Self {
        Self { node }
    }

    fn state_at(&self, header: &SealedHeader) -> State<veda_executor::ChainDb> {
        State::new(header.state_root, self.node.db.clone())
    }

    fn parse_address_param(address: &str) -> Result<Address, RpcError> {
        parse_address(address)
            .ok_or_else(|| RpcError::InvalidParams(format!("invalid address: {address}")))
    }

    fn parse_hash_param(hash: &str) -> Result<B256, RpcError> {
        parse_hash(hash).ok_or_else(|| RpcError::InvalidParams(format!("invalid hash: {hash}")))
    }

    fn build_call_request(
        &self,
        request: &RpcCallRequest,
        header: &SealedHeader,
    ) -> Result<CallRequest, RpcError> {
        let sender = match request.from.as_deref() {
            Some(from) => Self::parse_address_param(from)?,
            None => Address::ZERO,
        };
        let to = match request.to.as_deref() {
            Some("") | Some("0x") | None => None,
            Some(to) => Some(Self::parse_address_param(to)?),
        };
        let data = call_request_data(request)
            .ok_or_else(|| RpcError::InvalidParams("invalid call data".to_string()))?;
        let gas = match request.gas.as_deref() {
            Some(gas) => Some(parse_hex_u64(gas).ok_or_else(|| {
                RpcError::InvalidParams(format!("invalid gas value: {gas}"))
            })?),
            None => Some(header.gas_limit),
        };
        Ok(CallRequest { sender, to, data, gas })
    }

    fn block_at_tag(&self, tag: Option<&str>, full: bool) -> Result<RpcBlock, RpcError> {
        let header = self.node.header_by_tag(tag)?;
        let (transactions, _) = self.node.block_body(header.hash())?;
        Ok(block_to_rpc(&header, &transactions, full))
    }

    fn transaction_at(
        &self,
        header: &SealedHeader,
        index: u64,
    ) -> Result<RpcTransaction, RpcError> {
        let (transactions, _) = self.node.block_body(header.hash())?;
        let tx = transactions.into_iter().nth(index as usize).ok_or_else(|| {
            RpcError::NotFound(format!(
                "no transaction at index {index} in block {}",
                header.hash()
            ))
        })?;
        Ok(transaction_to_rpc(&tx, Some((header, index))))
    }
}

#[async_trait]
impl EthApiServer for EthRpc {
    async fn accounts(&self) -> RpcResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn block_number(&self) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let head = self.node.head().map_err(into_rpc_err)?;
        Ok(hex_u64(head.block_number))
    }

    async fn chain_id(&self) -> RpcResult<String> {
        Ok(hex_u64(self.node.chain_id))
    }

    async fn coinbase(&self) -> RpcResult<String> {
        Ok(hex_bytes(Address::ZERO.as_slice()))
    }

    async fn call(&self, request: RpcCallRequest, block: Option<String>) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(block.as_deref()).map_err(into_rpc_err)?;
        let call = self.build_call_request(&request, &header).map_err(into_rpc_err)?;

        let computation =
            execute_call(&self.node.db, &header, &call).map_err(into_rpc_err)?;
        match computation.error {
            None => Ok(hex_bytes(&computation.output)),
            Some(err) => Err(into_rpc_err(RpcError::Call(err.to_string()))),
        }
    }

    async fn estimate_gas(
        &self,
        request: RpcCallRequest,
        block: Option<String>,
    ) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(block.as_deref()).map_err(into_rpc_err)?;
        let call = self.build_call_request(&request, &header).map_err(into_rpc_err)?;

        let gas_limit = call.gas.unwrap_or(header.gas_limit);
        let computation =
            execute_call(&self.node.db, &header, &call).map_err(into_rpc_err)?;
        if let Some(err) = computation.error {
            return Err(into_rpc_err(RpcError::Call(err.to_string())));
        }

        // The executed gas plus the intrinsic cost of carrying the transaction.
        let intrinsic = veda_primitives::Transaction {
            nonce: 0,
            gas: gas_limit,
            to: call.to,
            data: call.data,
            veda_sender: call.sender,
            veda_txhash: B256::ZERO,
        }
        .intrinsic_gas();
        Ok(hex_u64(intrinsic + (gas_limit - computation.gas_remaining)))
    }

    async fn gas_price(&self) -> RpcResult<String> {
        Ok(hex_u256(self.node.gas_price))
    }

    async fn get_balance(&self, address: String, block: Option<String>) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(block.as_deref()).map_err(into_rpc_err)?;
        let address = Self::parse_address_param(&address).map_err(into_rpc_err)?;
        let mut state = self.state_at(&header);
        let balance = state.get_balance(address).map_err(into_rpc_err)?;
        Ok(hex_u256(balance))
    }

    async fn get_block_by_hash(&self, hash: String, full: bool) -> RpcResult<RpcBlock> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let hash = Self::parse_hash_param(&hash).map_err(into_rpc_err)?;
        let header = self.node.header_by_hash(hash).map_err(into_rpc_err)?;
        let (transactions, _) = self.node.block_body(header.hash()).map_err(into_rpc_err)?;
        Ok(block_to_rpc(&header, &transactions, full))
    }

    async fn get_block_by_number(&self, block: String, full: bool) -> RpcResult<RpcBlock> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        self.block_at_tag(Some(&block), full).map_err(into_rpc_err)
    }

    async fn get_block_transaction_count_by_hash(&self, hash: String) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let hash = Self::parse_hash_param(&hash).map_err(into_rpc_err)?;
        let header = self.node.header_by_hash(hash).map_err(into_rpc_err)?;
        let (transactions, _) = self.node.block_body(header.hash()).map_err(into_rpc_err)?;
        Ok(hex_u64(transactions.len() as u64))
    }

    async fn get_block_transaction_count_by_number(&self, block: String) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(Some(&block)).map_err(into_rpc_err)?;
        let (transactions, _) = self.node.block_body(header.hash()).map_err(into_rpc_err)?;
        Ok(hex_u64(transactions.len() as u64))
    }

    async fn get_code(&self, address: String, block: Option<String>) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(block.as_deref()).map_err(into_rpc_err)?;
        let address = Self::parse_address_param(&address).map_err(into_rpc_err)?;
        let mut state = self.state_at(&header);
        let code = state.get_code(address).map_err(into_rpc_err)?;
        Ok(hex_bytes(&code))
    }

    async fn get_storage_at(
        &self,
        address: String,
        position: String,
        block: Option<String>,
    ) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(block.as_deref()).map_err(into_rpc_err)?;
        let address = Self::parse_address_param(&address).map_err(into_rpc_err)?;
        let slot = position
            .strip_prefix("0x")
            .and_then(|digits| U256::from_str_radix(digits, 16).ok())
            .ok_or_else(|| {
                into_rpc_err(RpcError::InvalidParams(format!("invalid position: {position}")))
            })?;
        let mut state = self.state_at(&header);
        let value = state.get_storage(address, slot).map_err(into_rpc_err)?;
        Ok(hex_bytes(&value.to_be_bytes::<32>()))
    }

    async fn get_logs(&self, filter: FilterParams) -> RpcResult<Vec<RpcLog>> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;

        let (from_block, to_block) = if let Some(hash) = filter.block_hash.as_deref() {
            let hash = Self::parse_hash_param(hash).map_err(into_rpc_err)?;
            let header = self.node.header_by_hash(hash).map_err(into_rpc_err)?;
            (header.block_number, header.block_number)
        } else {
            let head = self.node.head().map_err(into_rpc_err)?;
            let resolve = |tag: Option<&str>| -> Result<u64, RpcError> {
                match tag {
                    None | Some("latest") | Some("pending") => Ok(head.block_number),
                    Some("earliest") => Ok(0),
                    Some(raw) => parse_hex_u64(raw).ok_or_else(|| {
                        RpcError::InvalidParams(format!("invalid block: {raw}"))
                    }),
                }
            };
            (
                resolve(filter.from_block.as_deref()).map_err(into_rpc_err)?,
                resolve(filter.to_block.as_deref()).map_err(into_rpc_err)?,
            )
        };

        let address_filter: Option<Vec<Option<Address>>> =
            filter.address.as_ref().map(AddressFilter::addresses);
        let topic_filter: Vec<Option<B256>> = filter
            .topics
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|topic| topic.as_deref().and_then(parse_hash))
            .collect();
        if topic_filter.len() >= 4 {
            return Err(into_rpc_err(RpcError::InvalidParams(
                "topics param length is too long".to_string(),
            )));
        }

        let mut matched = Vec::new();
        for number in from_block..=to_block {
            let Some(header) = self.node.db.canonical_header(number).map_err(into_rpc_err)?
            else {
                continue;
            };

            // The header bloom prunes blocks that cannot contain a match.
            if let Some(addresses) = &address_filter {
                let maybe_present = addresses.iter().any(|address| {
                    address.map_or(false, |address| {
                        header.bloom.contains_input(BloomInput::Raw(address.as_slice()))
                    })
                });
                if !maybe_present {
                    continue;
                }
            }

            let (transactions, receipts) =
                self.node.block_body(header.hash()).map_err(into_rpc_err)?;
            let mut log_index = 0u64;
            for (tx_index, (tx, receipt)) in
                transactions.iter().zip(receipts.iter()).enumerate()
            {
                for log in &receipt.logs {
                    let current_index = log_index;
                    log_index += 1;

                    if let Some(addresses) = &address_filter {
                        if !addresses.contains(&Some(log.address)) {
                            continue;
                        }
                    }
                    let topics_match =
                        topic_filter.iter().enumerate().all(|(position, wanted)| {
                            wanted.map_or(true, |wanted| {
                                log.topics.get(position) == Some(&wanted)
                            })
                        });
                    if !topics_match {
                        continue;
                    }

                    matched.push(log_to_rpc(
                        log,
                        &header,
                        tx.hash(),
                        tx_index as u64,
                        current_index,
                    ));
                }
            }
        }
        Ok(matched)
    }

    async fn get_transaction_by_hash(&self, hash: String) -> RpcResult<RpcTransaction> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let hash = Self::parse_hash_param(&hash).map_err(into_rpc_err)?;
        let (header, tx, index) = self.node.canonical_transaction(hash).map_err(into_rpc_err)?;
        Ok(transaction_to_rpc(&tx, Some((&header, index))))
    }

    async fn get_transaction_by_block_hash_and_index(
        &self,
        hash: String,
        index: String,
    ) -> RpcResult<RpcTransaction> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let hash = Self::parse_hash_param(&hash).map_err(into_rpc_err)?;
        let header = self.node.header_by_hash(hash).map_err(into_rpc_err)?;
        let index = parse_hex_u64(&index)
            .ok_or_else(|| into_rpc_err(RpcError::InvalidParams(format!("invalid index: {index}"))))?;
        self.transaction_at(&header, index).map_err(into_rpc_err)
    }

    async fn get_transaction_by_block_number_and_index(
        &self,
        block: String,
        index: String,
    ) -> RpcResult<RpcTransaction> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(Some(&block)).map_err(into_rpc_err)?;
        let index = parse_hex_u64(&index)
            .ok_or_else(|| into_rpc_err(RpcError::InvalidParams(format!("invalid index: {index}"))))?;
        self.transaction_at(&header, index).map_err(into_rpc_err)
    }

    async fn get_transaction_count(
        &self,
        address: String,
        block: Option<String>,
    ) -> RpcResult<String> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let header = self.node.header_by_tag(block.as_deref()).map_err(into_rpc_err)?;
        let address = Self::parse_address_param(&address).map_err(into_rpc_err)?;
        let mut state = self.state_at(&header);
        let nonce = state.get_nonce(address).map_err(into_rpc_err)?;
        Ok(hex_u64(nonce))
    }

    async fn get_transaction_receipt(&self, hash: String) -> RpcResult<RpcReceipt> {
        self.node.gate.ready().await.map_err(into_rpc_err)?;
        let hash = Self::parse_hash_param(&hash).map_err(into_rpc_err)?;
        let (header, tx, index) = self.node.canonical_transaction(hash).map_err(into_rpc_err)?;
        let (_, receipts) = self.node.block_body(header.hash()).map_err(into_rpc_err)?;

        let receipt = receipts.get(index as usize).ok_or_else(|| {
            into_rpc_err(RpcError::Internal("receipt index out of range".to_string()))
        })?;
        let prior_cumulative = if index == 0 {
            0
        } else {
            receipts
                .get(index as usize - 1)
                .map(|prior| prior.cumulative_gas_used)
                .unwrap_or_default()
        };
        Ok(receipt_to_rpc(receipt, &tx, index, &header, prior_cumulative))
    }

    async fn get_uncle_count_by_block_hash(&self, _hash: String) -> RpcResult<String> {
        Ok("0x0".to_string())
    }

    async fn get_uncle_count_by_block_number(&self, _block: String) -> RpcResult<String> {
        Ok("0x0".to_string())
    }

    async fn get_uncle_by_block_hash_and_index(
        &self,
        _hash: String,
        _index: String,
    ) -> RpcResult<String> {
        Err(into_rpc_err(RpcError::NotImplemented(
            "getUncleByBlockHashAndIndex is not supported",
        )))
    }

    async fn get_uncle_by_block_number_and_index(
        &self,
        _block: String,
        _index: String,
    ) -> RpcResult<String> {
        Err(into_rpc_err(RpcError::NotImplemented(
            "getUncleByBlockNumberAndIndex is not supported",
        )))
    }

    async fn send_raw_transaction(&self, _raw: String) -> RpcResult<String> {
        Err(into_rpc_err(RpcError::NotImplemented("sendRawTransaction is not supported")))
    }

    async fn hashrate(&self) -> RpcResult<String> {
        Err(into_rpc_err(RpcError::NotImplemented("hashrate is not supported")))
    }

    async fn mining(&self) -> RpcResult<bool> {
        Ok(false)
    }

    async fn protocol_version(&self) -> RpcResult<String> {
        Ok("63".to_string())
    }

    async fn syncing(&self) -> RpcResult<bool> {
        Ok(false)
    }
}

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, RootProvider};
use alloy::rpc::client::RpcClient;
use alloy::sol;
use alloy::transports::http::{reqwest, Http};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use std::fmt::Display;

use crate::api::ChainReader;
use crate::config::Config;
use crate::errors::{Result, SniperError};
use crate::models::api::PoolInfo;
use crate::models::reconciliation::Reserves;
use crate::models::wallet::WalletBalance;
use crate::utils::{address_key, parse_address, units_to_decimal, wei_to_native, NATIVE_DECIMALS};

const MAX_CONCURRENT_BALANCE_READS: usize = 10;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
    }

    #[sol(rpc)]
    interface IPancakeFactory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    #[sol(rpc)]
    interface IPancakePair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
        function token0() external view returns (address);
        function totalSupply() external view returns (uint256);
    }
}

fn rpc_error(call: &str, target: Address, e: impl Display) -> SniperError {
    SniperError::Rpc(format!("{} on {} failed: {}", call, address_key(target), e))
}

/// `ChainReader` over a BSC node, talking to PancakeSwap V2 contracts directly.
pub struct RpcChainReader {
    provider: DynProvider,
    factory: Address,
    wbnb: Address,
}

impl RpcChainReader {
    pub fn new(config: &Config) -> Result<Self> {
        let url: reqwest::Url = config.bsc_rpc_url.parse()
            .map_err(|e| SniperError::InvalidInput(format!("Invalid RPC URL '{}': {}", config.bsc_rpc_url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SniperError::Rpc(format!("Cannot build RPC client: {}", e)))?;
        let transport = RpcClient::new(Http::with_client(client, url), false);
        let provider: RootProvider = RootProvider::new(transport);

        Ok(RpcChainReader {
            provider: provider.erased(),
            factory: parse_address(&config.pancake_factory)?,
            wbnb: parse_address(&config.wbnb_address)?,
        })
    }

    async fn native_balance(&self, owner: Address) -> Result<f64> {
        let wei = self.provider.get_balance(owner).await
            .map_err(|e| rpc_error("eth_getBalance", owner, e))?;
        wei_to_native(wei)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8> {
        IERC20::new(token, self.provider.clone())
            .decimals()
            .call()
            .await
            .map_err(|e| rpc_error("decimals", token, e))
    }

    async fn erc20_balance(&self, token: Address, owner: Address, decimals: u8) -> Result<f64> {
        let raw = IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| rpc_error("balanceOf", token, e))?;
        units_to_decimal(raw, decimals)
    }

    async fn find_pair(&self, token: Address) -> Result<Option<Address>> {
        let pair = IPancakeFactory::new(self.factory, self.provider.clone())
            .getPair(token, self.wbnb)
            .call()
            .await
            .map_err(|e| rpc_error("getPair", self.factory, e))?;
        Ok(if pair == Address::ZERO { None } else { Some(pair) })
    }
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn fetch_balances(&self, addresses: &[String], token_address: Option<&str>) -> Result<Vec<WalletBalance>> {
        let token = match token_address.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Some(parse_address(t)?),
            None => None,
        };
        let decimals = match token {
            Some(t) => self.token_decimals(t).await?,
            None => NATIVE_DECIMALS,
        };
        debug!("Fetching balances for {} addresses (token: {:?})", addresses.len(), token);

        let results: Vec<Option<WalletBalance>> = stream::iter(addresses.iter().cloned())
            .map(|address| async move {
                let read = async {
                    let owner = parse_address(&address)?;
                    let native_balance = self.native_balance(owner).await?;
                    let token_amount = match token {
                        Some(t) => self.erc20_balance(t, owner, decimals).await?,
                        None => 0.0,
                    };
                    Ok::<_, SniperError>(WalletBalance { address: address.clone(), native_balance, token_amount })
                }.await;
                match read {
                    Ok(balance) => Some(balance),
                    Err(e) => {
                        warn!("Failed to read balances for {}: {}", address, e);
                        None
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_BALANCE_READS)
            .collect()
            .await;

        Ok(results.into_iter().flatten().collect())
    }

    async fn pool_info(&self, token_address: &str) -> Result<Option<PoolInfo>> {
        let token = parse_address(token_address)?;
        let Some(pair) = self.find_pair(token).await? else {
            debug!("No PancakeSwap pair for {}", address_key(token));
            return Ok(None);
        };

        let pair_contract = IPancakePair::new(pair, self.provider.clone());
        let reserves = pair_contract.getReserves().call().await
            .map_err(|e| rpc_error("getReserves", pair, e))?;
        let token0 = pair_contract.token0().call().await
            .map_err(|e| rpc_error("token0", pair, e))?;
        let supply = pair_contract.totalSupply().call().await
            .map_err(|e| rpc_error("totalSupply", pair, e))?;
        let decimals = self.token_decimals(token).await?;

        let (reserve0, reserve1) = (U256::from(reserves.reserve0), U256::from(reserves.reserve1));
        let (token_raw, native_raw) = if token0 == token { (reserve0, reserve1) } else { (reserve1, reserve0) };

        Ok(Some(PoolInfo {
            pair_address: address_key(pair),
            reserves: Reserves {
                native: wei_to_native(native_raw)?,
                token: units_to_decimal(token_raw, decimals)?,
            },
            lp_total_supply: units_to_decimal(supply, NATIVE_DECIMALS)?,
            token_decimals: decimals,
        }))
    }

    async fn lp_balance(&self, token_address: &str, owner: &str) -> Result<f64> {
        let token = parse_address(token_address)?;
        let owner = parse_address(owner)?;
        match self.find_pair(token).await? {
            Some(pair) => self.erc20_balance(pair, owner, NATIVE_DECIMALS).await,
            None => Ok(0.0),
        }
    }
}

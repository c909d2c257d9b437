//! Fee estimation.

use alloy::primitives::Address;

use crate::blockchain::TransferRequest;
use crate::config::SweepConfig;
use crate::sweep::connector::Connection;
use crate::sweep::types::{FeeQuote, FeeSource, Stage, SweepError, SweepTrail};

/// Gas estimation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    /// Percent added to an estimated gas limit.
    pub gas_pad_percent: u64,
    /// Gas limit used as-is when estimation fails.
    pub fallback_gas_limit: u64,
}

impl From<&SweepConfig> for FeeParams {
    fn from(config: &SweepConfig) -> Self {
        Self {
            gas_pad_percent: config.gas_pad_percent,
            fallback_gas_limit: config.fallback_gas_limit,
        }
    }
}

/// Pad an estimate the same way on every endpoint: `units + units / 100 * pct`.
pub fn pad_gas(units: u64, pad_percent: u64) -> u64 {
    units.saturating_add((units / 100).saturating_mul(pad_percent))
}

/// Quote fees for sending from `from` to `to` over `connection`.
///
/// A missing or zero gas price aborts: submitting without one is unsafe.
/// A failed gas estimate falls back to `fallback_gas_limit`.
pub async fn estimate(
    connection: &Connection,
    from: Address,
    to: Address,
    params: &FeeParams,
    trail: &mut SweepTrail,
) -> Result<FeeQuote, SweepError> {
    let client = connection.client();

    let gas_price = match client.get_gas_price().await {
        Ok(0) => {
            trail.success(client.endpoint(), Stage::GasPrice, Some("0".to_string()));
            return Err(SweepError::GasPriceUnavailable(format!(
                "{} reported a zero gas price",
                client.endpoint()
            )));
        }
        Ok(price) => {
            trail.success(client.endpoint(), Stage::GasPrice, Some(price.to_string()));
            price
        }
        Err(e) => {
            tracing::error!(endpoint = %client.endpoint(), error = %e, "Could not retrieve gas price");
            trail.failure(client.endpoint(), Stage::GasPrice, &e);
            return Err(SweepError::GasPriceUnavailable(e.to_string()));
        }
    };

    let template = TransferRequest::template(from, to, gas_price);
    let quote = match client.estimate_gas(&template).await {
        Ok(units) if units > 0 => {
            let gas_limit = pad_gas(units, params.gas_pad_percent);
            trail.success(client.endpoint(), Stage::EstimateGas, Some(gas_limit.to_string()));
            FeeQuote {
                gas_price,
                gas_limit,
                source: FeeSource::Estimated,
            }
        }
        result => {
            match result {
                Err(e) => {
                    tracing::warn!(
                        endpoint = %client.endpoint(),
                        error = %e,
                        fallback = params.fallback_gas_limit,
                        "Gas estimation failed, using fallback limit"
                    );
                    trail.failure(client.endpoint(), Stage::EstimateGas, &e);
                }
                Ok(_) => tracing::warn!(
                    endpoint = %client.endpoint(),
                    fallback = params.fallback_gas_limit,
                    "Gas estimate was zero, using fallback limit"
                ),
            }
            FeeQuote {
                gas_price,
                gas_limit: params.fallback_gas_limit,
                source: FeeSource::Fallback,
            }
        }
    };

    tracing::debug!(
        gas_price = quote.gas_price,
        gas_limit = quote.gas_limit,
        source = ?quote.source,
        "Fee quote"
    );
    Ok(quote)
}

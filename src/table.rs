//! Discrete price tables for on-chain enforcement
//!
//! The enforcement program cannot evaluate a curve at mint time, so it stores a
//! flat table of integer prices and looks up `table[edition]`. Each storage
//! account holds at most [`ACCOUNT_CAPACITY`] entries; what happens beyond that
//! is an explicit [`OverflowPolicy`], never a silent truncation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bezier::{self, CurveData};
use crate::pricing::{checked_linear_price, closed_form_price, PricingConfig, PricingError, PricingModel};

/// Entries one storage account can hold
pub const ACCOUNT_CAPACITY: usize = 1000;

/// What to do when a table does not fit in one account
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Fail with [`TableError::CapacityExceeded`]
    #[default]
    Reject,
    /// Split into consecutive chunks of at most `capacity` entries
    Chunk,
}

/// Capacity ceiling and overflow handling for table generation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePolicy {
    /// Entries per account
    pub capacity: usize,
    /// Behaviour past `capacity`
    pub overflow: OverflowPolicy,
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self {
            capacity: ACCOUNT_CAPACITY,
            overflow: OverflowPolicy::Reject,
        }
    }
}

impl TablePolicy {
    /// Policy that chunks at `capacity`
    pub fn chunked(capacity: usize) -> Self {
        Self {
            capacity,
            overflow: OverflowPolicy::Chunk,
        }
    }
}

/// Table generation failures
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    /// More entries requested than one account holds under [`OverflowPolicy::Reject`]
    #[error("price table of {requested} entries exceeds account capacity of {capacity}")]
    CapacityExceeded {
        /// Entries requested
        requested: u64,
        /// Account capacity
        capacity: usize,
    },
    /// `max_supply` was zero
    #[error("max supply must be at least 1")]
    ZeroSupply,
    /// The policy capacity was zero
    #[error("table capacity must be at least 1")]
    ZeroCapacity,
    /// A price is negative or does not fit in a `u64`
    #[error("price {price} at supply {supply} is not representable in minor units")]
    PriceOutOfRange {
        /// Supply the price was computed for
        supply: u64,
        /// Offending price
        price: Decimal,
    },
    /// Integer price arithmetic overflowed
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Integer prices ordered by edition, split across storage accounts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    /// Capacity each chunk was bounded by
    pub capacity: usize,
    /// Consecutive chunks, each at most `capacity` long
    pub chunks: Vec<Vec<u64>>,
}

impl PriceTable {
    /// Total entries across all chunks
    pub fn len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Price for `edition` (0-based)
    pub fn get(&self, edition: usize) -> Option<u64> {
        if self.capacity == 0 {
            return None;
        }
        self.chunks
            .get(edition / self.capacity)
            .and_then(|chunk| chunk.get(edition % self.capacity))
            .copied()
    }

    /// Prices in edition order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.chunks.iter().flatten().copied()
    }

    /// Concatenates all chunks
    pub fn into_flat(self) -> Vec<u64> {
        self.chunks.into_iter().flatten().collect()
    }
}

fn to_minor_units(supply: u64, price: Decimal) -> Result<u64, TableError> {
    bezier::round_to_minor_unit(price)
        .to_u64()
        .ok_or(TableError::PriceOutOfRange { supply, price })
}

fn check_capacity(max_supply: u64, policy: &TablePolicy) -> Result<(), TableError> {
    if max_supply == 0 {
        return Err(TableError::ZeroSupply);
    }
    if policy.capacity == 0 {
        return Err(TableError::ZeroCapacity);
    }
    if policy.overflow == OverflowPolicy::Reject && max_supply > policy.capacity as u64 {
        return Err(TableError::CapacityExceeded {
            requested: max_supply,
            capacity: policy.capacity,
        });
    }
    Ok(())
}

fn build<F>(max_supply: u64, policy: &TablePolicy, price_of: F) -> Result<PriceTable, TableError>
where
    F: Fn(u64) -> Result<u64, TableError>,
{
    check_capacity(max_supply, policy)?;
    let prices = (0..max_supply)
        .map(price_of)
        .collect::<Result<Vec<u64>, TableError>>()?;
    let chunks = prices.chunks(policy.capacity).map(<[u64]>::to_vec).collect();
    tracing::debug!(entries = max_supply, capacity = policy.capacity, "generated price table");
    Ok(PriceTable {
        capacity: policy.capacity,
        chunks,
    })
}

/// Table for a curve: entry `i` is the curve price at supply `i + 1`.
pub fn generate(curve: &CurveData, max_supply: u64, policy: &TablePolicy) -> Result<PriceTable, TableError> {
    build(max_supply, policy, |edition| {
        let supply = edition + 1;
        to_minor_units(supply, bezier::calculate_price(supply, max_supply, curve))
    })
}

/// Flat single-account table for a curve, rejecting anything over [`ACCOUNT_CAPACITY`].
pub fn generate_price_table(curve: &CurveData, max_supply: u64) -> Result<Vec<u64>, TableError> {
    generate(curve, max_supply, &TablePolicy::default()).map(PriceTable::into_flat)
}

/// Table for any pricing config.
///
/// Curves follow [`generate`]. Closed-form models price edition `i` at
/// supply `i`, so the first entry is the base price. Linear prices use
/// integer arithmetic and fail with [`PricingError::ArithmeticOverflow`]
/// rather than saturating.
pub fn generate_for_config(config: &PricingConfig, policy: &TablePolicy) -> Result<PriceTable, TableError> {
    match &config.model {
        PricingModel::Bezier { curve } => generate(curve, config.max_supply, policy),
        PricingModel::Linear { base_price, increment } => build(config.max_supply, policy, |edition| {
            Ok(checked_linear_price(*base_price, *increment, edition)?)
        }),
        model => build(config.max_supply, policy, |edition| {
            to_minor_units(edition, closed_form_price(edition, model))
        }),
    }
}

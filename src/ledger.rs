//! Offline model of the mint-time enforcement program
//!
//! Mirrors what the on-chain side does with a stored price table: quote the
//! next edition, accept exactly that payment, advance supply and volume.

use thiserror::Error;

use crate::table::PriceTable;

/// Mint rejections
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MintError {
    /// Every edition has been minted
    #[error("maximum supply of {0} has been reached")]
    MaxSupplyReached(u64),
    /// Payment differs from the table price
    #[error("payment of {offered} does not match price {expected} for edition {edition}")]
    PaymentMismatch {
        /// Edition being minted
        edition: u64,
        /// Table price
        expected: u64,
        /// Amount offered
        offered: u64,
    },
    /// Volume accounting overflowed
    #[error("arithmetic overflow in volume accounting")]
    ArithmeticOverflow,
    /// Cannot close after editions have been minted
    #[error("curve is not empty: {0} editions minted")]
    CurveNotEmpty(u64),
}

/// Result of a successful mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintReceipt {
    /// Index of the minted edition (0-based)
    pub edition: u64,
    /// Price paid
    pub price: u64,
    /// Cumulative volume after this mint
    pub total_volume: u64,
}

/// Enforcement state for one collection
#[derive(Debug, Clone)]
pub struct EditionLedger {
    table: Vec<u64>,
    current_supply: u64,
    total_volume: u64,
}

impl EditionLedger {
    /// Starts a ledger with nothing minted
    pub fn new(table: Vec<u64>) -> Self {
        Self {
            table,
            current_supply: 0,
            total_volume: 0,
        }
    }

    /// Starts a ledger from a possibly chunked table
    pub fn from_table(table: PriceTable) -> Self {
        Self::new(table.into_flat())
    }

    /// Editions the table covers
    pub fn max_supply(&self) -> u64 {
        self.table.len() as u64
    }

    /// Editions minted so far
    pub fn current_supply(&self) -> u64 {
        self.current_supply
    }

    /// Sum of all accepted payments
    pub fn total_volume(&self) -> u64 {
        self.total_volume
    }

    /// Editions still available
    pub fn remaining(&self) -> u64 {
        self.max_supply() - self.current_supply
    }

    /// Price the next buyer must pay
    pub fn quote(&self) -> Result<u64, MintError> {
        self.table
            .get(self.current_supply as usize)
            .copied()
            .ok_or(MintError::MaxSupplyReached(self.max_supply()))
    }

    /// Mints the next edition if `payment` equals its table price exactly.
    pub fn mint(&mut self, payment: u64) -> Result<MintReceipt, MintError> {
        let expected = self.quote()?;
        let edition = self.current_supply;
        if payment != expected {
            return Err(MintError::PaymentMismatch {
                edition,
                expected,
                offered: payment,
            });
        }
        let total_volume = self
            .total_volume
            .checked_add(expected)
            .ok_or(MintError::ArithmeticOverflow)?;

        self.current_supply += 1;
        self.total_volume = total_volume;
        tracing::info!(edition, price = expected, total_volume, "edition minted");

        Ok(MintReceipt {
            edition,
            price: expected,
            total_volume,
        })
    }

    /// Retires the ledger; only allowed before the first mint.
    pub fn close(self) -> Result<(), MintError> {
        if self.current_supply != 0 {
            return Err(MintError::CurveNotEmpty(self.current_supply));
        }
        Ok(())
    }
}

//! Converts a currency offer into a token purchase.

use crate::{Purchase, SaleError, SaleTerms};

/// Tokens bought with `amount` currency when `sold` tokens are already gone.
///
/// An offer that would overshoot the hard cap buys exactly the tokens left
/// and is charged `left / rate`, rounded down. The caller must make sure
/// `sold < hard_cap`.
pub fn quote(terms: &SaleTerms, sold: i128, amount: i128) -> Result<Purchase, SaleError> {
    let left = terms
        .hard_cap
        .checked_sub(sold)
        .ok_or(SaleError::Overflow)?;
    let tokens = amount.checked_mul(terms.rate).ok_or(SaleError::Overflow)?;
    if tokens <= left {
        return Ok(Purchase {
            tokens,
            paid: amount,
        });
    }
    Ok(Purchase {
        tokens: left,
        paid: left / terms.rate,
    })
}

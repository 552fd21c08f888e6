//! Account and balance types
//!
//! Per-currency balances with available/reserved buckets. Accounts are
//! lazily created with seed balances on first reference and never
//! destroyed. The buckets themselves are moved by conditional store
//! updates owned by the gateway; this type is the wire and row shape plus
//! the non-negativity invariant check applied to loaded rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance for a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub available: Decimal,
    pub reserved: Decimal,
}

impl Balance {
    /// Fresh balance with everything available.
    pub fn new(available: Decimal) -> Self {
        Self {
            available,
            reserved: Decimal::ZERO,
        }
    }

    /// Check the non-negativity invariant.
    pub fn check_invariant(&self) -> bool {
        self.available >= Decimal::ZERO && self.reserved >= Decimal::ZERO
    }
}

/// Balances of one account across the platform's two currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub usd: Balance,
    pub btc: Balance,
}

impl AccountBalances {
    /// Seed balances for a lazily created account.
    pub fn seeded(usd: Decimal, btc: Decimal) -> Self {
        Self {
            usd: Balance::new(usd),
            btc: Balance::new(btc),
        }
    }

    /// Check the non-negativity invariant across both currencies.
    pub fn check_invariant(&self) -> bool {
        self.usd.check_invariant() && self.btc.check_invariant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_seeded_account() {
        let acc = AccountBalances::seeded(dec!(1000000), dec!(50));
        assert_eq!(acc.usd.available, dec!(1000000));
        assert_eq!(acc.usd.reserved, Decimal::ZERO);
        assert_eq!(acc.btc.available, dec!(50));
        assert!(acc.check_invariant());
    }

    #[test]
    fn test_invariant_rejects_negative_buckets() {
        let negative_available = Balance {
            available: dec!(-1),
            reserved: Decimal::ZERO,
        };
        assert!(!negative_available.check_invariant());

        let negative_reserved = Balance {
            available: dec!(100),
            reserved: dec!(-0.5),
        };
        assert!(!negative_reserved.check_invariant());

        let acc = AccountBalances {
            usd: Balance::new(dec!(100)),
            btc: negative_reserved,
        };
        assert!(!acc.check_invariant());
    }

    #[test]
    fn test_balances_round_trip() {
        let acc = AccountBalances::seeded(dec!(1000000), dec!(50));
        let json = serde_json::to_string(&acc).unwrap();
        assert!(json.contains("\"usd\""));
        assert!(json.contains("\"btc\""));
        let decoded: AccountBalances = serde_json::from_str(&json).unwrap();
        assert_eq!(acc, decoded);
    }
}

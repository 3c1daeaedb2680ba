// 10.0: the token balance book. traders and per-exchange vaults hold balances of
// arbitrary tokens; every engine operation moves value through here. the vault
// holder is derived from the exchange identity and is not a signer: nothing
// outside the engine's own operations can move vault funds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ExchangeError;
use crate::math::MathError;
use crate::types::{ExchangeId, TokenId, TraderId};

/// Who holds a balance. `Vault` is the engine-controlled custody identity for one
/// exchange, the moral equivalent of a program-derived address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HolderId {
    Trader(TraderId),
    Vault(ExchangeId),
}

impl HolderId {
    /// Stable 64-bit address for this holder. FNV-1a over a tag byte plus the id,
    /// so trader 5 and vault 5 never collide.
    pub fn address(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let (tag, id) = match self {
            HolderId::Trader(t) => (0u8, t.0),
            HolderId::Vault(e) => (1u8, u64::from(e.0)),
        };
        let mut hash = FNV_OFFSET;
        for byte in std::iter::once(tag).chain(id.to_le_bytes()) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    balances: HashMap<(HolderId, TokenId), u64>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, holder: HolderId, token: TokenId) -> u64 {
        self.balances.get(&(holder, token)).copied().unwrap_or(0)
    }

    /// Create `amount` of `token` in `holder`'s balance. Used for external
    /// deposits arriving from outside the engine and for receipt minting.
    pub fn mint(
        &mut self,
        holder: HolderId,
        token: TokenId,
        amount: u64,
    ) -> Result<(), ExchangeError> {
        let entry = self.balances.entry((holder, token)).or_insert(0);
        *entry = entry.checked_add(amount).ok_or(MathError::Overflow)?;
        Ok(())
    }

    /// Destroy `amount` of `token` held by `holder`. Used for receipt burning
    /// and external withdrawals.
    pub fn burn(
        &mut self,
        holder: HolderId,
        token: TokenId,
        amount: u64,
    ) -> Result<(), ExchangeError> {
        let available = self.balance(holder, token);
        if available < amount {
            return Err(ExchangeError::InsufficientBalance {
                token,
                requested: amount,
                available,
            });
        }
        self.balances.insert((holder, token), available - amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        from: HolderId,
        to: HolderId,
        token: TokenId,
        amount: u64,
    ) -> Result<(), ExchangeError> {
        if from == to || amount == 0 {
            return Ok(());
        }
        self.burn(from, token, amount)?;
        // credit cannot fail after a successful debit unless the supply of one
        // token exceeds u64, which mint() checks anyway
        self.mint(to, token, amount)
    }

    /// Balance check that reports `InsufficientCollateral` instead of the generic
    /// balance error. Position collateral paths use this.
    pub fn require_collateral(
        &self,
        holder: HolderId,
        token: TokenId,
        amount: u64,
    ) -> Result<(), ExchangeError> {
        let available = self.balance(holder, token);
        if available < amount {
            return Err(ExchangeError::InsufficientCollateral {
                requested: amount,
                available,
            });
        }
        Ok(())
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::{SuretyError, SuretyResult};
use crate::types::{Address, Amount};

/// Escrowed marketplace funds and the balances already paid out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Vault {
    balance: Amount,
    deposits: BTreeMap<Address, Amount>,
    paid_out: BTreeMap<Address, Amount>,
}

impl Vault {
    pub fn new() -> Self {
        Vault::default()
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn deposited_by(&self, depositor: &Address) -> Amount {
        self.deposits.get(depositor).copied().unwrap_or(0)
    }

    /// Total transferred to `recipient` so far.
    pub fn paid_to(&self, recipient: &Address) -> Amount {
        self.paid_out.get(recipient).copied().unwrap_or(0)
    }

    pub fn deposit(&mut self, depositor: Address, amount: Amount) -> SuretyResult<()> {
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(SuretyError::Overflow("vault deposit"))?;
        let deposited = self
            .deposited_by(&depositor)
            .checked_add(amount)
            .ok_or(SuretyError::Overflow("vault deposit"))?;
        self.balance = balance;
        self.deposits.insert(depositor, deposited);
        Ok(())
    }

    /// Checks that `amount` can be transferred without mutating anything.
    pub fn ensure_available(&self, amount: Amount) -> SuretyResult<()> {
        if amount > self.balance {
            return Err(SuretyError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        Ok(())
    }

    /// Debits the escrow and credits `recipient` in one step.
    pub fn transfer(&mut self, recipient: Address, amount: Amount) -> SuretyResult<()> {
        self.ensure_available(amount)?;
        let received = self
            .paid_to(&recipient)
            .checked_add(amount)
            .ok_or(SuretyError::Overflow("vault transfer"))?;
        self.balance -= amount;
        self.paid_out.insert(recipient, received);
        Ok(())
    }
}

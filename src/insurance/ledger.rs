use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::config::presets::PayoutMultiplier;
use crate::errors::{SuretyError, SuretyResult};
use crate::governance::flights::FlightRegistry;
use crate::governance::gate::OperationalGate;
use crate::insurance::vault::Vault;
use crate::ledger::events::{EventBuffer, SuretyEvent};
use crate::types::{Address, Amount, FlightStatus, RequestKey};

/// One passenger's cover for one flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsurancePolicy {
    pub passenger: Address,
    pub key: RequestKey,
    /// Cumulative premium paid
    pub premium: Amount,
    /// Credited payout, zero until the flight finalizes late due to the airline
    pub payout: Amount,
    pub withdrawn: bool,
}

impl InsurancePolicy {
    /// A policy is credited at most once: never after a withdrawal.
    fn is_creditable(&self) -> bool {
        self.payout == 0 && !self.withdrawn
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CreditSummary {
    pub policies: usize,
    pub total: Amount,
}

/// Sells cover, credits payouts on `StatusFinalized`, pays out on demand.
#[derive(Debug, Clone, Serialize)]
pub struct InsuranceLedger {
    policies: BTreeMap<RequestKey, BTreeMap<Address, InsurancePolicy>>,
    vault: Vault,
    purchase_cap: Amount,
    payout_multiplier: PayoutMultiplier,
}

impl InsuranceLedger {
    pub fn new(purchase_cap: Amount, payout_multiplier: PayoutMultiplier) -> Self {
        InsuranceLedger {
            policies: BTreeMap::new(),
            vault: Vault::new(),
            purchase_cap,
            payout_multiplier,
        }
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut Vault {
        &mut self.vault
    }

    pub fn policy(&self, passenger: &Address, key: &RequestKey) -> Option<&InsurancePolicy> {
        self.policies.get(key).and_then(|by_passenger| by_passenger.get(passenger))
    }

    pub fn policy_count(&self) -> usize {
        self.policies.values().map(|by_passenger| by_passenger.len()).sum()
    }

    pub fn total_premium(&self, key: &RequestKey) -> SuretyResult<Amount> {
        let mut total: Amount = 0;
        if let Some(by_passenger) = self.policies.get(key) {
            for policy in by_passenger.values() {
                total = total
                    .checked_add(policy.premium)
                    .ok_or(SuretyError::Overflow("premium total"))?;
            }
        }
        Ok(total)
    }

    /// Payouts credited for `key`, including those already withdrawn.
    pub fn total_credited(&self, key: &RequestKey) -> SuretyResult<Amount> {
        let mut total: Amount = 0;
        if let Some(by_passenger) = self.policies.get(key) {
            for policy in by_passenger.values() {
                let credited = if policy.withdrawn {
                    self.payout_multiplier.apply(policy.premium)?
                } else {
                    policy.payout
                };
                total = total
                    .checked_add(credited)
                    .ok_or(SuretyError::Overflow("credited total"))?;
            }
        }
        Ok(total)
    }

    pub fn purchase_insurance(
        &mut self,
        gate: &OperationalGate,
        flights: &FlightRegistry,
        key: &RequestKey,
        amount: Amount,
        passenger: Address,
        caller: Address,
        events: &mut EventBuffer,
    ) -> SuretyResult<Amount> {
        gate.require_operational()?;
        if caller != passenger {
            return Err(SuretyError::Unauthorized(format!(
                "{} cannot buy insurance for {}",
                caller, passenger
            )));
        }
        flights.require_open(key)?;
        if amount == 0 {
            return Err(SuretyError::InsufficientFunds {
                required: 1,
                available: 0,
            });
        }
        let previous = self.policy(&passenger, key).map_or(0, |p| p.premium);
        let premium = previous
            .checked_add(amount)
            .ok_or(SuretyError::Overflow("premium"))?;
        if premium > self.purchase_cap {
            return Err(SuretyError::PurchaseCapExceeded {
                cap: self.purchase_cap,
                attempted: premium,
            });
        }

        self.vault.deposit(passenger, amount)?;
        let policy = self
            .policies
            .entry(key.clone())
            .or_default()
            .entry(passenger)
            .or_insert_with(|| InsurancePolicy {
                passenger,
                key: key.clone(),
                premium: 0,
                payout: 0,
                withdrawn: false,
            });
        policy.premium = premium;

        info!("Passenger {} insured {} for {}", passenger, key, premium);
        events.emit(SuretyEvent::InsurancePurchased {
            passenger,
            airline: key.airline,
            flight: key.flight.clone(),
            timestamp: key.timestamp,
            premium,
        });
        Ok(premium)
    }

    /// Subscriber for `StatusFinalized`. Safe to call repeatedly for the same
    /// event: already credited or withdrawn policies are skipped.
    pub fn on_status_finalized(
        &mut self,
        gate: &OperationalGate,
        key: &RequestKey,
        status: FlightStatus,
        events: &mut EventBuffer,
    ) -> SuretyResult<CreditSummary> {
        gate.require_operational()?;
        if !status.is_airline_fault() {
            debug!("Status {} for {} carries no payout", status, key);
            return Ok(CreditSummary::default());
        }
        let Some(by_passenger) = self.policies.get_mut(key) else {
            return Ok(CreditSummary::default());
        };

        // compute every credit before applying any, so an overflow leaves
        // all policies untouched
        let mut credits = Vec::new();
        for policy in by_passenger.values().filter(|p| p.is_creditable()) {
            credits.push((policy.passenger, self.payout_multiplier.apply(policy.premium)?));
        }

        let mut summary = CreditSummary::default();
        for (passenger, payout) in credits {
            if let Some(policy) = by_passenger.get_mut(&passenger) {
                policy.payout = payout;
            }
            summary.policies += 1;
            summary.total = summary
                .total
                .checked_add(payout)
                .ok_or(SuretyError::Overflow("credit summary"))?;
            events.emit(SuretyEvent::PayoutCredited {
                passenger,
                airline: key.airline,
                flight: key.flight.clone(),
                timestamp: key.timestamp,
                amount: payout,
            });
        }
        if summary.policies > 0 {
            info!(
                "Credited {} policies for {} with {} in total",
                summary.policies, key, summary.total
            );
        }
        Ok(summary)
    }

    /// Zeroes the payout, then transfers it. Running out of escrow fails
    /// before anything is changed.
    pub fn withdraw_payout(
        &mut self,
        gate: &OperationalGate,
        passenger: Address,
        key: &RequestKey,
        caller: Address,
        events: &mut EventBuffer,
    ) -> SuretyResult<Amount> {
        gate.require_operational()?;
        if caller != passenger {
            return Err(SuretyError::Unauthorized(format!(
                "{} cannot withdraw for {}",
                caller, passenger
            )));
        }
        let payout = self
            .policy(&passenger, key)
            .ok_or_else(|| SuretyError::NotFound(format!("policy of {} for {}", passenger, key)))?
            .payout;
        if payout == 0 {
            return Err(SuretyError::InsufficientFunds {
                required: 1,
                available: 0,
            });
        }
        self.vault.ensure_available(payout)?;

        if let Some(policy) = self
            .policies
            .get_mut(key)
            .and_then(|by_passenger| by_passenger.get_mut(&passenger))
        {
            policy.payout = 0;
            policy.withdrawn = true;
        }
        self.vault.transfer(passenger, payout)?;

        info!("Passenger {} withdrew {} for {}", passenger, payout, key);
        events.emit(SuretyEvent::PayoutWithdrawn {
            passenger,
            amount: payout,
        });
        Ok(payout)
    }
}

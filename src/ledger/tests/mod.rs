pub mod operations_tests;

use crate::config::presets::MarketplaceParams;
use crate::consensus::randomness::RandomnessSource;
use crate::ledger::local::LocalLedger;
use crate::types::Address;

/// Always draws the same value: every oracle holds `[v, v+1, v+2]` and
/// every request dispatches index `v`.
pub struct ConstantRandomness(pub u32);

impl RandomnessSource for ConstantRandomness {
    fn next_below(&mut self, bound: u32) -> u32 {
        self.0 % bound
    }
}

pub fn owner() -> Address {
    Address::derived(0x00, 1)
}

pub fn airline(n: u64) -> Address {
    Address::derived(0xa1, n)
}

pub fn oracle(n: u64) -> Address {
    Address::derived(0x0c, n)
}

pub fn passenger(n: u64) -> Address {
    Address::derived(0xb0, n)
}

pub fn devnet_ledger() -> LocalLedger {
    LocalLedger::new(
        owner(),
        airline(1),
        &MarketplaceParams::devnet(),
        Box::new(ConstantRandomness(0)),
    )
}

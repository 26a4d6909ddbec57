use std::collections::HashSet;

use super::ScriptedRandomness;
use crate::consensus::oracle_registry::OracleRegistry;
use crate::consensus::randomness::RngRandomness;
use crate::errors::SuretyError;
use crate::governance::gate::OperationalGate;
use crate::types::Address;

const FEE: u128 = 1;

fn oracle(n: u64) -> Address {
    Address::derived(0x0c, n)
}

#[test]
fn test_register_assigns_three_distinct_indexes() {
    let gate = OperationalGate::new(Address::ZERO);
    let mut registry = OracleRegistry::new(FEE, 10);
    let mut randomness = RngRandomness::seeded(99);

    for n in 0..50 {
        let indexes = registry
            .register_oracle(&gate, oracle(n), FEE, oracle(n), &mut randomness)
            .unwrap();
        assert_eq!(indexes.iter().collect::<HashSet<_>>().len(), 3);
        assert!(indexes.iter().all(|i| *i < 10));
        assert_eq!(registry.get_my_indexes(&oracle(n)).unwrap(), indexes);
    }
    assert_eq!(registry.len(), 50);
}

#[test]
fn test_registration_preconditions() {
    let gate = OperationalGate::new(Address::ZERO);
    let mut registry = OracleRegistry::new(FEE, 10);
    let mut randomness = ScriptedRandomness::new(vec![0]);

    let cheap = registry.register_oracle(&gate, oracle(1), 0, oracle(1), &mut randomness);
    assert!(matches!(cheap, Err(SuretyError::InsufficientFunds { .. })));

    let impersonated = registry.register_oracle(&gate, oracle(1), FEE, oracle(2), &mut randomness);
    assert!(matches!(impersonated, Err(SuretyError::Unauthorized(_))));
    assert!(registry.is_empty());

    let indexes = registry
        .register_oracle(&gate, oracle(1), FEE, oracle(1), &mut randomness)
        .unwrap();
    assert_eq!(indexes, [0, 1, 2]);

    let again = registry.register_oracle(&gate, oracle(1), FEE, oracle(1), &mut randomness);
    assert!(matches!(again, Err(SuretyError::AlreadyRegistered(_))));
    // index set is unchanged by the rejected attempt
    assert_eq!(registry.get_my_indexes(&oracle(1)).unwrap(), [0, 1, 2]);
}

#[test]
fn test_unknown_oracle_has_no_indexes() {
    let registry = OracleRegistry::new(FEE, 10);
    assert!(matches!(
        registry.get_my_indexes(&oracle(7)),
        Err(SuretyError::NotFound(_))
    ));
    assert!(!registry.holds_index(&oracle(7), 0));
}

#[test]
fn test_index_holding_after_swaps() {
    let gate = OperationalGate::new(Address::ZERO);
    let mut registry = OracleRegistry::new(FEE, 10);
    registry
        .register_oracle(&gate, oracle(1), FEE, oracle(1), &mut ScriptedRandomness::new(vec![0]))
        .unwrap();
    // draws 5, 5, 5 pick 5, then 6 and 7 after the swaps
    registry
        .register_oracle(&gate, oracle(2), FEE, oracle(2), &mut ScriptedRandomness::new(vec![5]))
        .unwrap();

    assert_eq!(registry.get_my_indexes(&oracle(2)).unwrap(), [5, 6, 7]);
    assert!(registry.holds_index(&oracle(1), 1));
    assert!(!registry.holds_index(&oracle(1), 6));
    assert!(registry.holds_index(&oracle(2), 6));
    assert!(!registry.holds_index(&oracle(2), 9));
}

#[test]
fn test_closed_gate_blocks_registration() {
    let owner = Address::ZERO;
    let mut gate = OperationalGate::new(owner);
    gate.set_operational(false, owner).unwrap();
    let mut registry = OracleRegistry::new(FEE, 10);

    let result = registry.register_oracle(&gate, oracle(1), FEE, oracle(1), &mut RngRandomness::seeded(1));
    assert!(matches!(result, Err(SuretyError::NotOperational)));
    assert!(registry.is_empty());
}

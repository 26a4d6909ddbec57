use crate::errors::SuretyError;
use crate::governance::gate::OperationalGate;
use crate::types::Address;

#[test]
fn test_gate_starts_operational() {
    let gate = OperationalGate::new(Address::derived(0, 1));
    assert!(gate.is_operational());
    assert!(gate.require_operational().is_ok());
}

#[test]
fn test_only_owner_can_toggle() {
    let owner = Address::derived(0, 1);
    let mut gate = OperationalGate::new(owner);

    let denied = gate.set_operational(false, Address::derived(0, 2));
    assert!(matches!(denied, Err(SuretyError::Unauthorized(_))));
    assert!(gate.is_operational());

    assert!(gate.set_operational(false, owner).unwrap());
    assert!(!gate.is_operational());
    assert!(matches!(gate.require_operational(), Err(SuretyError::NotOperational)));

    // setting the same value again reports no change
    assert!(!gate.set_operational(false, owner).unwrap());
    assert!(gate.set_operational(true, owner).unwrap());
}

//! Hardening Tests
//!
//! Adversarial and property testing of the contract facade:
//! - Failure atomicity (no state change, no event, no credit)
//! - Ordering guards (no regression, no skipping, linked states)
//! - Withdrawal failure and replay
//! - Fuzz testing (proptest)
//! - Concurrent callers through `SharedSupplyChain`

use contracts::errors::FailureKind;
use contracts::rail::LocalRail;
use contracts::snapshot::ChainState;
use contracts::{Call, ContractError, SharedSupplyChain, SupplyChain};
use rust_decimal::Decimal;
use std::thread;
use types::asset::{AircraftState, EquipmentState};
use types::ids::{Identity, Serial, Upc};
use types::role::Role;

const OWNER: Identity = Identity::from_tag(0xb0);
const SUPPLIER: Identity = Identity::from_tag(0xb1);
const TRANSPORTER: Identity = Identity::from_tag(0xb2);
const MANUFACTURER: Identity = Identity::from_tag(0xb3);
const CUSTOMER: Identity = Identity::from_tag(0xb4);
const OUTSIDER: Identity = Identity::from_tag(0xbf);

fn setup_chain() -> SupplyChain {
    let mut chain = SupplyChain::deploy_local(OWNER);
    chain.add_role(&OWNER, Role::Supplier, SUPPLIER, "supplier").unwrap();
    chain.add_role(&OWNER, Role::Transporter, TRANSPORTER, "transporter").unwrap();
    chain.add_role(&OWNER, Role::Manufacturer, MANUFACTURER, "manufacturer").unwrap();
    chain.add_role(&OWNER, Role::Customer, CUSTOMER, "customer").unwrap();
    chain
}

fn order_aircraft(chain: &mut SupplyChain, equipment_id: Upc) -> Serial {
    let price = chain.config().aircraft_price;
    chain
        .order_aircraft(&Call::paying(CUSTOMER, price), equipment_id, MANUFACTURER)
        .unwrap()
        .serial
}

/// Drive one aircraft up to the point where its equipment is Received and
/// the structure is ready, returning the aircraft serial.
fn setup_ready_for_integration(chain: &mut SupplyChain) -> Serial {
    let upc = Upc::new(1);
    let serial = order_aircraft(chain, upc);
    let equipment_price = chain.config().equipment_price;
    let half_fee = chain.config().transport_installment();

    chain
        .order_equipment(&Call::paying(MANUFACTURER, equipment_price), upc, SUPPLIER, serial)
        .unwrap();
    chain
        .receive_component(&Call::new(SUPPLIER), Upc::new(2), "Bosch", "Aurich", upc)
        .unwrap();
    chain
        .process_component(&Call::new(SUPPLIER), Upc::new(2), "Augsburg", "Best Galley")
        .unwrap();
    chain
        .prepare_structure(&Call::new(MANUFACTURER), serial, "Hamburg", "A321")
        .unwrap();
    chain
        .pack_equipment(&Call::paying(SUPPLIER, half_fee), upc, TRANSPORTER)
        .unwrap();
    chain.transport_equipment(&Call::new(TRANSPORTER), upc).unwrap();
    chain
        .receive_equipment(&Call::paying(MANUFACTURER, half_fee), upc)
        .unwrap();
    serial
}

fn assert_unchanged(chain: &SupplyChain, before: &ChainState) {
    assert_eq!(&chain.capture(), before, "failed call must leave no trace");
}

// ═══════════════════════════════════════════════════════════════════
// Failure Atomicity
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_failed_calls_leave_state_untouched() {
    let mut chain = setup_chain();
    let serial = order_aircraft(&mut chain, Upc::new(1));
    let before = chain.capture();

    let attempts: Vec<Result<(), ContractError>> = vec![
        // wrong role
        chain
            .order_aircraft(&Call::paying(SUPPLIER, Decimal::ONE), Upc::new(1), MANUFACTURER)
            .map(drop),
        // recorded counterparty mismatch
        chain
            .prepare_structure(&Call::new(OWNER), serial, "x", "y")
            .map(drop),
        // wrong source state
        chain.receive_aircraft(&Call::new(CUSTOMER), serial).map(drop),
        // payment mismatch
        chain
            .order_equipment(&Call::paying(MANUFACTURER, Decimal::from(999)), Upc::new(1), SUPPLIER, serial)
            .map(drop),
        // unknown entity
        chain.transport_equipment(&Call::new(TRANSPORTER), Upc::new(42)).map(drop),
        // duplicate role
        chain.add_role(&OWNER, Role::Supplier, SUPPLIER, "again"),
    ];

    let kinds: Vec<FailureKind> = attempts
        .into_iter()
        .map(|r| r.unwrap_err().kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            FailureKind::Unauthorized,
            FailureKind::Unauthorized,
            FailureKind::InvalidState,
            FailureKind::PaymentMismatch,
            FailureKind::NotFound,
            FailureKind::DuplicateId,
        ]
    );
    assert_unchanged(&chain, &before);
}

#[test]
fn test_process_equipment_retry_does_not_duplicate_notes() {
    let mut chain = setup_chain();
    let serial = setup_ready_for_integration(&mut chain);
    let upc = Upc::new(1);

    // First attempt rejected: payment on a non-payable call
    let before = chain.capture();
    let err = chain
        .process_equipment(&Call::paying(MANUFACTURER, Decimal::ONE), upc, "No further notes")
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::PaymentMismatch);
    assert_unchanged(&chain, &before);

    // Retry succeeds, notes appended exactly once
    chain
        .process_equipment(&Call::new(MANUFACTURER), upc, "No further notes")
        .unwrap();
    let aircraft = chain.fetch_aircraft(serial).unwrap();
    assert_eq!(aircraft.notes, "A321, Assembly stage: No further notes");
    assert_eq!(aircraft.state, AircraftState::Assembled);

    // A third call fails on state and still does not touch the notes
    let err = chain
        .process_equipment(&Call::new(MANUFACTURER), upc, "No further notes")
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidState);
    assert_eq!(
        chain.fetch_aircraft(serial).unwrap().notes,
        "A321, Assembly stage: No further notes"
    );
}

#[test]
fn test_role_check_precedes_existence_check() {
    let mut chain = setup_chain();
    let err = chain
        .transport_equipment(&Call::new(OUTSIDER), Upc::new(42))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unauthorized);
}

#[test]
fn test_renounced_role_blocks_transitions() {
    let mut chain = setup_chain();
    chain.renounce_role(&CUSTOMER, Role::Customer).unwrap();
    let price = chain.config().aircraft_price;
    let err = chain
        .order_aircraft(&Call::paying(CUSTOMER, price), Upc::new(1), MANUFACTURER)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unauthorized);
}

// ═══════════════════════════════════════════════════════════════════
// Ordering Guards
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_equipment_cannot_be_ordered_twice_for_one_aircraft() {
    let mut chain = setup_chain();
    let serial = order_aircraft(&mut chain, Upc::new(1));
    let price = chain.config().equipment_price;
    chain
        .order_equipment(&Call::paying(MANUFACTURER, price), Upc::new(1), SUPPLIER, serial)
        .unwrap();
    let err = chain
        .order_equipment(&Call::paying(MANUFACTURER, price), Upc::new(1), SUPPLIER, serial)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::DuplicateId);
    assert_eq!(chain.pending_withdrawals(&SUPPLIER), price);
}

#[test]
fn test_integration_requires_received_equipment() {
    let mut chain = setup_chain();
    let serial = order_aircraft(&mut chain, Upc::new(1));
    let price = chain.config().equipment_price;
    chain
        .order_equipment(&Call::paying(MANUFACTURER, price), Upc::new(1), SUPPLIER, serial)
        .unwrap();
    chain
        .prepare_structure(&Call::new(MANUFACTURER), serial, "Hamburg", "A321")
        .unwrap();

    // Equipment still Ordered and unowned
    let err = chain
        .process_equipment(&Call::new(MANUFACTURER), Upc::new(1), "n")
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unauthorized);
    assert_eq!(
        chain.fetch_equipment(Upc::new(1)).unwrap().state,
        EquipmentState::Ordered
    );
}

#[test]
fn test_delivery_requires_assembly() {
    let mut chain = setup_chain();
    let serial = setup_ready_for_integration(&mut chain);
    let installment = chain.config().aircraft_installment();
    let err = chain
        .receive_aircraft(&Call::paying(CUSTOMER, installment), serial)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidState);
    assert_eq!(
        chain.fetch_aircraft(serial).unwrap().state,
        AircraftState::StructureReady
    );
}

#[test]
fn test_serials_not_consumed_by_failed_orders() {
    let mut chain = setup_chain();
    let _ = chain.order_aircraft(&Call::new(CUSTOMER), Upc::new(1), MANUFACTURER);
    assert_eq!(order_aircraft(&mut chain, Upc::new(1)), Serial::new(1));
    assert_eq!(order_aircraft(&mut chain, Upc::new(3)), Serial::new(2));
}

// ═══════════════════════════════════════════════════════════════════
// Withdrawals
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_rejected_transfer_restores_pending_balance() {
    let mut chain = setup_chain();
    order_aircraft(&mut chain, Upc::new(1));
    let credited = chain.pending_withdrawals(&MANUFACTURER);
    chain.rail_mut().reject(MANUFACTURER);

    let err = chain.withdraw(&MANUFACTURER).unwrap_err();
    assert_eq!(err.kind(), FailureKind::Internal);
    assert_eq!(chain.pending_withdrawals(&MANUFACTURER), credited);
    assert_eq!(chain.rail().balance_of(&MANUFACTURER), Decimal::ZERO);

    chain.rail_mut().accept(&MANUFACTURER);
    assert_eq!(chain.withdraw(&MANUFACTURER).unwrap(), credited);
}

#[test]
fn test_withdraw_without_balance_is_noop() {
    let mut chain = setup_chain();
    assert_eq!(chain.withdraw(&OUTSIDER).unwrap(), Decimal::ZERO);
    assert_eq!(chain.rail().balance_of(&OUTSIDER), Decimal::ZERO);
}

// ═══════════════════════════════════════════════════════════════════
// Fuzz Testing (proptest)
// ═══════════════════════════════════════════════════════════════════

mod fuzz {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum RoleOp {
        Grant(usize),
        Renounce(usize),
    }

    fn role_op() -> impl Strategy<Value = RoleOp> {
        prop_oneof![
            (0usize..4).prop_map(RoleOp::Grant),
            (0usize..4).prop_map(RoleOp::Renounce),
        ]
    }

    fn party(index: usize) -> Identity {
        Identity::from_tag(0xc0 + index as u8)
    }

    proptest! {
        /// Membership after any grant/renounce sequence equals the last
        /// successful operation on each identity.
        #[test]
        fn fuzz_role_net_effect(ops in prop::collection::vec(role_op(), 0..40)) {
            let mut chain = SupplyChain::deploy_local(OWNER);
            let mut expected = [false; 4];
            for op in ops {
                match op {
                    RoleOp::Grant(i) => {
                        let result = chain.add_role(&OWNER, Role::Supplier, party(i), "p");
                        prop_assert_eq!(result.is_ok(), !expected[i]);
                        expected[i] = true;
                    }
                    RoleOp::Renounce(i) => {
                        let result = chain.renounce_role(&party(i), Role::Supplier);
                        prop_assert_eq!(result.is_ok(), expected[i]);
                        expected[i] = false;
                    }
                }
            }
            for (i, held) in expected.iter().enumerate() {
                prop_assert_eq!(chain.has_role(Role::Supplier, &party(i)), *held);
            }
        }

        /// Any attached amount other than the exact price is rejected with
        /// no effect.
        #[test]
        fn fuzz_payment_mismatch_is_atomic(offset in -1_000_000i64..1_000_000i64) {
            prop_assume!(offset != 0);
            let mut chain = setup_chain();
            let before = chain.capture();
            let payment = chain.config().aircraft_price + Decimal::from(offset);
            let result = chain.order_aircraft(&Call::paying(CUSTOMER, payment), Upc::new(1), MANUFACTURER);
            prop_assert_eq!(result.unwrap_err().kind(), FailureKind::PaymentMismatch);
            prop_assert_eq!(chain.capture(), before);
        }

        /// Every unit attached is either pending for a payee, retained, or
        /// already withdrawn.
        #[test]
        fn fuzz_escrow_conservation(
            orders in 1usize..8,
            withdraw_first in any::<bool>(),
        ) {
            let mut chain = setup_chain();
            let price = chain.config().aircraft_price;
            let equipment_price = chain.config().equipment_price;
            let mut attached = Decimal::ZERO;

            for i in 0..orders {
                let upc = Upc::new(i as u64 + 1);
                let serial = order_aircraft(&mut chain, upc);
                attached += price;
                chain
                    .order_equipment(&Call::paying(MANUFACTURER, equipment_price), upc, SUPPLIER, serial)
                    .unwrap();
                attached += equipment_price;
                if withdraw_first && i == 0 {
                    chain.withdraw(&SUPPLIER).unwrap();
                }
            }

            let withdrawn = chain.rail().balance_of(&SUPPLIER);
            prop_assert_eq!(
                chain.total_pending() + chain.retained_funds() + withdrawn,
                attached
            );
            prop_assert_eq!(
                chain.pending_withdrawals(&MANUFACTURER),
                price * Decimal::from(orders as u64) / Decimal::TWO
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Concurrency
// ═══════════════════════════════════════════════════════════════════

#[test]
fn test_concurrent_orders_get_distinct_serials() {
    let shared = SharedSupplyChain::new(setup_chain());
    let price = shared.read(|chain| chain.config().aircraft_price).unwrap();

    let handles: Vec<_> = (0..4u64)
        .map(|worker| {
            let shared = shared.clone();
            thread::spawn(move || {
                (0..25u64)
                    .map(|i| {
                        let upc = Upc::new(worker * 100 + i + 1);
                        shared
                            .execute(|chain| {
                                chain.order_aircraft(&Call::paying(CUSTOMER, price), upc, MANUFACTURER)
                            })
                            .unwrap()
                            .serial
                            .value()
                    })
                    .collect::<Vec<u64>>()
            })
        })
        .collect();

    let mut serials: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    serials.sort_unstable();
    assert_eq!(serials, (1..=100).collect::<Vec<u64>>());

    shared
        .read(|chain| {
            assert_eq!(chain.ledger().aircraft_count(), 100);
            assert_eq!(
                chain.pending_withdrawals(&MANUFACTURER),
                price * Decimal::from(50)
            );
        })
        .unwrap();
}

#[test]
fn test_concurrent_withdrawals_pay_once() {
    let mut chain = setup_chain();
    order_aircraft(&mut chain, Upc::new(1));
    let credited = chain.pending_withdrawals(&MANUFACTURER);
    let shared: SharedSupplyChain<LocalRail> = SharedSupplyChain::new(chain);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || shared.execute(|chain| chain.withdraw(&MANUFACTURER)).unwrap())
        })
        .collect();
    let total: Decimal = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(total, credited);
    let paid = shared
        .read(|chain| chain.rail().balance_of(&MANUFACTURER))
        .unwrap();
    assert_eq!(paid, credited);
}

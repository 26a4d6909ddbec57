use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use flightsurety_core::ledger::{LedgerInterface, LocalLedger, Operation};
use flightsurety_core::{Address, FlightStatus, MarketplaceParams};

const DEPARTURE: u64 = 1_700_000_000;

fn airline() -> Address {
    Address::derived(0xa1, 1)
}

fn oracle(n: u64) -> Address {
    Address::derived(0x0c, n)
}

// Ledger with `oracles` registered oracles and one open request
fn ledger_with_request(oracles: u64) -> LocalLedger {
    let ledger = LocalLedger::seeded(Address::ZERO, airline(), &MarketplaceParams::devnet(), 42);
    for n in 0..oracles {
        ledger.submit(Operation::RegisterOracle, oracle(n), 1).unwrap();
    }
    ledger
        .submit(
            Operation::RequestStatus {
                airline: airline(),
                flight: "SV 1265".to_string(),
                timestamp: DEPARTURE,
            },
            Address::ZERO,
            0,
        )
        .unwrap();
    ledger
}

// Every oracle submits for every index, as the simulator does
fn submit_round(ledger: &LocalLedger, oracles: u64) -> usize {
    let mut accepted = 0;
    for n in 0..oracles {
        for index in 0..10u8 {
            let op = Operation::SubmitResponse {
                index,
                airline: airline(),
                flight: "SV 1265".to_string(),
                timestamp: DEPARTURE,
                status: FlightStatus::LateAirline.code(),
            };
            if ledger.submit(op, oracle(n), 0).is_ok() {
                accepted += 1;
            }
        }
    }
    accepted
}

pub fn benchmark_oracle_registration(c: &mut Criterion) {
    c.bench_function("register_20_oracles", |b| {
        b.iter_batched(
            || LocalLedger::seeded(Address::ZERO, airline(), &MarketplaceParams::devnet(), 42),
            |ledger| {
                for n in 0..20 {
                    black_box(ledger.submit(Operation::RegisterOracle, oracle(n), 1).unwrap());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn benchmark_response_round(c: &mut Criterion) {
    c.bench_function("response_round_20_oracles", |b| {
        b.iter_batched(
            || ledger_with_request(20),
            |ledger| black_box(submit_round(&ledger, 20)),
            BatchSize::SmallInput,
        )
    });
}

pub fn benchmark_state_root(c: &mut Criterion) {
    let ledger = ledger_with_request(20);
    submit_round(&ledger, 20);

    c.bench_function("state_root", |b| {
        b.iter(|| black_box(ledger.state_root().unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_oracle_registration,
    benchmark_response_round,
    benchmark_state_root
);
criterion_main!(benches);

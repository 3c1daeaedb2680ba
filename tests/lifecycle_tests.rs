//! End-to-end lifecycle tests on the logical clock.
//!
//! These drive full operation sequences through the public engine surface and
//! check the committed state, the event log, and replay determinism.

use exchange_core::*;

const TOKEN_A: TokenId = TokenId(1);
const TOKEN_B: TokenId = TokenId(2);
const RECEIPT: TokenId = TokenId(3);

const LP: TraderId = TraderId(1);
const TRADER: TraderId = TraderId(2);

const FAR: UnixTime = UnixTime(i64::MAX);

fn engine_with_pair(fee_bps: u16) -> (Engine, ExchangeId) {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(UnixTime::from_secs(0));
    let id = engine
        .create_exchange(
            TOKEN_A,
            TOKEN_B,
            RECEIPT,
            Bps::new(fee_bps).unwrap(),
            ExchangeParams::default(),
        )
        .unwrap();
    engine.deposit(LP, TOKEN_A, 1_000_000).unwrap();
    engine.deposit(LP, TOKEN_B, 1_000_000).unwrap();
    engine.deposit(TRADER, TOKEN_A, 1_000_000).unwrap();
    engine.deposit(TRADER, TOKEN_B, 1_000_000).unwrap();
    (engine, id)
}

#[test]
fn pool_lifecycle_from_first_bond_to_drained() {
    let (mut engine, id) = engine_with_pair(3);

    // initial bond sets the ratio and mints 1:1 against B
    let first = engine.bond(LP, id, 100, 50, 0, FAR).unwrap();
    assert_eq!(
        (first.amount_a, first.amount_b, first.receipt_minted),
        (100, 50, 50)
    );

    // second bond scales proportionally
    let second = engine.bond(LP, id, 150, 75, 0, FAR).unwrap();
    assert_eq!(
        (second.amount_a, second.amount_b, second.receipt_minted),
        (150, 75, 75)
    );
    let snap = engine.snapshot(id).unwrap();
    assert_eq!(
        (snap.reserve_a, snap.reserve_b, snap.receipt_supply),
        (250, 125, 125)
    );

    // a small B -> A swap at 3 bps: fee rounds the input down to 5,
    // out = 250 * 5 / 130 = 9
    let swap = engine
        .swap_input(TRADER, id, SwapDirection::BToA, 6, 0, FAR)
        .unwrap();
    assert_eq!(swap.amount_out, 9);
    let snap = engine.snapshot(id).unwrap();
    assert_eq!((snap.reserve_a, snap.reserve_b), (241, 131));
    assert_eq!(snap.last_price, 241 * PRICE_SCALE / 131);

    // burning the whole supply drains whatever the pool holds now
    let out = engine.unbond(LP, id, 125, FAR).unwrap();
    assert_eq!((out.amount_a, out.amount_b), (241, 131));
    let snap = engine.snapshot(id).unwrap();
    assert_eq!(
        (snap.reserve_a, snap.reserve_b, snap.receipt_supply),
        (0, 0, 0)
    );
}

#[test]
fn replaying_the_same_operations_yields_identical_state() {
    let run = || {
        let (mut engine, id) = engine_with_pair(30);
        engine.bond(LP, id, 500_000, 250_000, 0, FAR).unwrap();
        engine
            .swap_input(TRADER, id, SwapDirection::AToB, 10_000, 0, FAR)
            .unwrap();

        let obs = OracleObservation::new(2, 0, 0, engine.time());
        engine.update_oracle_price(id, obs).unwrap();
        let opened = engine
            .open_position(TRADER, id, Direction::Short, 50_000, 10_000, FAR)
            .unwrap();

        engine.advance_time(3_600);
        let obs = OracleObservation::new(1_900_000, 0, -6, engine.time());
        engine.update_oracle_price(id, obs).unwrap();
        engine.accrue_funding(id).unwrap();
        engine
            .close_position(TRADER, id, opened.position_id, FAR)
            .unwrap();

        let snapshot = engine.snapshot(id).unwrap();
        let events: Vec<String> = engine
            .events()
            .iter()
            .map(|e| serde_json::to_string(&e.payload).unwrap())
            .collect();
        (opened.position_id, snapshot, events)
    };

    let (id_a, snap_a, events_a) = run();
    let (id_b, snap_b, events_b) = run();

    assert_eq!(id_a, id_b);
    assert_eq!(snap_a, snap_b);
    assert_eq!(events_a, events_b);
}

#[test]
fn quotes_are_binding_for_the_next_trade() {
    let (mut engine, id) = engine_with_pair(30);
    engine.bond(LP, id, 300_000, 700_000, 0, FAR).unwrap();

    for amount in [1u64, 17, 999, 45_123] {
        let quote = engine.quote_input(id, SwapDirection::BToA, amount).unwrap();
        let result = engine
            .swap_input(TRADER, id, SwapDirection::BToA, amount, quote.amount_out, FAR)
            .unwrap();
        assert_eq!(result.amount_out, quote.amount_out, "amount={amount}");
    }
}

#[test]
fn every_mutation_lands_in_the_event_log() {
    let (mut engine, id) = engine_with_pair(30);
    engine.bond(LP, id, 100_000, 100_000, 0, FAR).unwrap();
    engine
        .swap_input(TRADER, id, SwapDirection::AToB, 500, 0, FAR)
        .unwrap();
    let obs = OracleObservation::new(1, 0, 0, engine.time());
    engine.update_oracle_price(id, obs).unwrap();
    let opened = engine
        .open_position(TRADER, id, Direction::Long, 5_000, 1_000, FAR)
        .unwrap();
    engine
        .close_position(TRADER, id, opened.position_id, FAR)
        .unwrap();

    let kinds: Vec<&str> = engine
        .events()
        .iter()
        .map(|e| match &e.payload {
            EventPayload::ExchangeCreated(_) => "created",
            EventPayload::Deposited(_) => "deposited",
            EventPayload::Bonded(_) => "bonded",
            EventPayload::SwapExecuted(_) => "swapped",
            EventPayload::OraclePriceUpdated(_) => "oracle",
            EventPayload::PositionOpened(_) => "opened",
            EventPayload::PositionClosed(_) => "closed",
            other => panic!("unexpected event {other:?}"),
        })
        .collect();

    assert_eq!(
        kinds,
        vec![
            "created", "deposited", "deposited", "deposited", "deposited", "bonded", "swapped",
            "oracle", "opened", "closed",
        ]
    );

    // event ids are strictly increasing
    let ids: Vec<u64> = engine.events().iter().map(|e| e.id.0).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn failed_operations_emit_nothing_and_mutate_nothing() {
    let (mut engine, id) = engine_with_pair(30);
    engine.bond(LP, id, 100_000, 100_000, 0, FAR).unwrap();

    let events_before = engine.events().len();
    let snap_before = engine.snapshot(id).unwrap();
    let balance_before = engine.balance_of(TRADER, TOKEN_A);

    engine.set_time(UnixTime::from_secs(100));
    assert!(engine
        .swap_input(TRADER, id, SwapDirection::AToB, 500, 0, UnixTime::from_secs(99))
        .is_err());
    assert!(engine
        .bond(TRADER, id, 10, 1_000_000_000, 0, FAR)
        .is_err());
    assert!(engine.unbond(TRADER, id, 1, FAR).is_err());
    assert!(engine
        .open_position(TRADER, id, Direction::Long, 5_000, 10, FAR)
        .is_err());

    assert_eq!(engine.events().len(), events_before);
    assert_eq!(engine.snapshot(id).unwrap(), snap_before);
    assert_eq!(engine.balance_of(TRADER, TOKEN_A), balance_before);
}

#[test]
fn stale_oracle_blocks_opens_until_refreshed() {
    let (mut engine, id) = engine_with_pair(30);
    engine.bond(LP, id, 200_000, 100_000, 0, FAR).unwrap();

    let obs = OracleObservation::new(2, 0, 0, engine.time());
    engine.update_oracle_price(id, obs).unwrap();
    engine.advance_time(3_600);

    // stale observation errors instead of silently falling back
    let err = engine
        .open_position(TRADER, id, Direction::Long, 5_000, 1_000, FAR)
        .unwrap_err();
    assert!(matches!(err, ExchangeError::StaleOracle { .. }));

    // a fresh observation heals it
    let obs = OracleObservation::new(2, 0, 0, engine.time());
    engine.update_oracle_price(id, obs).unwrap();
    assert!(engine
        .open_position(TRADER, id, Direction::Long, 5_000, 1_000, FAR)
        .is_ok());
}

#[test]
fn keeper_crank_is_deterministic() {
    let run = || {
        let (mut engine, id) = engine_with_pair(0);
        engine.bond(LP, id, 900_000, 900_000, 0, FAR).unwrap();
        engine
            .swap_input(LP, id, SwapDirection::AToB, 10, 0, FAR)
            .unwrap();
        engine
            .open_position(TRADER, id, Direction::Long, 10_000, 1_000, FAR)
            .unwrap();

        let keeper = Keeper::new(KeeperConfig {
            max_rounds: 55,
            poll_interval_secs: funding::SECONDS_PER_DAY,
            liquidator: TraderId(9),
        });
        let report = keeper.run(&mut engine, id).unwrap();
        (report.liquidations, engine.balance_of(TraderId(9), TOKEN_B))
    };

    let (liqs_a, reward_a) = run();
    let (liqs_b, reward_b) = run();
    assert_eq!(liqs_a, 1);
    assert_eq!((liqs_a, reward_a), (liqs_b, reward_b));
    assert!(reward_a > 0);
}

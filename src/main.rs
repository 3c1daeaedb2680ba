//! Exchange Engine Simulation.
//!
//! Walks the full lifecycle: bonding liquidity, swapping, leveraged positions,
//! funding accrual, and a keeper-driven liquidation, all on the logical clock.

use exchange_core::*;

const TOKEN_A: TokenId = TokenId(1);
const TOKEN_B: TokenId = TokenId(2);
const RECEIPT: TokenId = TokenId(3);

const LP: TraderId = TraderId(1);
const TRADER: TraderId = TraderId(2);
const KEEPER_ID: TraderId = TraderId(99);

const FAR: UnixTime = UnixTime(i64::MAX);
const PAIR_FEED: FeedId = 7;

/// Pyth-shaped stand-in feed: one pinned price per feed id, published "now".
struct SimFeed {
    feed: FeedId,
    price: i64,
    now: UnixTime,
}

impl PriceSource for SimFeed {
    fn get_price(&self, feed: FeedId) -> Option<OracleObservation> {
        if feed != self.feed {
            return None;
        }
        Some(OracleObservation::new(self.price, 0, -6, self.now))
    }
}

fn main() {
    println!("Exchange Engine Simulation");
    println!("Constant-Product Pool, Leveraged Positions, Keeper Crank\n");

    scenario_1_bond_and_unbond();
    scenario_2_swaps_and_quotes();
    scenario_3_position_lifecycle();
    scenario_4_funding_and_liquidation();

    println!("\nAll simulations completed successfully.");
}

fn fresh_engine() -> (Engine, ExchangeId) {
    let mut engine = Engine::new(EngineConfig::default());
    engine.set_time(UnixTime::from_secs(1_700_000_000));
    let id = engine
        .create_exchange(
            TOKEN_A,
            TOKEN_B,
            RECEIPT,
            Bps::new(30).expect("30 bps is in range"),
            ExchangeParams::default(),
        )
        .expect("token set is valid");

    engine.deposit(LP, TOKEN_A, 10_000_000).expect("deposit");
    engine.deposit(LP, TOKEN_B, 10_000_000).expect("deposit");
    engine.deposit(TRADER, TOKEN_A, 1_000_000).expect("deposit");
    engine.deposit(TRADER, TOKEN_B, 1_000_000).expect("deposit");
    (engine, id)
}

/// Bonding mints receipt proportionally; unbonding everything drains the pool.
fn scenario_1_bond_and_unbond() {
    println!("Scenario 1: Bond and Unbond\n");

    let (mut engine, id) = fresh_engine();

    let first = engine.bond(LP, id, 100, 50, 0, FAR).expect("initial bond");
    println!(
        "  Initial bond: {} A + {} B -> {} receipt",
        first.amount_a, first.amount_b, first.receipt_minted
    );

    let second = engine.bond(LP, id, 1_000, 75, 0, FAR).expect("second bond");
    println!(
        "  Second bond: {} A + {} B -> {} receipt (ratio preserved)",
        second.amount_a, second.amount_b, second.receipt_minted
    );

    let snap = engine.snapshot(id).expect("snapshot");
    println!(
        "  Pool: A={} B={} receipt supply={}",
        snap.reserve_a, snap.reserve_b, snap.receipt_supply
    );

    let out = engine
        .unbond(LP, id, snap.receipt_supply, FAR)
        .expect("full unbond");
    println!(
        "  Full unbond of {} receipt pays {} A + {} B, pool drained\n",
        out.receipt_burned, out.amount_a, out.amount_b
    );
}

/// Quotes are binding: trading immediately at the quoted bound never slips.
fn scenario_2_swaps_and_quotes() {
    println!("Scenario 2: Swaps and Quotes\n");

    let (mut engine, id) = fresh_engine();
    engine
        .bond(LP, id, 1_000_000, 500_000, 0, FAR)
        .expect("seed liquidity");

    let quote = engine
        .quote_input(id, SwapDirection::AToB, 10_000)
        .expect("quote");
    println!(
        "  Quote: 10_000 A -> {} B (30 bps fee on input)",
        quote.amount_out
    );

    let result = engine
        .swap_input(TRADER, id, SwapDirection::AToB, 10_000, quote.amount_out, FAR)
        .expect("swap at the quoted bound");
    println!(
        "  Executed: {} A in, {} B out, last price {}",
        result.amount_in, result.amount_out, result.last_price
    );

    let back = engine
        .quote_output(id, SwapDirection::BToA, 10_000)
        .expect("reverse quote");
    println!(
        "  Buying 10_000 A back would cost {} B (rounded up)\n",
        back.amount_in
    );
}

/// Open, mark to market, close. The pool is the counterparty.
fn scenario_3_position_lifecycle() {
    println!("Scenario 3: Position Lifecycle\n");

    let (mut engine, id) = fresh_engine();
    engine
        .bond(LP, id, 2_000_000, 1_000_000, 0, FAR)
        .expect("seed liquidity");
    push_oracle(&mut engine, id, 2_000_000);

    let opened = engine
        .open_position(TRADER, id, Direction::Long, 100_000, 20_000, FAR)
        .expect("5x long");
    println!(
        "  Opened {} {} notional at entry {} with {} equity",
        opened.direction, opened.amount, opened.entry_price, opened.equity
    );

    push_oracle(&mut engine, id, 2_100_000);
    let closed = engine
        .close_position(TRADER, id, opened.position_id, FAR)
        .expect("close");
    println!(
        "  Closed at {}: pnl {:+}, payout {} (paid from the B reserve)\n",
        closed.exit_price, closed.pnl, closed.payout
    );
}

/// A one-sided book pays funding until the keeper liquidates it.
fn scenario_4_funding_and_liquidation() {
    println!("Scenario 4: Funding and Keeper Liquidation\n");

    let (mut engine, id) = fresh_engine();
    engine
        .bond(LP, id, 2_000_000, 1_000_000, 0, FAR)
        .expect("seed liquidity");
    // one trade so the pool carries its own mark price
    engine
        .swap_input(LP, id, SwapDirection::AToB, 100, 0, FAR)
        .expect("seed trade");

    let opened = engine
        .open_position(TRADER, id, Direction::Long, 100_000, 10_000, FAR)
        .expect("10x long");
    println!(
        "  Opened one-sided long: {} notional on {} equity",
        opened.amount, opened.equity
    );

    let keeper = Keeper::new(KeeperConfig {
        max_rounds: 60,
        poll_interval_secs: funding::SECONDS_PER_DAY,
        liquidator: KEEPER_ID,
    });
    let report = keeper.run(&mut engine, id).expect("keeper crank");
    println!(
        "  Keeper ran {} rounds: {} liquidation(s), {} skipped",
        report.rounds_run, report.liquidations, report.skipped
    );
    println!(
        "  Keeper reward balance: {} B",
        engine.balance_of(KEEPER_ID, TOKEN_B)
    );

    let exchange = engine.exchange(id).expect("exchange");
    let position = exchange.position(opened.position_id).expect("record");
    println!("  Final position status: {:?}", position.status);

    println!("  Last events:");
    for event in engine.recent_events(3) {
        println!("    [{}] {:?}", event.timestamp.as_secs(), event.payload);
    }
}

fn push_oracle(engine: &mut Engine, id: ExchangeId, scaled: u64) {
    let feed = SimFeed {
        feed: PAIR_FEED,
        price: scaled as i64,
        now: engine.time(),
    };
    let obs = feed.get_price(PAIR_FEED).expect("feed knows this pair");
    engine.update_oracle_price(id, obs).expect("fresh observation");
}

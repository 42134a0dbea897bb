use std::{
    fs::File,
    io::{BufReader, Write},
};

use passive_fill_sim::{
    config::{ReplayConfig, SimConfig},
    errors::ReplayError,
    orderbook::OrderBook,
    price::PriceScaler,
    replay::{replay, replay_events},
    simulate,
};
use tempfile::tempdir;

const TAPE: &str = r#"# strategy rests a bid with unknown queue position
{"ts":1,"type":"add","id":1,"side":"buy","price":100.0,"qty":10}
{"ts":2,"type":"quote","side":"buy","price":100.0,"qty":5}
{"ts":3,"type":"trade","maker_side":"buy","price":100.0,"volume":8}
{"ts":4,"type":"add","id":2,"side":"sell","price":101.0,"qty":4,"rank":0}
{"ts":5,"type":"reduce","id":1,"delta":2}
{"ts":6,"type":"quote","side":"buy","price":101.5,"qty":1}
"#;

fn cfg() -> ReplayConfig {
    ReplayConfig {
        scale: 1,
        allow_unordered: false,
    }
}

#[test]
fn replays_event_file_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tape.jsonl");
    File::create(&path)
        .unwrap()
        .write_all(TAPE.as_bytes())
        .unwrap();

    let mut book = OrderBook::new();
    let reader = BufReader::new(File::open(&path).unwrap());
    let summary = replay(reader, &mut book, &cfg()).unwrap();

    assert_eq!(summary.events, 6);
    assert_eq!(summary.quotes, 2);
    assert_eq!(summary.trades, 1);
    assert_eq!(summary.order_events, 3);

    // rank 5 then a print of 8 leaves 3 for the bid
    let fills: Vec<(u64, u64, i64, i64)> = summary
        .fills
        .iter()
        .map(|tf| (tf.ts, tf.fill.order_id, tf.fill.price, tf.fill.quantity))
        .collect();
    assert_eq!(fills, vec![(3, 1, 100, 3), (6, 2, 101, 4)]);
    assert_eq!(summary.filled_qty, 7);

    assert_eq!(book.order(1).unwrap().quantity, 5);
    assert_eq!(summary.resting, 1);
}

#[test]
fn delivery_drops_resting_orders_but_keeps_fills() {
    let input = concat!(
        r#"{"ts":1,"type":"add","id":1,"side":"sell","price":100,"qty":4}"#,
        "\n",
        r#"{"ts":1,"type":"add","id":2,"side":"buy","price":95,"qty":3}"#,
        "\n",
        r#"{"ts":1,"type":"add","id":3,"side":"buy","price":94,"qty":3}"#,
        "\n",
        r#"{"ts":2,"type":"quote","side":"buy","price":100,"qty":1}"#,
        "\n",
        r#"{"ts":3,"type":"delivery"}"#,
        "\n",
        r#"{"ts":4,"type":"trade","maker_side":"buy","price":90,"volume":50}"#,
        "\n",
    );
    let mut book = OrderBook::new();
    let summary = replay(input.as_bytes(), &mut book, &cfg()).unwrap();

    assert_eq!(summary.order_events, 4);
    assert_eq!(summary.resting, 0);
    assert!(book.is_empty());
    assert!(book.is_consistent());

    // the ask swept before delivery is still reported, nothing fills after it
    assert_eq!(summary.fills.len(), 1);
    assert_eq!(summary.fills[0].ts, 2);
    assert_eq!(summary.fills[0].fill.order_id, 1);
    assert_eq!(summary.filled_qty, 4);
}

#[test]
fn out_of_order_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.jsonl");
    let mut f = File::create(&path).unwrap();
    writeln!(f, r#"{{"ts":10,"type":"cancel","id":1}}"#).unwrap();
    writeln!(f, r#"{{"ts":9,"type":"cancel","id":1}}"#).unwrap();
    drop(f);

    let mut book = OrderBook::new();
    let err = replay(
        BufReader::new(File::open(&path).unwrap()),
        &mut book,
        &cfg(),
    )
    .unwrap_err();
    assert!(matches!(err, ReplayError::OutOfOrder { line: 2, .. }));
}

#[test]
fn decimal_prices_are_scaled() {
    let input = concat!(
        r#"{"ts":1,"type":"add","id":7,"side":"sell","price":0.1234,"qty":0.5,"rank":0}"#,
        "\n",
        r#"{"ts":2,"type":"trade","maker_side":"sell","price":0.1234,"volume":0.2}"#,
        "\n",
    );
    let cfg = ReplayConfig {
        scale: 10_000,
        allow_unordered: false,
    };
    let mut book = OrderBook::new();
    let summary = replay(input.as_bytes(), &mut book, &cfg).unwrap();

    assert_eq!(summary.fills.len(), 1);
    assert_eq!(summary.fills[0].fill.price, 1234);
    assert_eq!(summary.fills[0].fill.quantity, 2000);
    assert_eq!(book.order(7).unwrap().quantity, 3000);
}

#[test]
fn synthetic_tape_replays_consistently() {
    let events = simulate::generate(&SimConfig {
        steps: 2_000,
        ..SimConfig::default()
    })
    .unwrap();
    let scaler = PriceScaler::default();

    let mut book = OrderBook::new();
    let first = replay_events(&events, &mut book, &scaler);
    assert!(book.is_consistent());

    let mut again = OrderBook::new();
    let second = replay_events(&events, &mut again, &scaler);
    assert_eq!(first, second);

    assert!(first.fills.iter().all(|tf| tf.fill.maker && tf.fill.quantity > 0));
    assert!(first.fills.windows(2).all(|w| w[0].ts <= w[1].ts));
}

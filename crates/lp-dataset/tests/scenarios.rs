//! End-to-end reconstruction scenarios through the public API.

use lp_dataset::{
    ActionRecord, DatasetBuilder, DatasetConfig, EventType, MarketSeries, MarketSnapshot,
    PeriodWindow,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const U1: &str = "0x1111111111111111111111111111111111111111";
const U2: &str = "0x2222222222222222222222222222222222222222";

fn snapshot(timestamp: i64, collateral_price: Decimal) -> MarketSnapshot {
    MarketSnapshot {
        timestamp,
        collateral_price,
        loan_asset_price: dec!(1),
        total_supply: dec!(5000000),
        total_borrow: dec!(3500000),
        utilization: 0.7,
        borrow_rate: 0.081,
        supply_rate: 0.054,
        volatility_6h: 0.012,
        drawdown_6h: -0.004,
    }
}

fn open_close_u1() -> Vec<ActionRecord> {
    vec![
        ActionRecord::new(U1, 1000, EventType::PositionOpen, dec!(100), dec!(50)),
        ActionRecord::new(U1, 5000, EventType::PositionClose, dec!(0), dec!(0)),
    ]
}

#[test]
fn test_hourly_open_close_ltv() {
    let market = MarketSeries::new(vec![snapshot(0, dec!(10))]);
    let builder = DatasetBuilder::new(DatasetConfig::default());

    let rows = builder.build_hourly(&open_close_u1(), &market).unwrap();

    let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 4600, 5000]);
    assert_eq!(rows[0].ltv, dec!(0.05));
    assert_eq!(rows[0].collateral_price, dec!(10));
    assert_eq!(rows[0].datetime.timestamp(), 1000);
    assert_eq!(rows[1].ltv, dec!(0.05));
    assert!(rows.last().unwrap().is_close());
}

#[test]
fn test_fine_step_hits_close_exactly() {
    let market = MarketSeries::new(vec![snapshot(0, dec!(10))]);
    let builder = DatasetBuilder::new(DatasetConfig::default().with_step_secs(1000));

    let rows = builder.build_hourly(&open_close_u1(), &market).unwrap();

    let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 2000, 3000, 4000, 5000]);
    assert_eq!(rows.iter().filter(|r| r.is_close()).count(), 1);
}

#[test]
fn test_grid_point_before_market_coverage_omitted() {
    let actions = vec![
        ActionRecord::new(U1, 500, EventType::PositionOpen, dec!(10), dec!(2)),
        ActionRecord::new(U1, 500 + 7200, EventType::PositionClose, dec!(0), dec!(0)),
    ];
    let market = MarketSeries::new(vec![snapshot(501, dec!(3))]);
    let builder = DatasetBuilder::new(DatasetConfig::default());

    let rows = builder.build_hourly(&actions, &market).unwrap();

    assert!(rows.iter().all(|r| r.timestamp != 500));
    let timestamps: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![4100, 7700]);
}

#[test]
fn test_market_series_carried_forward() {
    let actions = vec![
        ActionRecord::new(U1, 0, EventType::PositionOpen, dec!(10), dec!(5)),
        ActionRecord::new(U1, 4 * 3600, EventType::PositionClose, dec!(0), dec!(0)),
    ];
    let market = MarketSeries::new(vec![
        snapshot(0, dec!(1)),
        snapshot(5000, dec!(2)),
        snapshot(7300, dec!(4)),
    ]);
    let builder = DatasetBuilder::new(DatasetConfig::default());

    let rows = builder.build_hourly(&actions, &market).unwrap();

    let prices: Vec<Decimal> = rows.iter().map(|r| r.collateral_price).collect();
    assert_eq!(prices, vec![dec!(1), dec!(1), dec!(2), dec!(4), dec!(4)]);
    assert_eq!(rows[2].ltv, dec!(0.25));
}

#[test]
fn test_multi_user_output_order() {
    let mut actions = open_close_u1();
    actions.insert(
        0,
        ActionRecord::new(U2, 200, EventType::PositionOpen, dec!(1), dec!(0.5)),
    );
    actions.push(ActionRecord::new(U2, 300, EventType::Borrow, dec!(1), dec!(0.7)));
    actions.push(ActionRecord::new(U2, 900, EventType::PositionClose, dec!(0), dec!(0)));

    let market = MarketSeries::new(vec![snapshot(0, dec!(10))]);
    let builder = DatasetBuilder::new(DatasetConfig::default().with_parallel(true));

    let rows = builder.build_hourly(&actions, &market).unwrap();

    let keys: Vec<(&str, i64)> = rows
        .iter()
        .map(|r| (r.user_address.as_str(), r.timestamp))
        .collect();
    assert_eq!(
        keys,
        vec![(U1, 1000), (U1, 4600), (U1, 5000), (U2, 200), (U2, 900)]
    );
    assert_eq!(rows[4].action, Some(EventType::PositionClose));
}

#[test]
fn test_select_then_align() {
    let actions = vec![
        ActionRecord::new(U1, 100, EventType::Supply, dec!(5), dec!(0)),
        ActionRecord::new(U1, 1000, EventType::PositionOpen, dec!(100), dec!(50)),
        ActionRecord::new(U1, 5000, EventType::PositionClose, dec!(0), dec!(0)),
        ActionRecord::new(U1, 9000, EventType::Supply, dec!(7), dec!(0)),
        ActionRecord::new(U2, 80_000, EventType::PositionOpen, dec!(1), dec!(0)),
    ];
    let builder = DatasetBuilder::new(DatasetConfig::default());
    let window = PeriodWindow::new(0, 2000).unwrap();

    let selected = builder.select_period(&actions, &window);
    let timestamps: Vec<i64> = selected.iter().map(|a| a.timestamp).collect();
    assert_eq!(timestamps, vec![1000, 5000]);

    let market = MarketSeries::new(vec![snapshot(0, dec!(10))]);
    let rows = builder.build_hourly(&selected, &market).unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_open_position_reconstructed_until_truncation() {
    let actions = vec![
        ActionRecord::new(U1, 1_704_067_200, EventType::PositionOpen, dec!(2), dec!(1)),
        ActionRecord::new(U1, 1_704_070_000, EventType::Borrow, dec!(2), dec!(1.5)),
    ];
    let config = DatasetConfig::default()
        .with_truncation_date("2024-01-01 06:00:00")
        .unwrap();
    let market = MarketSeries::new(vec![snapshot(1_704_000_000, dec!(1))]);

    let rows = DatasetBuilder::new(config)
        .build_hourly(&actions, &market)
        .unwrap();

    assert_eq!(rows.len(), 7);
    assert_eq!(rows.last().unwrap().timestamp, 1_704_067_200 + 6 * 3600);
    assert_eq!(rows[1].action, Some(EventType::Borrow));
    assert_eq!(rows[1].debt, dec!(1.5));
    assert!(rows.iter().all(|r| !r.is_close()));
}

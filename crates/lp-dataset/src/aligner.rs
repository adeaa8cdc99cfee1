//! Hourly alignment of position state onto a fixed grid.
//!
//! Each user is reconstructed independently:
//!
//! 1. Normalize the action log ([`UserTimeline`])
//! 2. Bound the position ([`Lifecycle`])
//! 3. Walk the [`grid`] with a [`StateCursor`], joining the market snapshot
//!    in effect at every point
//!
//! Balances are step functions: a grid point inherits the state of the
//! latest action at or before it, never an interpolation.

use crate::config::DatasetConfig;
use crate::error::DatasetError;
use crate::market::MarketSeries;
use crate::timeline::{grid, Lifecycle, StateCursor, UserTimeline};
use chrono::DateTime;
use lp_types::{ActionRecord, HourlyRow};
use rayon::prelude::*;
use rust_decimal::Decimal;

/// Debt balances below this magnitude are reported as zero.
pub fn debt_dust() -> Decimal {
    Decimal::new(1, 6)
}

/// Collateral balances below this magnitude are reported as zero.
pub fn collateral_dust() -> Decimal {
    Decimal::new(1, 11)
}

fn clamp_dust(value: Decimal, threshold: Decimal) -> Decimal {
    if value.abs() < threshold {
        Decimal::ZERO
    } else {
        value
    }
}

/// Loan-to-value ratio of a position.
///
/// Returns zero when the collateral is worth nothing (or less). A ratio too
/// large for a `Decimal` saturates at `Decimal::MAX` (`Decimal::MIN` for a
/// negative debt value).
///
/// # Example
///
/// ```rust
/// use lp_dataset::loan_to_value;
/// use rust_decimal::Decimal;
///
/// let ltv = loan_to_value(Decimal::from(100), Decimal::from(50), Decimal::from(10), Decimal::ONE);
/// assert_eq!(ltv, Decimal::new(5, 2));
/// ```
pub fn loan_to_value(
    collateral: Decimal,
    debt: Decimal,
    collateral_price: Decimal,
    loan_price: Decimal,
) -> Decimal {
    if collateral.is_zero()
        || collateral_price.is_zero()
        || collateral.is_sign_negative() != collateral_price.is_sign_negative()
    {
        return Decimal::ZERO;
    }

    // Divide twice so a tiny collateral value never rounds to zero first.
    debt.checked_mul(loan_price)
        .and_then(|debt_value| debt_value.checked_div(collateral))
        .and_then(|ratio| ratio.checked_div(collateral_price))
        .unwrap_or_else(|| {
            tracing::warn!(
                "ltv overflow for debt {} at {} against collateral {} at {}, saturating",
                debt,
                loan_price,
                collateral,
                collateral_price
            );
            if debt.is_sign_negative() != loan_price.is_sign_negative() {
                Decimal::MIN
            } else {
                Decimal::MAX
            }
        })
}

/// Build the hourly dataset for every user in `actions`.
///
/// Rows are ordered by `(user_address, timestamp)`. Users without a
/// `position_open`, without an end (no close and no truncation), or without
/// market coverage contribute nothing.
///
/// # Errors
///
/// Fails on an invalid config, an action with an empty user address, or a
/// grid timestamp outside the datetime range.
pub fn build_hourly_dataset(
    actions: &[ActionRecord],
    market: &MarketSeries,
    config: &DatasetConfig,
) -> Result<Vec<HourlyRow>, DatasetError> {
    config.validate()?;
    let timelines = UserTimeline::group(actions)?;

    let per_user: Vec<Vec<HourlyRow>> = if config.parallel {
        timelines
            .par_iter()
            .map(|timeline| align_user(timeline, market, config))
            .collect::<Result<_, _>>()?
    } else {
        timelines
            .iter()
            .map(|timeline| align_user(timeline, market, config))
            .collect::<Result<_, _>>()?
    };

    Ok(per_user.into_iter().flatten().collect())
}

/// Reconstruct one user's position.
pub fn align_user(
    timeline: &UserTimeline,
    market: &MarketSeries,
    config: &DatasetConfig,
) -> Result<Vec<HourlyRow>, DatasetError> {
    let user = timeline.user_address();

    let Some(lifecycle) = timeline.lifecycle(config.truncation_ts) else {
        tracing::debug!("Skipping {}: no reconstructable position", user);
        return Ok(Vec::new());
    };

    let actions = timeline.bounded(&lifecycle);
    let rows = walk_grid(user, actions, &lifecycle, market, config.step_secs)?;

    tracing::debug!(
        "Aligned {} rows for {} ({} -> {}, closed: {})",
        rows.len(),
        user,
        lifecycle.open_ts,
        lifecycle.end_ts,
        lifecycle.closed
    );
    Ok(rows)
}

fn walk_grid(
    user: &str,
    actions: &[ActionRecord],
    lifecycle: &Lifecycle,
    market: &MarketSeries,
    step_secs: i64,
) -> Result<Vec<HourlyRow>, DatasetError> {
    let mut cursor = StateCursor::new(actions);
    let mut rows = Vec::new();

    for t in grid(lifecycle.open_ts, lifecycle.end_ts, step_secs) {
        // Advance before the market check so the cursor stays monotonic.
        let Some(state) = cursor.advance_to(t) else {
            tracing::warn!("No action at or before {} for {}, skipping point", t, user);
            continue;
        };
        let Some(snapshot) = market.at(t) else {
            continue;
        };

        let collateral = clamp_dust(state.collateral_after, collateral_dust());
        let debt = clamp_dust(state.debt_after, debt_dust());
        let action = (t - state.timestamp < step_secs).then(|| state.event_sequence_type.clone());

        let loan_asset_price = snapshot.effective_loan_price();
        let ltv = loan_to_value(collateral, debt, snapshot.collateral_price, loan_asset_price);

        let datetime =
            DateTime::from_timestamp(t, 0).ok_or_else(|| DatasetError::InvalidTimestamp {
                user: user.to_string(),
                timestamp: t,
            })?;

        let row = HourlyRow {
            user_address: user.to_string(),
            timestamp: t,
            datetime,
            collateral,
            debt,
            ltv,
            action,
            total_supply: snapshot.total_supply,
            total_borrow: snapshot.total_borrow,
            market_utilization: snapshot.utilization,
            borrow_rate: snapshot.borrow_rate,
            supply_rate: snapshot.supply_rate,
            collateral_price: snapshot.collateral_price,
            loan_asset_price,
            volatility_6h: snapshot.volatility_6h,
            drawdown_6h: snapshot.drawdown_6h,
        };

        let closed = row.is_close();
        rows.push(row);
        if closed {
            break;
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_types::{EventType, MarketSnapshot};
    use rust_decimal_macros::dec;

    fn snapshot(timestamp: i64, collateral_price: Decimal, loan_asset_price: Decimal) -> MarketSnapshot {
        MarketSnapshot {
            timestamp,
            collateral_price,
            loan_asset_price,
            total_supply: dec!(1000),
            total_borrow: dec!(400),
            utilization: 0.4,
            borrow_rate: 0.05,
            supply_rate: 0.02,
            volatility_6h: 0.1,
            drawdown_6h: -0.01,
        }
    }

    fn action(ts: i64, event: EventType, collateral: Decimal, debt: Decimal) -> ActionRecord {
        ActionRecord::new("0xu1", ts, event, collateral, debt)
    }

    #[test]
    fn test_loan_to_value() {
        assert_eq!(loan_to_value(dec!(100), dec!(50), dec!(10), dec!(1)), dec!(0.05));
        assert_eq!(loan_to_value(dec!(0), dec!(50), dec!(10), dec!(1)), dec!(0));
        assert_eq!(loan_to_value(dec!(100), dec!(50), dec!(0), dec!(1)), dec!(0));
        assert_eq!(loan_to_value(dec!(-1), dec!(50), dec!(10), dec!(1)), dec!(0));
        assert_eq!(loan_to_value(dec!(-1), dec!(50), dec!(-10), dec!(1)), dec!(5));
    }

    #[test]
    fn test_loan_to_value_tiny_collateral_value() {
        let tiny = dec!(0.000000000000001);
        assert_eq!(loan_to_value(tiny, tiny, tiny, dec!(1)), dec!(1000000000000000));
    }

    #[test]
    fn test_loan_to_value_saturates() {
        assert_eq!(loan_to_value(dec!(0.5), Decimal::MAX, dec!(1), dec!(1)), Decimal::MAX);
        assert_eq!(loan_to_value(dec!(0.5), Decimal::MIN, dec!(1), dec!(1)), Decimal::MIN);
    }

    #[test]
    fn test_ltv_overflow_keeps_other_users() {
        let actions = vec![
            ActionRecord::new("0xa", 0, EventType::PositionOpen, dec!(100), dec!(50)),
            ActionRecord::new("0xa", 10, EventType::PositionClose, dec!(0), dec!(0)),
            ActionRecord::new(
                "0xb",
                0,
                EventType::PositionOpen,
                dec!(0.0000000001),
                dec!(1000000000000000),
            ),
            ActionRecord::new("0xb", 10, EventType::PositionClose, dec!(0), dec!(0)),
        ];
        let market = MarketSeries::new(vec![snapshot(0, dec!(0.00001), dec!(1))]);

        for config in [DatasetConfig::default(), DatasetConfig::default().with_parallel(true)] {
            let rows = build_hourly_dataset(&actions, &market, &config).unwrap();
            assert_eq!(rows.len(), 4);
            assert_eq!(rows[0].user_address, "0xa");
            assert_eq!(rows[0].ltv, dec!(50000));
            assert_eq!(rows[2].user_address, "0xb");
            assert_eq!(rows[2].ltv, Decimal::MAX);
            assert!(rows[3].is_close());
        }
    }

    #[test]
    fn test_clamp_dust() {
        assert_eq!(clamp_dust(dec!(0.0000009), debt_dust()), dec!(0));
        assert_eq!(clamp_dust(dec!(-0.0000009), debt_dust()), dec!(0));
        assert_eq!(clamp_dust(dec!(0.000001), debt_dust()), dec!(0.000001));
        assert_eq!(clamp_dust(dec!(0.000000000009), collateral_dust()), dec!(0));
        assert_eq!(
            clamp_dust(dec!(0.00000000001), collateral_dust()),
            dec!(0.00000000001)
        );
    }

    #[test]
    fn test_open_close_scenario() {
        let actions = vec![
            action(1000, EventType::PositionOpen, dec!(100), dec!(50)),
            action(5000, EventType::PositionClose, dec!(0), dec!(0)),
        ];
        let market = MarketSeries::new(vec![snapshot(0, dec!(10), dec!(1))]);

        let rows = build_hourly_dataset(&actions, &market, &DatasetConfig::default()).unwrap();
        let ts: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(ts, vec![1000, 4600, 5000]);

        assert_eq!(rows[0].ltv, dec!(0.05));
        assert_eq!(rows[0].action, Some(EventType::PositionOpen));
        assert_eq!(rows[1].action, None);
        assert_eq!(rows[1].collateral, dec!(100));
        assert_eq!(rows[1].debt, dec!(50));
        assert!(rows[2].is_close());
        assert_eq!(rows[2].ltv, dec!(0));
    }

    #[test]
    fn test_missing_market_coverage_drops_points() {
        let actions = vec![
            action(500, EventType::PositionOpen, dec!(10), dec!(1)),
            action(500 + 3 * 3600, EventType::PositionClose, dec!(0), dec!(0)),
        ];
        let market = MarketSeries::new(vec![snapshot(3000, dec!(2), dec!(1))]);

        let rows = build_hourly_dataset(&actions, &market, &DatasetConfig::default()).unwrap();
        let ts: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(ts, vec![4100, 7700, 11300]);
        // State still comes from the open.
        assert_eq!(rows[0].collateral, dec!(10));
        assert!(rows[2].is_close());
    }

    #[test]
    fn test_label_window_and_carry_forward() {
        let actions = vec![
            action(0, EventType::PositionOpen, dec!(10), dec!(0)),
            action(3700, EventType::Borrow, dec!(10), dec!(4)),
            action(4 * 3600, EventType::PositionClose, dec!(0), dec!(0)),
        ];
        let market = MarketSeries::new(vec![snapshot(0, dec!(1), dec!(1))]);

        let rows = build_hourly_dataset(&actions, &market, &DatasetConfig::default()).unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.action_label()).collect();
        assert_eq!(
            labels,
            vec!["position_open", "none", "borrow", "none", "position_close"]
        );
        assert_eq!(rows[1].debt, dec!(0));
        assert_eq!(rows[2].debt, dec!(4));
        assert_eq!(rows[3].debt, dec!(4));
    }

    #[test]
    fn test_loan_price_substitution() {
        let actions = vec![
            action(0, EventType::PositionOpen, dec!(10), dec!(5)),
            action(100, EventType::PositionClose, dec!(0), dec!(0)),
        ];
        let market = MarketSeries::new(vec![snapshot(0, dec!(1), dec!(-3))]);

        let rows = build_hourly_dataset(&actions, &market, &DatasetConfig::default()).unwrap();
        assert_eq!(rows[0].loan_asset_price, dec!(1));
        assert_eq!(rows[0].ltv, dec!(0.5));
    }

    #[test]
    fn test_no_close_needs_truncation() {
        let actions = vec![action(0, EventType::PositionOpen, dec!(10), dec!(5))];
        let market = MarketSeries::new(vec![snapshot(0, dec!(1), dec!(1))]);

        let rows = build_hourly_dataset(&actions, &market, &DatasetConfig::default()).unwrap();
        assert!(rows.is_empty());

        let config = DatasetConfig::default().with_truncation_ts(7200);
        let rows = build_hourly_dataset(&actions, &market, &config).unwrap();
        let ts: Vec<i64> = rows.iter().map(|r| r.timestamp).collect();
        assert_eq!(ts, vec![0, 3600, 7200]);
        assert!(rows.iter().all(|r| !r.is_close()));
    }

    #[test]
    fn test_user_without_open_skipped() {
        let actions = vec![
            action(0, EventType::Supply, dec!(10), dec!(0)),
            action(100, EventType::PositionClose, dec!(0), dec!(0)),
        ];
        let market = MarketSeries::new(vec![snapshot(0, dec!(1), dec!(1))]);

        let config = DatasetConfig::default().with_truncation_ts(10_000);
        assert!(build_hourly_dataset(&actions, &market, &config)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_dust_balances_reported_as_zero() {
        let actions = vec![
            action(0, EventType::PositionOpen, dec!(0.000000000001), dec!(0.0000001)),
            action(10, EventType::PositionClose, dec!(0), dec!(0)),
        ];
        let market = MarketSeries::new(vec![snapshot(0, dec!(1), dec!(1))]);

        let rows = build_hourly_dataset(&actions, &market, &DatasetConfig::default()).unwrap();
        assert_eq!(rows[0].collateral, dec!(0));
        assert_eq!(rows[0].debt, dec!(0));
        assert_eq!(rows[0].ltv, dec!(0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut actions = Vec::new();
        for (i, user) in ["0xc", "0xa", "0xb"].iter().enumerate() {
            let base = i as i64 * 100;
            actions.push(ActionRecord::new(*user, base, EventType::PositionOpen, dec!(10), dec!(1)));
            actions.push(ActionRecord::new(*user, base + 9000, EventType::Repay, dec!(10), dec!(0)));
            actions.push(ActionRecord::new(
                *user,
                base + 20_000,
                EventType::PositionClose,
                dec!(0),
                dec!(0),
            ));
        }
        let market = MarketSeries::new(vec![snapshot(0, dec!(3), dec!(1))]);

        let sequential =
            build_hourly_dataset(&actions, &market, &DatasetConfig::default()).unwrap();
        let parallel = build_hourly_dataset(
            &actions,
            &market,
            &DatasetConfig::default().with_parallel(true),
        )
        .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(sequential.first().unwrap().user_address, "0xa");
        assert_eq!(sequential.last().unwrap().user_address, "0xc");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DatasetConfig::default().with_step_secs(0);
        let result = build_hourly_dataset(&[], &MarketSeries::default(), &config);
        assert!(matches!(result, Err(DatasetError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_user_rejected() {
        let actions = vec![ActionRecord::new("", 0, EventType::PositionOpen, dec!(1), dec!(0))];
        let result = build_hourly_dataset(&actions, &MarketSeries::default(), &DatasetConfig::default());
        assert!(matches!(result, Err(DatasetError::MalformedAction { index: 0, .. })));
    }
}

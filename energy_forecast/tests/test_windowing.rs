mod common;

use energy_forecast::schema::{DAY_AHEAD_PRICE, SOLAR};
use energy_forecast::windowing::{batches, build_windows};
use energy_forecast::ForecastError;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_hundred_rows_window_ten() {
    let (_, scaled, _) = common::scaled_table(100);
    let pairs = build_windows(&scaled, 10).unwrap();

    assert_eq!(pairs.len(), 90);
    assert_eq!(pairs[0].next, scaled.targets(10).unwrap());
    assert_eq!(pairs[89].next, scaled.targets(99).unwrap());
    assert_eq!(pairs[89].past.last().unwrap().as_slice(), scaled.row(98).unwrap());
}

#[rstest]
#[case(20, 1)]
#[case(20, 7)]
#[case(20, 19)]
#[case(20, 20)]
#[case(48, 32)]
fn test_pair_count_and_coverage(#[case] rows: usize, #[case] window_len: usize) {
    let (_, scaled, _) = common::scaled_table(rows);
    let pairs = build_windows(&scaled, window_len).unwrap();

    assert_eq!(pairs.len(), rows.saturating_sub(window_len));
    for (i, pair) in pairs.iter().enumerate() {
        assert_eq!(pair.start, i);
        assert_eq!(pair.window_len(), window_len);
        assert_eq!(pair.past.as_slice(), &scaled.rows()[i..i + window_len]);
        assert_eq!(pair.next, scaled.targets(i + window_len).unwrap());
    }
}

#[test]
fn test_next_follows_schema_names() {
    let (_, scaled, _) = common::scaled_table(12);
    let pairs = build_windows(&scaled, 4).unwrap();
    let schema = scaled.schema();

    let solar = schema.target_index(SOLAR).unwrap();
    let price = schema.target_index(DAY_AHEAD_PRICE).unwrap();
    assert_eq!(pairs[3].next[solar], scaled.column(SOLAR).unwrap()[7]);
    assert_eq!(pairs[3].next[price], scaled.column(DAY_AHEAD_PRICE).unwrap()[7]);
}

#[test]
fn test_windowing_is_repeatable() {
    let (_, scaled, _) = common::scaled_table(64);

    let first = build_windows(&scaled, 16).unwrap();
    let second = build_windows(&scaled, 16).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_short_table_is_rejected() {
    let (_, scaled, _) = common::scaled_table(5);

    assert!(matches!(
        build_windows(&scaled, 6),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[test]
fn test_batches_cover_all_pairs() {
    let (_, scaled, _) = common::scaled_table(50);
    let pairs = build_windows(&scaled, 10).unwrap();
    let batched = batches(&pairs, 16).unwrap();

    assert_eq!(batched.len(), 3);
    assert_eq!(batched.iter().map(|b| b.len()).sum::<usize>(), 40);
    assert_eq!(batched[1].pairs()[0], pairs[16]);
}

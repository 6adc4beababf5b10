use lazymarket::indicators::{round2, rsi, sma, IndicatorSet};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn rsi_is_bounded(closes in prop::collection::vec(0.01f64..100_000.0, 15..120)) {
        let value = rsi(&closes, 14).unwrap();
        prop_assert!((0.0..=100.0).contains(&value), "rsi={}", value);
    }

    #[test]
    fn short_series_have_no_indicator(closes in prop::collection::vec(0.01f64..100_000.0, 0..14), period in 1usize..60) {
        if closes.len() < period {
            prop_assert!(sma(&closes, period).is_none());
        }
        prop_assert!(rsi(&closes, 14).is_none());
    }

    #[test]
    fn sma_lies_within_window_range(closes in prop::collection::vec(0.01f64..100_000.0, 1..120), period in 1usize..60) {
        prop_assume!(closes.len() >= period);
        let window = &closes[closes.len() - period..];
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let value = sma(&closes, period).unwrap();
        prop_assert!(value >= min - 1e-6 && value <= max + 1e-6);
    }

    #[test]
    fn non_decreasing_series_is_fully_overbought(
        start in 0.01f64..1_000.0,
        steps in prop::collection::vec(0.0f64..50.0, 14..80),
    ) {
        let closes: Vec<f64> = steps
            .iter()
            .scan(start, |acc, step| {
                *acc += step;
                Some(*acc)
            })
            .collect::<Vec<_>>();
        let closes: Vec<f64> = std::iter::once(start).chain(closes).collect();

        prop_assert_eq!(rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn standard_set_reports_last_close(closes in prop::collection::vec(0.01f64..100_000.0, 1..120)) {
        let set = IndicatorSet::standard(&closes);
        prop_assert_eq!(set.latest_price, *closes.last().unwrap());
        prop_assert_eq!(set.sma.len(), 3);
        prop_assert_eq!(set.rsi.len(), 1);
    }

    #[test]
    fn round2_is_within_half_a_cent(value in -1_000_000.0f64..1_000_000.0) {
        prop_assert!((round2(value) - value).abs() <= 0.005 + 1e-9);
    }
}

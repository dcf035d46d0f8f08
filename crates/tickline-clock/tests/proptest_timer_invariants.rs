//! Property-based invariant tests for the frame timer.
//!
//! 1. `elapsed_at_least(T)` is true iff the simulated elapsed time D >= T.
//! 2. One nanosecond short of the threshold is never enough.
//! 3. Queries never move the timer's start instant.
//! 4. `nanos_since` agrees with plain integer arithmetic on total nanos.
//! 5. A ticker polled after every advance counts exactly one tick per
//!    crossed period when advances are smaller than the period.

use proptest::prelude::*;
use tickline_clock::{FrameTimer, ManualClock, NANOS_PER_SEC, Ticker, Timespec};

// ── Strategies ────────────────────────────────────────────────────────────

fn start_strategy() -> impl Strategy<Value = Timespec> {
    (0i64..=1_000_000_000, 0u32..1_000_000_000)
        .prop_map(|(s, n)| Timespec::new(s, n))
}

// Up to ~11.5 days of elapsed time, well past the multi-hour requirement.
const MAX_SPAN: u64 = 1_000_000 * NANOS_PER_SEC;

proptest! {
    #[test]
    fn elapsed_matches_threshold(
        start in start_strategy(),
        elapsed in 0u64..=MAX_SPAN,
        threshold in 0u64..=MAX_SPAN,
    ) {
        let clock = ManualClock::new(start);
        let timer = FrameTimer::start(clock.clone()).unwrap();
        clock.advance_nanos(elapsed);
        prop_assert_eq!(timer.elapsed_at_least(threshold).unwrap(), elapsed >= threshold);
    }

    #[test]
    fn one_nanosecond_short_is_not_elapsed(
        start in start_strategy(),
        threshold in 1u64..=MAX_SPAN,
    ) {
        let clock = ManualClock::new(start);
        let timer = FrameTimer::start(clock.clone()).unwrap();
        clock.advance_nanos(threshold - 1);
        prop_assert!(!timer.elapsed_at_least(threshold).unwrap());
        clock.advance_nanos(1);
        prop_assert!(timer.elapsed_at_least(threshold).unwrap());
    }

    #[test]
    fn queries_do_not_move_start(
        start in start_strategy(),
        steps in proptest::collection::vec((0u64..=NANOS_PER_SEC, 0u64..=NANOS_PER_SEC), 1..16),
    ) {
        let clock = ManualClock::new(start);
        let timer = FrameTimer::start(clock.clone()).unwrap();
        for (advance, threshold) in steps {
            clock.advance_nanos(advance);
            let _ = timer.elapsed_at_least(threshold).unwrap();
            prop_assert_eq!(timer.started(), start);
        }
    }

    #[test]
    fn nanos_since_matches_total_nanos(a in start_strategy(), b in start_strategy()) {
        let total = |t: Timespec| {
            i128::from(t.secs()) * i128::from(NANOS_PER_SEC) + i128::from(t.subsec_nanos())
        };
        prop_assert_eq!(b.nanos_since(a), total(b) - total(a));
    }

    #[test]
    fn ticker_counts_crossed_periods(
        period in 2u64..=1_000_000,
        advances in proptest::collection::vec(1u64..=1_000_000, 1..64),
    ) {
        let clock = ManualClock::new(Timespec::ZERO);
        let mut ticker = Ticker::new(clock.clone(), period).unwrap();

        // Model: time since the last observed tick.
        let mut since = 0u64;
        let mut expected = 0u64;
        for step in advances {
            let step = step % period; // never jump a whole period at once
            clock.advance_nanos(step);
            since += step;
            let fired = ticker.poll().unwrap();
            if since >= period {
                expected += 1;
                since = 0;
                prop_assert!(fired);
            } else {
                prop_assert!(!fired);
            }
        }
        prop_assert_eq!(ticker.ticks(), expected);
    }
}

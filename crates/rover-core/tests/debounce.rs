//! Property tests for the asymmetric mode debounce.

use proptest::prelude::*;
use rover_core::{Mode, ModeMachine};
use std::time::Duration;

const THRESHOLD_MS: u64 = 2000;

proptest! {
    // For every sample sequence, the mode is Degraded exactly when the
    // last sample was negative and the elapsed time since the last
    // positive sample exceeds the threshold at evaluation time.
    #[test]
    fn mode_matches_staleness_iff(
        steps in prop::collection::vec((1_u64..4000, any::<bool>()), 1..64)
    ) {
        let mut machine = ModeMachine::new(Duration::from_millis(THRESHOLD_MS));
        // Contact confirmed at t = 0, as a primed monitor would report.
        let mut now_ms = 0_u64;
        let mut last_true_ms = 0_u64;

        for (dt, signal) in steps {
            now_ms += dt;
            if signal {
                last_true_ms = now_ms;
            }
            let staleness = Duration::from_millis(now_ms - last_true_ms);
            machine.evaluate(signal, Some(staleness));

            let expect_degraded = !signal && staleness.as_millis() as u64 > THRESHOLD_MS;
            prop_assert_eq!(
                machine.mode(),
                if expect_degraded { Mode::Degraded } else { Mode::Connected },
                "signal={} staleness={}ms", signal, now_ms - last_true_ms
            );
        }
    }

    // Recovery never needs more than the one positive sample.
    #[test]
    fn one_positive_sample_always_recovers(outage_ms in 2001_u64..1_000_000) {
        let mut machine = ModeMachine::new(Duration::from_millis(THRESHOLD_MS));
        machine.evaluate(false, Some(Duration::from_millis(outage_ms)));
        prop_assert_eq!(machine.mode(), Mode::Degraded);

        machine.evaluate(true, Some(Duration::ZERO));
        prop_assert_eq!(machine.mode(), Mode::Connected);
    }
}

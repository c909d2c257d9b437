//! Jittered pause between endpoint failovers.

use rand::Rng;
use std::time::Duration;

/// Growth cap: the pause never exceeds `base * MAX_FACTOR`.
const MAX_FACTOR: u64 = 8;

/// Delay before the `failovers`-th endpoint switch within one sweep.
///
/// Zero failovers or a zero base means no pause. The delay doubles per
/// failover up to the cap, plus up to 10% jitter.
pub fn failover_delay(failovers: u32, base_ms: u64) -> Duration {
    if failovers == 0 || base_ms == 0 {
        return Duration::ZERO;
    }

    let growth = 2u64.saturating_pow(failovers - 1).min(MAX_FACTOR);
    let delay_ms = base_ms.saturating_mul(growth);

    let jitter_range = delay_ms / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(delay_ms + jitter)
}

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::temporal::TemporalAnchor;

struct ClockState {
    physical_ms: u64,
    logical: u32,
}

/// Hybrid Logical Clock stamping commits and review events.
///
/// Every call to [`now`](Self::now) returns an anchor strictly greater than
/// any previous one from the same clock, even when the wall clock stalls or
/// steps backwards. Commit ids fold the timestamp in, so this is what keeps
/// two identical saves apart.
pub struct HybridLogicalClock {
    node_id: u16,
    state: Mutex<ClockState>,
}

impl HybridLogicalClock {
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id,
            state: Mutex::new(ClockState {
                physical_ms: 0,
                logical: 0,
            }),
        }
    }

    /// Generate a new monotonic timestamp for a local event.
    pub fn now(&self) -> TemporalAnchor {
        let wall = wall_clock_ms();
        let mut state = self.state.lock().expect("clock mutex poisoned");

        let physical = wall.max(state.physical_ms);
        let logical = if physical > state.physical_ms {
            0
        } else {
            state.logical + 1
        };

        state.physical_ms = physical;
        state.logical = logical;

        TemporalAnchor::new(physical, logical, self.node_id)
    }

    pub fn node_id(&self) -> u16 {
        self.node_id
    }
}

impl std::fmt::Debug for HybridLogicalClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridLogicalClock")
            .field("node_id", &self.node_id)
            .finish()
    }
}

fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

//! Two replicas diverge, then converge through a merge
//!
//! Run with:
//! ```bash
//! LWWSET_LOG_LEVEL=debug cargo run --example replica_demo
//! ```

use lwwset_core::logging::init_logging_with_config;
use lwwset_core::{Clock, Config, LwwElementSet};
use tracing::info;

fn main() {
    let config = Config::from_env().expect("Invalid LWWSET_* environment");
    let log_config = config.logging.to_log_config().expect("Invalid logging config");
    init_logging_with_config(log_config).expect("Failed to initialize logging");

    lwwset_core::metrics::init_metrics();

    let clock = config.clock.build();
    info!(clock = config.clock.kind.as_str(), "Replicas starting");

    let laptop = LwwElementSet::new();
    let phone = LwwElementSet::new();

    laptop.add_now("milk", &clock);
    laptop.add_now("eggs", &clock);
    phone.add_now("bread", &clock);

    // phone crossed milk off after the laptop added it
    phone.remove("milk", clock.now());

    info!(laptop = ?sorted(&laptop), phone = ?sorted(&phone), "Before merge");

    laptop.merge(&phone);
    phone.merge(&laptop);

    info!(members = ?sorted(&laptop), converged = laptop.equal(&phone), "After merge");

    for (element, state) in laptop.to_map() {
        info!(element, removed = state.is_removed, updated_at = %state.updated_at, "Entry");
    }
}

fn sorted(set: &LwwElementSet<&'static str>) -> Vec<&'static str> {
    let mut elements = set.elements();
    elements.sort_unstable();
    elements
}

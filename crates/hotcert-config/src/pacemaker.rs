//! Leader-election policy handed to the (externally supplied) consensus
//! engine; the coordinator only carries this value through to whatever
//! engine wiring the server binary constructs.

use serde::{Deserialize, Serialize};

/// Leader-election strategy for the consensus engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PacemakerPolicy {
    /// A single fixed leader (`leader-id`) for the lifetime of the run.
    Fixed,
    /// Leadership rotates across replicas on each view change.
    RoundRobin,
}

impl Default for PacemakerPolicy {
    fn default() -> Self {
        Self::Fixed
    }
}

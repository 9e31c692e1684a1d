//! Sync lane definitions
//!
//! Three cadences cover the horizon: a fine lane refreshing today often,
//! a medium lane for the coming week, and a coarse lane for the 30-day
//! outlook. The two wider lanes walk their window in 3-day chunks so a
//! cancellation lands at a chunk boundary.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::models::FetchWindow;
use crate::sync::window::{month_window, today_window, week_window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    Fine,
    Medium,
    Coarse,
}

impl Lane {
    pub const ALL: [Lane; 3] = [Lane::Fine, Lane::Medium, Lane::Coarse];

    /// Stable name used in state maps, logs and metrics labels.
    pub fn name(&self) -> &'static str {
        match self {
            Lane::Fine => "fine",
            Lane::Medium => "medium",
            Lane::Coarse => "coarse",
        }
    }

    /// Cadence between executions.
    pub fn interval(&self) -> Duration {
        match self {
            Lane::Fine => Duration::from_secs(15 * 60),
            Lane::Medium => Duration::from_secs(4 * 60 * 60),
            Lane::Coarse => Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Window covered by one execution, anchored at today.
    pub fn window(&self) -> FetchWindow {
        match self {
            Lane::Fine => today_window(),
            Lane::Medium => week_window(),
            Lane::Coarse => month_window(),
        }
    }

    /// Whether this lane walks its window in chunks. The chunk size
    /// itself comes from configuration.
    pub fn is_chunked(&self) -> bool {
        match self {
            Lane::Fine => false,
            Lane::Medium | Lane::Coarse => true,
        }
    }

    /// Stagger lane startup so the three lanes never align their first
    /// run against the admission gate.
    pub fn startup_delay(&self) -> Duration {
        match self {
            Lane::Fine => Duration::ZERO,
            Lane::Medium => Duration::from_secs(5),
            Lane::Coarse => Duration::from_secs(10),
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fine" => Ok(Lane::Fine),
            "medium" => Ok(Lane::Medium),
            "coarse" => Ok(Lane::Coarse),
            other => Err(format!("unknown lane '{other}' (fine, medium, coarse)")),
        }
    }
}

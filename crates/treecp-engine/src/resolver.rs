//! Destination conflict resolution
//!
//! The decision for a unit is computed when a worker picks it up, against the state of
//! the destination at that moment. Decisions are never cached.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use treecp_types::{CopyUnit, Error, FileSystem};

/// Overwrite and ignore-failure flags of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConflictPolicy {
    /// Replace existing destination entries
    pub overwrite: bool,
    /// Skip, rather than fail, units whose destination already exists
    pub ignore_failures: bool,
}

impl ConflictPolicy {
    /// Decide what to do with a destination given whether it already exists
    pub fn decide(self, destination: &Path, exists: bool) -> ConflictDecision {
        match (exists, self.overwrite, self.ignore_failures) {
            (false, _, _) | (true, true, _) => ConflictDecision::Proceed,
            (true, false, true) => ConflictDecision::Skip,
            (true, false, false) => ConflictDecision::Fail(Error::conflict(destination)),
        }
    }
}

/// What a worker should do with a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Copy the unit
    Proceed,
    /// Leave the destination alone and count the unit as skipped
    Skip,
    /// Record the unit as failed
    Fail(Error),
}

/// Applies a [`ConflictPolicy`] against the live destination filesystem
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    destination: Arc<dyn FileSystem>,
    policy: ConflictPolicy,
}

impl ConflictResolver {
    /// Create a new resolver
    pub fn new(destination: Arc<dyn FileSystem>, policy: ConflictPolicy) -> Self {
        Self {
            destination,
            policy,
        }
    }

    /// The policy this resolver applies
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Decide for a destination path
    ///
    /// A destination whose status cannot be determined fails the unit.
    pub async fn resolve(&self, destination: &Path) -> ConflictDecision {
        match self.destination.status(destination).await {
            Ok(status) => self.policy.decide(destination, status.is_some()),
            Err(error) => ConflictDecision::Fail(error),
        }
    }

    /// Decide for a unit
    ///
    /// A directory unit whose destination already is a directory has nothing to
    /// overwrite and always proceeds.
    pub async fn resolve_unit(&self, unit: &CopyUnit) -> ConflictDecision {
        if !unit.is_dir() {
            return self.resolve(&unit.destination).await;
        }

        match self.destination.status(&unit.destination).await {
            Ok(Some(status)) if status.is_dir() => {
                debug!("Destination directory exists: {}", unit.destination.display());
                ConflictDecision::Proceed
            }
            Ok(status) => self.policy.decide(&unit.destination, status.is_some()),
            Err(error) => ConflictDecision::Fail(error),
        }
    }
}

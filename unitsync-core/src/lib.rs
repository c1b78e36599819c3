//! unitsync core library: unit names, content fingerprints, reconciliation state.
//!
//! - [`types`]: [`UnitName`] and [`Fingerprint`] newtypes
//! - [`destination`]: [`DestinationRecord`] lookup for the mirrored unit file
//! - [`state`]: [`ReconcileState`], the in-memory unit → fingerprint map

pub mod destination;
pub mod state;
pub mod types;

pub use destination::DestinationRecord;
pub use state::ReconcileState;
pub use types::{Fingerprint, UnitName};

//! Domain state engine for the demo property-management console: deterministic
//! dataset generation, dashboard aggregation, scenario modulation, and the
//! mutation store that keeps cross-entity invariants intact.

pub mod aggregate;
pub mod gen;
pub mod scenario;
pub mod store;

mod periods;
mod sampling;

pub use store::DemoStore;

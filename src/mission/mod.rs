//! Mission lifecycle for operating-room staffing.
//!
//! Managers draft and publish missions; eligible instrumentists claim them,
//! encode material used, and submit for validation. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

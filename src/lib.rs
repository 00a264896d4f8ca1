//! Staffline: operating-room staffing and mission lifecycle.
//!
//! Managers publish surgical missions to a pool of instrumentists or to one
//! named instrumentist; eligible instrumentists claim them, encode the
//! material used, and submit their work for validation.
//!
//! # Architecture
//!
//! Staffline follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`mission`]: Mission lifecycle, claiming, and encoding
//! - [`config`]: Environment-driven configuration and pool construction
//! - [`telemetry`]: Tracing subscriber installation

pub mod config;
pub mod mission;
pub mod telemetry;

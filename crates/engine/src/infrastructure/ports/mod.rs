//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine; everything else is a
//! concrete type. Ports exist for database access (so use cases can be tested
//! against mocks) and for the clock.

mod error;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// Testing Ports
// =============================================================================
#[cfg(test)]
pub use testing::MockClockPort;
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;

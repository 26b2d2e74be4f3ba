// Meeple - request validation toolkit for the game-night API
//
// The root crate re-exports the HTTP primitives and the validation engine so
// service code can depend on a single crate.

// Re-export core functionality
pub use meeple_core::*;

// Re-export the validation engine under its own namespace
pub use meeple_validation;

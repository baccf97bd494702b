// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: digit images, predictions and evaluations.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, and traits

// Digit images, predictions and image size constants
pub mod digit;

// Confusion matrix and classification metrics
pub mod evaluation;

// Core abstractions (traits) that other layers implement
pub mod traits;

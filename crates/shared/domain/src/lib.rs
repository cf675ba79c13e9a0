//! # Domain Models
//!
//! Pure domain types of the OCR service with a single dependency (`serde`).
//! Keep it lean: no I/O, networking, or process handling, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod format;
pub mod language;
pub mod registry;

pub use format::DocumentFormat;
pub use language::Language;

//! Pipeline stages for PDF-to-XML conversion.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ structure ──▶ xml
//! (path/bytes) (pdfium)  (heuristic)  (quick-xml)
//! ```
//!
//! 1. [`input`]   — read a local file or vet uploaded bytes
//! 2. [`extract`] — decode the text layer and document info; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//!
//! Structuring and serialisation are pure and live in [`crate::structure`]
//! and [`crate::xml`].

pub mod extract;
pub mod input;

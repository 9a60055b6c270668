//! # vellum-core — Document logic for the Vellum authoring core
//!
//! Pure, synchronous building blocks for a markdown authoring session:
//!
//! ```text
//! ┌────────────┐   apply_wrap / apply_indent   ┌──────────────┐
//! │  Document   │ ◄──────────────────────────── │   markup     │
//! │ text/title/ │                               └──────────────┘
//! │   author    │ ──► Fingerprint (change detection, commit gating)
//! └──────┬──────┘
//!        │ render seam (external, pure)
//!        ▼
//! ┌────────────┐      scroll fractions         ┌──────────────┐
//! │  preview    │ ◄───────────────────────────► │  viewport    │
//! │  (HTML)     │                               │  (mirroring) │
//! └────────────┘                               └──────────────┘
//! ```
//!
//! Everything here is deterministic and free of I/O. The asynchronous session
//! layer (persistence, autosave, blob storage) lives in `vellum-session`.
//!
//! ## Modules
//!
//! - [`document`] — the live document, persisted snapshot, version entries,
//!   and text statistics
//! - [`fingerprint`] — cheap content digest used to skip redundant commits
//! - [`markup`] — structured text mutations (wrap selection, indent/outdent)
//! - [`viewport`] — bidirectional scroll mirroring with a re-entrancy guard
//! - [`render`] — the pure markdown-to-HTML seam
//! - [`export`] — markdown / print / clipboard export assembly

pub mod document;
pub mod export;
pub mod fingerprint;
pub mod markup;
pub mod render;
pub mod viewport;

pub use document::{Document, DocumentStats, PersistedState, VersionEntry};
pub use fingerprint::Fingerprint;
pub use markup::{
    apply_indent, apply_wrap, IndentDirection, MarkupError, Mutation, Selection, StyleKind,
};
pub use render::Render;
pub use viewport::{PaneMetrics, ScrollSync};

//! Pipeline stages for building and rendering a plan.
//!
//! Each submodule implements exactly one transformation step, so each is
//! independently testable and the rendering backend can be swapped without
//! touching normalisation.
//!
//! ## Data Flow
//!
//! ```text
//!  RoleMapping ──▶ designation ─┐
//!                               ├──▶ assemble ──▶ (template) ──▶ render
//!  course JSON ──▶ course ──────┘    (PlanDocument)   (markup)    (PDF bytes)
//!        both use classify
//! ```
//!
//! 1. [`classify`]   : competency type/area text → bucket
//! 2. [`course`]     : raw course record → card, via [`crate::fields`]
//! 3. [`designation`]: role mapping → designation view
//! 4. [`assemble`]   : pick selected cards in selection order
//! 5. [`render`]     : drive a browser session from markup to PDF;
//!    [`browser`] is the Chromium implementation
//!
//! Stages 1–4 are pure and synchronous. Stage 5 is async and owns the only
//! external resource in the crate.

pub mod assemble;
pub mod browser;
pub mod classify;
pub mod course;
pub mod designation;
pub mod render;

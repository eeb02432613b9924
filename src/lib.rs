//! Booking latency library
//!
//! Joins the A->B and B->C stage extracts by booking code, classifies each
//! booking's end-to-end latency against the SLA threshold and renders the
//! report. Exposes modules for integration testing and the binary.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;

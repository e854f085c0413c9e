//! Contract bindings for the dashboard token.
//!
//! The interface is generated with alloy's `sol!` macro and exposes exactly the
//! calls the dashboard reads and submits.

pub mod token;

//! CPS-style lowering from ANF.
//!
//! Both passes are implemented by running the ANF interpreter framework
//! with a converter context whose custom value is a "maybe lazy" target
//! expression: atoms lower eagerly, while calls, branches, and `let`
//! chains lower to partial continuations (functions from "the rest of
//! the program" to a concrete target fragment). The driver applies the
//! final partial continuation to the identity continuation.
//!
//! The converter uses the interpreter's environment solely to track
//! variables renamed or rebound during conversion; a free variable
//! lowers to a variable of the same name.

mod anf_to_core;
mod anf_to_cps;

pub use anf_to_core::anf_to_core;
pub use anf_to_cps::anf_to_cps;

//! Half-gates garbling and evaluation of [`circuit::Program`]s whose gates
//! carry output scopes.

pub mod garble;

pub use garble::*;

//! Contravariant functors for consumer shapes.
//!
//! A consumer of `A` (a predicate, a function's first argument, an effect's environment, a
//! queue's enqueue side) can be adapted to consume some other `B` given a translation
//! `B -> A`. [`Contravariant`] captures that capability, [`ContravariantLaws`] states the laws
//! it must obey, and this crate supplies instances for:
//!
//! - functions of arity 1 through 22 ([`Function1`] .. [`Function22`]), varying the first argument
//! - with the `effects` feature: schedules, effects, layers, scoped resources, queues,
//!   reference cells, sinks and streams (see the `effects` module)
//!
//! Instances are selected statically, by the marker type used at the call site:
//!
//! ```rust
//! use contravariant::{Contravariant, Function1, PartiallyApplied};
//!
//! let render = Function1::new(|n: usize| format!("n={n}"));
//! let by_len = Function1::<PartiallyApplied, String>::contramap(render, |s: String| s.len());
//!
//! assert_eq!(by_len.call("hello".to_string()), "n=5");
//! ```

mod contravariant;
mod function;
mod laws;

#[cfg(feature = "effects")]
pub mod effects;

pub use crate::contravariant::{adapt, Contravariant, PartiallyApplied};
pub use function::{
    Function1, Function10, Function11, Function12, Function13, Function14, Function15,
    Function16, Function17, Function18, Function19, Function2, Function20, Function21,
    Function22, Function3, Function4, Function5, Function6, Function7, Function8, Function9,
};
pub use laws::ContravariantLaws;

//! Effect-oriented consumer shapes and their [`crate::Contravariant`] instances.
//!
//! Each shape exposes its own pre-transform primitive (`provide_some`, `contramap_input`,
//! `contramap_offer`, `contramap_write`, `contramap_in`) and the instance is a thin wrapper
//! over it. Adapting a shape never changes when it suspends, how it is cancelled, or the
//! order in which it observes its inputs.

mod effect;
mod layer;
mod queue;
mod reference;
mod schedule;
mod scoped;
mod sink;
mod stream;

pub use effect::Effect;
pub use layer::Layer;
pub use queue::{Queue, QueueError};
pub use reference::Ref;
pub use schedule::{Decision, Schedule, ScheduleDriver};
pub use scoped::{Reservation, Scoped};
pub use sink::{Done, Push, Sink, Step};
pub use stream::Stream;

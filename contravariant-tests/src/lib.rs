//! Law suites for every `contravariant` instance, plus the benchmarks under `benches/`.
//!
//! Each suite checks identity and composition for its shape, with the shape's own notion of
//! equality: calling a function, running an effect, draining a queue.

#[cfg(test)]
mod effects;
#[cfg(test)]
mod functions;
#[cfg(test)]
mod support;

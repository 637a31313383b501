use crate::Contravariant;

/// The identity and composition laws every [`Contravariant`] instance must satisfy.
///
/// Blanket-implemented for all instances. Neither law is enforced at runtime; they are
/// testable properties. Both take the shape's equality notion as a closure consuming the two
/// consumers under comparison, so shapes that can only be compared by running them (effects,
/// queues, sinks) can be checked the same way as plain functions.
///
/// ```rust
/// # use contravariant::{ContravariantLaws, Function1, PartiallyApplied};
/// type Shape = Function1<PartiallyApplied, String>;
///
/// let render = Function1::new(|n: i64| format!("n={n}"));
///
/// assert!(Shape::identity_law(render.clone(), |l, r| l.call(7) == r.call(7)));
/// assert!(Shape::composition_law(
///     render,
///     |s: &'static str| s.len() as i32,
///     |n: i32| i64::from(n) * 2,
///     |l, r| l.call("hello") == r.call("hello"),
/// ));
/// ```
pub trait ContravariantLaws: Contravariant {
    /// `contramap(fa, id)` must be indistinguishable from `fa`.
    fn identity_law<A: 'static>(
        fa: Self::Consumer<A>,
        equal: impl FnOnce(Self::Consumer<A>, Self::Consumer<A>) -> bool,
    ) -> bool
    where
        Self::Consumer<A>: Clone,
    {
        let adapted = Self::contramap(fa.clone(), |a: A| a);
        equal(adapted, fa)
    }

    /// Adapting by `g` and then by `f` must be indistinguishable from adapting once by
    /// `|c| g(f(c))`.
    fn composition_law<A: 'static, B: 'static, C: 'static>(
        fa: Self::Consumer<A>,
        f: impl Fn(C) -> B + Clone + Send + Sync + 'static,
        g: impl Fn(B) -> A + Clone + Send + Sync + 'static,
        equal: impl FnOnce(Self::Consumer<C>, Self::Consumer<C>) -> bool,
    ) -> bool
    where
        Self::Consumer<A>: Clone,
    {
        let stepwise = Self::contramap(Self::contramap(fa.clone(), g.clone()), f.clone());
        let fused = Self::contramap(fa, move |c: C| g(f(c)));
        equal(stepwise, fused)
    }
}

impl<X: Contravariant> ContravariantLaws for X {}

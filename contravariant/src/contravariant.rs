use std::sync::Arc;

/// A consumer shape whose input can be adapted via `contramap`.
///
/// # Motivation
///
/// Comparators, predicates, hash functions and effects with environment requirements all
/// _consume_ their type parameter instead of producing it. Given a translation `B -> A`,
/// any consumer of `A` can be turned into a consumer of `B` by translating each `B` at the
/// input edge before it reaches the original consumer.
///
/// # Implementing this trait
///
/// Rust does not allow implementing a trait for a partially applied type. We can implement
/// a trait for `Predicate<usize>` but not for just `Predicate`. For this reason instances are
/// written over a marker token: the shape's own type with the varying parameter replaced by
/// the uninhabited [`PartiallyApplied`] enum, eg
///
/// ```rust
/// # use contravariant::{Contravariant, PartiallyApplied};
/// # use std::sync::Arc;
/// struct Predicate<A>(Arc<dyn Fn(A) -> bool + Send + Sync>);
///
/// impl Contravariant for Predicate<PartiallyApplied> {
///     type Consumer<X> = Predicate<X>;
///
///     fn contramap<A: 'static, B: 'static>(
///         input: Self::Consumer<A>,
///         f: impl Fn(B) -> A + Send + Sync + 'static,
///     ) -> Self::Consumer<B> {
///         let test = input.0;
///         Predicate(Arc::new(move |b: B| test(f(b))))
///     }
/// }
/// ```
///
/// # Use
///
/// ```rust
/// # use contravariant::{Contravariant, PartiallyApplied};
/// # use std::sync::Arc;
/// # struct Predicate<A>(Arc<dyn Fn(A) -> bool + Send + Sync>);
/// #
/// # impl Contravariant for Predicate<PartiallyApplied> {
/// #     type Consumer<X> = Predicate<X>;
/// #
/// #     fn contramap<A: 'static, B: 'static>(
/// #         input: Self::Consumer<A>,
/// #         f: impl Fn(B) -> A + Send + Sync + 'static,
/// #     ) -> Self::Consumer<B> {
/// #         let test = input.0;
/// #         Predicate(Arc::new(move |b: B| test(f(b))))
/// #     }
/// # }
/// let is_even = Predicate::<usize>(Arc::new(|n: usize| n % 2 == 0));
/// let has_even_len =
///     Predicate::<PartiallyApplied>::contramap(is_even, |s: String| s.len());
///
/// assert!((has_even_len.0)("ab".to_string()));
/// assert!(!(has_even_len.0)("abc".to_string()));
/// ```
///
/// # Laws
///
/// Instances must satisfy identity and composition, see [`crate::ContravariantLaws`].
pub trait Contravariant {
    /// the consumer type whose input is adapted by `contramap`
    type Consumer<A>;

    /// Adapt a consumer of `A` into a consumer of `B`. Applying the result to some `b` must
    /// behave exactly like applying `input` to `f(b)`.
    ///
    /// `f` is never called by `contramap` itself, only by the adapted consumer.
    fn contramap<A: 'static, B: 'static>(
        input: Self::Consumer<A>,
        f: impl Fn(B) -> A + Send + Sync + 'static,
    ) -> Self::Consumer<B>;
}

/// An uninhabited type used to define [`Contravariant`] instances for partially-applied types.
///
/// For example: the instance for `Effect<R, E, A>` varying `R` cannot be written over the
/// partially-applied type `Effect<_, E, A>`, so instead we write it over
/// `Effect<PartiallyApplied, E, A>`
#[derive(Clone, Debug)]
pub enum PartiallyApplied {}

/// Curried form of [`Contravariant::contramap`]: turn a translation `B -> A` into a reusable
/// adapter from `F[A]` to `F[B]`.
///
/// ```rust
/// # use contravariant::{adapt, Function1, PartiallyApplied};
/// let by_len = adapt::<Function1<PartiallyApplied, bool>, usize, &'static str>(|s| s.len());
///
/// let short = by_len(Function1::new(|n: usize| n < 4));
/// let empty = by_len(Function1::new(|n: usize| n == 0));
///
/// assert!(short.call("abc"));
/// assert!(!empty.call("abc"));
/// ```
pub fn adapt<F: Contravariant, A: 'static, B: 'static>(
    f: impl Fn(B) -> A + Send + Sync + 'static,
) -> impl Fn(F::Consumer<A>) -> F::Consumer<B> {
    let f = Arc::new(f);
    move |input| {
        let f = f.clone();
        F::contramap(input, move |b: B| f(b))
    }
}

//! Function shapes of arity 1 through 22, each contravariant in its first argument.
//!
//! Rust has no variadic generics, so every arity gets its own named type generated by
//! `function_shape!`. All of them share one representation: a cheaply cloneable
//! `Arc<dyn Fn(..) -> R + Send + Sync>`.

use std::{fmt, sync::Arc};

use crate::{Contravariant, PartiallyApplied};

macro_rules! function_shape {
    ($(#[$doc:meta])* $name:ident, $arity:literal $(, $t:ident $v:ident)*) => {
        $(#[$doc])*
        pub struct $name<A, $($t,)* R>(Arc<dyn Fn(A $(, $t)*) -> R + Send + Sync>);

        impl<A, $($t,)* R> $name<A, $($t,)* R> {
            /// number of arguments taken by this shape
            pub const ARITY: usize = $arity;

            pub fn new(f: impl Fn(A $(, $t)*) -> R + Send + Sync + 'static) -> Self {
                $name(Arc::new(f))
            }

            #[inline(always)]
            #[allow(clippy::too_many_arguments)]
            pub fn call(&self, a: A $(, $v: $t)*) -> R {
                (self.0)(a $(, $v)*)
            }
        }

        impl<A, $($t,)* R> Clone for $name<A, $($t,)* R> {
            fn clone(&self) -> Self {
                $name(self.0.clone())
            }
        }

        impl<A, $($t,)* R> fmt::Debug for $name<A, $($t,)* R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }

        impl<$($t: 'static,)* R: 'static> Contravariant for $name<PartiallyApplied, $($t,)* R> {
            type Consumer<X> = $name<X, $($t,)* R>;

            // only the first argument is translated, the rest are forwarded in position
            #[inline(always)]
            fn contramap<A: 'static, B: 'static>(
                input: Self::Consumer<A>,
                f: impl Fn(B) -> A + Send + Sync + 'static,
            ) -> Self::Consumer<B> {
                let wrapped = input.0;
                $name(Arc::new(move |b: B $(, $v: $t)*| wrapped(f(b) $(, $v)*)))
            }
        }
    };
}

function_shape! {
    /// A function of one argument ending in `R`, contravariant in that argument.
    Function1, 1
}

function_shape! {
    /// A function of 2 arguments ending in `R`, contravariant in its first argument.
    Function2, 2, T2 t2
}

function_shape! {
    /// A function of 3 arguments ending in `R`, contravariant in its first argument.
    Function3, 3, T2 t2, T3 t3
}

function_shape! {
    /// A function of 4 arguments ending in `R`, contravariant in its first argument.
    Function4, 4, T2 t2, T3 t3, T4 t4
}

function_shape! {
    /// A function of 5 arguments ending in `R`, contravariant in its first argument.
    Function5, 5, T2 t2, T3 t3, T4 t4, T5 t5
}

function_shape! {
    /// A function of 6 arguments ending in `R`, contravariant in its first argument.
    Function6, 6, T2 t2, T3 t3, T4 t4, T5 t5, T6 t6
}

function_shape! {
    /// A function of 7 arguments ending in `R`, contravariant in its first argument.
    Function7, 7, T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7
}

function_shape! {
    /// A function of 8 arguments ending in `R`, contravariant in its first argument.
    Function8, 8, T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8
}

function_shape! {
    /// A function of 9 arguments ending in `R`, contravariant in its first argument.
    Function9, 9, T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9
}

function_shape! {
    /// A function of 10 arguments ending in `R`, contravariant in its first argument.
    Function10, 10, T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10
}

function_shape! {
    /// A function of 11 arguments ending in `R`, contravariant in its first argument.
    Function11, 11, T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11
}

function_shape! {
    /// A function of 12 arguments ending in `R`, contravariant in its first argument.
    Function12, 12,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12
}

function_shape! {
    /// A function of 13 arguments ending in `R`, contravariant in its first argument.
    Function13, 13,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13
}

function_shape! {
    /// A function of 14 arguments ending in `R`, contravariant in its first argument.
    Function14, 14,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14
}

function_shape! {
    /// A function of 15 arguments ending in `R`, contravariant in its first argument.
    Function15, 15,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15
}

function_shape! {
    /// A function of 16 arguments ending in `R`, contravariant in its first argument.
    Function16, 16,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15, T16 t16
}

function_shape! {
    /// A function of 17 arguments ending in `R`, contravariant in its first argument.
    Function17, 17,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15, T16 t16, T17 t17
}

function_shape! {
    /// A function of 18 arguments ending in `R`, contravariant in its first argument.
    Function18, 18,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15, T16 t16, T17 t17, T18 t18
}

function_shape! {
    /// A function of 19 arguments ending in `R`, contravariant in its first argument.
    Function19, 19,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15, T16 t16, T17 t17, T18 t18, T19 t19
}

function_shape! {
    /// A function of 20 arguments ending in `R`, contravariant in its first argument.
    Function20, 20,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15, T16 t16, T17 t17, T18 t18, T19 t19, T20 t20
}

function_shape! {
    /// A function of 21 arguments ending in `R`, contravariant in its first argument.
    Function21, 21,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15, T16 t16, T17 t17, T18 t18, T19 t19, T20 t20, T21 t21
}

function_shape! {
    /// A function of 22 arguments ending in `R`, contravariant in its first argument.
    Function22, 22,
        T2 t2, T3 t3, T4 t4, T5 t5, T6 t6, T7 t7, T8 t8, T9 t9, T10 t10, T11 t11, T12 t12, T13 t13,
        T14 t14, T15 t15, T16 t16, T17 t17, T18 t18, T19 t19, T20 t20, T21 t21, T22 t22
}

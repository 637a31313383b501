use std::sync::Arc;

use tracing::trace;

use crate::{Contravariant, PartiallyApplied};

/// The result of a finished sink, along with any input it did not consume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Done<E, L, Z> {
    pub result: Result<Z, E>,
    pub leftover: Vec<L>,
}

impl<E, L, Z> Done<E, L, Z> {
    pub fn map<Z2>(self, f: impl FnOnce(Z) -> Z2) -> Done<E, L, Z2> {
        Done {
            result: self.result.map(f),
            leftover: self.leftover,
        }
    }
}

/// What a sink does after being handed a chunk.
pub enum Step<E, L, In, Z> {
    /// wants more input
    More(Box<dyn Push<E, L, In, Z>>),
    Done(Done<E, L, Z>),
}

/// A running sink. Each call consumes the current state; [`Step::More`] hands back the next one.
pub trait Push<E, L, In, Z>: Send {
    fn push(self: Box<Self>, chunk: Vec<In>) -> Step<E, L, In, Z>;

    /// Signal the end of input.
    fn finish(self: Box<Self>) -> Done<E, L, Z>;
}

/// A consumer of chunked input of type `In` that, started in an environment `R`, produces a
/// result `Z` or fails with `E`, possibly leaving some input of type `L` unconsumed.
pub struct Sink<R, E, L, In, Z> {
    start: Arc<dyn Fn(R) -> Box<dyn Push<E, L, In, Z>> + Send + Sync>,
}

impl<R, E, L, In, Z> Clone for Sink<R, E, L, In, Z> {
    fn clone(&self) -> Self {
        Self {
            start: self.start.clone(),
        }
    }
}

type Init<Z> = Arc<dyn Fn() -> Z + Send + Sync>;
type Cont<Z> = Arc<dyn Fn(&Z) -> bool + Send + Sync>;
type FoldStep<E, In, Z> = Arc<dyn Fn(Z, In) -> Result<Z, E> + Send + Sync>;

struct FoldPush<E, In, Z> {
    state: Z,
    cont: Cont<Z>,
    step: FoldStep<E, In, Z>,
}

impl<E: 'static, In: 'static, Z: Send + 'static> Push<E, In, In, Z> for FoldPush<E, In, Z> {
    fn push(self: Box<Self>, chunk: Vec<In>) -> Step<E, In, In, Z> {
        let FoldPush {
            mut state,
            cont,
            step,
        } = *self;
        let mut elements = chunk.into_iter();
        while cont(&state) {
            let Some(element) = elements.next() else {
                return Step::More(Box::new(FoldPush { state, cont, step }));
            };
            state = match step(state, element) {
                Ok(next) => next,
                Err(error) => {
                    return Step::Done(Done {
                        result: Err(error),
                        leftover: elements.collect(),
                    });
                }
            };
        }
        Step::Done(Done {
            result: Ok(state),
            leftover: elements.collect(),
        })
    }

    fn finish(self: Box<Self>) -> Done<E, In, Z> {
        Done {
            result: Ok(self.state),
            leftover: Vec::new(),
        }
    }
}

struct FailPush<E> {
    error: E,
}

impl<E: Send + 'static, In: 'static, Z: 'static> Push<E, In, In, Z> for FailPush<E> {
    fn push(self: Box<Self>, chunk: Vec<In>) -> Step<E, In, In, Z> {
        Step::Done(Done {
            result: Err(self.error),
            leftover: chunk,
        })
    }

    fn finish(self: Box<Self>) -> Done<E, In, Z> {
        Done {
            result: Err(self.error),
            leftover: Vec::new(),
        }
    }
}

struct MapPush<E, L, In, Z, Z2> {
    inner: Box<dyn Push<E, L, In, Z>>,
    f: Arc<dyn Fn(Z) -> Z2 + Send + Sync>,
}

impl<E: 'static, L: 'static, In: 'static, Z: 'static, Z2: 'static> Push<E, L, In, Z2>
    for MapPush<E, L, In, Z, Z2>
{
    fn push(self: Box<Self>, chunk: Vec<In>) -> Step<E, L, In, Z2> {
        let MapPush { inner, f } = *self;
        match inner.push(chunk) {
            Step::More(next) => Step::More(Box::new(MapPush { inner: next, f })),
            Step::Done(done) => Step::Done(done.map(|z| f(z))),
        }
    }

    fn finish(self: Box<Self>) -> Done<E, L, Z2> {
        let MapPush { inner, f } = *self;
        inner.finish().map(|z| f(z))
    }
}

struct ContramapPush<E, L, In0, In, Z> {
    inner: Box<dyn Push<E, L, In, Z>>,
    f: Arc<dyn Fn(In0) -> In + Send + Sync>,
}

impl<E: 'static, L: 'static, In0: 'static, In: 'static, Z: 'static> Push<E, L, In0, Z>
    for ContramapPush<E, L, In0, In, Z>
{
    fn push(self: Box<Self>, chunk: Vec<In0>) -> Step<E, L, In0, Z> {
        let ContramapPush { inner, f } = *self;
        let translated = chunk.into_iter().map(|element| f(element)).collect();
        match inner.push(translated) {
            Step::More(next) => Step::More(Box::new(ContramapPush { inner: next, f })),
            Step::Done(done) => Step::Done(done),
        }
    }

    fn finish(self: Box<Self>) -> Done<E, L, Z> {
        self.inner.finish()
    }
}

impl<R: 'static, E: 'static, In: 'static, Z: Send + 'static> Sink<R, E, In, In, Z> {
    fn fold_with(init: Init<Z>, cont: Cont<Z>, step: FoldStep<E, In, Z>) -> Self {
        Sink {
            start: Arc::new(move |_: R| {
                Box::new(FoldPush {
                    state: init(),
                    cont: cont.clone(),
                    step: step.clone(),
                }) as Box<dyn Push<E, In, In, Z>>
            }),
        }
    }

    /// Fold input into `z` via `step` while `cont` holds for the running state. Input arriving
    /// after `cont` stops holding is left over.
    pub fn fold(
        z: Z,
        cont: impl Fn(&Z) -> bool + Send + Sync + 'static,
        step: impl Fn(Z, In) -> Z + Send + Sync + 'static,
    ) -> Self
    where
        Z: Clone + Sync,
    {
        Self::fold_with(
            Arc::new(move || z.clone()),
            Arc::new(cont),
            Arc::new(move |state, element| Ok(step(state, element))),
        )
    }

    /// Fold all input into `z` via `step`.
    pub fn fold_left(z: Z, step: impl Fn(Z, In) -> Z + Send + Sync + 'static) -> Self
    where
        Z: Clone + Sync,
    {
        Self::fold(z, |_: &Z| true, step)
    }
}

impl<R: 'static, E: 'static, In: 'static> Sink<R, E, In, In, ()> {
    /// Consume all input for its side effects, stopping at the first failure.
    pub fn for_each(f: impl Fn(In) -> Result<(), E> + Send + Sync + 'static) -> Self {
        Self::fold_with(
            Arc::new(|| ()),
            Arc::new(|_: &()| true),
            Arc::new(move |(), element: In| f(element)),
        )
    }
}

impl<R: 'static, E: 'static, In: Send + 'static> Sink<R, E, In, In, Vec<In>> {
    pub fn collect_all() -> Self {
        Self::fold_with(
            Arc::new(Vec::new),
            Arc::new(|_: &Vec<In>| true),
            Arc::new(|mut collected: Vec<In>, element: In| {
                collected.push(element);
                Ok(collected)
            }),
        )
    }

    /// Collect the first `n` elements.
    pub fn take(n: usize) -> Self {
        Self::fold_with(
            Arc::new(Vec::new),
            Arc::new(move |collected: &Vec<In>| collected.len() < n),
            Arc::new(|mut collected: Vec<In>, element: In| {
                collected.push(element);
                Ok(collected)
            }),
        )
    }
}

impl<R: 'static, E: 'static, In: Send + 'static> Sink<R, E, In, In, Option<In>> {
    pub fn head() -> Self {
        Self::fold_with(
            Arc::new(|| None),
            Arc::new(|head: &Option<In>| head.is_none()),
            Arc::new(|_: Option<In>, element: In| Ok(Some(element))),
        )
    }
}

impl<R: 'static, E: 'static, In: 'static> Sink<R, E, In, In, usize> {
    pub fn count() -> Self {
        Self::fold_left(0, |n, _| n + 1)
    }
}

impl<R: 'static, E: Clone + Send + Sync + 'static, In: 'static, Z: 'static> Sink<R, E, In, In, Z> {
    /// A sink that fails with `error` as soon as it is pushed to or finished.
    pub fn fail(error: E) -> Self {
        Sink {
            start: Arc::new(move |_: R| {
                Box::new(FailPush {
                    error: error.clone(),
                }) as Box<dyn Push<E, In, In, Z>>
            }),
        }
    }
}

impl<R: 'static, E: 'static, L: 'static, In: 'static, Z: 'static> Sink<R, E, L, In, Z> {
    pub fn from_push(
        start: impl Fn(R) -> Box<dyn Push<E, L, In, Z>> + Send + Sync + 'static,
    ) -> Self {
        Sink {
            start: Arc::new(start),
        }
    }

    pub fn start(&self, env: R) -> Box<dyn Push<E, L, In, Z>> {
        (self.start)(env)
    }

    /// Drive the sink over `chunks`, finishing it if they run out first.
    pub fn run_chunks(&self, env: R, chunks: impl IntoIterator<Item = Vec<In>>) -> Done<E, L, Z> {
        let mut push = self.start(env);
        for chunk in chunks {
            match push.push(chunk) {
                Step::More(next) => push = next,
                Step::Done(done) => {
                    trace!(leftover = done.leftover.len(), "sink done early");
                    return done;
                }
            }
        }
        push.finish()
    }

    pub fn map<Z2: 'static>(
        self,
        f: impl Fn(Z) -> Z2 + Send + Sync + 'static,
    ) -> Sink<R, E, L, In, Z2> {
        let start = self.start;
        let f: Arc<dyn Fn(Z) -> Z2 + Send + Sync> = Arc::new(f);
        Sink::from_push(move |env: R| {
            Box::new(MapPush {
                inner: start(env),
                f: f.clone(),
            }) as Box<dyn Push<E, L, In, Z2>>
        })
    }

    /// Translate every consumed element via `f` before it reaches this sink. Leftovers keep
    /// their untranslated type `L`.
    pub fn contramap_in<In0: 'static>(
        self,
        f: impl Fn(In0) -> In + Send + Sync + 'static,
    ) -> Sink<R, E, L, In0, Z> {
        let start = self.start;
        let f: Arc<dyn Fn(In0) -> In + Send + Sync> = Arc::new(f);
        Sink::from_push(move |env: R| {
            Box::new(ContramapPush {
                inner: start(env),
                f: f.clone(),
            }) as Box<dyn Push<E, L, In0, Z>>
        })
    }
}

impl<R: 'static, E: 'static, L: 'static, Z: 'static> Contravariant
    for Sink<R, E, L, PartiallyApplied, Z>
{
    type Consumer<X> = Sink<R, E, L, X, Z>;

    fn contramap<A: 'static, B: 'static>(
        input: Self::Consumer<A>,
        f: impl Fn(B) -> A + Send + Sync + 'static,
    ) -> Self::Consumer<B> {
        input.contramap_in(f)
    }
}

use std::sync::Arc;

use futures::{
    future::{self, BoxFuture},
    stream::{self, BoxStream},
    FutureExt, StreamExt, TryStreamExt,
};
use tracing::trace;

use crate::{
    effects::{Done, Effect, Sink, Step},
    Contravariant, PartiallyApplied,
};

/// A lazily produced sequence of `A`s that requires an environment `R` and may fail with `E`.
///
/// Nothing is produced until the stream is opened, and every open starts over.
pub struct Stream<R, E, A> {
    open: Arc<dyn Fn(R) -> BoxStream<'static, Result<A, E>> + Send + Sync>,
}

impl<R, E, A> Clone for Stream<R, E, A> {
    fn clone(&self) -> Self {
        Self {
            open: self.open.clone(),
        }
    }
}

impl<R: 'static, E: 'static, A: 'static> Stream<R, E, A> {
    pub fn from_fn<S>(f: impl Fn(R) -> S + Send + Sync + 'static) -> Self
    where
        S: futures::Stream<Item = Result<A, E>> + Send + 'static,
    {
        Stream {
            open: Arc::new(move |env: R| f(env).boxed()),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_iter(elements: impl IntoIterator<Item = A>) -> Self
    where
        A: Clone + Send + Sync,
        E: Send,
    {
        let elements: Vec<A> = elements.into_iter().collect();
        Self::from_fn(move |_| stream::iter(elements.clone()).map(Ok))
    }

    pub fn succeed(value: A) -> Self
    where
        A: Clone + Send + Sync,
        E: Send,
    {
        Self::from_iter([value])
    }

    /// A stream whose only item is `error`.
    pub fn fail(error: E) -> Self
    where
        A: Send,
        E: Clone + Send + Sync,
    {
        Self::from_fn(move |_| stream::once(future::ready(Err(error.clone()))))
    }

    /// A single-element stream running `effect` when opened.
    pub fn from_effect(effect: Effect<R, E, A>) -> Self {
        Stream {
            open: Arc::new(move |env: R| stream::once(effect.run(env)).boxed()),
        }
    }

    pub fn open(&self, env: R) -> BoxStream<'static, Result<A, E>> {
        (self.open)(env)
    }

    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> Stream<R, E, B> {
        let open = self.open;
        let f = Arc::new(f);
        Stream {
            open: Arc::new(move |env: R| {
                let f = f.clone();
                open(env).map(move |item| item.map(|a| f(a))).boxed()
            }),
        }
    }

    /// Only the first `n` items.
    pub fn take(self, n: usize) -> Self {
        let open = self.open;
        Stream {
            open: Arc::new(move |env: R| open(env).take(n).boxed()),
        }
    }

    /// Drain the stream, stopping at the first failure.
    pub fn run_collect(&self, env: R) -> BoxFuture<'static, Result<Vec<A>, E>>
    where
        A: Send,
    {
        let items = self.open(env);
        async move {
            let collected: Vec<A> = items.try_collect().await?;
            trace!(elements = collected.len(), "stream drained");
            Ok(collected)
        }
        .boxed()
    }

    /// Feed the stream into `sink` one element at a time. The stream stops being pulled as soon
    /// as the sink is done; a stream failure ends the run with that failure.
    pub async fn run<L: 'static, Z: 'static>(
        &self,
        env: R,
        sink: &Sink<R, E, L, A, Z>,
    ) -> Done<E, L, Z>
    where
        R: Clone,
    {
        let mut push = sink.start(env.clone());
        let mut items = self.open(env);
        while let Some(item) = items.next().await {
            let element = match item {
                Ok(element) => element,
                Err(error) => {
                    trace!("stream failed while feeding sink");
                    return Done {
                        result: Err(error),
                        leftover: Vec::new(),
                    };
                }
            };
            match push.push(vec![element]) {
                Step::More(next) => push = next,
                Step::Done(done) => {
                    trace!(leftover = done.leftover.len(), "sink done before the stream");
                    return done;
                }
            }
        }
        trace!("stream exhausted, finishing sink");
        push.finish()
    }

    /// Open this stream with an environment translated from `R0` via `f`.
    pub fn provide_some<R0: 'static>(
        self,
        f: impl Fn(R0) -> R + Send + Sync + 'static,
    ) -> Stream<R0, E, A> {
        let open = self.open;
        Stream {
            open: Arc::new(move |env: R0| open(f(env))),
        }
    }
}

impl<E: 'static, A: 'static> Contravariant for Stream<PartiallyApplied, E, A> {
    type Consumer<X> = Stream<X, E, A>;

    fn contramap<R: 'static, R0: 'static>(
        input: Self::Consumer<R>,
        f: impl Fn(R0) -> R + Send + Sync + 'static,
    ) -> Self::Consumer<R0> {
        input.provide_some(f)
    }
}

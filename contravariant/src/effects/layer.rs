use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use tracing::trace;

use crate::{effects::Effect, Contravariant, PartiallyApplied};

/// A recipe for building some environment `ROut` out of a required environment `RIn`,
/// failing with `E`.
pub struct Layer<RIn, E, ROut> {
    build: Arc<dyn Fn(RIn) -> BoxFuture<'static, Result<ROut, E>> + Send + Sync>,
}

impl<RIn, E, ROut> Clone for Layer<RIn, E, ROut> {
    fn clone(&self) -> Self {
        Self {
            build: self.build.clone(),
        }
    }
}

impl<RIn: 'static, E: 'static, ROut: 'static> Layer<RIn, E, ROut> {
    pub fn from_effect(effect: Effect<RIn, E, ROut>) -> Self {
        Layer {
            build: Arc::new(move |env: RIn| effect.run(env)),
        }
    }

    pub fn from_fn(f: impl Fn(RIn) -> ROut + Send + Sync + 'static) -> Self
    where
        E: Send,
        ROut: Send,
    {
        Self::from_effect(Effect::from_fn(move |env| Ok(f(env))))
    }

    pub fn succeed(service: ROut) -> Self
    where
        E: Send,
        ROut: Clone + Send + Sync,
    {
        Self::from_fn(move |_| service.clone())
    }

    pub fn build(&self, env: RIn) -> BoxFuture<'static, Result<ROut, E>> {
        (self.build)(env)
    }

    /// Feed the output of this layer into `next`.
    pub fn to<ROut2: 'static>(self, next: Layer<ROut, E, ROut2>) -> Layer<RIn, E, ROut2>
    where
        E: Send,
        ROut: Send,
    {
        let build = self.build;
        Layer {
            build: Arc::new(move |env: RIn| {
                let first = build(env);
                let next = next.clone();
                async move {
                    let intermediate = first.await?;
                    trace!("layer input built, building next layer");
                    next.build(intermediate).await
                }
                .boxed()
            }),
        }
    }

    /// Build this layer and `other` concurrently from the same environment.
    pub fn and<ROut2: 'static>(self, other: Layer<RIn, E, ROut2>) -> Layer<RIn, E, (ROut, ROut2)>
    where
        RIn: Clone,
        E: Send,
        ROut: Send,
        ROut2: Send,
    {
        let build = self.build;
        Layer {
            build: Arc::new(move |env: RIn| {
                futures::future::try_join(build(env.clone()), other.build(env)).boxed()
            }),
        }
    }

    pub fn map<ROut2: 'static>(
        self,
        f: impl Fn(ROut) -> ROut2 + Send + Sync + 'static,
    ) -> Layer<RIn, E, ROut2> {
        let build = self.build;
        let f = Arc::new(f);
        Layer {
            build: Arc::new(move |env: RIn| {
                let f = f.clone();
                build(env).map(move |result| result.map(|out| f(out))).boxed()
            }),
        }
    }

    /// Adapt an environment of type `R0` into this layer's input, then build this layer.
    ///
    /// Behaves as `Layer::from_fn(f).to(self)` without the intermediate build step.
    pub fn provide_some<R0: 'static>(
        self,
        f: impl Fn(R0) -> RIn + Send + Sync + 'static,
    ) -> Layer<R0, E, ROut> {
        let build = self.build;
        Layer {
            build: Arc::new(move |env: R0| build(f(env))),
        }
    }
}

impl<E: 'static, ROut: 'static> Contravariant for Layer<PartiallyApplied, E, ROut> {
    type Consumer<X> = Layer<X, E, ROut>;

    fn contramap<A: 'static, B: 'static>(
        input: Self::Consumer<A>,
        f: impl Fn(B) -> A + Send + Sync + 'static,
    ) -> Self::Consumer<B> {
        input.provide_some(f)
    }
}

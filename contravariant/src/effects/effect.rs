use std::{future::Future, sync::Arc, time::Duration};

use futures::{future::BoxFuture, FutureExt};
use tracing::{debug, trace};

use crate::{
    effects::{Decision, Layer, Schedule},
    Contravariant, PartiallyApplied,
};

/// An asynchronous computation that requires an environment `R` and either fails with `E` or
/// succeeds with `A`.
///
/// Nothing runs until [`Effect::run`] is called; every call runs the computation anew.
pub struct Effect<R, E, A> {
    exec: Arc<dyn Fn(R) -> BoxFuture<'static, Result<A, E>> + Send + Sync>,
}

impl<R, E, A> Clone for Effect<R, E, A> {
    fn clone(&self) -> Self {
        Self {
            exec: self.exec.clone(),
        }
    }
}

impl<R: 'static, E: 'static, A: 'static> Effect<R, E, A> {
    pub fn new<Fut>(f: impl Fn(R) -> Fut + Send + Sync + 'static) -> Self
    where
        Fut: Future<Output = Result<A, E>> + Send + 'static,
    {
        Effect {
            exec: Arc::new(move |env: R| f(env).boxed()),
        }
    }

    pub fn from_fn(f: impl Fn(R) -> Result<A, E> + Send + Sync + 'static) -> Self
    where
        A: Send,
        E: Send,
    {
        Self::new(move |env| futures::future::ready(f(env)))
    }

    pub fn succeed(value: A) -> Self
    where
        A: Clone + Send + Sync,
        E: Send,
    {
        Self::from_fn(move |_| Ok(value.clone()))
    }

    pub fn fail(error: E) -> Self
    where
        A: Send,
        E: Clone + Send + Sync,
    {
        Self::from_fn(move |_| Err(error.clone()))
    }

    /// Succeed with a value computed from the environment.
    pub fn access(f: impl Fn(&R) -> A + Send + Sync + 'static) -> Self
    where
        A: Send,
        E: Send,
    {
        Self::from_fn(move |env| Ok(f(&env)))
    }

    pub fn run(&self, env: R) -> BoxFuture<'static, Result<A, E>> {
        (self.exec)(env)
    }

    /// Run this effect with an environment translated from `R0` via `f`.
    ///
    /// `f` is applied when the adapted effect is run, before this effect starts.
    pub fn provide_some<R0: 'static>(
        self,
        f: impl Fn(R0) -> R + Send + Sync + 'static,
    ) -> Effect<R0, E, A> {
        let exec = self.exec;
        Effect {
            exec: Arc::new(move |env: R0| exec(f(env))),
        }
    }

    /// Eliminate the environment requirement entirely.
    pub fn provide(self, env: R) -> Effect<(), E, A>
    where
        R: Clone + Send + Sync,
    {
        self.provide_some(move |()| env.clone())
    }

    /// Build the environment with `layer` before every run.
    pub fn provide_layer<R0: 'static>(self, layer: Layer<R0, E, R>) -> Effect<R0, E, A>
    where
        R: Send,
        E: Send,
    {
        let exec = self.exec;
        Effect::new(move |env: R0| {
            let built = layer.build(env);
            let exec = exec.clone();
            async move {
                let provided = built.await?;
                exec(provided).await
            }
        })
    }

    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> Effect<R, E, B> {
        let exec = self.exec;
        let f = Arc::new(f);
        Effect {
            exec: Arc::new(move |env: R| {
                let f = f.clone();
                exec(env).map(move |result| result.map(|a| f(a))).boxed()
            }),
        }
    }

    pub fn map_err<E2: 'static>(
        self,
        f: impl Fn(E) -> E2 + Send + Sync + 'static,
    ) -> Effect<R, E2, A> {
        let exec = self.exec;
        let f = Arc::new(f);
        Effect {
            exec: Arc::new(move |env: R| {
                let f = f.clone();
                exec(env).map(move |result| result.map_err(|e| f(e))).boxed()
            }),
        }
    }

    /// Sequence a dependent effect after this one, sharing the environment.
    pub fn and_then<B: 'static>(
        self,
        f: impl Fn(A) -> Effect<R, E, B> + Send + Sync + 'static,
    ) -> Effect<R, E, B>
    where
        R: Clone + Send,
        E: Send,
    {
        let exec = self.exec;
        let f = Arc::new(f);
        Effect::new(move |env: R| {
            let first = exec(env.clone());
            let f = f.clone();
            async move {
                let a = first.await?;
                f(a).run(env).await
            }
        })
    }

    /// Re-run this effect after each failure for as long as `schedule` continues, feeding it
    /// every error. Once the schedule is done the last error is returned.
    pub fn retry<Out: 'static>(self, schedule: Schedule<R, E, Out>) -> Effect<R, E, A>
    where
        R: Clone + Send + Sync,
        E: Clone + Send,
    {
        let exec = self.exec;
        Effect::new(move |env: R| {
            let exec = exec.clone();
            let mut driver = schedule.driver();
            async move {
                loop {
                    let error = match exec(env.clone()).await {
                        Ok(value) => return Ok(value),
                        Err(error) => error,
                    };
                    let delay = match driver.next(&env, error.clone()) {
                        Decision::Continue { delay, .. } => delay,
                        Decision::Done { .. } => {
                            debug!(attempts = driver.steps(), "retry schedule exhausted");
                            return Err(error);
                        }
                    };
                    debug!(attempt = driver.steps(), ?delay, "effect failed, retrying");
                    pause(delay).await;
                }
            }
        })
    }

    /// Re-run this effect after each success for as long as `schedule` continues, feeding it
    /// every value. Succeeds with the schedule's final output; the first failure stops it.
    pub fn repeat<Out: 'static>(self, schedule: Schedule<R, A, Out>) -> Effect<R, E, Out>
    where
        R: Clone + Send + Sync,
        E: Send,
        Out: Send,
    {
        let exec = self.exec;
        Effect::new(move |env: R| {
            let exec = exec.clone();
            let mut driver = schedule.driver();
            async move {
                loop {
                    let value = exec(env.clone()).await?;
                    let delay = match driver.next(&env, value) {
                        Decision::Continue { delay, .. } => delay,
                        Decision::Done { out } => return Ok(out),
                    };
                    trace!(repetition = driver.steps(), ?delay, "repeating effect");
                    pause(delay).await;
                }
            }
        })
    }
}

impl<R: Send + 'static, E: Send + 'static> Effect<R, E, R> {
    /// Succeed with the environment itself.
    pub fn environment() -> Self {
        Effect::from_fn(Ok)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

impl<E: 'static, A: 'static> Contravariant for Effect<PartiallyApplied, E, A> {
    type Consumer<X> = Effect<X, E, A>;

    fn contramap<R: 'static, R0: 'static>(
        input: Self::Consumer<R>,
        f: impl Fn(R0) -> R + Send + Sync + 'static,
    ) -> Self::Consumer<R0> {
        input.provide_some(f)
    }
}

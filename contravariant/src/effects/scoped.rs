use std::{future::Future, panic::AssertUnwindSafe, sync::Arc};

use futures::{future::BoxFuture, FutureExt};
use tracing::{trace, warn};

use crate::{effects::Effect, Contravariant, PartiallyApplied};

type Finalizer = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// An acquired resource together with the finalizer that releases it.
///
/// The finalizer is only built when the resource is released, so nothing in it runs early.
pub struct Reservation<A> {
    pub resource: A,
    finalizer: Finalizer,
}

impl<A> Reservation<A> {
    pub fn new(
        resource: A,
        finalizer: impl FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    ) -> Self {
        Self {
            resource,
            finalizer: Box::new(finalizer),
        }
    }

    /// Release the resource without using it.
    pub async fn release(self) {
        (self.finalizer)().await
    }
}

// Releases on drop if `use_resource` is abandoned mid-use.
struct ReleaseGuard(Option<Finalizer>);

impl ReleaseGuard {
    async fn release(mut self) {
        if let Some(finalizer) = self.0.take() {
            finalizer().await;
        }
    }
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        let Some(finalizer) = self.0.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                trace!("scoped use abandoned, releasing in the background");
                handle.spawn(finalizer());
            }
            Err(_) => warn!("scoped use abandoned outside a runtime, resource not released"),
        }
    }
}

/// A computation that acquires a resource `A` from an environment `R`, failing with `E`, and
/// guarantees the resource's release once it has been used.
pub struct Scoped<R, E, A> {
    reserve: Arc<dyn Fn(R) -> BoxFuture<'static, Result<Reservation<A>, E>> + Send + Sync>,
}

impl<R, E, A> Clone for Scoped<R, E, A> {
    fn clone(&self) -> Self {
        Self {
            reserve: self.reserve.clone(),
        }
    }
}

impl<R: 'static, E: 'static, A: 'static> Scoped<R, E, A> {
    /// Acquire via `acquire` and release with `release`. `release` is called only once the
    /// resource is done with, on a copy of the resource kept back at acquisition.
    pub fn acquire_release<Fut>(
        acquire: Effect<R, E, A>,
        release: impl Fn(&A) -> Fut + Send + Sync + 'static,
    ) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
        E: Send,
        A: Clone + Send,
    {
        let release = Arc::new(release);
        Scoped {
            reserve: Arc::new(move |env: R| {
                let acquiring = acquire.run(env);
                let release = release.clone();
                async move {
                    let resource = acquiring.await?;
                    trace!("scoped resource acquired");
                    let kept = resource.clone();
                    Ok(Reservation::new(resource, move || release(&kept).boxed()))
                }
                .boxed()
            }),
        }
    }

    /// A resource with nothing to release.
    pub fn from_effect(effect: Effect<R, E, A>) -> Self
    where
        E: Send,
        A: Send,
    {
        Scoped {
            reserve: Arc::new(move |env: R| {
                effect
                    .run(env)
                    .map(|acquired| {
                        acquired.map(|resource| {
                            Reservation::new(resource, || futures::future::ready(()).boxed())
                        })
                    })
                    .boxed()
            }),
        }
    }

    pub fn reserve(&self, env: R) -> BoxFuture<'static, Result<Reservation<A>, E>> {
        (self.reserve)(env)
    }

    /// Acquire the resource, hand it to `f`, then release it whatever `f`'s outcome.
    ///
    /// A panic in `f` is re-raised once the resource is released. If the returned future is
    /// dropped mid-use, the release is spawned onto the current tokio runtime.
    pub async fn use_resource<B, Fut>(&self, env: R, f: impl FnOnce(A) -> Fut) -> Result<B, E>
    where
        Fut: Future<Output = Result<B, E>>,
    {
        let Reservation {
            resource,
            finalizer,
        } = self.reserve(env).await?;
        let guard = ReleaseGuard(Some(finalizer));
        let outcome = AssertUnwindSafe(async move { f(resource).await })
            .catch_unwind()
            .await;
        guard.release().await;
        trace!("scoped resource released");
        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    pub fn map<B: 'static>(self, f: impl Fn(A) -> B + Send + Sync + 'static) -> Scoped<R, E, B> {
        let reserve = self.reserve;
        let f = Arc::new(f);
        Scoped {
            reserve: Arc::new(move |env: R| {
                let f = f.clone();
                reserve(env)
                    .map(move |reserved| {
                        reserved.map(|Reservation { resource, finalizer }| {
                            Reservation::new(f(resource), finalizer)
                        })
                    })
                    .boxed()
            }),
        }
    }

    /// Acquire with an environment translated from `R0` via `f`. Acquisition and release are
    /// otherwise untouched.
    pub fn provide_some<R0: 'static>(
        self,
        f: impl Fn(R0) -> R + Send + Sync + 'static,
    ) -> Scoped<R0, E, A> {
        let reserve = self.reserve;
        Scoped {
            reserve: Arc::new(move |env: R0| reserve(f(env))),
        }
    }
}

impl<E: 'static, A: 'static> Contravariant for Scoped<PartiallyApplied, E, A> {
    type Consumer<X> = Scoped<X, E, A>;

    fn contramap<A0: 'static, B: 'static>(
        input: Self::Consumer<A0>,
        f: impl Fn(B) -> A0 + Send + Sync + 'static,
    ) -> Self::Consumer<B> {
        input.provide_some(f)
    }
}

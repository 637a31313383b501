use std::{sync::Arc, time::Duration};

use crate::{Contravariant, PartiallyApplied};

/// The outcome of a single schedule step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision<Out> {
    /// recur again after `delay`
    Continue { out: Out, delay: Duration },
    /// stop recurring
    Done { out: Out },
}

impl<Out> Decision<Out> {
    pub fn out(&self) -> &Out {
        match self {
            Decision::Continue { out, .. } | Decision::Done { out } => out,
        }
    }

    pub fn into_out(self) -> Out {
        match self {
            Decision::Continue { out, .. } | Decision::Done { out } => out,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Decision::Done { .. })
    }

    pub fn map<B>(self, f: impl FnOnce(Out) -> B) -> Decision<B> {
        match self {
            Decision::Continue { out, delay } => Decision::Continue { out: f(out), delay },
            Decision::Done { out } => Decision::Done { out: f(out) },
        }
    }
}

type StepFn<Env, In, Out> = Box<dyn FnMut(&Env, In) -> Decision<Out> + Send>;

/// A recurrence policy consuming inputs of type `In` (errors when retrying, successes when
/// repeating) in some environment `Env`, and producing a [`Decision`] for each of them.
///
/// A schedule is a recipe: every [`Schedule::driver`] call starts a fresh run with its own
/// state, so a single schedule can drive any number of independent retries.
pub struct Schedule<Env, In, Out> {
    start: Arc<dyn Fn() -> StepFn<Env, In, Out> + Send + Sync>,
}

impl<Env, In, Out> Clone for Schedule<Env, In, Out> {
    fn clone(&self) -> Self {
        Self {
            start: self.start.clone(),
        }
    }
}

/// One running instance of a [`Schedule`].
pub struct ScheduleDriver<Env, In, Out> {
    step: StepFn<Env, In, Out>,
    steps: u64,
}

impl<Env, In, Out> ScheduleDriver<Env, In, Out> {
    /// Feed the next input to the schedule.
    pub fn next(&mut self, env: &Env, input: In) -> Decision<Out> {
        self.steps += 1;
        (self.step)(env, input)
    }

    /// number of inputs fed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl<Env: 'static, In: 'static, Out: 'static> Schedule<Env, In, Out> {
    /// Build a schedule from a factory of stateful step functions. `start` is called once per
    /// driver.
    pub fn from_step<S>(start: impl Fn() -> S + Send + Sync + 'static) -> Self
    where
        S: FnMut(&Env, In) -> Decision<Out> + Send + 'static,
    {
        Schedule {
            start: Arc::new(move || Box::new(start()) as StepFn<Env, In, Out>),
        }
    }

    pub fn driver(&self) -> ScheduleDriver<Env, In, Out> {
        ScheduleDriver {
            step: (self.start)(),
            steps: 0,
        }
    }

    /// Translate every input via `f` before it reaches this schedule's step function.
    pub fn contramap_input<In0: 'static>(
        self,
        f: impl Fn(In0) -> In + Send + Sync + 'static,
    ) -> Schedule<Env, In0, Out> {
        let start = self.start;
        let f = Arc::new(f);
        Schedule::from_step(move || {
            let mut step = start();
            let f = f.clone();
            move |env: &Env, input: In0| step(env, f(input))
        })
    }

    pub fn map<Out2: 'static>(
        self,
        f: impl Fn(Out) -> Out2 + Send + Sync + 'static,
    ) -> Schedule<Env, In, Out2> {
        let start = self.start;
        let f = Arc::new(f);
        Schedule::from_step(move || {
            let mut step = start();
            let f = f.clone();
            move |env: &Env, input: In| step(env, input).map(|out| f(out))
        })
    }
}

impl<Env: 'static, In: 'static> Schedule<Env, In, u64> {
    /// Recur `n` times, outputting the number of recurrences so far.
    pub fn recurs(n: u64) -> Self {
        Schedule::from_step(move || {
            let mut count = 0;
            move |_: &Env, _: In| {
                if count < n {
                    count += 1;
                    Decision::Continue {
                        out: count,
                        delay: Duration::ZERO,
                    }
                } else {
                    Decision::Done { out: count }
                }
            }
        })
    }

    /// Recur forever without delay, outputting the number of recurrences so far.
    pub fn forever() -> Self {
        Self::spaced(Duration::ZERO)
    }

    /// Recur forever, waiting `interval` between recurrences.
    pub fn spaced(interval: Duration) -> Self {
        Schedule::from_step(move || {
            let mut count = 0;
            move |_: &Env, _: In| {
                count += 1;
                Decision::Continue {
                    out: count,
                    delay: interval,
                }
            }
        })
    }
}

impl<Env: 'static, In: 'static> Schedule<Env, In, Duration> {
    /// Recur forever with delays `base`, `base * factor`, `base * factor^2`, ..., outputting
    /// the current delay. Delays saturate at `Duration::MAX`.
    pub fn exponential(base: Duration, factor: f64) -> Self {
        Schedule::from_step(move || {
            let mut exponent = 0.0;
            move |_: &Env, _: In| {
                let delay = Duration::try_from_secs_f64(base.as_secs_f64() * factor.powf(exponent))
                    .unwrap_or(Duration::MAX);
                exponent += 1.0;
                Decision::Continue { out: delay, delay }
            }
        })
    }
}

impl<Env: 'static, A: 'static> Schedule<Env, A, A> {
    /// Recur forever, outputting each input unchanged.
    pub fn identity() -> Self {
        Self::recur_while(|_| true)
    }

    /// Recur while `predicate` holds for the input, outputting each input.
    pub fn recur_while(predicate: impl Fn(&A) -> bool + Send + Sync + 'static) -> Self {
        let predicate = Arc::new(predicate);
        Schedule::from_step(move || {
            let predicate = predicate.clone();
            move |_: &Env, input: A| {
                if predicate(&input) {
                    Decision::Continue {
                        out: input,
                        delay: Duration::ZERO,
                    }
                } else {
                    Decision::Done { out: input }
                }
            }
        })
    }

    /// Recur until `predicate` holds for the input, outputting each input.
    pub fn recur_until(predicate: impl Fn(&A) -> bool + Send + Sync + 'static) -> Self {
        Self::recur_while(move |input| !predicate(input))
    }
}

impl<Env: 'static, Out: 'static> Contravariant for Schedule<Env, PartiallyApplied, Out> {
    type Consumer<X> = Schedule<Env, X, Out>;

    fn contramap<A: 'static, B: 'static>(
        input: Self::Consumer<A>,
        f: impl Fn(B) -> A + Send + Sync + 'static,
    ) -> Self::Consumer<B> {
        input.contramap_input(f)
    }
}

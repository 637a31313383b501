use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
    time::Duration,
};

use contravariant::{
    effects::{Decision, Effect, Layer, Queue, Ref, Schedule, Scoped, Sink, Stream},
    Contravariant, ContravariantLaws, PartiallyApplied,
};
use proptest::prelude::*;

use crate::support::{block_on, init_test_logging};

fn decisions<In, Out>(schedule: &Schedule<(), In, Out>, inputs: Vec<In>) -> Vec<Decision<Out>>
where
    In: 'static,
    Out: 'static,
{
    let mut driver = schedule.driver();
    inputs.into_iter().map(|input| driver.next(&(), input)).collect()
}

fn below(limit: i64) -> Schedule<(), i64, i64> {
    Schedule::recur_while(move |n| *n < limit)
}

fn parity() -> Effect<i64, String, String> {
    Effect::from_fn(|n: i64| match n {
        n if n < 0 => Err(format!("{n} is negative")),
        n if n % 2 == 0 => Ok("even".to_string()),
        _ => Ok("odd".to_string()),
    })
}

// everything offered through `queue`, then whatever it holds, oldest first
fn drained<In: Send + 'static>(queue: Queue<In, String>, inputs: Vec<In>) -> Vec<String> {
    block_on(async move {
        for input in inputs {
            queue.offer(input).await.unwrap();
        }
        let mut held = Vec::new();
        while let Ok(Some(label)) = queue.poll() {
            held.push(label);
        }
        held
    })
}

fn labelled() -> Queue<u32, String> {
    Queue::<String, String>::bounded(4).contramap_offer(|n: u32| format!("#{n}"))
}

proptest! {
    #[test]
    fn schedule_laws(limit in -50i64..50, inputs in prop::collection::vec(any::<i8>(), 0..20)) {
        type Shape = Schedule<(), PartiallyApplied, i64>;
        let wide: Vec<i64> = inputs.iter().copied().map(i64::from).collect();

        let identity = Shape::identity_law(below(limit), |l, r| {
            decisions(&l, wide.clone()) == decisions(&r, wide.clone())
        });
        prop_assert!(identity, "identity law");
        let composition = Shape::composition_law(
            below(limit),
            |n: i8| i32::from(n) * 2,
            |n: i32| i64::from(n) - 1,
            |l, r| decisions(&l, inputs.clone()) == decisions(&r, inputs.clone()),
        );
        prop_assert!(composition, "composition law");
    }

    #[test]
    fn effect_laws(env in any::<i32>()) {
        type Shape = Effect<PartiallyApplied, String, String>;

        let identity = Shape::identity_law(parity(), |l, r| {
            block_on(l.run(i64::from(env))) == block_on(r.run(i64::from(env)))
        });
        prop_assert!(identity, "identity law");
        let composition = Shape::composition_law(
            parity(),
            |s: String| s.len() as i32 - 3,
            |n: i32| i64::from(n) * 7,
            |l, r| block_on(l.run(env.to_string())) == block_on(r.run(env.to_string())),
        );
        prop_assert!(composition, "composition law");
    }

    #[test]
    fn ref_laws(value in any::<u16>()) {
        type Shape = Ref<Infallible, Infallible, PartiallyApplied, u64>;

        let identity = Shape::identity_law(Ref::new(7u64), |l, r| {
            l.set(u64::from(value)).unwrap();
            let left = l.get();
            r.set(u64::from(value)).unwrap();
            left == r.get()
        });
        prop_assert!(identity, "identity law");
        let composition = Shape::composition_law(
            Ref::new(7u64),
            |n: u16| u32::from(n) + 1,
            |n: u32| u64::from(n) << 8,
            |l, r| {
                l.set(value).unwrap();
                let left = l.get();
                r.set(value).unwrap();
                left == r.get()
            },
        );
        prop_assert!(composition, "composition law");
    }

    #[test]
    fn sink_laws(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..5), 0..5)) {
        type Shape = Sink<(), (), u64, PartiallyApplied, Vec<u64>>;

        let identity = Shape::identity_law(Sink::take(6), |l, r| {
            let wide: Vec<Vec<u64>> = chunks
                .iter()
                .map(|chunk| chunk.iter().copied().map(u64::from).collect())
                .collect();
            l.run_chunks((), wide.clone()) == r.run_chunks((), wide)
        });
        prop_assert!(identity, "identity law");
        let composition = Shape::composition_law(
            Sink::take(6),
            |n: u8| u32::from(n) * 2,
            |n: u32| u64::from(n) + 1,
            |l, r| l.run_chunks((), chunks.clone()) == r.run_chunks((), chunks.clone()),
        );
        prop_assert!(composition, "composition law");
    }

    #[test]
    fn stream_laws(from in 0u32..20) {
        type Shape = Stream<PartiallyApplied, String, u32>;
        let countdown = || Stream::from_fn(|from: u32| {
            futures::stream::iter((0..=from).rev().map(Ok))
        });

        let identity = Shape::identity_law(countdown(), |l, r| {
            block_on(l.run_collect(from)) == block_on(r.run_collect(from))
        });
        prop_assert!(identity, "identity law");
        let composition = Shape::composition_law(
            countdown(),
            |s: String| s.len(),
            |n: usize| n as u32,
            |l, r| {
                let env = "x".repeat(from as usize);
                block_on(l.run_collect(env.clone())) == block_on(r.run_collect(env))
            },
        );
        prop_assert!(composition, "composition law");
    }

    #[test]
    fn layer_laws(csv in "[ab,]{0,6}", copies in 0usize..4) {
        type Shape = Layer<PartiallyApplied, String, Vec<String>>;
        let split = || {
            Layer::from_effect(Effect::from_fn(|csv: String| {
                if csv.is_empty() {
                    Err("empty".to_string())
                } else {
                    Ok(csv.split(',').map(str::to_string).collect::<Vec<_>>())
                }
            }))
        };

        let identity = Shape::identity_law(split(), |l, r| {
            block_on(l.build(csv.clone())) == block_on(r.build(csv.clone()))
        });
        prop_assert!(identity, "identity law");
        let unit = csv.clone();
        let composition = Shape::composition_law(
            split(),
            move |n: usize| unit.repeat(n),
            |s: String| s.replace(',', ";,"),
            |l, r| block_on(l.build(copies)) == block_on(r.build(copies)),
        );
        prop_assert!(composition, "composition law");
    }

    #[test]
    fn scoped_laws(user in "[a-z]{1,8}", id in any::<u8>()) {
        type Shape = Scoped<PartiallyApplied, String, String>;
        let log = Arc::new(Mutex::new(Vec::new()));
        let session = {
            let log = log.clone();
            move || {
                let log = log.clone();
                Scoped::acquire_release(
                    Effect::from_fn(|user: String| Ok(format!("session:{user}"))),
                    move |session: &String| {
                        let log = log.clone();
                        let session = session.clone();
                        async move { log.lock().unwrap().push(session) }
                    },
                )
            }
        };
        let used = |scoped: Scoped<String, String, String>| {
            block_on(scoped.use_resource(user.clone(), |s| async move { Ok(s.len()) }))
        };

        let identity = Shape::identity_law(session(), |l, r| used(l) == used(r));
        prop_assert!(identity, "identity law");
        let composition = Shape::composition_law(
            session(),
            |id: u8| u32::from(id) * 10,
            |id: u32| format!("user{id}"),
            |l, r| {
                let scope = |s: Scoped<u8, String, String>| {
                    block_on(s.use_resource(id, |session| async move { Ok(session) }))
                };
                scope(l) == scope(r)
            },
        );
        prop_assert!(composition, "composition law");

        let by_user = format!("session:{user}");
        let by_id = format!("session:user{}", u32::from(id) * 10);
        prop_assert_eq!(
            log.lock().unwrap().clone(),
            vec![by_user.clone(), by_user, by_id.clone(), by_id]
        );
    }

    #[test]
    fn queue_laws(values in prop::collection::vec(any::<u8>(), 0..=4)) {
        type Shape = Queue<PartiallyApplied, String>;
        let wide: Vec<u32> = values.iter().copied().map(u32::from).collect();
        let narrow = |flag: u8| u16::from(flag) * 3;
        let widen = |n: u16| u32::from(n) + 41;

        let identity = Shape::identity_law(labelled(), |l, r| {
            drained(l, wide.clone()) == drained(r, wide.clone())
        });
        prop_assert!(identity, "identity law");
        let composition = Shape::composition_law(labelled(), narrow, widen, |l, r| {
            drained(l, values.clone()) == drained(r, values.clone())
        });
        prop_assert!(composition, "composition law");

        // the same laws again, each side on a queue of its own
        prop_assert_eq!(
            drained(Shape::contramap(labelled(), |n: u32| n), wide.clone()),
            drained(labelled(), wide)
        );
        prop_assert_eq!(
            drained(Shape::contramap(Shape::contramap(labelled(), widen), narrow), values.clone()),
            drained(Shape::contramap(labelled(), move |flag| widen(narrow(flag))), values)
        );
    }
}

// translation and wrapped failures both surface unchanged through every adapted shape
#[test]
fn failures_pass_through_adaptation() {
    init_test_logging();

    let adapted = Effect::<i64, String, String>::provide_some(parity(), |s: &'static str| {
        s.parse::<i64>().unwrap_or(-1)
    });
    assert_eq!(block_on(adapted.run("x")), Err("-1 is negative".to_string()));

    let retried = parity()
        .retry(Schedule::recurs(2).contramap_input(|error: String| error.len()))
        .provide_some(|s: String| s.len() as i64 - 10);
    assert_eq!(block_on(retried.run("abc".to_string())), Err("-7 is negative".to_string()));

    let failing = Sink::<(), &str, u8, u8, ()>::fail("closed").contramap_in(|c: char| c as u8);
    assert_eq!(failing.run_chunks((), vec![vec!['a']]).result, Err("closed"));

    let stream = Stream::<u8, String, u8>::fail("eof".to_string()).provide_some(|_: ()| 0);
    assert_eq!(block_on(stream.run_collect(())), Err("eof".to_string()));
}

#[test]
fn retries_are_paced_by_the_adapted_schedule() {
    init_test_logging();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap();

    rt.block_on(async {
        let started = tokio::time::Instant::now();
        // 1s, 2s, 4s, ... whatever the error
        let backoff = Schedule::<i64, usize, Duration>::exponential(Duration::from_secs(1), 2.0)
            .contramap_input(|error: String| error.len());
        let always_failing = parity().retry(backoff).provide_some(|_: ()| -2);

        let timed_out =
            tokio::time::timeout(Duration::from_secs(100), always_failing.run(())).await;

        assert!(timed_out.is_err());
        assert!(started.elapsed() >= Duration::from_secs(100));
    });
}

use contravariant::*;
use proptest::prelude::*;

// every trailing argument is an i16
macro_rules! trailing {
    ($v:ident) => {
        i16
    };
}

// for each arity: the adapted function only translates its first argument, and both laws hold
macro_rules! arity_suite {
    ($test:ident, $name:ident, $arity:literal $(, $v:ident)*) => {
        proptest! {
            #[test]
            fn $test(b in any::<i32>(), c in any::<u8>(), rest in any::<[i16; 21]>()) {
                type Shape = $name<PartiallyApplied, $(trailing!($v),)* i64>;

                let [$($v,)* ..] = rest;
                // weighted by position, so a swapped or dropped argument changes the sum
                let weighted = $name::new(|a: i64 $(, $v: i16)*| {
                    let args: Vec<i64> = vec![a $(, i64::from($v))*];
                    args.iter().zip(1..).map(|(arg, weight)| arg * weight).sum::<i64>()
                });
                let translate = |b: i32| i64::from(b) * 3 - 1;

                let adapted = Shape::contramap(weighted.clone(), translate);
                prop_assert_eq!(
                    adapted.call(b $(, $v)*),
                    weighted.call(translate(b) $(, $v)*)
                );

                let identity = Shape::identity_law(weighted.clone(), |l, r| {
                    l.call(i64::from(b) $(, $v)*) == r.call(i64::from(b) $(, $v)*)
                });
                prop_assert!(identity, "identity law, arity {}", $arity);
                let composition = Shape::composition_law(
                    weighted,
                    |c: u8| i32::from(c) - 128,
                    translate,
                    |l, r| l.call(c $(, $v)*) == r.call(c $(, $v)*),
                );
                prop_assert!(composition, "composition law, arity {}", $arity);
                prop_assert_eq!($name::<i64, $(trailing!($v),)* i64>::ARITY, $arity);
            }
        }
    };
}

arity_suite!(arity_1, Function1, 1);
arity_suite!(arity_2, Function2, 2, v2);
arity_suite!(arity_3, Function3, 3, v2, v3);
arity_suite!(arity_4, Function4, 4, v2, v3, v4);
arity_suite!(arity_5, Function5, 5, v2, v3, v4, v5);
arity_suite!(arity_6, Function6, 6, v2, v3, v4, v5, v6);
arity_suite!(arity_7, Function7, 7, v2, v3, v4, v5, v6, v7);
arity_suite!(arity_8, Function8, 8, v2, v3, v4, v5, v6, v7, v8);
arity_suite!(arity_9, Function9, 9, v2, v3, v4, v5, v6, v7, v8, v9);
arity_suite!(arity_10, Function10, 10, v2, v3, v4, v5, v6, v7, v8, v9, v10);
arity_suite!(arity_11, Function11, 11, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11);
arity_suite!(arity_12, Function12, 12, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12);
arity_suite!(arity_13, Function13, 13, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13);
arity_suite!(
    arity_14, Function14, 14, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14
);
arity_suite!(
    arity_15, Function15, 15, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15
);
arity_suite!(
    arity_16, Function16, 16, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15, v16
);
arity_suite!(
    arity_17, Function17, 17, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15, v16,
    v17
);
arity_suite!(
    arity_18, Function18, 18, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15, v16,
    v17, v18
);
arity_suite!(
    arity_19, Function19, 19, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15, v16,
    v17, v18, v19
);
arity_suite!(
    arity_20, Function20, 20, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15, v16,
    v17, v18, v19, v20
);
arity_suite!(
    arity_21, Function21, 21, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15, v16,
    v17, v18, v19, v20, v21
);
arity_suite!(
    arity_22, Function22, 22, v2, v3, v4, v5, v6, v7, v8, v9, v10, v11, v12, v13, v14, v15, v16,
    v17, v18, v19, v20, v21, v22
);

#[test]
fn describes_the_length_of_a_string() {
    let describe = Function1::new(|x: usize| format!("n={x}"));
    let adapter = |s: String| s.len();

    let adapted = Function1::<PartiallyApplied, String>::contramap(describe.clone(), adapter);

    assert_eq!(adapted.call("hello".to_string()), "n=5");
    assert_eq!(
        adapted.call("hello".to_string()),
        describe.call(adapter("hello".to_string()))
    );
}

#[test]
#[should_panic(expected = "no digits")]
fn translation_failures_reach_the_caller() {
    let square = Function2::new(|n: u32, scale: u32| n * n * scale);
    let parsed = Function2::<PartiallyApplied, u32, u32>::contramap(square, |s: &'static str| {
        s.parse::<u32>().expect("no digits")
    });

    parsed.call("twelve", 1);
}

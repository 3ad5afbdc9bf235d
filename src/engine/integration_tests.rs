// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::chain::{
    no_op, BuildChain, BuildItem, Cardinality, ChainBuilder, ItemId, StepDescriptor, StepOutputs,
};
use crate::engine::{InitialItems, Lookup, WaveExecutor};
use crate::errors::{BuildError, BuildFailure, StepFailureKind};
use crate::traits::BuildExecutor;

#[derive(Debug, PartialEq)]
struct Mode(&'static str);
impl BuildItem for Mode {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

#[derive(Debug, PartialEq)]
struct Sources(Vec<&'static str>);
impl BuildItem for Sources {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

#[derive(Debug, PartialEq)]
struct Report(String);
impl BuildItem for Report {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

#[derive(Debug, PartialEq)]
struct Contribution(usize);
impl BuildItem for Contribution {
    const CARDINALITY: Cardinality = Cardinality::Multi;
}

#[derive(Debug)]
struct Ready;
impl BuildItem for Ready {
    const CARDINALITY: Cardinality = Cardinality::Marker;
}

#[derive(Debug, PartialEq)]
struct Banner(&'static str);
impl BuildItem for Banner {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

struct Unproduced;
impl BuildItem for Unproduced {
    const CARDINALITY: Cardinality = Cardinality::Single;
}

fn build<F: FnOnce(&mut ChainBuilder)>(setup: F) -> BuildChain {
    let mut builder = ChainBuilder::new();
    setup(&mut builder);
    builder.build().unwrap()
}

fn failure(error: BuildError) -> BuildFailure {
    match error {
        BuildError::Failed(failure) => failure,
        other => panic!("expected a step failure, got {}", other),
    }
}

/// Initial value -> scan -> report, each step seeing exactly what it consumed.
#[tokio::test]
async fn test_values_flow_between_waves() {
    let chain = build(|builder| {
        builder.add_initial::<Mode>().unwrap();
        builder
            .register(
                StepDescriptor::builder("scan")
                    .consumes::<Mode>()
                    .produces::<Sources>()
                    .build(|inputs| {
                        let mode = inputs.consume::<Mode>()?;
                        let sources = if mode.0 == "dev" {
                            vec!["Main.java", "DevConfig.java"]
                        } else {
                            vec!["Main.java"]
                        };
                        Ok(StepOutputs::new().with(Sources(sources)))
                    }),
            )
            .unwrap();
        builder
            .register(
                StepDescriptor::builder("report")
                    .consumes::<Sources>()
                    .produces::<Report>()
                    .build(|inputs| {
                        let sources = inputs.consume::<Sources>()?;
                        Ok(StepOutputs::new().with(Report(format!("{} sources", sources.0.len()))))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let result = chain.execution().provide(Mode("dev")).run().await.unwrap();

    assert_eq!(result.consume::<Report>(), Some(&Report("2 sources".to_string())));
    assert_eq!(result.consume::<Mode>(), Some(&Mode("dev")));
    assert!(result.is_present::<Sources>());
    assert_eq!(result.wave_count(), 2);
    let executed: Vec<&str> = result.executed_steps().iter().map(|id| id.as_str()).collect();
    assert_eq!(executed, vec!["scan", "report"]);
}

/// Multi values follow registration order however long each producer takes.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_multi_values_in_registration_order() {
    const PRODUCERS: usize = 8;
    let chain = build(|builder| {
        for i in 0..PRODUCERS {
            builder
                .register(
                    StepDescriptor::builder(format!("contribute-{}", i))
                        .produces::<Contribution>()
                        .build(move |_| {
                            // later registrations finish first
                            thread::sleep(Duration::from_millis(((PRODUCERS - i) * 5) as u64));
                            Ok(StepOutputs::new().with(Contribution(i)))
                        }),
                )
                .unwrap();
        }
        builder.request_final::<Contribution>();
    });

    let result = chain.run_with(&WaveExecutor::new(PRODUCERS)).await.unwrap();
    let values: Vec<usize> = result
        .consume_multi::<Contribution>()
        .into_iter()
        .map(|c| c.0)
        .collect();
    assert_eq!(values, (0..PRODUCERS).collect::<Vec<_>>());

    match result.get(&ItemId::of::<Contribution>()) {
        Lookup::Multi(values) => assert_eq!(values.len(), PRODUCERS),
        other => panic!("expected multi values, got {:?}", other),
    }
}

/// Every Multi producer finishes before any consumer starts.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_consumer_sees_every_contribution() {
    let chain = build(|builder| {
        for i in 0..4 {
            builder
                .register(
                    StepDescriptor::builder(format!("contribute-{}", i))
                        .produces::<Contribution>()
                        .build(move |_| {
                            thread::sleep(Duration::from_millis(10 * i as u64));
                            Ok(StepOutputs::new().with(Contribution(i)))
                        }),
                )
                .unwrap();
        }
        builder
            .register(
                StepDescriptor::builder("summarize")
                    .consumes_optional::<Contribution>()
                    .produces::<Report>()
                    .build(|inputs| {
                        let total: usize = inputs
                            .consume_multi::<Contribution>()
                            .iter()
                            .map(|c| c.0)
                            .sum();
                        Ok(StepOutputs::new().with(Report(format!("total {}", total))))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let result = chain.run().await.unwrap();
    assert_eq!(result.consume::<Report>(), Some(&Report("total 6".to_string())));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_max_concurrency_is_respected() {
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let chain = build(|builder| {
        for i in 0..6 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            builder
                .register(
                    StepDescriptor::builder(format!("worker-{}", i))
                        .produces::<Contribution>()
                        .build(move |_| {
                            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                            peak.fetch_max(now, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            running.fetch_sub(1, Ordering::SeqCst);
                            Ok(StepOutputs::new().with(Contribution(i)))
                        }),
                )
                .unwrap();
        }
        builder.request_final::<Contribution>();
    });

    let executor = WaveExecutor::new(2);
    let result = chain.run_with(&executor).await.unwrap();

    assert_eq!(result.consume_multi::<Contribution>().len(), 6);
    assert!(peak.load(Ordering::SeqCst) <= 2);
    assert!(peak.load(Ordering::SeqCst) >= 1);
}

/// All failures of a wave are reported; later waves never start.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_wave_failures_are_aggregated() {
    let later_ran = Arc::new(AtomicBool::new(false));
    let sibling_finished = Arc::new(AtomicBool::new(false));

    let chain = {
        let later_ran = Arc::clone(&later_ran);
        let sibling_finished = Arc::clone(&sibling_finished);
        build(move |builder| {
            builder
                .register(
                    StepDescriptor::builder("fails-first")
                        .produces::<Contribution>()
                        .build(|_| Err(anyhow::anyhow!("disk full"))),
                )
                .unwrap();
            builder
                .register(
                    StepDescriptor::builder("slow-sibling")
                        .produces::<Contribution>()
                        .build(move |_| {
                            thread::sleep(Duration::from_millis(30));
                            sibling_finished.store(true, Ordering::SeqCst);
                            Ok(StepOutputs::new().with(Contribution(1)))
                        }),
                )
                .unwrap();
            builder
                .register(
                    StepDescriptor::builder("fails-second")
                        .produces::<Contribution>()
                        .build(|_| Err(anyhow::anyhow!("no network"))),
                )
                .unwrap();
            builder
                .register(
                    StepDescriptor::builder("later")
                        .consumes_optional::<Contribution>()
                        .produces::<Report>()
                        .build(move |_| {
                            later_ran.store(true, Ordering::SeqCst);
                            Ok(StepOutputs::new().with(Report("done".into())))
                        }),
                )
                .unwrap();
            builder.request_final::<Report>();
        })
    };

    let error = chain.run().await.unwrap_err();
    let failure = failure(error);

    assert_eq!(failure.wave, 0);
    let failed: Vec<&str> = failure.causes.iter().map(|c| c.step.as_str()).collect();
    assert_eq!(failed, vec!["fails-first", "fails-second"]);
    assert!(failure.causes.iter().all(|c| c.kind == StepFailureKind::Failed));
    assert_eq!(failure.causes[0].message, "disk full");
    assert!(sibling_finished.load(Ordering::SeqCst));
    assert!(!later_ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_panicking_step_is_reported() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("explodes")
                    .produces::<Report>()
                    .build(|_| panic!("boom")),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let failure = failure(chain.run().await.unwrap_err());
    assert_eq!(failure.causes.len(), 1);
    assert_eq!(failure.causes[0].kind, StepFailureKind::Panicked);
    assert_eq!(failure.causes[0].message, "boom");
}

#[tokio::test]
async fn test_undeclared_output_is_rejected() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("sneaky")
                    .produces::<Report>()
                    .build(|_| {
                        Ok(StepOutputs::new()
                            .with(Report("ok".into()))
                            .with(Banner("surprise")))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let failure = failure(chain.run().await.unwrap_err());
    assert_eq!(failure.causes[0].kind, StepFailureKind::InvalidProduction);
    assert!(failure.causes[0].message.contains("undeclared item Banner"));
}

#[tokio::test]
async fn test_single_output_twice_is_rejected() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("twice")
                    .produces::<Report>()
                    .build(|_| {
                        Ok(StepOutputs::new()
                            .with(Report("a".into()))
                            .with(Report("b".into())))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let failure = failure(chain.run().await.unwrap_err());
    assert_eq!(failure.causes[0].kind, StepFailureKind::InvalidProduction);
    assert!(failure.causes[0].message.contains("more than once"));
}

/// A kept producer that returns nothing leaves its Required consumer failing.
#[tokio::test]
async fn test_missing_required_value_fails_consumer() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("lazy")
                    .produces::<Sources>()
                    .build(no_op),
            )
            .unwrap();
        builder
            .register(
                StepDescriptor::builder("report")
                    .consumes::<Sources>()
                    .produces::<Report>()
                    .build(|inputs| {
                        let sources = inputs.consume::<Sources>()?;
                        Ok(StepOutputs::new().with(Report(format!("{:?}", sources))))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let failure = failure(chain.run().await.unwrap_err());
    assert_eq!(failure.wave, 1);
    assert_eq!(failure.causes[0].step.as_str(), "report");
    assert!(failure.causes[0].message.contains("no value was produced"));
}

#[tokio::test]
async fn test_optional_input_may_be_absent() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("report")
                    .consumes_optional::<Banner>()
                    .produces::<Report>()
                    .build(|inputs| {
                        let banner = inputs.get::<Banner>().map(|b| b.0).unwrap_or("none");
                        Ok(StepOutputs::new().with(Report(banner.to_string())))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let result = chain.run().await.unwrap();
    assert_eq!(result.consume::<Report>(), Some(&Report("none".to_string())));
}

#[tokio::test]
async fn test_order_only_consumer_gets_no_value() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("prepare")
                    .produces::<Ready>()
                    .always_active()
                    .build(|_| Ok(StepOutputs::new().with(Ready))),
            )
            .unwrap();
        builder
            .register(
                StepDescriptor::builder("report")
                    .after::<Ready>()
                    .produces::<Report>()
                    .build(|inputs| {
                        let seen = inputs.is_present::<Ready>() || inputs.consume::<Ready>().is_ok();
                        Ok(StepOutputs::new().with(Report(format!("saw ready: {}", seen))))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    assert_eq!(chain.wave_of("report"), Some(1));
    let result = chain.run().await.unwrap();
    assert_eq!(result.consume::<Report>(), Some(&Report("saw ready: false".to_string())));
    assert!(matches!(result.get(&ItemId::of::<Ready>()), Lookup::Marker));
}

#[tokio::test]
async fn test_pruned_steps_never_run() {
    let pruned_ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&pruned_ran);

    let chain = build(move |builder| {
        builder
            .register(
                StepDescriptor::builder("report")
                    .produces::<Report>()
                    .build(|_| Ok(StepOutputs::new().with(Report("r".into())))),
            )
            .unwrap();
        builder
            .register(
                StepDescriptor::builder("unused")
                    .produces::<Banner>()
                    .build(move |_| {
                        flag.store(true, Ordering::SeqCst);
                        Ok(StepOutputs::new().with(Banner("b")))
                    }),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let result = chain.run().await.unwrap();
    assert!(!pruned_ran.load(Ordering::SeqCst));
    assert!(!result.get(&ItemId::of::<Banner>()).is_produced());
    assert!(result.consume::<Banner>().is_none());
}

#[tokio::test]
async fn test_final_item_without_producer_is_not_produced() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("report")
                    .produces::<Report>()
                    .build(|_| Ok(StepOutputs::new().with(Report("r".into())))),
            )
            .unwrap();
        builder.request_final::<Report>().request_final::<Unproduced>();
    });

    let result = chain.run().await.unwrap();
    assert!(result.is_present::<Report>());
    assert!(matches!(
        result.get(&ItemId::of::<Unproduced>()),
        Lookup::NotProduced
    ));
}

/// An overridable producer kept for another output has its value discarded.
#[tokio::test]
async fn test_overridden_value_is_discarded() {
    let chain = build(|builder| {
        builder
            .register(
                StepDescriptor::builder("defaults")
                    .produces_overridable::<Banner>()
                    .produces::<Contribution>()
                    .build(|_| {
                        Ok(StepOutputs::new()
                            .with(Banner("default"))
                            .with(Contribution(7)))
                    }),
            )
            .unwrap();
        builder
            .register(
                StepDescriptor::builder("custom-banner")
                    .produces::<Banner>()
                    .build(|_| Ok(StepOutputs::new().with(Banner("custom")))),
            )
            .unwrap();
        builder.request_final::<Banner>().request_final::<Contribution>();
    });

    assert!(chain.contains_step("defaults"));
    let result = chain.run().await.unwrap();
    assert_eq!(result.consume::<Banner>(), Some(&Banner("custom")));
    assert_eq!(result.consume_multi::<Contribution>(), vec![&Contribution(7)]);
}

#[tokio::test]
async fn test_initial_items_are_validated() {
    let chain = build(|builder| {
        builder.add_initial::<Mode>().unwrap();
        builder
            .register(
                StepDescriptor::builder("report")
                    .consumes_optional::<Mode>()
                    .produces::<Report>()
                    .build(|_| Ok(StepOutputs::new().with(Report("r".into())))),
            )
            .unwrap();
        builder.request_final::<Report>();
    });

    let error = chain
        .execution()
        .provide(Banner("not initial"))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(error, BuildError::UndeclaredInitial { item } if item == ItemId::of::<Banner>()));

    let error = chain
        .execution()
        .provide(Mode("dev"))
        .provide(Mode("prod"))
        .run()
        .await
        .unwrap_err();
    assert!(matches!(error, BuildError::DuplicateInitial { .. }));
}

/// Caller-supplied Multi values come before every step's contributions.
#[tokio::test]
async fn test_initial_multi_values_come_first() {
    let chain = build(|builder| {
        builder.add_initial::<Contribution>().unwrap();
        builder
            .register(
                StepDescriptor::builder("contribute")
                    .produces::<Contribution>()
                    .build(|_| Ok(StepOutputs::new().with(Contribution(2)))),
            )
            .unwrap();
        builder.request_final::<Contribution>();
    });

    let mut initial = InitialItems::new();
    initial.provide(Contribution(0)).provide(Contribution(1));
    assert_eq!(initial.len(), 2);

    let executor = WaveExecutor::default();
    let result = executor.execute(&chain, initial).await.unwrap();
    let values: Vec<usize> = result
        .consume_multi::<Contribution>()
        .into_iter()
        .map(|c| c.0)
        .collect();
    assert_eq!(values, vec![0, 1, 2]);
}

/// A built chain can be run repeatedly; each run starts from an empty store.
#[tokio::test]
async fn test_chain_runs_are_independent() {
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&counter);

    let chain = build(move |builder| {
        builder
            .register(
                StepDescriptor::builder("count")
                    .produces::<Contribution>()
                    .build(move |_| {
                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        Ok(StepOutputs::new().with(Contribution(n)))
                    }),
            )
            .unwrap();
        builder.request_final::<Contribution>();
    });

    let first = chain.run().await.unwrap();
    let second = chain.run().await.unwrap();

    assert_eq!(first.consume_multi::<Contribution>(), vec![&Contribution(0)]);
    assert_eq!(second.consume_multi::<Contribution>(), vec![&Contribution(1)]);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_empty_chain_runs() {
    let chain = build(|_| {});
    let result = chain.run().await.unwrap();
    assert_eq!(result.item_count(), 0);
    assert!(result.executed_steps().is_empty());
}

#[test]
fn test_executor_settings() {
    let executor = WaveExecutor::new(0);
    assert_eq!(executor.max_concurrency(), 1);
    assert_eq!(executor.strategy(), "waves");
    assert!(WaveExecutor::default().max_concurrency() >= 1);
}


use self::test_utils::*;
use assert_call::{call, CallRecorder};
use futures::{executor::LocalPool, task::LocalSpawnExt};
use std::rc::Rc;
use unimut::*;

struct Logged(&'static str);

impl Middleware<Counter, Action> for Logged {
    fn apply(
        &self,
        action: Action,
        _store: &Store<Counter, Action>,
        next: Next<'_, Counter, Action>,
    ) {
        call!("before {}", self.0);
        next.run(action);
        call!("after {}", self.0);
    }
}

fn logged_reducer(action: &Action, state: &Counter) -> Counter {
    call!("reduce {action:?}");
    counter_reducer(action, state)
}

fn publish_log(store: &Store<Counter, Action>) -> Subscription {
    store.subscribe(|s| {
        call!("publish {}:{}", s.label, s.count);
    })
}

#[test]
fn middlewares_wrap_reducer_and_subscribers() {
    init_logger();
    let mut cr = CallRecorder::new();
    let store = Store::builder(Counter::default(), logged_reducer)
        .middleware(Logged("1"))
        .middleware(Logged("2"))
        .middleware(Logged("3"))
        .build();
    let _s = publish_log(&store);

    store.dispatch(Action::IncrementBy(1));

    cr.verify([
        "before 1",
        "before 2",
        "before 3",
        "reduce IncrementBy(1)",
        "publish :1",
        "after 3",
        "after 2",
        "after 1",
    ]);
}

#[test]
fn middleware_can_drop_action() {
    let mut cr = CallRecorder::new();
    let store = Store::builder(Counter::default(), logged_reducer)
        .middleware(middleware_fn(
            |action: Action, _: &Store<Counter, Action>, next| {
                if action != Action::Noop {
                    next.run(action);
                }
            },
        ))
        .build();
    let _s = publish_log(&store);
    let before = store.state();

    store.dispatch(Action::Noop);

    cr.verify(());
    assert!(Rc::ptr_eq(&before, &store.state()));
}

#[test]
fn middleware_can_replace_action() {
    let mut cr = CallRecorder::new();
    let store = Store::builder(Counter::default(), logged_reducer)
        .middleware(middleware_fn(
            |action: Action, _: &Store<Counter, Action>, next| match action {
                Action::IncrementBy(n) if n < 0 => next.run(Action::IncrementBy(0)),
                action => next.run(action),
            },
        ))
        .build();

    store.dispatch(Action::IncrementBy(-3));

    cr.verify("reduce IncrementBy(0)");
    assert_eq!(store.state().count, 0);
}

#[test]
fn follow_up_dispatch_completes_before_after_phase() {
    let mut cr = CallRecorder::new();
    let store = Store::builder(Counter::default(), logged_reducer)
        .middleware(Logged("outer"))
        .middleware(middleware_fn(
            |action: Action, store: &Store<Counter, Action>, next| {
                let follow_up = matches!(action, Action::Rename(_));
                next.run(action);
                if follow_up {
                    store.dispatch(Action::IncrementBy(1));
                    call!("follow-up done");
                }
            },
        ))
        .build();
    let _s = publish_log(&store);

    store.dispatch(Action::Rename("a"));

    cr.verify([
        "before outer",
        "reduce Rename(\"a\")",
        "publish a:0",
        "before outer",
        "reduce IncrementBy(1)",
        "publish a:1",
        "after outer",
        "follow-up done",
        "after outer",
    ]);
    assert_eq!(*store.state(), Counter { count: 1, label: "a".into() });
}

#[test]
fn middleware_reads_live_state() {
    let mut cr = CallRecorder::new();
    let store = Store::builder(Counter::default(), counter_reducer)
        .middleware(middleware_fn(
            |action: Action, store: &Store<Counter, Action>, next| {
                call!("before {}", store.state().count);
                next.run(action);
                call!("after {}", store.state().count);
            },
        ))
        .build();

    store.dispatch(Action::IncrementBy(2));

    cr.verify(["before 0", "after 2"]);
}

#[test]
fn passthrough_middlewares_keep_changed_policy() {
    let store = Store::builder(Counter::default(), counter_reducer)
        .middleware(middleware_fn(
            |action: Action, _: &Store<Counter, Action>, next| next.run(action),
        ))
        .middleware(middleware_fn(
            |action: Action, _: &Store<Counter, Action>, next| next.run(action),
        ))
        .dedup()
        .build();
    let r = record(&store);

    store.dispatch(Action::IncrementBy(0));
    store.dispatch(Action::IncrementBy(5));

    assert_eq!(r.finish().iter().map(|s| s.count).collect::<Vec<_>>(), vec![5]);
}

#[test]
fn middleware_dispatches_from_spawned_task() {
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let store = Store::builder(Counter::default(), counter_reducer)
        .middleware(middleware_fn(
            move |action: Action, store: &Store<Counter, Action>, next| {
                if action == Action::Noop {
                    let dispatcher = store.dispatcher();
                    spawner
                        .spawn_local(async move {
                            dispatcher.dispatch(Action::IncrementBy(10));
                        })
                        .unwrap();
                }
                next.run(action);
            },
        ))
        .build();
    let r = record(&store);

    store.dispatch(Action::Noop);
    assert_eq!(store.state().count, 0);

    pool.run_until_stalled();
    assert_eq!(store.state().count, 10);
    assert_eq!(r.finish().len(), 2);
}

#[test]
fn spawned_task_outliving_store_is_discarded() {
    init_logger();
    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let store = Store::builder(Counter::default(), counter_reducer)
        .middleware(middleware_fn(
            move |action: Action, store: &Store<Counter, Action>, next| {
                let dispatcher = store.dispatcher();
                spawner
                    .spawn_local(async move {
                        assert_eq!(
                            dispatcher.try_dispatch(Action::Noop),
                            Err(StoreError::Dropped)
                        );
                    })
                    .unwrap();
                next.run(action);
            },
        ))
        .build();

    store.dispatch(Action::IncrementBy(1));
    drop(store);

    pool.run_until_stalled();
}

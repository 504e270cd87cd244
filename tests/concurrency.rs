use paged_litedb::{BsonAutoId, ErrorKind, LiteEngine, LiteSettings, MemoryDisk, Query, document};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn open(timeout: Duration) -> LiteEngine {
    let engine = LiteEngine::new(LiteSettings::new(MemoryDisk::new()).with_timeout(timeout)).unwrap();
    engine
        .insert("items", vec![document! { "_id" => 1, "v" => 1 }], BsonAutoId::Int32)
        .unwrap();
    engine
}

#[test]
fn readers_run_together() {
    let engine = open(Duration::from_secs(10));
    // both readers must be inside their transaction to pass the barrier
    let barrier = Arc::new(Barrier::new(2));

    thread::scope(|s| {
        for _ in 0..2 {
            let barrier = barrier.clone();
            let engine = &engine;
            s.spawn(move || {
                let query = Query::filter("v", move |_| {
                    barrier.wait();
                    true
                });
                assert_eq!(engine.count("items", query).unwrap(), 1);
            });
        }
    });
}

#[test]
fn writer_times_out_while_reading() {
    let engine = open(Duration::from_millis(50));
    let entered = Arc::new(Barrier::new(2));

    thread::scope(|s| {
        let reader_entered = entered.clone();
        let engine = &engine;
        s.spawn(move || {
            let query = Query::filter("v", move |_| {
                reader_entered.wait();
                thread::sleep(Duration::from_millis(500));
                true
            });
            engine.count("items", query).unwrap();
        });

        entered.wait();
        let err = engine
            .insert("items", vec![document! { "v" => 2 }], BsonAutoId::Int32)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LockTimeout);
        assert!(err.is_retryable());
    });

    engine
        .insert("items", vec![document! { "v" => 2 }], BsonAutoId::Int32)
        .unwrap();
    assert_eq!(engine.count("items", Query::all()).unwrap(), 2);
}

#[test]
fn writers_are_serialized() {
    let engine = open(Duration::from_secs(10));

    thread::scope(|s| {
        for t in 0..4 {
            let engine = &engine;
            s.spawn(move || {
                for i in 0..50 {
                    engine
                        .insert(
                            "items",
                            vec![document! { "t" => t, "i" => i }],
                            BsonAutoId::Int32,
                        )
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(engine.count("items", Query::all()).unwrap(), 201);
    assert_eq!(engine.count("items", Query::eq("t", 3)).unwrap(), 50);
}

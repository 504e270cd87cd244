use paged_litedb::bson::{Document, Value};
use paged_litedb::{BsonAutoId, ErrorKind, LiteEngine, LiteSettings, MemoryDisk, Order, Query, document};

fn open() -> LiteEngine {
    LiteEngine::new(LiteSettings::new(MemoryDisk::new()).with_level_seed(42)).unwrap()
}

fn ids(docs: &[Document]) -> Vec<i32> {
    docs.iter()
        .map(|x| x.get("_id").and_then(Value::as_i32).unwrap())
        .collect()
}

fn numbers(engine: &LiteEngine, count: i32) {
    let docs = (1..=count)
        .map(|i| {
            document! {
                "_id" => i,
                "n" => i,
                "name" => format!("name{i:04}"),
                "parity" => if i % 2 == 0 { "even" } else { "odd" },
            }
        })
        .collect();
    assert_eq!(engine.insert("numbers", docs, BsonAutoId::Int32).unwrap(), count as usize);
}

#[test]
fn thousand_documents_with_secondary_index() {
    let engine = LiteEngine::new(
        LiteSettings::new(MemoryDisk::new())
            .with_level_seed(7)
            .with_checkpoint_pages(10),
    )
    .unwrap();
    numbers(&engine, 1000);

    assert!(engine.ensure_index("numbers", "n", false).unwrap());
    assert!(!engine.ensure_index("numbers", "n", false).unwrap());

    let found = engine
        .find("numbers", Query::between("n", 100, 199), 0, usize::MAX)
        .unwrap();
    assert_eq!(ids(&found), (100..=199).collect::<Vec<_>>());

    assert!(engine.ensure_index("numbers", "name", false).unwrap());
    let found = engine
        .find("numbers", Query::between("name", "name0250", "name0349"), 0, usize::MAX)
        .unwrap();
    assert_eq!(ids(&found), (250..=349).collect::<Vec<_>>());
    let names = found
        .iter()
        .map(|x| x.get("name").and_then(Value::as_str).unwrap().to_string())
        .collect::<Vec<_>>();
    assert!(names.windows(2).all(|w| w[0] < w[1]));

    let deleted = engine
        .delete(
            "numbers",
            Query::filter("_id", |x| x.as_i32().is_some_and(|x| x % 2 == 0)),
        )
        .unwrap();
    assert_eq!(deleted, 500);
    assert_eq!(engine.count("numbers", Query::all()).unwrap(), 500);
    assert_eq!(engine.count("numbers", Query::eq("parity", "even")).unwrap(), 0);

    assert_eq!(engine.min("numbers", "n").unwrap(), Some(Value::Int32(1)));
    assert_eq!(engine.max("numbers", "n").unwrap(), Some(Value::Int32(999)));
    assert_eq!(engine.min("numbers", "_id").unwrap(), Some(Value::Int32(1)));

    assert_eq!(engine.min("numbers", "name").unwrap(), Some(Value::String("name0001".into())));
    assert_eq!(
        engine
            .find("numbers", Query::starts_with("name", "name002"), 0, usize::MAX)
            .unwrap()
            .len(),
        5
    );

    let err = engine.min("numbers", "parity").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexNotFound);
    assert_eq!(engine.max("missing", "n").unwrap(), None);
}

#[test]
fn queries_with_and_without_index() {
    let engine = open();
    numbers(&engine, 50);

    let run = |query: Query| ids(&engine.find("numbers", query, 0, usize::MAX).unwrap());

    let plain = [
        run(Query::lt("n", 4)),
        run(Query::gte("n", 48)),
        run(Query::starts_with("name", "name001")),
        run(Query::in_list("n", [3, 1, 3])),
        run(Query::and(Query::gt("n", 10), Query::lte("n", 12))),
    ];

    engine.ensure_index("numbers", "n", false).unwrap();
    engine.ensure_index("numbers", "name", true).unwrap();

    let indexed = [
        run(Query::lt("n", 4)),
        run(Query::gte("n", 48)),
        run(Query::starts_with("name", "name001")),
        run(Query::in_list("n", [3, 1, 3])),
        run(Query::and(Query::gt("n", 10), Query::lte("n", 12))),
    ];

    assert_eq!(plain[0], vec![1, 2, 3]);
    assert_eq!(plain[1], vec![48, 49, 50]);
    assert_eq!(plain[2], (10..=19).collect::<Vec<_>>());
    assert_eq!(plain[3], vec![1, 3]);
    assert_eq!(plain[4], vec![11, 12]);
    assert_eq!(plain, indexed);

    // comparisons do not cross types
    assert!(run(Query::gt("n", "a")).is_empty());
    assert_eq!(run(Query::not("n", 1)).len(), 49);
    assert_eq!(run(Query::or(Query::eq("n", 1), Query::lte("n", 2))), vec![1, 2]);
    assert_eq!(run(Query::All(Order::Descending))[..2], [50, 49]);
    assert_eq!(run(Query::eq("missing", Value::Null)).len(), 50);

    let page = engine.find("numbers", Query::all(), 10, 5).unwrap();
    assert_eq!(ids(&page), vec![11, 12, 13, 14, 15]);
    assert!(engine.exists("numbers", Query::eq("name", "name0042")).unwrap());
    assert!(!engine.exists("numbers", Query::eq("name", "name0051")).unwrap());
    assert!(engine.find("missing", Query::all(), 0, 10).unwrap().is_empty());
}

#[test]
fn auto_ids() {
    let engine = open();
    let docs = || vec![document! { "a" => 1 }, document! { "a" => 2 }];

    engine.insert("int32", docs(), BsonAutoId::Int32).unwrap();
    engine
        .insert("int32", vec![document! { "_id" => 10 }], BsonAutoId::Int32)
        .unwrap();
    engine.insert("int32", docs(), BsonAutoId::Int32).unwrap();
    let found = engine.find("int32", Query::all(), 0, usize::MAX).unwrap();
    assert_eq!(ids(&found), vec![1, 2, 10, 11, 12]);
    // the generated `_id` is the first field
    assert_eq!(found[0].iter().next().map(|x| x.0), Some("_id"));

    engine.insert("int64", docs(), BsonAutoId::Int64).unwrap();
    assert_eq!(
        engine.find_by_id("int64", Value::Int64(2)).unwrap().unwrap().get("a"),
        Some(&Value::Int32(2))
    );

    engine.insert("oid", docs(), BsonAutoId::ObjectId).unwrap();
    engine.insert("guid", docs(), BsonAutoId::Guid).unwrap();
    for (collection, expected) in [("oid", "ObjectId"), ("guid", "Guid")] {
        for doc in engine.find(collection, Query::all(), 0, usize::MAX).unwrap() {
            let id = format!("{:?}", doc.get("_id").unwrap());
            assert!(id.starts_with(expected), "{id}");
        }
    }

    for id in [Value::Null, Value::MinValue, Value::MaxValue] {
        let err = engine
            .insert("int32", vec![document! { "_id" => id }], BsonAutoId::Int32)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidId);
    }
}

#[test]
fn unique_index_rejects_whole_batch() {
    let engine = open();
    assert!(engine.ensure_index("users", "email", true).unwrap());

    let err = engine
        .insert(
            "users",
            vec![
                document! { "email" => "a@example.com" },
                document! { "email" => "a@example.com" },
            ],
            BsonAutoId::Int32,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert_eq!(engine.count("users", Query::all()).unwrap(), 0);

    engine
        .insert(
            "users",
            vec![document! { "email" => "a@example.com", "name" => "a" }],
            BsonAutoId::Int32,
        )
        .unwrap();
    let err = engine
        .insert("users", vec![document! { "_id" => 1 }], BsonAutoId::Int32)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);

    engine
        .insert(
            "users",
            vec![document! { "email" => "b@example.com", "name" => "a" }],
            BsonAutoId::Int32,
        )
        .unwrap();
    let err = engine.ensure_index("users", "name", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert_eq!(engine.indexes("users").unwrap().len(), 2);

    let err = engine.ensure_index("users", "email", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexAlreadyExists);
}

#[test]
fn update_and_upsert() {
    let engine = open();
    engine.ensure_index("items", "tag", false).unwrap();
    engine
        .insert(
            "items",
            vec![
                document! { "_id" => 1, "tag" => "red" },
                document! { "_id" => 2, "tag" => "blue" },
            ],
            BsonAutoId::Int32,
        )
        .unwrap();

    let updated = engine
        .update(
            "items",
            vec![
                document! { "_id" => 1, "tag" => "green", "size" => 3 },
                document! { "_id" => 3, "tag" => "red" },
                document! { "tag" => "red" },
            ],
        )
        .unwrap();
    assert_eq!(updated, 1);

    assert_eq!(engine.count("items", Query::eq("tag", "red")).unwrap(), 0);
    let green = engine.find("items", Query::eq("tag", "green"), 0, 10).unwrap();
    assert_eq!(green.len(), 1);
    assert_eq!(green[0].get("size"), Some(&Value::Int32(3)));

    let inserted = engine
        .upsert(
            "items",
            vec![
                document! { "_id" => 2, "tag" => "yellow" },
                document! { "_id" => 5, "tag" => "red" },
            ],
            BsonAutoId::Int32,
        )
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(engine.count("items", Query::all()).unwrap(), 3);
    assert_eq!(
        engine.find_by_id("items", Value::Int32(2)).unwrap().unwrap().get("tag"),
        Some(&Value::from("yellow"))
    );

    // an update to a large document moves the content to extend pages
    let large = "x".repeat(20_000);
    engine
        .update("items", vec![document! { "_id" => 5, "tag" => "red", "body" => large.as_str() }])
        .unwrap();
    let doc = engine.find_by_id("items", Value::Int32(5)).unwrap().unwrap();
    assert_eq!(doc.get("body").and_then(Value::as_str), Some(large.as_str()));
    assert_eq!(engine.count("items", Query::eq("tag", "red")).unwrap(), 1);
}

#[test]
fn delete_by_id_and_query() {
    let engine = open();
    numbers(&engine, 20);
    engine.ensure_index("numbers", "parity", false).unwrap();

    assert!(engine.delete_by_id("numbers", Value::Int32(3)).unwrap());
    assert!(!engine.delete_by_id("numbers", Value::Int32(3)).unwrap());
    assert!(!engine.delete_by_id("missing", Value::Int32(3)).unwrap());

    assert_eq!(engine.delete("numbers", Query::eq("parity", "odd")).unwrap(), 9);
    assert_eq!(engine.count("numbers", Query::all()).unwrap(), 10);
    assert_eq!(engine.count("numbers", Query::eq("parity", "even")).unwrap(), 10);
    assert_eq!(engine.delete("missing", Query::all()).unwrap(), 0);
}

#[test]
fn index_management() {
    let engine = open();
    numbers(&engine, 10);
    engine.ensure_index("numbers", "name", false).unwrap();

    let indexes = engine.indexes("numbers").unwrap();
    assert_eq!(
        indexes.iter().map(|x| (x.slot, x.field.as_str(), x.unique)).collect::<Vec<_>>(),
        vec![(0, "_id", true), (1, "name", false)]
    );
    assert!(!engine.ensure_index("numbers", "_id", true).unwrap());

    assert!(engine.drop_index("numbers", "name").unwrap());
    assert!(!engine.drop_index("numbers", "name").unwrap());
    assert_eq!(engine.indexes("numbers").unwrap().len(), 1);
    assert_eq!(engine.count("numbers", Query::eq("name", "name0004")).unwrap(), 1);

    let err = engine.drop_index("numbers", "_id").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIndexField);
    let err = engine.drop_index("missing", "name").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CollectionNotFound);
    let err = engine.ensure_index("numbers", "$bad", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIndexField);

    // a nested document is not an index key
    engine
        .insert("nested", vec![document! { "a" => document! { "b" => 1 } }], BsonAutoId::Int32)
        .unwrap();
    let err = engine.ensure_index("nested", "a", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidIndexKey);
    assert!(engine.ensure_index("nested", "a.b", false).unwrap());
    assert_eq!(engine.min("nested", "a.b").unwrap(), Some(Value::Int32(1)));

    for i in 1..16 {
        engine.ensure_index("numbers", &format!("field{i}"), false).unwrap();
    }
    let err = engine.ensure_index("numbers", "one_more", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexLimitExceeded);
}

#[test]
fn collections() {
    let engine = open();
    engine.insert("a", vec![document! {}], BsonAutoId::Int32).unwrap();
    engine.insert("b", vec![document! {}], BsonAutoId::Int32).unwrap();
    assert_eq!(engine.collection_names().unwrap(), vec!["a", "b"]);

    let err = engine.rename_collection("a", "b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CollectionAlreadyExists);
    let err = engine.rename_collection("c", "d").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CollectionNotFound);
    assert!(engine.rename_collection("a", "c").unwrap());
    assert_eq!(engine.count("c", Query::all()).unwrap(), 1);

    assert!(engine.drop_collection("b").unwrap());
    assert!(!engine.drop_collection("b").unwrap());
    assert_eq!(engine.collection_names().unwrap(), vec!["c"]);

    let err = engine
        .insert("bad name", vec![document! {}], BsonAutoId::Int32)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCollectionName);
}

#[test]
fn user_version() {
    let engine = open();
    assert_eq!(engine.user_version().unwrap(), 0);
    engine.set_user_version(3).unwrap();
    assert_eq!(engine.user_version().unwrap(), 3);
}

use paged_litedb::bson::Value;
use paged_litedb::{
    BsonAutoId, ErrorKind, FileDisk, LiteEngine, LiteSettings, MemoryDisk, PAGE_SIZE, PageCipher,
    Query, document,
};

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn reopen_memory_disk() {
    init_logs();
    let disk = MemoryDisk::new();
    {
        let engine = LiteEngine::new(LiteSettings::new(disk.clone())).unwrap();
        engine
            .insert(
                "people",
                (0..100).map(|i| document! { "name" => format!("p{i}") }).collect(),
                BsonAutoId::Int64,
            )
            .unwrap();
        engine.ensure_index("people", "name", true).unwrap();
        engine.set_user_version(12).unwrap();
    }
    assert_eq!(disk.to_bytes().len() % PAGE_SIZE, 0);

    let engine = LiteEngine::new(LiteSettings::new(disk.clone())).unwrap();
    assert_eq!(engine.user_version().unwrap(), 12);
    assert_eq!(engine.count("people", Query::all()).unwrap(), 100);
    let found = engine.find("people", Query::eq("name", "p42"), 0, 10).unwrap();
    assert_eq!(found[0].get("_id"), Some(&Value::Int64(43)));

    // the sequence is persisted with the collection
    engine
        .insert("people", vec![document! { "name" => "new" }], BsonAutoId::Int64)
        .unwrap();
    assert!(engine.find_by_id("people", Value::Int64(101)).unwrap().is_some());
}

#[test]
fn reopen_file_disk() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    {
        let engine = LiteEngine::new(LiteSettings::new(FileDisk::open(&path).unwrap())).unwrap();
        engine
            .insert(
                "files",
                vec![document! { "_id" => "readme", "size" => 10 }],
                BsonAutoId::ObjectId,
            )
            .unwrap();
        engine.checkpoint().unwrap();
    }
    assert_eq!(std::fs::metadata(&path).unwrap().len() as usize % PAGE_SIZE, 0);

    let engine = LiteEngine::new(LiteSettings::new(FileDisk::open(&path).unwrap())).unwrap();
    let doc = engine.find_by_id("files", Value::from("readme")).unwrap().unwrap();
    assert_eq!(doc.get("size"), Some(&Value::Int32(10)));
}

#[test]
fn large_documents_recycle_pages() {
    let disk = MemoryDisk::new();
    let engine = LiteEngine::new(LiteSettings::new(disk.clone())).unwrap();
    let body = "large".repeat(10_000);

    engine
        .insert("docs", vec![document! { "_id" => 1, "body" => body.as_str() }], BsonAutoId::Int32)
        .unwrap();
    let size = disk.to_bytes().len();
    let doc = engine.find_by_id("docs", Value::Int32(1)).unwrap().unwrap();
    assert_eq!(doc.get("body").and_then(Value::as_str), Some(body.as_str()));

    assert!(engine.delete_by_id("docs", Value::Int32(1)).unwrap());
    assert_eq!(engine.count("docs", Query::all()).unwrap(), 0);

    // the freed extend pages are allocated before the file grows
    engine
        .insert("docs", vec![document! { "_id" => 2, "body" => body.as_str() }], BsonAutoId::Int32)
        .unwrap();
    assert_eq!(disk.to_bytes().len(), size);

    // dropping the collection frees every page for other collections
    assert!(engine.drop_collection("docs").unwrap());
    engine
        .insert("other", vec![document! { "_id" => 3, "body" => body.as_str() }], BsonAutoId::Int32)
        .unwrap();
    assert_eq!(disk.to_bytes().len(), size);

    let err = engine
        .insert(
            "docs",
            vec![document! { "body" => vec![0u8; 17 * 1024 * 1024] }],
            BsonAutoId::Int32,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DocumentSizeExceeded);
}

struct XorCipher(u8);

impl PageCipher for XorCipher {
    fn encrypt(&self, _page_id: u32, page: &mut [u8; PAGE_SIZE]) {
        page.iter_mut().for_each(|x| *x ^= self.0);
    }

    fn decrypt(&self, page_id: u32, page: &mut [u8; PAGE_SIZE]) {
        self.encrypt(page_id, page)
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|x| x == needle)
}

#[test]
fn cipher_hides_pages() {
    let secret = b"top-secret-value";
    let disk = MemoryDisk::new();
    {
        let engine = LiteEngine::new(LiteSettings::new(disk.clone()).with_cipher(XorCipher(0x5a))).unwrap();
        engine
            .insert(
                "secrets",
                vec![document! { "value" => "top-secret-value" }],
                BsonAutoId::Int32,
            )
            .unwrap();
    }
    let bytes = disk.to_bytes();
    assert!(!contains(&bytes, secret));
    // header page is not encrypted
    assert!(contains(&bytes[..PAGE_SIZE], b"secrets"));

    let engine = LiteEngine::new(LiteSettings::new(disk.clone()).with_cipher(XorCipher(0x5a))).unwrap();
    let found = engine.find("secrets", Query::all(), 0, 1).unwrap();
    assert_eq!(found[0].get("value"), Some(&Value::from("top-secret-value")));

    let engine = LiteEngine::new(LiteSettings::new(disk.clone())).unwrap();
    assert!(engine.find("secrets", Query::all(), 0, 1).is_err());
}

#[test]
fn password() {
    let disk = MemoryDisk::new();
    LiteEngine::new(LiteSettings::new(disk.clone()).with_password("hunter2")).unwrap();

    for settings in [
        LiteSettings::new(disk.clone()),
        LiteSettings::new(disk.clone()).with_password("hunter3"),
    ] {
        let err = LiteEngine::new(settings).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::WrongPassword);
    }
    LiteEngine::new(LiteSettings::new(disk.clone()).with_password("hunter2")).unwrap();

    let plain = MemoryDisk::new();
    LiteEngine::new(LiteSettings::new(plain.clone())).unwrap();
    let err = LiteEngine::new(LiteSettings::new(plain).with_password("hunter2"))
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::WrongPassword);
}

#[test]
fn invalid_database_file() {
    let disk = MemoryDisk::from_bytes(vec![0x42; PAGE_SIZE * 2]);
    let err = LiteEngine::new(LiteSettings::new(disk)).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidDatabaseFile);

    // less than one page is not an empty database
    let disk = MemoryDisk::from_bytes(vec![b'x'; 100]);
    let err = LiteEngine::new(LiteSettings::new(disk.clone())).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidDatabaseFile);
    assert_eq!(disk.to_bytes(), vec![b'x'; 100]);
}

#[test]
fn short_file_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"not a database").unwrap();

    let err = LiteEngine::new(LiteSettings::new(FileDisk::open(&path).unwrap()))
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidDatabaseFile);
    assert_eq!(std::fs::read(&path).unwrap(), b"not a database");
}

#[test]
fn failed_transaction_leaves_no_changes() {
    let disk = MemoryDisk::new();
    let engine = LiteEngine::new(LiteSettings::new(disk.clone())).unwrap();
    engine
        .insert("items", vec![document! { "_id" => 1 }], BsonAutoId::Int32)
        .unwrap();
    let before = disk.to_bytes();

    let err = engine
        .insert(
            "items",
            vec![document! { "_id" => 2 }, document! { "_id" => 1 }],
            BsonAutoId::Int32,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    assert_eq!(disk.to_bytes(), before);
    assert!(engine.find_by_id("items", Value::Int32(2)).unwrap().is_none());
}

/// Creates a [`Document`](crate::bson::Document) from `key => value` pairs
#[macro_export]
macro_rules! document {
    {$($k:expr => $v:expr),* $(,)?} => {{
        #[allow(unused_mut)]
        let mut doc = $crate::bson::Document::new();
        $(doc.insert($k, $v);)*
        doc
    }}
}

/// Creates an [`Array`](crate::bson::Array) from values
#[macro_export]
macro_rules! array {
    [$($element:expr),* $(,)?] => {{
        #[allow(unused_mut)]
        let mut arr = $crate::bson::Array::new();
        $(arr.push($element);)*
        arr
    }};
}

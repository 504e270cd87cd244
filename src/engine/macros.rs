macro_rules! debug_log {
    ($category:ident: $($tt:tt)*) => {
        if cfg!(feature = "debug-logs") {
            ::tracing::debug!(target: concat!("paged_litedb::", stringify!($category)), $($tt)*);
        }
    };
}

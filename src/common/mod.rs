pub mod category_cache;
pub mod middleware_session;

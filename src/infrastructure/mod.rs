pub mod article_store;
pub mod ttl_store;

pub use article_store::{ArticleStore, MemoryArticleStore};
pub use ttl_store::{MemoryTtlStore, TtlStore};

pub mod annotation_pipeline;
pub mod article_processor;
pub mod batch_processor;

pub use annotation_pipeline::Annotator;
pub use article_processor::process_article;
pub use batch_processor::App;

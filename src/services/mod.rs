pub mod chunker;
pub mod llm_service;
pub mod notifier;
pub mod progress_tracker;
pub mod prompts;
pub mod quota;

pub use chunker::Chunker;
pub use llm_service::{LlmService, TextGenerator};
pub use notifier::{Notifier, NotifyPayload, NoopNotifier, WebhookNotifier};
pub use progress_tracker::ProgressTracker;
pub use quota::{MemoryQuotaLedger, QuotaLedger};

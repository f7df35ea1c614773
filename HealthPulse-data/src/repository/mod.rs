// Repository module structure
pub mod errors;
mod in_memory;
mod metric;
mod notifier;
mod profile;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use metric::{MetricRepository, MetricRepositoryTrait};
pub use notifier::ChangeNotifier;
pub use profile::{ProfileRepository, ProfileRepositoryTrait};

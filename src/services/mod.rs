//! External collaborators: price source, alert delivery, persistence.

pub mod notifier;
pub mod price_source;
pub mod store;
pub mod yahoo;

pub use notifier::{Notifier, WebhookNotifier};
pub use price_source::PriceSource;
pub use store::LevelsStore;
pub use yahoo::YahooPriceSource;

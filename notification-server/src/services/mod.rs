pub mod catalog;
pub mod messages;
pub mod metrics;
pub mod providers;
pub mod text;

pub use catalog::{Catalog, ProductKey};
pub use metrics::{get_metrics, init_metrics, record_notification, record_provider_call};
pub use text::truthy_text;
pub use providers::{
    AccessTokenSource, FcmProvider, MockPushProvider, ProviderError, PushProvider,
    ServiceAccountKey,
};

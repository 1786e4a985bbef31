// Services module
// Business logic layer for the application

pub mod analytics;
pub mod capacity;
pub mod click_tracking;
pub mod link;
pub mod ordering;
pub mod subscription;
pub mod user;

// Re-export commonly used services
pub use analytics::AnalyticsService;
pub use capacity::{LinkCapacity, FREE_TIER_MAX_LINKS};
pub use click_tracking::ClickRecorder;
pub use link::LinkService;
pub use ordering::OrderingError;
pub use subscription::SubscriptionService;
pub use user::UserService;

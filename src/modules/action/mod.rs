pub mod caption;
pub mod telegram;
pub mod facebook;

pub use caption::PostContent;
pub use telegram::TelegramPublisher;
pub use facebook::FacebookPublisher;

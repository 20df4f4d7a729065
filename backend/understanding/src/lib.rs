pub mod azure;
pub mod mock;
pub mod sentiment;

pub use azure::AzureSentimentProvider;
pub use mock::MockSentimentProvider;
pub use sentiment::{DocumentSentiment, SentimentClassifier, SentimentLabel, SentimentProvider};

//! Message router: turn one inbound event into a reply and log updates.
//!
//! Stateless per event. Canned triggers reply with a fixed multimedia
//! message and leave the log alone; any other text goes through the
//! generator and the sentiment classifier.
//!
//! Side effects are ordered reply first, then log writes, because reply
//! tokens are single-use and expire quickly. Neither a failed reply nor a
//! failed log write aborts the other.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use kokoro_core::{ConversationRecord, InboundEvent, ReplyMessage, ReplySender};
use kokoro_logging::redact_sensitive_data;
use kokoro_memory::ConversationStore;
use kokoro_planner::{ResponseGenerator, FALLBACK_REPLY};
use kokoro_understanding::{SentimentClassifier, SentimentLabel};

use crate::canned::CannedReply;

const DEFAULT_USER_KEY: &str = "大正妹";
const DEFAULT_BOT_KEY: &str = "gemini_bot";

/// Log keys for the two sides of every generated exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantKeys {
    pub user: String,
    pub bot: String,
}

impl Default for ParticipantKeys {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER_KEY.to_string(),
            bot: DEFAULT_BOT_KEY.to_string(),
        }
    }
}

/// What the router did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Canned(CannedReply),
    Generated {
        reply_text: String,
        generation_failed: bool,
    },
    /// Not a text message; no reply was sent.
    Ignored,
}

/// `generated` followed by the sentiment line.
pub fn compose_reply(generated: &str, sentiment: &SentimentLabel) -> String {
    format!("{}\nAnalyze User's input: {}", generated, sentiment)
}

pub struct MessageRouter {
    generator: ResponseGenerator,
    classifier: SentimentClassifier,
    store: Arc<dyn ConversationStore>,
    sender: Arc<dyn ReplySender>,
    keys: ParticipantKeys,
}

impl MessageRouter {
    pub fn new(
        generator: ResponseGenerator,
        classifier: SentimentClassifier,
        store: Arc<dyn ConversationStore>,
        sender: Arc<dyn ReplySender>,
    ) -> Self {
        Self {
            generator,
            classifier,
            store,
            sender,
            keys: ParticipantKeys::default(),
        }
    }

    pub fn with_keys(mut self, keys: ParticipantKeys) -> Self {
        self.keys = keys;
        self
    }

    pub async fn route(&self, event: &InboundEvent) -> RouteOutcome {
        let Some(text) = event.text_content() else {
            debug!(kind = ?event.message_kind, sender = %event.sender_id, "Unhandled message type");
            return RouteOutcome::Ignored;
        };

        if let Some(canned) = CannedReply::for_trigger(text) {
            info!(reply = canned.name(), sender = %event.sender_id, "Sending canned reply");
            self.send(&event.reply_token, &[canned.to_message()]).await;
            return RouteOutcome::Canned(canned);
        }

        self.route_generated(event, text).await
    }

    async fn route_generated(&self, event: &InboundEvent, text: &str) -> RouteOutcome {
        let (generated, generation_failed) = match self.generator.generate(text).await {
            Ok(generated) => (generated, false),
            Err(e) => {
                warn!(
                    error = %redact_sensitive_data(&e.to_string()),
                    "Generation failed; using fallback reply"
                );
                (FALLBACK_REPLY.to_string(), true)
            }
        };
        let sentiment = self.classifier.classify(text).await;

        let reply_text = compose_reply(&generated, &sentiment);
        self.send(&event.reply_token, &[ReplyMessage::text(reply_text.clone())])
            .await;

        self.record(&self.keys.user, ConversationRecord::user(text)).await;
        self.record(&self.keys.bot, ConversationRecord::bot(generated)).await;

        RouteOutcome::Generated {
            reply_text,
            generation_failed,
        }
    }

    async fn send(&self, reply_token: &str, messages: &[ReplyMessage]) {
        if let Err(e) = self.sender.reply(reply_token, messages).await {
            error!(error = %e, "Failed to send reply");
        }
    }

    async fn record(&self, participant: &str, record: ConversationRecord) {
        if let Err(e) = self.store.append(participant, record).await {
            error!(participant = %participant, error = %e, "Failed to append history");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use kokoro_core::{MessageKind, Role};
    use kokoro_memory::JsonFileStore;
    use kokoro_planner::{GenerationSettings, MockProvider};
    use kokoro_understanding::MockSentimentProvider;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, Vec<ReplyMessage>)>>,
        fail: bool,
    }

    impl RecordingSender {
        fn sent(&self) -> Vec<(String, Vec<ReplyMessage>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReplySender for RecordingSender {
        async fn reply(&self, reply_token: &str, messages: &[ReplyMessage]) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((reply_token.to_string(), messages.to_vec()));
            if self.fail {
                bail!("reply token expired");
            }
            Ok(())
        }
    }

    struct Harness {
        router: MessageRouter,
        sender: Arc<RecordingSender>,
        store: Arc<JsonFileStore>,
    }

    fn harness(provider: MockProvider, sender: RecordingSender) -> Harness {
        let store = Arc::new(JsonFileStore::new(
            std::env::temp_dir()
                .join(format!("kokoro-router-{}", uuid::Uuid::new_v4()))
                .join("chat_history.json"),
        ));
        let sender = Arc::new(sender);
        let router = MessageRouter::new(
            ResponseGenerator::new(Arc::new(provider), GenerationSettings::default()),
            SentimentClassifier::new(Arc::new(MockSentimentProvider::with_label("Positive"))),
            store.clone(),
            sender.clone(),
        );
        Harness {
            router,
            sender,
            store,
        }
    }

    #[tokio::test]
    async fn test_sticker_trigger_sends_sticker_only() {
        let h = harness(MockProvider::new("mock"), RecordingSender::default());

        let outcome = h.router.route(&InboundEvent::text("tok", "U1", "sticker")).await;
        assert_eq!(outcome, RouteOutcome::Canned(CannedReply::Sticker));

        let sent = h.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "tok");
        assert_eq!(
            sent[0].1,
            vec![ReplyMessage::Sticker {
                package_id: "1".into(),
                sticker_id: "2".into(),
            }]
        );
        assert!(h.store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_other_canned_triggers_leave_store_alone() {
        let h = harness(MockProvider::new("mock"), RecordingSender::default());
        for trigger in ["image", "video", "location"] {
            let outcome = h.router.route(&InboundEvent::text("tok", "U1", trigger)).await;
            assert!(matches!(outcome, RouteOutcome::Canned(c) if c.name() == trigger));
        }
        assert_eq!(h.sender.sent().len(), 3);
        assert!(h.store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_generated_reply_and_history() {
        let h = harness(
            MockProvider::new("mock").with_response("Hi there"),
            RecordingSender::default(),
        );

        let outcome = h.router.route(&InboundEvent::text("tok", "U1", "Hello")).await;
        assert_eq!(
            outcome,
            RouteOutcome::Generated {
                reply_text: "Hi there\nAnalyze User's input: Positive".into(),
                generation_failed: false,
            }
        );

        let sent = h.sender.sent();
        assert_eq!(
            sent[0].1,
            vec![ReplyMessage::text("Hi there\nAnalyze User's input: Positive")]
        );

        let log = h.store.load().await;
        let user = &log["大正妹"];
        let bot = &log["gemini_bot"];
        assert_eq!(user.len(), 1);
        assert_eq!(user[0].role, Role::User);
        assert_eq!(user[0].message, "Hello");
        assert_eq!(bot.len(), 1);
        assert_eq!(bot[0].role, Role::Bot);
        assert_eq!(bot[0].message, "Hi there");
        assert!(user[0].timestamp <= bot[0].timestamp);
    }

    #[tokio::test]
    async fn test_generation_failure_uses_fallback_with_sentiment() {
        let h = harness(MockProvider::new("mock").failing(), RecordingSender::default());

        let outcome = h.router.route(&InboundEvent::text("tok", "U1", "Hello")).await;
        let RouteOutcome::Generated {
            reply_text,
            generation_failed,
        } = outcome
        else {
            panic!("expected generated outcome");
        };
        assert!(generation_failed);
        assert!(reply_text.starts_with(FALLBACK_REPLY));
        assert!(reply_text.ends_with("\nAnalyze User's input: Positive"));

        let log = h.store.load().await;
        assert_eq!(log["gemini_bot"][0].message, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_failed_reply_still_records_history() {
        let sender = RecordingSender {
            fail: true,
            ..Default::default()
        };
        let h = harness(MockProvider::new("mock").with_response("Hi there"), sender);

        h.router.route(&InboundEvent::text("tok", "U1", "Hello")).await;
        let log = h.store.load().await;
        assert_eq!(log["大正妹"].len(), 1);
        assert_eq!(log["gemini_bot"].len(), 1);
    }

    /// Captures what the store held at the moment the reply went out.
    struct SnapshotSender {
        store: Arc<JsonFileStore>,
        seen: Mutex<Vec<kokoro_core::ConversationLog>>,
    }

    #[async_trait]
    impl ReplySender for SnapshotSender {
        async fn reply(&self, _reply_token: &str, _messages: &[ReplyMessage]) -> Result<()> {
            let log = self.store.load().await;
            self.seen.lock().unwrap().push(log);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_reply_goes_out_before_history_is_written() {
        let store = Arc::new(JsonFileStore::new(
            std::env::temp_dir()
                .join(format!("kokoro-router-{}", uuid::Uuid::new_v4()))
                .join("chat_history.json"),
        ));
        let sender = Arc::new(SnapshotSender {
            store: store.clone(),
            seen: Mutex::new(Vec::new()),
        });
        let router = MessageRouter::new(
            ResponseGenerator::new(
                Arc::new(MockProvider::new("mock").with_response("Hi there")),
                GenerationSettings::default(),
            ),
            SentimentClassifier::new(Arc::new(MockSentimentProvider::with_label("Positive"))),
            store.clone(),
            sender.clone(),
        );

        router.route(&InboundEvent::text("tok", "U1", "Hello")).await;

        let seen = sender.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_empty());
        assert_eq!(store.load().await.len(), 2);
    }

    #[tokio::test]
    async fn test_non_text_event_ignored() {
        let h = harness(MockProvider::new("mock"), RecordingSender::default());
        let event = InboundEvent {
            reply_token: "tok".into(),
            sender_id: "U1".into(),
            message_kind: MessageKind::Image,
            text: None,
        };

        assert_eq!(h.router.route(&event).await, RouteOutcome::Ignored);
        assert!(h.sender.sent().is_empty());
        assert!(h.store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_custom_keys() {
        let h = harness(
            MockProvider::new("mock").with_response("ok"),
            RecordingSender::default(),
        );
        let router = h.router.with_keys(ParticipantKeys {
            user: "alice".into(),
            bot: "kokoro".into(),
        });
        router.route(&InboundEvent::text("tok", "U1", "hey")).await;

        let log = h.store.load().await;
        assert!(log.contains_key("alice"));
        assert!(log.contains_key("kokoro"));
    }

    #[test]
    fn test_compose_reply() {
        assert_eq!(
            compose_reply("Hi there", &SentimentLabel::new("Positive")),
            "Hi there\nAnalyze User's input: Positive"
        );
        assert_eq!(
            compose_reply("x", &SentimentLabel::unknown()),
            "x\nAnalyze User's input: unknown"
        );
    }
}

//! Fixed multimedia replies selected by exact trigger text.

use kokoro_core::ReplyMessage;

const STICKER_PACKAGE_ID: &str = "1";
const STICKER_ID: &str = "2";

const IMAGE_ORIGINAL_URL: &str = "https://images.unsplash.com/photo-1503023345310-bd7c1de61c7d";
const IMAGE_PREVIEW_URL: &str = "https://upload.wikimedia.org/wikipedia/commons/thumb/4/47/PNG_transparency_demonstration_1.png/240px-PNG_transparency_demonstration_1.png";

const VIDEO_ORIGINAL_URL: &str =
    "https://download.blender.org/peach/bigbuckbunny_movies/BigBuckBunny_320x180.mp4";
const VIDEO_PREVIEW_URL: &str =
    "https://peach.blender.org/wp-content/uploads/title_anouncement.jpg?x11217";

const LOCATION_TITLE: &str = "Mask Map";
const LOCATION_ADDRESS: &str = "花蓮";
const LOCATION_LATITUDE: f64 = 23.601916;
const LOCATION_LONGITUDE: f64 = 121.5189989;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedReply {
    Sticker,
    Image,
    Video,
    Location,
}

impl CannedReply {
    /// Exact, case-sensitive match on the whole message text.
    pub fn for_trigger(text: &str) -> Option<Self> {
        match text {
            "sticker" => Some(Self::Sticker),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "location" => Some(Self::Location),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sticker => "sticker",
            Self::Image => "image",
            Self::Video => "video",
            Self::Location => "location",
        }
    }

    pub fn to_message(&self) -> ReplyMessage {
        match self {
            Self::Sticker => ReplyMessage::Sticker {
                package_id: STICKER_PACKAGE_ID.to_string(),
                sticker_id: STICKER_ID.to_string(),
            },
            Self::Image => ReplyMessage::Image {
                original_content_url: IMAGE_ORIGINAL_URL.to_string(),
                preview_image_url: IMAGE_PREVIEW_URL.to_string(),
            },
            Self::Video => ReplyMessage::Video {
                original_content_url: VIDEO_ORIGINAL_URL.to_string(),
                preview_image_url: VIDEO_PREVIEW_URL.to_string(),
            },
            Self::Location => ReplyMessage::Location {
                title: LOCATION_TITLE.to_string(),
                address: LOCATION_ADDRESS.to_string(),
                latitude: LOCATION_LATITUDE,
                longitude: LOCATION_LONGITUDE,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers_are_exact() {
        assert_eq!(CannedReply::for_trigger("sticker"), Some(CannedReply::Sticker));
        assert_eq!(CannedReply::for_trigger("location"), Some(CannedReply::Location));
        assert_eq!(CannedReply::for_trigger("Sticker"), None);
        assert_eq!(CannedReply::for_trigger(" image"), None);
        assert_eq!(CannedReply::for_trigger("videos"), None);
    }

    #[test]
    fn test_messages_match_kind() {
        for reply in [
            CannedReply::Sticker,
            CannedReply::Image,
            CannedReply::Video,
            CannedReply::Location,
        ] {
            assert_eq!(reply.to_message().kind(), reply.name());
        }
    }

    #[test]
    fn test_sticker_ids() {
        assert_eq!(
            CannedReply::Sticker.to_message(),
            ReplyMessage::Sticker {
                package_id: "1".into(),
                sticker_id: "2".into(),
            }
        );
    }
}

//! Publish request model and the nested body the publish API expects.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::content::QuoteRecord;
use crate::params::Platform;
use crate::render::RenderedCard;

/// A piece of media attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaRef {
    /// A file on local disk, not yet reachable by the remote API.
    Local(PathBuf),
    /// A publicly retrievable URL.
    Url(String),
}

/// What to publish, and where.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    /// Post body.
    pub text: String,
    /// Attached media, in order. Empty means text-only, never "unset".
    pub media_refs: Vec<MediaRef>,
    /// Destination platform.
    pub target_platform: Platform,
}

impl PublishRequest {
    /// The post for a rendered quote card: quote text plus the card image.
    #[must_use]
    pub fn for_card(quote: &QuoteRecord, card: &RenderedCard, target_platform: Platform) -> Self {
        Self {
            text: quote.post_text(),
            media_refs: vec![MediaRef::Local(card.path.clone())],
            target_platform,
        }
    }
}

/// Top-level publish API body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    /// The post envelope.
    pub post: PostBody,
}

/// The `post` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    /// Account the post is published from.
    pub account_id: String,
    /// Text, media and platform.
    pub content: PostContent,
    /// Where the post goes.
    pub target: PostTarget,
}

/// The `post.content` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContent {
    /// Post body.
    pub text: String,
    /// Platform discriminator as some API revisions read it.
    pub platform: Platform,
    /// Public media URLs. Always serialized, even when empty.
    pub media_urls: Vec<String>,
}

/// The `post.target` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTarget {
    /// Platform discriminator as other API revisions read it.
    pub target_type: Platform,
}

/// Key paths the remote API rejects the body without.
const REQUIRED_KEYS: &[&[&str]] = &[
    &["post", "accountId"],
    &["post", "content", "text"],
    &["post", "content", "platform"],
    &["post", "content", "mediaUrls"],
    &["post", "target", "targetType"],
];

impl PostPayload {
    /// Build the body for one platform.
    #[must_use]
    pub fn new(account_id: &str, text: &str, platform: Platform, media_urls: Vec<String>) -> Self {
        Self {
            post: PostBody {
                account_id: account_id.to_string(),
                content: PostContent { text: text.to_string(), platform, media_urls },
                target: PostTarget { target_type: platform },
            },
        }
    }

    /// Check the serialized body carries every required key.
    ///
    /// # Errors
    ///
    /// Returns the dotted path of the first missing key.
    pub fn validate(&self) -> Result<(), String> {
        let value = serde_json::to_value(self).map_err(|e| e.to_string())?;
        validate_required_keys(&value)
    }
}

/// Check a JSON body against [`REQUIRED_KEYS`]; `mediaUrls` must be an array.
///
/// # Errors
///
/// Returns the dotted path of the first missing or mistyped key.
pub fn validate_required_keys(value: &serde_json::Value) -> Result<(), String> {
    for path in REQUIRED_KEYS {
        let mut node = value;
        for key in *path {
            node = node.get(key).ok_or_else(|| format!("missing required key {}", path.join(".")))?;
        }
        if path.last() == Some(&"mediaUrls") && !node.is_array() {
            return Err(format!("{} must be an array", path.join(".")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn text_only_payload_keeps_empty_media_urls() {
        let payload = PostPayload::new("acct-1", "hello", Platform::Twitter, Vec::new());
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "post": {
                    "accountId": "acct-1",
                    "content": { "text": "hello", "platform": "twitter", "mediaUrls": [] },
                    "target": { "targetType": "twitter" }
                }
            })
        );
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_text_still_has_every_key() {
        let payload = PostPayload::new("acct-1", "", Platform::Bluesky, Vec::new());
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn missing_media_urls_detected() {
        let value = json!({
            "post": {
                "accountId": "a",
                "content": { "text": "t", "platform": "twitter" },
                "target": { "targetType": "twitter" }
            }
        });
        assert_eq!(
            validate_required_keys(&value).unwrap_err(),
            "missing required key post.content.mediaUrls"
        );
    }

    #[test]
    fn null_media_urls_rejected() {
        let value = json!({
            "post": {
                "accountId": "a",
                "content": { "text": "t", "platform": "twitter", "mediaUrls": null },
                "target": { "targetType": "twitter" }
            }
        });
        assert!(validate_required_keys(&value).is_err());
    }

    #[test]
    fn missing_target_detected() {
        let value = json!({
            "post": {
                "accountId": "a",
                "content": { "text": "t", "platform": "twitter", "mediaUrls": [] }
            }
        });
        assert!(validate_required_keys(&value).unwrap_err().contains("post.target.targetType"));
    }

    #[test]
    fn card_request_carries_post_text_and_card() {
        let quote = QuoteRecord::new("Q", "A", "").unwrap();
        let card = RenderedCard {
            path: PathBuf::from("/tmp/a.jpg"),
            width: 1080,
            height: 1080,
            format: "jpeg",
            used_fallback: true,
            truncated: false,
            bytes: 10,
        };
        let request = PublishRequest::for_card(&quote, &card, Platform::Bluesky);
        assert_eq!(request.text, quote.post_text());
        assert_eq!(request.media_refs, vec![MediaRef::Local(PathBuf::from("/tmp/a.jpg"))]);
        assert_eq!(request.target_platform, Platform::Bluesky);
    }
}

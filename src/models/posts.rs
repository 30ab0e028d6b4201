use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

pub const MAX_IMAGE_DATA_URL_LEN: usize = 16_000_000;
pub const MAX_COMMENT_LEN: usize = 500;

pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "imageDataUrl")]
    pub image_data_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub likes: u64,
    pub comments: Vec<Comment>,
}

impl Post {
    /// Rebuilds a typed post from whatever the store handed back. The store
    /// enforces no schema, so every field is coerced rather than trusted;
    /// returns `None` only when the document is not an object (the store's
    /// "missing key" answer is `null`).
    pub fn normalize(raw: &Value, id: &str) -> Option<Post> {
        let map = raw.as_object()?;

        let likes = map
            .get("likes")
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(|n| n as u64)
            .unwrap_or(0);

        let comments = match map.get("comments").and_then(Value::as_array) {
            Some(items) => items.iter().filter_map(Comment::normalize).collect(),
            None => Vec::new(),
        };

        Some(Post {
            id: id.to_string(),
            title: string_field(map, "title"),
            content: string_field(map, "content"),
            image_data_url: string_field(map, "imageDataUrl"),
            created_at: string_field(map, "createdAt"),
            updated_at: string_field(map, "updatedAt"),
            likes,
            comments,
        })
    }
}

impl Comment {
    /// Entries that are not objects or whose text trims to empty are dropped;
    /// a missing or blank id is replaced so removal-by-id keeps working.
    fn normalize(raw: &Value) -> Option<Comment> {
        let map = raw.as_object()?;

        let text = map
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        if text.is_empty() {
            return None;
        }

        let id = match map.get("id").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_id(),
        };

        Some(Comment {
            id,
            text,
            created_at: string_field(map, "createdAt"),
        })
    }
}

fn string_field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}

/// Sanitized create/edit payload. `has_image_field` records whether the
/// client sent the `imageDataUrl` key at all: sending `""` clears the image,
/// omitting the key leaves the stored one untouched.
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub image_data_url: String,
    pub has_image_field: bool,
}

impl PostInput {
    pub fn sanitize(body: &Value) -> Result<PostInput> {
        let title = trimmed_field(body, "title");
        let content = trimmed_field(body, "content");

        if title.is_empty() || content.is_empty() {
            return Err(Error::BadRequest(
                "Both a title and content are required.".to_string(),
            ));
        }

        let has_image_field = body.get("imageDataUrl").is_some();
        let mut image_data_url = String::new();

        if has_image_field {
            let raw = body
                .get("imageDataUrl")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    Error::BadRequest("The image data is not in a valid format.".to_string())
                })?;

            image_data_url = raw.trim().to_string();
            if !image_data_url.is_empty() {
                if !is_image_data_url(&image_data_url) {
                    return Err(Error::BadRequest(
                        "The image data is not in a valid format.".to_string(),
                    ));
                }
                if image_data_url.len() > MAX_IMAGE_DATA_URL_LEN {
                    return Err(Error::BadRequest(
                        "The image is too large. Keep it under 10MB.".to_string(),
                    ));
                }
            }
        }

        Ok(PostInput {
            title,
            content,
            image_data_url,
            has_image_field,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommentInput {
    pub text: String,
}

impl CommentInput {
    pub fn sanitize(body: &Value) -> Result<CommentInput> {
        let text = trimmed_field(body, "text");

        if text.is_empty() {
            return Err(Error::BadRequest("Comment text is required.".to_string()));
        }
        if text.chars().count() > MAX_COMMENT_LEN {
            return Err(Error::BadRequest(
                "Comments must be 500 characters or fewer.".to_string(),
            ));
        }

        Ok(CommentInput { text })
    }
}

fn trimmed_field(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim()
        .to_string()
}

/// `data:image/<subtype>;base64,...` with the subtype limited to the
/// characters a media type token allows.
fn is_image_data_url(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("data:image/") else {
        return false;
    };
    let Some(semi) = rest.find(";base64,") else {
        return false;
    };
    let subtype = &rest[..semi];
    !subtype.is_empty()
        && subtype
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-'))
}

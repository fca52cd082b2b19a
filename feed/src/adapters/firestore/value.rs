//! Firestore REST wire format
//!
//! Typed values, documents and structured queries as the REST API encodes
//! them, plus the mapping between post documents and [`FeedItem`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::entities::{FeedItem, FeedItemId, NewPost, OrderKey, OwnerId, PostUpdate};
use crate::error::FirestoreError;

/// Field names used by post documents
pub mod fields {
    pub const AUTHOR: &str = "userName";
    pub const BODY: &str = "content";
    pub const TITLE: &str = "title";
    pub const TAGS: &str = "tags";
    pub const MEDIA_URL: &str = "imageUrl";
    pub const AVATAR_URL: &str = "avatarUrl";
    pub const LIKE_COUNT: &str = "likeCount";
    pub const COMMENT_COUNT: &str = "commentCount";
    pub const ORDER_KEY: &str = "timestamp";
    pub const OWNER: &str = "uid";
    /// Document name pseudo-field, the tie-breaker for equal order keys
    pub const NAME: &str = "__name__";
}

/// A single typed value. Integers travel as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue,
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(f64),
    StringValue(String),
    TimestampValue(String),
    ReferenceValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::StringValue(s.into())
    }

    pub fn integer(n: i64) -> Self {
        Value::IntegerValue(n.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value; whole doubles are accepted too
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::IntegerValue(s) => s.parse().ok(),
            Value::DoubleValue(d) if d.fract() == 0.0 => Some(*d as i64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Document {
    /// Last path segment of the document name
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }

    fn string(&self, field: &str) -> Option<String> {
        self.fields
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn non_empty_string(&self, field: &str) -> Option<String> {
        self.string(field).filter(|s| !s.is_empty())
    }

    fn counter(&self, field: &str) -> u64 {
        self.fields
            .get(field)
            .and_then(Value::as_i64)
            .map(|n| n.max(0) as u64)
            .unwrap_or(0)
    }
}

/// One element of a `runQuery` response stream
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    pub document: Option<Document>,
}

impl TryFrom<Document> for FeedItem {
    type Error = FirestoreError;

    fn try_from(doc: Document) -> Result<Self, Self::Error> {
        let id = doc
            .id()
            .ok_or_else(|| FirestoreError::Deserialization("document without a name".to_string()))?
            .to_string();
        let order_key = doc
            .fields
            .get(fields::ORDER_KEY)
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                FirestoreError::Deserialization(format!("document {} has no {}", id, fields::ORDER_KEY))
            })?;
        let tags: BTreeSet<String> = match doc.fields.get(fields::TAGS) {
            Some(Value::ArrayValue(array)) => array
                .values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => BTreeSet::new(),
        };

        Ok(FeedItem {
            author: doc.string(fields::AUTHOR).unwrap_or_default(),
            body: doc.string(fields::BODY).unwrap_or_default(),
            title: doc.non_empty_string(fields::TITLE),
            media_url: doc.non_empty_string(fields::MEDIA_URL),
            avatar_url: doc.non_empty_string(fields::AVATAR_URL),
            tags,
            like_count: doc.counter(fields::LIKE_COUNT),
            comment_count: doc.counter(fields::COMMENT_COUNT),
            order_key: OrderKey(order_key),
            owner: doc.non_empty_string(fields::OWNER).map(OwnerId),
            id: FeedItemId(id),
        })
    }
}

fn tags_value(tags: &BTreeSet<String>) -> Value {
    Value::ArrayValue(ArrayValue {
        values: tags.iter().map(Value::string).collect(),
    })
}

/// Fields of a freshly created post document
pub fn new_post_fields(post: &NewPost) -> HashMap<String, Value> {
    let mut out = HashMap::new();
    out.insert(fields::AUTHOR.to_string(), Value::string(&post.author));
    out.insert(fields::BODY.to_string(), Value::string(&post.body));
    if let Some(title) = &post.title {
        out.insert(fields::TITLE.to_string(), Value::string(title));
    }
    out.insert(fields::TAGS.to_string(), tags_value(&post.tags));
    out.insert(
        fields::MEDIA_URL.to_string(),
        Value::string(post.media_url.clone().unwrap_or_default()),
    );
    out.insert(fields::AVATAR_URL.to_string(), Value::string(""));
    out.insert(fields::LIKE_COUNT.to_string(), Value::integer(0));
    out.insert(fields::COMMENT_COUNT.to_string(), Value::integer(0));
    out.insert(fields::ORDER_KEY.to_string(), Value::integer(post.order_key.0));
    out.insert(fields::OWNER.to_string(), Value::string(&post.owner.0));
    out
}

/// Changed fields of an update, with the field paths for the update mask
pub fn update_fields(update: &PostUpdate) -> (HashMap<String, Value>, Vec<&'static str>) {
    let mut out = HashMap::new();
    let mut mask = Vec::new();
    if let Some(title) = &update.title {
        out.insert(fields::TITLE.to_string(), Value::string(title));
        mask.push(fields::TITLE);
    }
    if let Some(body) = &update.body {
        out.insert(fields::BODY.to_string(), Value::string(body));
        mask.push(fields::BODY);
    }
    if let Some(tags) = &update.tags {
        out.insert(fields::TAGS.to_string(), tags_value(tags));
        mask.push(fields::TAGS);
    }
    if let Some(key) = update.order_key {
        out.insert(fields::ORDER_KEY.to_string(), Value::integer(key.0));
        mask.push(fields::ORDER_KEY);
    }
    (out, mask)
}

// ============================================================================
// Structured queries
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    pub order_by: Vec<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<Cursor>,
    pub limit: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Serialize)]
pub struct Order {
    pub field: FieldReference,
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Descending,
}

/// `before: false` makes the query start strictly after these values
#[derive(Debug, Serialize)]
pub struct Cursor {
    pub values: Vec<Value>,
    pub before: bool,
}

impl StructuredQuery {
    /// Newest-first page of `collection`, starting after `(order_key, document)`
    pub fn newest_first(collection: &str, after: Option<(OrderKey, String)>, limit: usize) -> Self {
        let order = |path: &str| Order {
            field: FieldReference {
                field_path: path.to_string(),
            },
            direction: Direction::Descending,
        };
        Self {
            from: vec![CollectionSelector {
                collection_id: collection.to_string(),
            }],
            order_by: vec![order(fields::ORDER_KEY), order(fields::NAME)],
            start_at: after.map(|(key, document)| Cursor {
                values: vec![Value::integer(key.0), Value::ReferenceValue(document)],
                before: false,
            }),
            limit: i32::try_from(limit).unwrap_or(i32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"[
        {
            "document": {
                "name": "projects/demo/databases/(default)/documents/posts/p2",
                "fields": {
                    "userName": {"stringValue": "mahadi"},
                    "content": {"stringValue": "second"},
                    "title": {"stringValue": ""},
                    "tags": {"arrayValue": {"values": [{"stringValue": "rust"}, {"stringValue": "feed"}]}},
                    "imageUrl": {"stringValue": ""},
                    "likeCount": {"integerValue": "4"},
                    "commentCount": {"integerValue": "-1"},
                    "timestamp": {"integerValue": "1717000000200"},
                    "uid": {"stringValue": "user-1"}
                },
                "createTime": "2024-05-29T16:26:40.200Z",
                "updateTime": "2024-05-29T16:26:40.200Z"
            },
            "readTime": "2024-05-30T00:00:00Z"
        },
        {
            "document": {
                "name": "projects/demo/databases/(default)/documents/posts/p1",
                "fields": {
                    "userName": {"stringValue": "ann"},
                    "content": {"stringValue": "first"},
                    "tags": {"arrayValue": {}},
                    "timestamp": {"doubleValue": 1717000000100},
                    "avatarUrl": {"nullValue": null}
                }
            },
            "readTime": "2024-05-30T00:00:00Z"
        }
    ]"#;

    fn parse_page(json: &str) -> Vec<FeedItem> {
        let responses: Vec<RunQueryResponse> = serde_json::from_str(json).unwrap();
        responses
            .into_iter()
            .filter_map(|r| r.document)
            .map(|d| FeedItem::try_from(d).unwrap())
            .collect()
    }

    #[test]
    fn parses_run_query_page() {
        let items = parse_page(PAGE);
        assert_eq!(items.len(), 2);

        let second = &items[0];
        assert_eq!(second.id.as_str(), "p2");
        assert_eq!(second.author, "mahadi");
        assert!(second.title.is_none());
        assert!(second.media_url.is_none());
        assert_eq!(second.tags.len(), 2);
        assert_eq!(second.like_count, 4);
        assert_eq!(second.comment_count, 0);
        assert_eq!(second.order_key, OrderKey(1_717_000_000_200));
        assert_eq!(second.owner, Some(OwnerId::new("user-1")));

        let first = &items[1];
        assert_eq!(first.order_key, OrderKey(1_717_000_000_100));
        assert!(first.owner.is_none());
        assert!(first.tags.is_empty());
        assert!(first.avatar_url.is_none());
    }

    #[test]
    fn empty_result_has_only_read_time() {
        let items = parse_page(r#"[{"readTime": "2024-05-30T00:00:00Z"}]"#);
        assert!(items.is_empty());
    }

    #[test]
    fn document_without_order_key_is_rejected() {
        let doc = Document {
            name: "projects/demo/databases/(default)/documents/posts/x".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            FeedItem::try_from(doc),
            Err(FirestoreError::Deserialization(_))
        ));
    }

    #[test]
    fn first_page_query_has_no_cursor() {
        let query = StructuredQuery::newest_first("posts", None, 10);
        let json = serde_json::to_value(RunQueryRequest {
            structured_query: query,
        })
        .unwrap();

        let sq = &json["structuredQuery"];
        assert_eq!(sq["from"][0]["collectionId"], "posts");
        assert_eq!(sq["orderBy"][0]["field"]["fieldPath"], "timestamp");
        assert_eq!(sq["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(sq["orderBy"][1]["field"]["fieldPath"], "__name__");
        assert_eq!(sq["limit"], 10);
        assert!(sq.get("startAt").is_none());
    }

    #[test]
    fn next_page_query_starts_after_cursor() {
        let document = "projects/demo/databases/(default)/documents/posts/p1".to_string();
        let query =
            StructuredQuery::newest_first("posts", Some((OrderKey(1_717_000_000_100), document.clone())), 2);
        let json = serde_json::to_value(&query).unwrap();

        assert_eq!(json["startAt"]["before"], false);
        assert_eq!(json["startAt"]["values"][0]["integerValue"], "1717000000100");
        assert_eq!(json["startAt"]["values"][1]["referenceValue"], document.as_str());
    }

    #[test]
    fn new_post_document_uses_post_field_names() {
        let post = NewPost {
            author: "ann".to_string(),
            title: None,
            body: "hello".to_string(),
            tags: ["a".to_string()].into_iter().collect(),
            media_url: None,
            owner: OwnerId::new("u1"),
            order_key: OrderKey(5),
        };
        let fields = new_post_fields(&post);
        assert_eq!(fields["content"], Value::string("hello"));
        assert_eq!(fields["uid"], Value::string("u1"));
        assert_eq!(fields["timestamp"], Value::integer(5));
        assert_eq!(fields["likeCount"], Value::integer(0));
        assert!(!fields.contains_key("title"));
    }

    #[test]
    fn update_mask_lists_changed_fields_only() {
        let update = PostUpdate {
            body: Some("new".to_string()),
            order_key: Some(OrderKey(9)),
            ..Default::default()
        };
        let (fields, mask) = update_fields(&update);
        assert_eq!(mask, vec!["content", "timestamp"]);
        assert_eq!(fields.len(), 2);
    }
}

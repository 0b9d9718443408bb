use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};
use std::fmt;

/// Opaque document identifier. The backend sends either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Id encoded for use inside a URL path
    pub fn path_segment(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for DocId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for DocId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Num(n) => DocId(n.to_string()),
            Raw::Text(s) => DocId(s),
        })
    }
}

impl Serialize for DocId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Numeric ids go back out as numbers
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

/// One document waiting in the inbox
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    pub id: DocId,
    pub name: Option<String>,
}

/// Inbox listing response: a plain id array, or the legacy id -> title map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboxListing {
    Ids(Vec<DocId>),
    Named(serde_json::Map<String, Value>),
}

impl InboxListing {
    /// Entries in backend order
    pub fn into_entries(self) -> Vec<QueueEntry> {
        match self {
            InboxListing::Ids(ids) => ids
                .into_iter()
                .map(|id| QueueEntry { id, name: None })
                .collect(),
            InboxListing::Named(map) => map
                .into_iter()
                .map(|(id, name)| QueueEntry {
                    id: DocId(id),
                    name: name.as_str().map(str::to_string),
                })
                .collect(),
        }
    }
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentDetail {
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub correspondent: String,
    #[serde(default, rename = "type", deserialize_with = "nullable_string")]
    pub document_type: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub storage_path: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl DocumentDetail {
    /// Thumbnail URL, ignoring blank values
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Current value of the field a selector edits
    pub fn value_of(&self, kind: OptionKind) -> &str {
        match kind {
            OptionKind::Correspondent => &self.correspondent,
            OptionKind::DocumentType => &self.document_type,
            OptionKind::StoragePath => &self.storage_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NamedOption {
    pub name: String,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionStatus {
    #[serde(default, rename = "aiconnection")]
    pub ai_connected: bool,
    #[serde(default, rename = "paperlessconnection")]
    pub paperless_connected: bool,
}

/// The three single-value classification fields that have option lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Correspondent,
    DocumentType,
    StoragePath,
}

impl OptionKind {
    pub const ALL: [OptionKind; 3] = [
        OptionKind::Correspondent,
        OptionKind::DocumentType,
        OptionKind::StoragePath,
    ];

    pub fn list_path(self) -> &'static str {
        match self {
            OptionKind::Correspondent => "/doc/list_correspondents",
            OptionKind::DocumentType => "/doc/list_types",
            OptionKind::StoragePath => "/doc/list_paths",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OptionKind::Correspondent => "Correspondent",
            OptionKind::DocumentType => "Type",
            OptionKind::StoragePath => "Storage path",
        }
    }

    /// Build the write action for a chosen option
    pub fn classify(self, value: String) -> Classification {
        match self {
            OptionKind::Correspondent => Classification::Correspondent(value),
            OptionKind::DocumentType => Classification::DocumentType(value),
            OptionKind::StoragePath => Classification::StoragePath(value),
        }
    }
}

/// Which endpoint family the backend speaks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    #[default]
    Current,
    /// Deprecated `/api/...` aliases
    Legacy,
}

impl ApiFlavor {
    pub fn inbox_path(self) -> &'static str {
        match self {
            ApiFlavor::Current => "/doc/list_inbox",
            ApiFlavor::Legacy => "/api/inbox_list",
        }
    }

    pub fn document_path(self, id: &DocId) -> String {
        match self {
            ApiFlavor::Current => format!("/doc/get_info/{}", id.path_segment()),
            ApiFlavor::Legacy => format!("/api/document_info/{}", id.path_segment()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Tags(Vec<String>),
    Correspondent(String),
    DocumentType(String),
    StoragePath(String),
}

impl Classification {
    pub fn field_name(&self) -> &'static str {
        match self {
            Classification::Tags(_) => "tags",
            Classification::Correspondent(_) => "correspondent",
            Classification::DocumentType(_) => "type",
            Classification::StoragePath(_) => "path",
        }
    }

    fn has_value(&self) -> bool {
        match self {
            Classification::Tags(tags) => {
                !tags.is_empty() && tags.iter().all(|t| !t.trim().is_empty())
            }
            Classification::Correspondent(v)
            | Classification::DocumentType(v)
            | Classification::StoragePath(v) => !v.trim().is_empty(),
        }
    }
}

/// A write request against one document. The id is fixed when the action is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationAction {
    pub doc_id: DocId,
    pub classification: Classification,
}

impl ClassificationAction {
    pub fn new(doc_id: DocId, classification: Classification) -> Self {
        Self {
            doc_id,
            classification,
        }
    }

    pub fn is_submittable(&self) -> bool {
        !self.doc_id.is_empty() && self.classification.has_value()
    }

    pub fn endpoint(&self, api: ApiFlavor) -> String {
        let id = self.doc_id.path_segment();
        match (&self.classification, api) {
            (Classification::Tags(_), ApiFlavor::Legacy) => "/api/tag_document".to_string(),
            (Classification::Tags(_), ApiFlavor::Current) => format!("/doc/set_tag/{id}"),
            (Classification::Correspondent(_), _) => format!("/doc/set_correspondant/{id}"),
            (Classification::DocumentType(_), _) => format!("/doc/set_type/{id}"),
            (Classification::StoragePath(_), _) => format!("/doc/set_path/{id}"),
        }
    }

    pub fn request_body(&self, api: ApiFlavor) -> Value {
        match (&self.classification, api) {
            (Classification::Tags(tags), ApiFlavor::Legacy) => {
                json!({ "doc_id": self.doc_id, "tag_names": tags })
            }
            (Classification::Tags(tags), ApiFlavor::Current) => json!({ "tags": tags }),
            (Classification::Correspondent(v), _) => json!({ "correspondent": v }),
            (Classification::DocumentType(v), _) => json!({ "type": v }),
            (Classification::StoragePath(v), _) => json!({ "path": v }),
        }
    }
}

/// External integrations whose connection state is polled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integration {
    Ai,
    Paperless,
}

impl Integration {
    pub fn connect_path(self) -> &'static str {
        match self {
            Integration::Ai => "/status/connectToAI",
            Integration::Paperless => "/status/connectToPaperless",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Integration::Ai => "AI",
            Integration::Paperless => "Paperless",
        }
    }
}

/// Split a comma separated tag list, dropping blanks
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_accepts_numbers_and_strings() {
        let ids: Vec<DocId> = serde_json::from_str(r#"[101, "abc-7"]"#).unwrap();
        assert_eq!(ids, vec![DocId::from(101), DocId::from("abc-7")]);
        assert_eq!(serde_json::to_value(&ids[0]).unwrap(), json!(101));
        assert_eq!(serde_json::to_value(&ids[1]).unwrap(), json!("abc-7"));
    }

    #[test]
    fn test_doc_id_path_segment_is_encoded() {
        assert_eq!(DocId::from("a b/c").path_segment(), "a%20b%2Fc");
    }

    #[test]
    fn test_inbox_listing_id_array() {
        let listing: InboxListing = serde_json::from_str("[101, 102]").unwrap();
        let entries = listing.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, DocId::from(101));
        assert_eq!(entries[1].name, None);
    }

    #[test]
    fn test_inbox_listing_legacy_map_keeps_order() {
        let listing: InboxListing =
            serde_json::from_str(r#"{"9": "Zeta", "3": "Alpha", "5": "Mid"}"#).unwrap();
        let ids: Vec<String> = listing
            .into_entries()
            .into_iter()
            .map(|e| format!("{}:{}", e.id, e.name.unwrap_or_default()))
            .collect();
        assert_eq!(ids, vec!["9:Zeta", "3:Alpha", "5:Mid"]);
    }

    #[test]
    fn test_document_detail_defaults_and_nulls() {
        let detail: DocumentDetail = serde_json::from_str(
            r#"{"title": "Invoice", "correspondent": null, "type": "Bill", "tags": ["x"]}"#,
        )
        .unwrap();
        assert_eq!(detail.title, "Invoice");
        assert_eq!(detail.correspondent, "");
        assert_eq!(detail.document_type, "Bill");
        assert_eq!(detail.storage_path, "");
        assert_eq!(detail.tags, vec!["x"]);
        assert_eq!(detail.thumbnail(), None);
    }

    #[test]
    fn test_blank_thumbnail_counts_as_missing() {
        let detail = DocumentDetail {
            thumbnail_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(detail.thumbnail(), None);
    }

    #[test]
    fn test_connection_status_field_names() {
        let status: ConnectionStatus =
            serde_json::from_str(r#"{"aiconnection": true, "paperlessconnection": false}"#)
                .unwrap();
        assert!(status.ai_connected);
        assert!(!status.paperless_connected);
    }

    #[test]
    fn test_tag_action_endpoint_and_body() {
        let action = ClassificationAction::new(
            DocId::from(5),
            Classification::Tags(vec!["a".into(), "b".into()]),
        );
        assert_eq!(action.endpoint(ApiFlavor::Current), "/doc/set_tag/5");
        assert_eq!(
            action.request_body(ApiFlavor::Current),
            json!({"tags": ["a", "b"]})
        );
        assert_eq!(action.endpoint(ApiFlavor::Legacy), "/api/tag_document");
        assert_eq!(
            action.request_body(ApiFlavor::Legacy),
            json!({"doc_id": 5, "tag_names": ["a", "b"]})
        );
    }

    #[test]
    fn test_set_path_sends_path_field() {
        let action = ClassificationAction::new(
            DocId::from(8),
            Classification::StoragePath("Archive/2024".into()),
        );
        assert_eq!(action.endpoint(ApiFlavor::Current), "/doc/set_path/8");
        assert_eq!(
            action.request_body(ApiFlavor::Current),
            json!({"path": "Archive/2024"})
        );
    }

    #[test]
    fn test_submittable_rules() {
        let id = DocId::from(1);
        assert!(!ClassificationAction::new(id.clone(), Classification::Tags(vec![])).is_submittable());
        assert!(
            !ClassificationAction::new(id.clone(), Classification::Tags(vec![" ".into()]))
                .is_submittable()
        );
        assert!(
            !ClassificationAction::new(id.clone(), Classification::Correspondent(String::new()))
                .is_submittable()
        );
        assert!(
            !ClassificationAction::new(DocId::from(""), Classification::Correspondent("ACME".into()))
                .is_submittable()
        );
        assert!(
            ClassificationAction::new(id, Classification::DocumentType("Bill".into()))
                .is_submittable()
        );
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("a,b"), vec!["a", "b"]);
        assert_eq!(parse_tag_list("ai-title, -Inbox"), vec!["ai-title", "-Inbox"]);
        assert!(parse_tag_list(" , ").is_empty());
    }
}

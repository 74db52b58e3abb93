use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Sys;

/// Schema definition for a family of entries.
///
/// Field descriptors are kept in server order. The service does not enforce
/// unique descriptor identifiers, so lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    #[serde(default)]
    pub sys: Sys,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<ContentTypeField>,
}

impl ContentType {
    pub fn id(&self) -> Option<&str> {
        self.sys.id.as_deref()
    }

    /// First descriptor whose identifier equals `field_id` (case-sensitive).
    pub fn field(&self, field_id: &str) -> Option<&ContentTypeField> {
        self.fields.iter().find(|field| field.id == field_id)
    }
}

/// One field descriptor inside a [`ContentType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeField {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Target entity kind when `field_type` is `Link` (`Entry` or `Asset`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    /// Element descriptor when `field_type` is `Array`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<FieldItems>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub localized: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub omitted: bool,
}

impl ContentTypeField {
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            field_type,
            link_type: None,
            items: None,
            required: false,
            localized: false,
            disabled: false,
            omitted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldItems {
    #[serde(rename = "type")]
    pub item_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

/// Declared data type of a content type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Short text, up to 256 characters.
    Symbol,
    /// Long text.
    Text,
    RichText,
    Integer,
    Number,
    Date,
    Boolean,
    Location,
    Link,
    ResourceLink,
    Array,
    Object,
    /// A tag this client does not know about.
    ///
    /// The original tag is not kept: re-encoding a descriptor with this type
    /// writes `"Unknown"`. Content types are only read by this client.
    #[serde(other)]
    Unknown,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Symbol => "Symbol",
            Self::Text => "Text",
            Self::RichText => "RichText",
            Self::Integer => "Integer",
            Self::Number => "Number",
            Self::Date => "Date",
            Self::Boolean => "Boolean",
            Self::Location => "Location",
            Self::Link => "Link",
            Self::ResourceLink => "ResourceLink",
            Self::Array => "Array",
            Self::Object => "Object",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_descriptors_in_server_order() {
        let content_type: ContentType = serde_json::from_value(json!({
            "sys": { "id": "post", "type": "ContentType", "version": 2 },
            "name": "Post",
            "displayField": "title",
            "fields": [
                { "id": "title", "name": "Title", "type": "Symbol", "required": true },
                { "id": "tags", "name": "Tags", "type": "Array", "items": { "type": "Symbol" } },
                { "id": "author", "name": "Author", "type": "Link", "linkType": "Entry" }
            ]
        }))
        .expect("decode content type");

        assert_eq!(content_type.id(), Some("post"));
        let ids: Vec<&str> = content_type.fields.iter().map(|field| field.id.as_str()).collect();
        assert_eq!(ids, vec!["title", "tags", "author"]);
        assert!(content_type.fields[0].required);
        assert_eq!(content_type.fields[1].items.as_ref().map(|items| items.item_type), Some(FieldType::Symbol));
        assert_eq!(content_type.fields[2].link_type.as_deref(), Some("Entry"));
    }

    #[test]
    fn unknown_type_tags_decode_as_unknown() {
        let field: ContentTypeField =
            serde_json::from_value(json!({ "id": "shape", "type": "Hologram" })).expect("decode field");
        assert_eq!(field.field_type, FieldType::Unknown);
        assert_eq!(serde_json::to_value(field.field_type).expect("encode"), json!("Unknown"));
    }

    #[test]
    fn field_lookup_is_case_sensitive_and_first_match_wins() {
        let mut first = ContentTypeField::new("title", FieldType::Symbol);
        first.name = "first".into();
        let mut second = ContentTypeField::new("title", FieldType::Text);
        second.name = "second".into();
        let content_type = ContentType {
            fields: vec![first, second],
            ..ContentType::default()
        };

        assert_eq!(content_type.field("title").map(|field| field.name.as_str()), Some("first"));
        assert!(content_type.field("Title").is_none());
    }
}

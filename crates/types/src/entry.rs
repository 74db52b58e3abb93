use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A content record: server metadata plus the raw field bag.
///
/// `sys` is `None` for an entry built locally that has never been written.
/// Field values stay untyped here; their semantic type lives in the owning
/// [`ContentType`](crate::ContentType) and is resolved separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Locale currently in view. Local only, never sent over the wire.
    #[serde(skip)]
    locale: Option<String>,
    /// Identity and version metadata assigned by the server.
    pub sys: Option<Sys>,
    /// Field name to raw wire value.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fields: IndexMap<String, Value>,
}

impl Entry {
    /// Create an entry that has not been persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimistic-concurrency version to send with the next write.
    ///
    /// An entry without recorded version metadata is treated as version 1,
    /// the baseline the server assigns to new objects.
    pub fn version(&self) -> u64 {
        self.sys.as_ref().and_then(|sys| sys.version).unwrap_or(1)
    }

    /// Whether the server already holds this entry.
    ///
    /// True exactly when `sys` is present and carries a non-empty `createdAt`.
    pub fn is_persisted(&self) -> bool {
        self.sys
            .as_ref()
            .and_then(|sys| sys.created_at.as_deref())
            .is_some_and(|created_at| !created_at.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|sys| sys.id.as_deref())
    }

    /// Identifier of the space that owns this entry, if linked.
    pub fn space_id(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|sys| sys.space.as_ref()).map(Link::id)
    }

    /// Identifier of the content type this entry was created from, if linked.
    pub fn content_type_id(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|sys| sys.content_type.as_ref()).map(Link::id)
    }

    /// Raw value for `name`. Absent keys read as `None`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.shift_remove(name)
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn set_locale(&mut self, locale: Option<String>) {
        self.locale = locale;
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Value for `name` as seen through the current locale.
    ///
    /// Management API payloads store localized fields as `{ "<locale>": value }`.
    /// When a locale is set and the field holds that key, the inner value is
    /// returned; otherwise the raw value is returned unchanged.
    pub fn localized_field(&self, name: &str) -> Option<&Value> {
        let raw = self.fields.get(name)?;
        match (self.locale.as_deref(), raw) {
            (Some(locale), Value::Object(per_locale)) => per_locale.get(locale).or(Some(raw)),
            _ => Some(raw),
        }
    }

    /// Replace wire state with what the server returned, keeping the local locale hint.
    pub fn apply_server_state(&mut self, server: Entry) {
        self.sys = server.sys;
        self.fields = server.fields;
    }
}

/// Server-managed metadata shared by entries and content types.
///
/// Members this client does not model are kept in `extra`, and so are
/// modeled members the server sent as explicit `null`. A decoded payload
/// therefore serializes back to the same JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, Value>", into = "IndexMap<String, Value>")]
pub struct Sys {
    pub id: Option<String>,
    /// Entity kind, e.g. `Entry` or `ContentType`.
    pub kind: Option<String>,
    pub version: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub published_version: Option<u64>,
    pub published_at: Option<String>,
    pub archived_at: Option<String>,
    pub space: Option<Link>,
    pub content_type: Option<Link>,
    pub environment: Option<Link>,
    pub extra: IndexMap<String, Value>,
}

impl TryFrom<IndexMap<String, Value>> for Sys {
    type Error = serde_json::Error;

    fn try_from(mut members: IndexMap<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: take_member(&mut members, "id")?,
            kind: take_member(&mut members, "type")?,
            version: take_member(&mut members, "version")?,
            created_at: take_member(&mut members, "createdAt")?,
            updated_at: take_member(&mut members, "updatedAt")?,
            published_version: take_member(&mut members, "publishedVersion")?,
            published_at: take_member(&mut members, "publishedAt")?,
            archived_at: take_member(&mut members, "archivedAt")?,
            space: take_member(&mut members, "space")?,
            content_type: take_member(&mut members, "contentType")?,
            environment: take_member(&mut members, "environment")?,
            extra: members,
        })
    }
}

impl From<Sys> for IndexMap<String, Value> {
    fn from(sys: Sys) -> Self {
        let mut members = IndexMap::new();
        put_member(&mut members, "id", sys.id.map(Value::String));
        put_member(&mut members, "type", sys.kind.map(Value::String));
        put_member(&mut members, "version", sys.version.map(Value::from));
        put_member(&mut members, "createdAt", sys.created_at.map(Value::String));
        put_member(&mut members, "updatedAt", sys.updated_at.map(Value::String));
        put_member(&mut members, "publishedVersion", sys.published_version.map(Value::from));
        put_member(&mut members, "publishedAt", sys.published_at.map(Value::String));
        put_member(&mut members, "archivedAt", sys.archived_at.map(Value::String));
        put_member(&mut members, "space", sys.space.map(Link::into_value));
        put_member(&mut members, "contentType", sys.content_type.map(Link::into_value));
        put_member(&mut members, "environment", sys.environment.map(Link::into_value));
        for (key, value) in sys.extra {
            // a modeled value set locally replaces a null kept from the wire
            members.entry(key).or_insert(value);
        }
        members
    }
}

/// Decode and remove `key`. An explicit `null` stays in `members`.
fn take_member<T>(members: &mut IndexMap<String, Value>, key: &str) -> Result<Option<T>, serde_json::Error>
where
    T: DeserializeOwned,
{
    if matches!(members.get(key), None | Some(Value::Null)) {
        return Ok(None);
    }
    members.shift_remove(key).map(serde_json::from_value).transpose()
}

fn put_member(members: &mut IndexMap<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        members.insert(key.to_string(), value);
    }
}

impl Sys {
    /// `createdAt` parsed as an RFC 3339 timestamp.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    /// Whether the server reports a published version of this entity.
    pub fn is_published(&self) -> bool {
        self.published_version.is_some()
    }
}

/// Reference to another resource, e.g. `{"sys": {"type": "Link", "linkType": "Space", "id": "abc"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    #[serde(rename = "type", default = "link_kind")]
    pub kind: String,
    #[serde(default)]
    pub link_type: String,
    pub id: String,
}

impl Link {
    pub fn new(link_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                kind: link_kind(),
                link_type: link_type.into(),
                id: id.into(),
            },
        }
    }

    pub fn space(id: impl Into<String>) -> Self {
        Self::new("Space", id)
    }

    pub fn content_type(id: impl Into<String>) -> Self {
        Self::new("ContentType", id)
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }

    fn into_value(self) -> Value {
        let LinkSys { kind, link_type, id } = self.sys;
        serde_json::json!({ "sys": { "type": kind, "linkType": link_type, "id": id } })
    }
}

fn link_kind() -> String {
    "Link".to_string()
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.filter(|value| !value.is_empty())?;
    DateTime::parse_from_rfc3339(raw).ok().map(|parsed| parsed.with_timezone(&Utc))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<IndexMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IndexMap<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

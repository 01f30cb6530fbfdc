//! Legacy record adaptation
//!
//! Older site exports stored pages and staff members as flat records:
//!
//! ```json
//! { "id": 7, "parentId": 2, "type": "page", "title": "News", "slug": "news" }
//! { "id": 12, "name": "Ayşe Demir", "title": "Principal", "description": "...", "photo": "..." }
//! ```
//!
//! `adapt_record` rewrites such a record into the current `Node` shape before
//! deserialization: numeric IDs become strings, type-specific fields move into
//! `properties`, staff aliases collapse onto canonical keys and missing
//! timestamps are filled in. Missing `order` and `visible` are left to the
//! serde defaults on `Node` (0 and `true`).

use crate::models::{
    PageKind, BIO_KEY, CONTENT_KEY, HREF_KEY, PHOTO_URL_KEY, ROLE_KEY, SLUG_KEY, STAFF_NODE_TYPE,
};
use chrono::Utc;
use serde_json::{Map, Value};

/// Canonical staff property and the legacy names that map onto it
const STAFF_ALIASES: [(&str, &[&str]); 3] = [
    (ROLE_KEY, &["title", "position"]),
    (BIO_KEY, &["description", "about"]),
    (PHOTO_URL_KEY, &["photo", "image", "imageUrl"]),
];

/// Top-level fields of a legacy page record that belong in `properties`
const PAGE_FIELDS: [&str; 3] = [SLUG_KEY, HREF_KEY, CONTENT_KEY];

/// Rewrite one stored record into the current shape
///
/// Returns `true` when anything was changed. Records that are not JSON
/// objects are returned untouched and will fail deserialization later.
pub fn adapt_record(record: &mut Value) -> bool {
    let Some(obj) = record.as_object_mut() else {
        return false;
    };

    let mut changed = false;
    changed |= stringify_number(obj, "id");
    changed |= stringify_number(obj, "parentId");

    if !obj.contains_key("properties") {
        obj.insert("properties".to_string(), Value::Object(Map::new()));
        changed = true;
    }

    if !obj.contains_key("nodeType") {
        let node_type = infer_node_type(obj);
        obj.remove("type");
        obj.remove("kind");
        obj.insert("nodeType".to_string(), Value::String(node_type.clone()));
        changed = true;

        if node_type == STAFF_NODE_TYPE {
            changed |= lift_staff_fields(obj);
        } else {
            changed |= lift_page_fields(obj);
        }
    }

    if obj.get("nodeType").and_then(Value::as_str) == Some(STAFF_NODE_TYPE) {
        if let Some(props) = obj.get_mut("properties").and_then(Value::as_object_mut) {
            changed |= normalize_staff_aliases(props);
        }
    }

    for key in ["createdAt", "modifiedAt"] {
        if !obj.contains_key(key) {
            obj.insert(key.to_string(), Value::String(Utc::now().to_rfc3339()));
            changed = true;
        }
    }

    changed
}

fn stringify_number(obj: &mut Map<String, Value>, key: &str) -> bool {
    match obj.get(key) {
        Some(Value::Number(n)) => {
            let text = n.to_string();
            obj.insert(key.to_string(), Value::String(text));
            true
        }
        _ => false,
    }
}

fn infer_node_type(obj: &Map<String, Value>) -> String {
    let declared = obj
        .get("type")
        .or_else(|| obj.get("kind"))
        .and_then(Value::as_str);

    match declared {
        Some(kind) if kind == STAFF_NODE_TYPE || kind.parse::<PageKind>().is_ok() => {
            kind.to_string()
        }
        _ if obj.contains_key("name") => STAFF_NODE_TYPE.to_string(),
        _ if obj.contains_key(HREF_KEY) && !obj.contains_key(SLUG_KEY) => {
            PageKind::Link.as_str().to_string()
        }
        _ => PageKind::Page.as_str().to_string(),
    }
}

/// Flat staff record: `name` is the display title, the rest are properties
fn lift_staff_fields(obj: &mut Map<String, Value>) -> bool {
    let mut moved = Map::new();
    for (canonical, aliases) in STAFF_ALIASES {
        for key in std::iter::once(canonical).chain(aliases.iter().copied()) {
            if let Some(value) = obj.remove(key) {
                moved.entry(canonical.to_string()).or_insert(value);
            }
        }
    }

    if let Some(name) = obj.remove("name") {
        obj.insert("title".to_string(), name);
    }

    merge_into_properties(obj, moved)
}

fn lift_page_fields(obj: &mut Map<String, Value>) -> bool {
    let mut moved = Map::new();
    for key in PAGE_FIELDS {
        if let Some(value) = obj.remove(key) {
            moved.insert(key.to_string(), value);
        }
    }
    merge_into_properties(obj, moved)
}

fn merge_into_properties(obj: &mut Map<String, Value>, moved: Map<String, Value>) -> bool {
    if moved.is_empty() {
        return false;
    }
    if let Some(props) = obj.get_mut("properties").and_then(Value::as_object_mut) {
        for (key, value) in moved {
            props.entry(key).or_insert(value);
        }
    }
    true
}

fn normalize_staff_aliases(props: &mut Map<String, Value>) -> bool {
    let mut changed = false;
    for (canonical, aliases) in STAFF_ALIASES {
        for alias in aliases.iter().copied() {
            if let Some(value) = props.remove(alias) {
                props.entry(canonical.to_string()).or_insert(value);
                changed = true;
            }
        }
    }
    changed
}

//! Catalog item records and the admin edit payload.

use serde::{Deserialize, Deserializer, Serialize};

use super::ItemId;

/// Errors that can occur when building an [`ItemDraft`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// The item name is empty after trimming.
    #[error("item name cannot be empty")]
    EmptyName,
}

/// A catalog item as stored in the hosted `items` table.
///
/// Rows are fetched snapshots; the remote table is the only authority.
/// Columns the table may leave `null` are explicit options here, except
/// `description`, which reads `null` as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Primary key.
    pub id: ItemId,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Free-form description.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Image URL. Empty strings are treated as "no image".
    #[serde(default)]
    pub image: Option<String>,
    /// Comma-joined list of sizes.
    #[serde(default)]
    pub sizes: Option<String>,
}

impl Item {
    /// Image URL, if the row has a non-empty one.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The sizes text, if the row has a non-empty one.
    #[must_use]
    pub fn sizes_label(&self) -> Option<&str> {
        self.sizes.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Individual sizes, in stored order.
    #[must_use]
    pub fn size_list(&self) -> Vec<&str> {
        self.sizes_label()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Insert/update payload for the `items` table.
///
/// Built from the admin add/edit form. Serializes to exactly the columns the
/// admin may write; `id` is always assigned by the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemDraft {
    name: String,
    image: String,
    description: String,
    sizes: Option<String>,
}

impl ItemDraft {
    /// Build a draft from raw form input.
    ///
    /// All fields are trimmed and sizes are normalized with
    /// [`normalize_sizes`].
    ///
    /// # Errors
    ///
    /// Returns `ItemError::EmptyName` if the name is blank.
    pub fn parse(
        name: &str,
        description: &str,
        image: &str,
        sizes: &str,
    ) -> Result<Self, ItemError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ItemError::EmptyName);
        }

        Ok(Self {
            name: name.to_owned(),
            image: image.trim().to_owned(),
            description: description.trim().to_owned(),
            sizes: normalize_sizes(sizes),
        })
    }

    /// Item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image URL (may be empty).
    #[must_use]
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Description (may be empty).
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Normalized sizes, or `None` when no size was given.
    #[must_use]
    pub fn sizes(&self) -> Option<&str> {
        self.sizes.as_deref()
    }
}

/// Normalize a comma-separated sizes field.
///
/// Each entry is trimmed and blank entries are dropped. Returns `None` when
/// nothing is left.
///
/// ```rust
/// use shopfront_core::normalize_sizes;
///
/// assert_eq!(normalize_sizes(" S, M ,L "), Some("S,M,L".to_string()));
/// assert_eq!(normalize_sizes("S,,M"), Some("S,M".to_string()));
/// assert_eq!(normalize_sizes(" , "), None);
/// ```
#[must_use]
pub fn normalize_sizes(raw: &str) -> Option<String> {
    let joined = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",");

    if joined.is_empty() { None } else { Some(joined) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_from_row_with_nulls() {
        let item: Item = serde_json::from_value(json!({
            "id": 3,
            "name": "Cotton saree",
            "description": null,
            "image": null,
            "sizes": null,
            "created_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(item.id, ItemId::from(3));
        assert_eq!(item.description, "");
        assert_eq!(item.image_url(), None);
        assert!(item.size_list().is_empty());
    }

    #[test]
    fn test_item_empty_image_is_no_image() {
        let item: Item = serde_json::from_value(json!({
            "id": "a",
            "name": "Towel",
            "description": "Soft",
            "image": "",
            "sizes": "S,M"
        }))
        .unwrap();

        assert_eq!(item.image_url(), None);
        assert_eq!(item.size_list(), vec!["S", "M"]);
        assert_eq!(item.sizes_label(), Some("S,M"));
    }

    #[test]
    fn test_draft_requires_name() {
        assert_eq!(
            ItemDraft::parse("   ", "desc", "", "").unwrap_err(),
            ItemError::EmptyName
        );
    }

    #[test]
    fn test_draft_trims_and_normalizes() {
        let draft = ItemDraft::parse(" Shirt ", " cotton ", " https://img/x.png ", "S , M,").unwrap();
        assert_eq!(draft.name(), "Shirt");
        assert_eq!(draft.description(), "cotton");
        assert_eq!(draft.image(), "https://img/x.png");
        assert_eq!(draft.sizes(), Some("S,M"));
    }

    #[test]
    fn test_draft_payload_shape() {
        let draft = ItemDraft::parse("Shirt", "", "", "").unwrap();
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({ "name": "Shirt", "image": "", "description": "", "sizes": null })
        );
    }
}

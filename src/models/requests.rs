//! Request DTOs for the recipes API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::{Deserialize, Deserializer};

use super::recipe::Recipe;

/// Maximum length of a recipe name in bytes
pub const MAX_NAME_LENGTH: usize = 256;

/// Maximum number of entries in any list field
pub const MAX_LIST_ITEMS: usize = 1000;

/// Maximum length of a single list entry in bytes
pub const MAX_ITEM_LENGTH: usize = 4096;

/// Request body for create (POST /recipes) and update (PUT /recipes/:id)
///
/// Every field is optional. On update the draft replaces all four mutable
/// fields, so an omitted field is cleared on the stored record. Unknown keys
/// such as `id` or `publishedAt` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipeDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
}

impl RecipeDraft {
    /// Creates a draft carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Validates the draft structurally.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_fields(
            self.name.as_deref(),
            [
                ("tags", self.tags.as_deref()),
                ("ingredients", self.ingredients.as_deref()),
                ("instructions", self.instructions.as_deref()),
            ],
        )
    }
}

/// Request body for a partial update (PATCH /recipes/:id)
///
/// Each field distinguishes three states: omitted (`None`, leave unchanged),
/// explicit `null` (`Some(None)`, clear) and a value (`Some(Some(v))`,
/// replace).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipePatch {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub tags: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub ingredients: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "present")]
    pub instructions: Option<Option<Vec<String>>>,
}

impl RecipePatch {
    /// Validates the values the patch would write.
    pub fn validate(&self) -> Option<String> {
        validate_fields(
            self.name.as_ref().and_then(|n| n.as_deref()),
            [
                ("tags", self.tags.as_ref().and_then(|v| v.as_deref())),
                ("ingredients", self.ingredients.as_ref().and_then(|v| v.as_deref())),
                ("instructions", self.instructions.as_ref().and_then(|v| v.as_deref())),
            ],
        )
    }

    /// Applies the patch to a recipe's mutable fields.
    pub fn apply_to(self, recipe: &mut Recipe) {
        if let Some(name) = self.name {
            recipe.name = name;
        }
        if let Some(tags) = self.tags {
            recipe.tags = tags;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions;
        }
    }
}

// Only runs when the key is present, so a missing key stays `None` via
// `#[serde(default)]` while `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_fields<'a>(
    name: Option<&str>,
    lists: [(&str, Option<&'a [String]>); 3],
) -> Option<String> {
    if let Some(name) = name {
        if name.len() > MAX_NAME_LENGTH {
            return Some(format!(
                "Name exceeds maximum length of {} bytes",
                MAX_NAME_LENGTH
            ));
        }
    }

    for (field, items) in lists {
        let Some(items) = items else { continue };
        if items.len() > MAX_LIST_ITEMS {
            return Some(format!(
                "Field '{}' exceeds maximum of {} entries",
                field, MAX_LIST_ITEMS
            ));
        }
        for item in items {
            if item.trim().is_empty() {
                return Some(format!("Field '{}' contains a blank entry", field));
            }
            if item.len() > MAX_ITEM_LENGTH {
                return Some(format!(
                    "Field '{}' has an entry exceeding {} bytes",
                    field, MAX_ITEM_LENGTH
                ));
            }
        }
    }

    None
}

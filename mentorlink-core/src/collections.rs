//! Saved mentors and the named collections that tag them.
//!
//! Membership lives on the items (a set of collection ids per item), so a
//! collection's size is always counted from the items, never stored.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MentorlinkError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItem {
    pub mentor_id: String,
    pub saved_at: DateTime<Utc>,
    pub collection_ids: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub item_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItems {
    collections: Vec<Collection>,
    items: Vec<SavedItem>,
}

fn clean_name(name: &str) -> Result<String, MentorlinkError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MentorlinkError::validation("Collection name cannot be empty"));
    }
    Ok(name.to_string())
}

impl SavedItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn items(&self) -> &[SavedItem] {
        &self.items
    }

    /// Names are trimmed and must be non-empty. Duplicate names are allowed;
    /// collections are told apart by id.
    pub fn create_collection(&mut self, name: &str) -> Result<Collection, MentorlinkError> {
        let collection = Collection {
            id: uuid::Uuid::new_v4().to_string(),
            name: clean_name(name)?,
            created_at: Utc::now(),
        };
        self.collections.push(collection.clone());
        Ok(collection)
    }

    pub fn rename_collection(&mut self, id: &str, name: &str) -> Result<(), MentorlinkError> {
        let name = clean_name(name)?;
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| MentorlinkError::not_found(format!("Collection {}", id)))?;
        collection.name = name;
        Ok(())
    }

    /// Remove the collection and untag every item that referenced it.
    /// Returns how many items were untagged.
    pub fn delete_collection(&mut self, id: &str) -> Result<usize, MentorlinkError> {
        let before = self.collections.len();
        self.collections.retain(|c| c.id != id);
        if self.collections.len() == before {
            return Err(MentorlinkError::not_found(format!("Collection {}", id)));
        }
        let untagged = self
            .items
            .iter_mut()
            .map(|item| item.collection_ids.remove(id))
            .filter(|removed| *removed)
            .count();
        tracing::debug!(collection_id = %id, untagged, "collection deleted");
        Ok(untagged)
    }

    /// Saving an already saved mentor is a no-op. Returns true if newly saved.
    pub fn save(&mut self, mentor_id: &str) -> bool {
        if self.is_saved(mentor_id) {
            return false;
        }
        self.items.push(SavedItem {
            mentor_id: mentor_id.to_string(),
            saved_at: Utc::now(),
            collection_ids: BTreeSet::new(),
        });
        true
    }

    /// Unsaving also drops the item from every collection.
    pub fn unsave(&mut self, mentor_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.mentor_id != mentor_id);
        self.items.len() != before
    }

    pub fn is_saved(&self, mentor_id: &str) -> bool {
        self.items.iter().any(|i| i.mentor_id == mentor_id)
    }

    pub fn tag(&mut self, mentor_id: &str, collection_id: &str) -> Result<(), MentorlinkError> {
        if !self.collections.iter().any(|c| c.id == collection_id) {
            return Err(MentorlinkError::not_found(format!(
                "Collection {}",
                collection_id
            )));
        }
        let item = self.item_mut(mentor_id)?;
        item.collection_ids.insert(collection_id.to_string());
        Ok(())
    }

    pub fn untag(&mut self, mentor_id: &str, collection_id: &str) -> Result<bool, MentorlinkError> {
        let item = self.item_mut(mentor_id)?;
        Ok(item.collection_ids.remove(collection_id))
    }

    fn item_mut(&mut self, mentor_id: &str) -> Result<&mut SavedItem, MentorlinkError> {
        self.items
            .iter_mut()
            .find(|i| i.mentor_id == mentor_id)
            .ok_or_else(|| MentorlinkError::not_found(format!("Saved mentor {}", mentor_id)))
    }

    pub fn items_in(&self, collection_id: &str) -> Vec<&SavedItem> {
        self.items
            .iter()
            .filter(|i| i.collection_ids.contains(collection_id))
            .collect()
    }

    /// Collection names an item is tagged with, in collection order.
    pub fn tag_names(&self, mentor_id: &str) -> Vec<&str> {
        let Some(item) = self.items.iter().find(|i| i.mentor_id == mentor_id) else {
            return Vec::new();
        };
        self.collections
            .iter()
            .filter(|c| item.collection_ids.contains(&c.id))
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn collection_summaries(&self) -> Vec<CollectionSummary> {
        self.collections
            .iter()
            .map(|c| CollectionSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                item_count: self.items_in(&c.id).len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_of(items: &SavedItems, id: &str) -> usize {
        items
            .collection_summaries()
            .into_iter()
            .find(|s| s.id == id)
            .map(|s| s.item_count)
            .unwrap()
    }

    #[test]
    fn test_create_trims_and_rejects_blank() {
        let mut items = SavedItems::new();
        let c = items.create_collection("  Career  ").unwrap();
        assert_eq!(c.name, "Career");
        assert!(matches!(
            items.create_collection("   "),
            Err(MentorlinkError::Validation(_))
        ));
        let dup = items.create_collection("Career").unwrap();
        assert_ne!(dup.id, c.id);
        assert_eq!(items.collections().len(), 2);
    }

    #[test]
    fn test_delete_cascades_and_counts_stay_derived() {
        let mut items = SavedItems::new();
        let x = items.create_collection("X").unwrap();
        let y = items.create_collection("Y").unwrap();
        for m in ["m1", "m2", "m3", "m4"] {
            items.save(m);
        }
        for m in ["m1", "m2", "m3"] {
            items.tag(m, &x.id).unwrap();
        }
        items.tag("m1", &y.id).unwrap();
        items.tag("m4", &y.id).unwrap();
        assert_eq!(count_of(&items, &x.id), 3);

        assert_eq!(items.delete_collection(&x.id).unwrap(), 3);
        assert!(items.collections().iter().all(|c| c.id != x.id));
        assert!(items.items().iter().all(|i| !i.collection_ids.contains(&x.id)));
        assert_eq!(count_of(&items, &y.id), 2);
        assert_eq!(items.tag_names("m1"), vec!["Y"]);
    }

    #[test]
    fn test_delete_unused_collection_untags_nothing() {
        let mut items = SavedItems::new();
        let empty = items.create_collection("Later").unwrap();
        let used = items.create_collection("Now").unwrap();
        items.save("m1");
        items.tag("m1", &used.id).unwrap();

        assert_eq!(items.delete_collection(&empty.id).unwrap(), 0);
        assert_eq!(items.tag_names("m1"), vec!["Now"]);
        assert!(items.delete_collection(&empty.id).is_err());
    }

    #[test]
    fn test_unsave_removes_from_counts() {
        let mut items = SavedItems::new();
        let c = items.create_collection("Shortlist").unwrap();
        items.save("m1");
        items.save("m2");
        items.tag("m1", &c.id).unwrap();
        items.tag("m2", &c.id).unwrap();
        assert!(items.unsave("m1"));
        assert!(!items.unsave("m1"));
        assert_eq!(count_of(&items, &c.id), 1);
    }

    #[test]
    fn test_tag_requires_saved_item_and_collection() {
        let mut items = SavedItems::new();
        let c = items.create_collection("A").unwrap();
        assert!(matches!(items.tag("ghost", &c.id), Err(MentorlinkError::NotFound(_))));
        items.save("m1");
        assert!(matches!(items.tag("m1", "nope"), Err(MentorlinkError::NotFound(_))));
        assert!(!items.save("m1"));
    }

    #[test]
    fn test_rename() {
        let mut items = SavedItems::new();
        let c = items.create_collection("Old").unwrap();
        items.rename_collection(&c.id, " New ").unwrap();
        assert_eq!(items.collections()[0].name, "New");
        assert!(items.rename_collection(&c.id, "").is_err());
    }
}

//! User profile documents.
//!
//! Each customer owns exactly one profile document holding their contact
//! details, delivery address, and full order history. The document is the
//! unit of storage; first-party mutations go through targeted operations
//! (append an order, patch a field) rather than whole-document writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::types::{Email, OrderId, UserId};

/// A customer's profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(default)]
    pub orders: Vec<Order>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Whether checkout can proceed without first collecting an address.
    ///
    /// All three address fields must be present and non-blank.
    #[must_use]
    pub fn has_delivery_address(&self) -> bool {
        [&self.address, &self.landmark, &self.house_number]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// The formatted delivery address, if complete.
    #[must_use]
    pub fn delivery_address(&self) -> Option<String> {
        if !self.has_delivery_address() {
            return None;
        }
        match (&self.house_number, &self.address, &self.landmark) {
            (Some(house), Some(street), Some(landmark)) => {
                Some(format!("{house} {street}, {landmark}"))
            }
            _ => None,
        }
    }

    /// Look up an order by its durable number.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == id)
    }
}

/// A partial update to a profile document.
///
/// `None` fields are left untouched; serialization skips them so a patch
/// only carries what it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
}

impl ProfilePatch {
    /// Whether the patch changes anything at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.landmark.is_none()
            && self.house_number.is_none()
    }

    /// Apply the patch to a profile in place.
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            profile.phone = phone.clone();
        }
        if let Some(address) = &self.address {
            profile.address = Some(address.clone());
        }
        if let Some(landmark) = &self.landmark {
            profile.landmark = Some(landmark.clone());
        }
        if let Some(house_number) = &self.house_number {
            profile.house_number = Some(house_number.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            uid: UserId::new("k3jd92mf0a"),
            name: "Adaeze Okonkwo".to_owned(),
            email: Email::parse("adaeze@example.com").expect("valid"),
            phone: "+2348012345678".to_owned(),
            address: None,
            landmark: None,
            house_number: None,
            orders: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_address_requires_all_three_fields() {
        let mut p = profile();
        assert!(!p.has_delivery_address());

        p.address = Some("Broad Street, Lagos".to_owned());
        p.landmark = Some("Opposite the market".to_owned());
        assert!(!p.has_delivery_address());

        p.house_number = Some("12".to_owned());
        assert!(p.has_delivery_address());
        assert_eq!(
            p.delivery_address().as_deref(),
            Some("12 Broad Street, Lagos, Opposite the market")
        );
    }

    #[test]
    fn test_blank_address_field_does_not_count() {
        let mut p = profile();
        p.address = Some("Broad Street".to_owned());
        p.landmark = Some("   ".to_owned());
        p.house_number = Some("12".to_owned());
        assert!(!p.has_delivery_address());
        assert!(p.delivery_address().is_none());
    }

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut p = profile();
        let patch = ProfilePatch {
            phone: Some("+2348098765432".to_owned()),
            address: Some("4 Marina Road".to_owned()),
            ..ProfilePatch::default()
        };
        patch.apply(&mut p);

        assert_eq!(p.phone, "+2348098765432");
        assert_eq!(p.address.as_deref(), Some("4 Marina Road"));
        // Untouched fields survive
        assert_eq!(p.name, "Adaeze Okonkwo");
        assert!(p.landmark.is_none());
    }

    #[test]
    fn test_empty_patch() {
        assert!(ProfilePatch::default().is_empty());
        let patch = ProfilePatch {
            name: Some("Ngozi".to_owned()),
            ..ProfilePatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_json_carries_only_changes() {
        let patch = ProfilePatch {
            house_number: Some("7b".to_owned()),
            ..ProfilePatch::default()
        };
        let json = serde_json::to_string(&patch).expect("serialize");
        assert_eq!(json, r#"{"houseNumber":"7b"}"#);
    }

    #[test]
    fn test_profile_json_shape() {
        let p = profile();
        let value = serde_json::to_value(&p).expect("serialize");
        assert_eq!(value["uid"], "k3jd92mf0a");
        assert_eq!(value["name"], "Adaeze Okonkwo");
        assert!(value.get("address").is_none());
        assert_eq!(value["orders"], serde_json::json!([]));
    }
}

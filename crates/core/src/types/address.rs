//! Delivery address types.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// A saved delivery address.
///
/// Serialized with camelCase keys (`fullAddress`, `isDefault`) so the
/// persisted collection keeps the layout the web client wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    /// Short label shown in the address picker, e.g. "Home".
    pub title: String,
    pub full_address: String,
    pub is_default: bool,
}

/// Fields for a new address; the id is minted when it is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub title: String,
    pub full_address: String,
    #[serde(default)]
    pub is_default: bool,
}

impl NewAddress {
    #[must_use]
    pub fn new(title: impl Into<String>, full_address: impl Into<String>, is_default: bool) -> Self {
        Self {
            title: title.into(),
            full_address: full_address.into(),
            is_default,
        }
    }

    pub(crate) fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            title: self.title,
            full_address: self.full_address,
            is_default: self.is_default,
        }
    }
}

/// Replacement fields for an existing address.
///
/// Every field is replaced; the id is never changed.
pub type AddressUpdate = NewAddress;

impl Address {
    /// Build an address with a freshly minted id.
    #[must_use]
    pub fn create(fields: NewAddress) -> Self {
        fields.into_address(AddressId::generate())
    }

    /// Overwrite this address with `fields`, keeping the id.
    pub fn apply(&mut self, fields: AddressUpdate) {
        self.title = fields.title;
        self.full_address = fields.full_address;
        self.is_default = fields.is_default;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_layout() {
        let address = NewAddress::new("Home", "1 A St", true).into_address(AddressId::new("1"));
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "title": "Home",
                "fullAddress": "1 A St",
                "isDefault": true
            })
        );
    }

    #[test]
    fn test_apply_keeps_id() {
        let mut address = Address::create(NewAddress::new("Home", "1 A St", false));
        let id = address.id.clone();
        address.apply(NewAddress::new("Office", "2 B St", true));
        assert_eq!(address.id, id);
        assert_eq!(address.title, "Office");
        assert!(address.is_default);
    }
}

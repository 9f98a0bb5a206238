//! Status and delivery-method enums.

use serde::{Deserialize, Serialize};

use super::Price;

/// Order status as stored in profile documents.
///
/// The lifecycle observed in data is Invoice -> Paid/Processing ->
/// Dispatched -> Delivered. Transitions are plain document edits; nothing
/// enforces legality beyond the specific operations the storefront exposes
/// (invoice resubmission).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Quotation request awaiting confirmation.
    Invoice,
    /// Payment received.
    Paid,
    /// Being prepared for dispatch.
    Processing,
    /// Handed to the courier.
    Dispatched,
    /// Received by the customer.
    Delivered,
}

impl OrderStatus {
    /// Returns the wire representation (identical to the variant name).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "Invoice",
            Self::Paid => "Paid",
            Self::Processing => "Processing",
            Self::Dispatched => "Dispatched",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Invoice" => Ok(Self::Invoice),
            "Paid" => Ok(Self::Paid),
            "Processing" => Ok(Self::Processing),
            "Dispatched" => Ok(Self::Dispatched),
            "Delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Delivery method with its fixed fee.
///
/// The three-entry fee table is part of the domain: fees are looked up by
/// method at checkout, never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMethod {
    #[serde(rename = "Vendor Delivery")]
    VendorDelivery,
    #[serde(rename = "Self Pickup")]
    SelfPickup,
    #[serde(rename = "Pepsa Dispatch")]
    PepsaDispatch,
}

impl DeliveryMethod {
    /// All methods, in the order they are presented at checkout.
    pub const ALL: [Self; 3] = [Self::VendorDelivery, Self::SelfPickup, Self::PepsaDispatch];

    /// The delivery fee for this method.
    #[must_use]
    pub fn fee(&self) -> Price {
        match self {
            Self::VendorDelivery => Price::from_naira(6_000),
            Self::SelfPickup => Price::ZERO,
            Self::PepsaDispatch => Price::from_naira(5_000),
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::VendorDelivery => "Vendor Delivery",
            Self::SelfPickup => "Self Pickup",
            Self::PepsaDispatch => "Pepsa Dispatch",
        }
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Vendor Delivery" => Ok(Self::VendorDelivery),
            "Self Pickup" => Ok(Self::SelfPickup),
            "Pepsa Dispatch" => Ok(Self::PepsaDispatch),
            _ => Err(format!("invalid delivery method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Paid).expect("serialize");
        assert_eq!(json, "\"Paid\"");
        let back: OrderStatus = serde_json::from_str("\"Invoice\"").expect("deserialize");
        assert_eq!(back, OrderStatus::Invoice);
    }

    #[test]
    fn test_delivery_method_fee_table() {
        assert_eq!(DeliveryMethod::VendorDelivery.fee(), Price::from_naira(6_000));
        assert_eq!(DeliveryMethod::SelfPickup.fee(), Price::ZERO);
        assert_eq!(DeliveryMethod::PepsaDispatch.fee(), Price::from_naira(5_000));
    }

    #[test]
    fn test_delivery_method_wire_format() {
        let json = serde_json::to_string(&DeliveryMethod::PepsaDispatch).expect("serialize");
        assert_eq!(json, "\"Pepsa Dispatch\"");
        let back: DeliveryMethod =
            serde_json::from_str("\"Self Pickup\"").expect("deserialize");
        assert_eq!(back, DeliveryMethod::SelfPickup);
    }

    #[test]
    fn test_roundtrip_from_str() {
        for method in DeliveryMethod::ALL {
            assert_eq!(method.as_str().parse::<DeliveryMethod>(), Ok(method));
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity};

/// A stocked product, identified by its barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub barcode: String,
    pub name: String,
    /// Price in smallest currency unit (e.g. cents).
    #[serde(with = "crate::price")]
    pub price: u64,
    pub quantity: u32,
    /// Set by the service when the product is first saved.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Product {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.barcode
    }
}

/// Create payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub barcode: String,
    pub name: String,
    #[serde(with = "crate::price")]
    pub price: u64,
    #[serde(default)]
    pub quantity: u32,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        if self.barcode.trim().is_empty() {
            return Err(DomainError::invalid_request("barcode must not be blank"));
        }
        if self.barcode.contains('/') {
            return Err(DomainError::invalid_request("barcode must not contain '/'"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::invalid_request("name must not be blank"));
        }
        Ok(())
    }

    pub fn into_product(self, created_at: DateTime<Utc>) -> Product {
        Product {
            barcode: self.barcode,
            name: self.name,
            price: self.price,
            quantity: self.quantity,
            created_at: Some(created_at),
        }
    }
}

/// `PATCH /products/{barcode}/price` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePrice {
    #[serde(with = "crate::price")]
    pub price: u64,
}

/// Published once a product has been saved for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub barcode: String,
    pub name: String,
    #[serde(with = "crate::price")]
    pub price: u64,
}

impl From<&Product> for ProductCreated {
    fn from(p: &Product) -> Self {
        Self {
            barcode: p.barcode.clone(),
            name: p.name.clone(),
            price: p.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stockroom_core::ErrorKind;

    fn new_product(barcode: &str, name: &str) -> NewProduct {
        NewProduct {
            barcode: barcode.to_string(),
            name: name.to_string(),
            price: 1999,
            quantity: 10,
        }
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert!(new_product("123", "Milk").validate().is_ok());

        for bad in [new_product(" ", "Milk"), new_product("123", ""), new_product("a/b", "Milk")] {
            let err = bad.validate().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        }
    }

    #[test]
    fn product_json_uses_camel_case() {
        let now = Utc::now();
        let p = new_product("123", "Milk").into_product(now);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["barcode"], "123");
        assert_eq!(json["price"], 19.99);
        assert!(json["createdAt"].is_string());
        assert_eq!(p.id(), "123");
    }

    #[test]
    fn quantity_defaults_to_zero() {
        let p: NewProduct =
            serde_json::from_value(json!({ "barcode": "1", "name": "Tea", "price": 250 })).unwrap();
        assert_eq!(p.quantity, 0);
    }

    #[test]
    fn price_accepts_decimal_major_units() {
        let p: NewProduct =
            serde_json::from_value(json!({ "barcode": "1", "name": "Tea", "price": 19.99 })).unwrap();
        assert_eq!(p.price, 1999);

        let update: UpdatePrice = serde_json::from_value(json!({ "price": 5 })).unwrap();
        assert_eq!(update.price, 500);

        assert!(serde_json::from_value::<UpdatePrice>(json!({ "price": 0.001 })).is_err());
        assert!(serde_json::from_value::<UpdatePrice>(json!({ "price": -3 })).is_err());
    }

    #[test]
    fn created_event_mirrors_product() {
        let p = new_product("123", "Milk").into_product(Utc::now());
        let e = ProductCreated::from(&p);
        assert_eq!(e, ProductCreated { barcode: "123".into(), name: "Milk".into(), price: 1999 });
    }
}

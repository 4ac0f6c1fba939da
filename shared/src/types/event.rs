// shared/src/types/event.rs
// Real-time feed envelope pushed to every connected listener

use serde::{Deserialize, Serialize};

use super::product::Product;

/// One committed state transition, serialized as `{"type": ..., ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProductEvent {
    #[serde(rename = "product-updated")]
    Updated { products: Vec<Product> },

    #[serde(rename = "product-deleted")]
    Deleted {
        #[serde(rename = "productId")]
        product_id: String,
        products: Vec<Product>,
    },

    #[serde(rename = "scan-saved")]
    Scanned { product: Product },
}

impl ProductEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Updated { .. } => "product-updated",
            Self::Deleted { .. } => "product-deleted",
            Self::Scanned { .. } => "scan-saved",
        }
    }

    /// Wire form of the event. Serializing these variants cannot fail, the
    /// fallback only keeps the signature infallible.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

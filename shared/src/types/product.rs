use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One inventory line. `id` never changes once the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub stock: u64,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, stock: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stock,
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies
//
// Bodies are deserialized loosely (every field optional, stock as raw JSON)
// so that a bad value is reported as a validation error with a field name
// rather than as an opaque serde failure.
// ---------------------------------------------------------------------------

/// POST /add-product
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddProductData {
    pub id: Option<String>,
    pub name: Option<String>,
    pub stock: Option<serde_json::Value>,
}

/// PUT /update-product/:id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateStockData {
    pub stock: Option<serde_json::Value>,
}

/// PUT /edit-product/:id
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditProductData {
    pub name: Option<String>,
    pub stock: Option<serde_json::Value>,
}

/// POST /save-scan
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveScanData {
    pub id: Option<String>,
    pub name: Option<String>,
}

// ---------------------------------------------------------------------------
// Validated commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOrAccumulate {
    pub id: String,
    pub name: String,
    pub stock: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetStock {
    pub id: String,
    pub stock: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRecord {
    pub id: String,
    pub name: String,
    pub stock: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remove {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordScan {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Stock must be a non-negative integer")]
    InvalidStock,
}

impl ValidationError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::EmptyField(_) => "EMPTY_FIELD",
            Self::InvalidStock => "INVALID_STOCK",
        }
    }

    pub fn to_message(&self) -> String {
        self.to_string()
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}

/// Ids are opaque: kept byte for byte, only a blank id is refused.
fn required_id(value: Option<String>) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::MissingField("id"))?;
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField("id"));
    }
    Ok(value)
}

/// Accepts JSON integers only; `5.0`, `"5"` and negatives are rejected.
fn required_stock(value: Option<serde_json::Value>) -> Result<u64, ValidationError> {
    value
        .ok_or(ValidationError::MissingField("stock"))?
        .as_u64()
        .ok_or(ValidationError::InvalidStock)
}

/// Validate an id taken from a path segment.
pub fn validate_id(id: &str) -> Result<String, ValidationError> {
    required_id(Some(id.to_string()))
}

impl Remove {
    /// Delete is the one command that trims its id, so stray whitespace in
    /// a hand-typed URL still reaches the record.
    pub fn from_path(id: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            id: required_text(Some(id.to_string()), "id")?,
        })
    }
}

impl AddProductData {
    pub fn validate(self) -> Result<AddOrAccumulate, ValidationError> {
        Ok(AddOrAccumulate {
            id: required_id(self.id)?,
            name: required_text(self.name, "name")?,
            stock: required_stock(self.stock)?,
        })
    }
}

impl UpdateStockData {
    pub fn validate(self, id: &str) -> Result<SetStock, ValidationError> {
        Ok(SetStock {
            id: validate_id(id)?,
            stock: required_stock(self.stock)?,
        })
    }
}

impl EditProductData {
    pub fn validate(self, id: &str) -> Result<EditRecord, ValidationError> {
        Ok(EditRecord {
            id: validate_id(id)?,
            name: required_text(self.name, "name")?,
            stock: required_stock(self.stock)?,
        })
    }
}

impl SaveScanData {
    /// `name` is optional, but when present it may not be blank.
    pub fn validate(self) -> Result<RecordScan, ValidationError> {
        let name = match self.name {
            Some(name) => Some(required_text(Some(name), "name")?),
            None => None,
        };
        Ok(RecordScan {
            id: required_id(self.id)?,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(body: serde_json::Value) -> Result<AddOrAccumulate, ValidationError> {
        serde_json::from_value::<AddProductData>(body).unwrap().validate()
    }

    #[test]
    fn add_product_accepts_zero_stock() {
        let cmd = add(json!({"id": "A1", "name": "Widget", "stock": 0})).unwrap();
        assert_eq!(cmd.stock, 0);
    }

    #[test]
    fn add_product_keeps_id_verbatim_and_trims_name() {
        let cmd = add(json!({"id": " A1 ", "name": " Widget ", "stock": 1})).unwrap();
        assert_eq!(cmd.id, " A1 ");
        assert_eq!(cmd.name, "Widget");
    }

    #[test]
    fn add_product_rejects_negative_and_fractional_stock() {
        for stock in [json!(-1), json!(1.5), json!("3")] {
            let err = add(json!({"id": "A1", "name": "Widget", "stock": stock})).unwrap_err();
            assert_eq!(err, ValidationError::InvalidStock);
        }
    }

    #[test]
    fn add_product_reports_first_missing_field() {
        let err = add(json!({"name": "Widget", "stock": 1})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("id"));
        assert_eq!(err.to_code(), "MISSING_FIELD");
    }

    #[test]
    fn scan_rejects_blank_name_but_allows_absent_name() {
        let blank: SaveScanData = serde_json::from_value(json!({"id": "A1", "name": "  "})).unwrap();
        assert_eq!(blank.validate().unwrap_err(), ValidationError::EmptyField("name"));

        let absent: SaveScanData = serde_json::from_value(json!({"id": "A1"})).unwrap();
        assert_eq!(absent.validate().unwrap().name, None);
    }

    #[test]
    fn path_id_must_not_be_blank() {
        assert_eq!(validate_id("   ").unwrap_err(), ValidationError::EmptyField("id"));
        assert_eq!(validate_id(" B2").unwrap(), " B2");
    }

    #[test]
    fn only_delete_trims_its_path_id() {
        assert_eq!(Remove::from_path(" B2 ").unwrap().id, "B2");
        assert_eq!(Remove::from_path(" ").unwrap_err(), ValidationError::EmptyField("id"));

        let scan: SaveScanData = serde_json::from_value(json!({"id": " B2"})).unwrap();
        assert_eq!(scan.validate().unwrap().id, " B2");
    }
}

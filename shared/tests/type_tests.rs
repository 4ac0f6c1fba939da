/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; validation rules that only need the
/// request structs live next to them in `product.rs`.

// ---------------------------------------------------------------------------
// Product records
// ---------------------------------------------------------------------------

#[cfg(test)]
mod product_tests {
    use shared::types::*;

    #[test]
    fn product_json_has_exactly_id_name_stock() {
        let json = serde_json::to_value(Product::new("A1", "Widget", 5)).unwrap();
        assert_eq!(json, serde_json::json!({"id": "A1", "name": "Widget", "stock": 5}));
    }

    #[test]
    fn stored_document_parses_in_order() {
        let raw = r#"[
  { "id": "B2", "name": "Gadget", "stock": 0 },
  { "id": "A1", "name": "Widget", "stock": 12 }
]"#;
        let products: Vec<Product> = serde_json::from_str(raw).unwrap();
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["B2", "A1"]);
    }

    #[test]
    fn negative_stock_in_document_is_rejected() {
        let raw = r#"[{ "id": "A1", "name": "Widget", "stock": -1 }]"#;
        assert!(serde_json::from_str::<Vec<Product>>(raw).is_err());
    }

    #[test]
    fn validation_error_becomes_error_envelope() {
        let err = ValidationError::InvalidStock;
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "INVALID_STOCK");
        assert_eq!(body["message"], "Stock must be a non-negative integer");
    }

    #[test]
    fn edit_requires_name_and_stock() {
        let data: EditProductData = serde_json::from_str(r#"{"stock": 3}"#).unwrap();
        assert_eq!(
            data.validate("A1").unwrap_err(),
            ValidationError::MissingField("name")
        );
    }
}

// ---------------------------------------------------------------------------
// Live event envelope
// ---------------------------------------------------------------------------

#[cfg(test)]
mod event_tests {
    use shared::types::*;

    #[test]
    fn updated_event_carries_full_list() {
        let event = ProductEvent::Updated {
            products: vec![Product::new("A1", "Widget", 5)],
        };
        let json: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(json["type"], "product-updated");
        assert_eq!(json["products"][0]["id"], "A1");
        assert_eq!(event.kind(), "product-updated");
    }

    #[test]
    fn deleted_event_uses_camel_case_product_id() {
        let event = ProductEvent::Deleted {
            product_id: "A1".to_string(),
            products: vec![],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "product-deleted");
        assert_eq!(json["productId"], "A1");
        assert!(json.get("product_id").is_none());
        assert_eq!(json["products"], serde_json::json!([]));
    }

    #[test]
    fn scanned_event_carries_single_product() {
        let event = ProductEvent::Scanned {
            product: Product::new("A1", "Widget", 6),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "scan-saved");
        assert_eq!(json["product"]["stock"], 6);
        assert!(json.get("products").is_none());
    }

    #[test]
    fn events_parse_back_from_wire() {
        let raw = r#"{"type":"scan-saved","product":{"id":"Z","name":"Zed","stock":1}}"#;
        let event: ProductEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            ProductEvent::Scanned {
                product: Product::new("Z", "Zed", 1)
            }
        );
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[cfg(test)]
mod config_tests {
    use shared::config::{load_config, load_config_or_default};
    use shared::types::server_config::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.paths.data_file, "products.json");
        assert_eq!(config.hub.listener_buffer, 64);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [paths]
            data_file = "/var/lib/inventory/products.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.paths.data_file, "/var/lib/inventory/products.json");
        assert_eq!(config.paths.web_dir, "frontend");
    }

    #[test]
    fn load_config_reads_file() {
        let file = write_config("[hub]\nlistener_buffer = 8\n");
        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.hub.listener_buffer, 8);
    }

    #[test]
    fn load_config_rejects_empty_file() {
        let file = write_config("   \n");
        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn load_config_rejects_zero_listener_buffer() {
        let file = write_config("[hub]\nlistener_buffer = 0\n");
        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("listener_buffer"));
    }

    #[test]
    fn load_config_rejects_blank_data_file() {
        let file = write_config("[paths]\ndata_file = \"  \"\n");
        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn load_config_reports_toml_errors() {
        let file = write_config("[server\nport = ");
        let err = load_config(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config_or_default(path.to_str().unwrap()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn missing_file_is_an_error_for_strict_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            load_config(path.to_str().unwrap()),
            Err(ConfigError::Io(_))
        ));
    }
}

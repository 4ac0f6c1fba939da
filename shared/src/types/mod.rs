pub mod event;
pub mod json_error;
pub mod product;
pub mod server_config;

pub use self::event::ProductEvent;
pub use self::json_error::ErrorResponse;
pub use self::product::{
    AddOrAccumulate, AddProductData, EditProductData, EditRecord, Product, RecordScan, Remove,
    SaveScanData, SetStock, UpdateStockData, ValidationError,
};
pub use self::server_config::{AppConfig, ConfigError};

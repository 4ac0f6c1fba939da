//! Pure transitions over a product list.
//!
//! Every function takes the current list by reference and returns the next
//! one. Untouched records keep their relative order and new records are
//! appended, so ids stay unique as long as the input had unique ids.

use shared::types::Product;

use crate::error::CommandError;

/// Add `stock` to an existing record, or append a new one.
/// The name of an existing record is never changed here.
pub fn upsert_by_sum(products: &[Product], id: &str, name: &str, stock: u64) -> Vec<Product> {
    let mut next = products.to_vec();
    match next.iter_mut().find(|p| p.id == id) {
        Some(existing) => existing.stock = existing.stock.saturating_add(stock),
        None => next.push(Product::new(id, name, stock)),
    }
    next
}

pub fn set_stock(products: &[Product], id: &str, stock: u64) -> Result<Vec<Product>, CommandError> {
    let mut next = products.to_vec();
    let product = find_mut(&mut next, id)?;
    product.stock = stock;
    Ok(next)
}

/// Replace name and stock; the id stays as it is.
pub fn edit_record(
    products: &[Product],
    id: &str,
    name: &str,
    stock: u64,
) -> Result<Vec<Product>, CommandError> {
    let mut next = products.to_vec();
    let product = find_mut(&mut next, id)?;
    product.name = name.to_string();
    product.stock = stock;
    Ok(next)
}

pub fn remove(products: &[Product], id: &str) -> Result<Vec<Product>, CommandError> {
    let next: Vec<Product> = products.iter().filter(|p| p.id != id).cloned().collect();
    if next.len() == products.len() {
        return Err(CommandError::NotFound(id.to_string()));
    }
    Ok(next)
}

/// One scan of `id`: existing records gain exactly one unit, unknown ids
/// need a name and start at one. The bool is true for a new record.
pub fn record_scan(
    products: &[Product],
    id: &str,
    name: Option<&str>,
) -> Result<(Vec<Product>, Product, bool), CommandError> {
    let mut next = products.to_vec();
    if let Some(existing) = next.iter_mut().find(|p| p.id == id) {
        existing.stock = existing.stock.saturating_add(1);
        let scanned = existing.clone();
        return Ok((next, scanned, false));
    }

    let name = name.ok_or_else(|| CommandError::MissingName(id.to_string()))?;
    let created = Product::new(id, name, 1);
    next.push(created.clone());
    Ok((next, created, true))
}

fn find_mut<'a>(products: &'a mut [Product], id: &str) -> Result<&'a mut Product, CommandError> {
    products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| CommandError::NotFound(id.to_string()))
}

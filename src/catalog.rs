//! Read-only product catalog.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::Amount;
use crate::model::{Product, ProductId};

/// Errors raised while building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
    #[error("product {0} has negative price {1}")]
    NegativePrice(ProductId, Amount),
}

/// Products keyed by id, enumerated in id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: BTreeMap<ProductId, Product>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and negative prices.
    pub fn from_products(
        products: impl IntoIterator<Item = Product>,
    ) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for product in products {
            if product.price < Amount::ZERO {
                return Err(CatalogError::NegativePrice(product.id, product.price));
            }
            if map.contains_key(&product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            map.insert(product.id.clone(), product);
        }
        Ok(Self { products: map })
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// The stock lineup.
impl Default for Catalog {
    fn default() -> Self {
        let products = [
            Product::new("A1", "Cola", Amount::from_cents(150)),
            Product::new("A2", "Chips", Amount::from_cents(100)),
            Product::new("A3", "Candy", Amount::from_cents(75)),
        ];
        Self {
            products: products.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for product in self.products() {
            writeln!(f, "{product}")?;
        }
        Ok(())
    }
}

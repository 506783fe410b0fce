//! Production catalog: products, their required process steps, and the
//! options available for each step.
//!
//! The catalog is validated once on construction and is read-only afterwards.
//! Every lookup either resolves or fails with [`CatalogError::NotFound`].
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::{MAX_OPTION_RATING, MIN_OPTION_RATING};

const DEFAULT_CATALOG_DATA: &str = include_str!("../assets/catalog.json");

/// Errors raised while loading, validating, or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog data could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no products")]
    Empty,
    #[error("product '{product}' has no processes")]
    NoProcesses { product: String },
    #[error("process '{process}' of product '{product}' has no options")]
    NoOptions { product: String, process: String },
    #[error("duplicate {kind} name '{name}'")]
    Duplicate { kind: &'static str, name: String },
    #[error("option '{option}' has {field} {value}, expected 1..=5")]
    RatingOutOfRange {
        option: String,
        field: &'static str,
        value: u8,
    },
    #[error("option '{option}' has negative {field} ({value})")]
    NegativeAttribute {
        option: String,
        field: &'static str,
        value: i64,
    },
    #[error("not found in catalog: {path}")]
    NotFound { path: String },
}

impl CatalogError {
    fn not_found(parts: &[&str]) -> Self {
        Self::NotFound {
            path: parts.join(" / "),
        }
    }
}

/// One concrete way to execute a process step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOption {
    pub name: String,
    pub cost: i64,
    pub emissions: i64,
    pub efficiency: u8,
    pub happiness: u8,
    #[serde(default)]
    pub info: String,
}

impl ProcessOption {
    /// Short button label, e.g. `Solar $3500 | Em: 100`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ${} | Em: {}", self.name, self.cost, self.emissions)
    }
}

/// A required production stage with its ordered options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub name: String,
    pub options: Vec<ProcessOption>,
}

impl Process {
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&ProcessOption> {
        self.options.iter().find(|option| option.name == name)
    }
}

/// A product and its ordered process steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub processes: Vec<Process>,
}

impl Product {
    #[must_use]
    pub fn process(&self, name: &str) -> Option<&Process> {
        self.processes.iter().find(|process| process.name == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogData {
    products: Vec<Product>,
}

/// Validated, immutable product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogData")]
pub struct Catalog {
    products: Vec<Product>,
}

impl TryFrom<CatalogData> for Catalog {
    type Error = CatalogError;

    fn try_from(data: CatalogData) -> Result<Self, Self::Error> {
        Self::new(data.products)
    }
}

impl Catalog {
    /// Build a catalog, validating names and option attributes.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog is empty, a product or process has no
    /// children, a name is duplicated at any level, or an option attribute is
    /// out of range.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        validate_products(&products)?;
        Ok(Self { products })
    }

    /// Parse and validate a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the built-in five-product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded asset is corrupt.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_CATALOG_DATA)
    }

    /// Build a sub-catalog holding only the named products, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown product name and
    /// [`CatalogError::Empty`] when no names are given.
    pub fn restricted_to(&self, names: &[&str]) -> Result<Self, CatalogError> {
        for name in names {
            self.product(name)?;
        }
        let products = self
            .products
            .iter()
            .filter(|product| names.contains(&product.name.as_str()))
            .cloned()
            .collect();
        Self::new(products)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Ordered product names.
    pub fn product_names(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(|product| product.name.as_str())
    }

    /// Look up a product by name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product is absent.
    pub fn product(&self, product: &str) -> Result<&Product, CatalogError> {
        self.products
            .iter()
            .find(|p| p.name == product)
            .ok_or_else(|| CatalogError::not_found(&[product]))
    }

    /// Look up a process of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if either key is absent.
    pub fn process(&self, product: &str, process: &str) -> Result<&Process, CatalogError> {
        self.product(product)?
            .process(process)
            .ok_or_else(|| CatalogError::not_found(&[product, process]))
    }

    /// Resolve a single option.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if any key is absent.
    pub fn get(
        &self,
        product: &str,
        process: &str,
        option: &str,
    ) -> Result<&ProcessOption, CatalogError> {
        self.process(product, process)?
            .option(option)
            .ok_or_else(|| CatalogError::not_found(&[product, process, option]))
    }

    /// Ordered process names of a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product is absent.
    pub fn processes_of(&self, product: &str) -> Result<Vec<&str>, CatalogError> {
        Ok(self
            .product(product)?
            .processes
            .iter()
            .map(|process| process.name.as_str())
            .collect())
    }

    /// Ordered option names of a process.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the product or process is absent.
    pub fn options_of(&self, product: &str, process: &str) -> Result<Vec<&str>, CatalogError> {
        Ok(self
            .process(product, process)?
            .options
            .iter()
            .map(|option| option.name.as_str())
            .collect())
    }

    /// Number of (product, process) slots a session has to fill.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.products
            .iter()
            .map(|product| product.processes.len())
            .sum()
    }
}

fn validate_products(products: &[Product]) -> Result<(), CatalogError> {
    if products.is_empty() {
        return Err(CatalogError::Empty);
    }
    ensure_unique("product", products.iter().map(|p| p.name.as_str()))?;
    for product in products {
        if product.processes.is_empty() {
            return Err(CatalogError::NoProcesses {
                product: product.name.clone(),
            });
        }
        ensure_unique("process", product.processes.iter().map(|p| p.name.as_str()))?;
        for process in &product.processes {
            if process.options.is_empty() {
                return Err(CatalogError::NoOptions {
                    product: product.name.clone(),
                    process: process.name.clone(),
                });
            }
            ensure_unique("option", process.options.iter().map(|o| o.name.as_str()))?;
            for option in &process.options {
                validate_option(option)?;
            }
        }
    }
    Ok(())
}

fn ensure_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_option(option: &ProcessOption) -> Result<(), CatalogError> {
    for (field, value) in [("efficiency", option.efficiency), ("happiness", option.happiness)] {
        if !(MIN_OPTION_RATING..=MAX_OPTION_RATING).contains(&value) {
            return Err(CatalogError::RatingOutOfRange {
                option: option.name.clone(),
                field,
                value,
            });
        }
    }
    for (field, value) in [("cost", option.cost), ("emissions", option.emissions)] {
        if value < 0 {
            return Err(CatalogError::NegativeAttribute {
                option: option.name.clone(),
                field,
                value,
            });
        }
    }
    Ok(())
}

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::machine::Entry;
use crate::model::{Command, Product, ProductId};
use crate::Amount;

/// Errors that can occur when reading csv files
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{command}'")]
    UnrecognizedType { line: usize, command: String },

    #[error("line {line}: {command} missing amount")]
    MissingAmount { line: usize, command: String },

    #[error("line {line}: invalid amount {value}")]
    InvalidAmount { line: usize, value: f64 },

    #[error("line {line}: {command} missing product")]
    MissingProduct { line: usize, command: String },

    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Deserialize)]
struct CommandRow {
    r#type: String,
    product: Option<ProductId>,
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: f64,
}

#[derive(Debug, Serialize)]
struct TranscriptRow {
    command: String,
    status: &'static str,
    message: String,
    balance: String,
    state: String,
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, CsvError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })
}

/// Read machine commands from a csv file
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let reader = open(path.as_ref())?;

    Ok(reader
        .into_deserialize::<CommandRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            match row.r#type.as_str() {
                "insert_coin" => {
                    let amount = row.amount.ok_or_else(|| CsvError::MissingAmount {
                        line,
                        command: row.r#type.clone(),
                    })?;
                    let amount = Amount::try_from_float(amount)
                        .ok_or(CsvError::InvalidAmount { line, value: amount })?;
                    Ok(Command::InsertCoin { amount })
                }
                "select_product" => {
                    let product = row
                        .product
                        .filter(|p| !p.is_empty())
                        .ok_or_else(|| CsvError::MissingProduct {
                            line,
                            command: row.r#type.clone(),
                        })?;
                    Ok(Command::SelectProduct { product })
                }
                "dispense" => Ok(Command::Dispense),
                "refund" => Ok(Command::Refund),
                other => Err(CsvError::UnrecognizedType {
                    line,
                    command: other.to_string(),
                }),
            }
        }))
}

/// Read a product catalog from a csv file
pub fn read_catalog(path: impl AsRef<Path>) -> Result<Catalog, CsvError> {
    let reader = open(path.as_ref())?;

    let products = reader
        .into_deserialize::<ProductRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2;
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            let price = Amount::try_from_float(row.price).ok_or(CsvError::InvalidAmount {
                line,
                value: row.price,
            })?;
            Ok(Product::new(row.id, row.name, price))
        })
        .collect::<Result<Vec<_>, CsvError>>()?;

    Ok(Catalog::from_products(products)?)
}

/// Write the transcript in csv format
pub fn write_transcript<'a>(
    writer: impl io::Write,
    entries: impl IntoIterator<Item = &'a Entry>,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);

    for entry in entries {
        let (status, message) = match &entry.result {
            Ok(outcome) => ("ok", outcome.to_string()),
            Err(e) => ("rejected", e.to_string()),
        };
        writer.serialize(TranscriptRow {
            command: entry.command.to_string(),
            status,
            message,
            balance: entry.balance.to_string(),
            state: entry.state.to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

use crate::error::EtlError;
use chrono::{Datelike, NaiveDate};
use core_types::FxRecord;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// The per-indicator extract files expected under the input directory, one
/// per sheet of the original workbook.
pub const SOURCE_FILES: [&str; 8] = [
    "balanco_anual.csv",
    "processamento.csv",
    "exportacao.csv",
    "importacao.csv",
    "estoques.csv",
    "precos.csv",
    "compras.csv",
    "variacao_cambial.csv",
];

/// One long-form row of the annual balance sheet: one value per product,
/// year and discrimination label.
#[derive(Debug, Deserialize)]
pub struct BalanceRow {
    #[serde(rename = "PRODUTO")]
    pub produto: String,
    #[serde(rename = "DATA")]
    pub data: NaiveDate,
    #[serde(rename = "DISCRIMINAÇÃO")]
    pub discriminacao: String,
    #[serde(rename = "VALOR")]
    pub valor: Option<f64>,
}

/// One long-form row of the price sheet: one quote per product, month and
/// market label.
#[derive(Debug, Deserialize)]
pub struct PriceRow {
    pub data: NaiveDate,
    pub produto: String,
    pub discriminacao: String,
    pub valor: Option<f64>,
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, EtlError> {
    if !path.exists() {
        return Err(EtlError::FileNotFound(path.to_path_buf()));
    }
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Reads a simple monthly flow extract (`DATA` + one value column) into a
/// per-month map. The value column name differs per sheet (`SOJA`,
/// `VALOR`, `COMPRAS`), so it is resolved against the header row.
pub fn read_flow(path: &Path, value_column: &str) -> Result<BTreeMap<NaiveDate, f64>, EtlError> {
    let mut rdr = open(path)?;

    let headers = rdr.headers()?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h == "DATA")
        .ok_or_else(|| EtlError::MissingColumn("DATA".to_string(), path.to_path_buf()))?;
    let value_idx = headers
        .iter()
        .position(|h| h == value_column)
        .ok_or_else(|| EtlError::MissingColumn(value_column.to_string(), path.to_path_buf()))?;

    let mut out = BTreeMap::new();
    for result in rdr.records() {
        let record = result?;
        let raw_date = record.get(date_idx).unwrap_or("");
        let date: NaiveDate = raw_date
            .parse()
            .map_err(|_| EtlError::Parse("DATA".to_string(), raw_date.to_string()))?;

        let raw_value = record.get(value_idx).unwrap_or("");
        // An empty cell is a missing observation; the merge zero-fills it.
        if raw_value.is_empty() {
            out.entry(first_of_month(date)).or_insert(0.0);
            continue;
        }
        let value: f64 = raw_value
            .parse()
            .map_err(|_| EtlError::Parse(value_column.to_string(), raw_value.to_string()))?;
        out.insert(first_of_month(date), value);
    }
    Ok(out)
}

/// Reads the long-form annual balance extract.
pub fn read_balance(path: &Path) -> Result<Vec<BalanceRow>, EtlError> {
    let mut rdr = open(path)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Reads the long-form price extract.
pub fn read_prices(path: &Path) -> Result<Vec<PriceRow>, EtlError> {
    let mut rdr = open(path)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Reads the daily FX extract, sorted by date.
pub fn read_fx(path: &Path) -> Result<Vec<FxRecord>, EtlError> {
    let mut rdr = open(path)?;
    let mut rows: Vec<FxRecord> = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    rows.sort_by_key(|r| r.datetime);
    Ok(rows)
}

/// Normalizes a period key to the first day of its month.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // Day 1 always exists for a valid year/month pair.
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

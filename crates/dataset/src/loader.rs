use crate::error::DatasetError;
use crate::store::MarketData;
use core_types::{AnnualRecord, FxRecord, MonthlyRecord, PriceSeries};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Loads the three flat tables into an in-memory [`MarketData`] context.
///
/// All tables are restricted to the configured year window and sorted by
/// their period key. Loading is the only I/O the dashboard performs; every
/// later interaction works on in-memory copies.
pub struct DataLoader;

impl DataLoader {
    pub fn load(
        monthly_path: &Path,
        annual_path: &Path,
        fx_path: &Path,
        year_min: i32,
        year_max: i32,
    ) -> Result<MarketData, DatasetError> {
        let mut monthly: Vec<MonthlyRecord> = Self::read_table(
            monthly_path,
            &Self::monthly_columns(),
        )?;
        let mut annual: Vec<AnnualRecord> = Self::read_table(
            annual_path,
            &["periodo", "estoque_inicial", "producao", "estoque_final"],
        )?;
        let mut fx: Vec<FxRecord> = Self::read_table(fx_path, &["datetime", "close"])?;

        monthly.retain(|r| r.ano >= year_min && r.ano <= year_max);
        annual.retain(|r| r.periodo >= year_min && r.periodo <= year_max);
        fx.retain(|r| r.ano >= year_min && r.ano <= year_max);

        monthly.sort_by_key(|r| r.ano_mes);
        annual.sort_by_key(|r| r.periodo);
        fx.sort_by_key(|r| r.datetime);

        Self::verify_unique(monthly.iter().map(|r| r.ano_mes.to_string()), monthly_path)?;
        Self::verify_unique(annual.iter().map(|r| r.periodo.to_string()), annual_path)?;
        Self::verify_unique(fx.iter().map(|r| r.datetime.to_string()), fx_path)?;

        info!(
            monthly = monthly.len(),
            annual = annual.len(),
            fx = fx.len(),
            "Loaded market data ({}..{})",
            year_min,
            year_max
        );

        Ok(MarketData::new(monthly, annual, fx))
    }

    fn monthly_columns() -> Vec<&'static str> {
        let mut columns = vec![
            "mes",
            "ano",
            "ano_mes",
            "estoque",
            "exportacao",
            "processamento",
            "compra_liquida",
            "importacao",
            "saldo",
            "producao",
            "usdbrl",
        ];
        columns.extend(PriceSeries::ALL.iter().map(|s| s.column()));
        columns
    }

    fn read_table<T: DeserializeOwned>(
        path: &Path,
        required_columns: &[&str],
    ) -> Result<Vec<T>, DatasetError> {
        if !path.exists() {
            return Err(DatasetError::FileNotFound(path.to_path_buf()));
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let headers: HashSet<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        for column in required_columns {
            if !headers.contains(*column) {
                return Err(DatasetError::MissingColumn(
                    column.to_string(),
                    path.to_path_buf(),
                ));
            }
        }

        let mut records = Vec::new();
        for result in rdr.deserialize() {
            records.push(result?);
        }
        Ok(records)
    }

    fn verify_unique<I: Iterator<Item = String>>(
        keys: I,
        path: &Path,
    ) -> Result<(), DatasetError> {
        let mut seen = HashSet::new();
        for key in keys {
            if !seen.insert(key.clone()) {
                return Err(DatasetError::DuplicatePeriod(key, path.to_path_buf()));
            }
        }
        Ok(())
    }
}

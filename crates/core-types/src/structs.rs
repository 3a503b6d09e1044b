use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar month of soybean market indicators.
///
/// Volumes are in thousands of tonnes. Price columns keep the canonical
/// identifiers produced by the ETL reshape; they stay optional because a
/// period present in one source extract may be absent from the price sheet,
/// and a missing quote must never be zero-filled (it would feed ratios
/// downstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub mes: u32,
    pub ano: i32,
    /// Period key: the first day of the month.
    pub ano_mes: NaiveDate,
    pub estoque: f64,
    pub exportacao: f64,
    pub processamento: f64,
    pub compra_liquida: f64,
    pub importacao: f64,
    /// Period-over-period stock difference.
    pub saldo: f64,
    /// Annual production apportioned to this month by the seasonal weights.
    pub producao: f64,
    #[serde(rename = "chicago_cbot_u$/t")]
    pub chicago_cbot: Option<f64>,
    #[serde(rename = "fob_porto_paranagua_u$/t")]
    pub fob_porto_paranagua: Option<f64>,
    #[serde(rename = "maringa_r$/saca")]
    pub maringa: Option<f64>,
    #[serde(rename = "mogiana_r$/saca")]
    pub mogiana: Option<f64>,
    #[serde(rename = "passofundo_r$/saca")]
    pub passofundo: Option<f64>,
    #[serde(rename = "rondonopolis_r$/saca")]
    pub rondonopolis: Option<f64>,
    /// Monthly USD/BRL close: the last daily observation of the month.
    pub usdbrl: Option<f64>,
}

/// One crop year from the annual supply/demand balance sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualRecord {
    /// Period key: the calendar year.
    pub periodo: i32,
    pub estoque_inicial: f64,
    pub producao: f64,
    pub importacao: f64,
    pub sementes_outros: f64,
    pub exportacao: f64,
    pub processamento: f64,
    pub estoque_final: f64,
    /// Year-end USD/BRL close.
    pub usdbrl: Option<f64>,
    /// Closing minus opening stock.
    pub saldo: f64,
}

/// One daily USD/BRL observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxRecord {
    pub datetime: NaiveDate,
    pub close: f64,
    pub ano: i32,
    pub mes: u32,
}

/// A fixed macroeconomic event used purely for chart annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAnnotation {
    pub date: NaiveDate,
    pub label: String,
}

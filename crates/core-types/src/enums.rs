use crate::error::CoreError;
use crate::structs::MonthlyRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six quoted soybean price series the dashboard can display.
///
/// This enum is the single label-to-column mapping in the codebase. The
/// original data source quotes one international benchmark (CBOT), one
/// export parity price (FOB Paranaguá) and four domestic spot markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSeries {
    ChicagoCbot,
    FobParanagua,
    Maringa,
    Mogiana,
    PassoFundo,
    #[default]
    Rondonopolis,
}

impl PriceSeries {
    pub const ALL: [PriceSeries; 6] = [
        PriceSeries::ChicagoCbot,
        PriceSeries::FobParanagua,
        PriceSeries::Maringa,
        PriceSeries::Mogiana,
        PriceSeries::PassoFundo,
        PriceSeries::Rondonopolis,
    ];

    /// The display label, as presented by the selection widget.
    pub fn label(&self) -> &'static str {
        match self {
            PriceSeries::ChicagoCbot => "Chicago - CBOT (US$/t)",
            PriceSeries::FobParanagua => "FOB Porto - Paranaguá (US$/t)",
            PriceSeries::Maringa => "Maringá / PR - R$/saca (sem ICMS)",
            PriceSeries::Mogiana => "Mogiana / SP - R$/saca (sem ICMS)",
            PriceSeries::PassoFundo => "Passo Fundo / RS - R$/saca (sem ICMS)",
            PriceSeries::Rondonopolis => "Rondonopolis / MT - R$/saca (sem ICMS)",
        }
    }

    /// The canonical column identifier in the monthly table.
    pub fn column(&self) -> &'static str {
        match self {
            PriceSeries::ChicagoCbot => "chicago_cbot_u$/t",
            PriceSeries::FobParanagua => "fob_porto_paranagua_u$/t",
            PriceSeries::Maringa => "maringa_r$/saca",
            PriceSeries::Mogiana => "mogiana_r$/saca",
            PriceSeries::PassoFundo => "passofundo_r$/saca",
            PriceSeries::Rondonopolis => "rondonopolis_r$/saca",
        }
    }

    /// The query-string token accepted by the HTTP API.
    pub fn token(&self) -> &'static str {
        match self {
            PriceSeries::ChicagoCbot => "chicago_cbot",
            PriceSeries::FobParanagua => "fob_paranagua",
            PriceSeries::Maringa => "maringa",
            PriceSeries::Mogiana => "mogiana",
            PriceSeries::PassoFundo => "passo_fundo",
            PriceSeries::Rondonopolis => "rondonopolis",
        }
    }

    /// Resolves this series against a monthly record.
    pub fn value_in(&self, record: &MonthlyRecord) -> Option<f64> {
        match self {
            PriceSeries::ChicagoCbot => record.chicago_cbot,
            PriceSeries::FobParanagua => record.fob_porto_paranagua,
            PriceSeries::Maringa => record.maringa,
            PriceSeries::Mogiana => record.mogiana,
            PriceSeries::PassoFundo => record.passofundo,
            PriceSeries::Rondonopolis => record.rondonopolis,
        }
    }
}

impl fmt::Display for PriceSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PriceSeries {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|series| series.token() == s)
            .ok_or_else(|| CoreError::InvalidInput("price series".to_string(), s.to_string()))
    }
}

/// Direction of a sparkline or KPI movement (first vs. last value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// Sign label attached to a correlation statistic card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationSign {
    Positiva,
    Negativa,
}

impl CorrelationSign {
    pub fn of(coefficient: f64) -> Self {
        if coefficient > 0.0 {
            CorrelationSign::Positiva
        } else {
            CorrelationSign::Negativa
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_series_has_a_distinct_column_and_label() {
        let mut columns: Vec<&str> = PriceSeries::ALL.iter().map(|s| s.column()).collect();
        let mut labels: Vec<&str> = PriceSeries::ALL.iter().map(|s| s.label()).collect();
        columns.sort();
        columns.dedup();
        labels.sort();
        labels.dedup();
        assert_eq!(columns.len(), 6);
        assert_eq!(labels.len(), 6);
    }

    #[test]
    fn tokens_round_trip_through_from_str() {
        for series in PriceSeries::ALL {
            assert_eq!(series.token().parse::<PriceSeries>().unwrap(), series);
        }
        assert!("parana".parse::<PriceSeries>().is_err());
    }

    #[test]
    fn default_series_is_rondonopolis() {
        assert_eq!(PriceSeries::default(), PriceSeries::Rondonopolis);
    }

    #[test]
    fn correlation_sign_follows_coefficient() {
        assert_eq!(CorrelationSign::of(0.83), CorrelationSign::Positiva);
        assert_eq!(CorrelationSign::of(-0.12), CorrelationSign::Negativa);
    }
}

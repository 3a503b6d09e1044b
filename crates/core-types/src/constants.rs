use crate::error::CoreError;
use crate::structs::EventAnnotation;
use chrono::NaiveDate;

/// Fraction of the annual crop attributed to each calendar month
/// (January first). Hand-chosen around the harvest peak in March; the
/// twelve weights sum to exactly 1.0 so the apportioned months
/// reconstruct the annual total.
pub const SEASONAL_WEIGHTS: [f64; 12] = [
    0.10, // Janeiro
    0.15, // Fevereiro
    0.25, // Março (pico da colheita)
    0.15, // Abril
    0.10, // Maio
    0.05, // Junho
    0.04, // Julho
    0.04, // Agosto
    0.03, // Setembro
    0.03, // Outubro
    0.03, // Novembro
    0.03, // Dezembro
];

/// Looks up the seasonal weight for a 1-based calendar month.
pub fn seasonal_weight(mes: u32) -> Result<f64, CoreError> {
    match mes {
        1..=12 => Ok(SEASONAL_WEIGHTS[(mes - 1) as usize]),
        _ => Err(CoreError::InvalidInput(
            "month".to_string(),
            mes.to_string(),
        )),
    }
}

/// The fixed list of macroeconomic/political events annotated on the FX chart.
pub fn market_events() -> Vec<EventAnnotation> {
    let entries = [
        (2002, 10, 28, "Lula eleito"),
        (2008, 7, 27, "Crise Financeira"),
        (2014, 8, 10, "Recessão Brasil"),
        (2016, 1, 10, "Impeachment Dilma"),
        (2018, 10, 28, "Bolsonaro eleito"),
        (2020, 2, 2, "COVID-19"),
        (2022, 10, 2, "Lula eleito"),
    ];

    entries
        .into_iter()
        .map(|(ano, mes, dia, label)| EventAnnotation {
            date: NaiveDate::from_ymd_opt(ano, mes, dia).unwrap(),
            label: label.to_string(),
        })
        .collect()
}

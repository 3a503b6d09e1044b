use crate::error::AppError;
use crate::pages::{palette, DashboardPage};
use crate::AppState;
use analytics::{CorrelationCard, KpiCard, MetricsEngine, SeriesPoint, TREND_WINDOW};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate};
use core_types::{market_events, AnnualRecord, PriceSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Query parameters shared by every section: the year-range control and
/// the price-series dropdown. Absent bounds default to the full window.
#[derive(Debug, Default, Deserialize)]
pub struct SectionQuery {
    pub from: Option<i32>,
    pub to: Option<i32>,
    pub price: Option<PriceSeries>,
}

/// A named, color-encoded series ready for charting.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub color: &'static str,
    pub points: Vec<SeriesPoint>,
}

fn resolve_range(state: &AppState, q: &SectionQuery) -> Result<(i32, i32), AppError> {
    let (min, max) = state
        .ctx
        .year_bounds()
        .ok_or_else(|| AppError::NotFound("the annual table is empty".to_string()))?;
    let lo = q.from.unwrap_or(min);
    let hi = q.to.unwrap_or(max);
    if lo > hi {
        return Err(AppError::InvalidParam(format!(
            "inverted year range: {lo}..{hi}"
        )));
    }
    Ok((lo, hi))
}

fn resolve_price(state: &AppState, q: &SectionQuery) -> PriceSeries {
    q.price.unwrap_or(state.settings.dashboard.default_price)
}

// ==============================================================================
// Metadata
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct PriceOption {
    pub token: &'static str,
    pub label: &'static str,
    pub column: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub year_min: i32,
    pub year_max: i32,
    pub default_price: PriceSeries,
    pub prices: Vec<PriceOption>,
    pub pages: Vec<DashboardPage>,
}

/// # GET /api/meta
/// The bounds of the year-range control, the price-series options and the
/// page templates.
pub async fn get_meta(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetaResponse>, AppError> {
    let (year_min, year_max) = state
        .ctx
        .year_bounds()
        .ok_or_else(|| AppError::NotFound("the annual table is empty".to_string()))?;

    Ok(Json(MetaResponse {
        year_min,
        year_max,
        default_price: state.settings.dashboard.default_price,
        prices: PriceSeries::ALL
            .iter()
            .map(|s| PriceOption {
                token: s.token(),
                label: s.label(),
                column: s.column(),
            })
            .collect(),
        pages: crate::pages::pages(),
    }))
}

// ==============================================================================
// Section 1 - KPI cards
// ==============================================================================

/// A KPI card with its sparkline fill color attached: green rise, red fall.
#[derive(Debug, Serialize)]
pub struct KpiCardPayload {
    #[serde(flatten)]
    pub card: KpiCard,
    pub sparkline_fill: &'static str,
}

impl From<KpiCard> for KpiCardPayload {
    fn from(card: KpiCard) -> Self {
        let sparkline_fill = palette::spark_fill(card.sparkline.trend);
        Self {
            card,
            sparkline_fill,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct KpiResponse {
    pub from: i32,
    pub to: i32,
    pub price: PriceSeries,
    pub cards: Vec<KpiCardPayload>,
}

/// # GET /api/kpis
/// The eight KPI cards of the market panorama: balance, opening stock,
/// production, imports, exports, processing, FX and the selected price.
pub async fn get_kpis(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SectionQuery>,
) -> Result<Json<KpiResponse>, AppError> {
    let (lo, hi) = resolve_range(&state, &q)?;
    let price = resolve_price(&state, &q);
    let engine = MetricsEngine::new();

    let annual = state.ctx.annual_in(lo, hi);
    let last_year = annual
        .last()
        .map(|r| r.periodo)
        .ok_or_else(|| AppError::NotFound(format!("no annual data in {lo}..{hi}")))?;

    let year_series = |f: &dyn Fn(&AnnualRecord) -> f64| -> Vec<SeriesPoint> {
        annual
            .iter()
            .map(|r| SeriesPoint {
                period: r.periodo.to_string(),
                value: f(r),
            })
            .collect()
    };

    let mut cards = Vec::with_capacity(8);
    cards.push(engine.kpi_card(
        &format!("Saldo Oferta/Demanda {last_year} (1000 t)"),
        &year_series(&|r| r.saldo),
    )?);
    cards.push(engine.kpi_card(
        &format!("Estoque Inicial {last_year} (1000 t)"),
        &year_series(&|r| r.estoque_inicial),
    )?);
    cards.push(engine.kpi_card(
        &format!("Produção {last_year} (1000 t)"),
        &year_series(&|r| r.producao),
    )?);
    cards.push(engine.kpi_card(
        &format!("Importação {last_year} (1000 t)"),
        &year_series(&|r| r.importacao),
    )?);
    cards.push(engine.kpi_card(
        &format!("Exportação {last_year} (1000 t)"),
        &year_series(&|r| r.exportacao),
    )?);
    cards.push(engine.kpi_card(
        &format!("Processamento {last_year} (1000 t)"),
        &year_series(&|r| r.processamento),
    )?);

    // FX card: the delta compares the last close of the two latest years;
    // the sparkline tracks the daily series.
    let fx = state.ctx.fx_in(lo, hi);
    let mut yearly_close: Vec<(i32, f64)> = Vec::new();
    for rec in &fx {
        match yearly_close.last_mut() {
            Some((ano, close)) if *ano == rec.ano => *close = rec.close,
            _ => yearly_close.push((rec.ano, rec.close)),
        }
    }
    if yearly_close.len() < 2 {
        return Err(analytics::AnalyticsError::NotEnoughData(format!(
            "FX KPI needs two years of closes in {lo}..{hi}"
        ))
        .into());
    }
    let fx_spark: Vec<SeriesPoint> = fx
        .iter()
        .map(|r| SeriesPoint {
            period: r.datetime.to_string(),
            value: r.close,
        })
        .collect();
    cards.push(engine.kpi_card_detailed(
        &format!("Câmbio USD/BRL {last_year}"),
        yearly_close[yearly_close.len() - 1].1,
        yearly_close[yearly_close.len() - 2].1,
        &fx_spark,
    )?);

    // Price card: same shape, over the selected series' monthly quotes.
    let monthly = state.ctx.monthly_in(lo, hi);
    let mut yearly_quote: Vec<(i32, f64)> = Vec::new();
    for rec in &monthly {
        if let Some(quote) = price.value_in(rec) {
            match yearly_quote.last_mut() {
                Some((ano, value)) if *ano == rec.ano => *value = quote,
                _ => yearly_quote.push((rec.ano, quote)),
            }
        }
    }
    if yearly_quote.len() < 2 {
        return Err(analytics::AnalyticsError::NotEnoughData(format!(
            "price KPI needs quotes in two years of {lo}..{hi}"
        ))
        .into());
    }
    let price_spark: Vec<SeriesPoint> = monthly
        .iter()
        .filter_map(|r| {
            price.value_in(r).map(|v| SeriesPoint {
                period: r.ano_mes.to_string(),
                value: v,
            })
        })
        .collect();
    cards.push(engine.kpi_card_detailed(
        price.label(),
        yearly_quote[yearly_quote.len() - 1].1,
        yearly_quote[yearly_quote.len() - 2].1,
        &price_spark,
    )?);

    Ok(Json(KpiResponse {
        from: lo,
        to: hi,
        price,
        cards: cards.into_iter().map(KpiCardPayload::from).collect(),
    }))
}

// ==============================================================================
// Section 2 - macroeconomic scenario
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct YoyMarker {
    pub period: String,
    pub close: f64,
    pub yoy_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct EventMarker {
    pub date: NaiveDate,
    pub label: String,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FxChartResponse {
    pub series: ChartSeries,
    pub yoy_markers: Vec<YoyMarker>,
    pub events: Vec<EventMarker>,
}

/// # GET /api/fx
/// The daily USD/BRL line with year-end YoY annotations and the fixed
/// historical-event markers.
pub async fn get_fx(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SectionQuery>,
) -> Result<Json<FxChartResponse>, AppError> {
    let (lo, hi) = resolve_range(&state, &q)?;
    let engine = MetricsEngine::new();

    let fx = state.ctx.fx_in(lo, hi);
    let series = ChartSeries {
        name: "Câmbio USD/BRL".to_string(),
        color: palette::FX,
        points: fx
            .iter()
            .map(|r| SeriesPoint {
                period: r.datetime.to_string(),
                value: r.close,
            })
            .collect(),
    };

    // Year-end closes; the first year has no predecessor to compare with.
    let mut year_end: Vec<(NaiveDate, f64)> = Vec::new();
    for rec in &fx {
        match year_end.last_mut() {
            Some((date, close)) if date.year() == rec.ano => {
                *date = rec.datetime;
                *close = rec.close;
            }
            _ => year_end.push((rec.datetime, rec.close)),
        }
    }
    let mut yoy_markers = Vec::new();
    for w in year_end.windows(2) {
        let (prev, cur) = (w[0].1, w[1].1);
        if prev == 0.0 {
            continue;
        }
        yoy_markers.push(YoyMarker {
            period: w[1].0.to_string(),
            close: cur,
            yoy_pct: engine.yoy_change(cur, prev, "usdbrl")?,
        });
    }

    let events = market_events()
        .into_iter()
        .filter(|e| e.date.year() >= lo && e.date.year() <= hi)
        .map(|e| EventMarker {
            date: e.date,
            label: e.label,
            color: palette::EVENT,
        })
        .collect();

    Ok(Json(FxChartResponse {
        series,
        yoy_markers,
        events,
    }))
}

#[derive(Debug, Serialize)]
pub struct ScatterPoint {
    pub period: String,
    pub price: f64,
    pub fx: f64,
}

#[derive(Debug, Serialize)]
pub struct FxCorrelationResponse {
    pub price: PriceSeries,
    pub point_color: &'static str,
    pub points: Vec<ScatterPoint>,
    pub card: CorrelationCard,
}

/// # GET /api/fx/correlation
/// The monthly FX-vs-price scatter and its correlation statistic card.
/// The FX side comes from the daily series downsampled to the last close
/// of each month, merged with the quotes on the period key.
pub async fn get_fx_correlation(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SectionQuery>,
) -> Result<Json<FxCorrelationResponse>, AppError> {
    let (lo, hi) = resolve_range(&state, &q)?;
    let price = resolve_price(&state, &q);
    let engine = MetricsEngine::new();

    let monthly = state.ctx.monthly_in(lo, hi);
    let fx_close: BTreeMap<NaiveDate, f64> = state.ctx.monthly_fx(lo, hi).into_iter().collect();

    let fx_values: Vec<Option<f64>> = monthly
        .iter()
        .map(|r| fx_close.get(&r.ano_mes).copied())
        .collect();
    let quotes: Vec<Option<f64>> = monthly.iter().map(|r| price.value_in(r)).collect();

    let card = engine.correlation_card(
        "Correlação (Câmbio vs. Preço da Soja)",
        &fx_values,
        &quotes,
    )?;

    let points = monthly
        .iter()
        .filter_map(|r| {
            let quote = price.value_in(r)?;
            let fx = fx_close.get(&r.ano_mes).copied()?;
            Some(ScatterPoint {
                period: r.ano_mes.to_string(),
                price: quote,
                fx,
            })
        })
        .collect();

    Ok(Json(FxCorrelationResponse {
        price,
        point_color: palette::STOCK,
        points,
        card,
    }))
}

// ==============================================================================
// Section 3 - supply
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct SupplyResponse {
    pub production_annual: ChartSeries,
    pub imports_annual: ChartSeries,
    pub stocks_annual: ChartSeries,
    pub stock_monthly: ChartSeries,
    pub stock_trend: ChartSeries,
    pub production_rolling: ChartSeries,
    pub imports_rolling: ChartSeries,
}

/// # GET /api/supply
/// Production, imports and stocks: annual series plus the 12-month
/// rolling views of the monthly table.
pub async fn get_supply(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SectionQuery>,
) -> Result<Json<SupplyResponse>, AppError> {
    let (lo, hi) = resolve_range(&state, &q)?;
    let engine = MetricsEngine::new();

    let annual = state.ctx.annual_in(lo, hi);
    let monthly = state.ctx.monthly_in(lo, hi);

    let annual_series = |name: &str, color, f: &dyn Fn(&AnnualRecord) -> f64| ChartSeries {
        name: name.to_string(),
        color,
        points: annual
            .iter()
            .map(|r| SeriesPoint {
                period: r.periodo.to_string(),
                value: f(r),
            })
            .collect(),
    };

    let periods: Vec<String> = monthly.iter().map(|r| r.ano_mes.to_string()).collect();
    let rolled = |name: &str, color, values: Vec<f64>| ChartSeries {
        name: name.to_string(),
        color,
        points: periods
            .iter()
            .cloned()
            .zip(values)
            .map(|(period, value)| SeriesPoint { period, value })
            .collect(),
    };

    let stocks: Vec<f64> = monthly.iter().map(|r| r.estoque).collect();
    let production: Vec<f64> = monthly.iter().map(|r| r.producao).collect();
    let imports: Vec<f64> = monthly.iter().map(|r| r.importacao).collect();

    Ok(Json(SupplyResponse {
        production_annual: annual_series("Produção Anual", palette::FX, &|r| r.producao),
        imports_annual: annual_series("Importação Anual", palette::GREEN, &|r| r.importacao),
        stocks_annual: annual_series("Estoque Final", palette::STOCK, &|r| r.estoque_final),
        stock_monthly: rolled("Estoque Mensal", palette::STOCK, stocks.clone()),
        stock_trend: rolled(
            "Tendência do Estoque (12 meses)",
            palette::FX,
            engine.rolling_mean(&stocks, TREND_WINDOW),
        ),
        production_rolling: rolled(
            "Produção Acumulada (12 meses)",
            palette::FX,
            engine.rolling_sum(&production, TREND_WINDOW),
        ),
        imports_rolling: rolled(
            "Importação Acumulada (12 meses)",
            palette::GREEN,
            engine.rolling_sum(&imports, TREND_WINDOW),
        ),
    }))
}

// ==============================================================================
// Section 4 - demand
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct DemandResponse {
    pub exports_annual: ChartSeries,
    pub seeds_annual: ChartSeries,
    pub processing_annual: ChartSeries,
    pub exports_rolling: ChartSeries,
    pub processing_rolling: ChartSeries,
}

/// # GET /api/demand
/// Exports, processing and seeds/other use.
pub async fn get_demand(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SectionQuery>,
) -> Result<Json<DemandResponse>, AppError> {
    let (lo, hi) = resolve_range(&state, &q)?;
    let engine = MetricsEngine::new();

    let annual = state.ctx.annual_in(lo, hi);
    let monthly = state.ctx.monthly_in(lo, hi);

    let annual_series = |name: &str, color, f: &dyn Fn(&AnnualRecord) -> f64| ChartSeries {
        name: name.to_string(),
        color,
        points: annual
            .iter()
            .map(|r| SeriesPoint {
                period: r.periodo.to_string(),
                value: f(r),
            })
            .collect(),
    };

    let periods: Vec<String> = monthly.iter().map(|r| r.ano_mes.to_string()).collect();
    let rolled = |name: &str, color, values: Vec<f64>| ChartSeries {
        name: name.to_string(),
        color,
        points: periods
            .iter()
            .cloned()
            .zip(values)
            .map(|(period, value)| SeriesPoint { period, value })
            .collect(),
    };

    let exports: Vec<f64> = monthly.iter().map(|r| r.exportacao).collect();
    let processing: Vec<f64> = monthly.iter().map(|r| r.processamento).collect();

    Ok(Json(DemandResponse {
        exports_annual: annual_series("Exportação Anual", palette::FX, &|r| r.exportacao),
        seeds_annual: annual_series("Sementes/Outros", palette::GREEN, &|r| r.sementes_outros),
        processing_annual: annual_series("Processamento Anual", palette::STOCK, &|r| {
            r.processamento
        }),
        exports_rolling: rolled(
            "Exportação Acumulada (12 meses)",
            palette::FX,
            engine.rolling_sum(&exports, TREND_WINDOW),
        ),
        processing_rolling: rolled(
            "Processamento Acumulado (12 meses)",
            palette::GREEN,
            engine.rolling_sum(&processing, TREND_WINDOW),
        ),
    }))
}

// ==============================================================================
// Section 5 - supply/demand balance vs. price
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub price: PriceSeries,
    pub balance_monthly: ChartSeries,
    pub price_monthly: ChartSeries,
    pub card: CorrelationCard,
}

/// # GET /api/balance
/// The monthly stock-difference balance against the selected price, with
/// the correlation card.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    Query(q): Query<SectionQuery>,
) -> Result<Json<BalanceResponse>, AppError> {
    let (lo, hi) = resolve_range(&state, &q)?;
    let price = resolve_price(&state, &q);
    let engine = MetricsEngine::new();

    let monthly = state.ctx.monthly_in(lo, hi);
    let balances: Vec<Option<f64>> = monthly.iter().map(|r| Some(r.saldo)).collect();
    let quotes: Vec<Option<f64>> = monthly.iter().map(|r| price.value_in(r)).collect();

    let card = engine.correlation_card(
        "Correlação (Saldo Oferta/Demanda vs. Preço da Soja)",
        &balances,
        &quotes,
    )?;

    Ok(Json(BalanceResponse {
        price,
        balance_monthly: ChartSeries {
            name: "Saldo Oferta/Demanda".to_string(),
            color: palette::FX,
            points: monthly
                .iter()
                .map(|r| SeriesPoint {
                    period: r.ano_mes.to_string(),
                    value: r.saldo,
                })
                .collect(),
        },
        price_monthly: ChartSeries {
            name: price.label().to_string(),
            color: palette::GREEN,
            points: monthly
                .iter()
                .filter_map(|r| {
                    price.value_in(r).map(|v| SeriesPoint {
                        period: r.ano_mes.to_string(),
                        value: v,
                    })
                })
                .collect(),
        },
        card,
    }))
}

// ==============================================================================
// Forecast page
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub price: Option<PriceSeries>,
    /// USD/BRL assumption; defaults to the original widget's preset.
    pub fx: Option<f64>,
    /// Horizon in months.
    pub horizon: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub history: ChartSeries,
    pub forecast: forecast::PriceForecast,
    pub point_color: &'static str,
    pub band_color: &'static str,
}

/// # GET /api/forecast
/// Fits the price-vs-FX model over the full monthly history and projects
/// one point at the requested horizon.
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, AppError> {
    let price = q.price.unwrap_or(state.settings.dashboard.default_price);
    let fx_assumption = q.fx.unwrap_or(6.0);
    let horizon = q.horizon.unwrap_or(12);

    let bounds = &state.settings.forecast;
    if fx_assumption < bounds.fx_min || fx_assumption > bounds.fx_max {
        return Err(AppError::InvalidParam(format!(
            "FX assumption {fx_assumption} outside [{}, {}]",
            bounds.fx_min, bounds.fx_max
        )));
    }
    if horizon < bounds.horizon_min || horizon > bounds.horizon_max {
        return Err(AppError::InvalidParam(format!(
            "horizon {horizon} outside [{}, {}] months",
            bounds.horizon_min, bounds.horizon_max
        )));
    }

    // The model always fits over the full loaded history, not a filtered
    // range: the forecast extrapolates the long-run FX relation. The
    // regressor is the daily series downsampled to one close per month.
    let window = &state.settings.dashboard;
    let fx_close: BTreeMap<NaiveDate, f64> = state
        .ctx
        .monthly_fx(window.year_min, window.year_max)
        .into_iter()
        .collect();
    let observations: Vec<(NaiveDate, f64, f64)> = state
        .ctx
        .monthly()
        .iter()
        .filter_map(|r| {
            let quote = price.value_in(r)?;
            let fx = fx_close.get(&r.ano_mes).copied()?;
            Some((r.ano_mes, fx, quote))
        })
        .collect();

    let model = forecast::PriceModel::fit(price, &observations)?;
    let projection = model.forecast(fx_assumption, horizon)?;

    let history = ChartSeries {
        name: "Histórico".to_string(),
        color: palette::FORECAST_HISTORY,
        points: observations
            .iter()
            .map(|(period, _, quote)| SeriesPoint {
                period: period.to_string(),
                value: *quote,
            })
            .collect(),
    };

    Ok(Json(ForecastResponse {
        history,
        forecast: projection,
        point_color: palette::FORECAST_POINT,
        band_color: palette::FORECAST_BAND,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::{Dashboard, DataFiles, ForecastBounds, Server, Settings};
    use core_types::{FxRecord, MonthlyRecord};

    fn settings() -> Settings {
        Settings {
            data: DataFiles {
                monthly: "database/soja_mensal.csv".into(),
                annual: "database/soja_anual.csv".into(),
                fx: "database/variacao_cambial.csv".into(),
            },
            dashboard: Dashboard {
                year_min: 2000,
                year_max: 2024,
                default_price: PriceSeries::Rondonopolis,
            },
            server: Server {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            forecast: ForecastBounds {
                fx_min: 3.0,
                fx_max: 10.0,
                horizon_min: 1,
                horizon_max: 48,
            },
        }
    }

    fn state() -> Arc<AppState> {
        let mut monthly = Vec::new();
        let mut fx_daily = Vec::new();
        let mut previous_estoque = None;
        for (i, (ano, mes)) in (2020..=2023)
            .flat_map(|ano| (1u32..=12).map(move |mes| (ano, mes)))
            .enumerate()
        {
            let period = NaiveDate::from_ymd_opt(ano, mes, 1).unwrap();
            let estoque = 2000.0 + (i as f64 * 13.0) % 400.0;
            let fx = 4.0 + i as f64 * 0.02;
            let quote = 80.0 + fx * 9.0 + if i % 2 == 0 { 0.4 } else { -0.4 };
            monthly.push(MonthlyRecord {
                mes,
                ano,
                ano_mes: period,
                estoque,
                exportacao: 900.0 + i as f64,
                processamento: 3500.0,
                compra_liquida: 100.0,
                importacao: 25.0,
                saldo: previous_estoque.map_or(0.0, |prev: f64| estoque - prev),
                producao: 10_000.0,
                chicago_cbot: Some(350.0 + i as f64),
                fob_porto_paranagua: None,
                maringa: None,
                mogiana: None,
                passofundo: None,
                rondonopolis: Some(quote),
                usdbrl: Some(fx),
            });
            previous_estoque = Some(estoque);
            fx_daily.push(FxRecord {
                datetime: NaiveDate::from_ymd_opt(ano, mes, 15).unwrap(),
                close: fx,
                ano,
                mes,
            });
        }

        let annual = (2020..=2023)
            .map(|periodo| AnnualRecord {
                periodo,
                estoque_inicial: 2500.0 + periodo as f64,
                producao: 120_000.0 + periodo as f64 * 100.0,
                importacao: 300.0 + periodo as f64,
                sementes_outros: 2900.0,
                exportacao: 83_000.0 + periodo as f64,
                processamento: 44_000.0,
                estoque_final: 3100.0 + periodo as f64,
                usdbrl: Some(5.0),
                saldo: 600.0,
            })
            .collect();

        Arc::new(AppState {
            ctx: Arc::new(dataset::MarketData::new(monthly, annual, fx_daily)),
            settings: settings(),
        })
    }

    #[tokio::test]
    async fn meta_reports_the_annual_year_bounds() {
        let Json(meta) = get_meta(State(state())).await.unwrap();
        assert_eq!(meta.year_min, 2020);
        assert_eq!(meta.year_max, 2023);
        assert_eq!(meta.prices.len(), 6);
        assert_eq!(meta.pages.len(), 2);
    }

    #[tokio::test]
    async fn kpis_renders_the_eight_cards() {
        let Json(resp) = get_kpis(State(state()), Query(SectionQuery::default()))
            .await
            .unwrap();

        assert_eq!(resp.cards.len(), 8);
        assert!(resp.cards[0].card.label.starts_with("Saldo Oferta/Demanda 2023"));
        assert_eq!(resp.cards[7].card.label, PriceSeries::Rondonopolis.label());
        // Sparkline of the FX card tracks the daily series; the fixture's
        // close rises, so the fill is the rising green.
        assert_eq!(resp.cards[6].card.sparkline.points.len(), 48);
        assert_eq!(resp.cards[6].sparkline_fill, palette::SPARK_UP);
    }

    #[tokio::test]
    async fn kpis_respects_the_year_range_filter() {
        let q = SectionQuery {
            from: Some(2021),
            to: Some(2022),
            price: None,
        };
        let Json(resp) = get_kpis(State(state()), Query(q)).await.unwrap();
        assert_eq!(resp.from, 2021);
        assert_eq!(resp.to, 2022);
        assert!(resp.cards[0].card.label.contains("2022"));
    }

    #[tokio::test]
    async fn inverted_year_range_is_a_bad_request() {
        let q = SectionQuery {
            from: Some(2023),
            to: Some(2020),
            price: None,
        };
        let result = get_supply(State(state()), Query(q)).await;
        assert!(matches!(result, Err(AppError::InvalidParam(_))));
    }

    #[tokio::test]
    async fn fx_chart_annotates_year_ends_and_events_in_range() {
        let Json(resp) = get_fx(State(state()), Query(SectionQuery::default()))
            .await
            .unwrap();

        assert_eq!(resp.series.points.len(), 48);
        // Four years of closes give three year-over-year annotations.
        assert_eq!(resp.yoy_markers.len(), 3);
        // Only COVID-19 (2020) and the 2022 election fall inside 2020..2023.
        let labels: Vec<_> = resp.events.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["COVID-19", "Lula eleito"]);
    }

    #[tokio::test]
    async fn fx_correlation_merges_monthly_closes_with_quotes() {
        let Json(resp) = get_fx_correlation(State(state()), Query(SectionQuery::default()))
            .await
            .unwrap();

        // Quotes rise with the FX close in the fixture, so the card leans
        // strongly positive.
        assert!(resp.card.value > 0.9);
        assert_eq!(resp.card.sign, core_types::CorrelationSign::Positiva);
        assert_eq!(resp.points.len(), 48);
    }

    #[tokio::test]
    async fn demand_rolling_sums_cover_every_month() {
        let Json(resp) = get_demand(State(state()), Query(SectionQuery::default()))
            .await
            .unwrap();

        assert_eq!(resp.exports_annual.points.len(), 4);
        assert_eq!(resp.exports_rolling.points.len(), 48);
        // The first rolling output equals the first monthly export.
        assert!((resp.exports_rolling.points[0].value - 900.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn balance_correlation_stays_in_bounds() {
        let Json(resp) = get_balance(State(state()), Query(SectionQuery::default()))
            .await
            .unwrap();
        assert!((-1.0..=1.0).contains(&resp.card.value));
        assert_eq!(resp.balance_monthly.points.len(), 48);
    }

    #[tokio::test]
    async fn forecast_projects_at_the_requested_horizon() {
        let q = ForecastQuery {
            price: None,
            fx: Some(5.5),
            horizon: Some(6),
        };
        let Json(resp) = get_forecast(State(state()), Query(q)).await.unwrap();

        assert_eq!(
            resp.forecast.forecast_period,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(resp.forecast.r_squared > 0.9);
        assert!(resp.forecast.band_upper >= resp.forecast.point);
        assert!(resp.forecast.band_lower <= resp.forecast.point);
        assert_eq!(resp.history.points.len(), 48);
    }

    #[tokio::test]
    async fn forecast_rejects_out_of_bounds_inputs() {
        let q = ForecastQuery {
            price: None,
            fx: Some(42.0),
            horizon: Some(6),
        };
        assert!(matches!(
            get_forecast(State(state()), Query(q)).await,
            Err(AppError::InvalidParam(_))
        ));

        let q = ForecastQuery {
            price: None,
            fx: Some(5.0),
            horizon: Some(600),
        };
        assert!(matches!(
            get_forecast(State(state()), Query(q)).await,
            Err(AppError::InvalidParam(_))
        ));
    }

    #[tokio::test]
    async fn supply_trend_starts_at_the_first_stock_value() {
        let Json(resp) = get_supply(State(state()), Query(SectionQuery::default()))
            .await
            .unwrap();
        let first_stock = resp.stock_monthly.points[0].value;
        let first_trend = resp.stock_trend.points[0].value;
        assert!((first_stock - first_trend).abs() < 1e-9);
    }
}

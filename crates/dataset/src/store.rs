use chrono::NaiveDate;
use core_types::{AnnualRecord, FxRecord, MonthlyRecord};

/// The read-only in-memory context holding the three loaded tables.
///
/// Built once at startup and passed explicitly to every computation path.
/// Filters never mutate the context; they return fresh owned copies, so a
/// section can attach derived values without aliasing another section's
/// view of the same rows.
#[derive(Debug, Clone)]
pub struct MarketData {
    monthly: Vec<MonthlyRecord>,
    annual: Vec<AnnualRecord>,
    fx: Vec<FxRecord>,
}

impl MarketData {
    /// Builds a context from already-loaded tables. The tables are assumed
    /// sorted by their period key; [`crate::DataLoader`] guarantees that.
    pub fn new(
        monthly: Vec<MonthlyRecord>,
        annual: Vec<AnnualRecord>,
        fx: Vec<FxRecord>,
    ) -> Self {
        Self { monthly, annual, fx }
    }

    pub fn monthly(&self) -> &[MonthlyRecord] {
        &self.monthly
    }

    pub fn annual(&self) -> &[AnnualRecord] {
        &self.annual
    }

    pub fn fx(&self) -> &[FxRecord] {
        &self.fx
    }

    /// Min/max year present in the annual table; the bounds of the
    /// year-range control.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let first = self.annual.first()?.periodo;
        let last = self.annual.last()?.periodo;
        Some((first, last))
    }

    /// Monthly rows whose year lies in the inclusive range `[lo, hi]`.
    pub fn monthly_in(&self, lo: i32, hi: i32) -> Vec<MonthlyRecord> {
        self.monthly
            .iter()
            .filter(|r| r.ano >= lo && r.ano <= hi)
            .cloned()
            .collect()
    }

    /// Annual rows whose year lies in the inclusive range `[lo, hi]`.
    pub fn annual_in(&self, lo: i32, hi: i32) -> Vec<AnnualRecord> {
        self.annual
            .iter()
            .filter(|r| r.periodo >= lo && r.periodo <= hi)
            .cloned()
            .collect()
    }

    /// Daily FX rows whose year lies in the inclusive range `[lo, hi]`.
    pub fn fx_in(&self, lo: i32, hi: i32) -> Vec<FxRecord> {
        self.fx
            .iter()
            .filter(|r| r.ano >= lo && r.ano <= hi)
            .cloned()
            .collect()
    }

    /// Monthly USD/BRL closes for `[lo, hi]`: the last daily observation of
    /// each month, keyed to the first day of that month.
    pub fn monthly_fx(&self, lo: i32, hi: i32) -> Vec<(NaiveDate, f64)> {
        let mut out: Vec<(NaiveDate, f64)> = Vec::new();
        for rec in self.fx.iter().filter(|r| r.ano >= lo && r.ano <= hi) {
            let Some(period) = NaiveDate::from_ymd_opt(rec.ano, rec.mes, 1) else {
                continue;
            };
            match out.last_mut() {
                // Rows are sorted by date, so the last write wins the month.
                Some((last, close)) if *last == period => *close = rec.close,
                _ => out.push((period, rec.close)),
            }
        }
        out
    }
}

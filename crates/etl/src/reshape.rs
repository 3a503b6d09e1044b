use crate::error::EtlError;
use crate::sources::{self, BalanceRow, PriceRow};
use chrono::{Datelike, NaiveDate};
use core_types::{seasonal_weight, AnnualRecord, FxRecord, MonthlyRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Product filter applied to the annual balance extract.
const BALANCE_PRODUCT: &str = "1. Grão";
/// Product filter applied to the price extract.
const PRICE_PRODUCT: &str = "1 - Grão";

/// Discrimination labels of the annual balance sheet, in source order.
const BALANCE_LABELS: [(&str, BalanceField); 7] = [
    ("2.1.1. - Estoque Inicial", BalanceField::EstoqueInicial),
    ("2.1.2. - Produção", BalanceField::Producao),
    ("2.1.3. - Importação", BalanceField::Importacao),
    ("2.1.4. - Sementes/Outros", BalanceField::SementesOutros),
    ("2.1.5. - Exportação", BalanceField::Exportacao),
    ("2.1.6. - Processamento", BalanceField::Processamento),
    ("2.1.7. - Estoque Final", BalanceField::EstoqueFinal),
];

/// Market labels of the price sheet. The premium series ("1.2 - Prêmio")
/// is intentionally absent: it is dropped, not renamed.
const PRICE_LABELS: [(&str, PriceField); 6] = [
    ("1.1 - Chicago - CBOT (US$/t)", PriceField::Chicago),
    ("1.3 - FOB Porto - Paranaguá (US$/t)", PriceField::FobParanagua),
    (
        "1.4 - Mercado Interno - Maringá / PR - R$/saca (sem ICMS)",
        PriceField::Maringa,
    ),
    (
        "1.5 - Mercado Interno - Mogiana / SP - R$/saca (sem ICMS)",
        PriceField::Mogiana,
    ),
    (
        "1.6 - Mercado Interno - Passo Fundo / RS - R$/saca (sem ICMS)",
        PriceField::PassoFundo,
    ),
    (
        "1.7 - Mercado Interno - Rondonopolis / MT - R$/saca (sem ICMS)",
        PriceField::Rondonopolis,
    ),
];

#[derive(Debug, Clone, Copy)]
enum BalanceField {
    EstoqueInicial,
    Producao,
    Importacao,
    SementesOutros,
    Exportacao,
    Processamento,
    EstoqueFinal,
}

#[derive(Debug, Clone, Copy)]
enum PriceField {
    Chicago,
    FobParanagua,
    Maringa,
    Mogiana,
    PassoFundo,
    Rondonopolis,
}

/// Wide per-year balance values accumulated from the long-form extract.
#[derive(Debug, Default, Clone)]
struct BalanceAcc {
    estoque_inicial: f64,
    producao: f64,
    importacao: f64,
    sementes_outros: f64,
    exportacao: f64,
    processamento: f64,
    estoque_final: f64,
}

/// Wide per-month quotes accumulated from the long-form price extract.
/// Quotes stay optional end to end; a missing quote must not become zero.
#[derive(Debug, Default, Clone)]
struct QuoteAcc {
    chicago: Option<f64>,
    fob_paranagua: Option<f64>,
    maringa: Option<f64>,
    mogiana: Option<f64>,
    passofundo: Option<f64>,
    rondonopolis: Option<f64>,
}

/// Accumulator for the monthly outer join: any source contributing a
/// period creates the row, the others fill in later or stay missing.
#[derive(Debug, Default, Clone)]
struct MonthlyAcc {
    estoque: Option<f64>,
    exportacao: Option<f64>,
    processamento: Option<f64>,
    compra_liquida: Option<f64>,
    importacao: Option<f64>,
    quotes: QuoteAcc,
}

/// Result of one reshape run, for the CLI summary table.
#[derive(Debug)]
pub struct EtlSummary {
    pub monthly_rows: usize,
    pub annual_rows: usize,
    pub monthly_path: PathBuf,
    pub annual_path: PathBuf,
}

/// Runs the full reshape: reads every source extract under `input_dir`,
/// rebuilds the two normalized tables, and writes them wholesale under
/// `output_dir`.
pub fn run(input_dir: &Path, output_dir: &Path) -> Result<EtlSummary, EtlError> {
    run_with_progress(input_dir, output_dir, |_| {})
}

/// Same as [`run`], invoking `on_source` as each input file is consumed so
/// a caller can drive a progress display.
pub fn run_with_progress(
    input_dir: &Path,
    output_dir: &Path,
    mut on_source: impl FnMut(&str),
) -> Result<EtlSummary, EtlError> {
    let path = |name: &str| input_dir.join(name);

    // All inputs are read before anything is written: a missing or broken
    // extract aborts the run with no partial output.
    let balance_rows = sources::read_balance(&path("balanco_anual.csv"))?;
    on_source("balanco_anual.csv");
    let processamento = sources::read_flow(&path("processamento.csv"), "VALOR")?;
    on_source("processamento.csv");
    let exportacao = sources::read_flow(&path("exportacao.csv"), "SOJA")?;
    on_source("exportacao.csv");
    let importacao = sources::read_flow(&path("importacao.csv"), "SOJA")?;
    on_source("importacao.csv");
    let estoques = sources::read_flow(&path("estoques.csv"), "SOJA")?;
    on_source("estoques.csv");
    let price_rows = sources::read_prices(&path("precos.csv"))?;
    on_source("precos.csv");
    let compras = sources::read_flow(&path("compras.csv"), "COMPRAS")?;
    on_source("compras.csv");
    let fx = sources::read_fx(&path("variacao_cambial.csv"))?;
    on_source("variacao_cambial.csv");

    let balance = pivot_balance(&balance_rows);
    let quotes = pivot_prices(&price_rows);

    let monthly = assemble_monthly(
        &estoques,
        &exportacao,
        &processamento,
        &compras,
        &importacao,
        &quotes,
        &balance,
        &fx,
    );
    let annual = assemble_annual(&balance, &fx);

    std::fs::create_dir_all(output_dir)?;
    let monthly_path = output_dir.join("soja_mensal.csv");
    let annual_path = output_dir.join("soja_anual.csv");
    write_table(&monthly_path, &monthly)?;
    write_table(&annual_path, &annual)?;

    info!(
        monthly = monthly.len(),
        annual = annual.len(),
        "Reshape complete, tables written to {}",
        output_dir.display()
    );

    Ok(EtlSummary {
        monthly_rows: monthly.len(),
        annual_rows: annual.len(),
        monthly_path,
        annual_path,
    })
}

/// Pivots the long-form balance extract to one wide row per year.
fn pivot_balance(rows: &[BalanceRow]) -> BTreeMap<i32, BalanceAcc> {
    let mut out: BTreeMap<i32, BalanceAcc> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.produto == BALANCE_PRODUCT) {
        let Some((_, field)) = BALANCE_LABELS
            .iter()
            .find(|(label, _)| *label == row.discriminacao)
        else {
            continue;
        };
        let acc = out.entry(row.data.year()).or_default();
        let value = row.valor.unwrap_or(0.0);
        match field {
            BalanceField::EstoqueInicial => acc.estoque_inicial = value,
            BalanceField::Producao => acc.producao = value,
            BalanceField::Importacao => acc.importacao = value,
            BalanceField::SementesOutros => acc.sementes_outros = value,
            BalanceField::Exportacao => acc.exportacao = value,
            BalanceField::Processamento => acc.processamento = value,
            BalanceField::EstoqueFinal => acc.estoque_final = value,
        }
    }
    out
}

/// Pivots the long-form price extract to one wide row per month.
fn pivot_prices(rows: &[PriceRow]) -> BTreeMap<NaiveDate, QuoteAcc> {
    let mut out: BTreeMap<NaiveDate, QuoteAcc> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.produto == PRICE_PRODUCT) {
        let Some((_, field)) = PRICE_LABELS
            .iter()
            .find(|(label, _)| *label == row.discriminacao)
        else {
            continue;
        };
        let acc = out.entry(sources::first_of_month(row.data)).or_default();
        match field {
            PriceField::Chicago => acc.chicago = row.valor,
            PriceField::FobParanagua => acc.fob_paranagua = row.valor,
            PriceField::Maringa => acc.maringa = row.valor,
            PriceField::Mogiana => acc.mogiana = row.valor,
            PriceField::PassoFundo => acc.passofundo = row.valor,
            PriceField::Rondonopolis => acc.rondonopolis = row.valor,
        }
    }
    out
}

/// The last daily close of each calendar month.
fn monthly_fx_close(fx: &[FxRecord]) -> BTreeMap<NaiveDate, f64> {
    let mut out = BTreeMap::new();
    for rec in fx {
        out.insert(sources::first_of_month(rec.datetime), rec.close);
    }
    out
}

/// The last daily close of each calendar year.
fn annual_fx_close(fx: &[FxRecord]) -> BTreeMap<i32, f64> {
    let mut out = BTreeMap::new();
    for rec in fx {
        out.insert(rec.ano, rec.close);
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn assemble_monthly(
    estoques: &BTreeMap<NaiveDate, f64>,
    exportacao: &BTreeMap<NaiveDate, f64>,
    processamento: &BTreeMap<NaiveDate, f64>,
    compras: &BTreeMap<NaiveDate, f64>,
    importacao: &BTreeMap<NaiveDate, f64>,
    quotes: &BTreeMap<NaiveDate, QuoteAcc>,
    balance: &BTreeMap<i32, BalanceAcc>,
    fx: &[FxRecord],
) -> Vec<MonthlyRecord> {
    // Outer join on the period key: a month contributed by any one source
    // appears in the output even when absent from the others.
    let mut joined: BTreeMap<NaiveDate, MonthlyAcc> = BTreeMap::new();
    for (&period, &v) in estoques {
        joined.entry(period).or_default().estoque = Some(v);
    }
    for (&period, &v) in exportacao {
        joined.entry(period).or_default().exportacao = Some(v);
    }
    for (&period, &v) in processamento {
        joined.entry(period).or_default().processamento = Some(v);
    }
    for (&period, &v) in compras {
        joined.entry(period).or_default().compra_liquida = Some(v);
    }
    for (&period, &v) in importacao {
        joined.entry(period).or_default().importacao = Some(v);
    }
    for (&period, q) in quotes {
        joined.entry(period).or_default().quotes = q.clone();
    }

    let fx_close = monthly_fx_close(fx);

    let mut records = Vec::with_capacity(joined.len());
    let mut previous_estoque: Option<f64> = None;
    for (period, acc) in joined {
        let estoque = acc.estoque.unwrap_or(0.0);
        // Monthly balance is the period-over-period stock difference; the
        // first month of the series has no predecessor and stays zero.
        let saldo = previous_estoque.map_or(0.0, |prev| estoque - prev);
        previous_estoque = Some(estoque);

        let producao = balance
            .get(&period.year())
            .map(|b| b.producao * seasonal_weight(period.month()).unwrap_or(0.0))
            .unwrap_or(0.0);

        records.push(MonthlyRecord {
            mes: period.month(),
            ano: period.year(),
            ano_mes: period,
            estoque,
            exportacao: acc.exportacao.unwrap_or(0.0),
            processamento: acc.processamento.unwrap_or(0.0),
            compra_liquida: acc.compra_liquida.unwrap_or(0.0),
            importacao: acc.importacao.unwrap_or(0.0),
            saldo,
            producao,
            chicago_cbot: acc.quotes.chicago,
            fob_porto_paranagua: acc.quotes.fob_paranagua,
            maringa: acc.quotes.maringa,
            mogiana: acc.quotes.mogiana,
            passofundo: acc.quotes.passofundo,
            rondonopolis: acc.quotes.rondonopolis,
            usdbrl: fx_close.get(&period).copied(),
        });
    }
    records
}

fn assemble_annual(
    balance: &BTreeMap<i32, BalanceAcc>,
    fx: &[FxRecord],
) -> Vec<AnnualRecord> {
    let fx_close = annual_fx_close(fx);
    balance
        .iter()
        .map(|(&periodo, acc)| AnnualRecord {
            periodo,
            estoque_inicial: acc.estoque_inicial,
            producao: acc.producao,
            importacao: acc.importacao,
            sementes_outros: acc.sementes_outros,
            exportacao: acc.exportacao,
            processamento: acc.processamento,
            estoque_final: acc.estoque_final,
            usdbrl: fx_close.get(&periodo).copied(),
            saldo: acc.estoque_final - acc.estoque_inicial,
        })
        .collect()
}

fn write_table<T: serde::Serialize>(path: &Path, rows: &[T]) -> Result<(), EtlError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sojametrics-etl-{}-{}",
            std::process::id(),
            name
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    /// A small but complete input directory: twelve months of stocks in
    /// 2020, sparser coverage for the other indicators, quotes for two
    /// months, one balance year, and four FX days over two months.
    fn write_fixture(dir: &Path) {
        let mut estoques = String::from("DATA,SOJA\n");
        for mes in 1..=12 {
            estoques.push_str(&format!("2020-{mes:02}-01,{}\n", 1000.0 + mes as f64 * 10.0));
        }
        write_file(dir, "estoques.csv", &estoques);

        write_file(
            dir,
            "exportacao.csv",
            "DATA,SOJA\n2020-01-01,800\n2020-02-01,950\n",
        );
        write_file(dir, "processamento.csv", "DATA,VALOR\n2020-01-01,3600\n");
        write_file(dir, "compras.csv", "DATA,COMPRAS\n2020-02-01,5000\n");
        // A period no other monthly source has: March 2021.
        write_file(
            dir,
            "importacao.csv",
            "DATA,SOJA\n2020-01-01,30\n2021-03-01,45\n",
        );

        write_file(
            dir,
            "precos.csv",
            "data,produto,discriminacao,valor\n\
             2020-01-01,1 - Grão,1.1 - Chicago - CBOT (US$/t),350.2\n\
             2020-01-01,1 - Grão,1.2 - Prêmio (US$/t),12.0\n\
             2020-01-01,1 - Grão,1.7 - Mercado Interno - Rondonopolis / MT - R$/saca (sem ICMS),88.5\n\
             2020-02-01,1 - Grão,1.1 - Chicago - CBOT (US$/t),361.9\n\
             2020-01-01,2 - Farelo,1.1 - Chicago - CBOT (US$/t),999.0\n",
        );

        let mut balanco = String::from("PRODUTO,DATA,DISCRIMINAÇÃO,VALOR\n");
        for (label, value) in [
            ("2.1.1. - Estoque Inicial", 2500.0),
            ("2.1.2. - Produção", 120000.0),
            ("2.1.3. - Importação", 400.0),
            ("2.1.4. - Sementes/Outros", 2900.0),
            ("2.1.5. - Exportação", 83000.0),
            ("2.1.6. - Processamento", 44000.0),
            ("2.1.7. - Estoque Final", 3100.0),
        ] {
            balanco.push_str(&format!("1. Grão,2020-01-01,{label},{value}\n"));
        }
        balanco.push_str("2. Farelo,2020-01-01,2.1.2. - Produção,555.0\n");
        write_file(dir, "balanco_anual.csv", &balanco);

        write_file(
            dir,
            "variacao_cambial.csv",
            "datetime,close,ano,mes\n\
             2020-01-02,4.02,2020,1\n\
             2020-01-31,4.28,2020,1\n\
             2020-02-14,4.34,2020,2\n\
             2020-12-30,5.19,2020,12\n",
        );
    }

    fn read_monthly(path: &Path) -> Vec<MonthlyRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.deserialize().map(|r| r.unwrap()).collect()
    }

    fn read_annual(path: &Path) -> Vec<AnnualRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.deserialize().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn outer_join_keeps_every_period_from_every_source_once() {
        let dir = fixture_dir("join");
        write_fixture(&dir);
        let out = dir.join("out");

        let summary = run(&dir, &out).unwrap();
        let monthly = read_monthly(&summary.monthly_path);
        std::fs::remove_dir_all(&dir).ok();

        // 12 stock months plus the import-only March 2021.
        assert_eq!(monthly.len(), 13);
        let mut periods: Vec<_> = monthly.iter().map(|r| r.ano_mes).collect();
        periods.dedup();
        assert_eq!(periods.len(), 13);
        assert!(monthly.windows(2).all(|w| w[0].ano_mes < w[1].ano_mes));

        // The import-only period exists with its flows zero-filled.
        let lonely = monthly.last().unwrap();
        assert_eq!(lonely.ano, 2021);
        assert_eq!(lonely.mes, 3);
        assert_eq!(lonely.importacao, 45.0);
        assert_eq!(lonely.estoque, 0.0);
        assert_eq!(lonely.exportacao, 0.0);
    }

    #[test]
    fn quotes_stay_missing_while_flows_zero_fill() {
        let dir = fixture_dir("fill");
        write_fixture(&dir);
        let out = dir.join("out");

        let summary = run(&dir, &out).unwrap();
        let monthly = read_monthly(&summary.monthly_path);
        std::fs::remove_dir_all(&dir).ok();

        let jan = &monthly[0];
        assert_eq!(jan.chicago_cbot, Some(350.2));
        assert_eq!(jan.rondonopolis, Some(88.5));
        // No quote was published for Maringá, and the premium series and
        // other products are dropped entirely.
        assert_eq!(jan.maringa, None);

        let mar = &monthly[2];
        assert_eq!(mar.chicago_cbot, None);
        assert_eq!(mar.exportacao, 0.0);
        // FX only exists for Jan, Feb and Dec; March has no close.
        assert_eq!(mar.usdbrl, None);
        assert_eq!(jan.usdbrl, Some(4.28));
    }

    #[test]
    fn monthly_balance_is_the_stock_difference() {
        let dir = fixture_dir("saldo");
        write_fixture(&dir);
        let out = dir.join("out");

        let summary = run(&dir, &out).unwrap();
        let monthly = read_monthly(&summary.monthly_path);
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(monthly[0].saldo, 0.0);
        for w in monthly.windows(2).take(11) {
            assert!((w[1].saldo - (w[1].estoque - w[0].estoque)).abs() < 1e-9);
        }
    }

    #[test]
    fn apportioned_production_sums_back_to_the_annual_total() {
        let dir = fixture_dir("producao");
        write_fixture(&dir);
        let out = dir.join("out");

        let summary = run(&dir, &out).unwrap();
        let monthly = read_monthly(&summary.monthly_path);
        std::fs::remove_dir_all(&dir).ok();

        let total: f64 = monthly
            .iter()
            .filter(|r| r.ano == 2020)
            .map(|r| r.producao)
            .sum();
        assert!((total - 120000.0).abs() < 1e-6);

        // March carries the harvest peak.
        let march = monthly.iter().find(|r| r.mes == 3 && r.ano == 2020).unwrap();
        assert!((march.producao - 120000.0 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn annual_table_derives_balance_and_year_end_fx() {
        let dir = fixture_dir("annual");
        write_fixture(&dir);
        let out = dir.join("out");

        let summary = run(&dir, &out).unwrap();
        let annual = read_annual(&summary.annual_path);
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(annual.len(), 1);
        let year = &annual[0];
        assert_eq!(year.periodo, 2020);
        assert_eq!(year.producao, 120000.0);
        assert!((year.saldo - (3100.0 - 2500.0)).abs() < 1e-9);
        assert_eq!(year.usdbrl, Some(5.19));
    }

    #[test]
    fn a_missing_input_aborts_with_no_partial_output() {
        let dir = fixture_dir("abort");
        write_fixture(&dir);
        std::fs::remove_file(dir.join("precos.csv")).unwrap();
        let out = dir.join("out");

        let result = run(&dir, &out);
        let wrote_anything = out.exists();
        std::fs::remove_dir_all(&dir).ok();

        assert!(matches!(result, Err(EtlError::FileNotFound(_))));
        assert!(!wrote_anything);
    }
}


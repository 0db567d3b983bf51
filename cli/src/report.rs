use anyhow::{Context, Result};
use deliverylog_core::service::DaySummary;
use deliverylog_core::{
    format_rate, Carried, Config, DeliveryRecord, FilePeriodRepository, FormKind, RateKind, RollupReport, RollupUseCase,
};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct MisdeliveryRow {
    #[tabled(rename = "Employee")]
    employee: String,
    #[tabled(rename = "Morning")]
    morning: u32,
    #[tabled(rename = "Afternoon")]
    afternoon: u32,
    #[tabled(rename = "Total")]
    total: u32,
    #[tabled(rename = "Misdeliveries")]
    misdeliveries: u32,
    #[tabled(rename = "Rate")]
    rate: String,
}

#[derive(Tabled)]
struct FulfillmentRow {
    #[tabled(rename = "Employee")]
    employee: String,
    #[tabled(rename = "Total")]
    total: u32,
    #[tabled(rename = "Unfulfilled")]
    unfulfilled: u32,
    #[tabled(rename = "Claims")]
    claims: u32,
    #[tabled(rename = "Misdeliveries")]
    misdeliveries: u32,
    #[tabled(rename = "Late")]
    late: u32,
    #[tabled(rename = "Accidents")]
    accidents: u32,
    #[tabled(rename = "Rate")]
    rate: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Employee")]
    employee: String,
    #[tabled(rename = "Volume")]
    volume: i64,
    #[tabled(rename = "Failures")]
    failures: i64,
    #[tabled(rename = "Rate")]
    rate: String,
}

fn print_table(mut table: Table) {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

pub fn print_records(kind: FormKind, records: &[DeliveryRecord]) {
    let rate_kind = kind.rate_kind();
    let table = match kind {
        FormKind::Misdelivery => Table::new(records.iter().map(|r| {
            let (morning, afternoon) = match r.carried {
                Carried::Split { morning, afternoon } => (morning, afternoon),
                Carried::Total(total) => (total, 0),
            };
            MisdeliveryRow {
                employee: r.employee.clone(),
                morning,
                afternoon,
                total: r.total(),
                misdeliveries: r.failures,
                rate: format_rate(r.rate(rate_kind)),
            }
        })),
        FormKind::Fulfillment => Table::new(records.iter().map(|r| {
            let incidents = r.incidents.unwrap_or_default();
            FulfillmentRow {
                employee: r.employee.clone(),
                total: r.total(),
                unfulfilled: r.failures,
                claims: incidents.claims,
                misdeliveries: incidents.misdeliveries,
                late: incidents.late,
                accidents: incidents.accidents,
                rate: format_rate(r.rate(rate_kind)),
            }
        })),
    };
    print_table(table);
}

pub fn print_day(kind: FormKind, day: &DaySummary) {
    println!(
        "Day total: {} carried, {} {}, {} rate {}",
        day.total,
        day.failures,
        failure_noun(kind.rate_kind()),
        kind,
        format_rate(day.overall_rate)
    );
    if let Some(mean) = day.mean_row_rate {
        println!("Mean of row rates: {}", format_rate(mean));
    }
}

fn title(kind: RateKind) -> &'static str {
    match kind {
        RateKind::Misdelivery => "Misdelivery",
        RateKind::Fulfillment => "Fulfillment",
    }
}

fn failure_noun(kind: RateKind) -> &'static str {
    match kind {
        RateKind::Misdelivery => "misdelivered",
        RateKind::Fulfillment => "unfulfilled",
    }
}

fn print_report(report: &RollupReport, json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(report).context("Failed to serialize the summary")?;
        println!("{}", out);
        return Ok(());
    }

    let summary = &report.summary;
    println!(
        "\n\x1b[1;36m{} summary {}\x1b[0m ({} daily sheet(s))",
        title(summary.rate_kind),
        summary.period,
        report.files_read
    );
    let rows = summary.rows().map(|row| SummaryRow {
        employee: row.employee.clone(),
        volume: row.total_volume,
        failures: row.total_failures,
        rate: row.rate_display(),
    });
    print_table(Table::new(rows));
    println!("Written to {}", report.output.display());
    Ok(())
}

fn period_repo(config: &Config, kind: FormKind) -> FilePeriodRepository {
    FilePeriodRepository::from_config(config, kind)
}

pub fn monthly(config: &Config, kind: FormKind, year: i32, month: u32, json: bool) -> Result<()> {
    let repo = period_repo(config, kind);
    let usecase = RollupUseCase::new(&repo, kind.rate_kind(), config.overall_label.as_str());
    let report = usecase
        .monthly(year, month)
        .with_context(|| format!("Failed to summarize {} for {}-{:02}", kind, year, month))?;
    print_report(&report, json)
}

pub fn yearly(config: &Config, kind: FormKind, year: i32, json: bool) -> Result<()> {
    let repo = period_repo(config, kind);
    let usecase = RollupUseCase::new(&repo, kind.rate_kind(), config.overall_label.as_str());
    let report = usecase
        .yearly(year)
        .with_context(|| format!("Failed to summarize {} for {}", kind, year))?;
    print_report(&report, json)
}

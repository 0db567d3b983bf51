use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use deliverylog_core::{
    parse_row, Config, EntryForm, EntryService, FileDailySheetRepository, FileRosterRepository, FormKind,
    SaveIntent, SavePlan,
};

use crate::report;

fn service(config: &Config, kind: FormKind) -> EntryService<FileDailySheetRepository> {
    EntryService::new(FileDailySheetRepository::from_config(config, kind))
}

pub fn save(
    config: &Config,
    kind: FormKind,
    date: NaiveDate,
    intent: Option<SaveIntent>,
    raw_rows: &[String],
    yes: bool,
) -> Result<()> {
    let roster = FileRosterRepository::new(config.roster_path())
        .load()
        .context("Failed to load the employee roster")?;

    let mut form = EntryForm::new(kind, date);
    for raw in raw_rows {
        let parsed = parse_row(raw);
        form.push_raw(&parsed.employee, &parsed.fields, &roster)
            .with_context(|| format!("Rejected row '{}'", raw))?;
    }

    let service = service(config, kind);
    let prepared = service.prepare(&form, intent)?;

    match &prepared.plan {
        SavePlan::Create => println!("New sheet: {}", prepared.path.display()),
        SavePlan::Append => println!(
            "Appending {} row(s) to {} existing row(s) in {}",
            form.rows().len(),
            prepared.existing().len(),
            prepared.path.display()
        ),
        SavePlan::Overwrite(keys) if keys.is_empty() => println!(
            "No existing rows match; appending to {}",
            prepared.path.display()
        ),
        SavePlan::Overwrite(keys) => println!(
            "Replacing rows of {} in {}",
            keys.join(", "),
            prepared.path.display()
        ),
    }
    report::print_records(kind, &prepared.preview());

    if !yes && !confirm("Save these rows?")? {
        println!("Nothing saved.");
        return Ok(());
    }

    let outcome = service
        .commit(prepared)
        .with_context(|| format!("Failed to save the {} sheet for {}", kind, date))?;
    println!("Saved {} row(s) to {}", outcome.records.len(), outcome.path.display());
    report::print_day(kind, &outcome.day);
    Ok(())
}

pub fn show(config: &Config, kind: FormKind, date: NaiveDate) -> Result<()> {
    let service = service(config, kind);
    match service.load(date)? {
        Some(records) if !records.is_empty() => {
            report::print_records(kind, &records);
            report::print_day(kind, &deliverylog_core::service::summarize_day(kind, &records));
        }
        Some(_) => println!("The {} sheet for {} has no rows.", kind, date),
        None => println!("No {} sheet for {}.", kind, date),
    }
    Ok(())
}

pub fn remove(config: &Config, kind: FormKind, date: NaiveDate, employee: &str, yes: bool) -> Result<()> {
    if employee.trim().is_empty() {
        bail!("Employee name is required");
    }
    if !yes && !confirm(&format!("Delete the row of {} on {}?", employee, date))? {
        println!("Nothing deleted.");
        return Ok(());
    }

    let remaining = service(config, kind).remove(date, employee)?;
    println!("Deleted {}. {} row(s) left.", employee, remaining.len());
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}

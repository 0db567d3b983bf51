use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, TrackerError};
use crate::model::form::EntryForm;
use crate::model::rate::{round2, RateKind};
use crate::model::record::{DeliveryRecord, FormKind};
use crate::repository::DailySheetRepository;

/// What the user asked for when the day already has a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIntent {
    Append,
    Modify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavePlan {
    /// No sheet yet for the date.
    Create,
    /// Add every form row after the existing ones.
    Append,
    /// Replace rows of these employees in place, append the rest.
    Overwrite(Vec<String>),
}

/// Decides how a save goes, from one lookup of the existing sheet.
pub fn plan_save(
    date: NaiveDate,
    existing: Option<&[DeliveryRecord]>,
    incoming: &[DeliveryRecord],
    intent: Option<SaveIntent>,
) -> Result<SavePlan> {
    let Some(existing) = existing else {
        return Ok(SavePlan::Create);
    };
    match intent {
        Some(SaveIntent::Append) => Ok(SavePlan::Append),
        Some(SaveIntent::Modify) => {
            let keys = incoming
                .iter()
                .filter(|r| existing.iter().any(|e| e.employee == r.employee))
                .map(|r| r.employee.clone())
                .collect();
            Ok(SavePlan::Overwrite(keys))
        }
        None => Err(TrackerError::NeedsChoice { date }),
    }
}

/// Builds the rows that end up in the sheet.
///
/// On overwrite the first existing row of a matched employee takes the new
/// values and any later rows for the same employee are dropped.
pub fn apply_plan(plan: &SavePlan, existing: Vec<DeliveryRecord>, incoming: Vec<DeliveryRecord>) -> Vec<DeliveryRecord> {
    match plan {
        SavePlan::Create => incoming,
        SavePlan::Append => {
            let mut rows = existing;
            rows.extend(incoming);
            rows
        }
        SavePlan::Overwrite(keys) => {
            let mut pending: Vec<Option<DeliveryRecord>> = incoming.into_iter().map(Some).collect();
            let mut replaced: Vec<String> = Vec::new();
            let mut rows = Vec::with_capacity(existing.len() + pending.len());

            for record in existing {
                if !keys.contains(&record.employee) {
                    rows.push(record);
                    continue;
                }
                if replaced.contains(&record.employee) {
                    continue;
                }
                let slot = pending
                    .iter_mut()
                    .find(|p| p.as_ref().is_some_and(|p| p.employee == record.employee));
                match slot.and_then(Option::take) {
                    Some(new) => {
                        replaced.push(record.employee);
                        rows.push(new);
                    }
                    None => rows.push(record),
                }
            }

            rows.extend(pending.into_iter().flatten());
            rows
        }
    }
}

/// Overall figures for one date.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub total: i64,
    pub failures: i64,
    pub overall_rate: f64,
    /// Mean of the per-row rates; only reported for the fulfillment form.
    pub mean_row_rate: Option<f64>,
}

pub fn summarize_day(kind: FormKind, records: &[DeliveryRecord]) -> DaySummary {
    let rate_kind = kind.rate_kind();
    let total: i64 = records.iter().map(|r| r.total() as i64).sum();
    let failures: i64 = records.iter().map(|r| r.failures as i64).sum();

    let mean_row_rate = match kind {
        FormKind::Fulfillment if !records.is_empty() => {
            let sum: f64 = records.iter().map(|r| r.rate(RateKind::Fulfillment)).sum();
            Some(round2(sum / records.len() as f64))
        }
        _ => None,
    };

    DaySummary {
        total,
        failures,
        overall_rate: rate_kind.compute(total, failures),
        mean_row_rate,
    }
}

/// A save that has been planned but not written.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSave {
    pub date: NaiveDate,
    pub plan: SavePlan,
    pub path: PathBuf,
    existing: Vec<DeliveryRecord>,
    incoming: Vec<DeliveryRecord>,
}

impl PreparedSave {
    /// The rows that `commit` will write.
    pub fn preview(&self) -> Vec<DeliveryRecord> {
        apply_plan(&self.plan, self.existing.clone(), self.incoming.clone())
    }

    pub fn existing(&self) -> &[DeliveryRecord] {
        &self.existing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub plan: SavePlan,
    pub records: Vec<DeliveryRecord>,
    pub day: DaySummary,
}

pub struct EntryService<R: DailySheetRepository> {
    repo: R,
}

impl<R: DailySheetRepository> EntryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn kind(&self) -> FormKind {
        self.repo.kind()
    }

    /// Rows saved for `date`, or `None` when the day has no sheet.
    pub fn load(&self, date: NaiveDate) -> Result<Option<Vec<DeliveryRecord>>> {
        self.repo.load(date)
    }

    /// Looks up the day's sheet once and fixes the plan for `form`.
    pub fn prepare(&self, form: &EntryForm, intent: Option<SaveIntent>) -> Result<PreparedSave> {
        if form.kind != self.repo.kind() {
            return Err(TrackerError::Validation(format!(
                "a {} form cannot be saved as {}",
                form.kind,
                self.repo.kind()
            )));
        }
        if form.is_empty() {
            return Err(TrackerError::Validation("no rows to save".to_string()));
        }

        let existing = self.repo.load(form.date)?;
        let incoming = form.to_records();
        let plan = plan_save(form.date, existing.as_deref(), &incoming, intent)?;

        Ok(PreparedSave {
            date: form.date,
            plan,
            path: self.repo.sheet_path(form.date),
            existing: existing.unwrap_or_default(),
            incoming,
        })
    }

    pub fn commit(&self, prepared: PreparedSave) -> Result<SaveOutcome> {
        let PreparedSave {
            date,
            plan,
            existing,
            incoming,
            ..
        } = prepared;

        let records = apply_plan(&plan, existing, incoming);
        let path = self.repo.save(date, &records)?;
        let day = summarize_day(self.repo.kind(), &records);
        info!(%date, form = %self.repo.kind(), rows = records.len(), plan = ?plan, "saved daily sheet");

        Ok(SaveOutcome {
            path,
            plan,
            records,
            day,
        })
    }

    /// Deletes `employee`'s row for `date` and rewrites the sheet.
    pub fn remove(&self, date: NaiveDate, employee: &str) -> Result<Vec<DeliveryRecord>> {
        let records = self.repo.load(date)?.ok_or(TrackerError::NoSheet(date))?;

        let mut form = EntryForm::from_records(self.repo.kind(), date, &records);
        if !form.remove(employee) {
            warn!(%date, employee, "no row to remove");
            return Err(TrackerError::UnknownEmployee {
                employee: employee.to_string(),
                date,
            });
        }

        let remaining = form.to_records();
        self.repo.save(date, &remaining)?;
        info!(%date, employee, rows = remaining.len(), "removed row");
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Incidents;
    use crate::model::roster::Roster;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct MockDailySheetRepository {
        kind: FormKind,
        sheets: RefCell<HashMap<NaiveDate, Vec<DeliveryRecord>>>,
        saves: RefCell<usize>,
    }

    impl MockDailySheetRepository {
        fn new(kind: FormKind) -> Self {
            Self {
                kind,
                sheets: RefCell::new(HashMap::new()),
                saves: RefCell::new(0),
            }
        }

        fn with_sheet(self, date: NaiveDate, records: Vec<DeliveryRecord>) -> Self {
            self.sheets.borrow_mut().insert(date, records);
            self
        }
    }

    impl DailySheetRepository for MockDailySheetRepository {
        fn kind(&self) -> FormKind {
            self.kind
        }

        fn sheet_path(&self, date: NaiveDate) -> PathBuf {
            PathBuf::from(format!("{}.xlsx", date))
        }

        fn load(&self, date: NaiveDate) -> Result<Option<Vec<DeliveryRecord>>> {
            Ok(self.sheets.borrow().get(&date).cloned())
        }

        fn save(&self, date: NaiveDate, records: &[DeliveryRecord]) -> Result<PathBuf> {
            self.sheets.borrow_mut().insert(date, records.to_vec());
            *self.saves.borrow_mut() += 1;
            Ok(self.sheet_path(date))
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 7).unwrap()
    }

    fn roster() -> Roster {
        Roster::from_text("Aiko\nKen\nYuki\n")
    }

    fn form(rows: &[(&str, &str, &str, &str)]) -> EntryForm {
        let mut form = EntryForm::new(FormKind::Misdelivery, date());
        for (name, morning, afternoon, mis) in rows {
            let fields = vec![
                ("morning".to_string(), morning.to_string()),
                ("afternoon".to_string(), afternoon.to_string()),
                ("misdeliveries".to_string(), mis.to_string()),
            ];
            form.push_raw(name, &fields, &roster()).unwrap();
        }
        form
    }

    fn m(name: &str, morning: u32, afternoon: u32, mis: u32) -> DeliveryRecord {
        DeliveryRecord::misdelivery(name, morning, afternoon, mis)
    }

    #[test]
    fn test_plan_table() {
        let existing = vec![m("Aiko", 1, 1, 0)];
        let incoming = vec![m("Aiko", 2, 2, 0), m("Ken", 3, 3, 0)];

        assert_eq!(plan_save(date(), None, &incoming, None).unwrap(), SavePlan::Create);
        assert_eq!(
            plan_save(date(), None, &incoming, Some(SaveIntent::Modify)).unwrap(),
            SavePlan::Create
        );
        assert_eq!(
            plan_save(date(), Some(&existing), &incoming, Some(SaveIntent::Append)).unwrap(),
            SavePlan::Append
        );
        assert_eq!(
            plan_save(date(), Some(&existing), &incoming, Some(SaveIntent::Modify)).unwrap(),
            SavePlan::Overwrite(vec!["Aiko".to_string()])
        );
        assert!(matches!(
            plan_save(date(), Some(&existing), &incoming, None),
            Err(TrackerError::NeedsChoice { .. })
        ));
    }

    #[test]
    fn test_overwrite_keeps_positions_and_appends_new() {
        let existing = vec![m("Aiko", 1, 1, 0), m("Ken", 2, 2, 0), m("Yuki", 3, 3, 0)];
        let incoming = vec![m("Yuki", 9, 9, 1), m("Mika", 5, 5, 0), m("Aiko", 7, 7, 2)];
        let plan = SavePlan::Overwrite(vec!["Yuki".to_string(), "Aiko".to_string()]);

        let rows = apply_plan(&plan, existing, incoming);
        assert_eq!(
            rows,
            vec![m("Aiko", 7, 7, 2), m("Ken", 2, 2, 0), m("Yuki", 9, 9, 1), m("Mika", 5, 5, 0)]
        );
    }

    #[test]
    fn test_overwrite_drops_later_duplicates() {
        let existing = vec![m("Aiko", 1, 1, 0), m("Ken", 2, 2, 0), m("Aiko", 4, 4, 0)];
        let incoming = vec![m("Aiko", 7, 7, 2)];
        let plan = SavePlan::Overwrite(vec!["Aiko".to_string()]);

        let rows = apply_plan(&plan, existing, incoming);
        assert_eq!(rows, vec![m("Aiko", 7, 7, 2), m("Ken", 2, 2, 0)]);
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let rows = apply_plan(&SavePlan::Append, vec![m("Aiko", 1, 1, 0)], vec![m("Aiko", 2, 2, 0)]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_save_creates_sheet() {
        let service = EntryService::new(MockDailySheetRepository::new(FormKind::Misdelivery));
        let prepared = service.prepare(&form(&[("Aiko", "60", "40", "2")]), None).unwrap();
        assert_eq!(prepared.plan, SavePlan::Create);

        let outcome = service.commit(prepared).unwrap();
        assert_eq!(outcome.records, vec![m("Aiko", 60, 40, 2)]);
        assert_eq!(outcome.day.overall_rate, 2.0);
        assert_eq!(outcome.day.mean_row_rate, None);
        assert_eq!(service.load(date()).unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_existing_sheet_needs_choice_and_writes_nothing() {
        let repo = MockDailySheetRepository::new(FormKind::Misdelivery)
            .with_sheet(date(), vec![m("Aiko", 1, 1, 0)]);
        let service = EntryService::new(repo);

        let err = service.prepare(&form(&[("Ken", "1", "1", "0")]), None).unwrap_err();
        assert!(matches!(err, TrackerError::NeedsChoice { .. }));
        assert_eq!(*service.repo.saves.borrow(), 0);
    }

    #[test]
    fn test_modify_updates_existing_sheet() {
        let repo = MockDailySheetRepository::new(FormKind::Misdelivery)
            .with_sheet(date(), vec![m("Aiko", 1, 1, 0), m("Ken", 2, 2, 0)]);
        let service = EntryService::new(repo);

        let prepared = service
            .prepare(&form(&[("Ken", "50", "50", "5"), ("Yuki", "10", "0", "0")]), Some(SaveIntent::Modify))
            .unwrap();
        assert_eq!(prepared.existing().len(), 2);
        assert_eq!(
            prepared.preview(),
            vec![m("Aiko", 1, 1, 0), m("Ken", 50, 50, 5), m("Yuki", 10, 0, 0)]
        );

        let outcome = service.commit(prepared).unwrap();
        assert_eq!(outcome.plan, SavePlan::Overwrite(vec!["Ken".to_string()]));
        assert_eq!(outcome.day.total, 112);
        assert_eq!(outcome.day.failures, 5);
    }

    #[test]
    fn test_empty_form_is_rejected() {
        let service = EntryService::new(MockDailySheetRepository::new(FormKind::Misdelivery));
        let empty = EntryForm::new(FormKind::Misdelivery, date());
        assert!(matches!(service.prepare(&empty, None), Err(TrackerError::Validation(_))));
    }

    #[test]
    fn test_wrong_form_kind_is_rejected() {
        let service = EntryService::new(MockDailySheetRepository::new(FormKind::Fulfillment));
        assert!(service.prepare(&form(&[("Aiko", "1", "1", "0")]), None).is_err());
    }

    #[test]
    fn test_remove() {
        let repo = MockDailySheetRepository::new(FormKind::Misdelivery)
            .with_sheet(date(), vec![m("Aiko", 1, 1, 0), m("Ken", 2, 2, 0)]);
        let service = EntryService::new(repo);

        let remaining = service.remove(date(), "Aiko").unwrap();
        assert_eq!(remaining, vec![m("Ken", 2, 2, 0)]);
        assert_eq!(service.load(date()).unwrap().unwrap(), remaining);

        assert!(matches!(
            service.remove(date(), "Aiko"),
            Err(TrackerError::UnknownEmployee { .. })
        ));
        let other = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        assert!(matches!(service.remove(other, "Ken"), Err(TrackerError::NoSheet(_))));
    }

    #[test]
    fn test_fulfillment_day_summary() {
        let records = vec![
            DeliveryRecord::fulfillment("A", 100, 5, Incidents::default()),
            DeliveryRecord::fulfillment("B", 10, 5, Incidents::default()),
        ];
        let day = summarize_day(FormKind::Fulfillment, &records);
        assert_eq!(day.overall_rate, 90.91);
        assert_eq!(day.mean_row_rate, Some(72.5));
    }

    #[test]
    fn test_empty_day_summary() {
        let day = summarize_day(FormKind::Fulfillment, &[]);
        assert_eq!(day.overall_rate, 0.0);
        assert_eq!(day.mean_row_rate, None);
    }
}

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{Result, TrackerError};
use crate::input::expand_key;
use crate::model::record::{Carried, DeliveryRecord, FormKind, Incidents};
use crate::model::roster::Roster;

/// Numeric inputs of a form row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Morning,
    Afternoon,
    Total,
    Unfulfilled,
    Misdeliveries,
    Claims,
    Late,
    Accidents,
}

const MISDELIVERY_FIELDS: &[Field] = &[Field::Morning, Field::Afternoon, Field::Misdeliveries];
const FULFILLMENT_FIELDS: &[Field] = &[
    Field::Total,
    Field::Unfulfilled,
    Field::Claims,
    Field::Misdeliveries,
    Field::Late,
    Field::Accidents,
];

impl Field {
    pub fn key(self) -> &'static str {
        match self {
            Field::Morning => "morning",
            Field::Afternoon => "afternoon",
            Field::Total => "total",
            Field::Unfulfilled => "unfulfilled",
            Field::Misdeliveries => "misdeliveries",
            Field::Claims => "claims",
            Field::Late => "late",
            Field::Accidents => "accidents",
        }
    }

    pub fn for_kind(kind: FormKind) -> &'static [Field] {
        match kind {
            FormKind::Misdelivery => MISDELIVERY_FIELDS,
            FormKind::Fulfillment => FULFILLMENT_FIELDS,
        }
    }

    fn from_key(key: &str, kind: FormKind) -> Option<Field> {
        Field::for_kind(kind).iter().copied().find(|f| f.key() == key)
    }
}

/// One employee line of the form. Missing fields read as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    pub employee: String,
    values: BTreeMap<Field, u32>,
}

impl FormRow {
    pub fn get(&self, field: Field) -> u32 {
        self.values.get(&field).copied().unwrap_or(0)
    }

    fn to_record(&self, kind: FormKind) -> DeliveryRecord {
        match kind {
            FormKind::Misdelivery => DeliveryRecord::misdelivery(
                self.employee.clone(),
                self.get(Field::Morning),
                self.get(Field::Afternoon),
                self.get(Field::Misdeliveries),
            ),
            FormKind::Fulfillment => DeliveryRecord::fulfillment(
                self.employee.clone(),
                self.get(Field::Total),
                self.get(Field::Unfulfilled),
                Incidents {
                    claims: self.get(Field::Claims),
                    misdeliveries: self.get(Field::Misdeliveries),
                    late: self.get(Field::Late),
                    accidents: self.get(Field::Accidents),
                },
            ),
        }
    }

    fn from_record(record: &DeliveryRecord) -> Self {
        let mut values = BTreeMap::new();
        match record.carried {
            Carried::Split { morning, afternoon } => {
                values.insert(Field::Morning, morning);
                values.insert(Field::Afternoon, afternoon);
                values.insert(Field::Misdeliveries, record.failures);
            }
            Carried::Total(total) => {
                values.insert(Field::Total, total);
                values.insert(Field::Unfulfilled, record.failures);
                let incidents = record.incidents.unwrap_or_default();
                values.insert(Field::Claims, incidents.claims);
                values.insert(Field::Misdeliveries, incidents.misdeliveries);
                values.insert(Field::Late, incidents.late);
                values.insert(Field::Accidents, incidents.accidents);
            }
        }
        Self {
            employee: record.employee.clone(),
            values,
        }
    }
}

/// Everything typed in for one date, validated as it is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryForm {
    pub kind: FormKind,
    pub date: NaiveDate,
    rows: Vec<FormRow>,
}

impl EntryForm {
    pub fn new(kind: FormKind, date: NaiveDate) -> Self {
        Self {
            kind,
            date,
            rows: Vec::new(),
        }
    }

    /// Prefills the form from a saved sheet.
    pub fn from_records(kind: FormKind, date: NaiveDate, records: &[DeliveryRecord]) -> Self {
        Self {
            kind,
            date,
            rows: records.iter().map(FormRow::from_record).collect(),
        }
    }

    /// Validates one line of raw input and adds it.
    ///
    /// The employee must be on the roster and appear once per form. Field
    /// names may be abbreviated to any unique prefix; an empty value is 0.
    pub fn push_raw(&mut self, employee: &str, fields: &[(String, String)], roster: &Roster) -> Result<()> {
        let employee = employee.trim();
        if employee.is_empty() {
            return Err(TrackerError::Validation("employee name is required".to_string()));
        }
        if !roster.contains(employee) {
            return Err(TrackerError::Validation(format!(
                "'{}' is not on the employee roster",
                employee
            )));
        }
        if self.rows.iter().any(|r| r.employee == employee) {
            return Err(TrackerError::Validation(format!(
                "'{}' is entered more than once",
                employee
            )));
        }

        let keys: Vec<&str> = Field::for_kind(self.kind).iter().map(|f| f.key()).collect();
        let mut values = BTreeMap::new();
        for (key, raw) in fields {
            let full_key = expand_key(key, &keys)?;
            let field = Field::from_key(full_key, self.kind)
                .ok_or_else(|| TrackerError::Validation(format!("unknown field '{}'", key)))?;
            if values.insert(field, parse_count(field, raw)?).is_some() {
                return Err(TrackerError::Validation(format!(
                    "'{}' given twice for {}",
                    field.key(),
                    employee
                )));
            }
        }

        self.rows.push(FormRow {
            employee: employee.to_string(),
            values,
        });
        Ok(())
    }

    /// Drops the row for `employee`, returning whether one existed.
    pub fn remove(&mut self, employee: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.employee != employee);
        self.rows.len() != before
    }

    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_records(&self) -> Vec<DeliveryRecord> {
        self.rows.iter().map(|r| r.to_record(self.kind)).collect()
    }
}

fn parse_count(field: Field, raw: &str) -> Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>().map_err(|_| {
        TrackerError::Validation(format!(
            "{} must be a non-negative whole number, got '{}'",
            field.key(),
            raw
        ))
    })
}

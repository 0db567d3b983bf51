use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::config::Config;
use crate::model::period::Period;
use crate::model::record::FormKind;

pub const SHEET_EXTENSION: &str = "xlsx";

/// File naming for one form:
///
/// ```text
/// {root}/{YYYY}/{MM}/{prefix}_{YYYY}_{MM}_{DD}.xlsx     daily sheet
/// {root}/{YYYY}/{MM}/{YYYY}_{MM}_{monthly}.xlsx         monthly summary
/// {root}/{YYYY}/{YYYY}_{yearly}.xlsx                    yearly summary
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathLayout {
    root: PathBuf,
    prefix: String,
    monthly_suffix: String,
    yearly_suffix: String,
}

impl PathLayout {
    pub fn new(
        root: impl Into<PathBuf>,
        prefix: impl Into<String>,
        monthly_suffix: impl Into<String>,
        yearly_suffix: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            monthly_suffix: monthly_suffix.into(),
            yearly_suffix: yearly_suffix.into(),
        }
    }

    pub fn from_config(config: &Config, kind: FormKind) -> Self {
        Self::new(
            config.form_dir(kind),
            config.prefix(kind),
            config.monthly_suffix.clone(),
            config.yearly_suffix.clone(),
        )
    }

    pub fn year_dir(&self, year: i32) -> PathBuf {
        self.root.join(format!("{:04}", year))
    }

    pub fn month_dir(&self, year: i32, month: u32) -> PathBuf {
        self.year_dir(year).join(format!("{:02}", month))
    }

    pub fn daily_file(&self, date: NaiveDate) -> PathBuf {
        self.month_dir(date.year(), date.month()).join(format!(
            "{}_{:04}_{:02}_{:02}.{}",
            self.prefix,
            date.year(),
            date.month(),
            date.day(),
            SHEET_EXTENSION
        ))
    }

    /// Folder a rollup scans: the month folder, or the year folder whose
    /// month sub-folders are scanned.
    pub fn scan_dir(&self, period: Period) -> PathBuf {
        match period {
            Period::Month { year, month } => self.month_dir(year, month),
            Period::Year { year } => self.year_dir(year),
        }
    }

    pub fn summary_file(&self, period: Period) -> PathBuf {
        match period {
            Period::Month { year, month } => self.month_dir(year, month).join(format!(
                "{:04}_{:02}_{}.{}",
                year, month, self.monthly_suffix, SHEET_EXTENSION
            )),
            Period::Year { year } => self.year_dir(year).join(format!(
                "{:04}_{}.{}",
                year, self.yearly_suffix, SHEET_EXTENSION
            )),
        }
    }

    /// True for monthly or yearly summary outputs, including copies such as
    /// `2024_05_monthly_summary (1).xlsx`.
    pub fn is_summary_artifact(&self, file_name: &str) -> bool {
        let stem = match file_name
            .rsplit_once('.')
            .filter(|(_, ext)| ext.eq_ignore_ascii_case(SHEET_EXTENSION))
        {
            Some((stem, _)) => stem,
            None => return false,
        };

        let Some(rest) = strip_digits(stem, 4).and_then(|r| r.strip_prefix('_')) else {
            return false;
        };
        if rest.starts_with(self.yearly_suffix.as_str()) {
            return true;
        }
        strip_digits(rest, 2)
            .and_then(|r| r.strip_prefix('_'))
            .map(|r| r.starts_with(self.monthly_suffix.as_str()))
            .unwrap_or(false)
    }
}

/// Spreadsheet editors drop `~$name.xlsx` owner files next to open workbooks.
pub fn is_lock_file(file_name: &str) -> bool {
    file_name.starts_with("~$")
}

pub fn has_sheet_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SHEET_EXTENSION))
        .unwrap_or(false)
}

fn strip_digits(s: &str, count: usize) -> Option<&str> {
    let head = s.get(..count)?;
    if head.chars().all(|c| c.is_ascii_digit()) {
        Some(&s[count..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PathLayout {
        PathLayout::new("/data", "misdelivery", "monthly_summary", "yearly_summary")
    }

    #[test]
    fn test_daily_file() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(
            layout().daily_file(date),
            PathBuf::from("/data/2024/05/misdelivery_2024_05_07.xlsx")
        );
    }

    #[test]
    fn test_summary_files() {
        assert_eq!(
            layout().summary_file(Period::month(2024, 5).unwrap()),
            PathBuf::from("/data/2024/05/2024_05_monthly_summary.xlsx")
        );
        assert_eq!(
            layout().summary_file(Period::year(2024)),
            PathBuf::from("/data/2024/2024_yearly_summary.xlsx")
        );
    }

    #[test]
    fn test_is_summary_artifact() {
        let layout = layout();
        assert!(layout.is_summary_artifact("2024_05_monthly_summary.xlsx"));
        assert!(layout.is_summary_artifact("2023_11_monthly_summary (1).xlsx"));
        assert!(layout.is_summary_artifact("2024_yearly_summary.xlsx"));
        assert!(layout.is_summary_artifact("2024_05_monthly_summary.XLSX"));

        assert!(!layout.is_summary_artifact("misdelivery_2024_05_07.xlsx"));
        assert!(!layout.is_summary_artifact("2024_05_07.xlsx"));
        assert!(!layout.is_summary_artifact("2024_05_monthly_summary.csv"));
        assert!(!layout.is_summary_artifact("notes.xlsx"));
    }

    #[test]
    fn test_multibyte_suffix() {
        let layout = PathLayout::new("/data", "誤配管理", "月次集計", "年次集計");
        assert!(layout.is_summary_artifact("2024_05_月次集計.xlsx"));
        assert!(layout.is_summary_artifact("2024_年次集計.xlsx"));
        assert!(!layout.is_summary_artifact("誤配管理_2024_05_07.xlsx"));
    }

    #[test]
    fn test_lock_and_extension() {
        assert!(is_lock_file("~$misdelivery_2024_05_07.xlsx"));
        assert!(!is_lock_file("misdelivery_2024_05_07.xlsx"));
        assert!(has_sheet_extension(Path::new("a/b.xlsx")));
        assert!(!has_sheet_extension(Path::new("a/b.txt")));
    }
}

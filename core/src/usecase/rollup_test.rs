#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::{Result, TrackerError};
    use crate::model::period::Period;
    use crate::model::rate::RateKind;
    use crate::model::record::{DeliveryRecord, FormKind, Incidents};
    use crate::model::summary::{Summary, VolumeRow};
    use crate::repository::sheet::read_table;
    use crate::repository::{DailySheetRepository, FileDailySheetRepository, FilePeriodRepository, PeriodRepository};
    use crate::usecase::rollup::RollupUseCase;
    use chrono::NaiveDate;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    struct MockPeriodRepo {
        files: HashMap<PathBuf, Vec<VolumeRow>>,
        order: Vec<PathBuf>,
        written: RefCell<Vec<Summary>>,
    }

    impl MockPeriodRepo {
        fn new(files: Vec<(&str, Vec<VolumeRow>)>) -> Self {
            let order = files.iter().map(|(name, _)| PathBuf::from(name)).collect();
            let files = files.into_iter().map(|(name, rows)| (PathBuf::from(name), rows)).collect();
            Self {
                files,
                order,
                written: RefCell::new(Vec::new()),
            }
        }
    }

    impl PeriodRepository for MockPeriodRepo {
        fn daily_files(&self, _period: Period) -> Result<Vec<PathBuf>> {
            Ok(self.order.clone())
        }

        fn read_rows(&self, path: &Path) -> Result<Vec<VolumeRow>> {
            self.files.get(path).cloned().ok_or_else(|| TrackerError::MalformedCell {
                path: path.to_path_buf(),
                row: 2,
                column: "total".to_string(),
                reason: "unreadable".to_string(),
            })
        }

        fn write_summary(&self, summary: &Summary) -> Result<PathBuf> {
            self.written.borrow_mut().push(summary.clone());
            Ok(PathBuf::from("summary.xlsx"))
        }
    }

    #[test]
    fn test_monthly_rollup_writes_summary() {
        let repo = MockPeriodRepo::new(vec![
            ("d1.xlsx", vec![VolumeRow::new("A", 60, 3), VolumeRow::new("B", 5, 1)]),
            ("d2.xlsx", vec![VolumeRow::new("A", 40, 2), VolumeRow::new("B", 5, 4)]),
        ]);
        let usecase = RollupUseCase::new(&repo, RateKind::Misdelivery, "overall");

        let report = usecase.monthly(2024, 5).unwrap();
        assert_eq!(report.files_read, 2);
        assert_eq!(report.output, PathBuf::from("summary.xlsx"));

        let summary = &report.summary;
        assert_eq!(summary.period, Period::Month { year: 2024, month: 5 });
        assert_eq!(summary.employees[0].total_volume, 100);
        assert_eq!(summary.employees[0].rate, 5.0);
        assert_eq!(summary.employees[1].total_volume, 10);
        assert_eq!(summary.employees[1].rate, 50.0);
        assert_eq!(summary.overall.rate, 9.09);

        assert_eq!(repo.written.borrow().as_slice(), &[report.summary.clone()]);
    }

    #[test]
    fn test_empty_period_is_no_data() {
        let repo = MockPeriodRepo::new(vec![]);
        let usecase = RollupUseCase::new(&repo, RateKind::Misdelivery, "overall");

        let err = usecase.yearly(2024).unwrap_err();
        assert!(matches!(err, TrackerError::NoData(Period::Year { year: 2024 })));
        assert!(repo.written.borrow().is_empty());
    }

    #[test]
    fn test_bad_month_is_rejected() {
        let repo = MockPeriodRepo::new(vec![]);
        let usecase = RollupUseCase::new(&repo, RateKind::Misdelivery, "overall");
        assert!(usecase.monthly(2024, 13).is_err());
    }

    #[test]
    fn test_one_bad_file_aborts_without_writing() {
        let mut repo = MockPeriodRepo::new(vec![("d1.xlsx", vec![VolumeRow::new("A", 1, 0)])]);
        repo.order.push(PathBuf::from("broken.xlsx"));
        let usecase = RollupUseCase::new(&repo, RateKind::Misdelivery, "overall");

        assert!(usecase.monthly(2024, 5).is_err());
        assert!(repo.written.borrow().is_empty());
    }

    fn config(root: &Path) -> Config {
        Config::default().with_base_dir(root.to_path_buf())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_rerun_is_identical_and_skips_previous_summary() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());

        let daily = FileDailySheetRepository::from_config(&config, FormKind::Misdelivery);
        daily
            .save(day(1), &[DeliveryRecord::misdelivery("Aiko", 60, 40, 5)])
            .unwrap();
        daily
            .save(
                day(2),
                &[
                    DeliveryRecord::misdelivery("Ken", 5, 5, 5),
                    DeliveryRecord::misdelivery("Aiko", 0, 0, 0),
                ],
            )
            .unwrap();

        let period_repo = FilePeriodRepository::from_config(&config, FormKind::Misdelivery);
        let usecase = RollupUseCase::new(&period_repo, RateKind::Misdelivery, &config.overall_label);

        let first = usecase.monthly(2024, 5).unwrap();
        let first_table = read_table(&first.output).unwrap();

        // The summary now sits in the month folder next to the daily sheets.
        let second = usecase.monthly(2024, 5).unwrap();
        let second_table = read_table(&second.output).unwrap();

        assert_eq!(first.output, second.output);
        assert_eq!(second.files_read, 2);
        assert_eq!(first.summary, second.summary);
        assert_eq!(first_table, second_table);

        let overall = &second.summary.overall;
        assert_eq!(overall.total_volume, 110);
        assert_eq!(overall.total_failures, 10);
        assert_eq!(overall.rate_display(), "9.09%");
        assert_eq!(second_table.rows.len(), 3);
    }

    #[test]
    fn test_yearly_fulfillment_rollup() {
        let dir = tempdir().unwrap();
        let config = config(dir.path());

        let daily = FileDailySheetRepository::from_config(&config, FormKind::Fulfillment);
        daily
            .save(
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                &[DeliveryRecord::fulfillment("Aiko", 100, 5, Incidents::default())],
            )
            .unwrap();
        daily
            .save(
                NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
                &[DeliveryRecord::fulfillment("Ken", 10, 5, Incidents::default())],
            )
            .unwrap();

        let period_repo = FilePeriodRepository::from_config(&config, FormKind::Fulfillment);
        let usecase = RollupUseCase::new(&period_repo, RateKind::Fulfillment, "overall");

        // Monthly summaries of January must not be picked up by the yearly scan.
        usecase.monthly(2024, 1).unwrap();
        let report = usecase.yearly(2024).unwrap();

        assert_eq!(report.files_read, 2);
        assert_eq!(report.summary.employees.len(), 2);
        assert_eq!(report.summary.overall.rate, 90.91);
        assert!(report.output.ends_with("2024/2024_yearly_summary.xlsx"));
    }
}

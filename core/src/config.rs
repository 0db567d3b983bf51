use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::model::record::FormKind;

const CONFIG_DIR_NAME: &str = "deliverylog";
const CONFIG_FILE_NAME: &str = "config.toml";
const ROSTER_FILE_NAME: &str = "roster.txt";

/// Runtime settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub base_dir: PathBuf,
    /// Defaults to `{base_dir}/roster.txt`.
    pub roster: Option<PathBuf>,
    pub column_width: f64,
    pub overall_label: String,
    pub monthly_suffix: String,
    pub yearly_suffix: String,
    pub misdelivery: FormSettings,
    pub fulfillment: FormSettings,
    pub columns: ColumnLabels,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FormSettings {
    /// Defaults to `{base_dir}/{form}`.
    pub dir: Option<PathBuf>,
    /// Daily file name prefix. Defaults to the form name.
    pub prefix: Option<String>,
    /// Labels that differ from `[columns]` for this form only.
    pub columns: LabelOverrides,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct LabelOverrides {
    pub employee: Option<String>,
    pub morning: Option<String>,
    pub afternoon: Option<String>,
    pub total: Option<String>,
    pub misdeliveries: Option<String>,
    pub unfulfilled: Option<String>,
    pub claims: Option<String>,
    pub late: Option<String>,
    pub accidents: Option<String>,
    pub rate: Option<String>,
}

/// Header labels of the daily and summary sheets. Sheets are read by label,
/// so these must match files written earlier.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColumnLabels {
    pub employee: String,
    pub morning: String,
    pub afternoon: String,
    pub total: String,
    pub misdeliveries: String,
    pub unfulfilled: String,
    pub claims: String,
    pub late: String,
    pub accidents: String,
    pub rate: String,
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = dirs::home_dir()
            .map(|home| home.join(".deliverylog"))
            .unwrap_or_else(|| PathBuf::from(".deliverylog"));
        Self {
            base_dir,
            roster: None,
            column_width: 20.0,
            overall_label: "overall".to_string(),
            monthly_suffix: "monthly_summary".to_string(),
            yearly_suffix: "yearly_summary".to_string(),
            misdelivery: FormSettings::default(),
            fulfillment: FormSettings::default(),
            columns: ColumnLabels::default(),
        }
    }
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            employee: "employee".to_string(),
            morning: "morning".to_string(),
            afternoon: "afternoon".to_string(),
            total: "total".to_string(),
            misdeliveries: "misdeliveries".to_string(),
            unfulfilled: "unfulfilled".to_string(),
            claims: "claims".to_string(),
            late: "late".to_string(),
            accidents: "accidents".to_string(),
            rate: "rate".to_string(),
        }
    }
}

impl ColumnLabels {
    /// Column holding the failure count a form's rate is based on.
    pub fn failures(&self, kind: FormKind) -> &str {
        match kind {
            FormKind::Misdelivery => &self.misdeliveries,
            FormKind::Fulfillment => &self.unfulfilled,
        }
    }

    fn with_overrides(mut self, overrides: &LabelOverrides) -> Self {
        for (label, value) in [
            (&mut self.employee, &overrides.employee),
            (&mut self.morning, &overrides.morning),
            (&mut self.afternoon, &overrides.afternoon),
            (&mut self.total, &overrides.total),
            (&mut self.misdeliveries, &overrides.misdeliveries),
            (&mut self.unfulfilled, &overrides.unfulfilled),
            (&mut self.claims, &overrides.claims),
            (&mut self.late, &overrides.late),
            (&mut self.accidents, &overrides.accidents),
            (&mut self.rate, &overrides.rate),
        ] {
            if let Some(value) = value {
                label.clone_from(value);
            }
        }
        self
    }
}

impl Config {
    /// Loads `path` if given, otherwise the per-user config file when it
    /// exists, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("no config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| TrackerError::from_io(path, e))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| TrackerError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(|e| TrackerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.column_width > 0.0) {
            return Err(TrackerError::Config("column_width must be positive".to_string()));
        }
        for (name, value) in [
            ("monthly_suffix", self.monthly_suffix.as_str()),
            ("yearly_suffix", self.yearly_suffix.as_str()),
            ("misdelivery.prefix", self.prefix(FormKind::Misdelivery)),
            ("fulfillment.prefix", self.prefix(FormKind::Fulfillment)),
        ] {
            if value.trim().is_empty() {
                return Err(TrackerError::Config(format!("{} must not be empty", name)));
            }
        }
        for kind in [FormKind::Misdelivery, FormKind::Fulfillment] {
            let labels = self.labels(kind);
            if labels.employee.trim().is_empty() {
                return Err(TrackerError::Config(format!("{} employee label must not be empty", kind)));
            }
        }
        Ok(())
    }

    pub fn with_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.base_dir = base_dir;
        self
    }

    pub fn roster_path(&self) -> PathBuf {
        self.roster
            .clone()
            .unwrap_or_else(|| self.base_dir.join(ROSTER_FILE_NAME))
    }

    pub fn form(&self, kind: FormKind) -> &FormSettings {
        match kind {
            FormKind::Misdelivery => &self.misdelivery,
            FormKind::Fulfillment => &self.fulfillment,
        }
    }

    pub fn prefix(&self, kind: FormKind) -> &str {
        self.form(kind).prefix.as_deref().unwrap_or(kind.as_str())
    }

    /// `[columns]` with the form's own overrides applied on top.
    pub fn labels(&self, kind: FormKind) -> ColumnLabels {
        self.columns.clone().with_overrides(&self.form(kind).columns)
    }

    /// Root under which a form's `{year}/{month}` folders live.
    pub fn form_dir(&self, kind: FormKind) -> PathBuf {
        self.form(kind)
            .dir
            .clone()
            .unwrap_or_else(|| self.base_dir.join(kind.as_str()))
    }
}

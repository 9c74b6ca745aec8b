use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::{Classifier, StatusCode};
use crate::columns;
use crate::normalize::KeyForm;
use crate::table::Table;
use crate::window::WindowFlag;

// ---------------------------------------------------------------------------
// Flavor
// ---------------------------------------------------------------------------

/// Which insurer ledger drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    /// Two sources: Rimac ledger against SICS and the tracker.
    Rimac,
    /// Three sources: Pacífico ledger against SICS, the tracker and the
    /// cancellation list.
    Pacifico,
}

impl Flavor {
    pub const ALL: [Flavor; 2] = [Flavor::Rimac, Flavor::Pacifico];

    pub fn label(self) -> &'static str {
        match self {
            Self::Rimac => "Rimac",
            Self::Pacifico => "Pacifico",
        }
    }

    pub fn classifier(self) -> Classifier {
        match self {
            Self::Rimac => Classifier::Schedule,
            Self::Pacifico => Classifier::Renewal,
        }
    }

    /// Policy-number column of the driver ledger.
    pub fn driver_key_column(self) -> &'static str {
        match self {
            Self::Rimac => columns::RIMAC_POLICY,
            Self::Pacifico => columns::PAC_POLICY,
        }
    }

    /// Due-date column of the driver ledger.
    pub fn due_column(self) -> &'static str {
        match self {
            Self::Rimac => columns::RIMAC_DUE,
            Self::Pacifico => columns::PAC_END,
        }
    }

    /// Derived key column looked up in SICS and the tracker.
    pub fn source_key_column(self) -> &'static str {
        match self {
            Self::Rimac => columns::KEY_RIMAC,
            Self::Pacifico => columns::KEY_PACIFICO,
        }
    }

    /// Rimac ledgers carry only the numeric tail of a policy number.
    pub fn source_key_form(self) -> KeyForm {
        match self {
            Self::Rimac => KeyForm::Suffix,
            Self::Pacifico => KeyForm::Full,
        }
    }

    pub fn code_column(self) -> &'static str {
        match self {
            Self::Rimac => columns::OUT_RIMAC_CODE,
            Self::Pacifico => columns::OUT_PACIFICO_CODE,
        }
    }

    pub fn ledger_required(self) -> &'static [&'static str] {
        match self {
            Self::Rimac => columns::RIMAC_REQUIRED,
            Self::Pacifico => columns::PACIFICO_REQUIRED,
        }
    }

    pub fn sics_required(self) -> &'static [&'static str] {
        match self {
            Self::Rimac => columns::SICS_REQUIRED_RIMAC,
            Self::Pacifico => columns::SICS_REQUIRED_PACIFICO,
        }
    }

    pub fn sharepoint_required(self) -> &'static [&'static str] {
        match self {
            Self::Rimac => columns::SHAREPOINT_REQUIRED_RIMAC,
            Self::Pacifico => columns::SHAREPOINT_REQUIRED_PACIFICO,
        }
    }

    pub fn output_columns(self) -> &'static [&'static str] {
        match self {
            Self::Rimac => columns::RIMAC_OUTPUT,
            Self::Pacifico => columns::PACIFICO_OUTPUT,
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Rimac => "MatchRimac",
            Self::Pacifico => "MatchPacifico",
        }
    }

    /// `Reporte-polizas_<Flavor>_<YYYY-MM-DD>`, without extension.
    pub fn report_stem(self, run_date: NaiveDate) -> String {
        format!("Reporte-polizas_{}_{}", self.label(), run_date.format("%Y-%m-%d"))
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Already-loaded, already-prepared tables for one run.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    /// Insurer ledger. One output row per ledger row.
    pub ledger: Table,
    pub sics: Table,
    pub sharepoint: Table,
    /// Cancellation list, read by the Pacífico flavor only.
    pub cancellations: Option<Table>,
}

// ---------------------------------------------------------------------------
// Per-policy derived values
// ---------------------------------------------------------------------------

/// Everything the pipeline derives for one ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRow {
    /// Index of the row in the ledger.
    pub source_row: usize,
    pub key: String,
    pub sics: String,
    pub tracker: String,
    pub owner: String,
    pub code: StatusCode,
    pub remark: String,
    pub window: WindowFlag,
    pub cancelled: String,
}

impl Default for PolicyRow {
    fn default() -> Self {
        Self {
            source_row: 0,
            key: String::new(),
            sics: String::new(),
            tracker: String::new(),
            owner: String::new(),
            code: StatusCode::NOT_LOADED,
            remark: String::new(),
            window: WindowFlag::No,
            cancelled: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub in_window: usize,
    pub out_of_window: usize,
    /// Status code (as text) → row count.
    pub by_code: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub flavor: Flavor,
    pub run_date: String,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReportMeta,
    pub summary: ReportSummary,
    /// Projected output in the flavor's column order.
    #[serde(flatten)]
    pub table: Table,
    pub warnings: Vec<String>,
}

impl ReconReport {
    pub fn flavor(&self) -> Flavor {
        self.meta.flavor
    }
}

//! Declarative column schema: ordered synonym lists per logical field.
//!
//! Sources disagree on casing, accents and separators for the same logical
//! column, so every lookup goes through one of these specs instead of an
//! inline list. Order expresses precedence: the first synonym present in a
//! row wins.

/// A logical field and the column names it may appear under.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
}

pub const DEALER: FieldSpec = FieldSpec {
    name: "dealer",
    synonyms: &[
        "Dealer",
        "dealer",
        "Concessionaria",
        "concessionaria",
        "Concessionária",
        "concessionária",
    ],
};

pub const SALE_DATE: FieldSpec = FieldSpec {
    name: "sale_date",
    synonyms: &["dateSales", "Date", "data", "Data"],
};

pub const FLAG_TEST_DRIVE: FieldSpec = FieldSpec {
    name: "flag_test_drive",
    synonyms: &[
        "Flag_TestDrive",
        "flag_testdrive",
        "flag_test_drive",
        "FlagTestDrive",
    ],
};

pub const FLAG_BILLED: FieldSpec = FieldSpec {
    name: "flag_billed",
    synonyms: &["Flag_Faturado", "flag_faturado", "faturado", "Faturado"],
};

pub const DAYS_LEAD_TO_TEST_DRIVE: FieldSpec = FieldSpec {
    name: "days_lead_to_test_drive",
    synonyms: &["Dias_Lead_TestDrive", "dias_lead_testdrive"],
};

pub const DAYS_TEST_DRIVE_TO_BILLING: FieldSpec = FieldSpec {
    name: "days_test_drive_to_billing",
    synonyms: &["Dias_TestDrive_Faturamento", "dias_testdrive_faturamento"],
};

pub const DAYS_LEAD_TO_BILLING: FieldSpec = FieldSpec {
    name: "days_lead_to_billing",
    synonyms: &[
        "Dias_Lead_Faturamento",
        "dias_lead_faturamento",
        "DiasLeadFaturamento",
    ],
};

/// The five funnel stages, in sheet position order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Leads,
    TestDrives,
    CompleteJourney,
    Billed,
    StoreVisits,
}

impl SheetKind {
    /// Whether dealer candidates from this sheet must pass the plausibility
    /// filter. Leads and complete-journey sheets carry an explicit dealer
    /// column; test-drive and billed exports reuse loosely labelled columns
    /// that sometimes hold emails or identifiers.
    pub fn dealer_needs_plausibility_check(self) -> bool {
        matches!(self, SheetKind::TestDrives | SheetKind::Billed)
    }
}

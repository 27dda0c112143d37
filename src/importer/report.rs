// ==========================================
// MUCP Planner - validation report
// ==========================================
// The two-mode reader contract: validate mode returns one of these
// per table, and a run may only proceed when no table reported
// errors. Warnings never block.
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ValidationReport - {errors, warnings} for one table
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub table: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Row-scoped error (1-based data row number, excluding the header).
    pub fn row_error(&mut self, row: usize, message: impl std::fmt::Display) {
        self.errors.push(format!("row {}: {}", row, message));
    }

    pub fn row_warning(&mut self, row: usize, message: impl std::fmt::Display) {
        self.warnings.push(format!("row {}: {}", row, message));
    }

    /// A table gates the run on errors only; warnings pass.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Missing-header check shared by every table reader.
pub fn check_required_headers(
    report: &mut ValidationReport,
    headers: &[String],
    required: &[&str],
) {
    for name in required {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
            report.error(format!("missing required column: {}", name));
        }
    }
}

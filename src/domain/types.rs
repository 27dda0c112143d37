// ==========================================
// MUCP Planner - domain type definitions
// ==========================================
// Shared enums used across the importer, engines and repositories.
// Serialized form matches the stored table values.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Process - initial vs follow-up treatment
// ==========================================
// Drives both the clearing-norm lookup and the day-rate selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Process {
    Initial,
    FollowUp,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Initial => write!(f, "initial"),
            Process::FollowUp => write!(f, "follow-up"),
        }
    }
}

impl FromStr for Process {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "initial" => Ok(Process::Initial),
            "follow-up" | "followup" | "follow up" => Ok(Process::FollowUp),
            other => Err(format!("unknown process: {}", other)),
        }
    }
}

// ==========================================
// Terrain - norm lookup dimension
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Landscape,
    Riparian,
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terrain::Landscape => write!(f, "landscape"),
            Terrain::Riparian => write!(f, "riparian"),
        }
    }
}

impl FromStr for Terrain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "landscape" => Ok(Terrain::Landscape),
            "riparian" => Ok(Terrain::Riparian),
            other => Err(format!("unknown terrain: {}", other)),
        }
    }
}

// ==========================================
// SizeClass - norm lookup dimension
// ==========================================
// `All` is a wildcard key in the norm set: it matches any compartment
// size class when no exact row exists (the one explicit fallback).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    All,
    Seedling,
    Young,
    Adult,
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeClass::All => write!(f, "all"),
            SizeClass::Seedling => write!(f, "seedling"),
            SizeClass::Young => write!(f, "young"),
            SizeClass::Adult => write!(f, "adult"),
        }
    }
}

impl FromStr for SizeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(SizeClass::All),
            "seedling" => Ok(SizeClass::Seedling),
            "young" => Ok(SizeClass::Young),
            "adult" => Ok(SizeClass::Adult),
            other => Err(format!("unknown size class: {}", other)),
        }
    }
}

// ==========================================
// CategoryType - prioritization category kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Numeric,
    Text,
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryType::Numeric => write!(f, "numeric"),
            CategoryType::Text => write!(f, "text"),
        }
    }
}

// ==========================================
// Scenario - one of the 5 parallel simulation runs
// ==========================================
// Ord follows declaration order: optimal first, then plans 1..4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Optimal,
    Plan1,
    Plan2,
    Plan3,
    Plan4,
}

impl Scenario {
    /// All scenarios in fixed evaluation and storage order.
    pub const ALL: [Scenario; 5] = [
        Scenario::Optimal,
        Scenario::Plan1,
        Scenario::Plan2,
        Scenario::Plan3,
        Scenario::Plan4,
    ];

    /// Storage name used for persisted scenario rows.
    pub fn storage_name(&self) -> &'static str {
        match self {
            Scenario::Optimal => "optimal",
            Scenario::Plan1 => "budget_1",
            Scenario::Plan2 => "budget_2",
            Scenario::Plan3 => "budget_3",
            Scenario::Plan4 => "budget_4",
        }
    }

    /// Budget plan index (1..=4) for the capped scenarios, None for optimal.
    pub fn plan_index(&self) -> Option<usize> {
        match self {
            Scenario::Optimal => None,
            Scenario::Plan1 => Some(1),
            Scenario::Plan2 => Some(2),
            Scenario::Plan3 => Some(3),
            Scenario::Plan4 => Some(4),
        }
    }

    pub fn from_storage_name(name: &str) -> Option<Scenario> {
        match name {
            "optimal" => Some(Scenario::Optimal),
            "budget_1" => Some(Scenario::Plan1),
            "budget_2" => Some(Scenario::Plan2),
            "budget_3" => Some(Scenario::Plan3),
            "budget_4" => Some(Scenario::Plan4),
            _ => None,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_name())
    }
}

// ==========================================
// ClearingState - per-compartment per-scenario lifecycle
// ==========================================
// untouched -> partially_cleared -> fully_cleared (terminal).
// FullyCleared never regresses within a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearingState {
    Untouched,
    PartiallyCleared,
    FullyCleared,
}

impl ClearingState {
    /// Process applicable to the next treatment of a compartment in
    /// this state.
    pub fn applicable_process(&self) -> Process {
        match self {
            ClearingState::Untouched => Process::Initial,
            ClearingState::PartiallyCleared | ClearingState::FullyCleared => Process::FollowUp,
        }
    }
}

impl fmt::Display for ClearingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearingState::Untouched => write!(f, "untouched"),
            ClearingState::PartiallyCleared => write!(f, "partially_cleared"),
            ClearingState::FullyCleared => write!(f, "fully_cleared"),
        }
    }
}

// ==========================================
// Currency
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    ZAR,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::ZAR
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Currency::ZAR => "ZAR",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        };
        write!(f, "{}", code)
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ZAR" => Ok(Currency::ZAR),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            other => Err(format!("unknown currency: {}", other)),
        }
    }
}

// ==========================================
// Constants
// ==========================================

/// Allowed treatment frequencies in months.
pub const TREATMENT_FREQUENCIES_MONTHS: [i32; 6] = [3, 4, 6, 12, 18, 24];

/// Maximum number of prioritization categories per planning run.
pub const MAX_CATEGORIES_PER_RUN: usize = 6;

/// Round to 2 decimal places (stored monetary values).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

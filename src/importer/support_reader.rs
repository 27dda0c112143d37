// ==========================================
// MUCP Planner - reference table readers
// ==========================================
// Support data behind a run: growth forms, treatment methods, species,
// clearing norms, costing models, prioritization setup. Reference rows
// come in two tiers - shipped defaults and per-user overrides - merged
// by name before anything downstream sees them.
// ==========================================

use crate::domain::costing::{CostingModel, DailyCostItem};
use crate::domain::norms::{ClearingNorm, ClearingNormSet, NormKey};
use crate::domain::prioritization::{Category, CompartmentPriorityRow};
use crate::domain::species::{ProvinceFlags, SpeciesRecord};
use crate::domain::types::{
    Process, SizeClass, Terrain, MAX_CATEGORIES_PER_RUN, TREATMENT_FREQUENCIES_MONTHS,
};
use crate::importer::file_parser::RawTable;
use crate::importer::report::{check_required_headers, ValidationReport};
use std::collections::{HashMap, HashSet};

pub const SPECIES_HEADERS: [&str; 3] = ["species", "growth_form", "treatment_method"];
pub const NORM_HEADERS: [&str; 7] = [
    "growth_form", "treatment_method", "terrain", "size_class", "process", "density", "ppd",
];
pub const COSTING_HEADERS: [&str; 8] = [
    "name",
    "initial_team_size",
    "initial_cost_per_day",
    "followup_team_size",
    "followup_cost_per_day",
    "vehicle_cost_per_day",
    "fuel_cost_per_hour",
    "maintenance_level",
];

fn get(row: &HashMap<String, String>, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

fn opt_f64(row: &HashMap<String, String>, key: &str) -> Option<f64> {
    let v = get(row, key);
    let trimmed = v.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse::<f64>().ok()
    }
}

fn opt_i32(row: &HashMap<String, String>, key: &str) -> Option<i32> {
    let v = get(row, key);
    let trimmed = v.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.parse::<i32>().ok()
    }
}

fn flag(row: &HashMap<String, String>, key: &str) -> bool {
    matches!(
        get(row, key).trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "x"
    )
}

// ==========================================
// Two-tier merge
// ==========================================

/// Merges shipped defaults with per-user overrides. A user row whose
/// name (case-insensitive) matches a default replaces it; other user
/// rows are appended. Defaults keep their relative order.
pub fn merge_by_name<T, F>(defaults: Vec<T>, user: Vec<T>, name_of: F) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let mut user_by_name: HashMap<String, T> = user
        .into_iter()
        .map(|item| (name_of(&item).to_lowercase(), item))
        .collect();

    let mut merged: Vec<T> = defaults
        .into_iter()
        .map(|item| {
            let key = name_of(&item).to_lowercase();
            user_by_name.remove(&key).unwrap_or(item)
        })
        .collect();

    // remaining user rows are additions, in name order for determinism
    let mut additions: Vec<(String, T)> = user_by_name.into_iter().collect();
    additions.sort_by(|a, b| a.0.cmp(&b.0));
    merged.extend(additions.into_iter().map(|(_, item)| item));
    merged
}

// ==========================================
// Name lists (growth forms / treatment methods)
// ==========================================

/// Reads a single-column reference list; the first header is the value
/// column. Names are lower-cased and de-duplicated.
pub fn read_name_list(table: &RawTable) -> Vec<String> {
    let Some(column) = table.headers.first() else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    table
        .rows
        .iter()
        .filter_map(|row| {
            let name = get(row, column).trim().to_lowercase();
            if name.is_empty() || !seen.insert(name.clone()) {
                None
            } else {
                Some(name)
            }
        })
        .collect()
}

// ==========================================
// Species reference table
// ==========================================

pub fn validate_species(
    table: &RawTable,
    growth_forms: &[String],
    treatment_methods: &[String],
) -> ValidationReport {
    let mut report = ValidationReport::new("species");
    check_required_headers(&mut report, &table.headers, &SPECIES_HEADERS);
    if !report.is_valid() {
        return report;
    }

    let forms: HashSet<&str> = growth_forms.iter().map(|s| s.as_str()).collect();
    let methods: HashSet<&str> = treatment_methods.iter().map(|s| s.as_str()).collect();
    let mut seen = HashSet::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let name = get(row, "species");
        if name.is_empty() {
            report.row_error(row_no, "species name is empty");
            continue;
        }
        if !seen.insert(name.to_lowercase()) {
            report.row_error(row_no, format!("duplicate species: {}", name));
        }

        let form = get(row, "growth_form").trim().to_lowercase();
        if form.is_empty() {
            report.row_error(row_no, "growth_form is empty");
        } else if !forms.is_empty() && !forms.contains(form.as_str()) {
            report.row_error(row_no, format!("unknown growth form: {}", form));
        }

        let method = get(row, "treatment_method").trim().to_lowercase();
        if method.is_empty() {
            report.row_error(row_no, "treatment_method is empty");
        } else if !methods.is_empty() && !methods.contains(method.as_str()) {
            report.row_error(row_no, format!("unknown treatment method: {}", method));
        }

        if let Some(freq) = opt_i32(row, "treatment_frequency") {
            if !TREATMENT_FREQUENCIES_MONTHS.contains(&freq) {
                report.row_error(
                    row_no,
                    format!("treatment_frequency not in {:?}: {}", TREATMENT_FREQUENCIES_MONTHS, freq),
                );
            }
        }

        for key in ["initial_reduction", "follow_up_reduction"] {
            if let Some(pct) = opt_f64(row, key) {
                if !(0.0..=100.0).contains(&pct) {
                    report.row_error(row_no, format!("{} outside [0, 100]: {}", key, pct));
                }
            }
        }
    }

    report
}

pub fn read_species(table: &RawTable) -> Vec<SpeciesRecord> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let species_name = get(row, "species");
            if species_name.is_empty() {
                return None;
            }
            let opt_str = |key: &str| {
                let v = get(row, key);
                if v.trim().is_empty() {
                    None
                } else {
                    Some(v)
                }
            };
            Some(SpeciesRecord {
                species_name,
                genus: get(row, "genus"),
                english_name: opt_str("english"),
                afrikaans_name: opt_str("afrikaans"),
                growth_form: get(row, "growth_form").trim().to_lowercase(),
                treatment_method: get(row, "treatment_method").trim().to_lowercase(),
                provinces: ProvinceFlags {
                    wc: flag(row, "wc"),
                    nc: flag(row, "nc"),
                    kzn: flag(row, "kzn"),
                    gtg: flag(row, "gtg"),
                    mpl: flag(row, "mpl"),
                    fs: flag(row, "fs"),
                    ec: flag(row, "ec"),
                    lmp: flag(row, "lmp"),
                    nw: flag(row, "nw"),
                },
                initial_reduction: opt_f64(row, "initial_reduction"),
                follow_up_reduction: opt_f64(row, "follow_up_reduction"),
                treatment_frequency: opt_i32(row, "treatment_frequency"),
                densification: opt_i32(row, "densification"),
                flow_optimal: opt_f64(row, "flow_optimal"),
                flow_sub_optimal: opt_f64(row, "flow_sub_optimal"),
                flow_young: opt_f64(row, "flow_young"),
                flow_seedling: opt_f64(row, "flow_seedling"),
                flow_coppice: opt_f64(row, "flow_coppice"),
            })
        })
        .collect()
}

// ==========================================
// Clearing norms
// ==========================================

pub fn validate_norms(table: &RawTable, growth_forms: &[String]) -> ValidationReport {
    let mut report = ValidationReport::new("clearing_norms");
    check_required_headers(&mut report, &table.headers, &NORM_HEADERS);
    if !report.is_valid() {
        return report;
    }

    let forms: HashSet<&str> = growth_forms.iter().map(|s| s.as_str()).collect();
    let mut seen: HashSet<NormKey> = HashSet::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let form = get(row, "growth_form").trim().to_lowercase();
        if form.is_empty() {
            report.row_error(row_no, "growth_form is empty");
        } else if !forms.is_empty() && !forms.contains(form.as_str()) {
            report.row_error(row_no, format!("unknown growth form: {}", form));
        }

        let terrain = get(row, "terrain").parse::<Terrain>();
        let size_class = get(row, "size_class").parse::<SizeClass>();
        let process = get(row, "process").parse::<Process>();
        if let Err(ref e) = terrain {
            report.row_error(row_no, e.clone());
        }
        if let Err(ref e) = size_class {
            report.row_error(row_no, e.clone());
        }
        if let Err(ref e) = process {
            report.row_error(row_no, e.clone());
        }

        if let (Ok(terrain), Ok(size_class), Ok(process)) = (terrain, size_class, process) {
            let key = NormKey::new(
                &form,
                &get(row, "treatment_method"),
                terrain,
                size_class,
                process,
            );
            if !seen.insert(key.clone()) {
                report.row_error(
                    row_no,
                    format!(
                        "duplicate norm key: {}/{}/{}/{:?}/{}",
                        key.growth_form, key.treatment_method, key.terrain, key.size_class, key.process
                    ),
                );
            }
        }

        match opt_f64(row, "density") {
            Some(density) if density < 0.0 => {
                report.row_error(row_no, format!("density < 0: {}", density))
            }
            Some(_) => {}
            None => report.row_error(row_no, "density is not a number"),
        }
        match opt_f64(row, "ppd") {
            Some(ppd) if ppd < 0.0 => report.row_error(row_no, format!("ppd < 0: {}", ppd)),
            Some(_) => {}
            None => report.row_error(row_no, "ppd is not a number"),
        }
    }

    report
}

pub fn read_norms(table: &RawTable, set_name: &str) -> ClearingNormSet {
    let norms = table
        .rows
        .iter()
        .filter_map(|row| {
            let terrain = get(row, "terrain").parse::<Terrain>().ok()?;
            let size_class = get(row, "size_class").parse::<SizeClass>().ok()?;
            let process = get(row, "process").parse::<Process>().ok()?;
            let density = opt_f64(row, "density")?;
            let ppd = opt_f64(row, "ppd")?;
            if density < 0.0 || ppd < 0.0 {
                return None;
            }
            Some(ClearingNorm {
                key: NormKey::new(
                    &get(row, "growth_form"),
                    &get(row, "treatment_method"),
                    terrain,
                    size_class,
                    process,
                ),
                density,
                ppd,
            })
        })
        .collect();
    ClearingNormSet {
        name: set_name.to_string(),
        norms,
    }
}

// ==========================================
// Costing models
// ==========================================
// Daily cost items ride along in extra columns named item:<name>.

pub fn validate_costing(table: &RawTable) -> ValidationReport {
    let mut report = ValidationReport::new("costing");
    check_required_headers(&mut report, &table.headers, &COSTING_HEADERS);
    if !report.is_valid() {
        return report;
    }

    let mut seen = HashSet::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let name = get(row, "name");
        if name.is_empty() {
            report.row_error(row_no, "model name is empty");
            continue;
        }
        if !seen.insert(name.to_lowercase()) {
            report.row_error(row_no, format!("duplicate costing model: {}", name));
        }

        for key in ["initial_team_size", "followup_team_size"] {
            match opt_i32(row, key) {
                Some(size) if size <= 0 => {
                    report.row_error(row_no, format!("{} <= 0: {}", key, size))
                }
                Some(_) => {}
                None => report.row_error(row_no, format!("{} is not an integer", key)),
            }
        }
        for key in ["initial_cost_per_day", "followup_cost_per_day"] {
            match opt_f64(row, key) {
                Some(rate) if rate <= 0.0 => {
                    report.row_error(row_no, format!("{} <= 0: {}", key, rate))
                }
                Some(_) => {}
                None => report.row_error(row_no, format!("{} is not a number", key)),
            }
        }
        for key in ["vehicle_cost_per_day", "fuel_cost_per_hour"] {
            match opt_f64(row, key) {
                Some(value) if value < 0.0 => {
                    report.row_error(row_no, format!("{} < 0: {}", key, value))
                }
                Some(_) => {}
                None => report.row_error(row_no, format!("{} is not a number", key)),
            }
        }
    }

    report
}

pub fn read_costing(table: &RawTable) -> Vec<CostingModel> {
    let item_columns: Vec<&String> = table
        .headers
        .iter()
        .filter(|h| h.starts_with("item:"))
        .collect();

    table
        .rows
        .iter()
        .filter_map(|row| {
            let name = get(row, "name");
            if name.is_empty() {
                return None;
            }
            let daily_cost_items = item_columns
                .iter()
                .filter_map(|col| {
                    let daily_cost = opt_f64(row, col.as_str())?;
                    Some(DailyCostItem {
                        name: col.trim_start_matches("item:").to_string(),
                        daily_cost,
                    })
                })
                .collect();
            Some(CostingModel {
                name,
                initial_team_size: opt_i32(row, "initial_team_size")?.max(1) as u32,
                initial_cost_per_day: opt_f64(row, "initial_cost_per_day")?,
                followup_team_size: opt_i32(row, "followup_team_size")?.max(1) as u32,
                followup_cost_per_day: opt_f64(row, "followup_cost_per_day")?,
                vehicle_cost_per_day: opt_f64(row, "vehicle_cost_per_day")?,
                fuel_cost_per_hour: opt_f64(row, "fuel_cost_per_hour")?,
                maintenance_level: opt_i32(row, "maintenance_level").unwrap_or(0).max(0) as u32,
                daily_cost_items,
            })
        })
        .collect()
}

// ==========================================
// Prioritization setup
// ==========================================

/// Validates the per-run category selection against the model limits.
pub fn validate_categories(categories: &[Category]) -> ValidationReport {
    let mut report = ValidationReport::new("categories");

    if categories.len() > MAX_CATEGORIES_PER_RUN {
        report.error(format!(
            "too many categories: {} (max {})",
            categories.len(),
            MAX_CATEGORIES_PER_RUN
        ));
    }

    let mut seen = HashSet::new();
    for category in categories {
        if !seen.insert(category.name.clone()) {
            report.error(format!("duplicate category: {}", category.name));
        }
        if !(0.0..=1.0).contains(&category.weight) {
            report.error(format!(
                "category {} weight outside [0, 1]: {}",
                category.name, category.weight
            ));
        }
        if category.has_overlapping_bands() {
            report.error(format!("category {} has overlapping bands", category.name));
        }
    }

    report
}

/// Validates the priorities CSV: one row per compartment with a value
/// column for each selected category.
pub fn validate_priorities(
    table: &RawTable,
    categories: &[Category],
    known_compt_ids: &[String],
) -> ValidationReport {
    let mut report = ValidationReport::new("priorities");
    check_required_headers(&mut report, &table.headers, &["compt_id"]);
    if !report.is_valid() {
        return report;
    }

    let lowered: Vec<String> = table.headers.iter().map(|h| h.to_lowercase()).collect();
    for category in categories {
        if !lowered.contains(&category.name) {
            report.error(format!("missing category column: {}", category.name));
        }
    }
    if !report.is_valid() {
        return report;
    }

    let known: HashSet<&str> = known_compt_ids.iter().map(|s| s.as_str()).collect();
    let mut seen = HashSet::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let compt_id = get(row, "compt_id");
        if compt_id.is_empty() {
            report.row_error(row_no, "compt_id is empty");
            continue;
        }
        if !seen.insert(compt_id.clone()) {
            report.row_error(row_no, format!("duplicate compt_id: {}", compt_id));
        }
        if !known.is_empty() && !known.contains(compt_id.as_str()) {
            report.row_warning(
                row_no,
                format!("compt_id {} not referenced by gis_mapping", compt_id),
            );
        }
    }

    report
}

pub fn read_priorities(table: &RawTable) -> Vec<CompartmentPriorityRow> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let compt_id = get(row, "compt_id");
            if compt_id.is_empty() {
                return None;
            }
            let values = row
                .iter()
                .filter(|(key, _)| key.to_lowercase() != "compt_id")
                .map(|(key, value)| (key.to_lowercase(), value.clone()))
                .collect();
            Some(CompartmentPriorityRow { compt_id, values })
        })
        .collect()
}

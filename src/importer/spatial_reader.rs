// ==========================================
// MUCP Planner - spatial table readers
// ==========================================
// Attribute tables exported from the project shapefiles: gis_mapping,
// miu, nbal, compartment. Two-mode contract: `validate` returns a
// ValidationReport and never raises; `read` coerces to typed rows,
// dropping rows that cannot be typed (validate mode has already
// reported them).
// ==========================================

use crate::domain::compartment::{CompartmentUnit, GisMappingRow, MiuUnit, NbalUnit};
use crate::domain::types::Terrain;
use crate::importer::file_parser::RawTable;
use crate::importer::report::{check_required_headers, ValidationReport};
use std::collections::HashSet;

pub const GIS_MAPPING_HEADERS: [&str; 4] = ["nbal_id", "miu_id", "compt_id", "area"];
pub const MIU_HEADERS: [&str; 3] = ["miu_id", "area", "riparian_c"];
pub const NBAL_HEADERS: [&str; 3] = ["nbal_id", "area", "stage"];
pub const COMPARTMENT_HEADERS: [&str; 7] = [
    "compt_id", "area_ha", "slope", "walk_time", "drive_time", "costing", "grow_con",
];

fn get(row: &std::collections::HashMap<String, String>, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

// ==========================================
// gis_mapping - compartment membership table
// ==========================================

pub fn validate_gis_mapping(table: &RawTable) -> ValidationReport {
    let mut report = ValidationReport::new("gis_mapping");
    check_required_headers(&mut report, &table.headers, &GIS_MAPPING_HEADERS);
    if !report.is_valid() {
        return report;
    }

    if table.is_empty() {
        report.error("table has no data rows");
        return report;
    }

    let mut seen_compt = HashSet::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        for key in ["nbal_id", "miu_id", "compt_id"] {
            if get(row, key).is_empty() {
                report.row_error(row_no, format!("{} is empty", key));
            }
        }

        let compt_id = get(row, "compt_id");
        if !compt_id.is_empty() && !seen_compt.insert(compt_id.clone()) {
            report.row_error(row_no, format!("duplicate compt_id: {}", compt_id));
        }

        match parse_f64(&get(row, "area")) {
            Some(area) if area <= 0.0 => {
                report.row_warning(row_no, format!("area <= 0: {}", area))
            }
            Some(_) => {}
            None => report.row_error(row_no, "area is not a number"),
        }
    }

    report
}

pub fn read_gis_mapping(table: &RawTable) -> Vec<GisMappingRow> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let nbal_id = get(row, "nbal_id");
            let miu_id = get(row, "miu_id");
            let compt_id = get(row, "compt_id");
            let area = parse_f64(&get(row, "area"))?;
            if nbal_id.is_empty() || miu_id.is_empty() || compt_id.is_empty() {
                return None;
            }
            Some(GisMappingRow {
                nbal_id,
                miu_id,
                compt_id,
                area,
            })
        })
        .collect()
}

// ==========================================
// miu - management intervention units
// ==========================================
// `known_miu_ids` comes from the gis_mapping table: every MIU here
// must be referenced there and vice versa.

pub fn validate_miu(table: &RawTable, known_miu_ids: &[String]) -> ValidationReport {
    let mut report = ValidationReport::new("miu");
    check_required_headers(&mut report, &table.headers, &MIU_HEADERS);
    if !report.is_valid() {
        return report;
    }

    let known: HashSet<&str> = known_miu_ids.iter().map(|s| s.as_str()).collect();
    let mut present: HashSet<String> = HashSet::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let miu_id = get(row, "miu_id");
        if miu_id.is_empty() {
            report.row_error(row_no, "miu_id is empty");
            continue;
        }
        if !present.insert(miu_id.clone()) {
            report.row_error(row_no, format!("duplicate miu_id: {}", miu_id));
        }
        if !known.is_empty() && !known.contains(miu_id.as_str()) {
            report.row_warning(
                row_no,
                format!("miu_id {} not referenced by gis_mapping", miu_id),
            );
        }

        if parse_f64(&get(row, "area")).is_none() {
            report.row_error(row_no, "area is not a number");
        }
        match parse_f64(&get(row, "riparian_c")) {
            Some(frac) if !(0.0..=1.0).contains(&frac) => {
                report.row_error(row_no, format!("riparian_c outside [0, 1]: {}", frac))
            }
            Some(_) => {}
            None => report.row_error(row_no, "riparian_c is not a number"),
        }
    }

    for id in &known {
        if !present.contains(*id) {
            report.error(format!("gis_mapping references unknown miu_id: {}", id));
        }
    }

    report
}

pub fn read_miu(table: &RawTable) -> Vec<MiuUnit> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let miu_id = get(row, "miu_id");
            if miu_id.is_empty() {
                return None;
            }
            Some(MiuUnit {
                miu_id,
                area: parse_f64(&get(row, "area"))?,
                riparian_fraction: parse_f64(&get(row, "riparian_c"))?.clamp(0.0, 1.0),
            })
        })
        .collect()
}

// ==========================================
// nbal - broader planning areas
// ==========================================

pub fn validate_nbal(table: &RawTable, known_nbal_ids: &[String]) -> ValidationReport {
    let mut report = ValidationReport::new("nbal");
    check_required_headers(&mut report, &table.headers, &NBAL_HEADERS);
    if !report.is_valid() {
        return report;
    }

    let known: HashSet<&str> = known_nbal_ids.iter().map(|s| s.as_str()).collect();
    let mut present: HashSet<String> = HashSet::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let nbal_id = get(row, "nbal_id");
        if nbal_id.is_empty() {
            report.row_error(row_no, "nbal_id is empty");
            continue;
        }
        if !present.insert(nbal_id.clone()) {
            report.row_error(row_no, format!("duplicate nbal_id: {}", nbal_id));
        }
        if parse_f64(&get(row, "area")).is_none() {
            report.row_error(row_no, "area is not a number");
        }
        if get(row, "stage").is_empty() {
            report.row_warning(row_no, "stage is empty");
        }
    }

    for id in &known {
        if !present.contains(*id) {
            report.error(format!("gis_mapping references unknown nbal_id: {}", id));
        }
    }

    report
}

pub fn read_nbal(table: &RawTable) -> Vec<NbalUnit> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let nbal_id = get(row, "nbal_id");
            if nbal_id.is_empty() {
                return None;
            }
            let opt = |key: &str| {
                let v = get(row, key);
                if v.is_empty() {
                    None
                } else {
                    Some(v)
                }
            };
            Some(NbalUnit {
                nbal_id,
                area: parse_f64(&get(row, "area"))?,
                stage: get(row, "stage"),
                contract_id: opt("contractid"),
                first_date: opt("first_date"),
                last_date: opt("last_date"),
            })
        })
        .collect()
}

// ==========================================
// compartment - costed spatial units
// ==========================================

pub fn validate_compartment(table: &RawTable, known_compt_ids: &[String]) -> ValidationReport {
    let mut report = ValidationReport::new("compartment");
    check_required_headers(&mut report, &table.headers, &COMPARTMENT_HEADERS);
    if !report.is_valid() {
        return report;
    }

    let known: HashSet<&str> = known_compt_ids.iter().map(|s| s.as_str()).collect();
    let mut present: HashSet<String> = HashSet::new();

    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let compt_id = get(row, "compt_id");
        if compt_id.is_empty() {
            report.row_error(row_no, "compt_id is empty");
            continue;
        }
        if !present.insert(compt_id.clone()) {
            report.row_error(row_no, format!("duplicate compt_id: {}", compt_id));
        }

        match parse_f64(&get(row, "area_ha")) {
            Some(area) if area <= 0.0 => {
                report.row_error(row_no, format!("area_ha <= 0: {}", area))
            }
            Some(_) => {}
            None => report.row_error(row_no, "area_ha is not a number"),
        }
        for key in ["slope", "walk_time", "drive_time"] {
            if parse_f64(&get(row, key)).is_none() {
                report.row_error(row_no, format!("{} is not a number", key));
            }
        }
        if get(row, "costing").is_empty() {
            report.row_error(row_no, "costing tag is empty");
        }
        if get(row, "grow_con").is_empty() {
            report.row_warning(row_no, "grow_con is empty");
        }

        let terrain = get(row, "terrain");
        if !terrain.is_empty() && terrain.parse::<Terrain>().is_err() {
            report.row_error(row_no, format!("unknown terrain: {}", terrain));
        }
    }

    for id in &known {
        if !present.contains(*id) {
            report.error(format!("gis_mapping references unknown compt_id: {}", id));
        }
    }

    report
}

pub fn read_compartment(table: &RawTable) -> Vec<CompartmentUnit> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let compt_id = get(row, "compt_id");
            if compt_id.is_empty() {
                return None;
            }
            let terrain_raw = get(row, "terrain");
            let terrain = if terrain_raw.is_empty() {
                None
            } else {
                terrain_raw.parse::<Terrain>().ok()
            };
            Some(CompartmentUnit {
                compt_id,
                area_ha: parse_f64(&get(row, "area_ha"))?,
                slope: parse_f64(&get(row, "slope"))?,
                walk_time: parse_f64(&get(row, "walk_time"))?,
                drive_time: parse_f64(&get(row, "drive_time"))?,
                costing: get(row, "costing"),
                grow_con: get(row, "grow_con"),
                terrain,
            })
        })
        .collect()
}

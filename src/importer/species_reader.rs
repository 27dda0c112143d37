// ==========================================
// MUCP Planner - linked species readers
// ==========================================
// The linked-species workbooks tie spatial units (MIU or NBAL) to the
// invader species observed there, with a density class code and stand
// age. Dominant-species selection happens downstream in the engine.
// ==========================================

use crate::domain::species::{density_percent_for_class, LinkedSpeciesRow};
use crate::importer::file_parser::RawTable;
use crate::importer::report::{check_required_headers, ValidationReport};
use std::collections::HashSet;

pub const MIU_SPECIES_HEADERS: [&str; 4] = ["miu_id", "species", "idenscode", "age"];
pub const NBAL_SPECIES_HEADERS: [&str; 4] = ["nbal_id", "species", "idenscode", "age"];

fn get(row: &std::collections::HashMap<String, String>, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

/// Which spatial layer the species sheet links against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesLinkKind {
    Miu,
    Nbal,
}

impl SpeciesLinkKind {
    pub fn id_column(&self) -> &'static str {
        match self {
            SpeciesLinkKind::Miu => "miu_id",
            SpeciesLinkKind::Nbal => "nbal_id",
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            SpeciesLinkKind::Miu => "miu_species",
            SpeciesLinkKind::Nbal => "nbal_species",
        }
    }

    fn required_headers(&self) -> &'static [&'static str] {
        match self {
            SpeciesLinkKind::Miu => &MIU_SPECIES_HEADERS,
            SpeciesLinkKind::Nbal => &NBAL_SPECIES_HEADERS,
        }
    }
}

/// Validates a linked-species sheet. `known_unit_ids` are the ids of
/// the corresponding spatial layer from gis_mapping; species names are
/// checked against the reference list.
pub fn validate_linked_species(
    table: &RawTable,
    kind: SpeciesLinkKind,
    known_unit_ids: &[String],
    known_species: &[String],
) -> ValidationReport {
    let mut report = ValidationReport::new(kind.table_name());
    check_required_headers(&mut report, &table.headers, kind.required_headers());
    if !report.is_valid() {
        return report;
    }

    let units: HashSet<&str> = known_unit_ids.iter().map(|s| s.as_str()).collect();
    let species: HashSet<String> = known_species.iter().map(|s| s.to_lowercase()).collect();
    let id_col = kind.id_column();

    for (idx, row) in table.rows.iter().enumerate() {
        let row_no = idx + 1;
        let unit_id = get(row, id_col);
        if unit_id.is_empty() {
            report.row_error(row_no, format!("{} is empty", id_col));
        } else if !units.is_empty() && !units.contains(unit_id.as_str()) {
            report.row_warning(
                row_no,
                format!("{} {} not referenced by gis_mapping", id_col, unit_id),
            );
        }

        let name = get(row, "species");
        if name.is_empty() {
            report.row_error(row_no, "species is empty");
        } else if !species.is_empty() && !species.contains(&name.to_lowercase()) {
            report.row_error(row_no, format!("unknown species: {}", name));
        }

        match get(row, "idenscode").trim().parse::<i32>() {
            Ok(code) if !(0..=6).contains(&code) => {
                report.row_error(row_no, format!("idenscode outside 0..=6: {}", code))
            }
            Ok(_) => {}
            Err(_) => report.row_error(row_no, "idenscode is not an integer"),
        }

        match get(row, "age").trim().parse::<f64>() {
            Ok(age) if age < 0.0 => report.row_error(row_no, format!("age < 0: {}", age)),
            Ok(_) => {}
            Err(_) => report.row_error(row_no, "age is not a number"),
        }
    }

    report
}

/// Coerces a linked-species sheet to typed rows, dropping rows that
/// validate mode has already rejected.
pub fn read_linked_species(table: &RawTable, kind: SpeciesLinkKind) -> Vec<LinkedSpeciesRow> {
    let id_col = kind.id_column();
    table
        .rows
        .iter()
        .filter_map(|row| {
            let unit_id = get(row, id_col);
            let species = get(row, "species");
            if unit_id.is_empty() || species.is_empty() {
                return None;
            }
            let idenscode = get(row, "idenscode").trim().parse::<i32>().ok()?;
            if !(0..=6).contains(&idenscode) {
                return None;
            }
            let age = get(row, "age").trim().parse::<f64>().ok()?;
            if age < 0.0 {
                return None;
            }
            Some(LinkedSpeciesRow {
                unit_id,
                species,
                idenscode,
                age,
            })
        })
        .collect()
}

/// Density contributed by a single linked row, as a percentage of full
/// canopy cover. Read rows always carry an in-range code.
pub fn row_density_percent(row: &LinkedSpeciesRow) -> f64 {
    density_percent_for_class(row.idenscode).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table(headers: &[&str], rows: Vec<Vec<&str>>) -> RawTable {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut map = HashMap::new();
                for (i, cell) in cells.into_iter().enumerate() {
                    map.insert(headers[i].clone(), cell.to_string());
                }
                map
            })
            .collect();
        RawTable { headers, rows }
    }

    #[test]
    fn test_unknown_species_is_error() {
        let t = table(
            &["miu_id", "species", "idenscode", "age"],
            vec![vec!["M1", "Acacia mearnsii", "3", "4.0"]],
        );
        let report = validate_linked_species(
            &t,
            SpeciesLinkKind::Miu,
            &["M1".to_string()],
            &["Pinus patula".to_string()],
        );
        assert!(report.errors.iter().any(|e| e.contains("unknown species")));
    }

    #[test]
    fn test_species_match_is_case_insensitive() {
        let t = table(
            &["miu_id", "species", "idenscode", "age"],
            vec![vec!["M1", "acacia MEARNSII", "3", "4.0"]],
        );
        let report = validate_linked_species(
            &t,
            SpeciesLinkKind::Miu,
            &["M1".to_string()],
            &["Acacia mearnsii".to_string()],
        );
        assert!(report.is_valid());
    }

    #[test]
    fn test_idenscode_out_of_range() {
        let t = table(
            &["nbal_id", "species", "idenscode", "age"],
            vec![vec!["N1", "Acacia mearnsii", "7", "4.0"]],
        );
        let report = validate_linked_species(
            &t,
            SpeciesLinkKind::Nbal,
            &["N1".to_string()],
            &["Acacia mearnsii".to_string()],
        );
        assert!(report.errors.iter().any(|e| e.contains("idenscode")));
    }

    #[test]
    fn test_read_drops_bad_rows() {
        let t = table(
            &["miu_id", "species", "idenscode", "age"],
            vec![
                vec!["M1", "Acacia mearnsii", "3", "4.0"],
                vec!["M1", "Acacia mearnsii", "9", "4.0"],
                vec!["M1", "", "2", "4.0"],
            ],
        );
        let rows = read_linked_species(&t, SpeciesLinkKind::Miu);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].idenscode, 3);
    }

    #[test]
    fn test_row_density_percent() {
        let row = LinkedSpeciesRow {
            unit_id: "M1".to_string(),
            species: "Acacia mearnsii".to_string(),
            idenscode: 4,
            age: 4.0,
        };
        assert!((row_density_percent(&row) - 50.0).abs() < f64::EPSILON);
    }
}

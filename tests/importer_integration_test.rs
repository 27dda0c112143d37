// ==========================================
// Importer integration tests
// ==========================================
// CSV fixtures on disk through the universal parser, then the two-mode
// readers: validate reports problems without raising, read coerces to
// typed rows.

use mucp_planner::importer::spatial_reader::{
    read_compartment, read_gis_mapping, read_miu, validate_compartment, validate_gis_mapping,
    validate_miu, validate_nbal,
};
use mucp_planner::importer::species_reader::{
    read_linked_species, validate_linked_species, SpeciesLinkKind,
};
use mucp_planner::importer::support_reader::{
    merge_by_name, read_costing, read_name_list, read_norms, read_species, validate_norms,
    validate_species,
};
use mucp_planner::importer::{ImportError, RawTable, UniversalFileParser};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{}", content).unwrap();
    path
}

fn parse_csv(dir: &Path, name: &str, content: &str) -> RawTable {
    let path = write_csv(dir, name, content);
    UniversalFileParser.parse(&path).unwrap()
}

#[test]
fn test_gis_mapping_csv_round_trip() {
    let dir = TempDir::new().unwrap();
    let table = parse_csv(
        dir.path(),
        "gis_mapping.csv",
        "nbal_id,miu_id,compt_id,area\n\
         N1,M1,C1,10.0\n\
         N1,M2,C2,5.5\n",
    );

    let report = validate_gis_mapping(&table);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);

    let rows = read_gis_mapping(&table);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].compt_id, "C2");
    assert_eq!(rows[1].area, 5.5);
}

#[test]
fn test_spatial_cross_checks_flow_from_gis_mapping() {
    let dir = TempDir::new().unwrap();
    let mapping = parse_csv(
        dir.path(),
        "gis_mapping.csv",
        "nbal_id,miu_id,compt_id,area\nN1,M1,C1,10.0\nN2,M2,C2,5.0\n",
    );
    let rows = read_gis_mapping(&mapping);
    let miu_ids: Vec<String> = rows.iter().map(|r| r.miu_id.clone()).collect();
    let nbal_ids: Vec<String> = rows.iter().map(|r| r.nbal_id.clone()).collect();

    // M2 is referenced but missing from the miu table
    let miu = parse_csv(
        dir.path(),
        "miu.csv",
        "miu_id,area,riparian_c\nM1,10.0,0.2\n",
    );
    let miu_report = validate_miu(&miu, &miu_ids);
    assert!(!miu_report.is_valid());
    assert!(miu_report.errors.iter().any(|e| e.contains("M2")));

    // both NBALs present, clean
    let nbal = parse_csv(
        dir.path(),
        "nbal.csv",
        "nbal_id,area,stage\nN1,10.0,initial\nN2,5.0,follow-up\n",
    );
    assert!(validate_nbal(&nbal, &nbal_ids).is_valid());
}

#[test]
fn test_compartment_with_terrain_override() {
    let dir = TempDir::new().unwrap();
    let table = parse_csv(
        dir.path(),
        "compartment.csv",
        "compt_id,area_ha,slope,walk_time,drive_time,costing,grow_con,terrain\n\
         C1,10.0,5,0.5,1.0,1,natural,riparian\n\
         C2,5.0,12,0.2,0.5,1,natural,\n",
    );

    let report = validate_compartment(&table, &["C1".to_string(), "C2".to_string()]);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);

    let units = read_compartment(&table);
    assert_eq!(units.len(), 2);
    assert!(units[0].terrain.is_some());
    assert!(units[1].terrain.is_none());
}

#[test]
fn test_linked_species_sheet_validation_and_read() {
    let dir = TempDir::new().unwrap();
    let table = parse_csv(
        dir.path(),
        "miu_species.csv",
        "miu_id,species,idenscode,age\n\
         M1,Acacia mearnsii,4,8\n\
         M1,Pinus patula,9,3\n",
    );

    let report = validate_linked_species(
        &table,
        SpeciesLinkKind::Miu,
        &["M1".to_string()],
        &["Acacia mearnsii".to_string(), "Pinus patula".to_string()],
    );
    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|e| e.contains("idenscode")));

    // read mode drops the out-of-range row and keeps the good one
    let rows = read_linked_species(&table, SpeciesLinkKind::Miu);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].species, "Acacia mearnsii");
    assert_eq!(rows[0].age, 8.0);
}

#[test]
fn test_species_reference_validation_against_name_lists() {
    let dir = TempDir::new().unwrap();
    let forms = parse_csv(
        dir.path(),
        "growth_forms.csv",
        "growth_form\nSprouting Tree\nCactus\n",
    );
    let methods = parse_csv(dir.path(), "treatment_methods.csv", "method\ncut stump\n");

    let growth_forms = read_name_list(&forms);
    assert_eq!(growth_forms, vec!["sprouting tree", "cactus"]);
    let treatment_methods = read_name_list(&methods);

    let species = parse_csv(
        dir.path(),
        "species.csv",
        "species,growth_form,treatment_method,initial_reduction,follow_up_reduction,treatment_frequency\n\
         Acacia mearnsii,sprouting tree,cut stump,75,90,12\n\
         Opuntia ficus-indica,cactus,stem injection,60,80,24\n",
    );
    let report = validate_species(&species, &growth_forms, &treatment_methods);
    // stem injection is not in the methods list
    assert!(!report.is_valid());
    assert!(report
        .errors
        .iter()
        .any(|e| e.contains("unknown treatment method")));

    let records = read_species(&species);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].initial_reduction, Some(75.0));
    assert_eq!(records[0].treatment_frequency, Some(12));
}

#[test]
fn test_norms_csv_to_norm_set() {
    let dir = TempDir::new().unwrap();
    let table = parse_csv(
        dir.path(),
        "norms.csv",
        "growth_form,treatment_method,terrain,size_class,process,density,ppd\n\
         sprouting tree,cut stump,landscape,all,initial,100,5.0\n\
         sprouting tree,cut stump,landscape,all,follow-up,100,10.0\n",
    );

    let report = validate_norms(&table, &["sprouting tree".to_string()]);
    assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);

    let set = read_norms(&table, "apo default");
    assert_eq!(set.name, "apo default");
    assert_eq!(set.norms.len(), 2);
    assert_eq!(set.norms[0].ppd, 5.0);
}

#[test]
fn test_user_tier_overrides_default_costing() {
    let dir = TempDir::new().unwrap();
    let header = "name,initial_team_size,initial_cost_per_day,followup_team_size,\
                  followup_cost_per_day,vehicle_cost_per_day,fuel_cost_per_hour,maintenance_level\n";

    let defaults = parse_csv(
        dir.path(),
        "default_costing.csv",
        &format!("{}Standard,10,2000,5,1000,0,0,1\nHelicopter,4,9000,4,9000,0,0,2\n", header),
    );
    let user = parse_csv(
        dir.path(),
        "costing.csv",
        &format!("{}standard,12,2400,6,1100,100,20,1\nDiver Team,6,3000,6,3000,0,0,1\n", header),
    );

    let merged = merge_by_name(read_costing(&defaults), read_costing(&user), |m| {
        m.name.clone()
    });
    assert_eq!(merged.len(), 3);
    // the user row replaced the default in place
    assert_eq!(merged[0].name, "standard");
    assert_eq!(merged[0].initial_team_size, 12);
    assert_eq!(merged[1].name, "Helicopter");
    // the addition is appended
    assert_eq!(merged[2].name, "Diver Team");
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "mapping.shp", "not a table");
    let result = UniversalFileParser.parse(&path);
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file_is_reported() {
    let result = UniversalFileParser.parse("does_not_exist.csv");
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[test]
fn test_missing_header_blocks_before_row_checks() {
    let dir = TempDir::new().unwrap();
    let table = parse_csv(
        dir.path(),
        "gis_mapping.csv",
        "nbal_id,miu_id,compt_id\nN1,M1,C1\n",
    );
    let report = validate_gis_mapping(&table);
    assert!(!report.is_valid());
    // only the header problem is reported, row checks never ran
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("area"));
}

// ==========================================
// MUCP Planner - simulation API
// ==========================================
// The outer surface of a planning run: validate every input table,
// refuse to simulate while errors remain, run the scenarios, then
// either persist the results wholesale or return a transient summary.
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::PlanningConfigReader;
use crate::domain::planning::PlanningRun;
use crate::domain::prioritization::Category;
use crate::domain::simulation::{SimulationOutput, SimulationSummary};
use crate::engine::{NormalizedInputs, SimulationOrchestrator};
use crate::importer::file_parser::RawTable;
use crate::importer::report::ValidationReport;
use crate::importer::spatial_reader;
use crate::importer::species_reader::{self, SpeciesLinkKind};
use crate::importer::support_reader;
use crate::repository::{PlanningRepository, ResultsRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

// ==========================================
// ProjectTables - raw input tables for one run
// ==========================================
// The optional default_* tables are the shipped reference tier; user
// tables override them row-by-row (by name) at normalization time.
#[derive(Debug, Clone)]
pub struct ProjectTables {
    pub gis_mapping: RawTable,
    pub miu: RawTable,
    pub nbal: RawTable,
    pub compartment: RawTable,
    pub miu_species: RawTable,
    pub nbal_species: RawTable,
    pub growth_forms: RawTable,
    pub treatment_methods: RawTable,
    pub default_species: Option<RawTable>,
    pub species: RawTable,
    pub default_norms: Option<RawTable>,
    pub norms: RawTable,
    pub default_costing: Option<RawTable>,
    pub costing: RawTable,
    pub priorities: RawTable,
}

// ==========================================
// SimulationOutcome
// ==========================================
#[derive(Debug, Clone)]
pub enum SimulationOutcome {
    /// Results were persisted; the full output is returned as well.
    Saved(SimulationOutput),
    /// save_results was off: nothing persisted, totals only.
    Transient(SimulationSummary),
}

// ==========================================
// SimulationApi
// ==========================================
pub struct SimulationApi<C>
where
    C: PlanningConfigReader,
{
    config: Arc<C>,
    planning_repo: Arc<PlanningRepository>,
    results_repo: Arc<ResultsRepository>,
    orchestrator: SimulationOrchestrator,
}

impl<C> SimulationApi<C>
where
    C: PlanningConfigReader,
{
    pub fn new(
        config: Arc<C>,
        planning_repo: Arc<PlanningRepository>,
        results_repo: Arc<ResultsRepository>,
    ) -> Self {
        Self {
            config,
            planning_repo,
            results_repo,
            orchestrator: SimulationOrchestrator::new(),
        }
    }

    /// Range checks over the run's scalar parameters.
    pub fn validate_run(run: &PlanningRun) -> ValidationReport {
        let mut report = ValidationReport::new("planning");

        if !(1.0..=24.0).contains(&run.working_day_hours) {
            report.error(format!(
                "working_day_hours outside [1, 24]: {}",
                run.working_day_hours
            ));
        }
        if !(1..=365).contains(&run.working_year_days) {
            report.error(format!(
                "working_year_days outside [1, 365]: {}",
                run.working_year_days
            ));
        }
        if !(1..=50).contains(&run.years_to_run) {
            report.error(format!("years_to_run outside [1, 50]: {}", run.years_to_run));
        }
        for (index, plan) in run.plans.iter().enumerate() {
            if plan.amount < 0.0 {
                report.error(format!("plan {} budget < 0: {}", index + 1, plan.amount));
            }
            if !(0.0..=100.0).contains(&plan.escalation_percent) {
                report.error(format!(
                    "plan {} escalation outside [0, 100]: {}",
                    index + 1,
                    plan.escalation_percent
                ));
            }
        }
        if run.project_name.trim().is_empty() {
            report.error("project_name is empty");
        }

        report
    }

    /// Runs every reader in validate mode. Cross-checks use the id
    /// lists from gis_mapping; reference checks use the merged
    /// reference tier.
    pub fn validate_inputs(
        &self,
        run: &PlanningRun,
        tables: &ProjectTables,
        categories: &[Category],
    ) -> Vec<ValidationReport> {
        let miu_ids = tables.gis_mapping.column("miu_id");
        let nbal_ids = tables.gis_mapping.column("nbal_id");
        let compt_ids = tables.gis_mapping.column("compt_id");

        let growth_forms = support_reader::read_name_list(&tables.growth_forms);
        let treatment_methods = support_reader::read_name_list(&tables.treatment_methods);
        let species_names: Vec<String> = self
            .merged_species(tables)
            .iter()
            .map(|s| s.species_name.clone())
            .collect();

        vec![
            Self::validate_run(run),
            spatial_reader::validate_gis_mapping(&tables.gis_mapping),
            spatial_reader::validate_miu(&tables.miu, &miu_ids),
            spatial_reader::validate_nbal(&tables.nbal, &nbal_ids),
            spatial_reader::validate_compartment(&tables.compartment, &compt_ids),
            species_reader::validate_linked_species(
                &tables.miu_species,
                SpeciesLinkKind::Miu,
                &miu_ids,
                &species_names,
            ),
            species_reader::validate_linked_species(
                &tables.nbal_species,
                SpeciesLinkKind::Nbal,
                &nbal_ids,
                &species_names,
            ),
            support_reader::validate_species(&tables.species, &growth_forms, &treatment_methods),
            support_reader::validate_norms(&tables.norms, &growth_forms),
            support_reader::validate_costing(&tables.costing),
            support_reader::validate_categories(categories),
            support_reader::validate_priorities(&tables.priorities, categories, &compt_ids),
        ]
    }

    fn merged_species(&self, tables: &ProjectTables) -> Vec<crate::domain::species::SpeciesRecord> {
        let user = support_reader::read_species(&tables.species);
        match &tables.default_species {
            Some(defaults) => support_reader::merge_by_name(
                support_reader::read_species(defaults),
                user,
                |s| s.species_name.clone(),
            ),
            None => user,
        }
    }

    /// Reads every table in coerce mode and applies the two-tier
    /// reference merge.
    pub fn normalize(
        &self,
        run: &PlanningRun,
        tables: &ProjectTables,
        categories: &[Category],
        costing_mapping: &HashMap<String, String>,
    ) -> NormalizedInputs {
        let species = self.merged_species(tables);

        let user_norms = support_reader::read_norms(&tables.norms, &run.clearing_norm_set);
        let mut norm_set = match &tables.default_norms {
            Some(defaults) => {
                let default_set =
                    support_reader::read_norms(defaults, &run.clearing_norm_set);
                let merged = support_reader::merge_by_name(
                    default_set.norms,
                    user_norms.norms,
                    |n| {
                        format!(
                            "{}|{}|{}|{:?}|{}",
                            n.key.growth_form,
                            n.key.treatment_method,
                            n.key.terrain,
                            n.key.size_class,
                            n.key.process
                        )
                    },
                );
                crate::domain::norms::ClearingNormSet {
                    name: run.clearing_norm_set.clone(),
                    norms: merged,
                }
            }
            None => user_norms,
        };
        norm_set.name = run.clearing_norm_set.clone();

        let user_costing = support_reader::read_costing(&tables.costing);
        let costing_models = match &tables.default_costing {
            Some(defaults) => support_reader::merge_by_name(
                support_reader::read_costing(defaults),
                user_costing,
                |m| m.name.clone(),
            ),
            None => user_costing,
        };

        NormalizedInputs {
            gis_mapping: spatial_reader::read_gis_mapping(&tables.gis_mapping),
            mius: spatial_reader::read_miu(&tables.miu),
            nbals: spatial_reader::read_nbal(&tables.nbal),
            compartments: spatial_reader::read_compartment(&tables.compartment),
            miu_species: species_reader::read_linked_species(
                &tables.miu_species,
                SpeciesLinkKind::Miu,
            ),
            nbal_species: species_reader::read_linked_species(
                &tables.nbal_species,
                SpeciesLinkKind::Nbal,
            ),
            species,
            norm_set,
            costing_models,
            costing_mapping: costing_mapping.clone(),
            categories: categories.to_vec(),
            priority_rows: support_reader::read_priorities(&tables.priorities),
        }
    }

    /// Validates, simulates and persists (or summarizes) one run.
    pub async fn run_simulation(
        &self,
        run: &PlanningRun,
        tables: &ProjectTables,
        categories: &[Category],
        costing_mapping: &HashMap<String, String>,
    ) -> ApiResult<SimulationOutcome> {
        let reports = self.validate_inputs(run, tables, categories);
        let blocked: Vec<String> = reports
            .iter()
            .filter(|r| !r.is_valid())
            .map(|r| r.table.clone())
            .collect();
        if !blocked.is_empty() {
            warn!(tables = ?blocked, "simulation blocked by validation errors");
            return Err(ApiError::SimulationBlocked { tables: blocked });
        }

        let thresholds = self
            .config
            .get_age_thresholds()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let inputs = self.normalize(run, tables, categories, costing_mapping);
        let result = self.orchestrator.run(run, &inputs, thresholds);
        if !result.skipped_units.is_empty() {
            info!(
                skipped = result.skipped_units.len(),
                "some compartments were left out of the run"
            );
        }

        if run.save_results {
            if self.planning_repo.find_by_id(&run.planning_id)?.is_none() {
                self.planning_repo.create(run)?;
            }
            self.results_repo
                .replace_results(&run.planning_id, &result.output)?;
            Ok(SimulationOutcome::Saved(result.output))
        } else {
            Ok(SimulationOutcome::Transient(SimulationSummary::from_output(
                &result.output,
            )))
        }
    }

    /// Saved results for a run, reassembled from the derived tables.
    pub fn load_results(&self, planning_id: &str) -> ApiResult<SimulationOutput> {
        if self.planning_repo.find_by_id(planning_id)?.is_none() {
            return Err(ApiError::NotFound(format!(
                "planning run {} does not exist",
                planning_id
            )));
        }
        Ok(self.results_repo.read_output(planning_id)?)
    }
}

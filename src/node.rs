//! Node bindings. A host script serializes its project, hands it over as
//! JSON, and applies the returned snapshot.

use crate::config::ConsolidateOptions;
use crate::consolidation::memory::MemoryProject;
use crate::consolidation::run::{Decision, RunOutcome, analyze, run_consolidation};
use napi::bindgen_prelude::*;
use napi_derive::napi;
use serde::Serialize;

#[napi(object)]
#[derive(Debug, Clone)]
pub struct JsScanStats {
    pub total_assets: u32,
    pub solids: u32,
    pub nulls: u32,
    pub adjustments: u32,
    pub groups: u32,
    pub duplicates_to_remove: u32,
}

#[derive(Serialize)]
struct ConsolidatedProject<'a> {
    run: &'a crate::consolidation::run::RunReport,
    project: crate::consolidation::memory::ProjectSnapshot,
}

fn to_napi_error(err: impl std::fmt::Display) -> Error {
    Error::from_reason(err.to_string())
}

fn to_count(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(to_napi_error)
}

fn parse_inputs(
    snapshot_json: &str,
    options_json: Option<String>,
) -> Result<(MemoryProject, ConsolidateOptions)> {
    let project = MemoryProject::from_json(snapshot_json)
        .map_err(|err| Error::from_reason(format!("{err:#}")))?;
    let options = match options_json {
        Some(json) => ConsolidateOptions::from_json_str(&json).map_err(to_napi_error)?,
        None => ConsolidateOptions::default(),
    };
    Ok((project, options))
}

#[napi]
pub fn analyze_project(snapshot_json: String, options_json: Option<String>) -> Result<JsScanStats> {
    let (project, options) = parse_inputs(&snapshot_json, options_json)?;
    let (scan, _) = analyze(Some(&project), &options).map_err(to_napi_error)?;

    Ok(JsScanStats {
        total_assets: to_count(scan.total_assets)?,
        solids: to_count(scan.counts.solids)?,
        nulls: to_count(scan.counts.nulls)?,
        adjustments: to_count(scan.counts.adjustments)?,
        groups: to_count(scan.groups.len())?,
        duplicates_to_remove: to_count(scan.duplicates_to_remove)?,
    })
}

#[napi]
pub fn dry_run_report(snapshot_json: String, options_json: Option<String>) -> Result<String> {
    let (project, options) = parse_inputs(&snapshot_json, options_json)?;
    let (_, report) = analyze(Some(&project), &options).map_err(to_napi_error)?;
    Ok(report.to_string())
}

/// Returns `{"run": ..., "project": ...}` with the consolidated snapshot
#[napi]
pub fn consolidate_project(
    snapshot_json: String,
    options_json: Option<String>,
    cleanup_empty_folders: Option<bool>,
) -> Result<String> {
    let (mut project, options) = parse_inputs(&snapshot_json, options_json)?;
    let cleanup_empty_folders = cleanup_empty_folders.unwrap_or(options.cleanup_empty_folders);

    let outcome = run_consolidation(Some(&mut project), &options, |_| Decision::Proceed {
        cleanup_empty_folders,
    })
    .map_err(to_napi_error)?;

    let RunOutcome::Completed(run) = outcome else {
        return Err(Error::from_reason("Consolidation was cancelled"));
    };

    serde_json::to_string(&ConsolidatedProject {
        run: &run,
        project: project.snapshot(),
    })
    .map_err(to_napi_error)
}

//! Analysis, decision and execution of one consolidation run.

use super::consolidator::{
    ConsolidationSummary, consolidate, ensure_target_folder, find_target_folder,
};
use super::host::{Project, UndoGroup};
use super::report::DryRunReport;
use super::scanner::{ScanResult, scan_project};
use super::sweeper::{SweepOutcome, sweep_empty_folders};
use crate::config::ConsolidateOptions;
use crate::error::{ConsolidateError, Result};
use serde::Serialize;
use uuid::Uuid;

/// The user's answer to the dry-run report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Cancel,
    Proceed { cleanup_empty_folders: bool },
}

impl Decision {
    /// Proceed with the cleanup setting from `options`
    pub fn proceed(options: &ConsolidateOptions) -> Self {
        Decision::Proceed {
            cleanup_empty_folders: options.cleanup_empty_folders,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub report: DryRunReport,
    pub summary: ConsolidationSummary,
    pub sweep: Option<SweepOutcome>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Cancelled(DryRunReport),
    Completed(RunReport),
}

impl RunOutcome {
    pub fn report(&self) -> &DryRunReport {
        match self {
            RunOutcome::Cancelled(report) => report,
            RunOutcome::Completed(run) => &run.report,
        }
    }
}

/// Analysis phase. Reads the project, changes nothing.
pub fn analyze<P: Project + ?Sized>(
    project: Option<&P>,
    options: &ConsolidateOptions,
) -> Result<(ScanResult, DryRunReport)> {
    let project = project.ok_or(ConsolidateError::NoActiveProject)?;
    options.validate()?;

    let scan = scan_project(project)?;
    let report = DryRunReport::from_scan(&scan, &options.target_folder_name);
    Ok((scan, report))
}

/// Execution phase, inside a single undo group.
///
/// The undo group is closed whether or not a step fails. A failure leaves the
/// steps before it applied.
pub fn execute<P: Project + ?Sized>(
    project: &mut P,
    scan: &ScanResult,
    options: &ConsolidateOptions,
    cleanup_empty_folders: bool,
) -> Result<(ConsolidationSummary, Option<SweepOutcome>)> {
    options.validate()?;

    let mut project = UndoGroup::begin(project, &options.undo_label);
    let result = execute_steps(&mut *project, scan, options, cleanup_empty_folders);

    if let Err(err) = &result {
        tracing::error!(error = %format!("{err:#}"), "Consolidation aborted");
    }
    result.map_err(ConsolidateError::Host)
}

fn execute_steps<P: Project + ?Sized>(
    project: &mut P,
    scan: &ScanResult,
    options: &ConsolidateOptions,
    cleanup_empty_folders: bool,
) -> anyhow::Result<(ConsolidationSummary, Option<SweepOutcome>)> {
    let (summary, protected) = if scan.groups.is_empty() {
        let existing = find_target_folder(project, &options.target_folder_name)?;
        (ConsolidationSummary::default(), existing)
    } else {
        let target = ensure_target_folder(project, &options.target_folder_name)?;
        (consolidate(project, scan, target)?, Some(target))
    };

    let sweep = if cleanup_empty_folders {
        Some(sweep_empty_folders(project, protected, options.max_sweeps)?)
    } else {
        None
    };

    Ok((summary, sweep))
}

/// Full run: analyze, ask `decide`, then execute if it says so
pub fn run_consolidation<P, F>(
    project: Option<&mut P>,
    options: &ConsolidateOptions,
    decide: F,
) -> Result<RunOutcome>
where
    P: Project + ?Sized,
    F: FnOnce(&DryRunReport) -> Decision,
{
    let project = project.ok_or(ConsolidateError::NoActiveProject)?;

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("consolidate", run_id = %run_id);
    let _entered = span.enter();

    let (scan, report) = analyze(Some(&*project), options)?;

    let cleanup_empty_folders = match decide(&report) {
        Decision::Cancel => {
            tracing::info!("Consolidation cancelled");
            return Ok(RunOutcome::Cancelled(report));
        }
        Decision::Proceed {
            cleanup_empty_folders,
        } => cleanup_empty_folders,
    };

    let (summary, sweep) = execute(project, &scan, options, cleanup_empty_folders)?;

    Ok(RunOutcome::Completed(RunReport {
        run_id,
        report,
        summary,
        sweep,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::memory::{MemoryProject, ROOT_FOLDER, solid};

    #[test]
    fn test_no_active_project() {
        let options = ConsolidateOptions::default();
        let err = run_consolidation::<MemoryProject, _>(None, &options, |_| {
            panic!("no report without a project")
        })
        .unwrap_err();
        assert!(matches!(err, ConsolidateError::NoActiveProject));
        assert!(matches!(
            analyze::<MemoryProject>(None, &options),
            Err(ConsolidateError::NoActiveProject)
        ));
    }

    #[test]
    fn test_cancel_changes_nothing() {
        let mut project = MemoryProject::new();
        project.add_solid(ROOT_FOLDER, "Red 1", solid([1.0, 0.0, 0.0], 10, 10)).unwrap();
        project.add_solid(ROOT_FOLDER, "Red 2", solid([1.0, 0.0, 0.0], 10, 10)).unwrap();
        project.add_folder("Empty").unwrap();
        let before = project.snapshot();

        let outcome = run_consolidation(Some(&mut project), &ConsolidateOptions::default(), |report| {
            assert_eq!(report.duplicates_to_remove, 1);
            Decision::Cancel
        })
        .unwrap();

        assert!(matches!(outcome, RunOutcome::Cancelled(_)));
        assert_eq!(project.snapshot(), before);
        assert!(project.undo_history().is_empty());
    }

    #[test]
    fn test_invalid_options_rejected_before_work() {
        let mut project = MemoryProject::new();
        project.add_folder("Empty").unwrap();
        let options = ConsolidateOptions {
            max_sweeps: Some(0),
            ..ConsolidateOptions::default()
        };

        let err = run_consolidation(Some(&mut project), &options, |_| Decision::proceed(&options))
            .unwrap_err();

        assert!(matches!(err, ConsolidateError::InvalidOptions(_)));
        assert_eq!(project.folder_len(ROOT_FOLDER).unwrap(), 1);
    }

    #[test]
    fn test_no_assets_creates_no_target_folder() {
        let mut project = MemoryProject::new();
        project.add_composition(ROOT_FOLDER, "Main").unwrap();
        project.add_folder("Empty").unwrap();
        let options = ConsolidateOptions::default();

        let (scan, _) = analyze(Some(&project), &options).unwrap();
        let (summary, sweep) = execute(&mut project, &scan, &options, true).unwrap();

        assert_eq!(summary, ConsolidationSummary::default());
        assert_eq!(sweep.unwrap().folders_removed, 1);
        assert_eq!(project.folder_len(ROOT_FOLDER).unwrap(), 1);
        assert_eq!(project.undo_history(), ["Consolidate Solids".to_string()]);
    }

    #[test]
    fn test_cleanup_can_be_declined() {
        let mut project = MemoryProject::new();
        let empty = project.add_folder("Empty").unwrap();
        project.add_solid(ROOT_FOLDER, "Red", solid([1.0, 0.0, 0.0], 10, 10)).unwrap();

        let outcome = run_consolidation(Some(&mut project), &ConsolidateOptions::default(), |_| {
            Decision::Proceed {
                cleanup_empty_folders: false,
            }
        })
        .unwrap();

        let RunOutcome::Completed(run) = outcome else {
            panic!("run should complete");
        };
        assert!(run.sweep.is_none());
        assert!(project.contains(empty));
    }
}

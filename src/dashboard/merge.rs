use std::collections::BTreeSet;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Resource;

use super::card::card_html;
use super::document::{DashboardDocument, PASSWORDS_TABLE, PDF_FILES_TABLE};
use super::table::TableValue;
use super::DuplicateDayPolicy;

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    pub duplicate_days: DuplicateDayPolicy,
    pub update_series_title: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: Vec<u32>,
    pub skipped: Vec<u32>,
    pub missing_tables: Vec<&'static str>,
}

/// Append `resources` to the document's cards and keyed tables.
///
/// Under [`DuplicateDayPolicy::Append`] nothing is checked, so merging the
/// same batch twice produces duplicate cards and table entries.
pub fn merge_resources(
    doc: &mut DashboardDocument,
    resources: &[Resource],
    options: &MergeOptions,
) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    tracing::debug!("Dashboard already holds {} cards", doc.card_days().len());
    let mut seen = doc.existing_days();

    let accepted: Vec<&Resource> = match options.duplicate_days {
        DuplicateDayPolicy::Append => resources.iter().collect(),
        DuplicateDayPolicy::Skip => {
            let mut accepted = Vec::new();
            for resource in resources {
                if seen.insert(resource.day) {
                    accepted.push(resource);
                } else {
                    tracing::warn!("Skipping day {}: already on the dashboard", resource.day);
                    report.skipped.push(resource.day);
                }
            }
            accepted
        }
        DuplicateDayPolicy::Reject => {
            if let Some(day) = first_duplicate(&seen, resources) {
                return Err(AppError::DuplicateDay(day));
            }
            resources.iter().collect()
        }
    };

    for resource in &accepted {
        doc.push_card(resource.day, card_html(resource));
        report.added.push(resource.day);
    }

    match doc.passwords.as_mut() {
        Some(table) => {
            for resource in &accepted {
                table.push(resource.day_key(), TableValue::new(&resource.password));
            }
        }
        None => {
            tracing::warn!("No readable {} object; cards added without passwords", PASSWORDS_TABLE);
            report.missing_tables.push(PASSWORDS_TABLE);
        }
    }

    match doc.pdf_files.as_mut() {
        Some(table) => {
            for resource in &accepted {
                table.push(resource.day_key(), TableValue::new(&resource.pdf_filename()));
            }
        }
        None => {
            tracing::warn!("No readable {} object; cards added without PDF paths", PDF_FILES_TABLE);
            report.missing_tables.push(PDF_FILES_TABLE);
        }
    }

    if options.update_series_title {
        if let Some(highest) = doc.existing_days().into_iter().max() {
            doc.set_series_day(highest);
        }
    }

    Ok(report)
}

fn first_duplicate(existing: &BTreeSet<u32>, resources: &[Resource]) -> Option<u32> {
    let mut seen = existing.clone();
    resources
        .iter()
        .map(|r| r.day)
        .find(|day| !seen.insert(*day))
}

/// Merge into the dashboard file at `path`. The file is rewritten only
/// once the whole merge has succeeded; an empty batch leaves it alone.
pub fn merge_into_file(
    path: &Path,
    resources: &[Resource],
    options: &MergeOptions,
) -> Result<MergeReport> {
    if !path.exists() {
        return Err(AppError::MissingInput(path.to_path_buf()));
    }
    if resources.is_empty() {
        return Ok(MergeReport::default());
    }

    let source = std::fs::read_to_string(path)?;
    let mut doc = DashboardDocument::parse(source)?;
    let report = merge_resources(&mut doc, resources, options)?;

    std::fs::write(path, doc.render())?;
    Ok(report)
}

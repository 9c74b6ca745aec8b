use chrono::NaiveDate;

use crate::columns;
use crate::comment::CommentTable;
use crate::config::LookupConfig;
use crate::conflict::resolve_conflicts;
use crate::error::ReconError;
use crate::matcher::{lookup_or_not_found, Keep, KeyedValues};
use crate::model::{Flavor, PolicyRow, ReconInput, ReconReport, ReportMeta};
use crate::normalize::{full_key, KeyForm};
use crate::owner::{CategoryOwners, LineProductOwners};
use crate::summary::compute_summary;
use crate::table::Table;
use crate::window::{evaluate, evaluate_with_lifecycle, WindowContext};

/// Run one reconciliation flavor over pre-loaded tables.
///
/// Missing columns are warnings: the affected values read as unmatched. Only a
/// non-empty ledger without its policy-number column is fatal.
pub fn run(
    flavor: Flavor,
    lookups: &LookupConfig,
    input: &ReconInput,
    today: NaiveDate,
) -> Result<ReconReport, ReconError> {
    let mut warnings = Vec::new();

    check_columns(&mut warnings, "SICS", &input.sics, flavor.sics_required());
    check_columns(&mut warnings, "SharePoint", &input.sharepoint, flavor.sharepoint_required());
    check_columns(&mut warnings, flavor.label(), &input.ledger, flavor.ledger_required());

    let ledger = &input.ledger;
    let key_column = flavor.driver_key_column();
    if !ledger.has_column(key_column) && !ledger.is_empty() {
        return Err(ReconError::MissingDriverKey {
            source: flavor.label().to_string(),
            column: key_column.to_string(),
        });
    }

    log::info!(
        "{flavor}: rows SICS={} | SharePoint={} | {flavor}={}",
        input.sics.len(),
        input.sharepoint.len(),
        ledger.len()
    );

    // 1-2. Keys and per-source lookups
    let sics_index = source_index(&mut warnings, flavor, "SICS", &input.sics, columns::SICS_PERIOD_END);
    let tracker_index = source_index(
        &mut warnings,
        flavor,
        "SharePoint",
        &input.sharepoint,
        columns::SHAREPOINT_STATUS,
    );

    let mut rows: Vec<PolicyRow> = (0..ledger.len())
        .map(|i| {
            let key = full_key(ledger.get(i, key_column));
            PolicyRow {
                source_row: i,
                sics: lookup_or_not_found(sics_index.as_ref(), &key),
                tracker: lookup_or_not_found(tracker_index.as_ref(), &key),
                key,
                ..PolicyRow::default()
            }
        })
        .collect();

    // 3. Row-wise derivations. Owner first: the window depends on it.
    let classifier = flavor.classifier();
    let ctx = WindowContext::new(today, &lookups.exception_owner, &lookups.excluded_situations);
    let due_column = flavor.due_column();

    match flavor {
        Flavor::Rimac => {
            let owners = CategoryOwners::from_tables(&lookups.owners);
            let comments = CommentTable::from_map(&lookups.comments.rimac);
            for row in &mut rows {
                let i = row.source_row;
                row.owner = owners.resolve(ledger.get(i, columns::RIMAC_CATEGORY));
                row.code = classifier.classify(ledger.get(i, due_column), &row.sics, &row.tracker);
                row.remark = comments.remark(row.code).to_string();
                row.window = evaluate(&ctx, &row.sics, &row.tracker, &row.owner);
            }
        }
        Flavor::Pacifico => {
            let owners = LineProductOwners::from_tables(&lookups.owners);
            let comments = CommentTable::from_map(&lookups.comments.pacifico);
            for row in &mut rows {
                let i = row.source_row;
                let due = ledger.get(i, due_column);
                row.owner =
                    owners.resolve(ledger.get(i, columns::PAC_LINE), ledger.get(i, columns::PAC_PRODUCT));
                row.code = classifier.classify(due, &row.sics, &row.tracker);
                row.remark = comments.remark(row.code).to_string();
                row.window = evaluate_with_lifecycle(
                    &ctx,
                    &row.sics,
                    &row.tracker,
                    &row.owner,
                    ledger.get(i, columns::PAC_SITUATION),
                    due,
                );
            }

            // 4. Cancellation overlay
            apply_cancellations(&mut warnings, &mut rows, input.cancellations.as_ref());

            // 5. Duplicate keys
            let stats = resolve_conflicts(&mut rows);
            log::info!(
                "{flavor}: {} duplicated keys, {} due rows suppressed, {} review flags collapsed",
                stats.groups_with_duplicates,
                stats.due_rows_suppressed,
                stats.review_flags_collapsed
            );
        }
    }

    // 6. Projection
    let table = project(flavor, ledger, &rows);
    let summary = compute_summary(&rows);

    log::info!(
        "{flavor}: {} policies, {} in window, {} out of window",
        summary.total,
        summary.in_window,
        summary.out_of_window
    );

    Ok(ReconReport {
        meta: ReportMeta {
            flavor,
            run_date: today.format("%Y-%m-%d").to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary,
        table,
        warnings,
    })
}

fn warn(warnings: &mut Vec<String>, message: String) {
    log::warn!("{message}");
    warnings.push(message);
}

fn check_columns(warnings: &mut Vec<String>, source: &str, table: &Table, required: &[&str]) {
    let missing = table.missing(required);
    if !missing.is_empty() {
        warn(warnings, format!("{source}: missing columns [{}]", missing.join(", ")));
    }
}

fn source_index(
    warnings: &mut Vec<String>,
    flavor: Flavor,
    source: &str,
    table: &Table,
    value_column: &str,
) -> Option<KeyedValues> {
    let index = KeyedValues::build(
        table,
        flavor.source_key_column(),
        value_column,
        flavor.source_key_form(),
        Keep::First,
    );
    match &index {
        Some(ix) => {
            if ix.duplicates > 0 {
                log::info!("{source}: {} duplicate keys ignored (first kept)", ix.duplicates);
            }
        }
        None => warn(
            warnings,
            format!("{source}: no lookup possible, every {flavor} policy reads as not found"),
        ),
    }
    index
}

fn apply_cancellations(warnings: &mut Vec<String>, rows: &mut [PolicyRow], cancellations: Option<&Table>) {
    let Some(table) = cancellations else {
        warn(
            warnings,
            format!("no cancellation list; '{}' left empty", columns::OUT_CANCELLED),
        );
        return;
    };

    let Some(index) = KeyedValues::build(
        table,
        columns::PAC_POLICY,
        columns::PAC_SITUATION,
        KeyForm::Full,
        Keep::Last,
    ) else {
        warn(
            warnings,
            format!(
                "cancellation list lacks '{}' or '{}'; '{}' left empty",
                columns::PAC_POLICY,
                columns::PAC_SITUATION,
                columns::OUT_CANCELLED
            ),
        );
        return;
    };

    let mut hits = 0;
    for row in rows.iter_mut() {
        if let Some(situation) = index.get(&row.key) {
            row.cancelled = situation.to_string();
            hits += 1;
        }
    }
    log::info!("cancellations: {hits} policies flagged from {} entries", index.len());
}

fn project(flavor: Flavor, ledger: &Table, rows: &[PolicyRow]) -> Table {
    let out_columns = flavor.output_columns();
    let mut table = Table::new(out_columns);
    for row in rows {
        let cells = out_columns
            .iter()
            .map(|&column| {
                derived_cell(flavor, row, column)
                    .unwrap_or_else(|| ledger.get(row.source_row, column).to_string())
            })
            .collect();
        table.push_row(cells);
    }
    table
}

fn derived_cell(flavor: Flavor, row: &PolicyRow, column: &str) -> Option<String> {
    let value = match column {
        columns::OUT_SICS => row.sics.clone(),
        columns::OUT_TRACKER => row.tracker.clone(),
        columns::OUT_REMARKS => row.remark.clone(),
        columns::OUT_OWNER => row.owner.clone(),
        columns::OUT_WINDOW => row.window.to_string(),
        columns::OUT_CANCELLED => row.cancelled.clone(),
        c if c == flavor.code_column() => row.code.to_string(),
        _ => return None,
    };
    Some(value)
}

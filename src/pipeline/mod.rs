//! Pipeline orchestration: reconcile -> enrich -> validate, with an optional
//! publish/export stage, over JSON snapshot files in a working directory.

pub mod enrich;
pub mod publish;
pub mod reconcile;
pub mod validate;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::categories::CategoryTable;
use crate::domain::{RawEvent, Source, StagedEvent};
use crate::error::{PipelineError, Result};
use crate::sheet::schema::{
    parse_raw_events, parse_staged_events, published_events_to_sheet, staged_events_to_sheet,
};
use crate::sheet::Sheet;
use crate::sync::{sync, SyncSummary};
use crate::venues::VenueTable;

use enrich::EnrichSummary;
use publish::PublishSummary;
use reconcile::ReconcileSummary;
use validate::ValidateSummary;

/// Snapshot file names under the working directory. Sources are required;
/// reference tables and the previous staged set degrade to empty.
pub const SNAPSHOT_O2: &str = "o2_events.json";
pub const SNAPSHOT_MANUAL: &str = "manual_events.json";
pub const SNAPSHOT_MONTHLY: &str = "monthly_events.json";
pub const SNAPSHOT_VENUES: &str = "venues.json";
pub const SNAPSHOT_CATEGORIES: &str = "categories.json";
pub const SNAPSHOT_STAGED: &str = "staged_events.json";
pub const SNAPSHOT_FORMATS: &str = "row_formats.json";
pub const SNAPSHOT_PUBLISHED: &str = "published_events.json";
pub const SNAPSHOT_SCRAPED: &str = "scraped_events.json";
pub const SNAPSHOT_SYNC_STAGING: &str = "staging_events.json";
pub const SNAPSHOT_SYNC_PUBLIC: &str = "public_events.json";

/// Result of a complete pipeline run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub reconcile: ReconcileSummary,
    pub enrich: EnrichSummary,
    pub validate: ValidateSummary,
    pub publish: Option<PublishSummary>,
}

/// JSON snapshot files standing in for the external tabular store.
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Loads a snapshot that must exist; its absence halts the run.
    pub fn load_required(&self, name: &str) -> Result<Sheet> {
        let path = self.path(name);
        if !path.exists() {
            return Err(PipelineError::MissingSnapshot(name.to_string()));
        }
        let text = fs::read_to_string(&path)?;
        Sheet::from_json(&text)
    }

    /// Loads a snapshot that may be absent, degrading to an empty sheet.
    pub fn load_optional(&self, name: &str) -> Result<Sheet> {
        let path = self.path(name);
        if !path.exists() {
            warn!(snapshot = name, "snapshot absent, treating as empty");
            return Ok(Sheet::default());
        }
        let text = fs::read_to_string(&path)?;
        Sheet::from_json(&text)
    }

    pub fn save(&self, name: &str, value: &impl Serialize) -> Result<()> {
        let text = serde_json::to_string_pretty(value)?;
        fs::write(self.path(name), text)?;
        Ok(())
    }
}

/// Loads and merges the three source snapshots in priority-irrelevant order;
/// reconciliation sorts by priority itself.
fn load_raw_events(store: &SnapshotStore) -> Result<Vec<RawEvent>> {
    let mut raw = Vec::new();
    for (name, source) in [
        (SNAPSHOT_O2, Source::O2),
        (SNAPSHOT_MANUAL, Source::Manual),
        (SNAPSHOT_MONTHLY, Source::Monthly),
    ] {
        let sheet = store.load_required(name)?;
        let events = parse_raw_events(&sheet, source, name);
        info!(snapshot = name, events = events.len(), "loaded source snapshot");
        raw.extend(events);
    }
    Ok(raw)
}

fn load_reference_tables(store: &SnapshotStore) -> Result<(VenueTable, CategoryTable)> {
    let venues = VenueTable::from_sheet(&store.load_optional(SNAPSHOT_VENUES)?);
    let categories = CategoryTable::from_sheet(&store.load_optional(SNAPSHOT_CATEGORIES)?);
    if venues.is_empty() {
        warn!("venue reference table is empty, no venue will resolve");
    }
    Ok((venues, categories))
}

/// Runs the full staging pipeline over the store: reconcile the sources with
/// the previous staged snapshot, enrich, validate, write the staged snapshot
/// and highlight directives back, and optionally export the public set.
pub fn run(store: &SnapshotStore, export: bool) -> Result<RunResult> {
    let raw = load_raw_events(store)?;
    let (venues, categories) = load_reference_tables(store)?;
    let previous: Vec<StagedEvent> =
        parse_staged_events(&store.load_optional(SNAPSHOT_STAGED)?);

    let mut result = RunResult::default();

    let (mut staged, reconcile_summary) = {
        let span = info_span!("reconcile");
        let _enter = span.enter();
        reconcile::reconcile(raw, &previous)
    };
    info!(
        total_in = reconcile_summary.total_in,
        kept = reconcile_summary.kept,
        duplicates = reconcile_summary.duplicates_dropped,
        "reconcile complete"
    );
    result.reconcile = reconcile_summary;

    {
        let span = info_span!("enrich");
        let _enter = span.enter();
        result.enrich = enrich::enrich(&mut staged, &venues, &categories);
    }

    let formats = {
        let span = info_span!("validate");
        let _enter = span.enter();
        let (formats, summary) = validate::validate(&mut staged);
        result.validate = summary;
        formats
    };

    store.save(SNAPSHOT_STAGED, &staged_events_to_sheet(&staged))?;
    store.save(SNAPSHOT_FORMATS, &formats)?;

    if export {
        result.publish = Some(export_published(store, &staged)?);
    }

    Ok(result)
}

/// Publish filter over an already validated staged set. Writes the public
/// snapshot as a full replacement.
pub fn export_published(store: &SnapshotStore, staged: &[StagedEvent]) -> Result<PublishSummary> {
    let span = info_span!("publish");
    let _enter = span.enter();
    let (published, summary) = publish::publish(staged);
    store.save(SNAPSHOT_PUBLISHED, &published_events_to_sheet(&published))?;
    info!(
        approved = summary.approved,
        pruned = summary.pruned_outdated,
        published = summary.published,
        "export complete"
    );
    Ok(summary)
}

/// Loads the staged snapshot and exports it without re-running the earlier
/// stages. Requires a prior `run` to have validated the set.
pub fn export(store: &SnapshotStore) -> Result<PublishSummary> {
    let staged = parse_staged_events(&store.load_required(SNAPSHOT_STAGED)?);
    export_published(store, &staged)
}

/// Runs the live sync path: admit scraped events into the staging snapshot,
/// prune both destinations, and write both back.
pub fn run_sync(store: &SnapshotStore) -> Result<SyncSummary> {
    let span = info_span!("sync");
    let _enter = span.enter();

    let scraped_sheet = store.load_required(SNAPSHOT_SCRAPED)?;
    let incoming = parse_raw_events(&scraped_sheet, Source::O2, SNAPSHOT_SCRAPED);
    let mut staging = store.load_required(SNAPSHOT_SYNC_STAGING)?;
    let mut public = store.load_required(SNAPSHOT_SYNC_PUBLIC)?;

    let summary = sync(incoming, &mut staging, &mut public);

    store.save(SNAPSHOT_SYNC_STAGING, &staging)?;
    store.save(SNAPSHOT_SYNC_PUBLIC, &public)?;
    Ok(summary)
}

/// Convenience used by tests and callers that already hold a directory path.
pub fn run_in_dir(dir: &Path, export: bool) -> Result<RunResult> {
    run(&SnapshotStore::new(dir), export)
}

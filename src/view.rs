use std::fmt::Display;
use std::future::Future;

use crate::models::DashboardOverview;
use crate::source::{self, DataService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Failed,
    /// The view was torn down before the fetches finished.
    Abandoned,
}

/// Resolves when `signal` fires. A signal that cannot be listened for never resolves,
/// so it cannot tear down a load.
pub async fn teardown_signal<F, E>(signal: F)
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    if let Err(err) = signal.await {
        log::warn!("cannot listen for interrupt, loads will run to completion: {err}");
        std::future::pending::<()>().await;
    }
}

/// Display state of the dashboard. Starts out loading with an all-zero overview.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub loading: bool,
    pub loaded: bool,
    pub overview: DashboardOverview,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            loading: true,
            loaded: false,
            overview: DashboardOverview::default(),
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when figures should render as placeholders instead of values.
    pub fn is_placeholder(&self) -> bool {
        self.loading || !self.loaded
    }

    /// Runs one load. A failed load leaves the previous overview in place; a teardown
    /// that fires first drops the in-flight fetches and touches nothing.
    pub async fn refresh<F>(&mut self, service: &dyn DataService, teardown: F) -> LoadOutcome
    where
        F: Future<Output = ()>,
    {
        self.loading = true;

        let result = tokio::select! {
            result = source::load_snapshot(service) => result,
            _ = teardown => {
                log::info!("dashboard torn down before load finished, discarding fetches");
                return LoadOutcome::Abandoned;
            }
        };

        self.loading = false;
        match result {
            Ok(snapshot) => {
                self.overview = snapshot.aggregate();
                self.loaded = true;
                log::info!(
                    "dashboard loaded: {} courses, {} registrations",
                    self.overview.summary.courses,
                    self.overview.summary.registrations
                );
                LoadOutcome::Applied
            }
            Err(err) => {
                log::error!("failed to load dashboard stats: {err:#}");
                LoadOutcome::Failed
            }
        }
    }
}

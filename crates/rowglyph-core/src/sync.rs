//! Row synchronizer: the engine that keeps injected icons in step with the
//! host page.
//!
//! # Pass
//!
//! 1. Locate rows under the root, in document order
//! 2. Detect the theme once for the whole pass
//! 3. Per row: classify, resolve, inject inside the mutation gate
//! 4. Per row, on first sighting: let the provider start observing it
//! 5. Release observed rows the pass no longer located
//!
//! A failing row is recorded in the [`PassReport`] and the pass moves on.
//! Passes never nest. A resync requested while a pass is running is
//! replayed once the running pass returns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::error::ProviderError;
use crate::gate::ChangeRecord;
use crate::icons::IconResolver;
use crate::model::Theme;
use crate::provider::Provider;
use crate::session::Session;

// =============================================================================
// Pass Report
// =============================================================================

/// Why a row was left untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The filename element was absent or empty
    MissingFilename,
    /// The provider failed to inject the icon
    Injection(ProviderError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFilename => write!(f, "missing filename"),
            Self::Injection(err) => write!(f, "injection failed: {}", err),
        }
    }
}

/// A row the pass could not update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRow {
    /// Position of the row in document order
    pub index: usize,
    pub reason: SkipReason,
}

/// Outcome of one synchronization pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Rows returned by the provider
    pub located: usize,
    /// Rows that received a new icon
    pub injected: usize,
    /// Rows whose icon was already correct
    pub unchanged: usize,
    /// Rows seen for the first time and handed to the provider for observation
    pub newly_observed: usize,
    /// Previously observed rows that are gone from the page
    pub released: usize,
    /// Rows that failed
    pub skipped: Vec<SkippedRow>,
    /// Theme detected for this pass
    pub theme: Theme,
    /// True when the pass was postponed because another one was running
    pub deferred: bool,
}

impl PassReport {
    fn deferred() -> Self {
        Self {
            deferred: true,
            ..Default::default()
        }
    }
}

// =============================================================================
// Resync Handle
// =============================================================================

/// Handle a provider uses to request a new pass from a mutation callback.
#[derive(Clone)]
pub struct Resync {
    session: Rc<Session>,
    icon_node: Rc<str>,
    trigger: Rc<dyn Fn()>,
}

impl Resync {
    /// Build a handle around an arbitrary trigger.
    pub fn new(session: Rc<Session>, icon_node: &str, trigger: impl Fn() + 'static) -> Self {
        Self {
            session,
            icon_node: Rc::from(icon_node),
            trigger: Rc::new(trigger),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Deliver a notification batch.
    ///
    /// Runs a pass unless the mutation gate attributes the batch to the
    /// engine's own writes. Returns whether a pass was requested.
    pub fn notify(&self, batch: &[ChangeRecord]) -> bool {
        if self.session.admits(batch, &self.icon_node) {
            trace!(records = batch.len(), "host mutation, resynchronizing");
            (self.trigger)();
            true
        } else {
            trace!(records = batch.len(), "self-caused mutation suppressed");
            false
        }
    }

    /// Request a pass unconditionally.
    pub fn now(&self) {
        (self.trigger)();
    }
}

impl fmt::Debug for Resync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resync")
            .field("icon_node", &self.icon_node)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Synchronizer
// =============================================================================

/// Drives synchronization passes for one provider over one root.
pub struct Synchronizer<P: Provider, R: IconResolver> {
    provider: P,
    resolver: R,
    root: P::Root,
    session: Rc<Session>,
    /// Rows handed to `on_row_observed` and still located by the last pass
    observed: RefCell<Vec<P::Row>>,
    running: Cell<bool>,
    pending: Cell<bool>,
    passes: Cell<u64>,
    this: Weak<Self>,
}

impl<P, R> Synchronizer<P, R>
where
    P: Provider + 'static,
    P::Root: 'static,
    P::Row: 'static,
    R: IconResolver + 'static,
{
    pub fn new(provider: P, resolver: R, root: P::Root, session: Rc<Session>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            provider,
            resolver,
            root,
            session,
            observed: RefCell::new(Vec::new()),
            running: Cell::new(false),
            pending: Cell::new(false),
            passes: Cell::new(0),
            this: this.clone(),
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    /// Number of passes executed so far.
    pub fn passes(&self) -> u64 {
        self.passes.get()
    }

    /// Number of rows currently under observation.
    pub fn observed_rows(&self) -> usize {
        self.observed.borrow().len()
    }

    /// A resync handle bound to this synchronizer.
    ///
    /// Holds only a weak reference, so observers outliving the synchronizer
    /// become no-ops.
    pub fn resync(&self) -> Resync {
        let this = self.this.clone();
        Resync::new(
            Rc::clone(&self.session),
            self.provider.icon_node_name(),
            move || {
                if let Some(sync) = this.upgrade() {
                    sync.synchronize();
                }
            },
        )
    }

    /// Run a pass, then replay any resync requested while it ran.
    ///
    /// Returns the report of the first pass. A call made while a pass is
    /// already running returns a deferred report immediately.
    pub fn synchronize(&self) -> PassReport {
        if self.running.get() {
            self.pending.set(true);
            return PassReport::deferred();
        }

        self.running.set(true);
        let report = self.run_pass();
        while self.pending.replace(false) {
            let replay = self.run_pass();
            debug!(injected = replay.injected, "replayed deferred pass");
        }
        self.running.set(false);

        report
    }

    fn run_pass(&self) -> PassReport {
        self.passes.set(self.passes.get() + 1);

        let rows = match self.provider.locate_rows(&self.root) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(domain = self.provider.domain(), error = %err, "failed to locate rows");
                return PassReport::default();
            }
        };

        let theme = self.provider.detect_theme();
        let mut report = PassReport {
            located: rows.len(),
            theme,
            ..Default::default()
        };

        for (index, row) in rows.iter().enumerate() {
            match self.apply(row, theme) {
                Ok(true) => report.injected += 1,
                Ok(false) => report.unchanged += 1,
                Err(reason) => {
                    warn!(index, %reason, "skipping row");
                    report.skipped.push(SkippedRow { index, reason });
                }
            }

            if self.observe(row) {
                report.newly_observed += 1;
            }
        }
        report.released = self.release_missing(&rows);

        debug!(
            pass = self.passes.get(),
            located = report.located,
            injected = report.injected,
            unchanged = report.unchanged,
            skipped = report.skipped.len(),
            released = report.released,
            %theme,
            "synchronization pass complete"
        );
        report
    }

    /// Classify, resolve and inject one row. `Ok(true)` when the DOM changed.
    fn apply(&self, row: &P::Row, theme: Theme) -> Result<bool, SkipReason> {
        let kind = self.provider.classify(row).kind();
        let filename = self
            .provider
            .filename(row)
            .filter(|name| !name.trim().is_empty())
            .ok_or(SkipReason::MissingFilename)?;

        let icon = self.resolver.resolve(filename.trim(), kind, theme);
        if self.provider.is_rendered(row, &icon) {
            return Ok(false);
        }

        let _gate = self.session.gate().enter();
        self.provider
            .inject_icon(row, &icon)
            .map_err(SkipReason::Injection)?;
        trace!(%filename, %kind, icon = %icon.name, "icon injected");
        Ok(true)
    }

    /// Hand a row to the provider the first time it shows up.
    fn observe(&self, row: &P::Row) -> bool {
        if self.observed.borrow().contains(row) {
            return false;
        }

        match self.provider.on_row_observed(row, &self.resync()) {
            Ok(()) => {
                self.observed.borrow_mut().push(row.clone());
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to observe row, retrying next pass");
                false
            }
        }
    }

    /// Drop rows the host removed or replaced since the previous pass.
    fn release_missing(&self, located: &[P::Row]) -> usize {
        let gone: Vec<P::Row> = {
            let mut observed = self.observed.borrow_mut();
            let (kept, gone): (Vec<P::Row>, Vec<P::Row>) = observed.drain(..).partition(|row| located.contains(row));
            *observed = kept;
            gone
        };

        for row in &gone {
            self.provider.on_row_released(row);
        }
        if !gone.is_empty() {
            trace!(released = gone.len(), "stopped observing detached rows");
        }
        gone.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderResult;
    use crate::model::{Classification, IconHandle, RowKind};

    /// Provider whose rows are plain names; the icon is "rendered" into a
    /// shared log.
    struct ListProvider {
        rows: RefCell<Vec<&'static str>>,
        rendered: RefCell<Vec<(String, String)>>,
        released: RefCell<Vec<&'static str>>,
        reentrant: RefCell<Option<Resync>>,
    }

    impl ListProvider {
        fn new(rows: Vec<&'static str>) -> Self {
            Self {
                rows: RefCell::new(rows),
                rendered: RefCell::new(Vec::new()),
                released: RefCell::new(Vec::new()),
                reentrant: RefCell::new(None),
            }
        }
    }

    impl Provider for ListProvider {
        type Root = ();
        type Row = &'static str;

        fn domain(&self) -> &str {
            "example.test"
        }

        fn locate_rows(&self, _root: &()) -> ProviderResult<Vec<&'static str>> {
            Ok(self.rows.borrow().clone())
        }

        fn filename(&self, row: &&'static str) -> Option<String> {
            Some(row.to_string())
        }

        fn classify(&self, _row: &&'static str) -> Classification {
            Classification::default()
        }

        fn detect_theme(&self) -> Theme {
            Theme::Dark
        }

        fn is_rendered(&self, row: &&'static str, icon: &IconHandle) -> bool {
            self.rendered
                .borrow()
                .iter()
                .rev()
                .find(|(name, _)| name == row)
                .is_some_and(|(_, url)| *url == icon.url)
        }

        fn inject_icon(&self, row: &&'static str, icon: &IconHandle) -> ProviderResult<()> {
            if let Some(resync) = self.reentrant.borrow().as_ref() {
                resync.now();
            }
            self.rendered
                .borrow_mut()
                .push((row.to_string(), icon.url.clone()));
            Ok(())
        }

        fn on_row_observed(&self, _row: &&'static str, _resync: &Resync) -> ProviderResult<()> {
            Ok(())
        }

        fn on_row_released(&self, row: &&'static str) {
            self.released.borrow_mut().push(row);
        }
    }

    struct NameResolver;

    impl IconResolver for NameResolver {
        fn resolve(&self, filename: &str, kind: RowKind, theme: Theme) -> IconHandle {
            IconHandle::new(format!("{}-{}", kind, filename), format!("{}/{}", theme, filename))
        }
    }

    #[test]
    fn test_pass_injects_every_row() {
        let sync = Synchronizer::new(
            ListProvider::new(vec!["a.rs", "b.md"]),
            NameResolver,
            (),
            Rc::new(Session::new()),
        );

        let report = sync.synchronize();
        assert_eq!(report.located, 2);
        assert_eq!(report.injected, 2);
        assert_eq!(report.newly_observed, 2);
        assert_eq!(report.theme, Theme::Dark);
        assert!(!report.deferred);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let sync = Synchronizer::new(
            ListProvider::new(vec!["a.rs", "b.md"]),
            NameResolver,
            (),
            Rc::new(Session::new()),
        );

        sync.synchronize();
        let report = sync.synchronize();
        assert_eq!(report.injected, 0);
        assert_eq!(report.unchanged, 2);
        assert_eq!(report.newly_observed, 0);
        assert_eq!(sync.provider().rendered.borrow().len(), 2);
        assert_eq!(sync.observed_rows(), 2);
    }

    #[test]
    fn test_resync_during_pass_is_deferred() {
        let sync = Synchronizer::new(
            ListProvider::new(vec!["a.rs"]),
            NameResolver,
            (),
            Rc::new(Session::new()),
        );
        *sync.provider().reentrant.borrow_mut() = Some(sync.resync());

        let report = sync.synchronize();
        assert_eq!(report.injected, 1);
        // One requested replay; the replay finds the row unchanged and
        // injects nothing, so it does not request another.
        assert_eq!(sync.passes(), 2);
    }

    #[test]
    fn test_rows_gone_from_page_are_released() {
        let sync = Synchronizer::new(
            ListProvider::new(vec!["a.rs", "b.md"]),
            NameResolver,
            (),
            Rc::new(Session::new()),
        );
        sync.synchronize();

        *sync.provider().rows.borrow_mut() = vec!["b.md", "c.json"];
        let report = sync.synchronize();
        assert_eq!(report.newly_observed, 1);
        assert_eq!(report.released, 1);
        assert_eq!(sync.observed_rows(), 2);
        assert_eq!(*sync.provider().released.borrow(), vec!["a.rs"]);
    }

    #[test]
    fn test_failed_locate_keeps_observed_rows() {
        struct Broken;
        impl Provider for Broken {
            type Root = ();
            type Row = u32;
            fn domain(&self) -> &str {
                "example.test"
            }
            fn locate_rows(&self, _root: &()) -> ProviderResult<Vec<u32>> {
                Err(ProviderError::MissingDocument)
            }
            fn filename(&self, _row: &u32) -> Option<String> {
                None
            }
            fn classify(&self, _row: &u32) -> Classification {
                Classification::default()
            }
            fn detect_theme(&self) -> Theme {
                Theme::Dark
            }
            fn inject_icon(&self, _row: &u32, _icon: &IconHandle) -> ProviderResult<()> {
                Ok(())
            }
            fn on_row_observed(&self, _row: &u32, _resync: &Resync) -> ProviderResult<()> {
                Ok(())
            }
            fn on_row_released(&self, _row: &u32) {
                panic!("nothing was located, nothing may be released");
            }
        }

        let sync = Synchronizer::new(Broken, NameResolver, (), Rc::new(Session::new()));
        sync.observed.borrow_mut().push(7);
        let report = sync.synchronize();
        assert_eq!(report.located, 0);
        assert_eq!(report.released, 0);
        assert_eq!(sync.observed_rows(), 1);
    }

    #[test]
    fn test_gate_closed_after_pass() {
        let sync = Synchronizer::new(
            ListProvider::new(vec!["a.rs"]),
            NameResolver,
            (),
            Rc::new(Session::new()),
        );
        sync.synchronize();
        assert!(!sync.session().gate().is_self_mutating());
    }
}

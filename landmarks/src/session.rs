//! One observed document: the finder, throttled by a pause handler, and
//! paused altogether while the document is hidden.

use crate::dom::mutation::MutationRecord;
use crate::finder::{LandmarksFinder, TreeEntry};
use crate::options::ScanOptions;
use crate::pause::{PauseHandler, RunOutcome};
use kuchiki::NodeRef;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// How long to wait after a document becomes visible again before scanning
/// it, so whatever happened while hidden settles first.
pub const VISIBILITY_GRACE: Duration = Duration::from_secs(2);

/// Work deferred by the pause handler. Records coalesced while paused are
/// gone by the time it runs, so it can only be a full scan.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeferredScan;

pub struct ContentSession {
    finder: LandmarksFinder,
    pause: PauseHandler<DeferredScan>,
    observing: bool,
    reconnect_at: Option<Instant>,
}

impl ContentSession {
    /// Starts observing `document`, scanning it right away.
    pub fn new(document: NodeRef, options: ScanOptions) -> Self {
        let mut finder = LandmarksFinder::new(document, options);
        finder.scan();
        Self {
            finder,
            pause: PauseHandler::new(),
            observing: true,
            reconnect_at: None,
        }
    }

    pub fn finder(&self) -> &LandmarksFinder {
        &self.finder
    }

    pub fn finder_mut(&mut self) -> &mut LandmarksFinder {
        &mut self.finder
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn pause_handler(&self) -> &PauseHandler<DeferredScan> {
        &self.pause
    }

    /// Feeds a batch from the host's mutation observer. Returns `None` if the
    /// batch was ignored because observation is disconnected.
    pub fn on_mutations(&mut self, now: Instant, records: &[MutationRecord]) -> Option<RunOutcome> {
        if !self.observing {
            trace!("Ignoring {} records while disconnected", records.len());
            return None;
        }
        let finder = &mut self.finder;
        Some(self.pause.run(now, || finder.handle_mutations(records), DeferredScan))
    }

    /// Runs whatever is due. Returns whether a full scan happened.
    pub fn poll(&mut self, now: Instant) -> bool {
        let mut scanned = false;

        if self.reconnect_at.map_or(false, |at| at <= now) {
            debug!("Reconnecting after visibility change");
            self.reconnect_at = None;
            self.observing = true;
            self.finder.scan();
            scanned = true;
        }

        if let Some(DeferredScan) = self.pause.poll(now) {
            // A reconnection scan above already covers it.
            if self.observing && !scanned {
                self.finder.scan();
                scanned = true;
            }
        }

        scanned
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.reconnect_at, self.pause.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// The document was hidden or shown. Hidden documents aren't observed at
    /// all; once shown again, one scan catches up after `VISIBILITY_GRACE`.
    pub fn visibility_changed(&mut self, now: Instant, hidden: bool) {
        if hidden {
            self.observing = false;
            self.reconnect_at = None;
        } else if !self.observing && self.reconnect_at.is_none() {
            self.reconnect_at = Some(now + VISIBILITY_GRACE);
        }
    }

    /// The landmarks for a UI that's about to show them. Rescans first if
    /// throttling may have left the tree behind the page.
    pub fn landmarks_for_ui(&mut self) -> Rc<Vec<TreeEntry>> {
        if self.pause.is_paused() {
            debug!("Paused ({:?}), rescanning for UI", self.pause.pause());
            self.finder.scan();
        }
        self.finder.tree()
    }

    /// The page navigated to a new document.
    pub fn navigated(&mut self, document: NodeRef) {
        let options = self.finder.options();
        self.pause.reset();
        self.reconnect_at = None;
        self.observing = true;
        self.finder = LandmarksFinder::new(document, options);
        self.finder.scan();
    }
}

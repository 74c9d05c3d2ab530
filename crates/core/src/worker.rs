//! Background scan scheduling.
//!
//! One dedicated worker thread consumes scan requests from a queue, one at
//! a time, and hands each finished tree back as a single owned message.
//! After the handoff the tree is read-only and needs no locking.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::model::Node;
use crate::scanner::{scan, ScanError, ScanStats};

/// Refresh ticks are dropped once this many requests sit unconsumed.
pub const MAX_PENDING_SCANS: usize = 2;

#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub root: PathBuf,
    pub max_depth: usize,
    pub follow_symlinks: bool,
}

#[derive(Debug)]
pub enum ScanEvent {
    Completed {
        request: ScanRequest,
        tree: Node,
        stats: ScanStats,
        /// Hash over the pre-order (path, size, modified) snapshot; equal
        /// fingerprints mean an unchanged tree, so periodic rescans can
        /// skip redrawing.
        fingerprint: u64,
    },
    Failed {
        request: ScanRequest,
        error: ScanError,
    },
}

/// Request queue shared between the interactive side and the worker.
/// Both halves are held so the submitting side can drain stale requests.
#[derive(Clone)]
struct ScanQueue {
    tx: Sender<ScanRequest>,
    rx: Receiver<ScanRequest>,
}

impl ScanQueue {
    fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Supersede queued-but-unstarted requests with `request`. A scan the
    /// worker has already picked up is never aborted.
    fn submit(&self, request: ScanRequest) {
        while self.rx.try_recv().is_ok() {}
        let _ = self.tx.send(request);
    }

    /// Enqueue a timer-driven refresh unless the queue is already
    /// backlogged; returns whether the request was accepted.
    fn submit_refresh(&self, request: ScanRequest) -> bool {
        if self.rx.len() > MAX_PENDING_SCANS {
            return false;
        }
        self.tx.send(request).is_ok()
    }

    fn len(&self) -> usize {
        self.rx.len()
    }
}

/// Handle to the single scan worker thread.
pub struct ScanWorker {
    queue: ScanQueue,
}

impl ScanWorker {
    /// Start the worker thread and return the handle plus the event side
    /// of the completion channel. The thread exits once the handle is
    /// dropped and the queue drains.
    pub fn spawn() -> (Self, Receiver<ScanEvent>) {
        let queue = ScanQueue::new();
        let (event_tx, event_rx) = unbounded();
        let requests = queue.rx.clone();
        std::thread::spawn(move || {
            for request in requests.iter() {
                debug!(root = %request.root.display(), depth = request.max_depth, "scan started");
                let event = match scan(&request.root, request.max_depth, request.follow_symlinks) {
                    Ok((tree, stats)) => {
                        let fingerprint = fingerprint(&tree);
                        ScanEvent::Completed {
                            request,
                            tree,
                            stats,
                            fingerprint,
                        }
                    }
                    Err(error) => {
                        warn!(root = %request.root.display(), %error, "scan failed");
                        ScanEvent::Failed { request, error }
                    }
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });
        (Self { queue }, event_rx)
    }

    /// Queue a scan, superseding any not-yet-started requests.
    pub fn request(&self, request: ScanRequest) {
        self.queue.submit(request);
    }

    /// Queue a periodic refresh; dropped (returns false) under backlog.
    pub fn request_refresh(&self, request: ScanRequest) -> bool {
        self.queue.submit_refresh(request)
    }

    /// Number of queued requests the worker has not picked up yet.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

/// Change-detection hash over the whole tree.
fn fingerprint(tree: &Node) -> u64 {
    let mut hasher = DefaultHasher::new();
    for node in tree.iter_all() {
        node.path.hash(&mut hasher);
        node.size.hash(&mut hasher);
        node.modified.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn request_for(root: &std::path::Path) -> ScanRequest {
        ScanRequest {
            root: root.to_path_buf(),
            max_depth: 4,
            follow_symlinks: false,
        }
    }

    #[test]
    fn worker_completes_a_scan() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.bin"), vec![0u8; 1000]).unwrap();

        let (worker, events) = ScanWorker::spawn();
        worker.request(request_for(tmp.path()));
        match events.recv_timeout(Duration::from_secs(10)).unwrap() {
            ScanEvent::Completed { tree, stats, .. } => {
                assert!(tree.size >= 1000);
                assert_eq!(stats.files_scanned, 1);
            }
            ScanEvent::Failed { error, .. } => panic!("scan failed: {error}"),
        }
    }

    #[test]
    fn worker_reports_bad_roots() {
        let (worker, events) = ScanWorker::spawn();
        worker.request(request_for(std::path::Path::new("/definitely/not/here")));
        match events.recv_timeout(Duration::from_secs(10)).unwrap() {
            ScanEvent::Failed { error, .. } => {
                assert!(matches!(error, ScanError::RootInaccessible { .. }));
            }
            ScanEvent::Completed { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn fingerprint_is_stable_for_unchanged_trees() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.bin"), vec![0u8; 64]).unwrap();

        let (worker, events) = ScanWorker::spawn();
        worker.request(request_for(tmp.path()));
        worker.request_refresh(request_for(tmp.path()));

        let mut prints = Vec::new();
        for _ in 0..2 {
            match events.recv_timeout(Duration::from_secs(10)).unwrap() {
                ScanEvent::Completed { fingerprint, .. } => prints.push(fingerprint),
                ScanEvent::Failed { error, .. } => panic!("scan failed: {error}"),
            }
        }
        assert_eq!(prints[0], prints[1]);
    }

    #[test]
    fn submit_drains_stale_requests() {
        let queue = ScanQueue::new();
        let tmp = TempDir::new().unwrap();
        for _ in 0..3 {
            assert!(queue.submit_refresh(request_for(tmp.path())));
        }
        assert_eq!(queue.len(), 3);
        queue.submit(request_for(tmp.path()));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn refresh_is_dropped_under_backlog() {
        let queue = ScanQueue::new();
        let tmp = TempDir::new().unwrap();
        for _ in 0..3 {
            assert!(queue.submit_refresh(request_for(tmp.path())));
        }
        // Queue now holds more than MAX_PENDING_SCANS requests.
        assert!(!queue.submit_refresh(request_for(tmp.path())));
        assert_eq!(queue.len(), 3);
    }
}

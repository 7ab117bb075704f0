use crate::device::{DeviceError, GraphicsDevice, create_native, delete_native};
use meshrig_common::{NativeId, ResourceKind};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// A native object identified by kind and id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LeakRecord {
    pub kind: ResourceKind,
    pub id: NativeId,
}

/// Outcome of a tracker audit at shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeakReport {
    /// Handles dropped without an explicit release.
    pub leaked: Vec<LeakRecord>,
    /// Handles still alive when the audit ran.
    pub outstanding: Vec<LeakRecord>,
}

impl LeakReport {
    pub fn is_clean(&self) -> bool {
        self.leaked.is_empty() && self.outstanding.is_empty()
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    live: BTreeSet<LeakRecord>,
    leaked: Vec<LeakRecord>,
    orphans: Vec<LeakRecord>,
}

/// Registry of outstanding handles, shared by every handle it issued.
///
/// Single-threaded by construction (`Rc`): the frame loop thread owns the
/// device and everything created from it.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    state: Rc<RefCell<TrackerState>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles currently holding a native id.
    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Handles currently holding a native id, in (kind, id) order.
    pub fn outstanding(&self) -> Vec<LeakRecord> {
        self.state.borrow().live.iter().copied().collect()
    }

    /// Every leak reported so far, in drop order.
    pub fn leaks(&self) -> Vec<LeakRecord> {
        self.state.borrow().leaked.clone()
    }

    /// Leaked ids waiting for [`reclaim`](Self::reclaim).
    pub fn pending_orphans(&self) -> usize {
        self.state.borrow().orphans.len()
    }

    /// Delete native objects whose handles were dropped while live.
    ///
    /// Returns how many were deleted.
    pub fn reclaim<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> usize {
        let orphans = std::mem::take(&mut self.state.borrow_mut().orphans);
        for orphan in &orphans {
            tracing::debug!("reclaiming leaked {} {}", orphan.kind, orphan.id);
            delete_native(device, orphan.kind, orphan.id);
        }
        orphans.len()
    }

    /// Reclaim orphans and report what was leaked or is still alive.
    pub fn audit<D: GraphicsDevice + ?Sized>(&self, device: &mut D) -> LeakReport {
        self.reclaim(device);
        let report = LeakReport {
            leaked: self.leaks(),
            outstanding: self.outstanding(),
        };
        for record in &report.outstanding {
            tracing::warn!("{} {} still alive at shutdown", record.kind, record.id);
        }
        report
    }

    fn register(&self, record: LeakRecord) {
        self.state.borrow_mut().live.insert(record);
    }

    fn unregister(&self, record: LeakRecord) {
        self.state.borrow_mut().live.remove(&record);
    }

    fn report_leak(&self, record: LeakRecord) {
        let mut state = self.state.borrow_mut();
        state.live.remove(&record);
        state.leaked.push(record);
        state.orphans.push(record);
    }
}

/// Exclusive owner of one native object.
///
/// Release is explicit so deletion order is under the caller's control.
/// Dropping a live handle is a programming error: it is reported as a leak
/// and the object is deleted at the next reclaim point instead.
#[derive(Debug)]
pub struct ResourceHandle {
    record: LeakRecord,
    released: bool,
    tracker: ResourceTracker,
}

impl ResourceHandle {
    /// Create a fresh native object of `kind` and take ownership of it.
    pub fn acquire<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        tracker: &ResourceTracker,
        kind: ResourceKind,
    ) -> Result<Self, DeviceError> {
        let id = create_native(device, kind)?;
        let record = LeakRecord { kind, id };
        tracker.register(record);
        tracing::debug!("acquired {kind} {id}");
        Ok(Self {
            record,
            released: false,
            tracker: tracker.clone(),
        })
    }

    /// Native id. Only meaningful while [`is_released`](Self::is_released) is false.
    pub fn id(&self) -> NativeId {
        self.record.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.record.kind
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Delete the native object. Returns `true` only on the call that freed it.
    pub fn release<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> bool {
        if self.released {
            return false;
        }
        delete_native(device, self.record.kind, self.record.id);
        self.tracker.unregister(self.record);
        self.released = true;
        tracing::debug!("released {} {}", self.record.kind, self.record.id);
        true
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                "GPU resource leak: {} {} dropped without release",
                self.record.kind,
                self.record.id
            );
            self.tracker.report_leak(self.record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DeviceCall, HeadlessDevice};

    fn deletes(device: &HeadlessDevice) -> usize {
        device
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::Delete { .. }))
            .count()
    }

    #[test]
    fn release_twice_frees_once() {
        let mut device = HeadlessDevice::new();
        let tracker = ResourceTracker::new();
        let mut handle =
            ResourceHandle::acquire(&mut device, &tracker, ResourceKind::Buffer).unwrap();
        assert_eq!(tracker.live_count(), 1);

        assert!(handle.release(&mut device));
        assert!(!handle.release(&mut device));
        assert!(handle.is_released());
        assert_eq!(deletes(&device), 1);
        assert!(device.errors().is_empty());
        assert_eq!(tracker.live_count(), 0);
        drop(handle);
        assert!(tracker.leaks().is_empty());
    }

    #[test]
    fn dropped_live_handle_reports_one_leak() {
        let mut device = HeadlessDevice::new();
        let tracker = ResourceTracker::new();
        let id = {
            let handle =
                ResourceHandle::acquire(&mut device, &tracker, ResourceKind::Texture).unwrap();
            handle.id()
        };

        let leaks = tracker.leaks();
        assert_eq!(leaks.len(), 1);
        assert_eq!(leaks[0].id, id);
        assert_eq!(leaks[0].kind, ResourceKind::Texture);
        assert_eq!(tracker.live_count(), 0);
        assert_eq!(deletes(&device), 0);

        assert_eq!(tracker.reclaim(&mut device), 1);
        assert_eq!(deletes(&device), 1);
        // Already reclaimed; nothing left to delete.
        assert_eq!(tracker.reclaim(&mut device), 0);
        assert_eq!(tracker.leaks().len(), 1);
    }

    #[test]
    fn acquire_failure_registers_nothing() {
        let mut device = HeadlessDevice::new();
        device.fail_next_create(ResourceKind::Program);
        let tracker = ResourceTracker::new();
        let err = ResourceHandle::acquire(&mut device, &tracker, ResourceKind::Program).unwrap_err();
        assert_eq!(
            err,
            DeviceError::CreationFailed {
                kind: ResourceKind::Program
            }
        );
        assert_eq!(tracker.live_count(), 0);
    }

    #[test]
    fn audit_lists_outstanding_handles() {
        let mut device = HeadlessDevice::new();
        let tracker = ResourceTracker::new();
        let mut vao =
            ResourceHandle::acquire(&mut device, &tracker, ResourceKind::VertexArray).unwrap();
        let report = tracker.audit(&mut device);
        assert!(!report.is_clean());
        assert_eq!(report.outstanding.len(), 1);
        assert!(report.leaked.is_empty());

        vao.release(&mut device);
        assert!(tracker.audit(&mut device).is_clean());
    }
}

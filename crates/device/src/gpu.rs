use crate::device::{DeviceError, GraphicsDevice};
use crate::handle::{LeakReport, ResourceHandle, ResourceTracker};
use meshrig_common::ResourceKind;

/// A graphics device together with the tracker for everything it created.
pub struct Gpu<D: GraphicsDevice> {
    device: D,
    tracker: ResourceTracker,
}

impl<D: GraphicsDevice> Gpu<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            tracker: ResourceTracker::new(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Create a native object of `kind` owned by a new handle.
    pub fn acquire(&mut self, kind: ResourceKind) -> Result<ResourceHandle, DeviceError> {
        ResourceHandle::acquire(&mut self.device, &self.tracker, kind)
    }

    /// Release a handle. Idempotent.
    pub fn release(&mut self, handle: &mut ResourceHandle) -> bool {
        handle.release(&mut self.device)
    }

    /// Delete objects whose handles were dropped without release.
    pub fn reclaim(&mut self) -> usize {
        self.tracker.reclaim(&mut self.device)
    }

    /// Final audit: reclaim orphans and report leaks and survivors.
    pub fn shutdown(&mut self) -> LeakReport {
        let report = self.tracker.audit(&mut self.device);
        if report.is_clean() {
            tracing::info!("all GPU resources released");
        } else {
            tracing::warn!(
                "GPU resources not released cleanly: {} leaked, {} outstanding",
                report.leaked.len(),
                report.outstanding.len()
            );
        }
        report
    }

    pub fn into_device(self) -> D {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDevice;

    #[test]
    fn shutdown_clean_after_release() {
        let mut gpu = Gpu::new(HeadlessDevice::new());
        let mut buffer = gpu.acquire(ResourceKind::Buffer).unwrap();
        assert!(gpu.release(&mut buffer));
        assert!(gpu.shutdown().is_clean());
    }

    #[test]
    fn shutdown_reports_and_reclaims_leak() {
        let mut gpu = Gpu::new(HeadlessDevice::new());
        drop(gpu.acquire(ResourceKind::Texture).unwrap());
        assert_eq!(gpu.device().live_objects(), 1);

        let report = gpu.shutdown();
        assert_eq!(report.leaked.len(), 1);
        assert!(report.outstanding.is_empty());
        assert_eq!(gpu.device().live_objects(), 0);
    }
}

//! Window Ownership
//!
//! Surfaces and the owner/owned relationship between scene windows. The
//! display subsystem implements [`DisplaySurface`] and [`WindowSystem`]; the
//! core only tracks which windows a given window created, so that closing an
//! owner cascades to the children it put on screen.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::SceneError;

/// One on-screen window surface as seen by the core.
///
/// Implementations are provided by the embedding display subsystem; all
/// methods are invoked on the UI processing thread.
pub trait DisplaySurface: Send + Sync {
    /// Put the surface on screen.
    fn show(&self);

    /// Take the surface off screen permanently.
    fn close(&self);

    /// Whether the surface is currently showing.
    fn is_visible(&self) -> bool;
}

/// Factory for new surfaces.
pub trait WindowSystem: Send + Sync {
    /// Create a surface with the given content size.
    ///
    /// # Errors
    /// [`SceneError::Invoke`] when the display subsystem rejects creation.
    fn create_surface(
        &self,
        width: f64,
        height: f64,
    ) -> Result<Arc<dyn DisplaySurface>, SceneError>;
}

/// The set of windows a single owner window has created.
///
/// Append-only while the owner lives: closing a child does not remove it from
/// the set, so the owner can still enumerate everything it ever created and
/// reach each child's full handle, not just its surface. On owner close, only
/// the children still showing are closed.
pub struct OwnedWindows<W: DisplaySurface + ?Sized = dyn DisplaySurface> {
    windows: Mutex<Vec<Arc<W>>>,
}

impl<W: DisplaySurface + ?Sized> Default for OwnedWindows<W> {
    fn default() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
        }
    }
}

impl<W: DisplaySurface + ?Sized> OwnedWindows<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly created child window.
    pub fn register(&self, window: Arc<W>) {
        self.windows.lock().unwrap().push(window);
    }

    /// Number of children ever created, closed ones included.
    pub fn len(&self) -> usize {
        self.windows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the owned set in creation order.
    pub fn snapshot(&self) -> Vec<Arc<W>> {
        self.windows.lock().unwrap().clone()
    }

    /// Close every owned child still showing, in creation order.
    ///
    /// Children already closed are left untouched. Returns how many were
    /// closed.
    pub fn close_showing(&self) -> usize {
        let children = self.snapshot();
        let mut closed = 0;
        for child in children {
            if child.is_visible() {
                child.close();
                closed += 1;
            }
        }
        debug!("Closed {} owned window(s)", closed);
        closed
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory surface and window system used by the crate's own tests.

    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Surface tracking visibility and close count.
    #[derive(Default)]
    pub struct FakeSurface {
        visible: AtomicBool,
        close_count: AtomicUsize,
    }

    impl FakeSurface {
        pub fn shown() -> Arc<Self> {
            let surface = Arc::new(Self::default());
            surface.show();
            surface
        }

        pub fn hidden() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn close_count(&self) -> usize {
            self.close_count.load(Ordering::SeqCst)
        }
    }

    impl DisplaySurface for FakeSurface {
        fn show(&self) {
            self.visible.store(true, Ordering::SeqCst);
        }

        fn close(&self) {
            self.visible.store(false, Ordering::SeqCst);
            self.close_count.fetch_add(1, Ordering::SeqCst);
        }

        fn is_visible(&self) -> bool {
            self.visible.load(Ordering::SeqCst)
        }
    }

    /// Window system handing out [`FakeSurface`]s and recording sizes.
    #[derive(Default)]
    pub struct FakeWindowSystem {
        pub created: Mutex<Vec<(f64, f64)>>,
    }

    impl WindowSystem for FakeWindowSystem {
        fn create_surface(
            &self,
            width: f64,
            height: f64,
        ) -> Result<Arc<dyn DisplaySurface>, SceneError> {
            self.created.lock().unwrap().push((width, height));
            Ok(Arc::new(FakeSurface::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeSurface;
    use super::*;

    #[test]
    fn test_owner_close_skips_already_closed_children() {
        let owned: OwnedWindows<FakeSurface> = OwnedWindows::new();
        let showing = FakeSurface::shown();
        let hidden = FakeSurface::hidden();
        owned.register(showing.clone());
        owned.register(hidden.clone());

        let closed = owned.close_showing();

        assert_eq!(closed, 1);
        assert!(!showing.is_visible());
        assert_eq!(showing.close_count(), 1);
        assert_eq!(hidden.close_count(), 0);
    }

    #[test]
    fn test_owned_set_remains_inspectable_after_close() {
        let owned: OwnedWindows<FakeSurface> = OwnedWindows::new();
        owned.register(FakeSurface::shown());
        owned.register(FakeSurface::shown());

        owned.close_showing();

        // Closing removes nothing; the owner can still enumerate everything
        // it created.
        assert_eq!(owned.len(), 2);
        assert!(owned.snapshot().iter().all(|child| !child.is_visible()));
    }
}

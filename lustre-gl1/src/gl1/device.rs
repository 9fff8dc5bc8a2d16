//! Active device tracking.
//!
//! A thread has a single current surface. Several contexts (and several surfaces of the same
//! context) can live on a thread, so every context remembers which surface it wants to render to
//! and re-selects it lazily, right before forwarding a call to its native table, if the
//! thread-wide indicator says someone else is current.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::gl1::native::{NativeGl, Surface};

// Context and surface currently selected on this thread.
thread_local!(static ACTIVE_DEVICE: Cell<Option<(usize, Surface)>> = Cell::new(None));

static NEXT_DEVICE_ID: AtomicUsize = AtomicUsize::new(0);

/// A native table along with the surface it should render to.
#[derive(Debug)]
pub(crate) struct Device<N> {
  _a: PhantomData<*const ()>, // !Send and !Sync
  id: usize,
  target: Surface,
  native: N,
}

impl<N> Device<N>
where
  N: NativeGl,
{
  pub(crate) fn new(native: N) -> Self {
    Device {
      _a: PhantomData,
      id: NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed),
      target: Surface::Window,
      native,
    }
  }

  /// Surface subsequent calls will be forwarded to.
  pub(crate) fn target(&self) -> Surface {
    self.target
  }

  /// Change the surface subsequent calls will be forwarded to.
  ///
  /// Nothing is sent to the device until the next [`Device::gl`] call.
  pub(crate) fn set_target(&mut self, target: Surface) {
    self.target = target;
  }

  /// Native table, without selecting anything.
  ///
  /// Only suitable for queries that don’t depend on the current surface.
  pub(crate) fn native(&self) -> &N {
    &self.native
  }

  /// Select our surface if needed and give access to the native table.
  pub(crate) fn gl(&mut self) -> &mut N {
    let wanted = (self.id, self.target);

    ACTIVE_DEVICE.with(|active| {
      if active.get() != Some(wanted) {
        unsafe { self.native.make_current(self.target) };
        active.set(Some(wanted));
      }
    });

    &mut self.native
  }

  /// Forget about being current, if we are.
  pub(crate) fn release(&mut self) {
    let id = self.id;

    ACTIVE_DEVICE.with(|active| {
      if matches!(active.get(), Some((active_id, _)) if active_id == id) {
        active.set(None);
      }
    });
  }

  /// Forget about being current if `surface` is what we last selected.
  ///
  /// Used right before destroying a surface, so that a new surface reusing its handle is
  /// selected again.
  pub(crate) fn release_surface(&mut self, surface: Surface) {
    let stale = Some((self.id, surface));

    ACTIVE_DEVICE.with(|active| {
      if active.get() == stale {
        active.set(None);
      }
    });
  }

  /// Whether this device is the current one on this thread, whatever its surface.
  pub(crate) fn is_active(&self) -> bool {
    let id = self.id;
    ACTIVE_DEVICE.with(|active| matches!(active.get(), Some((active_id, _)) if active_id == id))
  }
}

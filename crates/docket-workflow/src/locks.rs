//! Per-subject critical sections.
//!
//! One async mutex per subject id, created on demand and discarded once no
//! caller holds or waits on it. Unrelated subjects never contend.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use docket_core::subject::SubjectId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = HashMap<SubjectId, Arc<AsyncMutex<()>>>;

#[derive(Debug, Default, Clone)]
pub struct SubjectLocks {
  slots: Arc<Mutex<Slots>>,
}

/// Exclusive access to one subject until dropped.
#[derive(Debug)]
pub struct SubjectGuard {
  subject_id: SubjectId,
  guard:      Option<OwnedMutexGuard<()>>,
  slots:      Arc<Mutex<Slots>>,
}

impl SubjectLocks {
  pub fn new() -> Self { Self::default() }

  /// Wait for exclusive access to `subject_id`. Waiters are admitted in the
  /// order they arrived.
  pub async fn acquire(&self, subject_id: SubjectId) -> SubjectGuard {
    let slot = lock_slots(&self.slots)
      .entry(subject_id)
      .or_default()
      .clone();
    let guard = slot.lock_owned().await;

    SubjectGuard {
      subject_id,
      guard: Some(guard),
      slots: self.slots.clone(),
    }
  }

  /// Subjects currently locked or waited on.
  pub fn len(&self) -> usize { lock_slots(&self.slots).len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Drop for SubjectGuard {
  fn drop(&mut self) {
    self.guard.take();

    let mut slots = lock_slots(&self.slots);
    if let Some(slot) = slots.get(&self.subject_id)
      && Arc::strong_count(slot) == 1
    {
      slots.remove(&self.subject_id);
    }
  }
}

fn lock_slots(slots: &Mutex<Slots>) -> MutexGuard<'_, Slots> {
  slots.lock().unwrap_or_else(PoisonError::into_inner)
}

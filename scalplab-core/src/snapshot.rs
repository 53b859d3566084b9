//! Single-writer, many-reader snapshot publication.

use std::sync::{Arc, RwLock};

/// Holds the latest published value behind an `Arc` swap. Readers get a
/// fully-formed snapshot or `None`; a publish never exposes a partially
/// built value because the `Arc` is constructed before the swap.
#[derive(Debug, Default)]
pub struct SnapshotCell<T> {
    inner: RwLock<Option<Arc<T>>>,
}

impl<T> SnapshotCell<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    pub fn publish(&self, value: Arc<T>) {
        match self.inner.write() {
            Ok(mut slot) => *slot = Some(value),
            // A poisoned lock still holds a valid Option; recover it.
            Err(poisoned) => *poisoned.into_inner() = Some(value),
        }
    }

    pub fn load(&self) -> Option<Arc<T>> {
        match self.inner.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn starts_empty() {
        let cell: SnapshotCell<u32> = SnapshotCell::new();
        assert!(cell.load().is_none());
    }

    #[test]
    fn readers_see_the_latest_publish() {
        let cell = SnapshotCell::new();
        cell.publish(Arc::new(1));
        cell.publish(Arc::new(2));
        assert_eq!(*cell.load().unwrap(), 2);
    }

    #[test]
    fn old_snapshots_stay_valid_after_republish() {
        let cell = SnapshotCell::new();
        cell.publish(Arc::new(String::from("first")));
        let held = cell.load().unwrap();
        cell.publish(Arc::new(String::from("second")));
        assert_eq!(*held, "first");
        assert_eq!(*cell.load().unwrap(), "second");
    }

    #[test]
    fn concurrent_readers_never_see_torn_values() {
        let cell = Arc::new(SnapshotCell::new());
        let writer = {
            let cell = Arc::clone(&cell);
            thread::spawn(move || {
                for i in 0..1_000u64 {
                    cell.publish(Arc::new((i, i * 2)));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        if let Some(snap) = cell.load() {
                            assert_eq!(snap.1, snap.0 * 2);
                        }
                    }
                })
            })
            .collect();
        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
    }
}

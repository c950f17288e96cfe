use std::io;

use listing_protocol::Attachment;

use crate::preview::PreviewHandle;
use crate::preview::PreviewStore;

/// Maximum number of images a listing can carry.
pub const MAX_ATTACHMENTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    #[error("You can upload maximum {max} images")]
    Capacity {
        current: usize,
        requested: usize,
        max: usize,
    },
    #[error("No image at position {}", .index + 1)]
    Index { index: usize, len: usize },
    #[error("Failed to prepare a preview for {file_name}: {source}")]
    Preview {
        file_name: String,
        #[source]
        source: io::Error,
    },
}

/// Ordered images selected for a listing, each paired with its preview.
///
/// `items` and `previews` always have the same length and are kept in insertion order. Every
/// preview is revoked exactly once: on [`remove`](Self::remove), on [`clear`](Self::clear), or
/// when the set is dropped.
pub struct AttachmentSet<S: PreviewStore> {
    items: Vec<Attachment>,
    previews: Vec<PreviewHandle>,
    store: S,
}

impl<S: PreviewStore> AttachmentSet<S> {
    pub fn new(store: S) -> Self {
        Self {
            items: Vec::new(),
            previews: Vec::new(),
            store,
        }
    }

    /// Append a batch of images, creating one preview per image.
    ///
    /// The batch is all-or-nothing: when it would exceed [`MAX_ATTACHMENTS`], or when any preview
    /// cannot be created, the set is left exactly as it was.
    pub fn add(
        &mut self,
        new_files: impl IntoIterator<Item = Attachment>,
    ) -> Result<(), AttachmentError> {
        let new_files: Vec<Attachment> = new_files.into_iter().collect();
        if self.items.len() + new_files.len() > MAX_ATTACHMENTS {
            return Err(AttachmentError::Capacity {
                current: self.items.len(),
                requested: new_files.len(),
                max: MAX_ATTACHMENTS,
            });
        }

        let mut created = Vec::with_capacity(new_files.len());
        for attachment in &new_files {
            match self.store.create(attachment) {
                Ok(handle) => created.push(handle),
                Err(source) => {
                    for handle in created {
                        self.store.revoke(handle);
                    }
                    return Err(AttachmentError::Preview {
                        file_name: attachment.file_name().to_string(),
                        source,
                    });
                }
            }
        }

        tracing::debug!(
            "attached {} image(s), {} total",
            new_files.len(),
            self.items.len() + new_files.len()
        );
        self.items.extend(new_files);
        self.previews.extend(created);
        Ok(())
    }

    /// Remove the image at `index`, revoking its preview. Later images shift down by one.
    pub fn remove(&mut self, index: usize) -> Result<Attachment, AttachmentError> {
        if index >= self.items.len() {
            return Err(AttachmentError::Index {
                index,
                len: self.items.len(),
            });
        }

        let preview = self.previews.remove(index);
        self.store.revoke(preview);
        let removed = self.items.remove(index);
        tracing::debug!(
            "removed image {} ({}), {} left",
            index + 1,
            removed.file_name(),
            self.items.len()
        );
        Ok(removed)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_ATTACHMENTS.saturating_sub(self.items.len())
    }

    /// Whether the "add image" affordance should still be offered.
    pub fn can_add_more(&self) -> bool {
        self.remaining_capacity() > 0
    }

    pub fn items(&self) -> &[Attachment] {
        &self.items
    }

    pub fn previews(&self) -> &[PreviewHandle] {
        &self.previews
    }

    /// `(image, preview)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&Attachment, &PreviewHandle)> + '_ {
        self.items.iter().zip(self.previews.iter())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Revoke every preview and forget every image.
    pub fn clear(&mut self) {
        for handle in self.previews.drain(..) {
            self.store.revoke(handle);
        }
        self.items.clear();
    }
}

impl<S: PreviewStore> Drop for AttachmentSet<S> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingPreviewStore;
    use crate::test_support::blob;
    use pretty_assertions::assert_eq;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn names(set: &AttachmentSet<RecordingPreviewStore>) -> Vec<&str> {
        set.items().iter().map(Attachment::file_name).collect()
    }

    fn set_with(files: &[&str]) -> AttachmentSet<RecordingPreviewStore> {
        let mut set = AttachmentSet::new(RecordingPreviewStore::default());
        set.add(files.iter().map(|name| blob(name))).expect("add");
        set
    }

    #[test]
    fn add_appends_in_order_with_one_preview_each() {
        let mut set = set_with(&["a.png", "b.png"]);
        set.add([blob("c.png")]).expect("add");

        assert_eq!(names(&set), vec!["a.png", "b.png", "c.png"]);
        assert_eq!(set.previews().len(), 3);
        let uris: Vec<&str> = set.previews().iter().map(PreviewHandle::uri).collect();
        assert_eq!(
            uris,
            vec!["mem://1/a.png", "mem://2/b.png", "mem://3/c.png"]
        );
    }

    #[test]
    fn add_over_capacity_rejects_whole_batch() {
        let mut set = set_with(&["1", "2", "3", "4", "5"]);
        let log = set.store().log();

        let err = set.add([blob("6")]).expect_err("should exceed capacity");
        assert!(matches!(
            err,
            AttachmentError::Capacity {
                current: 5,
                requested: 1,
                max: MAX_ATTACHMENTS
            }
        ));
        assert_eq!(err.to_string(), "You can upload maximum 5 images");
        assert_eq!(set.count(), 5);
        assert_eq!(set.previews().len(), 5);
        assert_eq!(log.borrow().created.len(), 5);
    }

    #[test]
    fn partial_batch_that_would_overflow_adds_nothing() {
        let mut set = set_with(&["1", "2", "3"]);
        assert!(set.add([blob("4"), blob("5"), blob("6")]).is_err());
        assert_eq!(names(&set), vec!["1", "2", "3"]);

        set.add([blob("4"), blob("5")]).expect("exactly fills");
        assert_eq!(set.count(), MAX_ATTACHMENTS);
        assert!(!set.can_add_more());
    }

    #[test]
    fn preview_failure_rolls_back_batch() {
        let mut set = AttachmentSet::new(RecordingPreviewStore::failing_on(2));
        let log = set.store().log();
        set.add([blob("a")]).expect("first");

        let err = set
            .add([blob("b"), blob("c"), blob("d")])
            .expect_err("third create fails");
        assert!(matches!(err, AttachmentError::Preview { ref file_name, .. } if file_name == "c"));
        assert_eq!(names(&set), vec!["a"]);
        assert_eq!(set.previews().len(), 1);
        assert_eq!(log.borrow().live(), vec![1]);
    }

    #[test]
    fn remove_preserves_order_and_revokes_once() {
        let mut set = set_with(&["a", "b", "c", "d"]);
        let log = set.store().log();
        let removed_preview = set.previews()[2].id();

        let removed = set.remove(2).expect("remove");
        assert_eq!(removed.file_name(), "c");
        assert_eq!(names(&set), vec!["a", "b", "d"]);
        assert_eq!(log.borrow().revoked, vec![removed_preview]);
        let remaining: Vec<u64> = set.previews().iter().map(PreviewHandle::id).collect();
        assert!(!remaining.contains(&removed_preview));
    }

    #[test]
    fn remove_out_of_range_is_an_error() {
        let mut set = set_with(&["a"]);
        let err = set.remove(1).expect_err("out of range");
        assert!(matches!(err, AttachmentError::Index { index: 1, len: 1 }));
        assert_eq!(err.to_string(), "No image at position 2");
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn clear_and_drop_release_every_preview() {
        let mut set = set_with(&["a", "b"]);
        let log = set.store().log();
        set.clear();
        assert!(set.is_empty());
        assert!(log.borrow().live().is_empty());

        let set = set_with(&["x", "y", "z"]);
        let log = set.store().log();
        assert_eq!(log.borrow().live().len(), 3);
        drop(set);
        assert!(log.borrow().live().is_empty());
        assert_eq!(log.borrow().revoked.len(), 3);
    }

    #[test]
    fn random_add_remove_sequences_keep_items_and_previews_paired() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut set = AttachmentSet::new(RecordingPreviewStore::default());
        let log = set.store().log();
        let mut expected: Vec<String> = Vec::new();

        for step in 0..500 {
            if rng.random_bool(0.55) {
                let batch: Vec<String> = (0..rng.random_range(1..=3))
                    .map(|i| format!("{step}-{i}"))
                    .collect();
                let result = set.add(batch.iter().map(|name| blob(name)));
                if expected.len() + batch.len() > MAX_ATTACHMENTS {
                    assert!(result.is_err());
                } else {
                    result.expect("add within capacity");
                    expected.extend(batch);
                }
            } else {
                let index = rng.random_range(0..=MAX_ATTACHMENTS);
                let result = set.remove(index);
                if index < expected.len() {
                    result.expect("remove in range");
                    expected.remove(index);
                } else {
                    assert!(result.is_err());
                }
            }

            assert_eq!(set.items().len(), set.previews().len());
            assert!(set.count() <= MAX_ATTACHMENTS);
            assert_eq!(names(&set), expected);
            assert_eq!(log.borrow().live().len(), set.count());
        }
    }
}

use std::sync::Arc;
use tokio::sync::watch;

type Snapshot<R> = Arc<Vec<R>>;

/// Single-writer record collection; every replacement is published whole.
pub struct RecordCollection<R> {
    sender: watch::Sender<Snapshot<R>>,
}

impl<R> RecordCollection<R> {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(Vec::new()));
        Self { sender }
    }

    /// Swaps in a complete sweep result.
    pub fn replace(&self, records: Vec<R>) {
        self.sender.send_replace(Arc::new(records));
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        self.sender.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.sender.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<R>> {
        self.sender.subscribe()
    }
}

impl<R> Default for RecordCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replacement_is_visible_to_subscribers() {
        let collection = RecordCollection::new();
        let mut receiver = collection.subscribe();
        assert!(collection.is_empty());

        collection.replace(vec![1, 2, 3]);
        receiver.changed().await.unwrap();
        assert_eq!(receiver.borrow().as_slice(), &[1, 2, 3]);

        collection.replace(vec![4]);
        assert_eq!(collection.snapshot().as_slice(), &[4]);
    }
}

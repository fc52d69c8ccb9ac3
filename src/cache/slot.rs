/// Fetch lifecycle of one piece of cached data.
///
/// Transitions are one-way within a session:
/// `Empty -> Pending -> Ready | Failed`. Once a result or an error exists,
/// no further automatic fetch is started; only an explicit commit replaces
/// the value. This is what guarantees at most one in-flight fetch per
/// (entity, data kind).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchSlot<T> {
    #[default]
    Empty,
    Pending,
    Ready(T),
    Failed,
}

impl<T> FetchSlot<T> {
    /// True only while nothing has been fetched and nothing is in flight.
    pub fn should_fetch(&self) -> bool {
        matches!(self, FetchSlot::Empty)
    }

    /// Claims the slot for a fetch. Returns true for exactly one caller;
    /// everyone else observes the pending outcome instead of fetching again.
    pub fn begin(&mut self) -> bool {
        if matches!(self, FetchSlot::Empty) {
            *self = FetchSlot::Pending;
            true
        } else {
            false
        }
    }

    /// Commits a result. Explicit commits are last-write-wins, so this is
    /// valid from any state.
    pub fn fulfill(&mut self, value: T) {
        *self = FetchSlot::Ready(value);
    }

    /// Marks the in-flight fetch as failed. A slot already fulfilled by a
    /// faster path keeps its value; a stale failure must not clobber it.
    pub fn fail(&mut self) {
        if matches!(self, FetchSlot::Pending) {
            *self = FetchSlot::Failed;
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FetchSlot::Ready(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FetchSlot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            FetchSlot::Ready(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_begin_wins() {
        let mut slot: FetchSlot<u32> = FetchSlot::Empty;
        assert!(slot.begin());
        assert!(!slot.begin());
    }

    #[test]
    fn no_refetch_after_result_or_failure() {
        let mut ready: FetchSlot<u32> = FetchSlot::Empty;
        ready.begin();
        ready.fulfill(7);
        assert!(!ready.should_fetch());
        assert!(!ready.begin());

        let mut failed: FetchSlot<u32> = FetchSlot::Empty;
        failed.begin();
        failed.fail();
        assert!(!failed.should_fetch());
        assert!(!failed.begin());
    }

    #[test]
    fn stale_failure_does_not_clobber_result() {
        let mut slot: FetchSlot<u32> = FetchSlot::Empty;
        slot.begin();
        slot.fulfill(7);
        slot.fail();
        assert_eq!(slot.value(), Some(&7));
    }
}

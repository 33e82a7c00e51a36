//! Best-so-far selection with strict replacement.
//!
//! Every "biggest"/"longest"/"lowest" record in this crate goes through
//! [`Best`]: a candidate replaces the current holder only when its key is
//! strictly better, so the first candidate seen wins ties.

/// Which end of the ordering wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefer {
    Highest,
    Lowest,
}

/// Holds the best candidate offered so far.
#[derive(Debug, Clone)]
pub struct Best<T> {
    prefer: Prefer,
    slot: Option<(f64, T)>,
}

impl<T> Best<T> {
    pub fn highest() -> Self {
        Self {
            prefer: Prefer::Highest,
            slot: None,
        }
    }

    pub fn lowest() -> Self {
        Self {
            prefer: Prefer::Lowest,
            slot: None,
        }
    }

    /// Offers a candidate. Returns true if it became the new best.
    pub fn offer(&mut self, key: f64, item: T) -> bool {
        let replace = match &self.slot {
            None => true,
            Some((current, _)) => match self.prefer {
                Prefer::Highest => key > *current,
                Prefer::Lowest => key < *current,
            },
        };
        if replace {
            self.slot = Some((key, item));
        }
        replace
    }

    pub fn get(&self) -> Option<&T> {
        self.slot.as_ref().map(|(_, item)| item)
    }

    pub fn into_inner(self) -> Option<T> {
        self.slot.map(|(_, item)| item)
    }
}

impl<T> Default for Best<T> {
    fn default() -> Self {
        Self::highest()
    }
}

/// Reduces an ordered sequence of keyed candidates to the best one.
pub fn select<T>(prefer: Prefer, candidates: impl IntoIterator<Item = (f64, T)>) -> Option<T> {
    let mut best = match prefer {
        Prefer::Highest => Best::highest(),
        Prefer::Lowest => Best::lowest(),
    };
    for (key, item) in candidates {
        best.offer(key, item);
    }
    best.into_inner()
}

use super::candidates::MemberCandidateSource;
use crate::remote::CandidateEntry;
use crate::shared::ids::RepositoryId;

/// Ordered member selection. The chosen list owns its order; the available
/// list is derived from the candidate source on every read, so it always
/// follows source order.
///
/// Chosen ids the source does not (or no longer) contain stay in `value()`
/// and are left for the server to accept or reject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedDualListField {
    chosen: Vec<RepositoryId>,
}

impl OrderedDualListField {
    pub fn new(initial: impl IntoIterator<Item = RepositoryId>) -> Self {
        let mut field = Self::default();
        field.set_value(initial);
        field
    }

    pub fn set_value(&mut self, ids: impl IntoIterator<Item = RepositoryId>) {
        self.chosen.clear();
        for id in ids {
            if !self.chosen.contains(&id) {
                self.chosen.push(id);
            }
        }
    }

    pub fn value(&self) -> &[RepositoryId] {
        &self.chosen
    }

    pub fn is_chosen(&self, id: &RepositoryId) -> bool {
        self.chosen.contains(id)
    }

    /// Appends available entries in the order given. Returns how many moved.
    pub fn add(&mut self, source: &MemberCandidateSource, ids: &[RepositoryId]) -> usize {
        let mut added = 0;
        for id in ids {
            if self.is_chosen(id) || !source.contains(id) {
                continue;
            }
            self.chosen.push(id.clone());
            added += 1;
        }
        added
    }

    pub fn remove(&mut self, ids: &[RepositoryId]) -> usize {
        let before = self.chosen.len();
        self.chosen.retain(|id| !ids.contains(id));
        before - self.chosen.len()
    }

    pub fn move_up(&mut self, id: &RepositoryId) -> bool {
        match self.position(id) {
            Some(pos) if pos > 0 => {
                self.chosen.swap(pos - 1, pos);
                true
            }
            _ => false,
        }
    }

    pub fn move_down(&mut self, id: &RepositoryId) -> bool {
        match self.position(id) {
            Some(pos) if pos + 1 < self.chosen.len() => {
                self.chosen.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    pub fn position(&self, id: &RepositoryId) -> Option<usize> {
        self.chosen.iter().position(|chosen| chosen == id)
    }

    pub fn available<'a>(&self, source: &'a MemberCandidateSource) -> Vec<&'a CandidateEntry> {
        source
            .entries()
            .filter(|entry| !self.is_chosen(&entry.id))
            .collect()
    }

    /// Chosen entries resolvable in the source, in chosen order.
    pub fn chosen_entries<'a>(&self, source: &'a MemberCandidateSource) -> Vec<&'a CandidateEntry> {
        self.chosen.iter().filter_map(|id| source.get(id)).collect()
    }

    /// Every chosen id in chosen order, paired with its entry when the source
    /// has one. Orphans come back with `None` so they can still be removed.
    pub fn chosen_rows<'a>(
        &'a self,
        source: &'a MemberCandidateSource,
    ) -> Vec<(&'a RepositoryId, Option<&'a CandidateEntry>)> {
        self.chosen.iter().map(|id| (id, source.get(id))).collect()
    }

    pub fn orphaned(&self, source: &MemberCandidateSource) -> Vec<&RepositoryId> {
        self.chosen
            .iter()
            .filter(|id| !source.contains(id))
            .collect()
    }
}

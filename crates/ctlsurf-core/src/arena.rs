//! Registry of banks addressed by index.
//!
//! Cursor-style navigation couples two banks: a device cursor selects a device, and
//! the device's parameter bank has to start again from its first page. Instead of
//! the two holding references to each other, both live in a [`BankArena`] and the
//! coupling is a pair of [`BankId`]s.

use crate::bank::Bank;
use crate::error::{Error, Result};
use crate::model::BankItem;

/// Index of a bank inside a [`BankArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BankId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    parent: BankId,
    child: BankId,
}

/// Owns banks of one item type and the cursor links between them.
#[derive(Debug, Clone)]
pub struct BankArena<T: BankItem> {
    banks: Vec<Bank<T>>,
    links: Vec<Link>,
}

impl<T: BankItem> BankArena<T> {
    pub fn new() -> Self {
        Self {
            banks: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn insert(&mut self, bank: Bank<T>) -> BankId {
        self.banks.push(bank);
        BankId(self.banks.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
    }

    pub fn get(&self, id: BankId) -> Option<&Bank<T>> {
        self.banks.get(id.0)
    }

    pub fn get_mut(&mut self, id: BankId) -> Option<&mut Bank<T>> {
        self.banks.get_mut(id.0)
    }

    /// Reset `child` to its first page whenever the cursor of `parent` moves.
    pub fn link(&mut self, parent: BankId, child: BankId) -> Result<()> {
        for id in [parent, child] {
            if id.0 >= self.banks.len() {
                return Err(Error::UnknownBank(id.0));
            }
        }
        if parent == child {
            return Err(Error::InvalidConfig(format!(
                "bank {} cannot follow itself",
                parent.0
            )));
        }
        let link = Link { parent, child };
        if !self.links.contains(&link) {
            self.links.push(link);
        }
        Ok(())
    }

    pub fn children(&self, parent: BankId) -> impl Iterator<Item = BankId> + '_ {
        self.links
            .iter()
            .filter(move |link| link.parent == parent)
            .map(|link| link.child)
    }

    pub fn select_next_item(&mut self, id: BankId) {
        self.move_cursor(id, Bank::select_next_item);
    }

    pub fn select_previous_item(&mut self, id: BankId) {
        self.move_cursor(id, Bank::select_previous_item);
    }

    pub fn select_item(&mut self, id: BankId, index: usize) {
        self.move_cursor(id, |bank| bank.select_item(index));
    }

    fn move_cursor(&mut self, id: BankId, navigate: impl FnOnce(&mut Bank<T>)) {
        let Some(bank) = self.banks.get_mut(id.0) else {
            tracing::error!("Cursor move on unknown bank {}", id.0);
            return;
        };
        let before = bank.cursor_index();
        navigate(bank);
        if bank.cursor_index() == before {
            return;
        }
        self.reset_descendants(id);
    }

    fn reset_descendants(&mut self, parent: BankId) {
        let mut pending: Vec<BankId> = self.children(parent).collect();
        let mut visited = vec![parent];
        while let Some(child) = pending.pop() {
            if visited.contains(&child) {
                continue;
            }
            visited.push(child);
            if let Some(bank) = self.banks.get_mut(child.0) {
                bank.scroll_to(0);
                bank.clear_selection();
            }
            pending.extend(self.children(child));
        }
    }
}

impl<T: BankItem> Default for BankArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

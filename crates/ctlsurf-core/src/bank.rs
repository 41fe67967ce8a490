//! Fixed-size paged window over a host collection.
//!
//! A [`Bank`] mirrors a host-owned ordered collection (tracks, devices, parameters,
//! scenes) and exposes `page_size` slots starting at the scroll position. Slots past
//! the end of the collection hold stable placeholders that report `exists() == false`.
//!
//! The cursor (the "selected" item) is tracked independently of the window. When
//! single-step selection leaves the window, the window follows by a whole page.
//!
//! # Example
//!
//! ```
//! use ctlsurf_core::{Bank, BankItem, ChannelState};
//!
//! let mut bank: Bank<ChannelState> = Bank::new(8);
//! bank.set_items((0..20).map(|i| ChannelState::new(i, format!("Track {}", i + 1))).collect());
//!
//! for _ in 0..9 {
//!     bank.select_next_item();
//! }
//! assert_eq!(bank.cursor_index(), Some(8));
//! assert_eq!(bank.scroll_position(), 8);
//! assert_eq!(bank.get_item(0).name(), "Track 9");
//! ```

use crate::model::BankItem;

/// Object-safe paging interface, used by modes that only navigate a bank.
pub trait Pageable {
    fn page_size(&self) -> usize;
    fn item_count(&self) -> usize;
    fn scroll_position(&self) -> usize;
    fn can_scroll_page_forward(&self) -> bool;
    fn can_scroll_page_backward(&self) -> bool;
    fn scroll_page_forward(&mut self);
    fn scroll_page_backward(&mut self);
    fn select_next_item(&mut self);
    fn select_previous_item(&mut self);
}

/// Paged window over a host collection of `T`.
#[derive(Debug, Clone)]
pub struct Bank<T: BankItem> {
    page_size: usize,
    items: Vec<T>,
    placeholders: Vec<T>,
    scroll_position: usize,
    cursor: Option<usize>,
}

impl<T: BankItem> Bank<T> {
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    pub fn new(page_size: usize) -> Self {
        assert!(page_size > 0, "bank page size must be positive");
        Self {
            page_size,
            items: Vec::new(),
            placeholders: (0..page_size).map(T::placeholder).collect(),
            scroll_position: 0,
            cursor: None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn scroll_position(&self) -> usize {
        self.scroll_position
    }

    /// Absolute index of the selected item.
    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    /// Largest valid scroll position.
    pub fn max_scroll_position(&self) -> usize {
        self.items.len().saturating_sub(self.page_size)
    }

    /// Number of pages needed to show every item.
    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    /// Page the window's first slot falls on.
    pub fn current_page(&self) -> usize {
        self.scroll_position / self.page_size
    }

    // ==================== Host-side mutation ====================

    /// Replace the whole collection.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.refresh();
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Shrink the collection to `len` items.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
        self.refresh();
    }

    /// Mutable access by absolute index, for the host adapter.
    pub fn item_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Re-clamp scroll position and cursor after the collection changed size.
    pub fn refresh(&mut self) {
        self.scroll_position = self.scroll_position.min(self.max_scroll_position());
        self.cursor = match self.cursor {
            Some(_) if self.items.is_empty() => None,
            Some(cursor) => Some(cursor.min(self.items.len() - 1)),
            None => None,
        };
    }

    // ==================== Window access ====================

    /// Item in window slot `slot`, or the slot's placeholder.
    ///
    /// Slots outside `0..page_size` also resolve to a placeholder and are logged.
    pub fn get_item(&self, slot: usize) -> &T {
        if slot >= self.page_size {
            tracing::error!(
                "Bank slot {} out of range (page size {})",
                slot,
                self.page_size
            );
            return &self.placeholders[self.page_size - 1];
        }
        self.items
            .get(self.scroll_position + slot)
            .unwrap_or(&self.placeholders[slot])
    }

    /// Mutable access to an existing item in the window.
    pub fn get_item_mut(&mut self, slot: usize) -> Option<&mut T> {
        if slot >= self.page_size {
            return None;
        }
        self.items.get_mut(self.scroll_position + slot)
    }

    /// Absolute index shown in `slot`, if an item is there.
    pub fn absolute_index(&self, slot: usize) -> Option<usize> {
        let index = self.scroll_position + slot;
        (slot < self.page_size && index < self.items.len()).then_some(index)
    }

    /// Iterator over the window slots, placeholders included.
    pub fn window(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.page_size).map(move |slot| self.get_item(slot))
    }

    // ==================== Scrolling ====================

    pub fn can_scroll_page_forward(&self) -> bool {
        self.scroll_position < self.max_scroll_position()
    }

    pub fn can_scroll_page_backward(&self) -> bool {
        self.scroll_position > 0
    }

    pub fn scroll_page_forward(&mut self) {
        self.scroll_to(self.scroll_position + self.page_size);
    }

    pub fn scroll_page_backward(&mut self) {
        self.scroll_to(self.scroll_position.saturating_sub(self.page_size));
    }

    /// Scroll by a single item.
    pub fn scroll_forward(&mut self) {
        self.scroll_to(self.scroll_position + 1);
    }

    pub fn scroll_backward(&mut self) {
        self.scroll_to(self.scroll_position.saturating_sub(1));
    }

    /// Clamped to `[0, max_scroll_position]`.
    pub fn scroll_to(&mut self, position: usize) {
        self.scroll_position = position.min(self.max_scroll_position());
    }

    // ==================== Selection ====================

    pub fn selected_item(&self) -> Option<&T> {
        self.cursor.and_then(|index| self.items.get(index))
    }

    pub fn selected_item_mut(&mut self) -> Option<&mut T> {
        self.cursor.and_then(|index| self.items.get_mut(index))
    }

    /// Select by absolute index, scrolling to the page that contains it.
    pub fn select_item(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        self.cursor = Some(index);
        if !self.is_in_window(index) {
            self.scroll_to(index / self.page_size * self.page_size);
        }
    }

    /// With no selection, the first visible item is selected.
    pub fn select_next_item(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = match self.cursor {
            None => self.scroll_position,
            Some(cursor) => (cursor + 1).min(self.items.len() - 1),
        };
        self.move_cursor(next);
    }

    /// With no selection, the last visible item is selected.
    pub fn select_previous_item(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let previous = match self.cursor {
            None => (self.scroll_position + self.page_size).min(self.items.len()) - 1,
            Some(cursor) => cursor.saturating_sub(1),
        };
        self.move_cursor(previous);
    }

    /// Scroll a page forward and select its first item.
    pub fn select_next_page(&mut self) {
        if !self.can_scroll_page_forward() {
            return;
        }
        self.scroll_page_forward();
        self.cursor = Some(self.scroll_position);
    }

    pub fn select_previous_page(&mut self) {
        if !self.can_scroll_page_backward() {
            return;
        }
        self.scroll_page_backward();
        self.cursor = Some(self.scroll_position);
    }

    pub fn clear_selection(&mut self) {
        self.cursor = None;
    }

    fn is_in_window(&self, index: usize) -> bool {
        index >= self.scroll_position && index < self.scroll_position + self.page_size
    }

    /// Steps out of the window follow by one page. A cursor that was further
    /// away lands on the page that contains it.
    fn move_cursor(&mut self, index: usize) {
        self.cursor = Some(index);
        if self.is_in_window(index) {
            return;
        }
        if index >= self.scroll_position + self.page_size {
            self.scroll_page_forward();
        } else {
            self.scroll_page_backward();
        }
        if !self.is_in_window(index) {
            self.scroll_to(index / self.page_size * self.page_size);
        }
    }
}

impl<T: BankItem> Pageable for Bank<T> {
    fn page_size(&self) -> usize {
        Bank::page_size(self)
    }

    fn item_count(&self) -> usize {
        Bank::item_count(self)
    }

    fn scroll_position(&self) -> usize {
        Bank::scroll_position(self)
    }

    fn can_scroll_page_forward(&self) -> bool {
        Bank::can_scroll_page_forward(self)
    }

    fn can_scroll_page_backward(&self) -> bool {
        Bank::can_scroll_page_backward(self)
    }

    fn scroll_page_forward(&mut self) {
        Bank::scroll_page_forward(self)
    }

    fn scroll_page_backward(&mut self) {
        Bank::scroll_page_backward(self)
    }

    fn select_next_item(&mut self) {
        Bank::select_next_item(self)
    }

    fn select_previous_item(&mut self) {
        Bank::select_previous_item(self)
    }
}

/// A unit's share of a bank that spans several physical units.
///
/// A rig of one main unit and two extenders uses a bank with a page size of
/// `3 * 8`; unit `n` addresses bank slots `n * 8 .. n * 8 + 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSlice {
    pub unit: usize,
    pub width: usize,
}

impl UnitSlice {
    pub fn new(unit: usize, width: usize) -> Self {
        Self { unit, width }
    }

    /// The whole bank, for single-unit surfaces.
    pub fn single(width: usize) -> Self {
        Self { unit: 0, width }
    }

    /// Bank slot for a unit-local slot.
    #[inline]
    pub fn bank_slot(&self, local: usize) -> usize {
        self.unit * self.width + local
    }

    pub fn contains(&self, bank_slot: usize) -> bool {
        bank_slot >= self.unit * self.width && bank_slot < (self.unit + 1) * self.width
    }
}

use crate::grid::engine::GridEngine;

/// Click-handling state for the grid: which positions carry an edit handler,
/// how many page-level outside-click handlers are registered, and which day
/// is currently being edited.
///
/// Handlers are tracked explicitly so stale ones can be detached by reference
/// instead of cloning nodes, and the editing singleton is keyed by day number
/// so an open editor follows its day through a re-layout.
#[derive(Debug, Default)]
pub struct NoteEditor {
    block_handlers: Vec<usize>,
    outside_handlers: usize,
    editing: Option<u32>,
}

impl NoteEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detaches every previously attached handler, then attaches fresh ones
    /// to the currently active cells plus exactly one outside-click handler.
    /// Must run after every reconcile, since the cell set may have changed.
    pub fn rebind(&mut self, grid: &GridEngine) {
        self.block_handlers.clear();
        self.block_handlers.extend(grid.active_positions());
        self.outside_handlers = 1;

        if let Some(day) = self.editing {
            if grid.position_of_day(day).is_none() {
                self.editing = None;
            }
        }
    }

    pub fn editing_day(&self) -> Option<u32> {
        self.editing
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Dispatches a click on `position` to every handler bound there and
    /// returns how many editors that opened. With correct handler bookkeeping
    /// the result is never more than one; a click on a cell with no handler
    /// falls through to the outside-click path.
    pub fn click(&mut self, position: usize, grid: &mut GridEngine) -> usize {
        let hits = self
            .block_handlers
            .iter()
            .filter(|&&bound| bound == position)
            .count();
        if hits == 0 {
            self.outside_click(grid);
            return 0;
        }

        let mut opened = 0;
        for _ in 0..hits {
            if self.activate(position, grid) {
                opened += 1;
            }
        }
        opened
    }

    /// Commits any other open editor before this cell's editor takes focus,
    /// creating an empty note for the cell if it has none yet.
    fn activate(&mut self, position: usize, grid: &mut GridEngine) -> bool {
        let Some(day) = grid.day_at(position) else {
            return false;
        };

        if let Some(current) = self.editing {
            if current != day {
                commit_note(grid, current);
            }
        }

        if let Some(cell) = grid.cell_for_day_mut(day) {
            if cell.notes.is_empty() {
                cell.notes.push(String::new());
            }
        }

        self.editing = Some(day);
        true
    }

    /// The page-level handler: closes any open editor. Fires once per
    /// registered outside handler, which rebind keeps at exactly one.
    pub fn outside_click(&mut self, grid: &mut GridEngine) {
        for _ in 0..self.outside_handlers {
            if let Some(day) = self.editing.take() {
                commit_note(grid, day);
            }
        }
    }

    pub fn input_char(&mut self, c: char, grid: &mut GridEngine) -> bool {
        let Some(day) = self.editing else {
            return false;
        };
        if let Some(note) = grid
            .cell_for_day_mut(day)
            .and_then(|cell| cell.notes.last_mut())
        {
            note.push(c);
            return true;
        }
        false
    }

    pub fn backspace(&mut self, grid: &mut GridEngine) -> bool {
        let Some(day) = self.editing else {
            return false;
        };
        if let Some(note) = grid
            .cell_for_day_mut(day)
            .and_then(|cell| cell.notes.last_mut())
        {
            return note.pop().is_some();
        }
        false
    }
}

/// Ends the editing state for `day`: notes whose text content is empty after
/// markup is stripped are deleted, everything else is retained as committed.
pub fn commit_note(grid: &mut GridEngine, day: u32) {
    if let Some(cell) = grid.cell_for_day_mut(day) {
        cell.notes
            .retain(|note| !strip_markup(note).trim().is_empty());
    }
}

/// Text content of a markup string: everything outside angle-bracket tags.
pub fn strip_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

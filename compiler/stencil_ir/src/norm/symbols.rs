//! Program symbol table.
//!
//! Frames are stored in a flat vector and linked by parent ids; the
//! current frame is navigated with `push_block`/`pop`. Every allocation,
//! in any frame, appends to the one program-wide symbol list, so a slot is
//! never renumbered once handed out.

use std::fmt;

use rustc_hash::FxHashMap;

/// Identifier of a lexical frame.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameId(u32);

impl FrameId {
    /// The template's own frame.
    pub const ROOT: FrameId = FrameId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ROOT {
            write!(f, "FrameId::ROOT")
        } else {
            write!(f, "FrameId({})", self.0)
        }
    }
}

#[derive(Clone, Debug)]
struct Frame {
    parent: Option<FrameId>,
    locals: FxHashMap<String, u32>,
}

/// Slots, upvars and eval state for one compiled program.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    frames: Vec<Frame>,
    current: FrameId,
    /// `symbols[slot - 1]` is the name held in `slot`.
    symbols: Vec<String>,
    /// Program-level `@arg` and `&block` slots.
    named: FxHashMap<String, u32>,
    upvars: Vec<String>,
    upvar_index: FxHashMap<String, u32>,
    /// Names the embedding scope provides in strict mode.
    template_locals: Vec<String>,
    used_locals: Vec<String>,
    has_eval: bool,
}

impl SymbolTable {
    pub fn new(template_locals: Vec<String>) -> Self {
        let root = Frame {
            parent: None,
            locals: FxHashMap::default(),
        };
        SymbolTable {
            frames: vec![root],
            current: FrameId::ROOT,
            symbols: Vec::new(),
            named: FxHashMap::default(),
            upvars: Vec::new(),
            upvar_index: FxHashMap::default(),
            template_locals,
            used_locals: Vec::new(),
            has_eval: false,
        }
    }

    pub fn current(&self) -> FrameId {
        self.current
    }

    /// Enter a child frame declaring `params`, returning their slots.
    pub fn push_block(&mut self, params: &[String]) -> Vec<u32> {
        let id = FrameId(u32::try_from(self.frames.len()).unwrap_or(u32::MAX));
        self.frames.push(Frame {
            parent: Some(self.current),
            locals: FxHashMap::default(),
        });
        self.current = id;
        params.iter().map(|name| self.declare(name)).collect()
    }

    /// Leave the current frame. The root frame is never popped.
    pub fn pop(&mut self) {
        if let Some(parent) = self.frames[self.current.index()].parent {
            self.current = parent;
        }
    }

    /// Bind `name` in the current frame. Redeclaring a name in the same
    /// frame returns its existing slot.
    pub fn declare(&mut self, name: &str) -> u32 {
        if let Some(&slot) = self.frames[self.current.index()].locals.get(name) {
            return slot;
        }
        let slot = self.push_symbol(name);
        self.frames[self.current.index()]
            .locals
            .insert(name.to_owned(), slot);
        slot
    }

    /// Innermost binding of `name`, walking out to the root frame.
    pub fn lookup_local(&self, name: &str) -> Option<u32> {
        let mut frame = Some(self.current);
        while let Some(id) = frame {
            let data = &self.frames[id.index()];
            if let Some(&slot) = data.locals.get(name) {
                return Some(slot);
            }
            frame = data.parent;
        }
        None
    }

    pub fn is_template_local(&self, name: &str) -> bool {
        self.template_locals.iter().any(|local| local == name)
    }

    /// Slot for the named argument `@name` (pass the name with its `@`).
    pub fn allocate_named(&mut self, name: &str) -> u32 {
        self.program_slot(name.to_owned())
    }

    /// Slot for a named block. `inverse` is an alias of `else`.
    pub fn allocate_block(&mut self, name: &str) -> u32 {
        let name = if name == "inverse" { "else" } else { name };
        self.program_slot(format!("&{name}"))
    }

    /// Upvar index of a free variable, in first-use order.
    pub fn allocate_free(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.upvar_index.get(name) {
            return index;
        }
        let index = u32::try_from(self.upvars.len()).unwrap_or(u32::MAX);
        self.upvars.push(name.to_owned());
        self.upvar_index.insert(name.to_owned(), index);
        index
    }

    /// Record a strict-mode reference to a template local and return its
    /// upvar index.
    pub fn use_template_local(&mut self, name: &str) -> u32 {
        if !self.used_locals.iter().any(|used| used == name) {
            self.used_locals.push(name.to_owned());
        }
        self.allocate_free(name)
    }

    pub fn set_has_eval(&mut self) {
        self.has_eval = true;
    }

    /// Every slot visible from the current frame, ascending.
    pub fn eval_info(&self) -> Vec<u32> {
        let mut slots: Vec<u32> = self.named.values().copied().collect();
        let mut frame = Some(self.current);
        while let Some(id) = frame {
            let data = &self.frames[id.index()];
            slots.extend(data.locals.values().copied());
            frame = data.parent;
        }
        slots.sort_unstable();
        slots.dedup();
        slots
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn upvars(&self) -> &[String] {
        &self.upvars
    }

    pub fn used_locals(&self) -> &[String] {
        &self.used_locals
    }

    pub fn has_eval(&self) -> bool {
        self.has_eval
    }

    fn program_slot(&mut self, name: String) -> u32 {
        if let Some(&slot) = self.named.get(&name) {
            return slot;
        }
        let slot = self.push_symbol(&name);
        self.named.insert(name, slot);
        slot
    }

    fn push_symbol(&mut self, name: &str) -> u32 {
        self.symbols.push(name.to_owned());
        u32::try_from(self.symbols.len()).unwrap_or(u32::MAX)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new(Vec::new())
    }
}

#[cfg(test)]
mod tests;

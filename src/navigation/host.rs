//! # Navigation Host
//!
//! A single back-stack of presented screens. The host knows nothing about
//! coordinators: it only records what became visible and what disappeared,
//! as a queue of `NavigationEvent`s for the orchestrator to reconcile.

use std::collections::VecDeque;
use std::fmt;

use log::debug;

/// Opaque token tying one presented screen to the coordinator that created it.
///
/// Minted by `CoordinatorTree::assign_screen`, compared by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub(crate) u64);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Push,
    Pop,
    Replace,
}

/// One visible change of the back-stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Top of the stack before the transition.
    pub from: Option<ScreenId>,
    /// Top of the stack after the transition.
    pub to: Option<ScreenId>,
    pub direction: Direction,
    /// The full stack, bottom first, right after the transition.
    pub stack: Vec<ScreenId>,
}

impl NavigationEvent {
    /// The previous top, if it is no longer anywhere in the stack.
    pub fn disappeared(&self) -> Option<ScreenId> {
        self.from.filter(|from| !self.stack.contains(from))
    }
}

/// Platform-style navigation primitive the coordinators present into.
pub trait NavigationHost<S> {
    /// Pushes `screen` on top of the stack.
    fn push(&mut self, id: ScreenId, screen: S);

    /// Replaces the whole stack with `screen`.
    fn set_root(&mut self, id: ScreenId, screen: S);

    /// Pops the top screen. The root screen is never popped.
    fn pop(&mut self) -> Option<(ScreenId, S)>;

    /// Screen ids, bottom first.
    fn stack(&self) -> Vec<ScreenId>;

    /// Takes the oldest transition not yet handled.
    fn next_event(&mut self) -> Option<NavigationEvent>;
}

/// In-memory `NavigationHost`.
pub struct BackStack<S> {
    entries: Vec<(ScreenId, S)>,
    events: VecDeque<NavigationEvent>,
}

impl<S> Default for BackStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> BackStack<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            events: VecDeque::new(),
        }
    }

    pub fn top(&self) -> Option<&S> {
        self.entries.last().map(|(_, s)| s)
    }

    pub fn top_mut(&mut self) -> Option<&mut S> {
        self.entries.last_mut().map(|(_, s)| s)
    }

    pub fn top_id(&self) -> Option<ScreenId> {
        self.entries.last().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    fn record(&mut self, from: Option<ScreenId>, direction: Direction) {
        let event = NavigationEvent {
            from,
            to: self.top_id(),
            direction,
            stack: self.entries.iter().map(|(id, _)| *id).collect(),
        };
        debug!("Back-stack {:?}: {:?} -> {:?}", direction, event.from, event.to);
        self.events.push_back(event);
    }
}

impl<S> NavigationHost<S> for BackStack<S> {
    fn push(&mut self, id: ScreenId, screen: S) {
        let from = self.top_id();
        self.entries.push((id, screen));
        self.record(from, Direction::Push);
    }

    fn set_root(&mut self, id: ScreenId, screen: S) {
        let from = self.top_id();
        self.entries.clear();
        self.entries.push((id, screen));
        self.record(from, Direction::Replace);
    }

    fn pop(&mut self) -> Option<(ScreenId, S)> {
        if self.entries.len() <= 1 {
            return None;
        }
        let from = self.top_id();
        let popped = self.entries.pop();
        self.record(from, Direction::Pop);
        popped
    }

    fn stack(&self) -> Vec<ScreenId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    fn next_event(&mut self) -> Option<NavigationEvent> {
        self.events.pop_front()
    }
}

//! Editor notifications
//!
//! Listeners are plain closures registered on the editor. Every event is
//! delivered synchronously, in registration order, before the triggering
//! call returns.

use pr_core::Note;

/// Which edge a resize gesture moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
}

/// Something observable happened in the editor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The editor is attached and ready
    Ready,
    /// Notes were replaced by a load
    Load { note_count: usize, track_count: usize },
    /// The hovered note changed (`None` when the pointer left all notes)
    NoteHover(Option<Note>),
    /// A note was moved
    NoteDrag { before: Note, after: Note },
    /// A note was resized
    NoteResize {
        before: Note,
        after: Note,
        edge: ResizeEdge,
    },
    NoteCreate(Note),
    /// Notes were removed
    NoteDelete(Vec<Note>),
    /// The selection changed; carries the new selection
    SelectionChange(Vec<Note>),
    /// The note list changed; carries a snapshot of every note
    NotesChange(Vec<Note>),
    /// The editor is being torn down
    Destroy,
}

/// Event discriminant, for filtered subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    Load,
    NoteHover,
    NoteDrag,
    NoteResize,
    NoteCreate,
    NoteDelete,
    SelectionChange,
    NotesChange,
    Destroy,
}

impl EditorEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EditorEvent::Ready => EventKind::Ready,
            EditorEvent::Load { .. } => EventKind::Load,
            EditorEvent::NoteHover(_) => EventKind::NoteHover,
            EditorEvent::NoteDrag { .. } => EventKind::NoteDrag,
            EditorEvent::NoteResize { .. } => EventKind::NoteResize,
            EditorEvent::NoteCreate(_) => EventKind::NoteCreate,
            EditorEvent::NoteDelete(_) => EventKind::NoteDelete,
            EditorEvent::SelectionChange(_) => EventKind::SelectionChange,
            EditorEvent::NotesChange(_) => EventKind::NotesChange,
            EditorEvent::Destroy => EventKind::Destroy,
        }
    }
}

/// Handle returned by subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&EditorEvent)>;

/// Listener registry
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Option<EventKind>, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event
    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> ListenerId {
        self.register(None, Box::new(listener))
    }

    /// Receive only events of one kind
    pub fn subscribe_to(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&EditorEvent) + 'static,
    ) -> ListenerId {
        self.register(Some(kind), Box::new(listener))
    }

    fn register(&mut self, kind: Option<EventKind>, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, kind, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: EditorEvent) {
        log::trace!("Editor event: {:?}", event.kind());
        let kind = event.kind();
        for (_, filter, listener) in &mut self.listeners {
            if filter.is_none_or(|k| k == kind) {
                listener(&event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_and_emit() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |e| sink.borrow_mut().push(e.kind()));

        bus.emit(EditorEvent::Ready);
        bus.emit(EditorEvent::Destroy);
        assert_eq!(*seen.borrow(), vec![EventKind::Ready, EventKind::Destroy]);
    }

    #[test]
    fn test_filtered_subscription() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        bus.subscribe_to(EventKind::NoteHover, move |_| *sink.borrow_mut() += 1);

        bus.emit(EditorEvent::Ready);
        bus.emit(EditorEvent::NoteHover(None));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = bus.subscribe(move |_| *sink.borrow_mut() += 1);

        bus.emit(EditorEvent::Ready);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(EditorEvent::Ready);
        assert_eq!(*count.borrow(), 1);
        assert!(bus.is_empty());
    }
}

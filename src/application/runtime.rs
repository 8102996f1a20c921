use std::cell::Cell;
use std::rc::Rc;

use crate::domain::errors::ValidationError;
use crate::domain::repositories::{DomHost, KeyValueStore, SnapshotSource, Timer, WalletControl};

/// The set of collaborators one page runs against.
pub trait Runtime: 'static {
    type Source: SnapshotSource + 'static;
    type Control: WalletControl + 'static;
    type Dom: DomHost + 'static;
    type Store: KeyValueStore + 'static;
    type Timer: Timer + 'static;
}

pub struct Ports<R: Runtime> {
    pub source: Rc<R::Source>,
    pub control: Rc<R::Control>,
    pub dom: Rc<R::Dom>,
    pub store: Rc<R::Store>,
    pub timer: Rc<R::Timer>,
}

impl<R: Runtime> Clone for Ports<R> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            control: Rc::clone(&self.control),
            dom: Rc::clone(&self.dom),
            store: Rc::clone(&self.store),
            timer: Rc::clone(&self.timer),
        }
    }
}

/// Transaction-history page requested by the user, shared between the page
/// selector and the binder that sends it.
#[derive(Debug, Clone, Default)]
pub struct PageSelection(Rc<Cell<Option<u32>>>);

impl PageSelection {
    pub fn select(&self, page: u32) -> Result<(), ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPage("pages start at 1".to_string()));
        }
        self.0.set(Some(page));
        Ok(())
    }

    /// `None` until a page was picked; the server then sends its default.
    pub fn current(&self) -> Option<u32> {
        self.0.get()
    }
}

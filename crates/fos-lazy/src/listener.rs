//! Listener hooks
//!
//! Three optional hooks: `load` per applied attribute, `call` per visibility
//! evaluation, `error` for setup problems.

use crate::{LazyLoadResult, LazyLoadState};

/// Receives lazy-load notifications. Every hook defaults to a no-op.
pub trait LazyLoadListener {
    fn load(&mut self, _state: &LazyLoadState, _result: &LazyLoadResult) {}

    fn call(&mut self, _state: &LazyLoadState, _result: &LazyLoadResult) {}

    fn error(&mut self, _state: &LazyLoadState, _result: &LazyLoadResult) {}
}

/// No listener
impl LazyLoadListener for () {}

impl<L: LazyLoadListener + ?Sized> LazyLoadListener for &mut L {
    fn load(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        (**self).load(state, result);
    }

    fn call(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        (**self).call(state, result);
    }

    fn error(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        (**self).error(state, result);
    }
}

impl<L: LazyLoadListener + ?Sized> LazyLoadListener for Box<L> {
    fn load(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        (**self).load(state, result);
    }

    fn call(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        (**self).call(state, result);
    }

    fn error(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        (**self).error(state, result);
    }
}

type Hook = Box<dyn FnMut(&LazyLoadState, &LazyLoadResult)>;

/// Closure-based listener with optional slots
#[derive(Default)]
pub struct Callbacks {
    load: Option<Hook>,
    call: Option<Hook>,
    error: Option<Hook>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load(mut self, hook: impl FnMut(&LazyLoadState, &LazyLoadResult) + 'static) -> Self {
        self.load = Some(Box::new(hook));
        self
    }

    pub fn on_call(mut self, hook: impl FnMut(&LazyLoadState, &LazyLoadResult) + 'static) -> Self {
        self.call = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl FnMut(&LazyLoadState, &LazyLoadResult) + 'static) -> Self {
        self.error = Some(Box::new(hook));
        self
    }
}

impl LazyLoadListener for Callbacks {
    fn load(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        if let Some(hook) = self.load.as_mut() {
            hook(state, result);
        }
    }

    fn call(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        if let Some(hook) = self.call.as_mut() {
            hook(state, result);
        }
    }

    fn error(&mut self, state: &LazyLoadState, result: &LazyLoadResult) {
        if let Some(hook) = self.error.as_mut() {
            hook(state, result);
        }
    }
}

impl std::fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("load", &self.load.is_some())
            .field("call", &self.call.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

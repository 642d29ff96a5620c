use std::fmt;
use std::rc::Rc;

use crate::error::BoxError;
use crate::Millis;

pub type CallbackResult = Result<(), BoxError>;

/// Conversion from a callback's return value into a [`CallbackResult`].
///
/// Lets plain closures return `()` while fallible ones return a `Result`.
pub trait IntoCallbackResult {
    fn into_callback_result(self) -> CallbackResult;
}

impl IntoCallbackResult for () {
    fn into_callback_result(self) -> CallbackResult {
        Ok(())
    }
}

impl<E> IntoCallbackResult for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_callback_result(self) -> CallbackResult {
        self.map_err(Into::into)
    }
}

/// Type-erased timer callback, invoked with the elapsed milliseconds.
///
/// Shared rather than owned so that a nested flush can invoke the callback
/// that is already running further up the stack.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(Millis) -> CallbackResult>);

impl Callback {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(Millis) -> R + 'static,
        R: IntoCallbackResult,
    {
        Self(Rc::new(move |elapsed| f(elapsed).into_callback_result()))
    }

    pub fn call(&self, elapsed: Millis) -> CallbackResult {
        (self.0)(elapsed)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

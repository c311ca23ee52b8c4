//! The greeting shown on the landing page.

/// Something that produces a greeting.
pub trait Greeter {
    /// Returns the greeting text.
    fn message(&self) -> &'static str;
}

/// The fixed `Hello, World!` greeting.
///
/// Holds no state, so any number of callers may share one instance.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HelloWorld;

impl HelloWorld {
    /// The text returned by [`Greeter::message`].
    pub const MESSAGE: &'static str = "Hello, World!";

    /// Create new `HelloWorld`.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Greeter for HelloWorld {
    #[inline]
    fn message(&self) -> &'static str {
        Self::MESSAGE
    }
}

//! Initialization errors

use platform::PinNumber;

/// Which line a component was opening when initialization failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    /// Encoder channel A
    A,
    /// Encoder channel B
    B,
    /// Knob push-button
    Button,
    /// Toggle switch
    Switch,
    /// Status LED
    Led,
}

impl PinRole {
    /// Short label for log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::Button => "Button",
            Self::Switch => "Switch",
            Self::Led => "LED",
        }
    }
}

impl core::fmt::Display for PinRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pin could not be opened or read during initialization.
///
/// Lines opened before the failure have already been released when this is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitError<E> {
    /// Role of the failing line
    pub role: PinRole,
    /// Pin number of the failing line
    pub pin: PinNumber,
    /// Pin-controller error
    pub source: E,
}

impl<E> InitError<E> {
    pub(crate) fn new(role: PinRole, pin: PinNumber) -> impl FnOnce(E) -> Self {
        move |source| Self { role, pin, source }
    }
}

impl<E> core::fmt::Display for InitError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "failed to open {} ({})", self.pin, self.role)
    }
}

#[cfg(any(test, feature = "std"))]
impl<E> std::error::Error for InitError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

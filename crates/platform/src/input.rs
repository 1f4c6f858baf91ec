//! Input event vocabulary
//!
//! Everything the pipeline publishes to the controller is an [`InputEvent`].

use core::fmt::Write as _;

/// Input device trait for the consumer side of the event pipeline
pub trait InputDevice {
    /// Wait for next input event (async, power-efficient)
    fn wait_for_event(&mut self) -> impl core::future::Future<Output = InputEvent>;

    /// Poll for event (non-blocking)
    fn poll_event(&mut self) -> Option<InputEvent>;
}

/// Input events from the knob, its switch and the tag reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Push-button gesture
    Button(ButtonGesture),
    /// Toggle switch changed position
    Switch(SwitchEvent),
    /// Knob rotated
    Rotation(RotationEvent),
    /// A tag was presented to the reader
    TagRead(TagRead),
}

/// Semantic classification of the push-button timing pattern.
///
/// `Click` and `DoubleClick` are release events as well: a consumer that
/// only tracks "button is up again" should use [`ButtonGesture::implies_release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonGesture {
    /// Button went down
    Pressed,
    /// Button went up without completing a click or double-click
    Released,
    /// Single click, reported once the double-click window closed
    Click,
    /// Second release inside the double-click window
    DoubleClick,
    /// Button held past the long-press threshold
    LongPress,
}

impl ButtonGesture {
    const PRESSED: u8 = 0b0_0001;
    const RELEASED: u8 = 0b0_0010;
    const CLICK: u8 = 0b0_0110;
    const DOUBLE_CLICK: u8 = 0b0_1010;
    const LONG_PRESS: u8 = 0b1_0000;

    /// Flag encoding: click variants carry the release bit.
    pub const fn bits(self) -> u8 {
        match self {
            Self::Pressed => Self::PRESSED,
            Self::Released => Self::RELEASED,
            Self::Click => Self::CLICK,
            Self::DoubleClick => Self::DOUBLE_CLICK,
            Self::LongPress => Self::LONG_PRESS,
        }
    }

    const fn has(self, flag: u8) -> bool {
        self.bits() & flag == flag
    }

    /// `true` for [`Pressed`](Self::Pressed).
    pub const fn is_pressed(self) -> bool {
        self.has(Self::PRESSED)
    }

    /// `true` for every gesture that ends with the button up.
    pub const fn implies_release(self) -> bool {
        self.has(Self::RELEASED)
    }

    /// `true` for [`Click`](Self::Click).
    pub const fn is_click(self) -> bool {
        self.has(Self::CLICK)
    }

    /// `true` for [`DoubleClick`](Self::DoubleClick).
    pub const fn is_double_click(self) -> bool {
        self.has(Self::DOUBLE_CLICK)
    }

    /// `true` for [`LongPress`](Self::LongPress).
    pub const fn is_long_press(self) -> bool {
        self.has(Self::LONG_PRESS)
    }

    /// Short label for log output.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pressed => "pressed",
            Self::Released => "released",
            Self::Click => "click",
            Self::DoubleClick => "double-click",
            Self::LongPress => "long-press",
        }
    }
}

/// Toggle switch position change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchEvent {
    /// Switch closed (line high)
    On,
    /// Switch opened (line low)
    Off,
}

impl SwitchEvent {
    /// `true` for [`On`](Self::On).
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Knob rotation with the modifier context at the time of the pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationEvent {
    /// Absolute pulse count after the change
    pub value: i32,
    /// Pulse count reported with the previous event (0 before the first)
    pub previous: i32,
    /// Push-button held while turning
    pub button_pressed: bool,
    /// Toggle switch on while turning
    pub switch_on: bool,
}

impl RotationEvent {
    /// Signed pulse delta (positive = clockwise).
    pub const fn delta(&self) -> i32 {
        self.value.saturating_sub(self.previous)
    }
}

/// Longest UID a contactless card reports (ISO 14443-3 triple size).
pub const MAX_TAG_ID_LEN: usize = 10;

/// Hex rendering of a [`TagId`], two characters per byte.
pub type TagHex = heapless::String<20>;

/// Identifier bytes read from a tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagId {
    bytes: [u8; MAX_TAG_ID_LEN],
    len: u8,
}

impl TagId {
    /// Build from raw UID bytes. Returns `None` for empty or over-long input.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() || bytes.len() > MAX_TAG_ID_LEN {
            return None;
        }
        let mut buf = [0u8; MAX_TAG_ID_LEN];
        buf.get_mut(..bytes.len())?.copy_from_slice(bytes);
        Some(Self {
            bytes: buf,
            len: u8::try_from(bytes.len()).ok()?,
        })
    }

    /// UID bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.get(..usize::from(self.len)).unwrap_or(&[])
    }

    /// Upper-case hex rendering, e.g. `04A1B2C3`.
    pub fn hex(&self) -> TagHex {
        let mut out = TagHex::new();
        // Capacity is exactly two characters per byte, so writes cannot fail.
        let _ = write!(out, "{self}");
        out
    }
}

impl core::fmt::Display for TagId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for TagId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TagId({self})")
    }
}

/// A tag read by the reader loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRead {
    /// Identifier of the tag
    pub id: TagId,
}

impl TagRead {
    /// Upper-case hex identifier, the key a controller maps to content.
    pub fn hex(&self) -> TagHex {
        self.id.hex()
    }
}

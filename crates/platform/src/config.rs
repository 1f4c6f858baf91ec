//! Hardware configuration and timing constants
//!
//! Pin numbers and bus addressing are runtime configuration (loadable from
//! JSON on the host). Debounce windows and gesture thresholds are fixed here
//! and referenced by name everywhere else.

use serde::{Deserialize, Serialize};

use crate::gpio::PinNumber;
use crate::peripheral::{SpiAddress, SpiConfig};

/// Fixed timings of the input pipeline.
pub mod timing {
    use embassy_time::Duration;

    /// Push-button debounce window
    pub const BUTTON_DEBOUNCE: Duration = Duration::from_millis(10);
    /// Toggle-switch debounce window
    pub const SWITCH_DEBOUNCE: Duration = Duration::from_millis(40);
    /// Rotary encoder A-line debounce window
    pub const ROTARY_DEBOUNCE: Duration = Duration::from_millis(2);

    /// Press that releases within this window is a click candidate
    pub const FIRST_CLICK: Duration = Duration::from_millis(250);
    /// Window after a first release in which a second one is a double-click
    pub const SECOND_CLICK: Duration = Duration::from_millis(350);
    /// Hold time that reports a long press
    pub const LONG_PRESS: Duration = Duration::from_millis(2500);

    /// How long one tag scan attempt listens
    pub const SCAN_WINDOW: Duration = Duration::from_millis(10);
    /// Pause between scan attempts and between enabled-flag checks
    pub const READER_BACKOFF: Duration = Duration::from_millis(250);

    /// LED on-phase of a blink
    pub const BLINK_ON: Duration = Duration::from_millis(200);
    /// LED off-phase of a blink cycle
    pub const BLINK_OFF: Duration = Duration::from_millis(500);
}

/// Status LED wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedConfig {
    /// LED anode pin
    pub pin: PinNumber,
}

impl Default for LedConfig {
    fn default() -> Self {
        Self { pin: PinNumber(26) }
    }
}

/// Rotary knob wiring: quadrature lines, push-button and toggle switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnobConfig {
    /// Encoder channel A (counted line)
    pub pin_a: PinNumber,
    /// Encoder channel B (direction line)
    pub pin_b: PinNumber,
    /// Push-button line
    pub button: PinNumber,
    /// Toggle-switch line
    pub switch: PinNumber,
    /// Encoder pulses per full turn
    pub pulses_per_rotation: u16,
}

impl Default for KnobConfig {
    fn default() -> Self {
        Self {
            pin_a: PinNumber(16),
            pin_b: PinNumber(12),
            button: PinNumber(13),
            switch: PinNumber(6),
            pulses_per_rotation: 20,
        }
    }
}

/// Contactless tag reader wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Reader reset line
    pub reset: PinNumber,
    /// Reader slave-select line
    pub slave_select: PinNumber,
    /// Kernel SPI device
    pub spi: SpiAddress,
    /// Bus parameters
    pub bus: SpiConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            reset: PinNumber(25),
            slave_select: PinNumber(7),
            spi: SpiAddress::default(),
            bus: SpiConfig::MFRC522,
        }
    }
}

/// Complete wiring of the input hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Status LED
    pub led: LedConfig,
    /// Control knob
    pub knob: KnobConfig,
    /// Tag reader
    pub reader: ReaderConfig,
}

impl HardwareConfig {
    /// Parse a JSON document. Missing sections and fields keep their defaults.
    ///
    /// The result is validated before it is returned.
    #[cfg(any(test, feature = "std"))]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Every claimed pin with the role that claims it.
    pub fn pin_roles(&self) -> [(&'static str, PinNumber); 7] {
        [
            ("led", self.led.pin),
            ("knob A", self.knob.pin_a),
            ("knob B", self.knob.pin_b),
            ("button", self.knob.button),
            ("switch", self.knob.switch),
            ("reader reset", self.reader.reset),
            ("reader slave-select", self.reader.slave_select),
        ]
    }

    /// Reject wiring that cannot work: a pin claimed twice, or an encoder
    /// with zero pulses per rotation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knob.pulses_per_rotation == 0 {
            return Err(ConfigError::ZeroPulsesPerRotation);
        }
        let roles = self.pin_roles();
        for (i, &(first, pin)) in roles.iter().enumerate() {
            let later = roles.iter().skip(i.saturating_add(1));
            if let Some(&(second, _)) = later.into_iter().find(|&&(_, other)| other == pin) {
                return Err(ConfigError::DuplicatePin { pin, first, second });
            }
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Two roles are wired to the same pin
    DuplicatePin {
        /// The shared pin
        pin: PinNumber,
        /// Role listed first
        first: &'static str,
        /// Role that collides with it
        second: &'static str,
    },
    /// The encoder divisor is zero
    ZeroPulsesPerRotation,
    /// The JSON document is malformed
    #[cfg(any(test, feature = "std"))]
    Parse(serde_json::Error),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicatePin { pin, first, second } => {
                write!(f, "{pin} is assigned to both {first} and {second}")
            }
            Self::ZeroPulsesPerRotation => write!(f, "pulses per rotation must be non-zero"),
            #[cfg(any(test, feature = "std"))]
            Self::Parse(e) => write!(f, "invalid hardware configuration: {e}"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_wiring_is_valid() {
        let config = HardwareConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.led.pin, PinNumber(26));
        assert_eq!(config.knob.pulses_per_rotation, 20);
        assert_eq!(config.reader.slave_select, PinNumber(7));
    }

    #[test]
    fn duplicate_pin_names_both_roles() {
        let mut config = HardwareConfig::default();
        config.knob.switch = config.led.pin;
        match config.validate() {
            Err(ConfigError::DuplicatePin { pin, first, second }) => {
                assert_eq!(pin, PinNumber(26));
                assert_eq!(first, "led");
                assert_eq!(second, "switch");
            }
            other => panic!("expected duplicate pin, got {other:?}"),
        }
    }

    #[test]
    fn zero_divisor_rejected() {
        let mut config = HardwareConfig::default();
        config.knob.pulses_per_rotation = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPulsesPerRotation)
        ));
    }

    #[test]
    fn json_overrides_merge_with_defaults() {
        let config = HardwareConfig::from_json(
            r#"{ "led": { "pin": 5 }, "knob": { "pulses_per_rotation": 24 } }"#,
        )
        .unwrap();
        assert_eq!(config.led.pin, PinNumber(5));
        assert_eq!(config.knob.pulses_per_rotation, 24);
        assert_eq!(config.knob.pin_a, PinNumber(16));
        assert_eq!(config.reader, ReaderConfig::default());
    }

    #[test]
    fn json_round_trips_reader_bus() {
        let json = serde_json::to_string(&HardwareConfig::default()).unwrap();
        let back = HardwareConfig::from_json(&json).unwrap();
        assert_eq!(back.reader.bus.frequency, 10_000_000);
        assert_eq!(back.reader.spi.chip_select, 0);
    }

    #[test]
    fn json_rejects_invalid_wiring() {
        let err = HardwareConfig::from_json(r#"{ "knob": { "button": 26 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePin { .. }));
        let err = HardwareConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

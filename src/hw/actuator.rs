//! Binary heater output.

/// Level driven onto the heater line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeaterLevel {
    /// Heater energized (line high).
    On,
    /// Heater off (line low).
    #[default]
    Off,
}

impl HeaterLevel {
    /// Check if the heater is energized.
    pub fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for HeaterLevel {
    fn from(on: bool) -> Self {
        if on {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl std::fmt::Display for HeaterLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => write!(f, "On"),
            Self::Off => write!(f, "Off"),
        }
    }
}

/// A digital output driving the heater.
///
/// Writes are assumed to succeed; implementations log their own failures.
#[cfg_attr(test, mockall::automock)]
pub trait BinaryActuator: Send + Sync {
    /// Drive the line to the given level.
    fn set_level(&self, level: HeaterLevel);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heater_level() {
        assert_eq!(HeaterLevel::default(), HeaterLevel::Off);
        assert!(HeaterLevel::On.is_on());
        assert!(!HeaterLevel::Off.is_on());
        assert_eq!(HeaterLevel::from(true), HeaterLevel::On);
        assert_eq!(format!("{}", HeaterLevel::Off), "Off");
    }

    #[test]
    fn test_mock_actuator() {
        let mut actuator = MockBinaryActuator::new();
        actuator
            .expect_set_level()
            .with(mockall::predicate::eq(HeaterLevel::On))
            .times(1)
            .return_const(());

        actuator.set_level(HeaterLevel::On);
    }
}

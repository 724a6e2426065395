//! Screen identifiers

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named UI mode on the device; the unit of navigation.
///
/// Discriminants are the wire values the companion platform assigned to
/// each watchface and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ScreenId {
    Cover = 0,
    ChooseLocation = 1,
    RetrieveLocation = 2,
    EstimateLocation = 3,
    Searching = 4,
    Arriving = 5,
    Ready = 6,
    Trip = 7,
    Receipt = 8,
    Error = 9,
    EstimatePlace = 10,
}

impl ScreenId {
    /// Wire value for this screen.
    pub fn as_wire(self) -> u8 {
        self as u8
    }

    /// Decode a wire value.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Cover),
            1 => Some(Self::ChooseLocation),
            2 => Some(Self::RetrieveLocation),
            3 => Some(Self::EstimateLocation),
            4 => Some(Self::Searching),
            5 => Some(Self::Arriving),
            6 => Some(Self::Ready),
            7 => Some(Self::Trip),
            8 => Some(Self::Receipt),
            9 => Some(Self::Error),
            10 => Some(Self::EstimatePlace),
            _ => None,
        }
    }
}

impl Serialize for ScreenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for ScreenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        Self::from_wire(value)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown screen id {}", value)))
    }
}

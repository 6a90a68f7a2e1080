//! Closed value sets stored as upper-snake text columns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::FieldValue;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Stored representations, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
        }

        impl From<$name> for FieldValue {
            fn from(v: $name) -> Self { FieldValue::Text(v.as_str().to_string()) }
        }
    };
}

text_enum!(Gender {
    Male => "MALE",
    Female => "FEMALE",
});

text_enum!(
    /// Species; also the kind of animal a location houses.
    AnimalType {
        Pig => "PIG",
        Bovine => "BOVINE",
        Ovine => "OVINE",
        Caprine => "CAPRINE",
        Poultry => "POULTRY",
        Rabbit => "RABBIT",
    }
);

text_enum!(ProductionPhase {
    Reproduction => "REPRODUCTION",
    Gestation => "GESTATION",
    Lactation => "LACTATION",
    Weaning => "WEANING",
    Growth => "GROWTH",
    Fattening => "FATTENING",
});

text_enum!(AnimalStatus {
    Active => "ACTIVE",
    Dead => "DEAD",
    Sold => "SOLD",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_stored_text() {
        assert_eq!(serde_json::to_string(&ProductionPhase::Fattening).unwrap(), "\"FATTENING\"");
        let t: AnimalType = serde_json::from_str("\"CAPRINE\"").unwrap();
        assert_eq!(t, AnimalType::Caprine);
        assert!(serde_json::from_str::<Gender>("\"male\"").is_err());
    }

    #[test]
    fn values_cover_every_variant() {
        assert_eq!(AnimalStatus::VALUES, &["ACTIVE", "DEAD", "SOLD"]);
        assert!(ProductionPhase::VALUES.contains(&ProductionPhase::Weaning.as_str()));
        assert_eq!(FieldValue::from(Gender::Female), FieldValue::Text("FEMALE".into()));
    }
}

//! Animal species and their body-surface-area constants.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DoseError;

/// Species with an FDA-tabulated Km factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Mouse,
    Hamster,
    Rat,
    Ferret,
    GuineaPig,
    Rabbit,
    Dog,
    MonkeyRhesus,
    Marmoset,
    SquirrelMonkey,
    Baboon,
    MicroPig,
    MiniPig,
    Human,
}

impl Species {
    /// All non-human species, in table order.
    pub const ANIMALS: [Species; 13] = [
        Species::Mouse,
        Species::Hamster,
        Species::Rat,
        Species::Ferret,
        Species::GuineaPig,
        Species::Rabbit,
        Species::Dog,
        Species::MonkeyRhesus,
        Species::Marmoset,
        Species::SquirrelMonkey,
        Species::Baboon,
        Species::MicroPig,
        Species::MiniPig,
    ];

    /// Body-surface-area conversion factor (body weight / surface area).
    pub fn km(&self) -> f64 {
        match self {
            Species::Human => 37.0,
            Species::Mouse => 3.0,
            Species::Hamster => 5.0,
            Species::Rat => 6.0,
            Species::Ferret => 7.0,
            Species::GuineaPig => 8.0,
            Species::Rabbit => 12.0,
            Species::Dog => 20.0,
            Species::MonkeyRhesus => 12.0,
            Species::Marmoset => 6.0,
            Species::SquirrelMonkey => 7.0,
            Species::Baboon => 20.0,
            Species::MicroPig => 27.0,
            Species::MiniPig => 35.0,
        }
    }

    /// Reference body weight in kg, where one is tabulated.
    pub fn standard_weight_kg(&self) -> Option<f64> {
        match self {
            Species::Human => Some(60.0),
            Species::Mouse => Some(0.020),
            Species::Rat => Some(0.150),
            Species::Rabbit => Some(1.8),
            Species::Dog => Some(10.0),
            Species::MonkeyRhesus => Some(3.0),
            _ => None,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Species::Human)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Mouse => "mouse",
            Species::Hamster => "hamster",
            Species::Rat => "rat",
            Species::Ferret => "ferret",
            Species::GuineaPig => "guinea_pig",
            Species::Rabbit => "rabbit",
            Species::Dog => "dog",
            Species::MonkeyRhesus => "monkey_rhesus",
            Species::Marmoset => "marmoset",
            Species::SquirrelMonkey => "squirrel_monkey",
            Species::Baboon => "baboon",
            Species::MicroPig => "micro_pig",
            Species::MiniPig => "mini_pig",
            Species::Human => "human",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = DoseError;

    /// Parses the free-text species labels found in toxicology databases
    /// ("Rat", "Guinea pig", "rhesus", ...) as well as the canonical names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        let species = match normalized.as_str() {
            "rat" | "rats" => Species::Rat,
            "mouse" | "mice" => Species::Mouse,
            "rabbit" | "rabbits" => Species::Rabbit,
            "guinea pig" | "guinea pigs" => Species::GuineaPig,
            "hamster" => Species::Hamster,
            "dog" | "dogs" => Species::Dog,
            "ferret" => Species::Ferret,
            "monkey" | "rhesus" | "monkey rhesus" | "rhesus monkey" => Species::MonkeyRhesus,
            "marmoset" => Species::Marmoset,
            "squirrel monkey" => Species::SquirrelMonkey,
            "baboon" => Species::Baboon,
            "micro pig" | "micropig" => Species::MicroPig,
            "mini pig" | "minipig" => Species::MiniPig,
            "human" | "humans" => Species::Human,
            _ => return Err(DoseError::UnknownSpecies(s.to_string())),
        };
        Ok(species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn km_table_matches_reference_values() {
        assert_eq!(Species::Human.km(), 37.0);
        assert_eq!(Species::Rat.km(), 6.0);
        assert_eq!(Species::Mouse.km(), 3.0);
        assert_eq!(Species::MiniPig.km(), 35.0);
    }

    #[test]
    fn parses_database_labels_case_insensitively() {
        assert_eq!("Rat".parse::<Species>(), Ok(Species::Rat));
        assert_eq!(" Guinea pig ".parse::<Species>(), Ok(Species::GuineaPig));
        assert_eq!("rhesus".parse::<Species>(), Ok(Species::MonkeyRhesus));
        assert_eq!("mini_pig".parse::<Species>(), Ok(Species::MiniPig));
        assert_eq!("HUMAN".parse::<Species>(), Ok(Species::Human));
    }

    #[test]
    fn unknown_label_is_an_error() {
        assert_eq!(
            "zebrafish".parse::<Species>(),
            Err(DoseError::UnknownSpecies("zebrafish".to_string()))
        );
    }

    #[test]
    fn animals_excludes_human() {
        assert!(Species::ANIMALS.iter().all(|s| !s.is_human()));
    }

    #[test]
    fn only_some_species_have_reference_weights() {
        assert_eq!(Species::Rat.standard_weight_kg(), Some(0.150));
        assert_eq!(Species::Hamster.standard_weight_kg(), None);
    }
}

//! Scenario presets and per-class object count sampling.
//!
//! Each scenario boosts one or more underrepresented classes while keeping
//! cars to a minimum. Counts are drawn uniformly from inclusive ranges.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Named preset controlling how many objects of each class to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Many bicycles, some pedestrians.
    BicycleHeavy,
    /// Crowds of pedestrians.
    PedestrianHeavy,
    /// Large vehicles: trucks and buses.
    TruckBusHeavy,
    /// Many motorcycles.
    MotorcycleHeavy,
    /// A bit of everything, still few cars.
    MixedBalanced,
}

impl Scenario {
    /// All scenarios, in selection order.
    pub const ALL: [Scenario; 5] = [
        Self::BicycleHeavy,
        Self::PedestrianHeavy,
        Self::TruckBusHeavy,
        Self::MotorcycleHeavy,
        Self::MixedBalanced,
    ];

    /// Returns the scenario tag used in logs and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BicycleHeavy => "bicycle_heavy",
            Self::PedestrianHeavy => "pedestrian_heavy",
            Self::TruckBusHeavy => "truck_bus_heavy",
            Self::MotorcycleHeavy => "motorcycle_heavy",
            Self::MixedBalanced => "mixed_balanced",
        }
    }

    /// Returns the inclusive count ranges for this scenario.
    pub fn ranges(&self) -> ScenarioRanges {
        match self {
            Self::BicycleHeavy => ScenarioRanges {
                pedestrians: CountRange::new(3, 6),
                bicycles: CountRange::new(8, 15),
                trucks: CountRange::new(1, 3),
                buses: CountRange::new(0, 2),
                motorcycles: CountRange::new(1, 3),
                cars: CountRange::new(0, 2),
            },
            Self::PedestrianHeavy => ScenarioRanges {
                pedestrians: CountRange::new(10, 18),
                bicycles: CountRange::new(2, 5),
                trucks: CountRange::new(1, 2),
                buses: CountRange::new(0, 1),
                motorcycles: CountRange::new(1, 2),
                cars: CountRange::new(0, 3),
            },
            Self::TruckBusHeavy => ScenarioRanges {
                pedestrians: CountRange::new(3, 7),
                bicycles: CountRange::new(2, 4),
                trucks: CountRange::new(4, 8),
                buses: CountRange::new(2, 5),
                motorcycles: CountRange::new(1, 3),
                cars: CountRange::new(0, 2),
            },
            Self::MotorcycleHeavy => ScenarioRanges {
                pedestrians: CountRange::new(4, 8),
                bicycles: CountRange::new(2, 5),
                trucks: CountRange::new(1, 3),
                buses: CountRange::new(0, 2),
                motorcycles: CountRange::new(6, 12),
                cars: CountRange::new(0, 3),
            },
            Self::MixedBalanced => ScenarioRanges {
                pedestrians: CountRange::new(6, 10),
                bicycles: CountRange::new(4, 7),
                trucks: CountRange::new(2, 4),
                buses: CountRange::new(1, 3),
                motorcycles: CountRange::new(3, 6),
                cars: CountRange::new(1, 4),
            },
        }
    }

    /// Picks a scenario uniformly at random.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Draws one count per class from this scenario's ranges.
    pub fn sample_counts<R: Rng + ?Sized>(&self, rng: &mut R) -> ObjectCounts {
        let ranges = self.ranges();
        ObjectCounts {
            pedestrians: ranges.pedestrians.sample(rng),
            bicycles: ranges.bicycles.sample(rng),
            trucks: ranges.trucks.sample(rng),
            buses: ranges.buses.sample(rng),
            motorcycles: ranges.motorcycles.sample(rng),
            cars: ranges.cars.sample(rng),
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == s)
            .ok_or_else(|| format!("unknown scenario: {s}"))
    }
}

/// Inclusive `[min, max]` bound for one object class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountRange {
    /// Smallest count that may be drawn.
    pub min: u32,
    /// Largest count that may be drawn.
    pub max: u32,
}

impl CountRange {
    const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Returns true if `count` lies within the range.
    pub fn contains(&self, count: u32) -> bool {
        (self.min..=self.max).contains(&count)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Per-class ranges for a scenario.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioRanges {
    pub pedestrians: CountRange,
    pub bicycles: CountRange,
    pub trucks: CountRange,
    pub buses: CountRange,
    pub motorcycles: CountRange,
    pub cars: CountRange,
}

impl ScenarioRanges {
    /// Returns true if every count of `counts` lies within its range.
    pub fn admits(&self, counts: &ObjectCounts) -> bool {
        self.pedestrians.contains(counts.pedestrians)
            && self.bicycles.contains(counts.bicycles)
            && self.trucks.contains(counts.trucks)
            && self.buses.contains(counts.buses)
            && self.motorcycles.contains(counts.motorcycles)
            && self.cars.contains(counts.cars)
    }
}

/// How many objects of each class to add to the scene.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectCounts {
    pub pedestrians: u32,
    pub bicycles: u32,
    pub trucks: u32,
    pub buses: u32,
    pub motorcycles: u32,
    pub cars: u32,
}

impl std::fmt::Display for ObjectCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} pedestrians, {} bicycles, {} trucks, {} buses, {} motorcycles, {} cars",
            self.pedestrians, self.bicycles, self.trucks, self.buses, self.motorcycles, self.cars
        )
    }
}

/// A scenario together with the counts drawn for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampledScene {
    /// The scenario the counts were drawn from.
    pub scenario: Scenario,
    /// The drawn counts.
    pub counts: ObjectCounts,
}

/// Samples a scene, using `pinned` instead of a random scenario when given.
pub fn sample_scene<R: Rng + ?Sized>(rng: &mut R, pinned: Option<Scenario>) -> SampledScene {
    let scenario = pinned.unwrap_or_else(|| Scenario::choose(rng));
    SampledScene {
        scenario,
        counts: scenario.sample_counts(rng),
    }
}

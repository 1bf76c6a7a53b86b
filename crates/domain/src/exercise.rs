use std::{collections::BTreeSet, slice::Iter, str::FromStr};

use derive_more::{AsRef, Deref, Display};

use crate::ReadError;

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises_by_muscle(
        &self,
        equipment: &BTreeSet<Equipment>,
        muscles: &BTreeSet<Muscle>,
    ) -> Result<Vec<MuscleGroup>, ReadError>;
    async fn search_exercises(&self, query: &str, limit: usize)
    -> Result<Vec<Exercise>, ReadError>;
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    /// Exercises usable with any of the given equipment, grouped by primary muscle.
    ///
    /// An empty `muscles` set does not restrict the result.
    async fn read_exercises_by_muscle(
        &self,
        equipment: &BTreeSet<Equipment>,
        muscles: &BTreeSet<Muscle>,
    ) -> Result<Vec<MuscleGroup>, ReadError>;
    async fn search_exercises(&self, query: &str, limit: usize)
    -> Result<Vec<Exercise>, ReadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: String,
    pub name_en: String,
    pub full_video_url: Option<String>,
    pub full_video_image_url: Option<String>,
    pub attributes: Vec<ExerciseAttribute>,
}

impl Exercise {
    #[must_use]
    pub fn primary_muscle(&self) -> Option<Muscle> {
        self.attributes.iter().find_map(|a| match a {
            ExerciseAttribute::PrimaryMuscle(muscle) => Some(*muscle),
            _ => None,
        })
    }

    /// Muscle group the exercise is filed under when no muscle is known from context.
    #[must_use]
    pub fn muscle_or_default(&self) -> Muscle {
        self.primary_muscle().unwrap_or_default()
    }

    #[must_use]
    pub fn equipment(&self) -> BTreeSet<Equipment> {
        self.attributes
            .iter()
            .filter_map(|a| match a {
                ExerciseAttribute::Equipment(equipment) => Some(*equipment),
                _ => None,
            })
            .collect()
    }

    /// Exercises without any equipment attribute can be done with everything.
    #[must_use]
    pub fn is_usable_with(&self, equipment: &BTreeSet<Equipment>) -> bool {
        let required = self.equipment();
        required.is_empty() || !required.is_disjoint(equipment)
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name_en.trim().is_empty() {
            &self.name
        } else {
            &self.name_en
        }
    }

    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.name.to_lowercase().contains(&query) || self.name_en.to_lowercase().contains(&query)
    }
}

#[derive(AsRef, Deref, Display, Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExerciseID(String);

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MuscleGroup {
    pub muscle: Muscle,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseAttribute {
    Type(ExerciseType),
    PrimaryMuscle(Muscle),
    SecondaryMuscle(Muscle),
    Equipment(Equipment),
    MechanicsType(Mechanics),
}

impl ExerciseAttribute {
    pub fn parse(name: &str, value: &str) -> Result<Self, AttributeError> {
        fn value_of<T: FromStr>(name: &str, value: &str) -> Result<T, AttributeError> {
            value.parse().map_err(|_| AttributeError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
            })
        }

        match name {
            "TYPE" => Ok(Self::Type(value_of(name, value)?)),
            "PRIMARY_MUSCLE" => Ok(Self::PrimaryMuscle(value_of(name, value)?)),
            "SECONDARY_MUSCLE" => Ok(Self::SecondaryMuscle(value_of(name, value)?)),
            "EQUIPMENT" => Ok(Self::Equipment(value_of(name, value)?)),
            "MECHANICS_TYPE" => Ok(Self::MechanicsType(value_of(name, value)?)),
            _ => Err(AttributeError::InvalidName(name.to_string())),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type(_) => "TYPE",
            Self::PrimaryMuscle(_) => "PRIMARY_MUSCLE",
            Self::SecondaryMuscle(_) => "SECONDARY_MUSCLE",
            Self::Equipment(_) => "EQUIPMENT",
            Self::MechanicsType(_) => "MECHANICS_TYPE",
        }
    }

    #[must_use]
    pub fn value(&self) -> &'static str {
        match self {
            Self::Type(t) => (*t).into(),
            Self::PrimaryMuscle(m) | Self::SecondaryMuscle(m) => (*m).into(),
            Self::Equipment(e) => (*e).into(),
            Self::MechanicsType(m) => (*m).into(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("Invalid attribute name {0}")]
    InvalidName(String),
    #[error("Invalid value {value} for attribute {name}")]
    InvalidValue { name: String, value: String },
}

#[derive(
    strum::EnumString,
    strum::IntoStaticStr,
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Muscle {
    #[default]
    Chest,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Back,
    Lats,
    Traps,
    Abdominals,
    Obliques,
    Glutes,
    Quadriceps,
    Hamstrings,
    Adductors,
    Abductors,
    Calves,
    Neck,
    FullBody,
}

impl Property for Muscle {
    fn iter() -> Iter<'static, Muscle> {
        static MUSCLES: [Muscle; 18] = [
            Muscle::Chest,
            Muscle::Shoulders,
            Muscle::Biceps,
            Muscle::Triceps,
            Muscle::Forearms,
            Muscle::Back,
            Muscle::Lats,
            Muscle::Traps,
            Muscle::Abdominals,
            Muscle::Obliques,
            Muscle::Glutes,
            Muscle::Quadriceps,
            Muscle::Hamstrings,
            Muscle::Adductors,
            Muscle::Abductors,
            Muscle::Calves,
            Muscle::Neck,
            Muscle::FullBody,
        ];
        MUSCLES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Muscle::Chest => "Chest",
            Muscle::Shoulders => "Shoulders",
            Muscle::Biceps => "Biceps",
            Muscle::Triceps => "Triceps",
            Muscle::Forearms => "Forearms",
            Muscle::Back => "Back",
            Muscle::Lats => "Lats",
            Muscle::Traps => "Traps",
            Muscle::Abdominals => "Abdominals",
            Muscle::Obliques => "Obliques",
            Muscle::Glutes => "Glutes",
            Muscle::Quadriceps => "Quadriceps",
            Muscle::Hamstrings => "Hamstrings",
            Muscle::Adductors => "Adductors",
            Muscle::Abductors => "Abductors",
            Muscle::Calves => "Calves",
            Muscle::Neck => "Neck",
            Muscle::FullBody => "Full Body",
        }
    }
}

#[derive(
    strum::EnumString,
    strum::IntoStaticStr,
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Equipment {
    BodyOnly,
    Dumbbell,
    Barbell,
    EzBar,
    Kettlebells,
    Bands,
    WeightPlate,
    PullupBar,
    Bench,
    Cable,
    Machine,
    SmithMachine,
    MedicineBall,
    SwissBall,
    Trx,
    Other,
}

impl Property for Equipment {
    fn iter() -> Iter<'static, Equipment> {
        static EQUIPMENT: [Equipment; 16] = [
            Equipment::BodyOnly,
            Equipment::Dumbbell,
            Equipment::Barbell,
            Equipment::EzBar,
            Equipment::Kettlebells,
            Equipment::Bands,
            Equipment::WeightPlate,
            Equipment::PullupBar,
            Equipment::Bench,
            Equipment::Cable,
            Equipment::Machine,
            Equipment::SmithMachine,
            Equipment::MedicineBall,
            Equipment::SwissBall,
            Equipment::Trx,
            Equipment::Other,
        ];
        EQUIPMENT.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Equipment::BodyOnly => "Bodyweight",
            Equipment::Dumbbell => "Dumbbell",
            Equipment::Barbell => "Barbell",
            Equipment::EzBar => "EZ Bar",
            Equipment::Kettlebells => "Kettlebell",
            Equipment::Bands => "Resistance Band",
            Equipment::WeightPlate => "Weight Plate",
            Equipment::PullupBar => "Pull Up Bar",
            Equipment::Bench => "Bench",
            Equipment::Cable => "Cable",
            Equipment::Machine => "Machine",
            Equipment::SmithMachine => "Smith Machine",
            Equipment::MedicineBall => "Medicine Ball",
            Equipment::SwissBall => "Swiss Ball",
            Equipment::Trx => "TRX",
            Equipment::Other => "Other",
        }
    }
}

#[derive(
    strum::EnumString,
    strum::IntoStaticStr,
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseType {
    Strength,
    Bodyweight,
    Calisthenic,
    Plyometrics,
    Powerlifting,
    Weightlifting,
    Strongman,
    Crossfit,
    Cardio,
    Stretching,
}

impl Property for ExerciseType {
    fn iter() -> Iter<'static, ExerciseType> {
        static TYPES: [ExerciseType; 10] = [
            ExerciseType::Strength,
            ExerciseType::Bodyweight,
            ExerciseType::Calisthenic,
            ExerciseType::Plyometrics,
            ExerciseType::Powerlifting,
            ExerciseType::Weightlifting,
            ExerciseType::Strongman,
            ExerciseType::Crossfit,
            ExerciseType::Cardio,
            ExerciseType::Stretching,
        ];
        TYPES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            ExerciseType::Strength => "Strength",
            ExerciseType::Bodyweight => "Bodyweight",
            ExerciseType::Calisthenic => "Calisthenics",
            ExerciseType::Plyometrics => "Plyometrics",
            ExerciseType::Powerlifting => "Powerlifting",
            ExerciseType::Weightlifting => "Weightlifting",
            ExerciseType::Strongman => "Strongman",
            ExerciseType::Crossfit => "CrossFit",
            ExerciseType::Cardio => "Cardio",
            ExerciseType::Stretching => "Stretching",
        }
    }
}

#[derive(
    strum::EnumString,
    strum::IntoStaticStr,
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Mechanics {
    Compound,
    Isolation,
}

impl Property for Mechanics {
    fn iter() -> Iter<'static, Mechanics> {
        static MECHANICS: [Mechanics; 2] = [Mechanics::Compound, Mechanics::Isolation];
        MECHANICS.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Mechanics::Compound => "Compound",
            Mechanics::Isolation => "Isolation",
        }
    }
}

pub trait Property: Clone + Copy + Sized {
    fn iter() -> Iter<'static, Self>;
    fn name(self) -> &'static str;
}

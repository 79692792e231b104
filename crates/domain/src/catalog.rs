//! Bundled exercise dataset, loaded into local storage at startup.

use std::sync::LazyLock;

use crate::{Equipment, Exercise, Muscle, Name};

struct Entry {
    id: u64,
    name: &'static str,
    primary: &'static [Muscle],
    secondary: &'static [Muscle],
    equipment: Equipment,
}

pub static EXERCISES: LazyLock<Vec<Exercise>> = LazyLock::new(|| {
    ENTRIES
        .iter()
        .map(|e| Exercise {
            id: e.id.into(),
            name: Name::new(e.name).unwrap(),
            primary_muscles: e.primary.to_vec(),
            secondary_muscles: e.secondary.to_vec(),
            equipment: e.equipment,
        })
        .collect()
});

#[must_use]
pub fn exercises() -> Vec<Exercise> {
    EXERCISES.clone()
}

const ENTRIES: [Entry; 36] = [
    Entry {
        id: 1,
        name: "Barbell Back Squat",
        primary: &[Muscle::Quads, Muscle::Glutes],
        secondary: &[Muscle::Hamstrings, Muscle::LowerBack, Muscle::Abs],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 2,
        name: "Barbell Bench Press",
        primary: &[Muscle::Chest],
        secondary: &[Muscle::FrontDelts, Muscle::Triceps],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 3,
        name: "Deadlift",
        primary: &[Muscle::Hamstrings, Muscle::Glutes, Muscle::LowerBack],
        secondary: &[Muscle::Quads, Muscle::UpperBack, Muscle::Forearms],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 4,
        name: "Overhead Press",
        primary: &[Muscle::FrontDelts],
        secondary: &[Muscle::SideDelts, Muscle::Triceps, Muscle::Abs],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 5,
        name: "Barbell Row",
        primary: &[Muscle::UpperBack, Muscle::Lats],
        secondary: &[Muscle::Biceps, Muscle::RearDelts, Muscle::Forearms],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 6,
        name: "Romanian Deadlift",
        primary: &[Muscle::Hamstrings],
        secondary: &[Muscle::Glutes, Muscle::LowerBack],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 7,
        name: "Barbell Hip Thrust",
        primary: &[Muscle::Glutes],
        secondary: &[Muscle::Hamstrings, Muscle::Quads],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 8,
        name: "Barbell Curl",
        primary: &[Muscle::Biceps],
        secondary: &[Muscle::Forearms],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 9,
        name: "Front Squat",
        primary: &[Muscle::Quads],
        secondary: &[Muscle::Glutes, Muscle::Abs, Muscle::UpperBack],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 10,
        name: "Incline Bench Press",
        primary: &[Muscle::Chest, Muscle::FrontDelts],
        secondary: &[Muscle::Triceps],
        equipment: Equipment::Barbell,
    },
    Entry {
        id: 11,
        name: "Dumbbell Bench Press",
        primary: &[Muscle::Chest],
        secondary: &[Muscle::FrontDelts, Muscle::Triceps],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 12,
        name: "Dumbbell Row",
        primary: &[Muscle::Lats, Muscle::UpperBack],
        secondary: &[Muscle::Biceps, Muscle::RearDelts],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 13,
        name: "Dumbbell Shoulder Press",
        primary: &[Muscle::FrontDelts, Muscle::SideDelts],
        secondary: &[Muscle::Triceps],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 14,
        name: "Lateral Raise",
        primary: &[Muscle::SideDelts],
        secondary: &[],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 15,
        name: "Dumbbell Curl",
        primary: &[Muscle::Biceps],
        secondary: &[Muscle::Forearms],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 16,
        name: "Hammer Curl",
        primary: &[Muscle::Biceps, Muscle::Forearms],
        secondary: &[],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 17,
        name: "Dumbbell Lunge",
        primary: &[Muscle::Quads, Muscle::Glutes],
        secondary: &[Muscle::Hamstrings, Muscle::Calves],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 18,
        name: "Dumbbell Romanian Deadlift",
        primary: &[Muscle::Hamstrings],
        secondary: &[Muscle::Glutes, Muscle::LowerBack],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 19,
        name: "Goblet Squat",
        primary: &[Muscle::Quads],
        secondary: &[Muscle::Glutes, Muscle::Abs],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 20,
        name: "Dumbbell Fly",
        primary: &[Muscle::Chest],
        secondary: &[Muscle::FrontDelts],
        equipment: Equipment::Dumbbell,
    },
    Entry {
        id: 21,
        name: "Lat Pulldown",
        primary: &[Muscle::Lats],
        secondary: &[Muscle::Biceps, Muscle::UpperBack],
        equipment: Equipment::Cable,
    },
    Entry {
        id: 22,
        name: "Seated Cable Row",
        primary: &[Muscle::UpperBack, Muscle::Lats],
        secondary: &[Muscle::Biceps, Muscle::RearDelts],
        equipment: Equipment::Cable,
    },
    Entry {
        id: 23,
        name: "Cable Triceps Pushdown",
        primary: &[Muscle::Triceps],
        secondary: &[],
        equipment: Equipment::Cable,
    },
    Entry {
        id: 24,
        name: "Cable Lateral Raise",
        primary: &[Muscle::SideDelts],
        secondary: &[],
        equipment: Equipment::Cable,
    },
    Entry {
        id: 25,
        name: "Face Pull",
        primary: &[Muscle::RearDelts, Muscle::UpperBack],
        secondary: &[Muscle::Biceps],
        equipment: Equipment::Cable,
    },
    Entry {
        id: 26,
        name: "Cable Crunch",
        primary: &[Muscle::Abs],
        secondary: &[],
        equipment: Equipment::Cable,
    },
    Entry {
        id: 27,
        name: "Leg Press",
        primary: &[Muscle::Quads, Muscle::Glutes],
        secondary: &[Muscle::Hamstrings],
        equipment: Equipment::Machine,
    },
    Entry {
        id: 28,
        name: "Leg Curl",
        primary: &[Muscle::Hamstrings],
        secondary: &[Muscle::Calves],
        equipment: Equipment::Machine,
    },
    Entry {
        id: 29,
        name: "Leg Extension",
        primary: &[Muscle::Quads],
        secondary: &[],
        equipment: Equipment::Machine,
    },
    Entry {
        id: 30,
        name: "Calf Raise",
        primary: &[Muscle::Calves],
        secondary: &[],
        equipment: Equipment::Machine,
    },
    Entry {
        id: 31,
        name: "Chest Press Machine",
        primary: &[Muscle::Chest],
        secondary: &[Muscle::FrontDelts, Muscle::Triceps],
        equipment: Equipment::Machine,
    },
    Entry {
        id: 32,
        name: "Pull-up",
        primary: &[Muscle::Lats],
        secondary: &[Muscle::Biceps, Muscle::UpperBack, Muscle::Forearms],
        equipment: Equipment::Bodyweight,
    },
    Entry {
        id: 33,
        name: "Push-up",
        primary: &[Muscle::Chest],
        secondary: &[Muscle::FrontDelts, Muscle::Triceps, Muscle::Abs],
        equipment: Equipment::Bodyweight,
    },
    Entry {
        id: 34,
        name: "Dip",
        primary: &[Muscle::Chest, Muscle::Triceps],
        secondary: &[Muscle::FrontDelts],
        equipment: Equipment::Bodyweight,
    },
    Entry {
        id: 35,
        name: "Plank",
        primary: &[Muscle::Abs],
        secondary: &[Muscle::LowerBack],
        equipment: Equipment::Bodyweight,
    },
    Entry {
        id: 36,
        name: "Kettlebell Swing",
        primary: &[Muscle::Glutes, Muscle::Hamstrings],
        secondary: &[Muscle::LowerBack, Muscle::Abs],
        equipment: Equipment::Kettlebell,
    },
];

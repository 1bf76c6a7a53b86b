//! Selection Store
//!
//! Holds the equipment and muscle filters of the workout builder together with the chosen
//! exercises. The exercises are kept in a single insertion-ordered map from exercise ID to the
//! exercise and the muscle it was selected for. The map order is the workout order; the grouping
//! by muscle is derived on read. An exercise therefore can neither appear twice nor belong to two
//! muscle groups, and a muscle group without exercises does not exist.
//!
//! All operations are total. Unknown IDs are ignored.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::{debug, warn};

use crate::{Equipment, Exercise, ExerciseID, Muscle, MuscleGroup};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectedExercise {
    exercise: Exercise,
    muscle: Muscle,
}

#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    pub equipment: BTreeSet<Equipment>,
    pub muscles: BTreeSet<Muscle>,
    exercises: IndexMap<ExerciseID, SelectedExercise>,
}

impl SelectionState {
    #[must_use]
    pub fn new(equipment: BTreeSet<Equipment>, muscles: BTreeSet<Muscle>) -> Self {
        Self {
            equipment,
            muscles,
            exercises: IndexMap::new(),
        }
    }

    /// Reconstruct a selection from the grouped representation and a separate exercise order.
    ///
    /// Exercises listed in `order` come first. IDs in `order` that are not part of any group are
    /// skipped. Exercises of the groups that are missing in `order` are appended in group order.
    /// If an exercise occurs in several groups, the first occurrence wins.
    #[must_use]
    pub fn from_groups(
        equipment: BTreeSet<Equipment>,
        muscles: BTreeSet<Muscle>,
        groups: Vec<MuscleGroup>,
        order: &[ExerciseID],
    ) -> Self {
        let mut members: IndexMap<ExerciseID, SelectedExercise> = IndexMap::new();
        for group in groups {
            for exercise in group.exercises {
                if members.contains_key(&exercise.id) {
                    debug!(
                        "ignoring duplicate exercise {} in group {:?}",
                        exercise.id, group.muscle
                    );
                    continue;
                }
                members.insert(
                    exercise.id.clone(),
                    SelectedExercise {
                        exercise,
                        muscle: group.muscle,
                    },
                );
            }
        }

        let mut exercises = IndexMap::with_capacity(members.len());
        for id in order {
            if let Some(selected) = members.shift_remove(id) {
                exercises.insert(id.clone(), selected);
            } else if !exercises.contains_key(id) {
                warn!("ignoring unknown exercise {id} in exercise order");
            }
        }
        exercises.extend(members);

        Self {
            equipment,
            muscles,
            exercises,
        }
    }

    pub fn toggle_equipment(&mut self, equipment: Equipment) {
        if !self.equipment.remove(&equipment) {
            self.equipment.insert(equipment);
        }
    }

    pub fn clear_equipment(&mut self) {
        self.equipment.clear();
    }

    pub fn toggle_muscle(&mut self, muscle: Muscle) {
        if !self.muscles.remove(&muscle) {
            self.muscles.insert(muscle);
        }
    }

    pub fn clear_muscles(&mut self) {
        self.muscles.clear();
    }

    /// Append an exercise to the end of the workout.
    ///
    /// Returns `false` without changing anything if the exercise is already selected, even if it
    /// was selected for a different muscle.
    pub fn add_exercise(&mut self, exercise: Exercise, muscle: Muscle) -> bool {
        if self.exercises.contains_key(&exercise.id) {
            return false;
        }
        self.exercises
            .insert(exercise.id.clone(), SelectedExercise { exercise, muscle });
        true
    }

    /// Add an exercise found outside of the muscle groups, e.g. by the quick search.
    pub fn quick_add(&mut self, exercise: Exercise) -> bool {
        let muscle = exercise.muscle_or_default();
        self.add_exercise(exercise, muscle)
    }

    pub fn remove_exercise(&mut self, id: &ExerciseID) -> Option<Exercise> {
        self.exercises
            .shift_remove(id)
            .map(|selected| selected.exercise)
    }

    /// Move an exercise to `index`. Indices past the end move the exercise to the end.
    pub fn move_exercise(&mut self, id: &ExerciseID, index: usize) -> bool {
        let Some(from) = self.exercises.get_index_of(id) else {
            return false;
        };
        let to = index.min(self.exercises.len() - 1);
        self.exercises.move_index(from, to);
        true
    }

    /// Swap an exercise for another one at the same position and under the same muscle.
    ///
    /// Fails if the replacement is already selected elsewhere.
    pub fn replace_exercise(&mut self, id: &ExerciseID, replacement: Exercise) -> bool {
        let Some(index) = self.exercises.get_index_of(id) else {
            return false;
        };

        if replacement.id == *id {
            self.exercises[index].exercise = replacement;
            return true;
        }

        if self.exercises.contains_key(&replacement.id) {
            return false;
        }

        let Some((_, selected)) = self.exercises.shift_remove_index(index) else {
            return false;
        };
        self.exercises.shift_insert(
            index,
            replacement.id.clone(),
            SelectedExercise {
                exercise: replacement,
                muscle: selected.muscle,
            },
        );
        true
    }

    /// Fill the selection with fetched exercises.
    ///
    /// The result is only applied if the selection is still empty, so that exercises added in
    /// the meantime are never overwritten.
    pub fn apply_fetched(&mut self, groups: Vec<MuscleGroup>) -> bool {
        if !self.exercises.is_empty() {
            debug!(
                "discarding fetched exercises, selection already contains {} exercises",
                self.exercises.len()
            );
            return false;
        }
        for group in groups {
            for exercise in group.exercises {
                self.add_exercise(exercise, group.muscle);
            }
        }
        true
    }

    /// The selected exercises in workout order.
    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.values().map(|selected| &selected.exercise)
    }

    #[must_use]
    pub fn order(&self) -> Vec<ExerciseID> {
        self.exercises.keys().cloned().collect()
    }

    /// The selected exercises grouped by muscle.
    ///
    /// Groups appear in the order of their first exercise, the exercises of a group in workout
    /// order.
    #[must_use]
    pub fn groups(&self) -> Vec<MuscleGroup> {
        let mut groups: Vec<MuscleGroup> = vec![];
        for selected in self.exercises.values() {
            if let Some(group) = groups.iter_mut().find(|g| g.muscle == selected.muscle) {
                group.exercises.push(selected.exercise.clone());
            } else {
                groups.push(MuscleGroup {
                    muscle: selected.muscle,
                    exercises: vec![selected.exercise.clone()],
                });
            }
        }
        groups
    }

    #[must_use]
    pub fn get(&self, id: &ExerciseID) -> Option<&Exercise> {
        self.exercises.get(id).map(|selected| &selected.exercise)
    }

    #[must_use]
    pub fn muscle_of(&self, id: &ExerciseID) -> Option<Muscle> {
        self.exercises.get(id).map(|selected| selected.muscle)
    }

    #[must_use]
    pub fn contains(&self, id: &ExerciseID) -> bool {
        self.exercises.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

// `IndexMap` compares as an unordered map, but the order is part of the selection.
impl PartialEq for SelectionState {
    fn eq(&self, other: &Self) -> bool {
        self.equipment == other.equipment
            && self.muscles == other.muscles
            && self.exercises.iter().eq(other.exercises.iter())
    }
}

impl Eq for SelectionState {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::ExerciseAttribute;

    fn exercise(id: &str, muscle: Option<Muscle>) -> Exercise {
        Exercise {
            id: id.into(),
            name: id.to_uppercase(),
            name_en: id.to_uppercase(),
            full_video_url: None,
            full_video_image_url: None,
            attributes: muscle
                .map(ExerciseAttribute::PrimaryMuscle)
                .into_iter()
                .collect(),
        }
    }

    fn ids(selection: &SelectionState) -> Vec<&str> {
        selection.exercises().map(|e| e.id.as_str()).collect()
    }

    fn order(ids: &[&str]) -> Vec<ExerciseID> {
        ids.iter().map(|id| ExerciseID::from(*id)).collect()
    }

    #[test]
    fn test_toggle_filters() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);

        selection.toggle_equipment(Equipment::Dumbbell);
        selection.toggle_equipment(Equipment::Barbell);
        selection.toggle_equipment(Equipment::Dumbbell);
        selection.toggle_muscle(Muscle::Chest);

        assert_eq!(selection.equipment, BTreeSet::from([Equipment::Barbell]));
        assert_eq!(selection.muscles, BTreeSet::from([Muscle::Chest]));
        assert_eq!(ids(&selection), vec!["a"]);

        selection.clear_equipment();
        selection.clear_muscles();

        assert!(selection.equipment.is_empty());
        assert!(selection.muscles.is_empty());
        assert_eq!(ids(&selection), vec!["a"]);
    }

    #[test]
    fn test_add_exercise() {
        let mut selection = SelectionState::default();

        assert!(selection.add_exercise(exercise("a", None), Muscle::Chest));
        assert!(selection.add_exercise(exercise("b", None), Muscle::Back));
        assert!(selection.add_exercise(exercise("c", None), Muscle::Chest));

        assert_eq!(ids(&selection), vec!["a", "b", "c"]);
        assert_eq!(
            selection.groups(),
            vec![
                MuscleGroup {
                    muscle: Muscle::Chest,
                    exercises: vec![exercise("a", None), exercise("c", None)],
                },
                MuscleGroup {
                    muscle: Muscle::Back,
                    exercises: vec![exercise("b", None)],
                },
            ]
        );
    }

    #[test]
    fn test_add_exercise_idempotent() {
        let mut once = SelectionState::default();
        once.add_exercise(exercise("a", None), Muscle::Chest);

        let mut twice = SelectionState::default();
        assert!(twice.add_exercise(exercise("a", None), Muscle::Chest));
        assert!(!twice.add_exercise(exercise("a", None), Muscle::Chest));

        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_exercise_keeps_first_muscle() {
        let mut selection = SelectionState::default();

        assert!(selection.add_exercise(exercise("a", None), Muscle::Chest));
        assert!(!selection.add_exercise(exercise("a", None), Muscle::Triceps));

        assert_eq!(selection.muscle_of(&"a".into()), Some(Muscle::Chest));
        assert_eq!(selection.groups().len(), 1);
    }

    #[test]
    fn test_add_exercise_to_fetched_group() {
        let mut selection = SelectionState::new(
            BTreeSet::from([Equipment::Dumbbell]),
            BTreeSet::from([Muscle::Chest]),
        );
        selection.apply_fetched(vec![MuscleGroup {
            muscle: Muscle::Chest,
            exercises: vec![exercise("a", None), exercise("b", None)],
        }]);

        selection.add_exercise(exercise("c", None), Muscle::Chest);

        assert_eq!(ids(&selection), vec!["a", "b", "c"]);
        assert_eq!(
            selection.groups(),
            vec![MuscleGroup {
                muscle: Muscle::Chest,
                exercises: vec![
                    exercise("a", None),
                    exercise("b", None),
                    exercise("c", None)
                ],
            }]
        );
    }

    #[rstest]
    #[case(Some(Muscle::Shoulders), Muscle::Shoulders)]
    #[case(None, Muscle::Chest)]
    fn test_quick_add(#[case] primary_muscle: Option<Muscle>, #[case] expected: Muscle) {
        let mut selection = SelectionState::default();

        assert!(selection.quick_add(exercise("a", primary_muscle)));
        assert!(!selection.quick_add(exercise("a", primary_muscle)));

        assert_eq!(selection.muscle_of(&"a".into()), Some(expected));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_remove_exercise() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        selection.add_exercise(exercise("b", None), Muscle::Back);
        selection.add_exercise(exercise("c", None), Muscle::Chest);

        assert_eq!(
            selection.remove_exercise(&"b".into()),
            Some(exercise("b", None))
        );
        assert_eq!(selection.remove_exercise(&"b".into()), None);
        assert_eq!(selection.remove_exercise(&"x".into()), None);

        assert_eq!(ids(&selection), vec!["a", "c"]);
        assert_eq!(
            selection
                .groups()
                .iter()
                .map(|g| g.muscle)
                .collect::<Vec<_>>(),
            vec![Muscle::Chest]
        );
    }

    #[test]
    fn test_remove_last_exercise_of_group_prunes_group() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);

        selection.remove_exercise(&"a".into());

        assert!(selection.groups().is_empty());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_re_add_appends_to_end() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        selection.add_exercise(exercise("b", None), Muscle::Chest);
        selection.add_exercise(exercise("c", None), Muscle::Chest);

        selection.remove_exercise(&"a".into());
        selection.add_exercise(exercise("a", None), Muscle::Chest);

        assert_eq!(ids(&selection), vec!["b", "c", "a"]);
        assert_eq!(selection.order(), order(&["b", "c", "a"]));
    }

    #[rstest]
    #[case("c", 0, true, vec!["c", "a", "b"])]
    #[case("a", 1, true, vec!["b", "a", "c"])]
    #[case("a", 99, true, vec!["b", "c", "a"])]
    #[case("b", 1, true, vec!["a", "b", "c"])]
    #[case("x", 0, false, vec!["a", "b", "c"])]
    fn test_move_exercise(
        #[case] id: &str,
        #[case] index: usize,
        #[case] moved: bool,
        #[case] expected: Vec<&str>,
    ) {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        selection.add_exercise(exercise("b", None), Muscle::Back);
        selection.add_exercise(exercise("c", None), Muscle::Chest);

        assert_eq!(selection.move_exercise(&id.into(), index), moved);
        assert_eq!(ids(&selection), expected);
    }

    #[test]
    fn test_move_exercise_regroups_on_read() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        selection.add_exercise(exercise("b", None), Muscle::Back);

        selection.move_exercise(&"b".into(), 0);

        assert_eq!(
            selection
                .groups()
                .iter()
                .map(|g| g.muscle)
                .collect::<Vec<_>>(),
            vec![Muscle::Back, Muscle::Chest]
        );
    }

    #[test]
    fn test_replace_exercise() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        selection.add_exercise(exercise("b", None), Muscle::Back);
        selection.add_exercise(exercise("c", None), Muscle::Chest);

        assert!(selection.replace_exercise(&"b".into(), exercise("d", Some(Muscle::Lats))));

        assert_eq!(ids(&selection), vec!["a", "d", "c"]);
        assert_eq!(selection.muscle_of(&"d".into()), Some(Muscle::Back));
        assert!(!selection.contains(&"b".into()));
    }

    #[test]
    fn test_replace_exercise_rejects_selected_replacement() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        selection.add_exercise(exercise("b", None), Muscle::Chest);

        assert!(!selection.replace_exercise(&"a".into(), exercise("b", None)));
        assert!(!selection.replace_exercise(&"x".into(), exercise("c", None)));

        assert_eq!(ids(&selection), vec!["a", "b"]);
    }

    #[test]
    fn test_replace_exercise_with_itself_refreshes() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        let mut updated = exercise("a", None);
        updated.name_en = "Updated".to_string();

        assert!(selection.replace_exercise(&"a".into(), updated.clone()));

        assert_eq!(selection.get(&"a".into()), Some(&updated));
        assert_eq!(selection.muscle_of(&"a".into()), Some(Muscle::Chest));
    }

    #[test]
    fn test_apply_fetched_fills_empty_selection_only() {
        let fetched = vec![
            MuscleGroup {
                muscle: Muscle::Chest,
                exercises: vec![exercise("a", None), exercise("b", None)],
            },
            MuscleGroup {
                muscle: Muscle::Back,
                exercises: vec![exercise("c", None)],
            },
        ];

        let mut empty = SelectionState::default();
        assert!(empty.apply_fetched(fetched.clone()));
        assert_eq!(ids(&empty), vec!["a", "b", "c"]);

        let mut quick_added = SelectionState::default();
        quick_added.quick_add(exercise("x", Some(Muscle::Calves)));
        assert!(!quick_added.apply_fetched(fetched));
        assert_eq!(ids(&quick_added), vec!["x"]);
    }

    #[test]
    fn test_apply_fetched_drops_duplicates() {
        let mut selection = SelectionState::default();

        selection.apply_fetched(vec![
            MuscleGroup {
                muscle: Muscle::Chest,
                exercises: vec![exercise("a", None), exercise("a", None)],
            },
            MuscleGroup {
                muscle: Muscle::Triceps,
                exercises: vec![exercise("a", None), exercise("b", None)],
            },
        ]);

        assert_eq!(ids(&selection), vec!["a", "b"]);
        assert_eq!(selection.muscle_of(&"a".into()), Some(Muscle::Chest));
    }

    #[test]
    fn test_from_groups_appends_exercises_missing_in_order() {
        let selection = SelectionState::from_groups(
            BTreeSet::new(),
            BTreeSet::new(),
            vec![MuscleGroup {
                muscle: Muscle::Chest,
                exercises: vec![
                    exercise("a", None),
                    exercise("b", None),
                    exercise("c", None),
                ],
            }],
            &order(&["a", "b"]),
        );

        assert_eq!(ids(&selection), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_groups_applies_order() {
        let selection = SelectionState::from_groups(
            BTreeSet::from([Equipment::Dumbbell]),
            BTreeSet::from([Muscle::Chest, Muscle::Back]),
            vec![
                MuscleGroup {
                    muscle: Muscle::Chest,
                    exercises: vec![exercise("a", None), exercise("b", None)],
                },
                MuscleGroup {
                    muscle: Muscle::Back,
                    exercises: vec![exercise("c", None), exercise("d", None)],
                },
            ],
            &order(&["c", "x", "a", "c"]),
        );

        assert_eq!(ids(&selection), vec!["c", "a", "b", "d"]);
        assert_eq!(selection.equipment, BTreeSet::from([Equipment::Dumbbell]));
        assert_eq!(selection.muscle_of(&"c".into()), Some(Muscle::Back));
    }

    #[test]
    fn test_from_groups_first_group_wins() {
        let selection = SelectionState::from_groups(
            BTreeSet::new(),
            BTreeSet::new(),
            vec![
                MuscleGroup {
                    muscle: Muscle::Chest,
                    exercises: vec![exercise("a", None)],
                },
                MuscleGroup {
                    muscle: Muscle::Triceps,
                    exercises: vec![exercise("a", None)],
                },
            ],
            &[],
        );

        assert_eq!(selection.len(), 1);
        assert_eq!(selection.muscle_of(&"a".into()), Some(Muscle::Chest));
    }

    #[test]
    fn test_from_groups_round_trip() {
        let mut selection = SelectionState::default();
        selection.add_exercise(exercise("a", None), Muscle::Chest);
        selection.add_exercise(exercise("b", None), Muscle::Back);
        selection.add_exercise(exercise("c", None), Muscle::Chest);

        assert_eq!(
            SelectionState::from_groups(
                selection.equipment.clone(),
                selection.muscles.clone(),
                selection.groups(),
                &selection.order(),
            ),
            selection
        );
    }

    #[test]
    fn test_equality_respects_order() {
        let mut ab = SelectionState::default();
        ab.add_exercise(exercise("a", None), Muscle::Chest);
        ab.add_exercise(exercise("b", None), Muscle::Chest);

        let mut ba = SelectionState::default();
        ba.add_exercise(exercise("b", None), Muscle::Chest);
        ba.add_exercise(exercise("a", None), Muscle::Chest);

        assert_ne!(ab, ba);
    }

    #[test]
    fn test_uniqueness_under_arbitrary_operations() {
        let mut selection = SelectionState::default();
        let muscles = [Muscle::Chest, Muscle::Back, Muscle::Biceps];
        let names = ["a", "b", "c", "d"];

        for step in 0..200_usize {
            let id = names[(step * 7 + step / 3) % names.len()];
            match step % 5 {
                0 | 1 | 3 => {
                    selection.add_exercise(exercise(id, None), muscles[step % muscles.len()]);
                }
                2 => {
                    selection.remove_exercise(&id.into());
                }
                _ => {
                    selection.move_exercise(&id.into(), step % 4);
                }
            }

            let order = selection.order();
            let unique = order.iter().collect::<BTreeSet<_>>();
            assert_eq!(unique.len(), order.len());
            assert_eq!(
                selection
                    .groups()
                    .iter()
                    .map(|g| g.exercises.len())
                    .sum::<usize>(),
                selection.len()
            );
            assert_eq!(selection.exercises().count(), unique.len());
        }
    }
}

//! Randomized operation sequences.

use proptest::prelude::*;
use relgraph::Operation;

use crate::test_utils::Harness;

const USERS: usize = 3;
const PETS: usize = 4;

#[derive(Debug, Clone)]
enum Step {
    SetOwner { pet: usize, user: Option<usize> },
    SetBestFriend { user: usize, friend: Option<usize> },
    AddPet { user: usize, pet: usize },
    RemovePet { user: usize, pet: usize },
    ReplacePets { user: usize, pets: Vec<usize> },
}

fn step() -> impl Strategy<Value = (Step, bool)> {
    let step = prop_oneof![
        (0..PETS, proptest::option::of(0..USERS)).prop_map(|(pet, user)| Step::SetOwner { pet, user }),
        (0..USERS, proptest::option::of(0..USERS))
            .prop_map(|(user, friend)| Step::SetBestFriend { user, friend }),
        (0..USERS, 0..PETS).prop_map(|(user, pet)| Step::AddPet { user, pet }),
        (0..USERS, 0..PETS).prop_map(|(user, pet)| Step::RemovePet { user, pet }),
        (0..USERS, proptest::collection::vec(0..PETS, 0..4))
            .prop_map(|(user, pets)| Step::ReplacePets { user, pets }),
    ];
    (step, any::<bool>())
}

fn apply(h: &mut Harness, step: &Step, is_remote: bool) {
    let user = |h: &mut Harness, i: usize| h.id("user", &i.to_string());
    let pet = |h: &mut Harness, i: usize| h.id("pet", &i.to_string());
    let op = match step {
        Step::SetOwner { pet: p, user: u } => {
            let record = pet(h, *p);
            let value = u.map(|u| user(h, u));
            Operation::replace_related_record(&record, "owner", value)
        }
        Step::SetBestFriend { user: u, friend } => {
            let record = user(h, *u);
            let value = friend.map(|f| user(h, f));
            Operation::replace_related_record(&record, "bestFriend", value)
        }
        Step::AddPet { user: u, pet: p } => {
            let (record, value) = (user(h, *u), pet(h, *p));
            Operation::add_to_related_records(&record, "pets", vec![value])
        }
        Step::RemovePet { user: u, pet: p } => {
            let (record, value) = (user(h, *u), pet(h, *p));
            Operation::remove_from_related_records(&record, "pets", vec![value])
        }
        Step::ReplacePets { user: u, pets } => {
            let record = user(h, *u);
            let value = pets.iter().map(|p| pet(h, *p)).collect();
            Operation::replace_related_records(&record, "pets", value)
        }
    };
    h.store.push(op, is_remote).unwrap();
    if is_remote {
        h.store.flush();
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn views_stay_reciprocal(steps in proptest::collection::vec(step(), 1..24)) {
        let mut h = Harness::new();
        for (step, is_remote) in &steps {
            apply(&mut h, step, *is_remote);
            let violations = h.store.graph_mut().verify_reciprocity();
            prop_assert!(violations.is_empty(), "after {:?}: {:?}", step, violations);
        }
    }

    #[test]
    fn local_removal_is_idempotent(
        steps in proptest::collection::vec(step(), 0..12),
        user in 0..USERS,
        pet in 0..PETS,
    ) {
        let mut h = Harness::new();
        for (step, is_remote) in &steps {
            apply(&mut h, step, *is_remote);
        }
        apply(&mut h, &Step::RemovePet { user, pet }, false);
        let (u, p) = (h.id("user", &user.to_string()), h.id("pet", &pet.to_string()));
        let once = h.local(&u, "pets");
        prop_assert!(!once.contains(&p));
        h.log.clear();

        apply(&mut h, &Step::RemovePet { user, pet }, false);
        prop_assert_eq!(h.local(&u, "pets"), once);
        prop_assert!(h.log.is_empty());
    }

    #[test]
    fn merge_keeps_collection_order(members in proptest::collection::vec(0..PETS, 1..4), slot in 0usize..4) {
        let mut h = Harness::new();
        let user = h.id("user", "owner");
        let known = h.id("pet", "fresh");
        let mut pets: Vec<_> = members.iter().map(|p| h.id("pet", &p.to_string())).collect();
        pets.dedup();
        let slot = slot.min(pets.len());
        let temp = h.store.create_record("pet");
        pets.insert(slot, temp.clone());
        h.store
            .push(Operation::replace_related_records(&user, "pets", pets.clone()), false)
            .unwrap();
        let expected_before = h.local(&user, "pets");

        let survivor = h.store.commit_created(&temp, "fresh").unwrap();
        prop_assert_eq!(&survivor, &known);
        let expected: Vec<_> = expected_before
            .into_iter()
            .map(|p| if p == temp { survivor.clone() } else { p })
            .collect();
        prop_assert_eq!(h.local(&user, "pets"), expected);
    }
}

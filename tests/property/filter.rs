//! Property-based tests for the filter engine.
//!
//! Uses proptest to verify:
//! 1. `visible` returns an order-preserving subsequence of the input.
//! 2. Every visible task belongs to the requested owner.
//! 3. Empty criteria keep every task of the owner.
//! 4. Matching all selected tags never yields more than matching any.
//! 5. The text query ignores case.

use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use taskboard::filter::{visible, Criteria, StatusFilter, TagMatch};
use taskboard_proto::task::{Task, TaskId, TaskStatus};

const OWNERS: [&str; 3] = ["alice", "bob", "carol"];
const TAGS: [&str; 4] = ["work", "personal", "urgent", "study"];
const WORDS: [&str; 5] = ["Report", "meeting", "GROCERIES", "Book", "call"];

fn arb_task() -> impl Strategy<Value = Task> {
    (
        prop::sample::select(OWNERS.to_vec()),
        prop::sample::select(WORDS.to_vec()),
        prop::sample::select(WORDS.to_vec()),
        prop::sample::select(TaskStatus::ALL.to_vec()),
        0i64..5,
        prop::sample::subsequence(TAGS.to_vec(), 0..=TAGS.len()),
    )
        .prop_map(|(owner, title, description, status, day, tags)| Task {
            id: TaskId::new(),
            title: title.to_string(),
            description: description.to_string(),
            status,
            creation_date: Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
                + Duration::days(day),
            completed_at: None,
            tags: tags.into_iter().map(ToString::to_string).collect(),
            comments: vec![],
            owner: owner.to_string(),
        })
}

fn arb_criteria() -> impl Strategy<Value = Criteria> {
    (
        prop::option::of(prop::sample::select(WORDS.to_vec())),
        prop::option::of(prop::sample::select(TaskStatus::ALL.to_vec())),
        prop::option::of(0i64..5),
        prop::sample::subsequence(TAGS.to_vec(), 0..=2),
        prop::bool::ANY,
    )
        .prop_map(|(query, status, day, tags, all)| Criteria {
            text_query: query.map(str::to_lowercase).unwrap_or_default(),
            status: status.map_or(StatusFilter::Any, StatusFilter::Only),
            date: day.map(|d| {
                (Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap() + Duration::days(d))
                    .date_naive()
            }),
            tag_ids: tags.into_iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
            tag_match: if all { TagMatch::All } else { TagMatch::Any },
        })
}

fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(|t| t.id.clone()).collect()
}

proptest! {
    #[test]
    fn result_is_ordered_subsequence(
        tasks in prop::collection::vec(arb_task(), 0..20),
        owner in prop::sample::select(OWNERS.to_vec()),
        criteria in arb_criteria(),
    ) {
        let shown = visible(&tasks, owner, &criteria);
        let all = ids(&tasks);
        let mut cursor = all.iter();
        for id in ids(&shown) {
            prop_assert!(cursor.any(|candidate| *candidate == id));
        }
    }

    #[test]
    fn result_is_scoped_to_owner(
        tasks in prop::collection::vec(arb_task(), 0..20),
        owner in prop::sample::select(OWNERS.to_vec()),
        criteria in arb_criteria(),
    ) {
        let shown = visible(&tasks, owner, &criteria);
        prop_assert!(shown.iter().all(|t| t.owner == owner));
        prop_assert!(shown.iter().all(|t| criteria.matches(t)));
    }

    #[test]
    fn empty_criteria_keep_all_owner_tasks(
        tasks in prop::collection::vec(arb_task(), 0..20),
        owner in prop::sample::select(OWNERS.to_vec()),
    ) {
        let shown = visible(&tasks, owner, &Criteria::default());
        let expected: Vec<TaskId> = tasks
            .iter()
            .filter(|t| t.owner == owner)
            .map(|t| t.id.clone())
            .collect();
        prop_assert_eq!(ids(&shown), expected);
    }

    #[test]
    fn all_tags_is_subset_of_any_tags(
        tasks in prop::collection::vec(arb_task(), 0..20),
        owner in prop::sample::select(OWNERS.to_vec()),
        criteria in arb_criteria(),
    ) {
        let any = Criteria { tag_match: TagMatch::Any, ..criteria.clone() };
        let all = Criteria { tag_match: TagMatch::All, ..criteria };
        let any_ids = ids(&visible(&tasks, owner, &any));
        for id in ids(&visible(&tasks, owner, &all)) {
            prop_assert!(any_ids.contains(&id));
        }
    }

    #[test]
    fn text_query_ignores_case(
        tasks in prop::collection::vec(arb_task(), 0..20),
        owner in prop::sample::select(OWNERS.to_vec()),
        word in prop::sample::select(WORDS.to_vec()),
    ) {
        let lower = Criteria { text_query: word.to_lowercase(), ..Criteria::default() };
        let upper = Criteria { text_query: word.to_uppercase(), ..Criteria::default() };
        prop_assert_eq!(
            ids(&visible(&tasks, owner, &lower)),
            ids(&visible(&tasks, owner, &upper))
        );
    }
}

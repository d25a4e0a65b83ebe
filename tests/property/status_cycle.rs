//! Property-based tests for the status model and task decoding.
//!
//! Uses proptest to verify:
//! 1. Toggling returns to the start after one full cycle for either model.
//! 2. Each toggle changes the status (no fixed points).
//! 3. Decoding a task that omits optional fields never fails and fills defaults.
//! 4. Random JSON-ish input never causes a panic in decode.

use proptest::prelude::*;
use taskboard_proto::task::{StatusModel, Task, TaskStatus};

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::ALL.to_vec())
}

fn arb_model() -> impl Strategy<Value = StatusModel> {
    prop::sample::select(vec![StatusModel::Cycle, StatusModel::Binary])
}

const fn cycle_len(model: StatusModel) -> usize {
    match model {
        StatusModel::Cycle => 3,
        StatusModel::Binary => 2,
    }
}

proptest! {
    #[test]
    fn full_cycle_returns_to_start(model in arb_model()) {
        // Binary cycle closure holds from the two states it cycles through.
        let starts: &[TaskStatus] = match model {
            StatusModel::Cycle => &TaskStatus::ALL,
            StatusModel::Binary => &[TaskStatus::Pending, TaskStatus::Completed],
        };
        for &start in starts {
            let mut s = start;
            for _ in 0..cycle_len(model) {
                s = s.next(model);
            }
            prop_assert_eq!(s, start);
        }
    }

    #[test]
    fn toggle_always_changes_status(status in arb_status(), model in arb_model()) {
        prop_assert_ne!(status.next(model), status);
    }

    #[test]
    fn decode_minimal_task_fills_defaults(
        id in "[a-z0-9-]{1,36}",
        title in "[A-Za-z ]{1,64}",
    ) {
        let json = serde_json::json!({ "id": id, "title": title });
        let task: Task = serde_json::from_value(json).unwrap();
        prop_assert_eq!(task.status, TaskStatus::Pending);
        prop_assert!(task.comments.is_empty());
        prop_assert!(task.tags.is_empty());
        prop_assert_eq!(task.description, "");
    }

    #[test]
    fn decode_random_input_never_panics(input in ".{0,256}") {
        let _ = serde_json::from_str::<Task>(&input);
    }
}

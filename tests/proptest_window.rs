//! Property-based tests for the message window.
//!
//! Drives the window controller with random scroll and jump sequences and
//! checks that the materialized range stays bounded and consistent with
//! what the surface holds.

use std::sync::Arc;

use chatlog_viewer::config::WindowConfig;
use chatlog_viewer::model::{ChatDocument, Message};
use chatlog_viewer::render::MemorySurface;
use chatlog_viewer::window::{jump_window, WindowController};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Top,
    Bottom,
    Jump(usize),
    Latest,
}

fn op(total: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Top),
        3 => Just(Op::Bottom),
        1 => (0..total).prop_map(Op::Jump),
        1 => Just(Op::Latest),
    ]
}

fn document(total: usize) -> Arc<ChatDocument> {
    let messages = (0..total)
        .map(|i| Message::new("1/1/23", "10:00", "A", format!("m{i}"), i))
        .collect();
    Arc::new(ChatDocument {
        messages,
        ..Default::default()
    })
}

fn scenario() -> impl Strategy<Value = (usize, Vec<Op>)> {
    (1usize..1500).prop_flat_map(|total| (Just(total), prop::collection::vec(op(total), 0..60)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn window_stays_bounded_and_in_sync((total, ops) in scenario()) {
        // No highlight, so pruning is never held back by a jump target
        let config = WindowConfig {
            highlight_ms: 0,
            ..WindowConfig::default()
        };
        let max = config.max_materialized;
        let chunk = config.chunk_size;
        let mut window = WindowController::new(config);
        let mut surface: MemorySurface<Message> = MemorySurface::new(10, 500);
        window.open(document(total), &mut surface);

        for op in ops {
            let (before_start, before_end) = window.bounds();
            match op {
                Op::Top => {
                    window.scroll_near_top(&mut surface);
                }
                Op::Bottom => {
                    window.scroll_near_bottom(&mut surface);
                }
                Op::Jump(i) => {
                    window.jump_to(i, &mut surface).unwrap();
                    let (start, end) = window.bounds();
                    prop_assert!(start <= i && i < end);
                }
                Op::Latest => window.jump_to_latest(&mut surface).unwrap(),
            }

            let (start, end) = window.bounds();
            prop_assert!(start <= end && end <= total);
            prop_assert!(end - start <= max);
            prop_assert_eq!(surface.len(), end - start);

            let indexes: Vec<usize> = surface.items().iter().map(|m| m.original_index).collect();
            let expected: Vec<usize> = (start..end).collect();
            prop_assert_eq!(indexes, expected);

            if matches!(op, Op::Top | Op::Bottom) {
                prop_assert!(before_start.abs_diff(start) <= chunk);
                prop_assert!(before_end.abs_diff(end) <= chunk);
            }
        }
    }

    #[test]
    fn jump_window_contains_target(total in 1usize..5000, chunk in 1usize..300, seed in any::<usize>()) {
        let index = seed % total;
        let (start, end) = jump_window(index, total, chunk);
        prop_assert!(start <= index && index < end);
        prop_assert!(end <= total);
        prop_assert_eq!(end - start, chunk.min(total));
    }
}

//! Tests for long mutation sequences
//!
//! This tests:
//! - Move + edit + delete chains
//! - Undo/redo sequences
//! - Batched mutations
//! - Tree integrity after arbitrary operation mixes

use std::collections::HashSet;

use blockmail_editor::{
    Block, BlockPatch, BlockType, Direction, EditSession, SessionConfig, TreeStore,
};
use proptest::prelude::*;

fn session_with(root: Block, config: &SessionConfig) -> EditSession {
    EditSession::with_store("seq", TreeStore::from_root(root).unwrap(), config)
}

/// Every id unique, every parent link consistent, every chain ends at the root
fn assert_tree_integrity(store: &TreeStore) {
    let ids = store.ids();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate ids in {:?}", ids);
    assert_eq!(ids.len(), store.len());

    for id in &ids {
        if id == store.root_id() {
            assert!(store.parent_id(id).is_none());
            continue;
        }

        let parent = store.get_parent(id).expect("non-root block has a parent");
        assert!(parent.is_container());
        assert!(parent.children().unwrap().iter().any(|c| &c.id == id));

        let ancestors = store.ancestor_ids(id);
        assert!(!ancestors.contains(id), "{} is its own ancestor", id);
        assert_eq!(ancestors.last().map(String::as_str), Some(store.root_id()));
        assert!(store.is_descendant(store.root_id(), id));
    }

    assert!(!store.is_descendant(store.root_id(), store.root_id()));
}

#[test]
fn test_move_then_delete_sequence() {
    let mut session = session_with(
        Block::root("root")
            .with_child(
                Block::template(BlockType::Container, "child1")
                    .with_child(Block::template(BlockType::Text, "text1")),
            )
            .with_child(Block::template(BlockType::Container, "child2")),
        &SessionConfig::default(),
    );
    let initial = session.store().snapshot();

    // Move child2 into child1
    assert!(session.move_block("child2", "child1"));
    let child1 = session.get_block("child1").unwrap();
    assert_eq!(child1.children().unwrap().len(), 2);

    // Delete child1 (takes child2 and text1 with it)
    assert!(session.remove_block("child1"));
    for id in ["child1", "child2", "text1"] {
        assert!(session.get_block(id).is_none(), "{} should be gone", id);
    }
    assert_eq!(session.store().len(), 1);

    // Undo delete restores the whole subtree
    assert!(session.undo());
    assert!(session.store().is_descendant("child1", "child2"));
    assert!(session.store().is_descendant("child1", "text1"));

    // Undo move
    assert!(session.undo());
    assert_eq!(session.store().snapshot(), initial);
    assert!(!session.can_undo());
}

#[test]
fn test_multiple_text_updates_with_undo_redo() {
    let mut session = session_with(
        Block::root("root").with_child(Block::template(BlockType::Text, "t1")),
        &SessionConfig::default(),
    );

    for content in ["Hello", "Hello,", "Hello, world"] {
        assert!(session.update_block("t1", BlockPatch::content(content)));
    }
    let content = |s: &EditSession| s.get_block("t1").and_then(Block::content).map(String::from);

    assert_eq!(content(&session).as_deref(), Some("Hello, world"));

    session.undo();
    assert_eq!(content(&session).as_deref(), Some("Hello,"));
    session.undo();
    session.undo();
    assert_eq!(content(&session).as_deref(), Some(blockmail_model::DEFAULT_TEXT));
    assert!(!session.undo());

    session.redo();
    assert_eq!(content(&session).as_deref(), Some("Hello"));

    // A new edit drops the redo branch
    session.update_block("t1", BlockPatch::content("Hi"));
    assert!(!session.can_redo());
    assert_eq!(content(&session).as_deref(), Some("Hi"));
}

#[test]
fn test_batched_style_updates() {
    let mut session = session_with(
        Block::root("root").with_child(Block::template(BlockType::Button, "cta")),
        &SessionConfig::default(),
    );
    let initial = session.store().snapshot();

    session.begin_batch("Restyle button");
    session.update_block("cta", BlockPatch::style("background", "#3366FF"));
    session.update_block("cta", BlockPatch::style("color", "white"));
    session.update_block("cta", BlockPatch::style("padding", "12px 24px"));
    session.end_batch();

    let styles = &session.get_block("cta").unwrap().styles;
    assert_eq!(styles.len(), 3);
    assert_eq!(session.history().undo_levels(), 1);
    assert_eq!(session.history().undo_description(), Some("Restyle button"));

    // One undo reverts the whole batch
    assert!(session.undo());
    assert_eq!(session.store().snapshot(), initial);

    assert!(session.redo());
    assert_eq!(session.get_block("cta").unwrap().styles.len(), 3);
}

#[test]
fn test_insert_and_remove_sequence() {
    let mut session = session_with(Block::root("root"), &SessionConfig::default());

    let section = session.add_new(BlockType::Section, None).unwrap();
    session.set_selected([section.clone()]);

    // Selected container receives new blocks
    let first = session.add_new(BlockType::Text, None).unwrap();
    // Selected leaf gets a sibling right after it
    session.set_selected([first.clone()]);
    let second = session.add_new(BlockType::Image, None).unwrap();
    session.set_selected([first.clone()]);
    let third = session.add_new(BlockType::Button, None).unwrap();

    let order: Vec<_> = session
        .get_block(&section)
        .unwrap()
        .children()
        .unwrap()
        .iter()
        .map(|b| b.id.clone())
        .collect();
    assert_eq!(order, vec![first.clone(), third.clone(), second.clone()]);

    // Removing the selected block clears it from the selection
    session.set_selected([first.clone(), third.clone()]);
    assert!(session.remove_block(&first));
    assert_eq!(session.selected_ids(), &[third.clone()]);

    // Undo brings the block back but selection is not resurrected
    session.undo();
    assert!(session.store().contains(&first));
    assert_eq!(session.selected_ids(), &[third]);
    assert_tree_integrity(session.store());
}

#[test]
fn test_duplicate_keeps_ids_unique() {
    let mut session = session_with(
        Block::root("root").with_child(
            Block::template(BlockType::Row, "row")
                .with_child(Block::template(BlockType::Column, "col1"))
                .with_child(
                    Block::template(BlockType::Column, "col2")
                        .with_child(Block::template(BlockType::Text, "txt")),
                ),
        ),
        &SessionConfig::default(),
    );

    let copy = session.duplicate_block("row").unwrap();
    assert_eq!(session.store().index_of(&copy), Some(1));
    assert_eq!(session.store().len(), 9);
    assert_tree_integrity(session.store());

    // Copying the copy still yields fresh ids
    session.duplicate_block(&copy).unwrap();
    assert_eq!(session.store().len(), 13);
    assert_tree_integrity(session.store());
}

/// One editing intent; indices pick blocks from the ids present at the time
#[derive(Debug, Clone)]
enum Op {
    Add { target: usize, kind: usize },
    Move { source: usize, target: usize },
    Step { node: usize, direction: Direction },
    Style { node: usize, padding: u8 },
    Remove { node: usize },
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Before), Just(Direction::After)]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (any::<usize>(), any::<usize>()).prop_map(|(target, kind)| Op::Add { target, kind }),
        1 => (any::<usize>(), any::<usize>())
            .prop_map(|(source, target)| Op::Move { source, target }),
        1 => (any::<usize>(), arb_direction())
            .prop_map(|(node, direction)| Op::Step { node, direction }),
        1 => (any::<usize>(), 0u8..16).prop_map(|(node, padding)| Op::Style { node, padding }),
        1 => any::<usize>().prop_map(|node| Op::Remove { node }),
    ]
}

fn apply_op(session: &mut EditSession, op: &Op) -> bool {
    let ids = session.store().ids();
    let pick = |i: usize| ids[i % ids.len()].clone();

    match *op {
        Op::Add { target, kind } => {
            let block_type = BlockType::INSERTABLE[kind % BlockType::INSERTABLE.len()];
            session.add_new(block_type, Some(&pick(target))).is_some()
        }
        Op::Move { source, target } => session.move_block(&pick(source), &pick(target)),
        Op::Step { node, direction } => session.move_block_step(&pick(node), direction),
        Op::Style { node, padding } => session.update_block(
            &pick(node),
            BlockPatch::style("padding", format!("{}px", padding)),
        ),
        // Keep the tree from draining
        Op::Remove { node } => ids.len() > 6 && session.remove_block(&pick(node)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_arbitrary_sequences_preserve_tree(ops in prop::collection::vec(arb_op(), 1..120)) {
        let config = SessionConfig {
            history_levels: 0,
            ..Default::default()
        };
        let mut session = session_with(Block::root("root"), &config);
        let initial = session.store().snapshot();
        let mut applied = 0;

        for op in &ops {
            let before = session.store().snapshot();
            if apply_op(&mut session, op) {
                applied += 1;
            } else {
                prop_assert_eq!(
                    session.store().snapshot(),
                    before,
                    "{:?} failed but changed the tree",
                    op
                );
            }
            assert_tree_integrity(session.store());
        }

        prop_assert_eq!(session.history().undo_levels(), applied);

        // Undoing everything returns to the starting tree
        while session.undo() {}
        prop_assert_eq!(session.store().snapshot(), initial);

        // Redoing everything is consistent too
        while session.redo() {}
        prop_assert_eq!(session.history().undo_levels(), applied);
        assert_tree_integrity(session.store());
    }
}

#[test]
fn test_rejected_mutations_record_nothing() {
    let mut session = session_with(
        Block::root("root")
            .with_child(Block::template(BlockType::Text, "t1"))
            .with_child(
                Block::template(BlockType::Container, "c1")
                    .with_child(Block::template(BlockType::Container, "c2")),
            ),
        &SessionConfig::default(),
    );
    let before = session.store().snapshot();

    assert!(!session.move_block("root", "c1"));
    assert!(!session.move_block("c1", "c2"));
    assert!(!session.move_block("c1", "c1"));
    assert!(!session.move_block("c1", "t1"));
    assert!(!session.move_block("missing", "c1"));
    assert!(!session.remove_block("root"));
    assert!(!session.move_block_step("t1", Direction::Before));
    assert!(!session.move_block_step("c1", Direction::After));
    assert!(!session.update_block("c1", BlockPatch::content("nope")));
    assert!(session.add_new(BlockType::Text, Some("t1")).is_none());

    assert_eq!(session.store().snapshot(), before);
    assert!(!session.can_undo());
}

//! Integration tests for editor crate

use blockmail_editor::{
    Block, BlockPatch, BlockType, CompileOptions, Direction, DragOutcome, DropFeedback, DropZone,
    EditSession, Mutation, MutationError, Point, Rect, SessionConfig, TreeStore,
};
use blockmail_model::DEFAULT_TEXT;

fn session_with(root: Block) -> EditSession {
    EditSession::with_store(
        "test-client",
        TreeStore::from_root(root).expect("valid tree"),
        &SessionConfig::default(),
    )
}

fn child_ids(session: &EditSession, id: &str) -> Vec<String> {
    session
        .get_block(id)
        .and_then(Block::children)
        .map(|c| c.iter().map(|b| b.id.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn test_add_text_to_empty_container() {
    let mut session = session_with(
        Block::root("root").with_child(Block::template(BlockType::Container, "containerA")),
    );

    let text = session.create_block(BlockType::Text);
    let text_id = text.id.clone();
    assert!(session.add_block(text, Some("containerA")));

    assert_eq!(child_ids(&session, "containerA"), vec![text_id.clone()]);
    assert_eq!(
        session.get_block(&text_id).and_then(Block::content),
        Some(DEFAULT_TEXT)
    );
}

#[test]
fn test_step_before_swaps_siblings() {
    let mut session = session_with(
        Block::root("root").with_child(
            Block::template(BlockType::Container, "containerA")
                .with_child(Block::template(BlockType::Text, "text1"))
                .with_child(Block::template(BlockType::Text, "text2")),
        ),
    );

    assert!(session.move_block_step("text2", Direction::Before));
    assert_eq!(child_ids(&session, "containerA"), vec!["text2", "text1"]);
}

#[test]
fn test_move_into_own_descendant_rejected() {
    let mut session = session_with(
        Block::root("root").with_child(
            Block::template(BlockType::Container, "containerA")
                .with_child(Block::template(BlockType::Container, "containerB")),
        ),
    );
    let before = session.store().snapshot();

    assert!(!session.move_block("containerA", "containerB"));
    assert_eq!(session.store().snapshot(), before);
    assert!(!session.can_undo());
}

#[test]
fn test_remove_undo_redo_restores_exact_tree() {
    let mut session = session_with(
        Block::root("root")
            .with_child(Block::template(BlockType::Text, "text0"))
            .with_child(Block::template(BlockType::Text, "text1").with_content("Dear patient"))
            .with_child(Block::template(BlockType::Text, "text2")),
    );
    let before = session.store().snapshot();

    assert!(session.remove_block("text1"));
    let after = session.store().snapshot();
    assert!(session.get_block("text1").is_none());

    assert!(session.undo());
    assert_eq!(session.store().snapshot(), before);
    assert_eq!(session.store().index_of("text1"), Some(1));
    assert_eq!(
        session.get_block("text1").and_then(Block::content),
        Some("Dear patient")
    );

    assert!(session.redo());
    assert_eq!(session.store().snapshot(), after);
    assert!(session.get_block("text1").is_none());
}

#[test]
fn test_move_into_current_parent_rejected() {
    let mut session = session_with(
        Block::root("root").with_child(
            Block::template(BlockType::Container, "containerA")
                .with_child(Block::template(BlockType::Text, "text1"))
                .with_child(Block::template(BlockType::Button, "button1")),
        ),
    );
    let before = session.store().snapshot();

    let mutation = Mutation::MoveBlock {
        node_id: "button1".to_string(),
        new_parent_id: "containerA".to_string(),
    };
    assert_eq!(
        mutation.validate(session.store()),
        Err(MutationError::AlreadyInParent("containerA".to_string()))
    );
    assert!(!session.apply(mutation));
    assert_eq!(session.store().snapshot(), before);
}

#[test]
fn test_drag_and_drop_moves_block_with_history() {
    let mut session = session_with(
        Block::root("root")
            .with_child(
                Block::template(BlockType::Section, "header")
                    .with_child(Block::template(BlockType::Image, "logo")),
            )
            .with_child(Block::template(BlockType::Section, "footer")),
    );
    let zones = vec![
        DropZone::new("header", Rect::new(0.0, 0.0, 600.0, 100.0)),
        DropZone::new("footer", Rect::new(0.0, 400.0, 600.0, 100.0)),
    ];

    assert!(session.pointer_down("logo", Point::new(20.0, 20.0)));
    let hover = session.pointer_move(Point::new(30.0, 450.0), &zones);
    assert_eq!(hover, Some(DropFeedback::Valid("footer".to_string())));

    let outcome = session.pointer_up(Point::new(30.0, 450.0), &zones);
    assert_eq!(
        outcome,
        DragOutcome::Drop {
            source: "logo".to_string(),
            target: "footer".to_string()
        }
    );
    assert_eq!(child_ids(&session, "footer"), vec!["logo"]);
    assert!(child_ids(&session, "header").is_empty());

    assert!(session.undo());
    assert_eq!(child_ids(&session, "header"), vec!["logo"]);
}

#[test]
fn test_dragging_container_over_itself_is_invalid() {
    let mut session = session_with(
        Block::root("root").with_child(
            Block::template(BlockType::Container, "outer")
                .with_child(Block::template(BlockType::Container, "inner")),
        ),
    );
    let zones = vec![
        DropZone::new("outer", Rect::new(0.0, 0.0, 400.0, 400.0)),
        DropZone::new("inner", Rect::new(100.0, 100.0, 100.0, 100.0)),
    ];
    let before = session.store().snapshot();

    session.pointer_down("outer", Point::new(10.0, 10.0));
    let hover = session.pointer_move(Point::new(150.0, 150.0), &zones);
    assert!(matches!(
        hover,
        Some(DropFeedback::Invalid {
            reason: MutationError::CycleDetected,
            ..
        })
    ));

    let hover = session.pointer_move(Point::new(20.0, 20.0), &zones);
    assert!(matches!(
        hover,
        Some(DropFeedback::Invalid {
            reason: MutationError::SelfTarget,
            ..
        })
    ));

    session.pointer_up(Point::new(150.0, 150.0), &zones);
    assert_eq!(session.store().snapshot(), before);
}

#[test]
fn test_cancelled_drag_leaves_tree_untouched() {
    let mut session = session_with(
        Block::root("root")
            .with_child(Block::template(BlockType::Text, "t1"))
            .with_child(Block::template(BlockType::Container, "c1")),
    );
    let zones = vec![DropZone::new("c1", Rect::new(0.0, 0.0, 100.0, 100.0))];
    let before = session.store().snapshot();

    session.pointer_down("t1", Point::new(0.0, 0.0));
    session.pointer_move(Point::new(50.0, 50.0), &zones);
    assert_eq!(session.cancel_drag(), DragOutcome::Cancelled);
    assert_eq!(
        session.pointer_up(Point::new(50.0, 50.0), &zones),
        DragOutcome::Ignored
    );

    assert_eq!(session.store().snapshot(), before);
}

#[test]
fn test_release_far_from_every_zone_cancels() {
    let mut session = session_with(
        Block::root("root")
            .with_child(Block::template(BlockType::Text, "t"))
            .with_child(Block::template(BlockType::Container, "b")),
    );
    let zones = vec![DropZone::new("b", Rect::new(0.0, 0.0, 10.0, 10.0))];
    let before = session.store().snapshot();

    assert!(session.pointer_down("t", Point::new(0.0, 0.0)));
    session.pointer_move(Point::new(400.0, 400.0), &zones);
    assert_eq!(
        session.pointer_up(Point::new(5000.0, 5000.0), &zones),
        DragOutcome::Cancelled
    );

    assert_eq!(session.store().parent_id("t"), Some("root"));
    assert_eq!(session.store().snapshot(), before);
    assert!(!session.can_undo());
}

#[test]
fn test_document_lifecycle() -> anyhow::Result<()> {
    let mut session = EditSession::new("newsletter", &SessionConfig::default());

    let section = session.add_new(BlockType::Section, None).expect("section");
    let row = session.add_new(BlockType::Row, Some(&section)).expect("row");
    let left = session.add_new(BlockType::Column, Some(&row)).expect("left");
    let right = session.add_new(BlockType::Column, Some(&row)).expect("right");
    let text = session.add_new(BlockType::Text, Some(&left)).expect("text");
    let cta = session.add_new(BlockType::Button, Some(&right)).expect("cta");

    session.update_block(&text, BlockPatch::content("Your appointment is confirmed."));
    session.update_block(&cta, BlockPatch::prop("href", "https://example.com/manage"));

    // Persist and reload through JSON
    let json = session.to_json()?;
    let mut reloaded = EditSession::new("newsletter", &SessionConfig::default());
    reloaded.load_json(&json)?;
    assert_eq!(reloaded.store().root(), session.store().root());

    // New ids never collide with loaded ones
    let extra = reloaded.add_new(BlockType::Image, None).expect("image");
    assert!(!session.store().contains(&extra));

    let html = reloaded.export_html(&CompileOptions::default());
    assert!(html.contains("Your appointment is confirmed."));
    assert!(html.contains("href=\"https://example.com/manage\""));
    let text_pos = html.find("Your appointment").unwrap();
    let cta_pos = html.find("https://example.com/manage").unwrap();
    assert!(text_pos < cta_pos);

    Ok(())
}

#[test]
fn test_mutation_serialization() {
    let mutation = Mutation::UpdateBlock {
        node_id: "text-1".to_string(),
        patch: BlockPatch::content("Hello"),
    };

    let json = serde_json::to_string(&mutation).unwrap();
    let deserialized: Mutation = serde_json::from_str(&json).unwrap();

    assert_eq!(mutation, deserialized);
}

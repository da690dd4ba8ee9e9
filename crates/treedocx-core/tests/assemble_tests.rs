//! Integration tests for tree assembly
//!
//! Covers inclusion order, deduplication and cycle handling against both the
//! in-memory and the JSON directory sources.

use std::fs;

use treedocx_ast::{Node, NodeKind};
use treedocx_core::diagnostics::{CODE_ALREADY_INCLUDED, CODE_MISSING_INCLUSION};
use treedocx_core::{Assembler, DoctreeSource, JsonDoctreeStore, MemoryStore, DOCNAME_ATTR};

fn doc(children: Vec<Node>) -> Node {
    Node::new(NodeKind::Document).with_children(children)
}

fn toctree(includes: &[&str]) -> Node {
    Node::new(NodeKind::Toctree).with_attr("includefiles", includes.to_vec())
}

fn section(title: &str, children: Vec<Node>) -> Node {
    Node::new(NodeKind::Section)
        .with_child(Node::new(NodeKind::Title).with_child(Node::text(title)))
        .with_children(children)
}

fn para(text: &str) -> Node {
    Node::new(NodeKind::Paragraph).with_child(Node::text(text))
}

// ===== Identity =====

#[test]
fn test_tree_without_inclusions_is_unchanged() {
    let tree = doc(vec![
        section(
            "Intro",
            vec![
                para("Hello"),
                Node::new(NodeKind::BulletList).with_child(
                    Node::new(NodeKind::ListItem).with_child(para("item")),
                ),
            ],
        ),
        Node::new(NodeKind::Reference).with_attr("refuri", "https://example.com/#a"),
    ]);
    let store = MemoryStore::new().with_tree("index", tree.clone());

    let assembly = Assembler::new(&store).assemble("index").unwrap();

    let mut expected = tree;
    expected.set_attr(DOCNAME_ATTR, "index");
    assert_eq!(assembly.tree, expected);
    assert!(assembly.diagnostics.is_empty());
}

// ===== Ordering =====

#[test]
fn test_inclusions_spliced_in_place_and_order() {
    let store = MemoryStore::new()
        .with_tree(
            "index",
            doc(vec![para("before"), toctree(&["a", "b"]), para("after")]),
        )
        .with_tree("a", doc(vec![section("A", vec![])]))
        .with_tree("b", doc(vec![section("B", vec![])]));

    let assembly = Assembler::new(&store).assemble("index").unwrap();
    let kinds: Vec<_> = assembly.tree.children.iter().map(|c| c.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Paragraph,
            NodeKind::SubDocument,
            NodeKind::SubDocument,
            NodeKind::Paragraph
        ]
    );
    assert_eq!(assembly.tree.children[1].attr_str(DOCNAME_ATTR), Some("a"));
    assert_eq!(assembly.tree.children[2].attr_str(DOCNAME_ATTR), Some("b"));
    assert_eq!(assembly.docnames, vec!["index", "a", "b"]);
}

// ===== Deduplication =====

#[test]
fn test_cycle_terminates_with_one_skip() {
    let store = MemoryStore::new()
        .with_tree("a", doc(vec![para("A"), toctree(&["b"])]))
        .with_tree("b", doc(vec![para("B"), toctree(&["a"])]));

    let assembly = Assembler::new(&store).assemble("a").unwrap();

    assert_eq!(assembly.diagnostics.len(), 1);
    assert_eq!(assembly.diagnostics.count_code(CODE_ALREADY_INCLUDED), 1);
    let boundary = &assembly.tree.children[1];
    assert_eq!(boundary.kind, NodeKind::SubDocument);
    // b's back-reference to a is removed, not replaced
    assert_eq!(boundary.children.len(), 1);
    assert_eq!(boundary.children[0].astext(), "B");
}

#[test]
fn test_document_included_twice_appears_once() {
    let store = MemoryStore::new()
        .with_tree("index", doc(vec![toctree(&["shared", "other"])]))
        .with_tree("other", doc(vec![toctree(&["shared"])]))
        .with_tree("shared", doc(vec![para("S")]));

    let assembly = Assembler::new(&store).assemble("index").unwrap();
    let shared_count = assembly
        .tree
        .descendants()
        .filter(|n| n.attr_str(DOCNAME_ATTR) == Some("shared"))
        .count();
    assert_eq!(shared_count, 1);
    assert_eq!(assembly.diagnostics.count_code(CODE_ALREADY_INCLUDED), 1);
}

#[test]
fn test_missing_document_then_later_sibling_still_included() {
    let store = MemoryStore::new()
        .with_tree("index", doc(vec![toctree(&["missing", "present"])]))
        .with_tree("present", doc(vec![para("P")]));

    let assembly = Assembler::new(&store).assemble("index").unwrap();
    assert_eq!(assembly.tree.children.len(), 1);
    assert_eq!(assembly.tree.children[0].astext(), "P");
    assert_eq!(assembly.diagnostics.count_code(CODE_MISSING_INCLUSION), 1);
}

// ===== Cross-document references =====

#[test]
fn test_cross_document_reference_rewritten() {
    let store = MemoryStore::new()
        .with_tree("index", doc(vec![toctree(&["guide"])]))
        .with_tree(
            "guide",
            doc(vec![Node::new(NodeKind::Paragraph).with_child(
                Node::new(NodeKind::Reference)
                    .with_attr("refuri", "guide#guide#setup")
                    .with_child(Node::text("Setup")),
            )]),
        );

    let assembly = Assembler::new(&store)
        .with_merged_target("Manual.docx")
        .assemble("index")
        .unwrap();
    let reference = assembly
        .tree
        .descendants()
        .find(|n| n.is(&NodeKind::Reference))
        .unwrap();
    assert_eq!(reference.attr_str("refuri"), Some("Manual.docx#setup"));
}

// ===== JSON directory =====

#[test]
fn test_json_directory_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let index = doc(vec![toctree(&["chapters/one"])]);
    let one = doc(vec![section("One", vec![para("text")])]);
    fs::create_dir_all(dir.path().join("chapters")).unwrap();
    fs::write(
        dir.path().join("index.json"),
        serde_json::to_string(&index).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.path().join("chapters/one.json"),
        serde_json::to_string(&one).unwrap(),
    )
    .unwrap();

    let store = JsonDoctreeStore::new(dir.path());
    assert_eq!(store.fetch_includes("index").unwrap(), vec!["chapters/one"]);

    let assembly = Assembler::new(&store).assemble("index").unwrap();
    assert_eq!(assembly.docnames, vec!["index", "chapters/one"]);
    assert_eq!(assembly.tree.astext(), "Onetext");
}

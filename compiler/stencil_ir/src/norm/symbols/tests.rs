use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

#[test]
fn test_slots_start_at_one() {
    let mut table = SymbolTable::default();
    let slots = table.push_block(&names(&["item"]));
    assert_eq!(slots, vec![1]);
    assert_eq!(table.symbols(), ["item"]);
}

#[test]
fn test_redeclare_in_same_frame_reuses_slot() {
    let mut table = SymbolTable::default();
    let slots = table.push_block(&names(&["a", "a"]));
    assert_eq!(slots, vec![1, 1]);
    assert_eq!(table.symbols().len(), 1);
}

#[test]
fn test_nested_frame_shadows_only_inside() {
    let mut table = SymbolTable::default();
    let outer = table.push_block(&names(&["n"]))[0];
    let inner = table.push_block(&names(&["n"]))[0];
    assert_ne!(outer, inner);
    assert_eq!(table.lookup_local("n"), Some(inner));
    table.pop();
    assert_eq!(table.lookup_local("n"), Some(outer));
    table.pop();
    assert_eq!(table.lookup_local("n"), None);
}

#[test]
fn test_pop_at_root_is_noop() {
    let mut table = SymbolTable::default();
    table.pop();
    assert_eq!(table.current(), FrameId::ROOT);
}

#[test]
fn test_named_and_block_slots_dedup() {
    let mut table = SymbolTable::default();
    let arg = table.allocate_named("@title");
    let block = table.allocate_block("default");
    assert_eq!(table.allocate_named("@title"), arg);
    assert_eq!(table.allocate_block("default"), block);
    assert_eq!(table.symbols(), ["@title", "&default"]);
}

#[test]
fn test_inverse_aliases_else() {
    let mut table = SymbolTable::default();
    let else_slot = table.allocate_block("else");
    assert_eq!(table.allocate_block("inverse"), else_slot);
}

#[test]
fn test_upvars_first_use_order() {
    let mut table = SymbolTable::default();
    assert_eq!(table.allocate_free("b"), 0);
    assert_eq!(table.allocate_free("a"), 1);
    assert_eq!(table.allocate_free("b"), 0);
    assert_eq!(table.upvars(), ["b", "a"]);
}

#[test]
fn test_template_locals_recorded_once() {
    let mut table = SymbolTable::new(names(&["x", "y"]));
    assert!(table.is_template_local("x"));
    assert!(!table.is_template_local("z"));
    assert_eq!(table.use_template_local("y"), 0);
    assert_eq!(table.use_template_local("y"), 0);
    assert_eq!(table.used_locals(), ["y"]);
}

#[test]
fn test_eval_info_sees_enclosing_frames() {
    let mut table = SymbolTable::default();
    let arg = table.allocate_named("@a");
    let outer = table.push_block(&names(&["x"]))[0];
    table.pop();
    let sibling = table.push_block(&names(&["y"]))[0];
    assert_eq!(table.eval_info(), vec![arg, sibling]);
    assert!(!table.eval_info().contains(&outer));
}

proptest! {
    #[test]
    fn upvar_indices_match_first_occurrence(seq in proptest::collection::vec("[a-d]", 0..20)) {
        let mut table = SymbolTable::default();
        for name in &seq {
            let index = table.allocate_free(name) as usize;
            prop_assert_eq!(&table.upvars()[index], name);
        }
        let mut expected: Vec<String> = Vec::new();
        for name in &seq {
            if !expected.contains(name) {
                expected.push(name.clone());
            }
        }
        prop_assert_eq!(table.upvars(), expected.as_slice());
    }
}

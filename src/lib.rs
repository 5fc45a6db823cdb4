#[macro_use]
extern crate lazy_static;

pub mod oracle;
pub mod parents;
pub mod parse_tree;
pub mod state;
pub mod transition;
pub mod tree;

pub use crate::oracle::{Derivation, DerivationStep, Oracle};
pub use crate::parents::ParentMap;
pub use crate::parse_tree::parse_trees;
pub use crate::state::State;
pub use crate::transition::{Transition, TransitionError};
pub use crate::tree::{HeadSide, TaggedWord, Tree};

/// Boxed static error type
pub type Err = Box<dyn std::error::Error + 'static>;

#[test]
fn test_oracle_roundtrip() {
  let treebank = r#"
    (ROOT (S (@S (NP (DT The) (NN dog)) (VP (VBD barked))) (. .)))
    (ROOT (SQ (@SQ (@SQ (VBZ Is) (NP (DT this) (NN wine))) (ADJP (JJ oaked))) (. ?)))
  "#;

  for compound_unaries in [false, true] {
    let trees = parse_trees(treebank).unwrap();
    let oracle = Oracle::new(trees.clone(), compound_unaries).unwrap();
    for (index, gold) in trees.iter().enumerate() {
      let mut state = State::from_gold_tree(gold);
      while !state.is_finished() {
        let transition = oracle.gold_transition(index, &state).unwrap();
        state = transition.apply(&state).unwrap();
      }
      assert_eq!(state.peek_stack().unwrap(), gold);
    }
  }
}

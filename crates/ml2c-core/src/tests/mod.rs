/*! Unit coverage for model extraction and tree validation.
 *
 * Extraction is the only place a model's kind is inspected, so every accepted and rejected shape
 * is pinned here before the emitters ever see a spec.
 */


use crate::model::{TreeTable, TREE_LEAF};

/// Root splits feature 0 at 0.5; left is class 0, right splits feature 1 at 1.0 into classes 0/1.
pub(crate) fn two_level_table() -> TreeTable {
    TreeTable {
        children_left: vec![1, TREE_LEAF, 3, TREE_LEAF, TREE_LEAF],
        children_right: vec![2, TREE_LEAF, 4, TREE_LEAF, TREE_LEAF],
        feature: vec![0, -2, 1, -2, -2],
        threshold: vec![0.5, -2.0, 1.0, -2.0, -2.0],
        value: vec![
            vec![vec![6.0, 4.0]],
            vec![vec![5.0, 0.0]],
            vec![vec![1.0, 4.0]],
            vec![vec![1.0, 0.0]],
            vec![vec![0.0, 4.0]],
        ],
    }
}

//! Decision-tree lowering.
//!
//! The node table is walked depth-first from the root. A split becomes
//! `if (features[f] <= t) { left } else { right }` and a leaf becomes `return <class>.0f;`.
//! The comparison is always `<=`, so a value equal to the threshold goes left. Thresholds are
//! narrowed to single precision, and inputs within float rounding of a threshold may take a
//! different branch than the double-precision model would.

use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use crate::literal::{format_class_literal, format_float_literal};
use crate::source::PREDICTION_SIGNATURE;
use ml2c_core::{Ml2cError, TreeSpec};
use tracing::debug;

pub struct TreeEmitter;

impl TreeEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Lower the whole tree into `out`, starting at the context's current indentation.
    ///
    /// Returns the number of leaves emitted.
    pub fn lower(
        &self,
        tree: &TreeSpec,
        out: &mut String,
        context: &mut EmitContext,
    ) -> EmitResult<usize> {
        let mut walk = Walk {
            tree,
            visited: vec![false; tree.nodes().len()],
            leaves: 0,
        };
        walk.run(out, context)?;

        if walk.leaves != tree.n_leaves() {
            return Err(Ml2cError::MalformedTree(format!(
                "lowered {} leaves but the tree has {}",
                walk.leaves,
                tree.n_leaves()
            ))
            .into());
        }
        Ok(walk.leaves)
    }
}

impl Default for TreeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for TreeEmitter {
    type Item = TreeSpec;

    fn emit(&self, item: &TreeSpec, out: &mut String, context: &mut EmitContext) -> EmitResult {
        EmitHelper::write_block(out, context, PREDICTION_SIGNATURE, |w, c| {
            let leaves = self.lower(item, w, c)?;
            debug!(leaves, depth = item.depth(), "lowered decision tree");
            Ok(())
        })
    }
}

/// Pending output while walking the tree.
enum Step {
    Open { id: usize, depth: usize },
    Else,
    Close,
}

struct Walk<'a> {
    tree: &'a TreeSpec,
    visited: Vec<bool>,
    leaves: usize,
}

impl Walk<'_> {
    /// Pre-order walk driven by an explicit stack, so tree depth never grows the call stack.
    fn run(&mut self, out: &mut String, context: &mut EmitContext) -> EmitResult {
        let mut stack = vec![Step::Open { id: 0, depth: 1 }];
        while let Some(step) = stack.pop() {
            match step {
                Step::Open { id, depth } => {
                    if let Some((left, right)) = self.open(id, depth, out, context)? {
                        context.indent();
                        stack.push(Step::Close);
                        stack.push(Step::Open {
                            id: right,
                            depth: depth + 1,
                        });
                        stack.push(Step::Else);
                        stack.push(Step::Open {
                            id: left,
                            depth: depth + 1,
                        });
                    }
                }
                Step::Else => {
                    context.dedent();
                    EmitHelper::write_line(out, context, "} else {")?;
                    context.indent();
                }
                Step::Close => {
                    context.dedent();
                    EmitHelper::write_line(out, context, "}")?;
                }
            }
        }
        Ok(())
    }

    /// Write the line that opens node `id`. Returns its children when it is a split.
    fn open(
        &mut self,
        id: usize,
        depth: usize,
        out: &mut String,
        context: &EmitContext,
    ) -> EmitResult<Option<(usize, usize)>> {
        let n_nodes = self.tree.nodes().len();
        let node = self.tree.node(id).ok_or_else(|| {
            Ml2cError::MalformedTree(format!("child index {} outside {} nodes", id, n_nodes))
        })?;
        if depth > n_nodes {
            return Err(Ml2cError::MalformedTree(format!(
                "recursion depth {} exceeds node count {}",
                depth, n_nodes
            ))
            .into());
        }
        if self.visited[id] {
            return Err(Ml2cError::MalformedTree(format!("node {} visited twice", id)).into());
        }
        self.visited[id] = true;

        if node.is_leaf {
            let class_id = node.leaf_value.ok_or_else(|| {
                Ml2cError::MalformedTree(format!("leaf {} has no class id", id))
            })?;
            EmitHelper::write_line(
                out,
                context,
                &format!("return {};", format_class_literal(class_id)),
            )?;
            self.leaves += 1;
            return Ok(None);
        }

        EmitHelper::write_line(
            out,
            context,
            &format!(
                "if (features[{}] <= {}) {{",
                node.feature,
                format_float_literal(node.threshold)
            ),
        )?;
        Ok(Some((node.left_child, node.right_child)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ml2c_core::TreeNode;
    use pretty_assertions::assert_eq;

    fn two_level_tree() -> TreeSpec {
        TreeSpec::new(
            vec![
                TreeNode::split(0, 0, 0.5, 1, 2),
                TreeNode::leaf(1, 0),
                TreeNode::split(2, 1, 1.0, 3, 4),
                TreeNode::leaf(3, 0),
                TreeNode::leaf(4, 1),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_two_level_tree_lowering() {
        let code = TreeEmitter::new().emit_to_string(&two_level_tree()).unwrap();

        assert_eq!(
            code,
            "float prediction(float *features, int n_features) {\n\
             \x20   if (features[0] <= 0.5000000000f) {\n\
             \x20       return 0.0f;\n\
             \x20   } else {\n\
             \x20       if (features[1] <= 1.0000000000f) {\n\
             \x20           return 0.0f;\n\
             \x20       } else {\n\
             \x20           return 1.0f;\n\
             \x20       }\n\
             \x20   }\n\
             }\n"
        );
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = TreeSpec::new(vec![TreeNode::leaf(0, 3)], 4).unwrap();
        let code = TreeEmitter::new().emit_to_string(&tree).unwrap();

        assert_eq!(
            code,
            "float prediction(float *features, int n_features) {\n    return 3.0f;\n}\n"
        );
    }

    #[test]
    fn test_lower_reports_leaf_count() {
        let tree = two_level_tree();
        let mut out = String::new();
        let mut ctx = EmitContext::new().nested();

        let leaves = TreeEmitter::new().lower(&tree, &mut out, &mut ctx).unwrap();
        assert_eq!(leaves, 3);
        assert_eq!(out.matches("return ").count(), 3);
        assert_eq!(ctx.indent_level, 1);
    }

    #[test]
    fn test_deepest_return_matches_depth() {
        let tree = two_level_tree();
        let code = TreeEmitter::new().emit_to_string(&tree).unwrap();

        let deepest = code
            .lines()
            .filter(|line| line.trim_start().starts_with("return"))
            .map(|line| line.len() - line.trim_start().len())
            .max()
            .unwrap();
        assert_eq!(deepest, 4 * tree.depth());
    }

    /// Split `k` sends its left branch to a leaf and its right branch one level further down.
    fn chain_tree(splits: usize) -> TreeSpec {
        let mut nodes = Vec::with_capacity(2 * splits + 1);
        for k in 0..splits {
            let id = 2 * k;
            nodes.push(TreeNode::split(id, 0, k as f64, id + 1, id + 2));
            nodes.push(TreeNode::leaf(id + 1, k % 2));
        }
        nodes.push(TreeNode::leaf(2 * splits, 1));
        TreeSpec::new(nodes, 1).unwrap()
    }

    #[test]
    fn test_deep_chain_lowers_on_a_small_stack() {
        let splits = 3000;
        let lowered = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let tree = chain_tree(splits);
                let code = TreeEmitter::new().emit_to_string(&tree).unwrap();
                (tree.depth(), tree.n_leaves(), code)
            })
            .unwrap()
            .join()
            .unwrap();
        let (depth, leaves, code) = lowered;

        assert_eq!(depth, splits + 1);
        assert_eq!(leaves, splits + 1);
        assert_eq!(code.matches("return ").count(), leaves);
        assert_eq!(code.matches("} else {").count(), splits);

        let last_return = code
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with("return"))
            .unwrap();
        assert_eq!(last_return.len() - last_return.trim_start().len(), 4 * depth);
        assert_eq!(last_return.trim_start(), "return 1.0f;");
        assert!(code.ends_with("    }\n}\n"));
    }
}

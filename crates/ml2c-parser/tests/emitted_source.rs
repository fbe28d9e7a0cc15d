use ml2c_core::{ModelSpec, TreeNode, TreeSpec};
use ml2c_emit::{CEmitter, TestVectors, PREDICTION_SIGNATURE};
use ml2c_parser::summarize;
use pretty_assertions::assert_eq;

/// A left-leaning chain of `depth - 1` splits; every split's right child is a leaf.
fn chain_tree(depth: usize) -> TreeSpec {
    let mut nodes = Vec::new();
    for level in 0..depth - 1 {
        let id = nodes.len();
        nodes.push(TreeNode::split(id, level % 3, level as f64 * 0.25, id + 2, id + 1));
        nodes.push(TreeNode::leaf(id + 1, level % 2));
    }
    let last = nodes.len();
    nodes.push(TreeNode::leaf(last, 2));
    TreeSpec::new(nodes, 3).unwrap()
}

fn all_specs() -> Vec<ModelSpec> {
    vec![
        ModelSpec::linear(2.0, vec![3.0, 1.5, -0.5]).unwrap(),
        ModelSpec::logistic(-0.3, vec![0.7, -1.1, 2.5, 0.01]).unwrap(),
        ModelSpec::tree(chain_tree(4)),
    ]
}

#[test]
fn test_every_variant_parses_with_one_prediction() {
    for spec in all_specs() {
        let source = CEmitter::new().emit(&spec, None).unwrap();
        let summary = match summarize(source.as_str()) {
            Ok(summary) => summary,
            Err(e) => panic!("generated source failed to parse: {}\n{}", e, source),
        };

        assert_eq!(summary.count_named("prediction"), 1);
        assert_eq!(
            summary.function("prediction").unwrap().signature,
            PREDICTION_SIGNATURE
        );
        assert_eq!(summary.count_named("main"), 1);
        assert!(summary.includes_header("stdio.h"));
    }
}

#[test]
fn test_symbols_per_variant() {
    let names = |spec: &ModelSpec| -> Vec<String> {
        let source = CEmitter::new().emit(spec, None).unwrap();
        summarize(source.as_str())
            .unwrap()
            .functions
            .into_iter()
            .map(|f| f.name)
            .collect()
    };

    let specs = all_specs();
    assert_eq!(names(&specs[0]), vec!["prediction", "main"]);
    assert_eq!(names(&specs[1]), vec!["sigmoid", "prediction", "main"]);
    assert_eq!(names(&specs[2]), vec!["prediction", "main"]);
}

#[test]
fn test_logistic_includes_math_header() {
    let source = CEmitter::new().emit(&all_specs()[1], None).unwrap();
    let summary = summarize(source.as_str()).unwrap();

    assert_eq!(summary.includes, vec!["stdio.h", "math.h"]);
}

#[test]
fn test_tree_returns_cover_every_leaf() {
    for depth in 1..8 {
        let tree = chain_tree(depth);
        let source = CEmitter::new()
            .emit(&ModelSpec::tree(tree.clone()), None)
            .unwrap();
        let summary = summarize(source.as_str()).unwrap();
        let prediction = summary.function("prediction").unwrap();

        assert_eq!(prediction.returns, tree.n_leaves());
        assert_eq!(tree.depth(), depth);
        assert_eq!(prediction.max_return_indent, 4 * depth);
    }
}

#[test]
fn test_multiple_test_vectors_parse() {
    let spec = ModelSpec::linear(0.0, vec![1.0, 1.0]).unwrap();
    let vectors = TestVectors::new(vec![vec![0.0, 1.0], vec![-3.5, 2.0], vec![1e6, -1e-6]]);
    let source = CEmitter::new().emit(&spec, Some(&vectors)).unwrap();
    let summary = summarize(source.as_str()).unwrap();

    assert_eq!(summary.function("main").unwrap().returns, 1);
}

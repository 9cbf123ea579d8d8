//! Integration test: dispatch ordering and failure isolation of the tree walker.

use std::sync::{Arc, Mutex};
use tree_lint_core::{
    run_tree_walker, Check, CheckBox, CheckError, CheckResult, CommentToken, FileContext, Node,
    NodeId, NodeSpec, Phase, Reporter, SourceFile, SyntaxTree, TokenKind, TreeWalker,
};

type Log = Arc<Mutex<Vec<(char, NodeId)>>>;

/// Records every visit and leave it receives.
struct Tracer {
    tokens: Vec<TokenKind>,
    log: Log,
}

impl Check for Tracer {
    fn name(&self) -> &'static str {
        "Tracer"
    }
    fn acceptable_tokens(&self) -> &[TokenKind] {
        &self.tokens
    }
    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        Ok(())
    }
    fn visit_token(&mut self, node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        self.log.lock().unwrap().push(('v', node.id()));
        Ok(())
    }
    fn leave_token(&mut self, node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        self.log.lock().unwrap().push(('l', node.id()));
        Ok(())
    }
}

/// Asserts that `begin_file` ran before the first visit of every file.
#[derive(Default)]
struct MethodCounter {
    visits: usize,
    started: bool,
}

impl Check for MethodCounter {
    fn name(&self) -> &'static str {
        "MethodCounter"
    }
    fn acceptable_tokens(&self) -> &[TokenKind] {
        &[TokenKind::MethodDef]
    }
    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        self.visits = 0;
        self.started = true;
        Ok(())
    }
    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        if !self.started {
            return Err(CheckError::new("visit before begin_file"));
        }
        self.visits += 1;
        reporter.log(node, "method.index", &[&self.visits]);
        Ok(())
    }
    fn end_file(&mut self, _reporter: &mut Reporter<'_>) -> CheckResult {
        self.started = false;
        Ok(())
    }
}

/// Reports every node of its kinds, failing on a node named "boom".
struct Exploder {
    phase: Phase,
}

impl Check for Exploder {
    fn name(&self) -> &'static str {
        "Exploder"
    }
    fn acceptable_tokens(&self) -> &[TokenKind] {
        &[TokenKind::MethodDef]
    }
    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        Ok(())
    }
    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        reporter.log(node, "seen", &[&node.text()]);
        if self.phase == Phase::VisitToken && node.text() == "boom" {
            return Err(CheckError::new("cannot handle boom"));
        }
        Ok(())
    }
    fn leave_token(&mut self, node: Node<'_>, _reporter: &mut Reporter<'_>) -> CheckResult {
        if self.phase == Phase::LeaveToken && node.text() == "boom" {
            return Err(CheckError::new("cannot leave boom"));
        }
        Ok(())
    }
}

/// Needs comment nodes and reports each comment body.
#[derive(Default)]
struct CommentEcho;

impl Check for CommentEcho {
    fn name(&self) -> &'static str {
        "CommentEcho"
    }
    fn acceptable_tokens(&self) -> &[TokenKind] {
        &[TokenKind::CommentContent]
    }
    fn is_comment_nodes_required(&self) -> bool {
        true
    }
    fn begin_file(&mut self, _ctx: &FileContext<'_>) -> CheckResult {
        Ok(())
    }
    fn visit_token(&mut self, node: Node<'_>, reporter: &mut Reporter<'_>) -> CheckResult {
        reporter.log(node, "comment", &[&node.text().trim()]);
        Ok(())
    }
}

fn class_file(methods: &[&str]) -> SourceFile {
    let methods: Vec<NodeSpec> = methods
        .iter()
        .enumerate()
        .map(|(i, name)| {
            NodeSpec::new(TokenKind::MethodDef, *name, i + 2, 4).with_children(vec![
                NodeSpec::new(TokenKind::Ident, *name, i + 2, 9),
                NodeSpec::new(TokenKind::Slist, "{", i + 2, 12)
                    .with_children(vec![NodeSpec::new(TokenKind::Rcurly, "}", i + 2, 13)]),
            ])
        })
        .collect();
    let tree = SyntaxTree::from_specs(&[NodeSpec::new(TokenKind::ClassDef, "C", 1, 0)
        .with_children(vec![
            NodeSpec::new(TokenKind::Ident, "C", 1, 6),
            NodeSpec::new(TokenKind::ObjBlock, "{", 1, 8).with_children(methods),
        ])]);
    SourceFile::new("C.java", tree)
}

fn all_kinds_tracer(log: &Log) -> CheckBox {
    Box::new(Tracer {
        tokens: TokenKind::ALL.to_vec(),
        log: Arc::clone(log),
    })
}

#[test]
fn every_visited_node_is_left_after_its_descendants() {
    let log = Log::default();
    let mut file = class_file(&["a", "b", "c"]);
    let outcome = run_tree_walker(&mut file, vec![all_kinds_tracer(&log)]).unwrap();
    assert!(outcome.is_complete());

    let events = log.lock().unwrap().clone();
    let visits: Vec<NodeId> = events.iter().filter(|e| e.0 == 'v').map(|e| e.1).collect();
    let mut leaves: Vec<NodeId> = events.iter().filter(|e| e.0 == 'l').map(|e| e.1).collect();
    assert_eq!(visits, file.tree.preorder());

    let position = |kind: char, id: NodeId| events.iter().position(|e| *e == (kind, id)).unwrap();
    for &id in &visits {
        let node = file.tree.node(id);
        let leave = position('l', id);
        assert!(position('v', id) < leave);
        for child in node.children() {
            assert!(position('l', child.id()) < leave);
        }
    }

    leaves.sort();
    let mut sorted_visits = visits.clone();
    sorted_visits.sort();
    assert_eq!(leaves, sorted_visits);
}

#[test]
fn leave_order_is_post_order() {
    let log = Log::default();
    let mut file = class_file(&["a"]);
    run_tree_walker(&mut file, vec![all_kinds_tracer(&log)]).unwrap();

    let kinds: Vec<TokenKind> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.0 == 'l')
        .map(|e| file.tree.node(e.1).kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Rcurly,
            TokenKind::Slist,
            TokenKind::MethodDef,
            TokenKind::ObjBlock,
            TokenKind::ClassDef,
        ]
    );
}

#[test]
fn begin_file_resets_state_for_every_file() {
    let mut walker = TreeWalker::new();
    walker.register(Box::<MethodCounter>::default()).unwrap();

    for _ in 0..3 {
        let outcome = walker.process(&mut class_file(&["a", "b"]));
        assert!(outcome.is_complete(), "{:?}", outcome.failure);
        let counts: Vec<&str> = outcome.violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(counts, vec!["method.index: 1", "method.index: 2"]);
    }
}

#[test]
fn identical_runs_produce_identical_output() {
    let run = || {
        let mut walker = TreeWalker::new();
        walker.register(Box::<MethodCounter>::default()).unwrap();
        walker
            .register(Box::new(Exploder {
                phase: Phase::EndFile,
            }))
            .unwrap();
        let outcome = walker.process(&mut class_file(&["x", "y", "z"]));
        outcome
            .violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, run());
    // Same position: registration order decides.
    assert_eq!(first[0], "C.java:2:5: error [MethodCounter] method.index: 1");
    assert_eq!(first[1], "C.java:2:5: error [Exploder] seen: x");
}

#[test]
fn failing_visit_keeps_partial_results_and_skips_the_rest() {
    let log = Log::default();
    let mut file = class_file(&["ok", "boom", "after"]);
    let outcome = run_tree_walker(
        &mut file,
        vec![
            Box::new(Exploder {
                phase: Phase::VisitToken,
            }),
            Box::new(Tracer {
                tokens: vec![TokenKind::MethodDef],
                log: Arc::clone(&log),
            }),
        ],
    )
    .unwrap();

    let failure = outcome.failure.expect("failure should be reported");
    assert_eq!(failure.check, "Exploder");
    assert_eq!(failure.phase, Phase::VisitToken);
    assert_eq!((failure.line, failure.column), (Some(3), Some(5)));

    let seen: Vec<&str> = outcome.violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(seen, vec!["seen: ok", "seen: boom"]);
    // The second check never saw the failing node.
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[test]
fn failing_leave_is_reported_with_its_phase() {
    let mut file = class_file(&["boom"]);
    let outcome = run_tree_walker(
        &mut file,
        vec![Box::new(Exploder {
            phase: Phase::LeaveToken,
        })],
    )
    .unwrap();
    let failure = outcome.failure.unwrap();
    assert_eq!(failure.phase, Phase::LeaveToken);
    assert_eq!(outcome.violations.len(), 1);
}

#[test]
fn failure_is_isolated_to_one_file() {
    let mut walker = TreeWalker::new();
    walker
        .register(Box::new(Exploder {
            phase: Phase::VisitToken,
        }))
        .unwrap();

    assert!(walker.process(&mut class_file(&["boom"])).failure.is_some());
    let next = walker.process(&mut class_file(&["fine"]));
    assert!(next.is_complete());
    assert_eq!(next.violations.len(), 1);
}

#[test]
fn comment_nodes_are_spliced_when_required() {
    let mut file = class_file(&["a"]).with_comments(vec![
        CommentToken::single_line(" header", 1, 20),
        CommentToken::block(" inside ", 2, 20),
    ]);
    let outcome = run_tree_walker(&mut file, vec![Box::new(CommentEcho)]).unwrap();
    assert!(file.has_spliced_comments());

    let seen: Vec<String> = outcome.violations.iter().map(ToString::to_string).collect();
    assert_eq!(
        seen,
        vec![
            "C.java:1:23: error [CommentEcho] comment: header",
            "C.java:2:23: error [CommentEcho] comment: inside",
        ]
    );
}

#[test]
fn comments_are_left_alone_when_not_required() {
    let log = Log::default();
    let mut file = class_file(&["a"]).with_comments(vec![CommentToken::single_line(" x", 1, 0)]);
    run_tree_walker(&mut file, vec![all_kinds_tracer(&log)]).unwrap();
    assert!(!file.has_spliced_comments());
}

#[test]
fn deep_trees_do_not_overflow_the_stack() {
    const DEPTH: usize = 200_000;
    let mut tree = SyntaxTree::new();
    let root = tree.push_node(TokenKind::Slist, "{", 1, 0);
    tree.set_root(root).unwrap();
    let mut parent = root;
    for i in 1..DEPTH {
        let child = tree.push_node(TokenKind::Slist, "{", i + 1, 0);
        tree.append_child(parent, child).unwrap();
        parent = child;
    }

    let log = Log::default();
    let mut file = SourceFile::new("Deep.java", tree);
    let outcome = run_tree_walker(&mut file, vec![all_kinds_tracer(&log)]).unwrap();
    assert!(outcome.is_complete());

    let events = log.lock().unwrap();
    assert_eq!(events.len(), DEPTH * 2);
    assert_eq!(events[DEPTH - 1], ('v', parent));
    assert_eq!(events[DEPTH], ('l', parent));
    assert_eq!(events[DEPTH * 2 - 1], ('l', root));
}

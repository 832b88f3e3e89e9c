//! Checker integration tests: parse, bind and type check whole programs.

use cminus_ast::{NodeId, NodeKind, SyntaxTree, Type};
use cminus_binder::{Binder, ScopeError};
use cminus_checker::{analyze, Analysis, Checker};
use cminus_core::StringInterner;
use cminus_diagnostics::DiagnosticCategory;
use cminus_parser::Parser;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parse(source: &str) -> SyntaxTree {
    init_logger();
    let output = Parser::from_source(source, StringInterner::new()).parse_program();
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics.render());
    output.tree
}

/// Helper: parse and analyze source; the source must parse cleanly.
fn check(source: &str) -> (SyntaxTree, Analysis) {
    let mut tree = parse(source);
    let analysis = analyze(&mut tree).expect("scope stack stays balanced");
    (tree, analysis)
}

fn messages(analysis: &Analysis) -> Vec<String> {
    analysis.diagnostics.iter().map(|d| d.to_string()).collect()
}

fn nodes_where(tree: &SyntaxTree, matches: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
    (0..tree.len() as u32)
        .map(NodeId)
        .filter(|&id| matches(&tree.node(id).kind))
        .collect()
}

fn calls_named(tree: &SyntaxTree, callee: &str) -> Vec<NodeId> {
    nodes_where(tree, |kind| matches!(kind, NodeKind::Call { name, .. } if tree.name_text(*name) == callee))
}

fn refs_named(tree: &SyntaxTree, variable: &str) -> Vec<NodeId> {
    nodes_where(tree, |kind| matches!(kind, NodeKind::VarRef { name, .. } if tree.name_text(*name) == variable))
}

// ============================================================================
// Well-typed programs
// ============================================================================

#[test]
fn test_call_types_as_return_type() {
    let (tree, analysis) = check(
        "int f(int a) { return a + 1; }\n\
         void main(void) { int r; r = f(5); }\n",
    );
    assert!(analysis.succeeded(), "{:?}", messages(&analysis));

    let call = calls_named(&tree, "f");
    assert_eq!(call.len(), 1);
    assert_eq!(tree.node(call[0]).ty, Type::Int);

    let sums = nodes_where(&tree, |kind| matches!(kind, NodeKind::Binary { .. }));
    assert_eq!(tree.node(sums[0]).ty, Type::Int);
}

#[test]
fn test_constants_and_assignments_are_typed() {
    let (tree, analysis) = check("void main(void) { int x; int y; x = y = 3; }\n");
    assert!(analysis.succeeded(), "{:?}", messages(&analysis));

    for id in nodes_where(&tree, |kind| matches!(kind, NodeKind::Const { .. } | NodeKind::Assign { .. })) {
        assert_eq!(tree.node(id).ty, Type::Int);
    }
}

#[test]
fn test_builtins_type_check() {
    let (tree, analysis) = check("void main(void) { int x; x = input(); output(x + 1); }\n");
    assert!(analysis.succeeded(), "{:?}", messages(&analysis));
    assert_eq!(tree.node(calls_named(&tree, "input")[0]).ty, Type::Int);
    assert_eq!(tree.node(calls_named(&tree, "output")[0]).ty, Type::Void);
}

#[test]
fn test_recorded_scopes_are_reentered() {
    let source = "\
int x;
void main(void) {
  int x[3];
  x[1] = 2;
  { int y; y = x[0]; }
}
void g(void) { x = 1; }
";
    let (tree, analysis) = check(source);
    assert!(analysis.succeeded(), "{:?}", messages(&analysis));

    let refs = refs_named(&tree, "x");
    let types: Vec<Type> = refs.iter().map(|&id| tree.node(id).ty).collect();
    assert_eq!(types, vec![Type::Int, Type::Int, Type::Int]);
}

#[test]
fn test_array_parameters_accept_arrays() {
    let source = "\
int sum(int v[], int n) {
  int i; int s;
  i = 0; s = 0;
  while (i < n) { s = s + v[i]; i = i + 1; }
  return s;
}
void main(void) { int a[4]; output(sum(a, 4)); }
";
    let (_, analysis) = check(source);
    assert!(analysis.succeeded(), "{:?}", messages(&analysis));
}

// ============================================================================
// Returns
// ============================================================================

#[test]
fn test_value_return_from_void_function() {
    let (_, analysis) = check("void g(void) { return 1; }\n");
    assert_eq!(messages(&analysis), vec!["Error: Invalid return at line 1"]);
    assert_eq!(analysis.diagnostics.count_of(DiagnosticCategory::Type), 1);
}

#[test]
fn test_bare_return_from_int_function() {
    let (_, analysis) = check("int f(void) {\n  return;\n}\n");
    assert_eq!(messages(&analysis), vec!["Error: Invalid return at line 2"]);
}

#[test]
fn test_mismatched_return_type() {
    let (_, analysis) = check("int h(void) {\n  int a[2];\n  return a;\n}\nvoid k(void) { return; }\n");
    assert_eq!(messages(&analysis), vec!["Error: Invalid return at line 3"]);
}

// ============================================================================
// Array indexing
// ============================================================================

#[test]
fn test_indexing_an_array() {
    let (tree, analysis) = check("void main(void) { int a[10]; int x; x = a[0]; }\n");
    assert!(analysis.succeeded(), "{:?}", messages(&analysis));

    let a = refs_named(&tree, "a");
    assert_eq!(tree.node(a[0]).ty, Type::Int);
}

#[test]
fn test_non_int_index() {
    let (tree, analysis) = check("void main(void) {\n  int a[10]; int y[2];\n  a[y];\n}\n");
    assert_eq!(
        messages(&analysis),
        vec!["Error: Invalid array indexing at line 3 (name : \"a\"). indicies should be integer"]
    );
    assert_eq!(tree.node(refs_named(&tree, "a")[0]).ty, Type::IntArray);
}

#[test]
fn test_indexing_a_plain_int() {
    let (tree, analysis) = check("void main(void) {\n  int x;\n  x[0];\n}\n");
    assert_eq!(
        messages(&analysis),
        vec!["Error: Invalid array indexing at line 3 (name : \"x\"). indexing can only allowed for int[] variables"]
    );
    assert_eq!(tree.node(refs_named(&tree, "x")[0]).ty, Type::Int);
}

// ============================================================================
// Conditions, operations, assignments
// ============================================================================

#[test]
fn test_conditions_must_be_int() {
    let source = "\
void main(void) {
  int a[3];
  if (a) ;
  while (output(1)) ;
  if (a[0] < 2) ; else ;
}
";
    let (_, analysis) = check(source);
    assert_eq!(
        messages(&analysis),
        vec!["Error: invalid condition at line 3", "Error: invalid condition at line 4"]
    );
}

#[test]
fn test_operation_on_array_cascades_into_assignment() {
    let (tree, analysis) = check("void main(void) {\n  int a[3]; int x;\n  x = a + 1;\n}\n");
    assert_eq!(
        messages(&analysis),
        vec!["Error: invalid operation at line 3", "Error: invalid assignment at line 3"]
    );

    let sum = nodes_where(&tree, |kind| matches!(kind, NodeKind::Binary { .. }));
    assert_eq!(tree.node(sum[0]).ty, Type::Undetermined);
}

#[test]
fn test_assignment_rules() {
    let source = "\
void main(void) {
  int x; int a[2]; int b[2];
  x = output(x);
  x = a;
  a = b;
}
";
    let (_, analysis) = check(source);
    assert_eq!(
        messages(&analysis),
        vec!["Error: invalid assignment at line 3", "Error: invalid assignment at line 4"]
    );
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_call_argument_checks() {
    let source = "\
int f(int a, int b[]) { return a; }
void main(void) {
  int v[4]; int x;
  x = f(x, v);
  x = f(v, x);
  x = f(x);
  f(x, v, 3);
  input(1);
  output();
}
";
    let (tree, analysis) = check(source);
    assert_eq!(
        messages(&analysis),
        vec![
            "Error: Invalid function call at line 5 (name : \"f\")",
            "Error: Invalid function call at line 6 (name : \"f\")",
            "Error: Invalid function call at line 7 (name : \"f\")",
            "Error: Invalid function call at line 8 (name : \"input\")",
            "Error: Invalid function call at line 9 (name : \"output\")",
        ]
    );

    // A bad call still has the callee's return type.
    for call in calls_named(&tree, "f") {
        assert_eq!(tree.node(call).ty, Type::Int);
    }
}

#[test]
fn test_calling_a_variable() {
    let (tree, analysis) = check("void main(void) {\n  int x;\n  x(1);\n}\n");
    assert_eq!(messages(&analysis), vec!["Error: Invalid function call at line 3 (name : \"x\")"]);
    assert_eq!(tree.node(calls_named(&tree, "x")[0]).ty, Type::Undetermined);
}

// ============================================================================
// Recovery from binding errors
// ============================================================================

#[test]
fn test_undeclared_variable_reported_once() {
    let source = "\
void main(void) {
  int x;
  x = y;
  y;
  x = x + 1;
}
";
    let (tree, analysis) = check(source);
    assert_eq!(
        messages(&analysis),
        vec![
            "Error: undeclared variable \"y\" is used at line 3",
            "Error: invalid assignment at line 3",
        ]
    );
    assert_eq!(analysis.diagnostics.count_of(DiagnosticCategory::Binding), 1);

    for id in refs_named(&tree, "y") {
        assert_eq!(tree.node(id).ty, Type::Undetermined);
    }
    let assigns = nodes_where(&tree, |kind| matches!(kind, NodeKind::Assign { .. }));
    assert_eq!(tree.node(assigns[1]).ty, Type::Int);
}

#[test]
fn test_undeclared_call_matches_no_arguments() {
    let source = "\
void main(void) {
  foo(1);
  foo();
}
";
    let (tree, analysis) = check(source);
    assert_eq!(
        messages(&analysis),
        vec![
            "Error: undeclared function \"foo\" is called at line 2",
            "Error: Invalid function call at line 2 (name : \"foo\")",
            "Error: Invalid function call at line 3 (name : \"foo\")",
        ]
    );
    assert_eq!(analysis.diagnostics.count_of(DiagnosticCategory::Binding), 1);
    for id in calls_named(&tree, "foo") {
        assert_eq!(tree.node(id).ty, Type::Undetermined);
    }
}

#[test]
fn test_indexing_an_undeclared_variable() {
    let source = "\
void main(void) {
  int x;
  x = ghost[0];
}
";
    let (tree, analysis) = check(source);
    assert_eq!(
        messages(&analysis),
        vec![
            "Error: undeclared variable \"ghost\" is used at line 3",
            "Error: Invalid array indexing at line 3 (name : \"ghost\"). indexing can only allowed for int[] variables",
            "Error: invalid assignment at line 3",
        ]
    );
    assert_eq!(tree.node(refs_named(&tree, "ghost")[0]).ty, Type::Undetermined);
}

#[test]
fn test_void_variable_use() {
    let (_, analysis) = check("void main(void) {\n  void v;\n  v;\n}\n");
    assert_eq!(
        messages(&analysis),
        vec![
            "Error: The void-type variable is declared at line 2 (name : \"v\")",
            "Error: The void-type variable is declared at line 3 (name : \"v\")",
        ]
    );
    assert_eq!(analysis.diagnostics.count_of(DiagnosticCategory::Type), 1);
}

#[test]
fn test_void_use_reported_before_index_errors() {
    let source = "\
void main(void) {
  int a[4];
  void v;
  v[a];
}
";
    let (_, analysis) = check(source);
    assert_eq!(
        messages(&analysis),
        vec![
            "Error: The void-type variable is declared at line 3 (name : \"v\")",
            "Error: The void-type variable is declared at line 4 (name : \"v\")",
            "Error: Invalid array indexing at line 4 (name : \"v\"). indicies should be integer",
            "Error: Invalid array indexing at line 4 (name : \"v\"). indexing can only allowed for int[] variables",
        ]
    );
}

// ============================================================================
// Driver contract
// ============================================================================

#[test]
fn test_unbound_tree_is_rejected() {
    let mut bound = parse("int x;\n");
    let mut binder = Binder::new();
    binder.bind_program(&mut bound).expect("binds");

    let mut unbound = parse("void main(void) { }\n");
    let mut checker = Checker::new(binder);
    assert!(matches!(
        checker.check_program(&mut unbound),
        Err(ScopeError::UnboundBlock(_))
    ));
}

#[test]
fn test_analysis_exposes_scope_table() {
    let (tree, analysis) = check("int g;\nvoid main(void) { int l; l = g; }\n");
    assert!(analysis.succeeded());

    let global = analysis.scopes.global_scope().expect("global scope");
    let names: Vec<&str> = analysis
        .scopes
        .scope(global)
        .symbols()
        .map(|id| tree.name_text(analysis.scopes.symbol(id).name))
        .collect();
    assert_eq!(names, vec!["input", "output", "g", "main"]);
}

//! Binder integration tests.
//!
//! Tests the parse -> bind pipeline and verifies scopes, symbols, slots and
//! binding diagnostics.

use cminus_ast::{NodeId, NodeKind, ScopeId, SyntaxTree, Type};
use cminus_binder::{Binder, Builtin, ScopeTable, Symbol, SymbolKind, SymbolOrigin};
use cminus_core::StringInterner;
use cminus_diagnostics::DiagnosticCategory;
use cminus_parser::Parser;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Helper: parse and bind source; the source must parse cleanly.
fn bind(source: &str) -> (SyntaxTree, Binder) {
    init_logger();
    let output = Parser::from_source(source, StringInterner::new()).parse_program();
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics.render());
    let mut tree = output.tree;
    let mut binder = Binder::new();
    binder.bind_program(&mut tree).expect("scope stack stays balanced");
    (tree, binder)
}

fn messages(binder: &Binder) -> Vec<String> {
    binder.diagnostics().iter().map(|d| d.to_string()).collect()
}

/// Every symbol named `name`, in creation order.
fn symbols_named<'a>(tree: &SyntaxTree, table: &'a ScopeTable, name: &str) -> Vec<&'a Symbol> {
    table
        .symbols()
        .iter()
        .filter(|symbol| tree.name_text(symbol.name) == name)
        .collect()
}

fn scope_names(tree: &SyntaxTree, table: &ScopeTable) -> Vec<String> {
    table
        .scopes()
        .iter()
        .map(|scope| tree.name_text(scope.name).to_string())
        .collect()
}

// ============================================================================
// Built-ins and scopes
// ============================================================================

#[test]
fn test_builtins_are_seeded() {
    let (tree, binder) = bind("void main(void) { }");
    let table = binder.scopes();
    assert!(binder.diagnostics().is_empty());

    let input = symbols_named(&tree, table, "input")[0];
    assert_eq!(input.origin, SymbolOrigin::Builtin(Builtin::Input));
    assert_eq!(input.kind, SymbolKind::Function);
    assert_eq!(input.ty, Type::Int);
    assert_eq!(input.slot, 0);
    assert_eq!(input.lines, vec![0]);

    let output = symbols_named(&tree, table, "output")[0];
    assert_eq!(output.ty, Type::Void);
    assert_eq!(output.slot, 1);

    let value = symbols_named(&tree, table, "value")[0];
    assert_eq!(value.kind, SymbolKind::Variable);
    assert_eq!(tree.name_text(table.scope(value.scope).name), "output");
    assert_eq!(value.slot, 0);

    let main = symbols_named(&tree, table, "main")[0];
    assert_eq!(main.slot, 2);
}

#[test]
fn test_scopes_in_creation_order() {
    let source = "int f(int a) { int b; { int c; } return a; }\nvoid main(void) { }";
    let (tree, binder) = bind(source);
    assert_eq!(
        scope_names(&tree, binder.scopes()),
        vec!["global", "output", "f", "f", "main"]
    );
    let table = binder.scopes();
    assert_eq!(table.scopes()[0].parent, None);
    // The nested block hangs off the function scope.
    assert_eq!(table.scopes()[3].parent, Some(ScopeId(2)));
    assert_eq!(table.scopes()[2].parent, Some(ScopeId(0)));
}

#[test]
fn test_parameters_and_locals_share_function_scope() {
    let (tree, binder) = bind("int f(int a, int b[]) { int c; int d[4]; return a; }");
    let table = binder.scopes();

    let a = symbols_named(&tree, table, "a")[0];
    let b = symbols_named(&tree, table, "b")[0];
    let c = symbols_named(&tree, table, "c")[0];
    let d = symbols_named(&tree, table, "d")[0];

    assert_eq!(a.scope, c.scope);
    assert_eq!(tree.name_text(table.scope(a.scope).name), "f");
    let slots: Vec<_> = [a, b, c, d].iter().map(|s| s.slot).collect();
    assert_eq!(slots, vec![0, 1, 2, 3]);
    assert_eq!(b.ty, Type::IntArray);
    assert_eq!(d.ty, Type::IntArray);
}

#[test]
fn test_compound_statements_record_their_scope() {
    let (tree, binder) = bind("void main(void) { int x; { int y; } }");
    let table = binder.scopes();
    let blocks: Vec<NodeId> = (0..tree.len() as u32)
        .map(NodeId)
        .filter(|&id| matches!(tree.node(id).kind, NodeKind::Compound { .. }))
        .collect();
    assert_eq!(blocks.len(), 2);

    let scopes: Vec<_> = blocks
        .iter()
        .map(|&id| tree.compound_scope(id).expect("scope recorded"))
        .collect();
    assert_ne!(scopes[0], scopes[1]);
    let y = symbols_named(&tree, table, "y")[0];
    let x = symbols_named(&tree, table, "x")[0];
    assert!(scopes.contains(&y.scope));
    assert!(scopes.contains(&x.scope));
}

#[test]
fn test_array_declaration_is_coerced_on_the_tree() {
    let (tree, _binder) = bind("int a[10];");
    let a = tree.root().unwrap();
    assert_eq!(tree.node(a).ty, Type::IntArray);
}

// ============================================================================
// Shadowing and redefinition
// ============================================================================

#[test]
fn test_inner_declaration_shadows_outer() {
    let source = "int x;\nvoid main(void) {\n { int x;\n x = 1; }\n x = 2;\n}";
    let (tree, binder) = bind(source);
    assert!(binder.diagnostics().is_empty());

    let table = binder.scopes();
    let xs = symbols_named(&tree, table, "x");
    assert_eq!(xs.len(), 2);
    let (outer, inner) = (xs[0], xs[1]);

    assert_eq!(tree.name_text(table.scope(outer.scope).name), "global");
    assert_eq!(outer.slot, 2);
    assert_eq!(inner.slot, 0);
    assert_ne!(outer.scope, inner.scope);
    // Line 4 binds to the inner symbol, line 5 to the outer one again.
    assert_eq!(inner.lines, vec![3, 4]);
    assert_eq!(outer.lines, vec![1, 5]);
}

#[test]
fn test_redefinition_reports_once_and_keeps_first() {
    let (tree, binder) = bind("int x;\nint x;");
    assert_eq!(
        messages(&binder),
        vec!["Error: Symbol \"x\" is redefined at line 2 (already defined at line 1 )"]
    );
    let xs = symbols_named(&tree, binder.scopes(), "x");
    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].slot, 2);
    assert_eq!(xs[0].ty, Type::Int);
    assert_eq!(xs[0].lines, vec![1, 2]);
}

#[test]
fn test_redefinition_lists_every_earlier_line() {
    let (_tree, binder) = bind("int x;\nint x;\nint x;");
    assert_eq!(
        messages(&binder)[1],
        "Error: Symbol \"x\" is redefined at line 3 (already defined at line 1 2 )"
    );
}

#[test]
fn test_redefined_array_keeps_first_type() {
    let (tree, binder) = bind("int a;\nint a[3];");
    assert_eq!(binder.diagnostics().len(), 1);
    let a = symbols_named(&tree, binder.scopes(), "a")[0];
    assert_eq!(a.ty, Type::Int);
}

#[test]
fn test_redefined_function_gets_its_own_scope() {
    let source = "int f(int a) { return a; }\nvoid f(int b) { }";
    let (tree, binder) = bind(source);
    assert_eq!(binder.diagnostics().len(), 1);
    let table = binder.scopes();
    let fs = symbols_named(&tree, table, "f");
    assert_eq!(fs.len(), 1);
    assert_eq!(fs[0].ty, Type::Int);

    let b = symbols_named(&tree, table, "b")[0];
    assert_ne!(tree.name_text(table.scope(b.scope).name), "global");
}

#[test]
fn test_duplicate_parameter() {
    let (_tree, binder) = bind("int f(int a, int a) { return a; }");
    assert_eq!(
        messages(&binder),
        vec!["Error: Symbol \"a\" is redefined at line 1 (already defined at line 1 )"]
    );
}

#[test]
fn test_builtin_redefinition() {
    let (_tree, binder) = bind("int input(void) { return 1; }");
    assert_eq!(
        messages(&binder),
        vec!["Error: Symbol \"input\" is redefined at line 1 (already defined at line 0 )"]
    );
}

// ============================================================================
// Void declarations
// ============================================================================

#[test]
fn test_void_variable() {
    let (tree, binder) = bind("void x;\nvoid y[2];");
    assert_eq!(
        messages(&binder),
        vec![
            "Error: The void-type variable is declared at line 1 (name : \"x\")",
            "Error: The void-type variable is declared at line 2 (name : \"y\")",
        ]
    );
    // Still bound, so uses resolve.
    assert_eq!(symbols_named(&tree, binder.scopes(), "x")[0].ty, Type::Void);
    assert_eq!(symbols_named(&tree, binder.scopes(), "y")[0].ty, Type::IntArray);
}

#[test]
fn test_void_parameters() {
    let (tree, binder) = bind("int f(void) { return 1; }");
    assert!(binder.diagnostics().is_empty());
    assert_eq!(binder.scopes().symbols().len(), 4);
    assert!(symbols_named(&tree, binder.scopes(), "f")[0].is_function());

    let (_tree, binder) = bind("int g(void v, void w[]) { return 1; }");
    assert_eq!(binder.diagnostics().count_of(DiagnosticCategory::Binding), 2);
}

// ============================================================================
// Undeclared names
// ============================================================================

#[test]
fn test_undeclared_variable_gets_placeholder() {
    let source = "void main(void) {\n int y;\n y = z;\n y = z + 1;\n}";
    let (tree, binder) = bind(source);
    assert_eq!(
        messages(&binder),
        vec!["Error: undeclared variable \"z\" is used at line 3"]
    );
    let z = symbols_named(&tree, binder.scopes(), "z")[0];
    assert!(z.is_placeholder());
    assert_eq!(z.kind, SymbolKind::Variable);
    assert_eq!(z.ty, Type::Undetermined);
    assert_eq!(z.slot, 1);
    assert_eq!(z.lines, vec![3, 4]);
}

#[test]
fn test_undeclared_function_gets_placeholder() {
    let (tree, binder) = bind("void main(void) { foo(1); foo(2); }");
    assert_eq!(
        messages(&binder),
        vec!["Error: undeclared function \"foo\" is called at line 1"]
    );
    let foo = symbols_named(&tree, binder.scopes(), "foo")[0];
    assert_eq!(foo.kind, SymbolKind::Function);
    assert!(foo.is_placeholder());
}

#[test]
fn test_placeholder_is_scoped_to_the_block() {
    let source = "void main(void) {\n { q = 1; }\n q = 2;\n}";
    let (tree, binder) = bind(source);
    assert_eq!(
        messages(&binder),
        vec![
            "Error: undeclared variable \"q\" is used at line 2",
            "Error: undeclared variable \"q\" is used at line 3",
        ]
    );
    assert_eq!(symbols_named(&tree, binder.scopes(), "q").len(), 2);
}

#[test]
fn test_global_declared_after_use_is_undeclared() {
    let (_tree, binder) = bind("void main(void) { g = 1; }\nint g;");
    assert_eq!(
        messages(&binder),
        vec!["Error: undeclared variable \"g\" is used at line 1"]
    );
}

#[test]
fn test_references_are_recorded_on_outer_symbols() {
    let source = "int g;\nvoid main(void) {\n g = input();\n output(g);\n}";
    let (tree, binder) = bind(source);
    assert!(binder.diagnostics().is_empty());
    let table = binder.scopes();
    assert_eq!(symbols_named(&tree, table, "g")[0].lines, vec![1, 3, 4]);
    assert_eq!(symbols_named(&tree, table, "input")[0].lines, vec![0, 3]);
    assert_eq!(symbols_named(&tree, table, "output")[0].lines, vec![0, 4]);
}

#[test]
fn test_recursive_call_resolves() {
    let (_tree, binder) = bind("int f(int n) { return f(n - 1); }");
    assert!(binder.diagnostics().is_empty());
}

#[test]
fn test_binder_is_reusable() {
    init_logger();
    let mut binder = Binder::new();
    for source in ["int a;", "int b; int c;"] {
        let mut tree = Parser::from_source(source, StringInterner::new()).parse_program().tree;
        binder.bind_program(&mut tree).unwrap();
    }
    // Three built-ins plus `b` and `c`.
    assert_eq!(binder.scopes().symbols().len(), 5);
    assert_eq!(binder.scopes().depth(), 0);
}

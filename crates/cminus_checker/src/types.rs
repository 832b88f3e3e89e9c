//! Function signatures as seen by call checking.

use cminus_ast::node::SyntaxTree;
use cminus_ast::types::{NodeId, Type};
use cminus_ast::NodeKind;
use cminus_binder::{Builtin, Symbol, SymbolOrigin};

/// Return type and parameter types of a callable symbol. An empty
/// parameter list is `(void)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub return_type: Type,
    pub parameters: Vec<Type>,
}

impl Signature {
    /// The signature of a function declared in source.
    pub fn from_declaration(tree: &SyntaxTree, function: NodeId) -> Option<Signature> {
        let node = tree.node(function);
        let NodeKind::FunDecl { params, .. } = node.kind else {
            return None;
        };
        let parameters = tree
            .siblings(params)
            .filter(|&param| !tree.node(param).is_void_param())
            .map(|param| tree.node(param).ty)
            .collect();
        Some(Signature {
            return_type: node.ty,
            parameters,
        })
    }

    pub fn from_builtin(builtin: Builtin) -> Signature {
        Signature {
            return_type: builtin.ty(),
            parameters: builtin.parameters().to_vec(),
        }
    }

    /// Stands in for an undeclared function: undetermined return type and a
    /// single undetermined parameter, so no argument list matches it.
    pub fn placeholder() -> Signature {
        Signature {
            return_type: Type::Undetermined,
            parameters: vec![Type::Undetermined],
        }
    }

    /// The signature of `symbol`, or `None` when it is not a function.
    pub fn of(tree: &SyntaxTree, symbol: &Symbol) -> Option<Signature> {
        if !symbol.is_function() {
            return None;
        }
        match symbol.origin {
            SymbolOrigin::Declared(node) => Signature::from_declaration(tree, node),
            SymbolOrigin::Builtin(builtin) => Some(Signature::from_builtin(builtin)),
            SymbolOrigin::Placeholder => Some(Signature::placeholder()),
        }
    }

    /// Whether `arguments` fit the parameters: same length and the same
    /// type at every position.
    pub fn accepts(&self, arguments: &[Type]) -> bool {
        self.parameters.len() == arguments.len()
            && self.parameters.iter().zip(arguments).all(|(param, arg)| param == arg)
    }
}

//! Symbol resolution seam.
//!
//! The engine treats name resolution as an external collaborator behind
//! the `Resolver` trait: matchers ask for a `SymbolRef` and subtype facts,
//! nothing more. `ImportResolver` is the built-in heuristic instance —
//! import table plus `java.lang` implicits plus a fixed subtype table. It
//! is deliberately not a type checker; a real resolver plugs in at the
//! same trait.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::tree::{NodeId, NodeKind, Tree};

/// Resolved identity of a name use. Opaque immutable lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    /// Fully-qualified name, e.g. `java.util.HashSet` or
    /// `java.lang.System.exit`.
    pub qualified_name: String,
    /// For members accessed through a type: the declaring type's
    /// fully-qualified name.
    pub declaring_type: Option<String>,
    /// For callables: number of arguments at the use site.
    pub arity: Option<usize>,
}

/// Name and type facts the matcher library consumes.
pub trait Resolver: Send + Sync {
    /// Resolve the name used at `node`, if the node is a name use the
    /// resolver understands.
    fn resolve(&self, tree: &Tree, node: NodeId) -> Option<SymbolRef>;

    /// Whether `sub` names a subtype of `sup` (reflexive).
    fn is_subtype(&self, sub: &str, sup: &str) -> bool;
}

/// Types implicitly in scope in every Java compilation unit.
const JAVA_LANG: &[&str] = &[
    "Boolean", "Byte", "Character", "Class", "Double", "Exception", "Float", "Integer", "Long",
    "Math", "Number", "Object", "RuntimeException", "Short", "String", "StringBuilder", "System",
    "Thread", "Throwable",
];

/// Subtype edges for common JDK types, queried reflexively and
/// transitively.
const SUBTYPE_EDGES: &[(&str, &str)] = &[
    ("java.util.HashSet", "java.util.Set"),
    ("java.util.LinkedHashSet", "java.util.HashSet"),
    ("java.util.TreeSet", "java.util.Set"),
    ("java.util.Set", "java.util.Collection"),
    ("java.util.ArrayList", "java.util.List"),
    ("java.util.LinkedList", "java.util.List"),
    ("java.util.List", "java.util.Collection"),
    ("java.util.Collection", "java.lang.Iterable"),
    ("java.util.HashMap", "java.util.Map"),
    ("java.util.LinkedHashMap", "java.util.HashMap"),
    ("java.util.TreeMap", "java.util.Map"),
    ("java.lang.Integer", "java.lang.Number"),
    ("java.lang.Long", "java.lang.Number"),
    ("java.lang.Short", "java.lang.Number"),
    ("java.lang.Byte", "java.lang.Number"),
    ("java.lang.Float", "java.lang.Number"),
    ("java.lang.Double", "java.lang.Number"),
    ("java.lang.Number", "java.lang.Object"),
    ("java.lang.String", "java.lang.Object"),
];

/// Heuristic resolver built from one file's import declarations.
pub struct ImportResolver {
    /// Simple name -> fully-qualified name, from explicit imports.
    imports: HashMap<String, String>,
    /// Package prefixes from wildcard imports, in source order.
    wildcards: Vec<String>,
    /// Supertype edges.
    supertypes: HashMap<String, Vec<String>>,
}

impl ImportResolver {
    /// Build a resolver from the import declarations of `tree`.
    pub fn from_tree(tree: &Tree) -> Self {
        let mut imports = HashMap::new();
        let mut wildcards = Vec::new();

        for node in tree.children(tree.root()) {
            if tree.kind(*node) != NodeKind::ImportDeclaration {
                continue;
            }
            let text = tree.text_of(*node);
            let path = text
                .trim_start_matches("import")
                .trim_start()
                .trim_start_matches("static")
                .trim()
                .trim_end_matches(';')
                .trim();
            if let Some(package) = path.strip_suffix(".*") {
                wildcards.push(package.to_string());
            } else if let Some((_, simple)) = path.rsplit_once('.') {
                imports.insert(simple.to_string(), path.to_string());
            }
        }

        let mut supertypes: HashMap<String, Vec<String>> = HashMap::new();
        for (sub, sup) in SUBTYPE_EDGES {
            supertypes
                .entry((*sub).to_string())
                .or_default()
                .push((*sup).to_string());
        }

        Self {
            imports,
            wildcards,
            supertypes,
        }
    }

    /// Qualify a type name: explicit imports win, then `java.lang`
    /// implicits, then wildcard imports in source order. An already
    /// qualified name passes through. Unknown names stay simple.
    fn resolve_type(&self, name: &str) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        if let Some(fqn) = self.imports.get(name) {
            return fqn.clone();
        }
        if JAVA_LANG.contains(&name) {
            return format!("java.lang.{name}");
        }
        if let Some(package) = self.wildcards.first() {
            return format!("{package}.{name}");
        }
        name.to_string()
    }

    fn resolve_object_creation(&self, tree: &Tree, node: NodeId) -> Option<SymbolRef> {
        let ty = tree.child_of_kind(node, NodeKind::TypeReference)?;
        let simple = base_type_name(tree.text_of(ty));
        let arity = argument_count(tree, node);
        Some(SymbolRef {
            qualified_name: self.resolve_type(simple),
            declaring_type: None,
            arity: Some(arity),
        })
    }

    fn resolve_method_invocation(&self, tree: &Tree, node: NodeId) -> Option<SymbolRef> {
        let args = tree.child_of_kind(node, NodeKind::ArgumentList)?;
        let before_args: Vec<NodeId> = tree
            .children(node)
            .iter()
            .copied()
            .take_while(|c| *c != args)
            .filter(|c| tree.kind(*c) == NodeKind::Identifier)
            .collect();
        let name = tree.text_of(*before_args.last()?);
        let arity = Some(tree.children(args).len());

        // A type-looking receiver (uppercase simple name) marks a static
        // call; anything else is an instance call we cannot type.
        if before_args.len() >= 2 {
            let receiver = tree.text_of(before_args[0]);
            if is_type_like(receiver) {
                let declaring = self.resolve_type(receiver);
                return Some(SymbolRef {
                    qualified_name: format!("{declaring}.{name}"),
                    declaring_type: Some(declaring),
                    arity,
                });
            }
        }
        Some(SymbolRef {
            qualified_name: name.to_string(),
            declaring_type: None,
            arity,
        })
    }
}

impl Resolver for ImportResolver {
    fn resolve(&self, tree: &Tree, node: NodeId) -> Option<SymbolRef> {
        match tree.kind(node) {
            NodeKind::ObjectCreation => self.resolve_object_creation(tree, node),
            NodeKind::MethodInvocation => self.resolve_method_invocation(tree, node),
            NodeKind::TypeReference => Some(SymbolRef {
                qualified_name: self.resolve_type(base_type_name(tree.text_of(node))),
                declaring_type: None,
                arity: None,
            }),
            NodeKind::Identifier => {
                let text = tree.text_of(node);
                if is_type_like(text) {
                    Some(SymbolRef {
                        qualified_name: self.resolve_type(text),
                        declaring_type: None,
                        arity: None,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        // BFS over the supertype edges.
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(sub);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(supers) = self.supertypes.get(current) {
                for s in supers {
                    if s == sup {
                        return true;
                    }
                    queue.push_back(s);
                }
            }
        }
        false
    }
}

/// Strip generic arguments and array brackets from a type's source text.
fn base_type_name(text: &str) -> &str {
    let end = text.find(['<', '[']).unwrap_or(text.len());
    text[..end].trim()
}

/// A simple name that starts uppercase and contains no dots reads as a
/// type name under Java conventions.
fn is_type_like(text: &str) -> bool {
    !text.contains('.')
        && text
            .chars()
            .next()
            .map(|c| c.is_ascii_uppercase())
            .unwrap_or(false)
}

/// Argument count of a call-shaped node (0 when it has no argument list).
pub fn argument_count(tree: &Tree, node: NodeId) -> usize {
    tree.child_of_kind(node, NodeKind::ArgumentList)
        .map(|args| tree.children(args).len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend;

    fn parse(source: &str) -> Tree {
        frontend::java::parse(source).unwrap()
    }

    #[test]
    fn test_explicit_import_resolution() {
        let tree = parse(
            "import java.util.HashSet;\nclass A { Object s = new HashSet<>(10); }",
        );
        let resolver = ImportResolver::from_tree(&tree);
        let node = tree.nodes_of_kind(NodeKind::ObjectCreation)[0];
        let symbol = resolver.resolve(&tree, node).unwrap();
        assert_eq!(symbol.qualified_name, "java.util.HashSet");
        assert_eq!(symbol.arity, Some(1));
    }

    #[test]
    fn test_wildcard_import_resolution() {
        let tree = parse("import java.util.*;\nclass A { Object s = new HashSet<>(); }");
        let resolver = ImportResolver::from_tree(&tree);
        let node = tree.nodes_of_kind(NodeKind::ObjectCreation)[0];
        let symbol = resolver.resolve(&tree, node).unwrap();
        assert_eq!(symbol.qualified_name, "java.util.HashSet");
        assert_eq!(symbol.arity, Some(0));
    }

    #[test]
    fn test_java_lang_implicits() {
        let tree = parse("class A { void f() { System.exit(0); } }");
        let resolver = ImportResolver::from_tree(&tree);
        let node = tree.nodes_of_kind(NodeKind::MethodInvocation)[0];
        let symbol = resolver.resolve(&tree, node).unwrap();
        assert_eq!(symbol.qualified_name, "java.lang.System.exit");
        assert_eq!(symbol.declaring_type.as_deref(), Some("java.lang.System"));
        assert_eq!(symbol.arity, Some(1));
    }

    #[test]
    fn test_instance_call_keeps_simple_name() {
        let tree = parse("class A { void f(Object o) { o.toString(); } }");
        let resolver = ImportResolver::from_tree(&tree);
        let node = tree.nodes_of_kind(NodeKind::MethodInvocation)[0];
        let symbol = resolver.resolve(&tree, node).unwrap();
        assert_eq!(symbol.qualified_name, "toString");
        assert_eq!(symbol.declaring_type, None);
    }

    #[test]
    fn test_subtype_is_reflexive_and_transitive() {
        let tree = parse("class A {}");
        let resolver = ImportResolver::from_tree(&tree);
        assert!(resolver.is_subtype("java.util.HashSet", "java.util.HashSet"));
        assert!(resolver.is_subtype("java.util.HashSet", "java.util.Collection"));
        assert!(resolver.is_subtype("java.util.LinkedHashSet", "java.util.Set"));
        assert!(!resolver.is_subtype("java.util.Set", "java.util.HashSet"));
        assert!(!resolver.is_subtype("java.util.HashMap", "java.util.Collection"));
    }
}

//! Diagnostic rendering of the aggregate tree.

use std::fmt;

use termtree::Tree;

use crate::config::{RenderStyle, MAX_INDENT};
use crate::domain::aggregate::Aggregate;
use crate::domain::arena::{AggregateTree, NodeId};

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<A: Aggregate> TreeNodeConvert for AggregateTree<A> {
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree<A: Aggregate>(tree: &AggregateTree<A>, id: NodeId, parent_tree: &mut Tree<String>) {
            if let Ok(node) = tree.node(id) {
                for &child in &node.children {
                    let mut child_tree = Tree::new(tree.label(child));
                    build_tree(tree, child, &mut child_tree);
                    parent_tree.push(child_tree);
                }
            }
        }

        let mut root = Tree::new(self.label(self.root));
        build_tree(self, self.root, &mut root);
        root
    }
}

impl<A: Aggregate> AggregateTree<A> {
    /// One diagnostic line: name, key if set, attribute snapshot.
    pub fn label(&self, id: NodeId) -> String {
        let Ok(node) = self.node(id) else {
            return id.to_string();
        };
        let key = node
            .key
            .as_ref()
            .map(|k| format!(" key={}", k))
            .unwrap_or_default();
        let attributes = node
            .aggregate
            .as_ref()
            .map(|a| a.attributes().to_string())
            .unwrap_or_else(|| "[?]".to_string());
        format!("{}{} {}", node.name, key, attributes)
    }

    /// Pre-order listing, indented per depth.
    pub fn render(&self) -> String {
        let mut builder = String::new();
        self.render_node(&mut builder, self.root, 0);
        builder
    }

    pub fn render_with(&self, style: RenderStyle) -> String {
        match style {
            RenderStyle::Indented => self.render(),
            RenderStyle::Branches => self.to_tree_string().to_string(),
        }
    }

    fn render_node(&self, builder: &mut String, id: NodeId, nesting: usize) {
        let width = nesting.saturating_mul(self.settings.indent.min(MAX_INDENT));
        builder.push_str(&" ".repeat(width));
        builder.push_str(&self.label(id));
        builder.push('\n');
        if let Ok(node) = self.node(id) {
            for &child in &node.children {
                self.render_node(builder, child, nesting + 1);
            }
        }
    }
}

impl<A: Aggregate> fmt::Display for AggregateTree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::domain::aggregate::Attributes;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Kind {
        Bank,
        Account,
    }

    impl fmt::Display for Kind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Debug::fmt(self, f)
        }
    }

    #[derive(Debug)]
    struct Node {
        kind: Kind,
        balance: u32,
    }

    impl Aggregate for Node {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            self.kind
        }

        fn attributes(&self) -> Attributes {
            match self.kind {
                Kind::Bank => Attributes::new(),
                Kind::Account => Attributes::new().with("balance", self.balance),
            }
        }
    }

    fn node(kind: Kind, balance: u32) -> Node {
        Node { kind, balance }
    }

    fn bank() -> AggregateTree<Node> {
        AggregateTree::build(node(Kind::Bank, 0), |bank| {
            bank.attach(node(Kind::Account, 10), |account| {
                account.key("checking")?;
                Ok(())
            })?;
            bank.attach(node(Kind::Account, 20), |_| Ok(()))?;
            Ok(())
        })
        .unwrap()
    }

    #[test]
    fn test_render_indents_per_depth() {
        let tree = bank();
        assert_eq!(
            tree.render(),
            "Bank []\n    Account key=checking [balance=10]\n    Account [balance=20]\n"
        );
        assert_eq!(tree.to_string(), tree.render());
    }

    #[test]
    fn test_render_honours_indent_setting() {
        let settings = Settings {
            indent: 2,
            ..Settings::default()
        };
        let tree = AggregateTree::build_with(settings, node(Kind::Bank, 0), |bank| {
            bank.attach(node(Kind::Account, 1), |_| Ok(()))?;
            Ok(())
        })
        .unwrap();
        assert_eq!(tree.render(), "Bank []\n  Account [balance=1]\n");
    }

    #[test]
    fn test_render_caps_oversized_indent() {
        let settings = Settings {
            indent: usize::MAX,
            ..Settings::default()
        };
        let tree = AggregateTree::build_with(settings, node(Kind::Bank, 0), |bank| {
            bank.attach(node(Kind::Account, 1), |_| Ok(()))?;
            Ok(())
        })
        .unwrap();
        let expected = format!("Bank []\n{}Account [balance=1]\n", " ".repeat(MAX_INDENT));
        assert_eq!(tree.render(), expected);
    }

    #[test]
    fn test_branches_style_uses_termtree() {
        let tree = bank();
        let rendered = tree.render_with(RenderStyle::Branches);
        assert!(rendered.starts_with("Bank []\n"));
        assert!(rendered.contains("├── Account key=checking [balance=10]"));
        assert!(rendered.contains("└── Account [balance=20]"));
    }
}

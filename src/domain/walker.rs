//! Hierarchy walker and row projection
//!
//! Visits a map depth-first in document order and projects every titled node
//! onto one [`OutputRow`]. The walk uses an explicit work stack, so deep maps
//! do not grow the call stack.

use std::sync::Arc;

use tracing::{debug, instrument, trace};

use crate::domain::document::MindMapNode;
use crate::domain::ids::IdGenerator;

/// Marker emitted in the leaf column for nodes without children.
pub const LEAF_MARKER: &str = "L";

/// Which optional columns precede the title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Dotted hierarchy path, e.g. `1.2.1`
    pub include_numbers: bool,
    /// Combined `<parent id>.<node id>` field
    pub include_ids: bool,
    /// `L` for leaves, empty otherwise
    pub include_leaf_marker: bool,
}

/// An optional column of the output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Number,
    Ids,
    LeafMarker,
}

impl Column {
    fn render(self, visit: &NodeVisit<'_>) -> String {
        match self {
            Column::Number => visit.context.path.clone(),
            Column::Ids => format!("{}.{}", visit.context.parent_id, visit.id),
            Column::LeafMarker => {
                if visit.is_leaf {
                    LEAF_MARKER.to_string()
                } else {
                    String::new()
                }
            }
        }
    }
}

/// Ordered list of enabled columns, built once per conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    columns: Vec<Column>,
}

impl RowLayout {
    pub fn from_options(options: &ConvertOptions) -> Self {
        let columns = [
            (options.include_numbers, Column::Number),
            (options.include_ids, Column::Ids),
            (options.include_leaf_marker, Column::LeafMarker),
        ]
        .into_iter()
        .filter_map(|(enabled, column)| enabled.then_some(column))
        .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn project(&self, visit: &NodeVisit<'_>, title: &str) -> OutputRow {
        let mut fields = Vec::with_capacity(self.columns.len() + 1);
        fields.extend(self.columns.iter().map(|column| column.render(visit)));
        fields.push(sanitize_title(title));
        OutputRow { fields }
    }
}

/// Replace carriage returns so a title never breaks row framing.
pub fn sanitize_title(title: &str) -> String {
    title.replace('\r', " ")
}

/// Fields of one emitted row; the title is always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    fields: Vec<String>,
}

impl OutputRow {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn title(&self) -> &str {
        self.fields.last().map(String::as_str).unwrap_or_default()
    }
}

/// Position of a pending visit in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalContext {
    /// Identifier minted for the node that scheduled this visit
    pub parent_id: String,
    /// Root is 0
    pub depth: usize,
    /// Dotted 1-based sibling positions, root is `1`
    pub path: String,
}

impl TraversalContext {
    pub fn root(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            depth: 0,
            path: "1".to_string(),
        }
    }

    /// Context for the child at 1-based `position` of the node `node_id`.
    pub fn child(&self, node_id: &str, position: usize) -> Self {
        Self {
            parent_id: node_id.to_string(),
            depth: self.depth + 1,
            path: format!("{}.{}", self.path, position),
        }
    }
}

struct NodeVisit<'a> {
    context: &'a TraversalContext,
    id: &'a str,
    is_leaf: bool,
}

/// Counters collected during one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub nodes_visited: usize,
    pub rows_emitted: usize,
    pub max_depth: usize,
}

/// Depth-first, pre-order walker projecting nodes onto rows.
pub struct HierarchyWalker {
    layout: RowLayout,
    ids: Arc<dyn IdGenerator>,
}

impl HierarchyWalker {
    pub fn new(options: &ConvertOptions, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            layout: RowLayout::from_options(options),
            ids,
        }
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    /// Walk `root` and hand every row to `emit` in traversal order.
    ///
    /// Every visited node gets a fresh identifier, whether or not ids are
    /// emitted and whether or not the node has a title. An error returned by
    /// `emit` stops the walk and is returned as is.
    #[instrument(level = "debug", skip_all)]
    pub fn walk<E, F>(
        &self,
        root: &MindMapNode,
        root_parent_id: String,
        mut emit: F,
    ) -> Result<WalkSummary, E>
    where
        F: FnMut(&OutputRow) -> Result<(), E>,
    {
        let mut summary = WalkSummary::default();
        let mut stack = vec![(TraversalContext::root(root_parent_id), root)];

        while let Some((context, node)) = stack.pop() {
            let id = self.ids.mint();
            let is_leaf = node.is_leaf();
            summary.nodes_visited += 1;
            summary.max_depth = summary.max_depth.max(context.depth);
            trace!(path = %context.path, depth = context.depth, is_leaf, "visit");

            if let Some(title) = &node.title {
                let visit = NodeVisit {
                    context: &context,
                    id: &id,
                    is_leaf,
                };
                emit(&self.layout.project(&visit, title))?;
                summary.rows_emitted += 1;
            }

            // reversed so the first child is popped first
            for (index, child) in node.children.iter().enumerate().rev() {
                stack.push((context.child(&id, index + 1), child));
            }
        }

        debug!(
            nodes = summary.nodes_visited,
            rows = summary.rows_emitted,
            max_depth = summary.max_depth,
            "walk finished"
        );
        Ok(summary)
    }

    /// Walk `root` with a freshly minted root parent id and collect the rows.
    #[cfg(test)]
    fn collect_rows(&self, root: &MindMapNode) -> Vec<OutputRow> {
        let mut rows = Vec::new();
        let walked: Result<WalkSummary, std::convert::Infallible> =
            self.walk(root, self.ids.mint(), |row| {
                rows.push(row.clone());
                Ok(())
            });
        match walked {
            Ok(_) => rows,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use crate::domain::ids::{FixedIdGenerator, SequentialIdGenerator};

    fn all_columns() -> ConvertOptions {
        ConvertOptions {
            include_numbers: true,
            include_ids: true,
            include_leaf_marker: true,
        }
    }

    fn fields(rows: &[OutputRow]) -> Vec<Vec<&str>> {
        rows.iter()
            .map(|r| r.fields().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn layout_keeps_fixed_column_order() {
        let layout = RowLayout::from_options(&ConvertOptions {
            include_numbers: true,
            include_ids: false,
            include_leaf_marker: true,
        });
        assert_eq!(layout.columns(), &[Column::Number, Column::LeafMarker]);
        assert!(RowLayout::from_options(&ConvertOptions::default())
            .columns()
            .is_empty());
    }

    #[test]
    fn title_only_by_default() {
        let walker = HierarchyWalker::new(
            &ConvertOptions::default(),
            Arc::new(FixedIdGenerator::new("id")),
        );
        let root = MindMapNode::titled("root").with_children(vec![MindMapNode::titled("child")]);

        let rows = walker.collect_rows(&root);

        assert_eq!(fields(&rows), vec![vec!["root"], vec!["child"]]);
    }

    #[test]
    fn untitled_root_still_numbers_children_from_one_dot_one() {
        let walker = HierarchyWalker::new(&all_columns(), Arc::new(FixedIdGenerator::new("x")));
        let root = MindMapNode::untitled().with_children(vec![
            MindMapNode::titled("a"),
            MindMapNode::titled("b"),
        ]);

        let rows = walker.collect_rows(&root);

        assert_eq!(
            fields(&rows),
            vec![vec!["1.1", "x.x", "L", "a"], vec!["1.2", "x.x", "L", "b"]]
        );
    }

    #[test]
    fn ids_link_children_to_their_parent() {
        let walker = HierarchyWalker::new(
            &ConvertOptions {
                include_ids: true,
                ..ConvertOptions::default()
            },
            Arc::new(SequentialIdGenerator::default()),
        );
        // n0 = root parent, n1 = root, n2 = a, n3 = a1, n4 = b
        let root = MindMapNode::titled("root").with_children(vec![
            MindMapNode::titled("a").with_children(vec![MindMapNode::titled("a1")]),
            MindMapNode::titled("b"),
        ]);

        let rows = walker.collect_rows(&root);

        assert_eq!(
            fields(&rows),
            vec![
                vec!["n0.n1", "root"],
                vec!["n1.n2", "a"],
                vec!["n2.n3", "a1"],
                vec!["n1.n4", "b"],
            ]
        );
    }

    #[test]
    fn ids_are_minted_for_untitled_nodes_too() {
        let walker = HierarchyWalker::new(
            &ConvertOptions {
                include_ids: true,
                ..ConvertOptions::default()
            },
            Arc::new(SequentialIdGenerator::default()),
        );
        let root = MindMapNode::titled("root").with_children(vec![
            MindMapNode::untitled().with_children(vec![MindMapNode::titled("deep")]),
        ]);

        let rows = walker.collect_rows(&root);

        assert_eq!(fields(&rows), vec![vec!["n0.n1", "root"], vec!["n2.n3", "deep"]]);
    }

    #[test]
    fn carriage_returns_in_titles_become_spaces() {
        let walker = HierarchyWalker::new(
            &ConvertOptions::default(),
            Arc::new(FixedIdGenerator::new("id")),
        );
        let rows = walker.collect_rows(&MindMapNode::titled("line one\r\nline two\r"));
        assert_eq!(rows[0].title(), "line one \nline two ");
    }

    #[test]
    fn summary_counts_nodes_rows_and_depth() {
        let walker = HierarchyWalker::new(
            &ConvertOptions::default(),
            Arc::new(FixedIdGenerator::new("id")),
        );
        let root = MindMapNode::untitled().with_children(vec![MindMapNode::titled("a")
            .with_children(vec![MindMapNode::titled("b")])]);

        let summary = walker
            .walk(&root, "p".into(), |_| Ok::<(), Infallible>(()))
            .unwrap();

        assert_eq!(
            summary,
            WalkSummary {
                nodes_visited: 3,
                rows_emitted: 2,
                max_depth: 2,
            }
        );
    }

    #[test]
    fn emit_error_stops_the_walk() {
        let walker = HierarchyWalker::new(
            &ConvertOptions::default(),
            Arc::new(FixedIdGenerator::new("id")),
        );
        let root = MindMapNode::titled("a").with_children(vec![
            MindMapNode::titled("b"),
            MindMapNode::titled("c"),
        ]);
        let mut seen = 0;

        let result = walker.walk(&root, "p".into(), |_| {
            seen += 1;
            if seen == 2 {
                Err("sink full")
            } else {
                Ok(())
            }
        });

        assert_eq!(result, Err("sink full"));
        assert_eq!(seen, 2);
    }

    #[test]
    fn deep_chain_does_not_overflow_the_stack() {
        let mut node = MindMapNode::titled("leaf");
        for depth in 0..5_000 {
            node = MindMapNode::titled(format!("n{depth}")).with_children(vec![node]);
        }
        let walker = HierarchyWalker::new(
            &ConvertOptions::default(),
            Arc::new(FixedIdGenerator::new("id")),
        );

        let summary = walker
            .walk(&node, "p".into(), |_| Ok::<(), Infallible>(()))
            .unwrap();

        assert_eq!(summary.rows_emitted, 5_001);
        assert_eq!(summary.max_depth, 5_000);
    }
}

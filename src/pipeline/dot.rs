use graphviz_rust::{
    dot_generator::*,
    dot_structures::*,
    printer::{DotPrinter, PrinterContext},
};

use super::Pipeline;

impl Pipeline {
    fn module_node_name(index: usize) -> String {
        format!("Module_{}", index)
    }

    /// The wiring graph as a dot structure, one node per module and one edge
    /// per port connection.
    pub fn to_dot(&self) -> Graph {
        let mut stmts: Vec<Stmt> = vec![];
        for (index, module) in self.modules.iter().enumerate() {
            let label = module.info().title().to_string();
            stmts.push(
                Node::new(
                    node_id!(Self::module_node_name(index)),
                    vec![
                        attr!("shape", esc "rectangle"),
                        attr!("label", esc label),
                    ],
                )
                .into(),
            );
        }
        for connection in &self.connections {
            stmts.push(
                Edge {
                    ty: EdgeTy::Pair(
                        node_id!(Self::module_node_name(connection.source.0)).into(),
                        node_id!(Self::module_node_name(connection.target.0)).into(),
                    ),
                    attributes: vec![attr!(
                        "label",
                        esc format!("{} -> {}", connection.output, connection.input)
                    )],
                }
                .into(),
            );
        }
        Graph::DiGraph {
            id: Id::Plain("PipelineGraph".to_string()),
            strict: false,
            stmts,
        }
    }

    pub fn to_dot_string(&self) -> String {
        self.to_dot().print(&mut PrinterContext::default())
    }
}

use flowcore::{RouteError, RouteTable, Session};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Wires declared root references into route links
pub struct RouteTree;

impl RouteTree {
    /// Resolve every route's root reference against the table.
    ///
    /// Must run after all routes are registered: a branch may name a route
    /// that was registered after it.
    pub fn resolve<S: Session>(routes: &mut RouteTable<S>) -> Result<(), RouteError> {
        let mut links = Vec::new();

        for route in routes.routes() {
            if let Some(root) = route.declared_root() {
                if !routes.contains(&root.route) {
                    return Err(RouteError::UnknownRoute {
                        route: route.name().to_string(),
                        root: root.route.clone(),
                    });
                }
                links.push((route.name().to_string(), root.clone()));
            }
        }

        Self::check_acyclic(routes.names(), &links)?;

        for (name, root) in links {
            tracing::debug!("Route {} branches off {} before ordinal {}", name, root.route, root.ordinal);
            if let Some(route) = routes.get_mut(&name) {
                route.link_root(root);
            }
        }

        Ok(())
    }

    fn check_acyclic<'a>(
        names: impl Iterator<Item = &'a str>,
        links: &[(String, flowcore::RootReference)],
    ) -> Result<(), RouteError> {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut index: HashMap<String, NodeIndex> = HashMap::new();

        for name in names {
            let idx = graph.add_node(name.to_string());
            index.insert(name.to_string(), idx);
        }

        // Edges run root -> branch
        for (name, root) in links {
            if let (Some(&from), Some(&to)) = (index.get(&root.route), index.get(name)) {
                graph.add_edge(from, to, ());
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| RouteError::CyclicRoute {
            route: graph[cycle.node_id()].clone(),
        })
    }
}

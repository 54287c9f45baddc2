use std::sync::Arc;

use petgraph::Graph;
use petgraph::algo::toposort;
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};
use validated::Validated;

use super::{Recipe, RecipeDescriptor};
use crate::error::{RunError, ValidationError};

/// A single step of a [`RecipePipeline`]: a recipe plus the steps it must run after.
#[derive(Clone)]
pub struct Step {
    /// Unique identifier of the step.
    pub id: String,
    /// Ids of the steps this one depends on.
    pub dependencies: Vec<String>,
    pub recipe: Arc<dyn Recipe>,
}

/// Composes recipes into one, running them in dependency order.
///
/// Steps form a dependency graph. A dependency may name a step added later;
/// the edge is made when that step arrives. Ordering is topological and a cycle
/// is reported rather than run.
pub struct RecipePipeline {
    /// The dependency graph of steps.
    graph: Graph<Step, ()>,
    /// Maps step ids to their indices in the graph.
    node_indices: FxHashMap<String, NodeIndex>,
    /// Dependencies on steps not added yet, as (missing step, dependent step).
    pending: Vec<(String, String)>,
    display_name: String,
}

impl RecipePipeline {
    pub fn new(display_name: impl Into<String>) -> Self {
        RecipePipeline {
            graph: Graph::new(),
            node_indices: FxHashMap::default(),
            pending: Vec::new(),
            display_name: display_name.into(),
        }
    }

    /// Adds a step, establishing its dependencies. A step with the same id is replaced.
    pub fn add_step(&mut self, step: Step) {
        if self.node_indices.contains_key(&step.id) {
            warn!("Pipeline step {} added twice; the later one wins", step.id);
            self.remove_step(&step.id);
        }
        let id = step.id.clone();
        let dependencies = step.dependencies.clone();
        let node = self.graph.add_node(step);
        self.node_indices.insert(id.clone(), node);

        for dependency in dependencies {
            match self.node_indices.get(&dependency) {
                Some(&dependency_node) => {
                    self.graph.add_edge(dependency_node, node, ());
                }
                None => self.pending.push((dependency, id.clone())),
            }
        }

        let (resolved, still_pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|(dependency, _)| *dependency == id);
        self.pending = still_pending;
        for (_, dependent) in resolved {
            if let Some(&dependent_node) = self.node_indices.get(&dependent) {
                self.graph.add_edge(node, dependent_node, ());
            }
        }
    }

    /// Convenience for [`RecipePipeline::add_step`].
    pub fn add_recipe(&mut self, id: impl Into<String>, recipe: Arc<dyn Recipe>, dependencies: &[&str]) {
        self.add_step(Step {
            id: id.into(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            recipe,
        });
    }

    /// Removes a step by its id. Steps depending on it wait for it again if it is re-added.
    pub fn remove_step(&mut self, id: &str) {
        let Some(node) = self.node_indices.remove(id) else {
            return;
        };
        let dependents: Vec<String> = self.graph.neighbors(node).map(|n| self.graph[n].id.clone()).collect();
        self.pending.retain(|(_, dependent)| dependent != id);
        self.pending.extend(dependents.into_iter().map(|dependent| (id.to_string(), dependent)));
        self.graph.remove_node(node);
        // Removal moves the last node into the freed index
        self.node_indices = self.graph.node_indices().map(|n| (self.graph[n].id.clone(), n)).collect();
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Recipes in the order they run.
    pub fn ordered(&self) -> Result<Vec<Arc<dyn Recipe>>, RunError> {
        for (dependency, dependent) in &self.pending {
            debug!("Step {} depends on unknown step {}; ignoring", dependent, dependency);
        }
        let order = toposort(&self.graph, None)
            .map_err(|cycle| RunError::Cycle(self.graph[cycle.node_id()].id.clone()))?;
        Ok(order.into_iter().map(|node| Arc::clone(&self.graph[node].recipe)).collect())
    }
}

impl Recipe for RecipePipeline {
    fn name(&self) -> &'static str {
        "core.RecipePipeline"
    }

    fn display_name(&self) -> String {
        self.display_name.clone()
    }

    fn description(&self) -> String {
        format!("Runs {} recipe(s) in dependency order.", self.len())
    }

    fn validate(&self) -> Validated<(), ValidationError> {
        match self.ordered() {
            Ok(_) => Validated::Good(()),
            Err(error) => Validated::fail(ValidationError::new(self.name(), "recipeList", error.to_string())),
        }
    }

    /// Empty when the steps form a cycle; [`Recipe::validate`] reports that case.
    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        self.ordered().unwrap_or_default()
    }

    fn descriptor(&self) -> RecipeDescriptor {
        RecipeDescriptor {
            name: self.name().to_string(),
            display_name: self.display_name(),
            description: self.description(),
            options: Vec::new(),
            recipe_list: self.recipe_list().iter().map(|recipe| recipe.descriptor()).collect(),
        }
    }
}

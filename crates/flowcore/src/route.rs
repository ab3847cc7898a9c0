use crate::{FlowError, RootReference, Session, Step, StepId};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A validated step, placed at `ordinal` within `route`
pub struct StepRecord<S: Session> {
    pub route: String,
    pub ordinal: u32,
    pub id: StepId,
    pub step: Arc<dyn Step<S>>,
    /// Only ever set on ordinal 1
    pub root: Option<RootReference>,
}

impl<S: Session> Clone for StepRecord<S> {
    fn clone(&self) -> Self {
        Self {
            route: self.route.clone(),
            ordinal: self.ordinal,
            id: self.id.clone(),
            step: Arc::clone(&self.step),
            root: self.root.clone(),
        }
    }
}

impl<S: Session> fmt::Debug for StepRecord<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRecord")
            .field("route", &self.route)
            .field("ordinal", &self.ordinal)
            .field("id", &self.id)
            .field("root", &self.root)
            .finish()
    }
}

/// A named, ordinal-sorted sequence of steps; one path through a flow.
///
/// The root link names another route in the owning [`RouteTable`]; the
/// route never holds the root itself.
pub struct Route<S: Session> {
    name: String,
    steps: Vec<StepRecord<S>>,
    root: Option<RootReference>,
}

impl<S: Session> Route<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            root: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[StepRecord<S>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Insert keeping ascending ordinal order. Equal ordinals keep their
    /// registration order.
    pub fn add_step(&mut self, record: StepRecord<S>) {
        let position = self
            .steps
            .iter()
            .position(|existing| existing.ordinal > record.ordinal)
            .unwrap_or(self.steps.len());
        self.steps.insert(position, record);
    }

    /// Steps with an ordinal strictly below `cut`. `None` or `Some(0)` take
    /// the whole route.
    pub fn prefix(&self, cut: Option<u32>) -> &[StepRecord<S>] {
        match cut {
            Some(cut) if cut > 0 => {
                let end = self
                    .steps
                    .iter()
                    .position(|record| record.ordinal >= cut)
                    .unwrap_or(self.steps.len());
                &self.steps[..end]
            }
            _ => &self.steps,
        }
    }

    /// Look a step up by its declared ordinal (first match on duplicates)
    pub fn step_at(&self, ordinal: u32) -> Result<&StepRecord<S>, FlowError> {
        self.steps
            .iter()
            .find(|record| record.ordinal == ordinal)
            .ok_or_else(|| FlowError::OrdinalNotFound {
                route: self.name.clone(),
                ordinal,
            })
    }

    /// The lowest-ordinal step, which carries any root reference
    pub fn entry(&self) -> Option<&StepRecord<S>> {
        self.steps.first()
    }

    /// Root reference declared on the entry step, before resolution
    pub fn declared_root(&self) -> Option<&RootReference> {
        self.steps
            .iter()
            .take_while(|record| record.ordinal == 1)
            .find_map(|record| record.root.as_ref())
    }

    /// Resolved root link
    pub fn root(&self) -> Option<&RootReference> {
        self.root.as_ref()
    }

    pub fn link_root(&mut self, root: RootReference) {
        self.root = Some(root);
    }
}

impl<S: Session> fmt::Debug for Route<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .field("root", &self.root)
            .finish()
    }
}

/// Owns every route of a flow, keyed by name
pub struct RouteTable<S: Session> {
    routes: BTreeMap<String, Route<S>>,
}

impl<S: Session> RouteTable<S> {
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Route named `name`, created empty on first sight
    pub fn route_mut(&mut self, name: &str) -> &mut Route<S> {
        self.routes
            .entry(name.to_string())
            .or_insert_with(|| Route::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Route<S>> {
        self.routes.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Route<S>> {
        self.routes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route<S>> {
        self.routes.values()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<S: Session> Default for RouteTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Session> fmt::Debug for RouteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.routes.iter()).finish()
    }
}

//! Material library with named presets.
//!
//! Presets cover the classic MPM validation cases (the soft elastic
//! disks of the collision benchmark) plus a few engineering solids.

use std::collections::HashMap;

use crate::properties::{ElasticProperties, ModelKind};

/// A named collection of material presets.
///
/// Materials are looked up by name (e.g., "elastic_disk", "rubber").
/// Custom materials can be registered at runtime.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    materials: HashMap<String, ElasticProperties>,
}

impl MaterialLibrary {
    /// Creates a new library with the built-in presets.
    pub fn with_defaults() -> Self {
        let mut lib = Self::empty();

        lib.register(elastic_disk());
        lib.register(rubber());
        lib.register(aluminium());
        lib.register(steel());
        lib.register(rigid());

        lib
    }

    /// Creates an empty library.
    pub fn empty() -> Self {
        Self {
            materials: HashMap::new(),
        }
    }

    /// Registers a material. Overwrites if the name already exists.
    pub fn register(&mut self, props: ElasticProperties) {
        self.materials.insert(props.name.clone(), props);
    }

    /// Looks up a material by name. Returns `None` if not found.
    pub fn get(&self, name: &str) -> Option<&ElasticProperties> {
        self.materials.get(name)
    }

    /// Returns all registered material names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ─── Built-in Presets ─────────────────────────────────────────────────

/// Soft elastic disk of the two-disk collision benchmark.
fn elastic_disk() -> ElasticProperties {
    ElasticProperties {
        name: "elastic_disk".into(),
        kind: ModelKind::LinearElastic,
        youngs_modulus: 1000.0,
        poisson_ratio: 0.3,
        density: 1000.0,
    }
}

/// Natural rubber, nearly incompressible.
fn rubber() -> ElasticProperties {
    ElasticProperties {
        name: "rubber".into(),
        kind: ModelKind::LinearElastic,
        youngs_modulus: 1.0e7,
        poisson_ratio: 0.45,
        density: 1100.0,
    }
}

fn aluminium() -> ElasticProperties {
    ElasticProperties {
        name: "aluminium".into(),
        kind: ModelKind::LinearElastic,
        youngs_modulus: 70.0e9,
        poisson_ratio: 0.33,
        density: 2700.0,
    }
}

fn steel() -> ElasticProperties {
    ElasticProperties {
        name: "steel".into(),
        kind: ModelKind::LinearElastic,
        youngs_modulus: 200.0e9,
        poisson_ratio: 0.3,
        density: 7850.0,
    }
}

/// Impenetrable body; elastic constants are unused.
fn rigid() -> ElasticProperties {
    ElasticProperties {
        name: "rigid".into(),
        kind: ModelKind::Impenetrable,
        youngs_modulus: 0.0,
        poisson_ratio: 0.0,
        density: 1000.0,
    }
}

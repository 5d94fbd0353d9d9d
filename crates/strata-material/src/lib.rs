//! # strata-material
//!
//! Constitutive model abstraction and material presets.
//!
//! ## Design
//!
//! The [`ConstitutiveModel`] trait is the stress law of one material: it
//! maps a velocity gradient to a strain rate and a strain to a stress.
//! The solver holds one boxed model per material and never reimplements
//! the law itself, so models can be swapped without touching the
//! update pipeline.
//!
//! The [`MaterialLibrary`] stores named [`ElasticProperties`] presets that
//! scenarios and the CLI select by name.

pub mod elastic;
pub mod impenetrable;
pub mod library;
pub mod properties;
pub mod traits;

pub use elastic::LinearElastic;
pub use impenetrable::Impenetrable;
pub use library::MaterialLibrary;
pub use properties::{ElasticProperties, ModelKind};
pub use traits::ConstitutiveModel;

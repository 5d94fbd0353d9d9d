//! Integration tests for strata-material.

use strata_material::{
    ConstitutiveModel, ElasticProperties, Impenetrable, LinearElastic, MaterialLibrary, ModelKind,
};
use strata_math::{Tensor, Vector};

fn assert_tensor_eq(a: &Tensor, b: &Tensor, tol: f64) {
    let diff = (*a - *b).to_cols_array();
    let err = diff.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    assert!(err < tol, "tensors differ by {err}: {a:?} vs {b:?}");
}

// ─── LinearElastic Tests ──────────────────────────────────────

#[test]
fn lame_parameters_from_youngs_and_poisson() {
    let model = LinearElastic::new(1000.0, 0.3).unwrap();
    assert!((model.lambda() - 576.923_076_923).abs() < 1e-6);
    assert!((model.mu() - 384.615_384_615).abs() < 1e-6);
}

#[test]
fn rejects_invalid_parameters() {
    assert!(LinearElastic::new(0.0, 0.3).is_err());
    assert!(LinearElastic::new(1000.0, 0.5).is_err());
    assert!(LinearElastic::new(1000.0, -1.0).is_err());
    assert!(LinearElastic::new(f64::NAN, 0.3).is_err());
    assert!(LinearElastic::from_lame(1.0, 0.0).is_err());
}

#[test]
fn strain_rate_is_symmetric_part() {
    let model = LinearElastic::new(1000.0, 0.3).unwrap();
    // ∂u_x/∂y = 2: pure shear plus rotation.
    let grad = Tensor::from_cols(Vector::ZERO, Vector::new(2.0, 0.0, 0.0), Vector::ZERO);
    let rate = model.strain_rate(&grad);
    let expected = Tensor::from_cols(
        Vector::new(0.0, 1.0, 0.0),
        Vector::new(1.0, 0.0, 0.0),
        Vector::ZERO,
    );
    assert_tensor_eq(&rate, &expected, 1e-14);
}

#[test]
fn uniaxial_stress_matches_hooke() {
    let model = LinearElastic::from_lame(2.0, 3.0).unwrap();
    let strain = Tensor::from_diagonal(Vector::new(0.01, 0.0, 0.0));
    let stress = model.stress(&strain);
    // σ_xx = (λ + 2μ) ε, σ_yy = σ_zz = λ ε
    assert!((stress.x_axis.x - 0.08).abs() < 1e-14);
    assert!((stress.y_axis.y - 0.02).abs() < 1e-14);
    assert!((stress.z_axis.z - 0.02).abs() < 1e-14);
    assert_eq!(stress.y_axis.x, 0.0);
}

#[test]
fn zero_strain_gives_zero_stress() {
    let model = LinearElastic::new(1000.0, 0.3).unwrap();
    assert_eq!(model.stress(&Tensor::ZERO), Tensor::ZERO);
    assert_eq!(model.name(), "linear_elastic");
}

// ─── Impenetrable Tests ───────────────────────────────────────

#[test]
fn impenetrable_never_builds_stress() {
    let model = Impenetrable::new();
    let grad = Tensor::from_diagonal(Vector::new(1.0, -2.0, 0.5));
    assert_eq!(model.strain_rate(&grad), Tensor::ZERO);
    assert_eq!(model.stress(&grad), Tensor::ZERO);
    assert_eq!(model.name(), "impenetrable");
}

#[test]
fn boxed_models_dispatch() {
    let models: Vec<Box<dyn ConstitutiveModel>> = vec![
        Box::new(LinearElastic::new(1000.0, 0.3).unwrap()),
        Box::new(Impenetrable),
    ];
    let names: Vec<&str> = models.iter().map(|m| m.name()).collect();
    assert_eq!(names, ["linear_elastic", "impenetrable"]);
}

// ─── ElasticProperties Tests ──────────────────────────────────

#[test]
fn properties_build_matching_model() {
    let lib = MaterialLibrary::with_defaults();
    let disk = lib.get("elastic_disk").unwrap();
    assert_eq!(disk.build_model().unwrap().name(), "linear_elastic");

    let rigid = lib.get("rigid").unwrap();
    assert_eq!(rigid.kind, ModelKind::Impenetrable);
    assert_eq!(rigid.build_model().unwrap().name(), "impenetrable");
    assert!(rigid.wave_speed().is_none());
}

#[test]
fn properties_validation_catches_bad_density() {
    let props = ElasticProperties {
        name: "bad".into(),
        kind: ModelKind::LinearElastic,
        youngs_modulus: 1.0,
        poisson_ratio: 0.2,
        density: -1.0,
    };
    assert!(props.validate().is_err());
    assert!(props.build_model().is_err());
}

#[test]
fn particle_mass_and_wave_speed() {
    let props = ElasticProperties {
        name: "test".into(),
        kind: ModelKind::LinearElastic,
        youngs_modulus: 1000.0,
        poisson_ratio: 0.0,
        density: 10.0,
    };
    assert!((props.particle_mass(0.5) - 5.0).abs() < 1e-12);
    // ν = 0: λ = 0, μ = E/2, so c = sqrt(E / ρ) = 10.
    assert!((props.wave_speed().unwrap() - 10.0).abs() < 1e-12);
}

#[test]
fn properties_deserialize_with_default_kind() {
    let json = r#"{"name":"x","youngs_modulus":5.0,"poisson_ratio":0.25,"density":2.0}"#;
    let props: ElasticProperties = serde_json::from_str(json).unwrap();
    assert_eq!(props.kind, ModelKind::LinearElastic);

    let toml_src = "name = \"r\"\nkind = \"impenetrable\"\nyoungs_modulus = 0.0\npoisson_ratio = 0.0\ndensity = 1.0\n";
    let props: ElasticProperties = toml::from_str(toml_src).unwrap();
    assert_eq!(props.kind, ModelKind::Impenetrable);
}

// ─── MaterialLibrary Tests ────────────────────────────────────

#[test]
fn library_has_defaults() {
    let lib = MaterialLibrary::with_defaults();
    assert_eq!(lib.len(), 5);
    assert!(lib.get("steel").is_some());
    assert!(lib.get("unobtainium").is_none());
    assert_eq!(lib.names()[0], "aluminium");
}

#[test]
fn every_preset_is_valid() {
    let lib = MaterialLibrary::with_defaults();
    for name in lib.names() {
        let props = lib.get(name).unwrap();
        assert!(props.validate().is_ok(), "{name} should be valid");
    }
}

#[test]
fn register_overwrites() {
    let mut lib = MaterialLibrary::empty();
    assert!(lib.is_empty());
    let mut props = MaterialLibrary::with_defaults().get("rubber").unwrap().clone();
    lib.register(props.clone());
    props.density = 1.0;
    lib.register(props);
    assert_eq!(lib.len(), 1);
    assert_eq!(lib.get("rubber").unwrap().density, 1.0);
}

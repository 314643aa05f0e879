use approx::assert_relative_eq;
use nalgebra::{Unit, Vector3};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::sampling::{
    BOLTZMANN, sample_cosine_hemisphere, sample_sputter_speed, sample_thermal_speed, sample_unit_sphere,
};

const SODIUM_KG: f64 = 3.8175e-26;

#[test]
fn thermal_speed_follows_flux_weighted_maxwellian() {
    let mut rng = ChaChaRng::seed_from_u64(42);
    let temperature = 1100.0;
    let n = 20_000;

    // Reduced energy m v² / 2kT has mean 2 under the flux distribution
    let mean_x = (0..n)
        .map(|_| {
            let v = sample_thermal_speed(&mut rng, temperature, SODIUM_KG);
            SODIUM_KG * v * v / (2.0 * BOLTZMANN * temperature)
        })
        .sum::<f64>()
        / n as f64;

    assert!((mean_x - 2.0).abs() < 0.05, "Mean reduced energy {} should be near 2", mean_x);
}

#[test]
fn thermal_speed_is_finite_and_positive() {
    let mut rng = ChaChaRng::seed_from_u64(7);
    for _ in 0..1000 {
        let v = sample_thermal_speed(&mut rng, 130.0, SODIUM_KG);
        assert!(v.is_finite() && v >= 0.0, "Speed {} out of range", v);
    }
}

#[test]
fn sputter_speed_respects_cutoff() {
    let mut rng = ChaChaRng::seed_from_u64(42);
    for _ in 0..5000 {
        let v = sample_sputter_speed(&mut rng, 2_000.0, 15_000.0);
        assert!((0.0..=15_000.0).contains(&v), "Speed {} out of range", v);
    }
}

#[test]
fn sputter_speed_median_matches_cdf() {
    let mut rng = ChaChaRng::seed_from_u64(3);
    let (vb, vmax) = (2_000.0_f64, 15_000.0_f64);
    let mut speeds: Vec<f64> = (0..10_001).map(|_| sample_sputter_speed(&mut rng, vb, vmax)).collect();
    speeds.sort_by(f64::total_cmp);

    // F(x) / F(x_max) = 1/2  =>  x / (1 + x) = sqrt(F(x_max))
    let x_max = (vmax / vb).powi(2);
    let s = (x_max * x_max / (2.0 * (1.0 + x_max).powi(2))).sqrt();
    let x_half = s / (1.0 - s);
    let expected = vb * x_half.sqrt();

    assert_relative_eq!(speeds[5_000], expected, max_relative = 0.05);
}

#[test]
fn unit_sphere_samples_are_normalized_and_centered() {
    let mut rng = ChaChaRng::seed_from_u64(11);
    let n = 10_000;
    let mut sum = Vector3::zeros();
    for _ in 0..n {
        let d = sample_unit_sphere(&mut rng);
        assert_relative_eq!(d.norm(), 1.0, epsilon = 1e-12);
        sum += d.into_inner();
    }
    assert!((sum / n as f64).norm() < 0.03);
}

#[test]
fn cosine_hemisphere_stays_above_surface() {
    let mut rng = ChaChaRng::seed_from_u64(5);
    let normal = Unit::new_normalize(Vector3::new(1.0, -2.0, 0.5));
    let n = 10_000;

    let mean_cos = (0..n)
        .map(|_| {
            let d = sample_cosine_hemisphere(&mut rng, &normal);
            let c = d.dot(&normal);
            assert!(c >= -1e-12, "Direction points into the surface");
            c
        })
        .sum::<f64>()
        / n as f64;

    // E[cos θ] for a Lambertian emitter is 2/3
    assert!((mean_cos - 2.0 / 3.0).abs() < 0.02, "Mean cos {} should be near 2/3", mean_cos);
}

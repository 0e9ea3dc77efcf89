//! Multi-light Phong accumulation.
//!
//! Each light contributes `(ambient + diffuse + specular) * surface` and the
//! contributions are summed. Light order carries no meaning, so callers may
//! evaluate [`light_terms`] independently per light and reduce in any order.
//!
//! Specular is gated on `n·l > 0`: a light behind the surface, or a zero
//! normal, leaves only the ambient term whatever the viewer's position.
//!
//! Degenerate inputs are not guarded. A light or viewer sitting exactly on
//! the fragment normalizes a zero vector and the resulting NaN is carried
//! into the output color.

use glam::Vec3;

use crate::camera::CameraState;
use crate::light::PointLight;

use super::FragmentInput;

/// Fraction of each light's color applied regardless of geometry.
pub const AMBIENT_STRENGTH: f32 = 0.1;
/// Phong exponent of the specular highlight.
pub const SHININESS: f32 = 32.0;

/// The three additive terms of one light, before surface tinting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTerms {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightTerms {
    pub fn total(&self) -> Vec3 {
        self.ambient + self.diffuse + self.specular
    }
}

/// Evaluates one light at a fragment.
pub fn light_terms(
    light: &PointLight,
    world_pos: Vec3,
    world_normal: Vec3,
    view_pos: Vec3,
) -> LightTerms {
    let light_dir = (light.pos - world_pos).normalize();
    let view_dir = (view_pos - world_pos).normalize();
    let reflect_dir = reflect(-light_dir, world_normal);

    let n_dot_l = world_normal.dot(light_dir);
    let diffuse = clamp_positive(n_dot_l);
    let specular =
        facing_step(n_dot_l) * clamp_positive(view_dir.dot(reflect_dir)).powf(SHININESS);

    LightTerms {
        ambient: light.color * AMBIENT_STRENGTH,
        diffuse: light.color * diffuse,
        specular: light.color * specular,
    }
}

/// Sums every light's contribution for a fragment with the given surface color.
#[derive(Debug, Clone, Copy)]
pub struct LightingAccumulator<'a> {
    view_pos: Vec3,
    lights: &'a [PointLight],
}

impl<'a> LightingAccumulator<'a> {
    pub fn new(camera: &CameraState, lights: &'a [PointLight]) -> Self {
        Self {
            view_pos: camera.view_pos,
            lights,
        }
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Per-light tinted contributions, in storage order.
    pub fn contributions<'f>(
        &'f self,
        fragment: &'f FragmentInput,
        surface: Vec3,
    ) -> impl Iterator<Item = Vec3> + 'f {
        self.lights.iter().map(move |light| {
            light_terms(light, fragment.world_pos, fragment.world_normal, self.view_pos).total()
                * surface
        })
    }

    /// Accumulated rgb. Exactly zero when there are no lights.
    pub fn accumulate(&self, fragment: &FragmentInput, surface: Vec3) -> Vec3 {
        self.contributions(fragment, surface)
            .fold(Vec3::ZERO, |sum, contribution| sum + contribution)
    }
}

/// Mirrors WGSL `reflect`: `incident - 2 * dot(normal, incident) * normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

// `f32::max` would turn NaN into 0 and hide degenerate directions.
fn clamp_positive(value: f32) -> f32 {
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

// 1 for a lit side, 0 otherwise; NaN passes through.
fn facing_step(n_dot_l: f32) -> f32 {
    if n_dot_l <= 0.0 {
        0.0
    } else if n_dot_l > 0.0 {
        1.0
    } else {
        n_dot_l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec4};

    fn fragment_at_origin(normal: Vec3) -> FragmentInput {
        FragmentInput {
            world_pos: Vec3::ZERO,
            world_normal: normal,
            uv: Vec2::ZERO,
            color: Vec4::new(0.8, 0.6, 0.4, 0.5),
        }
    }

    fn camera_at(pos: Vec3) -> CameraState {
        CameraState::new(glam::Mat4::IDENTITY, pos)
    }

    fn scattered_lights() -> Vec<PointLight> {
        vec![
            PointLight::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(1.0, 1.0, 1.0)),
            PointLight::new(Vec3::new(2.0, 1.0, -1.0), Vec3::new(0.2, 0.9, 0.1)),
            PointLight::new(Vec3::new(-4.0, 0.5, 2.0), Vec3::new(0.7, 0.0, 0.3)),
            PointLight::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.5, 0.5, 1.0)),
            PointLight::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(3.0, 2.0, 1.0)),
        ]
    }

    #[test]
    fn no_lights_is_exact_black() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let accumulator = LightingAccumulator::new(&camera, &[]);
        let fragment = fragment_at_origin(Vec3::Y);
        let rgb = accumulator.accumulate(&fragment, fragment.color.truncate());
        assert_eq!(rgb, Vec3::ZERO);
    }

    #[test]
    fn sum_matches_independent_terms_in_any_order() {
        let camera = camera_at(Vec3::new(0.5, 2.0, 4.0));
        let fragment = fragment_at_origin(Vec3::new(0.0, 0.8, 0.6));
        let surface = fragment.color.truncate();
        let lights = scattered_lights();

        let expected = lights.iter().fold(Vec3::ZERO, |sum, light| {
            let terms = light_terms(light, fragment.world_pos, fragment.world_normal, camera.view_pos);
            sum + (terms.ambient + terms.diffuse + terms.specular) * surface
        });

        for n in 0..=lights.len() {
            let subset = &lights[..n];
            let forward = LightingAccumulator::new(&camera, subset).accumulate(&fragment, surface);
            let mut reversed_lights = subset.to_vec();
            reversed_lights.reverse();
            let reversed =
                LightingAccumulator::new(&camera, &reversed_lights).accumulate(&fragment, surface);
            assert!(forward.abs_diff_eq(reversed, 1e-5), "n = {n}");
        }

        let all = LightingAccumulator::new(&camera, &lights).accumulate(&fragment, surface);
        assert!(all.abs_diff_eq(expected, 1e-5));

        let mut rotated = lights.clone();
        rotated.rotate_left(2);
        let rotated_sum = LightingAccumulator::new(&camera, &rotated).accumulate(&fragment, surface);
        assert!(rotated_sum.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn large_light_counts_are_fully_iterated() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let light = PointLight::new(Vec3::new(0.0, 0.0, 5.0), Vec3::splat(0.001));
        let lights = vec![light; 10_000];
        let fragment = fragment_at_origin(Vec3::Z);
        let accumulator = LightingAccumulator::new(&camera, &lights);
        assert_eq!(accumulator.light_count(), 10_000);
        assert_eq!(accumulator.contributions(&fragment, Vec3::ONE).count(), 10_000);

        let single = light_terms(&light, Vec3::ZERO, Vec3::Z, camera.view_pos).total();
        let sum = accumulator.accumulate(&fragment, Vec3::ONE);
        assert!(sum.abs_diff_eq(single * 10_000.0, 5e-2));
    }

    #[test]
    fn light_along_normal_gives_full_diffuse() {
        let light = PointLight::new(Vec3::new(0.0, 4.0, 0.0), Vec3::new(0.9, 0.5, 0.2));
        let terms = light_terms(&light, Vec3::ZERO, Vec3::Y, Vec3::new(3.0, 1.0, 0.0));
        assert_eq!(terms.diffuse, light.color);
        assert_eq!(terms.ambient, light.color * AMBIENT_STRENGTH);
    }

    #[test]
    fn light_behind_surface_leaves_only_ambient() {
        let light = PointLight::new(Vec3::new(0.0, -4.0, 0.0), Vec3::new(1.0, 0.5, 0.25));
        let terms = light_terms(&light, Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(terms.diffuse, Vec3::ZERO);
        assert_eq!(terms.specular, Vec3::ZERO);
        assert_eq!(terms.total(), light.color * AMBIENT_STRENGTH);
    }

    #[test]
    fn mirror_direction_gives_full_specular() {
        let light = PointLight::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::ONE);
        let viewer = Vec3::new(1.0, 1.0, 0.0);
        let terms = light_terms(&light, Vec3::ZERO, Vec3::Y, viewer);
        assert!(terms.specular.abs_diff_eq(Vec3::ONE, 1e-5));
    }

    #[test]
    fn zero_normal_is_not_nan() {
        // Viewer and light on the same side, so the reflected ray points away.
        let light = PointLight::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.6, 0.3, 0.9));
        let terms = light_terms(&light, Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(terms.diffuse, Vec3::ZERO);
        assert_eq!(terms.specular, Vec3::ZERO);
        assert_eq!(terms.total(), light.color * AMBIENT_STRENGTH);
    }

    #[test]
    fn zero_normal_hides_highlight_from_opposite_viewer() {
        // reflect(-l, 0) is -l, which points straight at this viewer.
        let light = PointLight::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.6, 0.3, 0.9));
        let terms = light_terms(&light, Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(terms.diffuse, Vec3::ZERO);
        assert_eq!(terms.specular, Vec3::ZERO);
        assert_eq!(terms.total(), light.color * AMBIENT_STRENGTH);
    }

    #[test]
    fn light_and_viewer_behind_surface_leave_only_ambient() {
        let light = PointLight::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 0.5, 0.25));
        let viewer = Vec3::new(1.0, -1.0, 0.0);
        let terms = light_terms(&light, Vec3::ZERO, Vec3::Y, viewer);
        assert_eq!(terms.diffuse, Vec3::ZERO);
        assert_eq!(terms.specular, Vec3::ZERO);
        assert_eq!(terms.total(), light.color * AMBIENT_STRENGTH);
    }

    #[test]
    fn facing_step_keeps_nan() {
        assert_eq!(facing_step(0.5), 1.0);
        assert_eq!(facing_step(0.0), 0.0);
        assert_eq!(facing_step(-0.5), 0.0);
        assert!(facing_step(f32::NAN).is_nan());
    }

    #[test]
    fn light_on_fragment_propagates_nan() {
        let camera = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let lights = [PointLight::new(Vec3::ZERO, Vec3::ONE)];
        let fragment = fragment_at_origin(Vec3::Z);
        let rgb = LightingAccumulator::new(&camera, &lights).accumulate(&fragment, Vec3::ONE);
        assert!(rgb.is_nan());
    }

    #[test]
    fn viewer_on_fragment_propagates_nan() {
        let camera = camera_at(Vec3::ZERO);
        let lights = [PointLight::new(Vec3::new(0.0, 0.0, 3.0), Vec3::ONE)];
        let fragment = fragment_at_origin(Vec3::Z);
        let rgb = LightingAccumulator::new(&camera, &lights).accumulate(&fragment, Vec3::ONE);
        assert!(rgb.is_nan());
    }

    #[test]
    fn reflect_matches_wgsl_definition() {
        let incident = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(incident, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(reflect(incident, Vec3::ZERO), incident);
    }
}

use glam::{Vec3, Vec4};
use log::warn;

use crate::config::{ShadingConfig, ShadingStrategy};
use crate::error::ConfigError;
use crate::frame::FrameInputs;
use crate::mesh::Mesh;
use crate::shading::{
    marker_clip_position, marker_color, transform_vertex, FragmentStage, SurfaceTexture,
};

/// Shading summary for one particle instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceReport {
    pub index: usize,
    /// Mean over the samples that produced no NaN; NaN when none did.
    pub mean_rgb: Vec3,
    pub alpha: f32,
    pub samples: usize,
    pub nan_samples: usize,
}

/// Where a light's marker glyph lands and what color it gets.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerReport {
    pub index: usize,
    pub clip_position: Vec4,
    pub color: Vec4,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub strategy: ShadingStrategy,
    pub light_count: usize,
    pub instances: Vec<InstanceReport>,
    pub markers: Vec<MarkerReport>,
}

impl FrameReport {
    pub fn nan_samples(&self) -> usize {
        self.instances.iter().map(|report| report.nan_samples).sum()
    }

    pub fn samples(&self) -> usize {
        self.instances.iter().map(|report| report.samples).sum()
    }
}

/// Runs the vertex stage for every mesh vertex of every instance and shades
/// each resulting sample with the configured strategy.
pub fn evaluate_frame(
    inputs: &FrameInputs,
    mesh: &Mesh,
    config: &ShadingConfig,
    texture: Option<&SurfaceTexture>,
) -> Result<FrameReport, ConfigError> {
    let camera = &inputs.camera;
    let lights = inputs.lights.lights();
    let stage = FragmentStage::new(config.strategy, camera, lights, texture)?;

    let instances = inputs
        .instances
        .iter()
        .enumerate()
        .map(|(index, instance)| {
            let mut sum = Vec3::ZERO;
            let mut finite = 0usize;
            let mut nan_samples = 0usize;
            for vertex in &mesh.vertices {
                let output = transform_vertex(camera, instance, vertex);
                let shaded = stage.shade(&output.fragment);
                if shaded.is_nan() {
                    nan_samples += 1;
                } else {
                    sum += shaded.rgb;
                    finite += 1;
                }
            }
            InstanceReport {
                index,
                mean_rgb: if finite == 0 {
                    Vec3::NAN
                } else {
                    sum / finite as f32
                },
                alpha: instance.color.w,
                samples: mesh.vertices.len(),
                nan_samples,
            }
        })
        .collect();

    let markers = if config.draw_markers {
        lights
            .iter()
            .enumerate()
            .map(|(index, light)| MarkerReport {
                index,
                clip_position: marker_clip_position(camera, light, Vec3::ZERO),
                color: marker_color(light),
            })
            .collect()
    } else {
        Vec::new()
    };

    let report = FrameReport {
        strategy: config.strategy,
        light_count: lights.len(),
        instances,
        markers,
    };
    let nan = report.nan_samples();
    if nan > 0 {
        warn!(
            "{nan} of {} shaded samples are NaN ({} strategy)",
            report.samples(),
            report.strategy
        );
    }
    Ok(report)
}

pub fn print_report(report: &FrameReport) {
    println!(
        "Shading strategy: {} ({} lights)",
        report.strategy, report.light_count
    );
    for instance in &report.instances {
        println!(
            " - particle {} rgb=({:.3}, {:.3}, {:.3}) alpha={:.2} nan={}/{}",
            instance.index,
            instance.mean_rgb.x,
            instance.mean_rgb.y,
            instance.mean_rgb.z,
            instance.alpha,
            instance.nan_samples,
            instance.samples
        );
    }
    for marker in &report.markers {
        println!(
            " - marker {} clip=({:.3}, {:.3}, {:.3}, {:.3}) color=({:.2}, {:.2}, {:.2})",
            marker.index,
            marker.clip_position.x,
            marker.clip_position.y,
            marker.clip_position.z,
            marker.clip_position.w,
            marker.color.x,
            marker.color.y,
            marker.color.z
        );
    }
}

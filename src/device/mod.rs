//! GPU-accelerated reductions using WGPU.
//!
//! This module implements [`DeviceTag`]'s reduction with a single WGSL
//! compute shader. It handles GPU context initialization, pipeline creation
//! (cached once via `lazy_static`), and dispatch.
//!
//! Each workgroup reduces 256 consecutive elements with an order-preserving
//! tree, writes one partial, and the partials are read back and folded on
//! the host in order. Inputs larger than one dispatch are processed in
//! batches.
//!
//! Only `f32` data with [`Plus`], [`Maximum`] or [`Minimum`] can run here,
//! since the operator has to exist in the shader. Any GPU failure makes
//! [`DeviceTag`] fall back to [`ParTag`] with a warning; [`try_reduce`]
//! surfaces the failure instead.
//!
//! `max`/`min` on the GPU follow WGSL semantics for NaN, which are
//! implementation defined.

use std::sync::mpsc;

use briny::raw::{slice_from_bytes, slice_to_bytes};
use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::dispatch::{Reduce, ReduceN};
use crate::op::{BinaryOp, Maximum, Minimum, Plus};
use crate::sequence::RandomAccess;
use crate::tag::{DeviceTag, ParTag};

const REDUCE: &str = include_str!("shaders/reduce.wgsl");

/// Elements reduced by one workgroup. Must match the shader.
pub const WORKGROUP_SIZE: usize = 256;

/// Maximum workgroups per dispatch along one dimension.
const MAX_WORKGROUPS: usize = 65_535;

/// Elements processed by one dispatch.
const BATCH_LEN: usize = WORKGROUP_SIZE * MAX_WORKGROUPS;

/// Errors from the device backend.
#[derive(Error, Debug)]
pub enum GpuFailure {
    /// No GPU context could be created earlier; see the logged cause.
    #[error("no GPU context is available")]
    Unavailable,
    /// An error in requesting the adapter.
    #[error("adapter error: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    /// An error in requesting the device.
    #[error("device error: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    /// Waiting on the device failed.
    #[error("poll error: {0}")]
    Poll(#[from] wgpu::PollError),
    /// Mapping the readback buffer failed.
    #[error("buffer mapping failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    /// The readback buffer could not be viewed as `f32`.
    #[error("readback buffer is not a valid f32 slice")]
    Readback,
}

/// An operator the reduction shader implements.
pub trait DeviceOp: BinaryOp<f32> + Copy + Sync {
    /// Operator code passed to the shader.
    const CODE: u32;
}

impl DeviceOp for Plus {
    const CODE: u32 = 0;
}

impl DeviceOp for Maximum {
    const CODE: u32 = 1;
}

impl DeviceOp for Minimum {
    const CODE: u32 = 2;
}

/// Holds the WGPU device and queue used for executing compute pipelines.
pub struct GpuContext {
    /// The actual GPU device.
    pub device: wgpu::Device,
    /// A queue for information related to the device.
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Initializes a new GPU context with the default adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if adapter or device acquisition fails.
    pub fn new() -> Result<Self, GpuFailure> {
        let instance = wgpu::Instance::default();
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))?;
        log::debug!("using GPU adapter {:?}", adapter.get_info().name);
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("briny_reduce"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))?;

        Ok(Self { device, queue })
    }
}

struct ReducePipeline {
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

impl ReducePipeline {
    fn new(ctx: &GpuContext) -> Self {
        let device = &ctx.device;
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("reduce"),
            source: wgpu::ShaderSource::Wgsl(REDUCE.into()),
        });

        let entry = |binding, ty| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("reduce_bgl"),
            entries: &[
                entry(0, wgpu::BufferBindingType::Uniform),
                entry(1, wgpu::BufferBindingType::Storage { read_only: true }),
                entry(2, wgpu::BufferBindingType::Storage { read_only: false }),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("reduce_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("reduce_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            cache: None,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        });
        log::debug!("reduce pipeline compiled");

        Self { layout, pipeline }
    }
}

lazy_static::lazy_static! {
    static ref GPU_CONTEXT: Option<GpuContext> = match GpuContext::new() {
        Ok(ctx) => Some(ctx),
        Err(err) => {
            log::warn!("GPU context unavailable: {err}");
            None
        }
    };
    static ref REDUCE_PIPELINE: Option<ReducePipeline> = GPU_CONTEXT.as_ref().map(ReducePipeline::new);
}

/// Whether a GPU context could be created.
pub fn is_available() -> bool {
    GPU_CONTEXT.is_some()
}

/// Reduces one batch (at most [`BATCH_LEN`] elements) into per-workgroup partials.
fn run_batch(
    ctx: &GpuContext,
    pipe: &ReducePipeline,
    input: &[f32],
    code: u32,
) -> Result<Vec<f32>, GpuFailure> {
    let device = &ctx.device;
    let groups = input.len().div_ceil(WORKGROUP_SIZE);
    let partial_size = (groups * size_of::<f32>()) as u64;

    let params = [input.len() as u32, code, 0, 0];
    let params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("reduce_params"),
        contents: slice_to_bytes(&params[..]),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let input_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("reduce_input"),
        contents: slice_to_bytes(input),
        usage: wgpu::BufferUsages::STORAGE,
    });

    let partial_buf = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("reduce_partials"),
        size: partial_size,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        mapped_at_creation: false,
    });

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("reduce_staging"),
        size: partial_size,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("reduce_bind_group"),
        layout: &pipe.layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buf.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: input_buf.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: partial_buf.as_entire_binding(),
            },
        ],
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("reduce_encoder"),
    });
    {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("reduce_pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&pipe.pipeline);
        cpass.set_bind_group(0, &bind_group, &[]);
        cpass.dispatch_workgroups(groups as u32, 1, 1);
    }
    encoder.copy_buffer_to_buffer(&partial_buf, 0, &staging, 0, partial_size);
    ctx.queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::PollType::Wait)?;
    rx.recv().map_err(|_| GpuFailure::Readback)??;

    let view = slice.get_mapped_range();
    let partials = slice_from_bytes::<f32>(&view)
        .map_err(|_| GpuFailure::Readback)?
        .to_vec();
    drop(view);
    staging.unmap();

    Ok(partials)
}

/// Reduces `input` on the GPU without an initial value.
///
/// Returns `Ok(None)` for empty input without touching the device.
///
/// # Errors
///
/// Returns a [`GpuFailure`] if no GPU is available or the dispatch fails.
pub fn reduce_partials<F: DeviceOp>(input: &[f32], op: F) -> Result<Option<f32>, GpuFailure> {
    if input.is_empty() {
        return Ok(None);
    }
    let (Some(ctx), Some(pipe)) = (GPU_CONTEXT.as_ref(), REDUCE_PIPELINE.as_ref()) else {
        return Err(GpuFailure::Unavailable);
    };

    let mut total: Option<f32> = None;
    for batch in input.chunks(BATCH_LEN) {
        log::trace!("device reduce batch of {} elements", batch.len());
        for partial in run_batch(ctx, pipe, batch, F::CODE)? {
            total = Some(match total {
                Some(acc) => op.apply(acc, partial),
                None => partial,
            });
        }
    }
    Ok(total)
}

/// Reduces `input` onto `init` on the GPU, reporting failures.
///
/// # Errors
///
/// Returns a [`GpuFailure`] if no GPU is available or the dispatch fails.
pub fn try_reduce<F: DeviceOp>(input: &[f32], init: f32, op: F) -> Result<f32, GpuFailure> {
    Ok(match reduce_partials(input, op)? {
        Some(partial) => op.apply(init, partial),
        None => init,
    })
}

impl<F: DeviceOp> Reduce<&[f32], f32, F> for DeviceTag {
    fn reduce(self, seq: &[f32], init: f32, op: F) -> f32 {
        match try_reduce(seq, init, op) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("device reduction failed ({err}), falling back to the parallel host");
                ParTag.reduce(seq, init, op)
            }
        }
    }
}

impl<F: DeviceOp> ReduceN<&[f32], f32, F> for DeviceTag {
    fn reduce_n(self, seq: &[f32], n: usize, init: f32, op: F) -> f32 {
        self.reduce(seq.prefix(n), init, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx::approx_eq;

    #[test]
    fn empty_input_never_touches_the_device() {
        assert_eq!(try_reduce(&[], 2.5, Plus).ok(), Some(2.5));
        assert_eq!(reduce_partials(&[], Maximum).ok(), Some(None));
    }

    #[test]
    fn device_tag_sums_match_host() {
        let data: Vec<f32> = (0..10_000).map(|i| (i % 17) as f32 * 0.25).collect();
        let expected: f32 = data.iter().sum();
        let got = DeviceTag.reduce(&data[..], 0.0, Plus);
        assert!(approx_eq(&got, &expected));
    }

    #[test]
    fn device_tag_extrema() {
        let data: Vec<f32> = (0..1_000).map(|i| ((i * 37) % 1_000) as f32 - 500.0).collect();
        assert_eq!(DeviceTag.reduce(&data[..], f32::MIN, Maximum), 499.0);
        assert_eq!(DeviceTag.reduce(&data[..], f32::MAX, Minimum), -500.0);
    }

    #[test]
    fn device_tag_counted() {
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(DeviceTag.reduce_n(&data[..], 3, 100.0, Plus), 106.0);
    }
}

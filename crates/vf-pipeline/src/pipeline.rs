use vf_cube::{DataCube, MaskCube, Region};
use vf_linker::{LinkerParams, ObjectParams};
use vf_noise::NoiseStatistic;
use vf_reliability::ReliabilityParams;
use vf_scfind::ThresholdMode;
use vf_stats::FluxRange;

use crate::context::Context;
use crate::error::{PipelineError, Result};
use crate::params::ParameterSet;
use crate::traits::{CatalogColumn, CatalogSink, CatalogValue, CubeSource, MaskSink, WcsConverter};

/// The working cube, final label mask, and object table handed back to
/// the caller once a pipeline run completes.
pub struct PipelineOutput {
    pub cube: DataCube,
    pub mask: MaskCube<i32>,
    pub table: Vec<ObjectParams>,
}

fn parse_statistic(key: &str, s: &str) -> Result<NoiseStatistic> {
    match s {
        "std" => Ok(NoiseStatistic::Std),
        "mad" => Ok(NoiseStatistic::Mad),
        "gauss" => Ok(NoiseStatistic::Gauss),
        other => Err(PipelineError::Parameter(format!("key '{key}' has unrecognised statistic '{other}'"))),
    }
}

fn parse_range(key: &str, s: &str) -> Result<FluxRange> {
    match s {
        "negative" => Ok(FluxRange::Negative),
        "full" => Ok(FluxRange::Full),
        "positive" => Ok(FluxRange::Positive),
        other => Err(PipelineError::Parameter(format!("key '{key}' has unrecognised flux range '{other}'"))),
    }
}

fn parse_threshold_mode(s: &str) -> Result<ThresholdMode> {
    match s {
        "absolute" => Ok(ThresholdMode::Absolute),
        "relative" => Ok(ThresholdMode::Relative),
        other => Err(PipelineError::Parameter(format!(
            "key 'threshold.mode' has unrecognised mode '{other}'"
        ))),
    }
}

fn parse_region(spec: &str) -> Result<Option<Region>> {
    if spec.trim().is_empty() {
        return Ok(None);
    }
    let parts: Vec<&str> = spec.split(',').map(|s| s.trim()).collect();
    if parts.len() != 6 {
        return Err(PipelineError::Parameter(format!(
            "input.region must have 6 comma-separated bounds, got '{spec}'"
        )));
    }
    let mut bounds = [0usize; 6];
    for (i, p) in parts.iter().enumerate() {
        bounds[i] = p
            .parse::<usize>()
            .map_err(|_| PipelineError::Parameter(format!("input.region element '{p}' is not a non-negative integer")))?;
    }
    Ok(Some(Region::new(bounds[0], bounds[1], bounds[2], bounds[3], bounds[4], bounds[5])))
}

/// Runs the full ingest-to-emission pipeline once.
///
/// `exclusion_catalog` is a caller-supplied list of `(longitude,
/// latitude)` pairs converted via `wcs` into pixel-space regions
/// excluded from the reliability stage's negative-population fit,
/// mirroring spec.md §6's reliability exclusion catalogue. A failed
/// world-to-pixel conversion is logged and that entry is discarded
/// rather than treated as fatal.
///
/// # Errors
/// Returns [`PipelineError::ReliabilityWithKeepNegative`] before any
/// cube is loaded if `reliability.enable` and `linker.keepNegative` are
/// both set; returns [`PipelineError::NoSourceFound`] if the final
/// object table is empty after every enabled stage has run.
pub fn run_pipeline(
    ctx: &Context,
    params: &ParameterSet,
    source: &dyn CubeSource,
    wcs: Option<&dyn WcsConverter>,
    exclusion_catalog: &[(f64, f64)],
    catalog_sink: &mut dyn CatalogSink,
    mask_sink: &mut dyn MaskSink,
) -> Result<PipelineOutput> {
    params.validate()?;

    let reliability_enable = params.get_bool("reliability.enable")?;
    let keep_negative = params.get_bool("linker.keepNegative")?;
    if reliability_enable && keep_negative {
        return Err(PipelineError::ReliabilityWithKeepNegative);
    }

    let region = parse_region(params.get_str("input.region")?)?;
    let (mut cube, _preloaded_mask) = source.load(region)?;
    log::info!("loaded cube with shape {:?}", cube.shape());

    if params.get_bool("input.invert")? {
        cube.multiply_by_scalar(-1.0);
    }

    let inf_regions = cube.flag_infinity();
    if !inf_regions.is_empty() {
        log::warn!("flagged {} non-finite spectral region(s)", inf_regions.len());
    }

    if params.get_bool("continuum.enable")? {
        run_continuum_subtraction(params, &mut cube)?;
    }

    if params.get_bool("scaleNoise.enable")? {
        run_noise_scaling(ctx, params, &mut cube)?;
    }

    let (nx, ny, nz) = cube.shape();
    let mut mask8 = MaskCube::<i8>::new_blank(nx, ny, nz)?;

    if params.get_bool("scfind.enable")? {
        run_scfind_stage(ctx, params, &cube, &mut mask8)?;
    }
    if params.get_bool("threshold.enable")? {
        run_threshold_stage(params, &cube, &mut mask8)?;
    }

    let mut label32 = MaskCube::<i32>::new_blank(nx, ny, nz)?;
    let linker_params = LinkerParams {
        radius_x: params.get_i64("linker.radiusXY")? as usize,
        radius_y: params.get_i64("linker.radiusXY")? as usize,
        radius_z: params.get_i64("linker.radiusZ")? as usize,
        min_size_x: params.get_i64("linker.minSizeXY")? as usize,
        min_size_y: params.get_i64("linker.minSizeXY")? as usize,
        min_size_z: params.get_i64("linker.minSizeZ")? as usize,
        max_size_x: params.get_i64("linker.maxSizeXY")? as usize,
        max_size_y: params.get_i64("linker.maxSizeXY")? as usize,
        max_size_z: params.get_i64("linker.maxSizeZ")? as usize,
        keep_negative,
    };
    let mut table = vf_linker::run_linker(&cube, &mut mask8, &mut label32, &linker_params)?;
    log::info!("linker produced {} object(s)", table.len());

    if reliability_enable {
        let exclusion_regions = resolve_exclusion_regions(wcs, exclusion_catalog, nz);
        let rel_params = ReliabilityParams {
            scale_kernel: params.get_f64("reliability.scaleKernel")?,
            fmin: params.get_f64("reliability.fmin")?,
        };
        vf_reliability::run_reliability(&mut table, &rel_params, &exclusion_regions)?;

        let threshold = params.get_f64("reliability.threshold")? as f32;
        let label_map = vf_reliability::reliability_filter(&table, threshold);
        label32.filter_mask_32(&label_map);
        table = table
            .iter()
            .filter_map(|o| {
                label_map.get(o.label).map(|new_label| {
                    let mut renumbered = *o;
                    renumbered.label = new_label;
                    renumbered
                })
            })
            .collect();
        log::info!("reliability filter retained {} object(s)", table.len());
    }

    if params.get_bool("dilation.enable")? {
        let dilation_params = vf_dilation::DilationParams {
            iterations_z: params.get_i64("dilation.iterationsZ")? as usize,
            iterations_xy: params.get_i64("dilation.iterationsXY")? as usize,
            tau: params.get_f64("dilation.threshold")?,
        };
        vf_dilation::run_dilation(&cube, &mut label32, &mut table, &dilation_params)?;
    }

    if params.get_bool("parameter.enable")? {
        let columns = build_catalog_columns(&table);
        catalog_sink.emit(&columns)?;
    }

    if params.get_bool("output.writeMask")? {
        mask_sink.emit_mask(&label32)?;
    }
    if params.get_bool("output.writeMask2d")? {
        let flat = label32.two_dim_mask();
        mask_sink.emit_mask_2d(&flat)?;
    }

    if table.is_empty() {
        return Err(PipelineError::NoSourceFound);
    }

    Ok(PipelineOutput { cube, mask: label32, table })
}

fn resolve_exclusion_regions(wcs: Option<&dyn WcsConverter>, catalog: &[(f64, f64)], nz: usize) -> Vec<Region> {
    let Some(wcs) = wcs else {
        return Vec::new();
    };
    catalog
        .iter()
        .filter_map(|&(lon, lat)| match wcs.world_to_pixel(lon, lat) {
            Some((x, y)) => Some(Region::new(x, x, y, y, 0, nz.saturating_sub(1))),
            None => {
                log::warn!("discarding exclusion catalogue entry ({lon}, {lat}): world-to-pixel conversion failed");
                None
            }
        })
        .collect()
}

fn run_continuum_subtraction(params: &ParameterSet, cube: &mut DataCube) -> Result<()> {
    let (nx, ny, nz) = cube.shape();
    let mode = params.get_str("continuum.mode")?;
    let shift = params.get_i64("continuum.shift")? as usize;
    let order = params.get_i64("continuum.order")? as usize;

    for y in 0..ny {
        for x in 0..nx {
            let mut spectrum: Vec<f32> = (0..nz).map(|z| cube.get(x, y, z)).collect();
            match mode {
                "shiftSubtract" => vf_filter::shift_and_subtract(&mut spectrum, shift)?,
                "polynomial" => vf_filter::polynomial_continuum_subtract(&mut spectrum, order)?,
                other => {
                    return Err(PipelineError::Parameter(format!(
                        "key 'continuum.mode' has unrecognised mode '{other}'"
                    )))
                }
            }
            for (z, v) in spectrum.into_iter().enumerate() {
                cube.set(x, y, z, v);
            }
        }
    }
    Ok(())
}

fn run_noise_scaling(ctx: &Context, params: &ParameterSet, cube: &mut DataCube) -> Result<()> {
    let statistic = parse_statistic("scaleNoise.statistic", params.get_str("scaleNoise.statistic")?)?;
    let range = parse_range("scaleNoise.fluxRange", params.get_str("scaleNoise.fluxRange")?)?;
    let mode = params.get_str("scaleNoise.mode")?;

    match mode {
        "spectral" => {
            ctx.install(|| vf_noise::scale_noise_spec(cube, statistic, range));
        }
        "local" => {
            let window_xy = params.get_i64("scaleNoise.windowXY")? as usize;
            let window_z = params.get_i64("scaleNoise.windowZ")? as usize;
            let grid_xy = params.get_i64("scaleNoise.gridXY")? as usize;
            let grid_z = params.get_i64("scaleNoise.gridZ")? as usize;
            let interpolate = params.get_bool("scaleNoise.interpolate")?;
            ctx.install(|| {
                vf_noise::scale_noise_local(cube, statistic, range, window_xy, window_z, grid_xy, grid_z, interpolate)
            })?;
        }
        other => {
            return Err(PipelineError::Parameter(format!(
                "key 'scaleNoise.mode' has unrecognised mode '{other}'"
            )))
        }
    }
    Ok(())
}

fn run_scfind_stage(ctx: &Context, params: &ParameterSet, cube: &DataCube, mask8: &mut MaskCube<i8>) -> Result<()> {
    let spatial_sigmas = params.get_f64_list("scfind.kernelsXY")?;
    let spectral_lengths = params.get_usize_list("scfind.kernelsZ")?;
    let threshold = params.get_f64("scfind.threshold")?;
    let replacement = params.get_f64("scfind.replacement")?;
    let statistic = parse_statistic("scfind.statistic", params.get_str("scfind.statistic")?)?;
    let range = parse_range("scfind.fluxRange", params.get_str("scfind.fluxRange")?)?;

    ctx.install(|| {
        vf_scfind::run_scfind(cube, mask8, &spatial_sigmas, &spectral_lengths, threshold, replacement, statistic, range)
    })?;
    Ok(())
}

fn run_threshold_stage(params: &ParameterSet, cube: &DataCube, mask8: &mut MaskCube<i8>) -> Result<()> {
    let mode = parse_threshold_mode(params.get_str("threshold.mode")?)?;
    let threshold = params.get_f64("threshold.threshold")?;
    let statistic = parse_statistic("scfind.statistic", params.get_str("scfind.statistic")?)?;
    let range = parse_range("scfind.fluxRange", params.get_str("scfind.fluxRange")?)?;
    vf_scfind::run_threshold(cube, mask8, mode, threshold, statistic, range)?;
    Ok(())
}

fn build_catalog_columns(table: &[ObjectParams]) -> Vec<CatalogColumn> {
    let col = |name: &str, unit: &str, desc: &str, values: Vec<CatalogValue>| CatalogColumn {
        name: name.to_string(),
        unit: unit.to_string(),
        description: desc.to_string(),
        values,
    };
    vec![
        col(
            "id",
            "",
            "object label",
            table.iter().map(|o| CatalogValue::Int(o.label as i64)).collect(),
        ),
        col(
            "n_pix",
            "",
            "pixel count",
            table.iter().map(|o| CatalogValue::Int(o.n_pix as i64)).collect(),
        ),
        col(
            "x_min",
            "pix",
            "bounding box",
            table.iter().map(|o| CatalogValue::Int(o.x_min as i64)).collect(),
        ),
        col(
            "x_max",
            "pix",
            "bounding box",
            table.iter().map(|o| CatalogValue::Int(o.x_max as i64)).collect(),
        ),
        col(
            "y_min",
            "pix",
            "bounding box",
            table.iter().map(|o| CatalogValue::Int(o.y_min as i64)).collect(),
        ),
        col(
            "y_max",
            "pix",
            "bounding box",
            table.iter().map(|o| CatalogValue::Int(o.y_max as i64)).collect(),
        ),
        col(
            "z_min",
            "pix",
            "bounding box",
            table.iter().map(|o| CatalogValue::Int(o.z_min as i64)).collect(),
        ),
        col(
            "z_max",
            "pix",
            "bounding box",
            table.iter().map(|o| CatalogValue::Int(o.z_max as i64)).collect(),
        ),
        col(
            "f_sum",
            "flux units",
            "accumulated flux",
            table.iter().map(|o| CatalogValue::Float(o.f_sum as f64)).collect(),
        ),
        col(
            "f_min",
            "flux units",
            "flux extreme",
            table.iter().map(|o| CatalogValue::Float(o.f_min as f64)).collect(),
        ),
        col(
            "f_max",
            "flux units",
            "flux extreme",
            table.iter().map(|o| CatalogValue::Float(o.f_max as f64)).collect(),
        ),
        col(
            "rel",
            "",
            "reliability",
            table.iter().map(|o| CatalogValue::Float(o.rel as f64)).collect(),
        ),
    ]
}

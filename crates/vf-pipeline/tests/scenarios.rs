use vf_cube::{DataCube, Region};
use vf_pipeline::{
    CatalogColumn, CatalogSink, Context, CubeSource, MaskSink, MemoryCubeSource, ParameterSet, PipelineError,
    WcsConverter,
};

#[derive(Default)]
struct RecordingCatalogSink {
    rows: usize,
}

impl CatalogSink for RecordingCatalogSink {
    fn emit(&mut self, columns: &[CatalogColumn]) -> vf_pipeline::Result<()> {
        self.rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingMaskSink {
    wrote_mask: bool,
    wrote_mask_2d: bool,
}

impl MaskSink for RecordingMaskSink {
    fn emit_mask(&mut self, _mask: &vf_cube::MaskCube<i32>) -> vf_pipeline::Result<()> {
        self.wrote_mask = true;
        Ok(())
    }
    fn emit_mask_2d(&mut self, _mask: &vf_cube::MaskCube<i32>) -> vf_pipeline::Result<()> {
        self.wrote_mask_2d = true;
        Ok(())
    }
}

struct NoWcs;
impl WcsConverter for NoWcs {
    fn world_to_pixel(&self, _lon: f64, _lat: f64) -> Option<(usize, usize)> {
        None
    }
}

struct PanicCubeSource;
impl CubeSource for PanicCubeSource {
    fn load(&self, _region: Option<Region>) -> vf_pipeline::Result<(DataCube, Option<vf_cube::MaskCube<i32>>)> {
        panic!("cube source should not be consulted before parameter validation fails");
    }
}

fn base_params() -> ParameterSet {
    let mut p = ParameterSet::new();
    p.set("scfind.kernelsXY", "0");
    p.set("scfind.kernelsZ", "0");
    p.set("scfind.threshold", "5.0");
    p.set("scfind.statistic", "std");
    p.set("reliability.enable", "false");
    p.set("dilation.enable", "false");
    p
}

#[test]
fn scenario_a_single_voxel_source() {
    let mut buf = vec![0.0f64; 8 * 8 * 8];
    buf[4 + 8 * (4 + 8 * 4)] = 100.0;
    let source = MemoryCubeSource::new(buf, 8, 8, 8);
    let ctx = Context::default();
    let params = base_params();
    let mut catalog = RecordingCatalogSink::default();
    let mut masks = RecordingMaskSink::default();

    let output = vf_pipeline::run_pipeline(&ctx, &params, &source, Some(&NoWcs), &[], &mut catalog, &mut masks)
        .expect("single bright voxel over a flat background must be detected");

    assert_eq!(output.table.len(), 1);
    let obj = &output.table[0];
    assert_eq!((obj.x_min, obj.x_max), (4, 4));
    assert_eq!((obj.y_min, obj.y_max), (4, 4));
    assert_eq!((obj.z_min, obj.z_max), (4, 4));
    assert_eq!(obj.n_pix, 1);
    assert!((obj.f_sum - 100.0).abs() < 1e-3);
    assert_eq!(catalog.rows, 1);
    assert!(masks.wrote_mask);
}

#[test]
fn scenario_b_size_filter_yields_no_source() {
    let mut buf = vec![0.0f64; 8 * 8 * 8];
    buf[4 + 8 * (4 + 8 * 4)] = 100.0;
    buf[4 + 8 * (4 + 8 * 5)] = 100.0;
    let source = MemoryCubeSource::new(buf, 8, 8, 8);
    let ctx = Context::default();
    let mut params = base_params();
    params.set("linker.minSizeZ", "3");
    let mut catalog = RecordingCatalogSink::default();
    let mut masks = RecordingMaskSink::default();

    let err = vf_pipeline::run_pipeline(&ctx, &params, &source, Some(&NoWcs), &[], &mut catalog, &mut masks)
        .expect_err("a two-channel-tall object should be discarded by the minSizeZ filter");

    assert!(matches!(err, PipelineError::NoSourceFound));
}

#[test]
fn scenario_c_merging_under_radius_z() {
    let mut buf = vec![0.0f64; 8 * 8 * 8];
    buf[4 + 8 * (4 + 8 * 4)] = 100.0;
    buf[4 + 8 * (4 + 8 * 6)] = 100.0;
    let source = MemoryCubeSource::new(buf, 8, 8, 8);
    let ctx = Context::default();
    let mut params = base_params();
    params.set("linker.radiusZ", "2");
    let mut catalog = RecordingCatalogSink::default();
    let mut masks = RecordingMaskSink::default();

    let output = vf_pipeline::run_pipeline(&ctx, &params, &source, Some(&NoWcs), &[], &mut catalog, &mut masks)
        .expect("voxels two channels apart should merge under radiusZ = 2");

    assert_eq!(output.table.len(), 1);
    let obj = &output.table[0];
    assert_eq!(obj.n_pix, 2);
    assert_eq!((obj.z_min, obj.z_max), (4, 6));
    assert!((obj.f_sum - 200.0).abs() < 1e-3);
}

#[test]
fn scenario_e_reliability_with_keep_negative_is_rejected_before_load() {
    let ctx = Context::default();
    let mut params = base_params();
    params.set("reliability.enable", "true");
    params.set("linker.keepNegative", "true");
    let source = PanicCubeSource;
    let mut catalog = RecordingCatalogSink::default();
    let mut masks = RecordingMaskSink::default();

    let err = vf_pipeline::run_pipeline(&ctx, &params, &source, Some(&NoWcs), &[], &mut catalog, &mut masks)
        .expect_err("reliability.enable with linker.keepNegative must be rejected");

    assert!(matches!(err, PipelineError::ReliabilityWithKeepNegative));
}

#[test]
fn scenario_f_flagging_is_idempotent() {
    let mut cube = DataCube::new_blank(6, 4, 4).unwrap();
    cube.fill(1.0);
    let region = Region::new(2, 3, 0, 3, 0, 3);

    cube.flag_regions(&[region]);
    let first_pass: Vec<f32> = cube.as_slice().to_vec();
    for x in 2..=3 {
        for y in 0..4 {
            for z in 0..4 {
                assert!(!cube.get(x, y, z).is_finite());
            }
        }
    }
    for x in [0, 1, 4, 5] {
        for y in 0..4 {
            for z in 0..4 {
                assert_eq!(cube.get(x, y, z), 1.0);
            }
        }
    }

    cube.flag_regions(&[region]);
    let second_pass: Vec<f32> = cube.as_slice().to_vec();
    assert_eq!(first_pass.len(), second_pass.len());
    for (a, b) in first_pass.iter().zip(second_pass.iter()) {
        assert!((a.is_nan() && b.is_nan()) || a == b);
    }
}

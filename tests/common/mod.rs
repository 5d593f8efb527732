#![allow(dead_code)]

use dbraster::{
    NullObserver, Pipeline, PipelineConfig, PipelineOutput, PipelineParams, Precision, Raster,
    Shape, SourceRaster,
};

pub fn grid(width: usize, height: usize, data: Vec<u16>) -> SourceRaster {
    Raster::from_vec(Shape::new(width, height), data).expect("grid shape")
}

pub fn config(
    width: usize,
    height: usize,
    threshold: f64,
    multiplier: f64,
    precision: Precision,
) -> PipelineConfig {
    PipelineConfig::new(&PipelineParams {
        width,
        height,
        seed: 0,
        log_threshold: threshold,
        log_multiplier: multiplier,
        precision,
    })
    .expect("valid config")
}

pub fn run_f64(source: &SourceRaster, threshold: f64, multiplier: f64) -> PipelineOutput {
    let shape = source.shape();
    Pipeline::new(config(shape.width, shape.height, threshold, multiplier, Precision::F64))
        .run(source, &mut NullObserver)
        .expect("pipeline run")
}

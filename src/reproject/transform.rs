//! Coordinate transform backends
//!
//! Projection math is delegated to a library; this module only adapts
//! coordinate slices to it. Every call builds its own projection context,
//! so transforms share no mutable state.

use super::crs::{self, CrsDefinition};
use super::{ReprojectError, ReprojectResult};
use crate::graph::Coordinate;
use geodesy::prelude::*;

/// Moves coordinates between two spatial references
pub trait CoordinateTransform: std::fmt::Debug + Send + Sync {
    /// Check that `crs` is usable as a source or target
    fn validate(&self, crs: &str) -> ReprojectResult<()>;

    /// Transform `coords` in place from `source` to `target`
    fn transform(&self, source: &str, target: &str, coords: &mut [Coordinate])
        -> ReprojectResult<()>;
}

/// Pure-Rust transform built on the `geodesy` crate.
///
/// Supports the identifiers listed in [`crs::resolve`].
#[derive(Debug, Default, Clone, Copy)]
pub struct GeodesyTransform;

fn projection_error(err: impl std::fmt::Display) -> ReprojectError {
    ReprojectError::Projection(err.to_string())
}

impl CoordinateTransform for GeodesyTransform {
    fn validate(&self, crs: &str) -> ReprojectResult<()> {
        if let CrsDefinition::Projected(definition) = crs::resolve(crs)? {
            let mut ctx = Minimal::new();
            ctx.op(&definition)
                .map_err(|e| ReprojectError::InvalidCrs(format!("{}: {}", crs, e)))?;
        }
        Ok(())
    }

    fn transform(
        &self,
        source: &str,
        target: &str,
        coords: &mut [Coordinate],
    ) -> ReprojectResult<()> {
        let source_def = crs::resolve(source)?;
        let target_def = crs::resolve(target)?;
        let latitude_limit = target_def.latitude_limit();

        let mut ctx = Minimal::new();
        let source_op = match &source_def {
            CrsDefinition::Projected(def) => Some(ctx.op(def).map_err(projection_error)?),
            CrsDefinition::Geographic => None,
        };
        let target_op = match &target_def {
            CrsDefinition::Projected(def) => Some(ctx.op(def).map_err(projection_error)?),
            CrsDefinition::Geographic => None,
        };

        for coord in coords.iter_mut() {
            // geographic radians, longitude first
            let mut data = [match source_op {
                None => Coor2D::raw(coord.x().to_radians(), coord.y().to_radians()),
                Some(_) => Coor2D::raw(coord.x(), coord.y()),
            }];
            if let Some(op) = source_op {
                ctx.apply(op, Inv, &mut data).map_err(projection_error)?;
            }

            if let Some(limit) = latitude_limit {
                let latitude = data[0][1].to_degrees();
                if latitude.abs() > limit {
                    return Err(ReprojectError::Projection(format!(
                        "({}) is outside the domain of {}: |latitude| {} > {}",
                        coord,
                        target,
                        latitude.abs(),
                        limit
                    )));
                }
            }

            let (x, y) = match target_op {
                Some(op) => {
                    ctx.apply(op, Fwd, &mut data).map_err(projection_error)?;
                    (data[0][0], data[0][1])
                }
                None => (data[0][0].to_degrees(), data[0][1].to_degrees()),
            };

            if !x.is_finite() || !y.is_finite() {
                return Err(ReprojectError::Projection(format!(
                    "({}) projects to a non-finite coordinate in {}",
                    coord, target
                )));
            }
            *coord = Coordinate::new(x, y);
        }
        Ok(())
    }
}

/// Transform backed by the PROJ library; accepts any CRS PROJ knows.
#[cfg(feature = "proj")]
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjTransform;

#[cfg(feature = "proj")]
impl CoordinateTransform for ProjTransform {
    fn validate(&self, crs: &str) -> ReprojectResult<()> {
        proj::Proj::new(crs)
            .map(|_| ())
            .map_err(|e| ReprojectError::InvalidCrs(format!("{}: {}", crs, e)))
    }

    fn transform(
        &self,
        source: &str,
        target: &str,
        coords: &mut [Coordinate],
    ) -> ReprojectResult<()> {
        let proj = proj::Proj::new_known_crs(source, target, None).map_err(projection_error)?;
        for coord in coords.iter_mut() {
            let (x, y) = proj
                .convert((coord.x(), coord.y()))
                .map_err(projection_error)?;
            *coord = Coordinate::new(x, y);
        }
        Ok(())
    }
}

/// The transform used when none is chosen explicitly
pub fn default_transform() -> Box<dyn CoordinateTransform> {
    #[cfg(feature = "proj")]
    {
        Box::new(ProjTransform)
    }
    #[cfg(not(feature = "proj"))]
    {
        Box::new(GeodesyTransform)
    }
}

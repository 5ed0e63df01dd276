//! G-code emitter (L5): turns compiled tool paths plus a `JobDescriptor`
//! into a flat, ordered `Vec<String>` of RS-274/NGC lines.

use cm_cam::{compile_operation, split_against_tabs, CamError, CompileConfig};
use cm_core::geometry::{CamPath, IntegerPath, IntegerPoint};

use crate::job::{JobDescriptor, OperationDescriptor, Warning, WarningSink};

/// Emits G-code for a whole job: preamble, one block per operation, and a
/// postamble. Operations are compiled and emitted in list order; a failed
/// operation contributes nothing to the output but does not stop the rest.
pub struct GCodeEmitter<'a> {
    job: &'a JobDescriptor,
}

impl<'a> GCodeEmitter<'a> {
    pub fn new(job: &'a JobDescriptor) -> Self {
        Self { job }
    }

    /// Returns the program lines and any per-operation errors encountered.
    /// The preamble and postamble are always present, even for an empty
    /// operation list or one where every operation failed.
    pub fn emit(
        &self,
        operations: &mut [OperationDescriptor],
        warnings: &mut dyn WarningSink,
    ) -> (Vec<String>, Vec<CamError>) {
        let mut lines = Vec::new();
        let mut errors = Vec::new();

        self.preamble(&mut lines, operations);

        let mut last_point: Option<IntegerPoint> = None;

        for op in operations.iter_mut() {
            op.clamp_cut_depth(warnings);
            self.operation_header(&mut lines, op);

            let config = CompileConfig {
                cutter_diameter: op.cutter_diameter,
                overlap: op.overlap,
                climb: op.climb,
                width: op.width,
            };

            match compile_operation(op.kind, &op.geometry, &config) {
                Ok(paths) => {
                    last_point = self.emit_operation(&mut lines, op, &paths, last_point);
                }
                Err(err) => {
                    warnings.report(Warning::UnsupportedOperation { name: op.name.clone() });
                    errors.push(err);
                }
            }
        }

        self.postamble(&mut lines);
        (lines, errors)
    }

    fn preamble(&self, lines: &mut Vec<String>, operations: &[OperationDescriptor]) {
        lines.push(self.job.gunits.gcode().to_string());
        lines.push("G90".to_string());
        lines.push(self.rapid_z(self.job.safe_z));

        if let Some(bb) = operations
            .iter()
            .filter_map(|op| op.geometry.bounding_box())
            .reduce(|a, b| a.union(&b))
        {
            let (min_x, min_y) = self.to_gcode_xy(IntegerPoint::new(bb.min_x, bb.min_y));
            let (max_x, max_y) = self.to_gcode_xy(IntegerPoint::new(bb.max_x, bb.max_y));
            lines.push(format!(
                "; bounds X[{:.*},{:.*}] Y[{:.*},{:.*}]",
                self.job.decimal,
                min_x.min(max_x),
                self.job.decimal,
                max_x.max(min_x),
                self.job.decimal,
                min_y.min(max_y),
                self.job.decimal,
                max_y.max(min_y),
            ));
        }
        lines.push(format!(
            "; origin offset X{:.*} Y{:.*}",
            self.job.decimal, self.job.offset_x, self.job.decimal, self.job.offset_y
        ));
    }

    fn operation_header(&self, lines: &mut Vec<String>, op: &OperationDescriptor) {
        lines.push(format!(
            "; operation {} kind={:?} climb={} cutDepth={:.*}",
            op.name, op.kind, op.climb, self.job.decimal, op.cut_depth
        ));
    }

    fn postamble(&self, lines: &mut Vec<String>) {
        if self.job.return_to_00 {
            lines.push(format!("G0 X0 Y0 F{}", self.fmt(self.job.rapid_feed)));
        }
        lines.push("M2".to_string());
    }

    fn emit_operation(
        &self,
        lines: &mut Vec<String>,
        op: &OperationDescriptor,
        paths: &[CamPath],
        mut last_point: Option<IntegerPoint>,
    ) -> Option<IntegerPoint> {
        for (i, cam_path) in paths.iter().enumerate() {
            if cam_path.path.is_empty() {
                continue;
            }
            if op.precalculated_z() {
                last_point = self.emit_point_op(lines, op, cam_path);
            } else {
                let next_start = paths.get(i + 1).and_then(|p| p.path.points().first().copied());
                last_point = self.emit_path(lines, op, cam_path, last_point, next_start);
            }
        }
        last_point
    }

    /// Perforate/Drill: rapid to the point at safeZ, plunge straight to
    /// full depth, retract. No pass layering.
    fn emit_point_op(
        &self,
        lines: &mut Vec<String>,
        op: &OperationDescriptor,
        cam_path: &CamPath,
    ) -> Option<IntegerPoint> {
        let p = cam_path.path.points()[0];
        let (x, y) = self.to_gcode_xy(p);
        lines.push(format!(
            "G0 X{} Y{} Z{} F{}",
            self.fmt(x),
            self.fmt(y),
            self.fmt(self.to_gcode_z(self.job.safe_z)),
            self.fmt(self.job.rapid_feed)
        ));
        let bottom = self.job.top_z - op.cut_depth;
        lines.push(format!(
            "G1 Z{} F{}",
            self.fmt(self.to_gcode_z(bottom)),
            self.fmt(self.job.plunge_feed)
        ));
        lines.push(format!(
            "G1 Z{} F{}",
            self.fmt(self.to_gcode_z(self.job.safe_z)),
            self.fmt(self.job.retract_feed)
        ));
        Some(p)
    }

    /// Area-clearing / contouring / engrave path: layered passes, tab
    /// lift-over within each pass, then a closing decision.
    fn emit_path(
        &self,
        lines: &mut Vec<String>,
        op: &OperationDescriptor,
        cam_path: &CamPath,
        last_point: Option<IntegerPoint>,
        next_start: Option<IntegerPoint>,
    ) -> Option<IntegerPoint> {
        let start = cam_path.path.points()[0];
        let threshold = (op.cutter_diameter as f64 / 1000.0).max(1.0);

        let needs_approach = match last_point {
            Some(lp) => lp.distance_to(start) > threshold,
            None => true,
        };
        if needs_approach {
            let (sx, sy) = self.to_gcode_xy(start);
            lines.push(self.rapid_z(self.job.safe_z));
            lines.push(format!(
                "G0 X{} Y{} F{}",
                self.fmt(sx),
                self.fmt(sy),
                self.fmt(self.job.rapid_feed)
            ));
        }

        let traversal = closed_traversal(&cam_path.path);
        let subpaths = split_against_tabs(&traversal, &self.job.tab_geometry);
        let depths = self.pass_depths(op.cut_depth);

        for &z_target in &depths {
            if !op.ramp {
                self.emit_entry(lines, z_target);
            }
            self.emit_subpaths(lines, op, &subpaths, z_target);
        }

        let end = *cam_path.path.points().last().unwrap();
        let stays = cam_path.safe_to_close
            && next_start.is_some_and(|ns| end.distance_to(ns) <= threshold);
        if !stays {
            lines.push(format!(
                "G1 Z{} F{}",
                self.fmt(self.to_gcode_z(self.job.safe_z)),
                self.fmt(self.job.retract_feed)
            ));
        }
        Some(end)
    }

    /// Stationary plunge: descend straight down to `z_target` at the
    /// cutter's current XY (already at `start` from the previous pass, or
    /// from the approach rapid on the first pass).
    fn emit_entry(&self, lines: &mut Vec<String>, z_target: f64) {
        lines.push(format!(
            "G1 Z{} F{}",
            self.fmt(self.to_gcode_z(z_target)),
            self.fmt(self.job.plunge_feed)
        ));
    }

    /// Walks the tab-split sub-paths of one pass. For a ramp entry, the
    /// very first move of the pass is the ramp itself: it carries the Z
    /// descent from wherever the cutter currently sits (safeZ on the first
    /// pass, the previous pass depth afterward) down to `z_target` while
    /// also moving in XY, at plunge feed. Every subsequent move is a flat
    /// cut at `z_target`.
    ///
    /// Crossing a tab lifts the cutter to `tabZ` for the sub-path's
    /// duration rather than cutting through it. That Z change happens as
    /// its own move at the shared endpoint between sub-paths, with no XY
    /// component — §4.4 is explicit that the tab transition itself carries
    /// no XY motion; only once the cutter is at the new Z does it resume
    /// travelling.
    fn emit_subpaths(
        &self,
        lines: &mut Vec<String>,
        op: &OperationDescriptor,
        subpaths: &[IntegerPath],
        z_target: f64,
    ) {
        let mut first_move = op.ramp;
        let mut lifted = false;
        for (idx, sub) in subpaths.iter().enumerate() {
            let pts = sub.points();
            if pts.len() < 2 {
                continue;
            }
            let is_tab = idx % 2 == 1;
            let lift = is_tab && z_target < self.job.tab_z;

            if lift && !lifted {
                lines.push(format!(
                    "G1 Z{} F{}",
                    self.fmt(self.to_gcode_z(self.job.tab_z)),
                    self.fmt(self.job.retract_feed)
                ));
                lifted = true;
            } else if !lift && lifted {
                lines.push(format!(
                    "G1 Z{} F{}",
                    self.fmt(self.to_gcode_z(z_target)),
                    self.fmt(self.job.plunge_feed)
                ));
                lifted = false;
            }

            let z = if lift { self.job.tab_z } else { z_target };
            for p in &pts[1..] {
                let (x, y) = self.to_gcode_xy(*p);
                let feed = if first_move { self.job.plunge_feed } else { self.job.cut_feed };
                lines.push(format!(
                    "G1 X{} Y{} Z{} F{}",
                    self.fmt(x),
                    self.fmt(y),
                    self.fmt(self.to_gcode_z(z)),
                    self.fmt(feed)
                ));
                first_move = false;
            }
        }
    }

    /// Depths from `topZ` down to `topZ - cutDepth` in `ceil(cutDepth /
    /// passDepth)` equal steps. `passDepth == 0` (plotter mode, after
    /// clamping) produces a single pass that never leaves `topZ`.
    fn pass_depths(&self, cut_depth: f64) -> Vec<f64> {
        if self.job.pass_depth <= 0.0 || cut_depth <= 0.0 {
            return vec![self.job.top_z];
        }
        let n = (cut_depth / self.job.pass_depth).ceil().max(1.0) as usize;
        let step = cut_depth / n as f64;
        (1..=n).map(|i| self.job.top_z - step * i as f64).collect()
    }

    fn to_gcode_xy(&self, p: IntegerPoint) -> (f64, f64) {
        let (ux, uy) = p.to_units();
        (ux * self.job.x_scale + self.job.offset_x, uy * self.job.y_scale + self.job.offset_y)
    }

    fn to_gcode_z(&self, z: f64) -> f64 {
        z * self.job.z_scale
    }

    fn rapid_z(&self, z: f64) -> String {
        format!("G0 Z{} F{}", self.fmt(self.to_gcode_z(z)), self.fmt(self.job.rapid_feed))
    }

    fn fmt(&self, v: f64) -> String {
        format!("{:.*}", self.job.decimal, v)
    }
}

/// The explicit closed traversal of a path: its own points plus, if it
/// isn't already explicitly closed, its first point appended at the end.
fn closed_traversal(path: &IntegerPath) -> Vec<IntegerPoint> {
    let mut pts = path.points().to_vec();
    if pts.first() != pts.last() {
        if let Some(&first) = pts.first() {
            pts.push(first);
        }
    }
    pts
}

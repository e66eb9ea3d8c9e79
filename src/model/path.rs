//! The road path: a closed ring of anchors joined by cubic Bezier segments.
//!
//! Each anchor caches the samples of the segment leaving it, so edits only
//! resample the few segments whose control points changed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geom::{CubicBezier3, Point3, Vec3};

/// Selects one of the two Bezier handles of an [`Anchor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TangentHandle {
    /// Handle on the incoming side, toward the previous anchor.
    Start,
    /// Handle on the outgoing side, toward the next anchor.
    End,
}

impl TangentHandle {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }
}

/// A control point of the path.
///
/// Tangents are stored as absolute positions; the zero vector marks a handle
/// that has never been set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchor {
    pub tangent_start: Vec3,
    pub tangent_end: Vec3,
    positions: Vec<Point3>,
}

impl Default for Anchor {
    fn default() -> Self {
        Self::new(Point3::ORIGIN)
    }
}

impl Anchor {
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            tangent_start: Vec3::ZERO,
            tangent_end: Vec3::ZERO,
            positions: vec![position],
        }
    }

    #[must_use]
    pub fn with_tangents(mut self, tangent_start: Vec3, tangent_end: Vec3) -> Self {
        self.tangent_start = tangent_start;
        self.tangent_end = tangent_end;
        self
    }

    /// The authoritative anchor position.
    #[must_use]
    pub fn first_position(&self) -> Point3 {
        self.positions.first().copied().unwrap_or_default()
    }

    fn set_first_position(&mut self, position: Point3) {
        match self.positions.first_mut() {
            Some(first) => *first = position,
            None => self.positions.push(position),
        }
    }

    /// The anchor position followed by the cached samples toward the next anchor.
    #[must_use]
    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    #[must_use]
    pub const fn tangent(&self, handle: TangentHandle) -> Vec3 {
        match handle {
            TangentHandle::Start => self.tangent_start,
            TangentHandle::End => self.tangent_end,
        }
    }

    fn tangent_mut(&mut self, handle: TangentHandle) -> &mut Vec3 {
        match handle {
            TangentHandle::Start => &mut self.tangent_start,
            TangentHandle::End => &mut self.tangent_end,
        }
    }

    #[must_use]
    pub fn is_tangent_set(&self, handle: TangentHandle) -> bool {
        !self.tangent(handle).is_zero()
    }

    /// Handle position used for evaluation; an unset handle sits on the anchor.
    fn control_point(&self, handle: TangentHandle) -> Point3 {
        if self.is_tangent_set(handle) {
            Point3::from(self.tangent(handle))
        } else {
            self.first_position()
        }
    }

    fn truncate_samples(&mut self) {
        let first = self.first_position();
        self.positions.clear();
        self.positions.push(first);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Path {
    /// Samples per unit of approximate segment length.
    quality: f64,
    auto_relocate_tangents: bool,
    anchors: Vec<Anchor>,
}

impl Default for Path {
    fn default() -> Self {
        Self {
            quality: 1.0,
            auto_relocate_tangents: true,
            anchors: Vec::new(),
        }
    }
}

impl Path {
    #[must_use]
    pub fn new(quality: f64, auto_relocate_tangents: bool) -> Self {
        let mut path = Self {
            auto_relocate_tangents,
            ..Self::default()
        };
        path.set_quality(quality);
        path
    }

    /// Builds a path from anchor positions, deriving tangents and samples.
    #[must_use]
    pub fn from_points(quality: f64, points: impl IntoIterator<Item = Point3>) -> Self {
        let mut path = Self::new(quality, true);
        for point in points {
            path.add_anchor(point);
        }
        path
    }

    #[must_use]
    pub const fn quality(&self) -> f64 {
        self.quality
    }

    #[must_use]
    pub const fn auto_relocate_tangents(&self) -> bool {
        self.auto_relocate_tangents
    }

    #[must_use]
    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    #[must_use]
    pub fn anchor(&self, index: usize) -> Option<&Anchor> {
        self.anchors.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn clear(&mut self) {
        self.anchors.clear();
    }

    /// Sets the sampling density and resamples every segment.
    /// Non-finite or non-positive values are ignored.
    pub fn set_quality(&mut self, quality: f64) {
        if !quality.is_finite() || quality <= 0.0 {
            log::debug!("set_quality: ignoring invalid quality {quality}");
            return;
        }
        self.quality = quality;
        self.refresh();
    }

    pub fn set_auto_relocate_tangents(&mut self, enabled: bool) {
        self.auto_relocate_tangents = enabled;
        self.refresh();
    }

    /// Recomputes tangents (when auto-relocation is on) and every segment's samples.
    pub fn refresh(&mut self) {
        if self.auto_relocate_tangents {
            for i in 0..self.anchors.len() {
                self.compute_tangents(i);
            }
        }
        for i in 0..self.anchors.len() {
            self.resample(i);
        }
    }

    /// Appends an anchor at the end of the ring, just before the wrap to the first.
    pub fn add_anchor(&mut self, position: Point3) {
        self.anchors.push(Anchor::new(position));
        let index = self.anchors.len() - 1;
        self.update_tangents_around(index);
        self.resample_around(index);
    }

    /// Inserts an anchor before `index`; `index == len()` appends.
    pub fn insert_anchor(&mut self, index: usize, position: Point3) {
        if index > self.anchors.len() {
            log::debug!("insert_anchor: index {index} out of range");
            return;
        }
        self.anchors.insert(index, Anchor::new(position));
        self.update_tangents_around(index);
        self.resample_around(index);
    }

    pub fn remove_anchor(&mut self, index: usize) {
        if index >= self.anchors.len() {
            log::debug!("remove_anchor: index {index} out of range");
            return;
        }
        self.anchors.remove(index);
        if self.anchors.is_empty() {
            return;
        }
        let index = index % self.anchors.len();
        if self.auto_relocate_tangents {
            self.update_tangents_around(index);
        }
        self.resample_around(index);
    }

    /// Moves an anchor; handles that are set travel with it.
    pub fn move_anchor(&mut self, index: usize, position: Point3) {
        let Some(anchor) = self.anchors.get_mut(index) else {
            log::debug!("move_anchor: index {index} out of range");
            return;
        };
        let delta = position.sub_point(anchor.first_position());
        anchor.set_first_position(position);
        for handle in [TangentHandle::Start, TangentHandle::End] {
            if anchor.is_tangent_set(handle) {
                let tangent = anchor.tangent_mut(handle);
                *tangent = *tangent + delta;
            }
        }

        if self.auto_relocate_tangents {
            self.update_tangents_around(index);
        }
        self.resample_around(index);
    }

    /// Moves one handle by hand. The opposite handle, when set, is mirrored
    /// through the anchor and keeps its length. Ignored while tangents are
    /// auto-relocated, since the next edit would overwrite the result.
    pub fn move_tangent(&mut self, index: usize, handle: TangentHandle, position: Point3) {
        if self.auto_relocate_tangents {
            log::debug!("move_tangent: auto-relocated tangents are read-only");
            return;
        }
        let Some(anchor) = self.anchors.get_mut(index) else {
            log::debug!("move_tangent: index {index} out of range");
            return;
        };

        *anchor.tangent_mut(handle) = position.to_vec3();

        let opposite = handle.opposite();
        if anchor.is_tangent_set(opposite) {
            let origin = anchor.first_position();
            let distance = origin.distance_to(Point3::from(anchor.tangent(opposite)));
            if let Some(direction) = origin.sub_point(position).normalized() {
                *anchor.tangent_mut(opposite) = origin.add_vec(direction * distance).to_vec3();
            }
        }

        self.resample_around(index);
    }

    /// Index of the anchor closest to `point`, if within `max_distance`.
    #[must_use]
    pub fn nearest_anchor(&self, point: Point3, max_distance: f64) -> Option<usize> {
        self.anchors
            .iter()
            .enumerate()
            .map(|(i, anchor)| (i, anchor.first_position().distance_to(point)))
            .filter(|(_, distance)| *distance <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Total number of sampled positions, anchors included.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.anchors.iter().map(|anchor| anchor.positions.len()).sum()
    }

    /// Every sampled position in ring order.
    pub fn samples(&self) -> impl Iterator<Item = Point3> + '_ {
        self.anchors
            .iter()
            .flat_map(|anchor| anchor.positions.iter().copied())
    }

    fn neighbor(&self, index: usize, offset: isize) -> Option<usize> {
        let count = self.anchors.len();
        if count == 0 {
            return None;
        }
        let wrapped = wrap_index(index as isize + offset, count);
        (wrapped != index).then_some(wrapped)
    }

    fn update_tangents_around(&mut self, index: usize) {
        for i in window(index, 1, self.anchors.len()) {
            self.compute_tangents(i);
        }
    }

    fn resample_around(&mut self, index: usize) {
        for i in window(index, 2, self.anchors.len()) {
            self.resample(i);
        }
    }

    fn compute_tangents(&mut self, index: usize) {
        let Some(current) = self.anchors.get(index).map(Anchor::first_position) else {
            return;
        };
        let previous = self
            .neighbor(index, -1)
            .map(|i| self.anchors[i].first_position());
        let next = self
            .neighbor(index, 1)
            .map(|i| self.anchors[i].first_position());

        let mut direction = Vec3::ZERO;
        if let Some(previous) = previous {
            direction = direction + previous.sub_point(current).normalized_or_zero();
        }
        if let Some(next) = next {
            direction = direction - next.sub_point(current).normalized_or_zero();
        }
        let direction = direction.normalized_or_zero();

        let anchor = &mut self.anchors[index];
        if let Some(previous) = previous {
            let reach = previous.distance_to(current) * 0.5;
            anchor.tangent_start = current.add_vec(direction * reach).to_vec3();
        }
        if let Some(next) = next {
            let reach = -next.distance_to(current) * 0.5;
            anchor.tangent_end = current.add_vec(direction * reach).to_vec3();
        }
    }

    fn resample(&mut self, index: usize) {
        if index >= self.anchors.len() {
            return;
        }
        let segment = self.neighbor(index, 1).map(|next| {
            let current = &self.anchors[index];
            let next = &self.anchors[next];
            CubicBezier3::new(
                current.first_position(),
                current.control_point(TangentHandle::End),
                next.control_point(TangentHandle::Start),
                next.first_position(),
            )
        });

        let quality = self.quality;
        let anchor = &mut self.anchors[index];
        anchor.truncate_samples();
        if let Some(segment) = segment {
            anchor.positions.extend(segment.interior_samples(quality));
        }
    }
}

fn wrap_index(index: isize, count: usize) -> usize {
    index.rem_euclid(count as isize) as usize
}

/// Distinct ring indices within `radius` of `index`.
fn window(index: usize, radius: isize, count: usize) -> BTreeSet<usize> {
    if count == 0 {
        return BTreeSet::new();
    }
    (-radius..=radius)
        .map(|offset| wrap_index(index as isize + offset, count))
        .collect()
}

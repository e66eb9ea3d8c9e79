//! Cross-section ("segment") definition: the stair-step modules swept along a
//! road and the fill patterns painted into its decal texture.

use serde::{Deserialize, Serialize};

use super::color::Rgba;
use crate::geom::{MeshError, Vec2, validate_cross_section};

/// Name tags recognised by [`CrossSection::mirror_modules`], pairwise opposite.
const LEFT_TAGS: [&str; 4] = ["0", "a", "left", "l"];
const RIGHT_TAGS: [&str; 4] = ["1", "b", "right", "r"];

/// One step of the cross-section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Module {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub base_color: Rgba,
}

impl Module {
    #[must_use]
    pub fn new(name: impl Into<String>, width: f64, height: f64, base_color: Rgba) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            base_color,
        }
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new("New Module", 1.0, 1.0, Rgba::WHITE)
    }
}

/// Rasterization rule of a [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Axis-aligned rectangles repeated `tiling` times across the texture.
    #[default]
    Fill,
}

/// A region of the decal texture. Size and offset are fractions of the texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pattern {
    pub name: String,
    pub size: Vec2,
    pub tiling: Vec2,
    pub offset: Vec2,
    pub symmetry_x: bool,
    pub symmetry_y: bool,
    pub base_color: Rgba,
    pub kind: PatternKind,
}

impl Pattern {
    #[must_use]
    pub fn fill(name: impl Into<String>, size: Vec2, tiling: Vec2, offset: Vec2, base_color: Rgba) -> Self {
        Self {
            name: name.into(),
            size,
            tiling,
            offset,
            symmetry_x: false,
            symmetry_y: false,
            base_color,
            kind: PatternKind::Fill,
        }
    }

    #[must_use]
    pub fn with_symmetry(mut self, symmetry_x: bool, symmetry_y: bool) -> Self {
        self.symmetry_x = symmetry_x;
        self.symmetry_y = symmetry_y;
        self
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::fill(
            "New Pattern",
            Vec2::new(0.5, 0.5),
            Vec2::ONE,
            Vec2::ZERO,
            Rgba::GRAY,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureResolution {
    pub width: u32,
    pub height: u32,
}

impl TextureResolution {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Default for TextureResolution {
    fn default() -> Self {
        Self::new(1024, 1024)
    }
}

/// The profile swept along a road, plus the patterns of its decal texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossSection {
    /// Travel distance covered by one repeat of the texture.
    pub length: f64,
    pub resolution: TextureResolution,
    pub modules: Vec<Module>,
    pub patterns: Vec<Pattern>,
}

impl Default for CrossSection {
    fn default() -> Self {
        Self {
            length: 8.0,
            resolution: TextureResolution::default(),
            modules: Vec::new(),
            patterns: Vec::new(),
        }
    }
}

impl CrossSection {
    #[must_use]
    pub fn new(length: f64, modules: Vec<Module>) -> Self {
        Self {
            length,
            modules,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_patterns(mut self, resolution: TextureResolution, patterns: Vec<Pattern>) -> Self {
        self.resolution = resolution;
        self.patterns = patterns;
        self
    }

    #[must_use]
    pub fn total_width(&self) -> f64 {
        self.modules.iter().map(|module| module.width).sum()
    }

    /// Checks that the section can be meshed: at least one module, a positive
    /// length, and positive finite widths.
    pub fn validate(&self) -> Result<(), MeshError> {
        validate_cross_section(self)
    }

    pub fn add_module(&mut self) {
        self.modules.push(Module::default());
    }

    pub fn remove_module(&mut self, index: usize) {
        if index < self.modules.len() {
            self.modules.remove(index);
        } else {
            log::debug!("remove_module: index {index} out of range");
        }
    }

    pub fn pop_module(&mut self) {
        self.modules.pop();
    }

    /// Appends a copy of the module at `index`.
    pub fn copy_module(&mut self, index: usize) {
        if let Some(module) = self.modules.get(index).cloned() {
            self.modules.push(module);
        }
    }

    /// Completes a half profile by appending mirrored copies of tagged modules.
    ///
    /// Names are lower-cased and split on `_`; a module whose name carries a
    /// left tag (`_l`, `_left`, `_a`, `_0`) or right tag is copied in reverse
    /// order with the tag swapped. Left-tagged copies are appended first.
    /// Returns the number of modules added.
    pub fn mirror_modules(&mut self) -> usize {
        let left: Vec<Module> = self
            .modules
            .iter()
            .filter(|module| has_tag(&module.name, &LEFT_TAGS))
            .cloned()
            .collect();
        let right: Vec<Module> = self
            .modules
            .iter()
            .filter(|module| has_tag(&module.name, &RIGHT_TAGS))
            .cloned()
            .collect();

        let added = left.len() + right.len();
        for mut module in left.into_iter().rev() {
            module.name = swap_tags(&module.name, &LEFT_TAGS, &RIGHT_TAGS);
            self.modules.push(module);
        }
        for mut module in right.into_iter().rev() {
            module.name = swap_tags(&module.name, &RIGHT_TAGS, &LEFT_TAGS);
            self.modules.push(module);
        }
        added
    }

    pub fn add_pattern(&mut self) {
        self.patterns.push(Pattern::default());
    }

    pub fn remove_pattern(&mut self, index: usize) {
        if index < self.patterns.len() {
            self.patterns.remove(index);
        } else {
            log::debug!("remove_pattern: index {index} out of range");
        }
    }

    pub fn pop_pattern(&mut self) {
        self.patterns.pop();
    }

    /// Appends a copy of the pattern at `index`.
    pub fn copy_pattern(&mut self, index: usize) {
        if let Some(pattern) = self.patterns.get(index).cloned() {
            self.patterns.push(pattern);
        }
    }
}

fn has_tag(name: &str, tags: &[&str]) -> bool {
    name.to_lowercase()
        .split('_')
        .skip(1)
        .any(|part| tags.contains(&part))
}

fn swap_tags(name: &str, from: &[&str], to: &[&str]) -> String {
    let lower = name.to_lowercase();
    let mut parts = lower.split('_');
    let mut swapped = parts.next().unwrap_or_default().to_string();
    for part in parts {
        swapped.push('_');
        match from.iter().position(|tag| *tag == part) {
            Some(i) => swapped.push_str(to[i]),
            None => swapped.push_str(part),
        }
    }
    swapped
}

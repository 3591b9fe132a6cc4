//! Color space identities and instances.
//!
//! A [`ColorSpace`] couples a [`PixelLayout`] with an optional [`Profile`]
//! and the table of composite ops built for it. Instances are created by a
//! [`ColorSpaceFactory`], published by the registry behind an `Arc`, and
//! never mutated afterwards, so they are shared freely across threads.
//!
//! # Identity
//!
//! [`ColorSpaceId`] is the triple `(model, depth, profile)`, written
//! `MODEL/DEPTH[/PROFILE]`:
//!
//! ```rust
//! use tincture_core::ColorSpaceId;
//!
//! let id: ColorSpaceId = "RGBA/U16/Rec.2020".parse().unwrap();
//! assert_eq!(id.model, "RGBA");
//! assert_eq!(id.profile.as_deref(), Some("Rec.2020"));
//! assert_eq!(id.to_string(), "RGBA/U16/Rec.2020");
//! ```

use crate::{
    with_channel_type, AlphaMaskApplicator, ChannelValue, CompositeOp, CompositeParams, Error,
    PixelLayout, Profile, Result,
};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// A `(model, depth)` pair: one node of the conversion graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelDepth {
    /// Model id.
    pub model: String,
    /// Depth id.
    pub depth: String,
}

impl ModelDepth {
    /// Creates a pair.
    pub fn new(model: impl Into<String>, depth: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            depth: depth.into(),
        }
    }
}

impl fmt::Display for ModelDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model, self.depth)
    }
}

/// Stable identity of a color space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorSpaceId {
    /// Model id.
    pub model: String,
    /// Depth id.
    pub depth: String,
    /// Profile name, `None` for the profile-less variant.
    pub profile: Option<String>,
}

impl ColorSpaceId {
    /// Creates an identity.
    pub fn new(model: impl Into<String>, depth: impl Into<String>, profile: Option<&str>) -> Self {
        Self {
            model: model.into(),
            depth: depth.into(),
            profile: profile.map(str::to_owned),
        }
    }

    /// The graph node of this identity.
    pub fn model_depth(&self) -> ModelDepth {
        ModelDepth::new(&self.model, &self.depth)
    }
}

impl fmt::Display for ColorSpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model, self.depth)?;
        if let Some(p) = &self.profile {
            write!(f, "/{p}")?;
        }
        Ok(())
    }
}

impl FromStr for ColorSpaceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, '/');
        let model = parts.next().map(str::trim).unwrap_or_default();
        let depth = parts.next().map(str::trim).unwrap_or_default();
        if model.is_empty() || depth.is_empty() {
            return Err(Error::unknown_color_space(s, "", None));
        }
        let profile = parts.next().map(str::trim).filter(|p| !p.is_empty());
        Ok(Self::new(model, depth, profile))
    }
}

/// Builds color spaces for one `(model, depth)` pair.
pub trait ColorSpaceFactory: Send + Sync {
    /// Model id.
    fn model_id(&self) -> &str;

    /// Depth id.
    fn depth_id(&self) -> &str;

    /// Shared layout of every color space this factory builds.
    fn layout(&self) -> Arc<PixelLayout>;

    /// Profile used when a lookup names none.
    fn default_profile(&self) -> Option<&str> {
        None
    }

    /// Builds the color space for `profile`.
    fn create(&self, profile: Option<Arc<Profile>>) -> ColorSpace;

    /// The graph node this factory populates.
    fn model_depth(&self) -> ModelDepth {
        ModelDepth::new(self.model_id(), self.depth_id())
    }
}

/// An immutable color space instance.
pub struct ColorSpace {
    id: ColorSpaceId,
    layout: Arc<PixelLayout>,
    profile: Option<Arc<Profile>>,
    ops: BTreeMap<String, Arc<dyn CompositeOp>>,
    mask_applicator: Option<Arc<dyn AlphaMaskApplicator>>,
}

impl ColorSpace {
    /// Assembles a color space. The op table is frozen here.
    pub fn new(
        model: &str,
        depth: &str,
        layout: Arc<PixelLayout>,
        profile: Option<Arc<Profile>>,
        ops: impl IntoIterator<Item = Arc<dyn CompositeOp>>,
        mask_applicator: Option<Arc<dyn AlphaMaskApplicator>>,
    ) -> Self {
        let id = ColorSpaceId::new(model, depth, profile.as_deref().map(Profile::name));
        let ops: BTreeMap<_, _> = ops.into_iter().map(|op| (op.id().to_owned(), op)).collect();
        debug!(color_space = %id, layout = %layout, ops = ops.len(), "color space constructed");
        Self {
            id,
            layout,
            profile,
            ops,
            mask_applicator,
        }
    }

    /// Adds ops, replacing any with the same id. Only valid before the
    /// space is shared.
    pub fn with_composite_ops(mut self, ops: impl IntoIterator<Item = Arc<dyn CompositeOp>>) -> Self {
        for op in ops {
            self.ops.insert(op.id().to_owned(), op);
        }
        self
    }

    /// Identity triple.
    #[inline]
    pub fn id(&self) -> &ColorSpaceId {
        &self.id
    }

    /// Model id.
    #[inline]
    pub fn model_id(&self) -> &str {
        &self.id.model
    }

    /// Depth id.
    #[inline]
    pub fn depth_id(&self) -> &str {
        &self.id.depth
    }

    /// Graph node.
    #[inline]
    pub fn model_depth(&self) -> ModelDepth {
        self.id.model_depth()
    }

    /// Attached profile.
    #[inline]
    pub fn profile(&self) -> Option<&Arc<Profile>> {
        self.profile.as_ref()
    }

    /// Attached profile name.
    #[inline]
    pub fn profile_name(&self) -> Option<&str> {
        self.id.profile.as_deref()
    }

    /// Pixel layout.
    #[inline]
    pub fn layout(&self) -> &Arc<PixelLayout> {
        &self.layout
    }

    /// Bytes per pixel.
    #[inline]
    pub fn pixel_size(&self) -> usize {
        self.layout.pixel_size()
    }

    /// Channel count.
    #[inline]
    pub fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    /// Whether pixels carry alpha.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.layout.has_alpha()
    }

    /// Whether channels may hold values outside `[0, 1]`.
    pub fn has_high_dynamic_range(&self) -> bool {
        self.layout.channels().iter().all(|c| c.format.is_float())
    }

    /// The composite op registered for `id`.
    pub fn composite_op(&self, id: &str) -> Result<Arc<dyn CompositeOp>> {
        self.ops
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unsupported_blend_mode(id, &self.id))
    }

    /// Whether an op is registered for `id`.
    pub fn has_composite_op(&self, id: &str) -> bool {
        self.ops.contains_key(id)
    }

    /// Registered op ids, sorted.
    pub fn composite_op_ids(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    /// Looks up `op_id` and composites with it.
    pub fn composite(&self, op_id: &str, params: CompositeParams<'_>) -> Result<()> {
        self.composite_op(op_id)?.composite(params);
        Ok(())
    }

    /// Alpha mask applier, if the layout has alpha.
    pub fn mask_applicator(&self) -> Option<&Arc<dyn AlphaMaskApplicator>> {
        self.mask_applicator.as_ref()
    }

    /// Normalized alpha of one pixel (1.0 without alpha).
    pub fn opacity(&self, pixel: &[u8]) -> f32 {
        match self.layout.alpha_index() {
            Some(a) => self.read_channel(pixel, a),
            None => 1.0,
        }
    }

    /// Sets the alpha of one pixel from a normalized value.
    pub fn set_opacity(&self, pixel: &mut [u8], opacity: f32) {
        if let Some(a) = self.layout.alpha_index() {
            self.write_channel(pixel, a, opacity);
        }
    }

    /// Every channel of one pixel, normalized.
    pub fn to_normalized(&self, pixel: &[u8]) -> Vec<f32> {
        (0..self.channel_count())
            .map(|i| self.read_channel(pixel, i))
            .collect()
    }

    /// Writes one pixel from normalized channel values.
    pub fn from_normalized(&self, values: &[f32], pixel: &mut [u8]) {
        for (i, v) in values.iter().take(self.channel_count()).enumerate() {
            self.write_channel(pixel, i, *v);
        }
    }

    fn read_channel(&self, pixel: &[u8], i: usize) -> f32 {
        let c = self.layout.channel(i);
        with_channel_type!(c.format, T => T::read(&pixel[c.offset..]).to_f32())
    }

    fn write_channel(&self, pixel: &mut [u8], i: usize, v: f32) {
        let c = self.layout.channel(i);
        with_channel_type!(c.format, T => T::from_f32(v).write(&mut pixel[c.offset..]))
    }
}

impl PartialEq for ColorSpace {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ColorSpace {}

impl Hash for ColorSpace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorSpace")
            .field("id", &self.id)
            .field("layout", &self.layout.to_string())
            .field("ops", &self.ops.len())
            .finish()
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

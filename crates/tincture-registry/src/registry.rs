//! The process-wide color space catalog.
//!
//! The registry owns color space factories, published color spaces,
//! profiles, conversion factories and extension composite ops. It is
//! append-only: lookups take a read lock, registrations a write lock, and
//! every published entry is a fully built immutable value behind an `Arc`.
//!
//! Color spaces are created lazily on first lookup. Construction runs
//! outside the lock; when two threads race, the first insert wins and the
//! other instance is dropped unpublished, so each identity has exactly one
//! live instance.

use crate::builtin::{ModelSpaceFactory, BUILTIN_DEPTHS};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tincture_convert::{
    builtin_model_factories, same_slot, ColorSpaceProvider, ColorTransformation,
    ConversionFactory, ConversionPath, DepthScalingFactory, PathResolver,
};
use tincture_core::{
    builtin_profiles, model::BUILTIN_MODELS, ColorSpace, ColorSpaceFactory, ColorSpaceId,
    CompositeOp, DataFormat, Error, ModelDepth, Profile, Result,
};
use tracing::{debug, error, info};

#[derive(Default)]
struct Catalog {
    factories: BTreeMap<ModelDepth, Arc<dyn ColorSpaceFactory>>,
    spaces: HashMap<ColorSpaceId, Arc<ColorSpace>>,
    profiles: BTreeMap<String, Arc<Profile>>,
    conversions: Vec<Arc<dyn ConversionFactory>>,
    ops: HashMap<ColorSpaceId, BTreeMap<String, Arc<dyn CompositeOp>>>,
}

impl Catalog {
    /// Factory for `(model, depth)`, accepting depth aliases such as `8-bit`.
    fn factory(&self, model: &str, depth: &str) -> Option<&Arc<dyn ColorSpaceFactory>> {
        self.factories.get(&ModelDepth::new(model, depth)).or_else(|| {
            let canonical = DataFormat::from_depth_id(depth)?.depth_id();
            self.factories.get(&ModelDepth::new(model, canonical))
        })
    }

    fn extension_ops(&self, id: &ColorSpaceId) -> Vec<Arc<dyn CompositeOp>> {
        self.ops
            .get(id)
            .map(|ops| ops.values().cloned().collect())
            .unwrap_or_default()
    }
}

/// Catalog of color spaces, conversions and composite ops.
///
/// # Example
///
/// ```rust
/// use tincture_registry::Registry;
///
/// let registry = Registry::global();
/// let a = registry.lookup("RGBA", "U8", None).unwrap();
/// let b = registry.lookup("RGBA", "U16", None).unwrap();
///
/// let mut out = [0u8; 8];
/// registry.convert(&a, &b, &[255, 128, 64, 255], &mut out, 1).unwrap();
/// assert_eq!(u16::from_ne_bytes([out[2], out[3]]), 32896);
/// ```
#[derive(Default)]
pub struct Registry {
    catalog: RwLock<Catalog>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in catalog.
    pub fn with_builtins() -> Result<Self> {
        let registry = Self::new();
        registry.register_builtins()?;
        Ok(registry)
    }

    /// The process-wide registry, populated with built-ins on first access.
    pub fn global() -> &'static Registry {
        static INSTANCE: OnceLock<Registry> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let registry = Registry::new();
            if let Err(e) = registry.register_builtins() {
                error!(error = %e, "built-in registration failed");
            }
            registry
        })
    }

    /// Registers built-in profiles, models at every built-in depth, and the
    /// model conversion factories.
    pub fn register_builtins(&self) -> Result<()> {
        for profile in builtin_profiles() {
            self.register_profile(profile)?;
        }
        for model in BUILTIN_MODELS {
            for format in BUILTIN_DEPTHS {
                self.register_color_space_factory(Arc::new(ModelSpaceFactory::new(model, format)?))?;
            }
        }
        for factory in builtin_model_factories() {
            self.register_conversion_factory(Arc::new(factory))?;
        }
        let cat = self.read();
        info!(
            color_space_factories = cat.factories.len(),
            conversions = cat.conversions.len(),
            profiles = cat.profiles.len(),
            "built-in catalog registered"
        );
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a profile under its name.
    pub fn register_profile(&self, profile: Profile) -> Result<Arc<Profile>> {
        let mut cat = self.write();
        if cat.profiles.contains_key(profile.name()) {
            return Err(Error::conflict(format!("profile '{}' already registered", profile.name())));
        }
        let profile = Arc::new(profile);
        cat.profiles.insert(profile.name().to_owned(), profile.clone());
        debug!(profile = %profile, "profile registered");
        Ok(profile)
    }

    /// Registers a color space factory and links it by depth scaling to
    /// every other depth of the same model.
    pub fn register_color_space_factory(&self, factory: Arc<dyn ColorSpaceFactory>) -> Result<()> {
        let node = factory.model_depth();
        let mut cat = self.write();
        if cat.factories.contains_key(&node) {
            return Err(Error::conflict(format!("color space factory for {node} already registered")));
        }

        let mut links = Vec::new();
        if let Some(format) = depth_format(factory.as_ref()) {
            for other in cat.factories.values().filter(|f| f.model_id() == node.model) {
                let Some(other_format) = depth_format(other.as_ref()) else {
                    continue;
                };
                for link in DepthScalingFactory::pair(&node.model, format, other_format) {
                    if !cat.conversions.iter().any(|c| same_slot(c.as_ref(), &link)) {
                        links.push(Arc::new(link) as Arc<dyn ConversionFactory>);
                    }
                }
            }
        }

        debug!(color_space = %node, depth_links = links.len(), "color space factory registered");
        cat.conversions.extend(links);
        cat.factories.insert(node, factory);
        Ok(())
    }

    /// Publishes a prebuilt color space under its identity.
    pub fn register_color_space(&self, space: ColorSpace) -> Result<Arc<ColorSpace>> {
        let mut cat = self.write();
        if cat.spaces.contains_key(space.id()) {
            return Err(Error::conflict(format!("color space {} already registered", space.id())));
        }
        let space = Arc::new(space);
        cat.spaces.insert(space.id().clone(), space.clone());
        debug!(color_space = %space, "color space registered");
        Ok(space)
    }

    /// Registers a conversion factory as a graph edge.
    pub fn register_conversion_factory(&self, factory: Arc<dyn ConversionFactory>) -> Result<()> {
        let mut cat = self.write();
        if let Some(existing) = cat.conversions.iter().find(|c| same_slot(c.as_ref(), factory.as_ref())) {
            return Err(Error::conflict(format!(
                "conversion {} already provided by {existing:?}",
                factory.name()
            )));
        }
        debug!(
            conversion = %factory.name(),
            fidelity = %factory.fidelity(),
            "conversion factory registered"
        );
        cat.conversions.push(factory);
        Ok(())
    }

    /// Registers an extension composite op for one color space identity.
    ///
    /// The op takes precedence over a built-in op with the same id, both in
    /// [`composite_op`](Self::composite_op) and in the table of color spaces
    /// constructed afterwards.
    pub fn register_composite_op(&self, space: &ColorSpaceId, op: Arc<dyn CompositeOp>) -> Result<()> {
        let mut cat = self.write();
        let table = cat.ops.entry(space.clone()).or_default();
        if table.contains_key(op.id()) {
            return Err(Error::conflict(format!(
                "composite op '{}' already registered for {space}",
                op.id()
            )));
        }
        debug!(color_space = %space, op = op.id(), "composite op registered");
        table.insert(op.id().to_owned(), op);
        Ok(())
    }

    /// The color space for `(model, depth, profile)`.
    ///
    /// A missing profile selects the model's default. Depth ids also accept
    /// the aliases of [`DataFormat::from_depth_id`].
    pub fn lookup(&self, model: &str, depth: &str, profile: Option<&str>) -> Result<Arc<ColorSpace>> {
        let (factory, id, profile_arc, extra) = {
            let cat = self.read();
            let Some(factory) = cat.factory(model, depth).cloned() else {
                let id = ColorSpaceId::new(model, depth, profile);
                return cat
                    .spaces
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| Error::unknown_color_space(model, depth, profile));
            };

            let profile_name = profile.or(factory.default_profile());
            let id = ColorSpaceId::new(factory.model_id(), factory.depth_id(), profile_name);
            if let Some(space) = cat.spaces.get(&id) {
                return Ok(space.clone());
            }

            let profile_arc = match profile_name {
                Some(name) => {
                    let p = cat
                        .profiles
                        .get(name)
                        .cloned()
                        .ok_or_else(|| Error::UnknownProfile(name.to_owned()))?;
                    if !p.applies_to(factory.model_id()) {
                        return Err(Error::unknown_color_space(model, depth, Some(name)));
                    }
                    Some(p)
                }
                None => None,
            };
            let extra = cat.extension_ops(&id);
            (factory, id, profile_arc, extra)
        };

        let built = Arc::new(factory.create(profile_arc).with_composite_ops(extra));
        let mut cat = self.write();
        let space = cat.spaces.entry(id).or_insert(built).clone();
        Ok(space)
    }

    /// The color space for a parsed identity.
    pub fn lookup_id(&self, id: &ColorSpaceId) -> Result<Arc<ColorSpace>> {
        self.lookup(&id.model, &id.depth, id.profile.as_deref())
    }

    /// The op for `mode` on `space`: an extension registration if any, else
    /// the color space's own table.
    pub fn composite_op(&self, space: &ColorSpace, mode: &str) -> Result<Arc<dyn CompositeOp>> {
        let extension = self
            .read()
            .ops
            .get(space.id())
            .and_then(|ops| ops.get(mode))
            .cloned();
        match extension {
            Some(op) => Ok(op),
            None => space.composite_op(mode),
        }
    }

    /// Resolves the conversion path from `src` to `dst`.
    pub fn resolve(&self, src: &Arc<ColorSpace>, dst: &Arc<ColorSpace>) -> Result<ConversionPath> {
        let factories = self.read().conversions.clone();
        PathResolver::new(&factories).resolve(src, dst, self)
    }

    /// Converts `pixel_count` packed pixels from `src` to `dst`.
    ///
    /// # Panics
    ///
    /// If either buffer is shorter than `pixel_count` pixels of its layout.
    pub fn convert(
        &self,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
        src_pixels: &[u8],
        dst_pixels: &mut [u8],
        pixel_count: usize,
    ) -> Result<()> {
        self.resolve(src, dst)?
            .transform(src_pixels, dst_pixels, pixel_count);
        Ok(())
    }

    /// Identities of every published color space, sorted.
    pub fn color_spaces(&self) -> Vec<ColorSpaceId> {
        let mut ids: Vec<_> = self.read().spaces.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Every `(model, depth)` with a color space factory, sorted.
    pub fn nodes(&self) -> Vec<ModelDepth> {
        self.read().factories.keys().cloned().collect()
    }

    /// Model ids, sorted.
    pub fn models(&self) -> Vec<String> {
        let cat = self.read();
        let models: BTreeSet<_> = cat
            .factories
            .keys()
            .map(|n| n.model.clone())
            .chain(cat.spaces.keys().map(|id| id.model.clone()))
            .collect();
        models.into_iter().collect()
    }

    /// Depth ids registered for `model`, sorted.
    pub fn depths(&self, model: &str) -> Vec<String> {
        self.read()
            .factories
            .keys()
            .filter(|n| n.model == model)
            .map(|n| n.depth.clone())
            .collect()
    }

    /// Registered profiles, by name.
    pub fn profiles(&self) -> Vec<Arc<Profile>> {
        self.read().profiles.values().cloned().collect()
    }

    /// Registered conversion factories, in registration order.
    pub fn conversion_factories(&self) -> Vec<Arc<dyn ConversionFactory>> {
        self.read().conversions.clone()
    }
}

impl ColorSpaceProvider for Registry {
    fn color_space_at(&self, node: &ModelDepth, profile: Option<&str>) -> Result<Arc<ColorSpace>> {
        self.lookup(&node.model, &node.depth, profile)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cat = self.read();
        f.debug_struct("Registry")
            .field("factories", &cat.factories.len())
            .field("spaces", &cat.spaces.len())
            .field("profiles", &cat.profiles.len())
            .field("conversions", &cat.conversions.len())
            .finish()
    }
}

/// The channel kind behind a factory's depth id, when its layout is uniform
/// in that kind.
fn depth_format(factory: &dyn ColorSpaceFactory) -> Option<DataFormat> {
    let format = DataFormat::from_depth_id(factory.depth_id())?;
    (format.depth_id() == factory.depth_id() && factory.layout().uniform_format() == Some(format))
        .then_some(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use tincture_core::{model, ChannelValue, CompositeParams};

    #[derive(Debug)]
    struct Dissolve;

    impl CompositeOp for Dissolve {
        fn id(&self) -> &str {
            "dissolve"
        }

        fn composite(&self, _params: CompositeParams<'_>) {}
    }

    #[test]
    fn lookup_is_identity_stable() {
        let registry = Registry::with_builtins().unwrap();
        let a = registry.lookup("RGBA", "U8", None).unwrap();
        let b = registry.lookup("RGBA", "U8", Some("sRGB")).unwrap();
        let c = registry.lookup("RGBA", "8-bit", None).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(a.id().to_string(), "RGBA/U8/sRGB");
        assert_eq!(a.pixel_size(), 4);
        assert!(a.has_composite_op("over"));
        assert!(a.mask_applicator().is_some());

        let gray = registry.lookup("GRAY", "F16", None).unwrap();
        assert_eq!(gray.profile_name(), None);
        assert!(gray.mask_applicator().is_none());
    }

    #[test]
    fn lookup_misses() {
        let registry = Registry::with_builtins().unwrap();
        let err = registry.lookup("LAB", "U8", None).unwrap_err();
        assert!(err.is_lookup_miss());
        let err = registry.lookup("RGBA", "U12", None).unwrap_err();
        assert!(matches!(err, Error::UnknownColorSpace { .. }));
        let err = registry.lookup("RGBA", "U8", Some("Nonexistent")).unwrap_err();
        assert_eq!(err, Error::UnknownProfile("Nonexistent".into()));
        let err = registry.lookup("CMYKA", "U8", Some("sRGB")).unwrap_err();
        assert!(matches!(err, Error::UnknownColorSpace { .. }));
    }

    #[test]
    fn concurrent_lookups_share_one_instance() {
        let registry = Registry::with_builtins().unwrap();
        let spaces: Vec<_> = (0..64)
            .into_par_iter()
            .map(|i| {
                let profile = ["sRGB", "Rec.2020"][i % 2];
                registry.lookup("RGBA", "F32", Some(profile)).unwrap()
            })
            .collect();
        for pair in spaces.chunks_exact(2).collect::<Vec<_>>().windows(2) {
            assert!(Arc::ptr_eq(&pair[0][0], &pair[1][0]));
            assert!(Arc::ptr_eq(&pair[0][1], &pair[1][1]));
        }
        assert_eq!(registry.color_spaces().len(), 2);
    }

    #[test]
    fn registration_conflicts() {
        let registry = Registry::with_builtins().unwrap();
        let dup = Arc::new(ModelSpaceFactory::new(model::RGBA, DataFormat::U8).unwrap());
        assert!(registry.register_color_space_factory(dup).unwrap_err().is_registration_error());

        let widen = DepthScalingFactory::new("RGBA", DataFormat::U8, DataFormat::U16);
        assert!(registry
            .register_conversion_factory(Arc::new(widen))
            .unwrap_err()
            .is_registration_error());

        let profile = tincture_core::Profile::named("sRGB");
        assert!(registry.register_profile(profile).unwrap_err().is_registration_error());

        let id = ColorSpaceId::new("RGBA", "U8", Some("sRGB"));
        registry.register_composite_op(&id, Arc::new(Dissolve)).unwrap();
        assert!(registry
            .register_composite_op(&id, Arc::new(Dissolve))
            .unwrap_err()
            .is_registration_error());
    }

    #[test]
    fn depth_links_follow_factories() {
        let registry = Registry::new();
        for format in [DataFormat::U8, DataFormat::U16] {
            let f = ModelSpaceFactory::new(model::GRAYA, format).unwrap();
            registry.register_color_space_factory(Arc::new(f)).unwrap();
        }
        assert_eq!(registry.conversion_factories().len(), 2);

        let f = ModelSpaceFactory::new(model::GRAYA, DataFormat::F32).unwrap();
        registry.register_color_space_factory(Arc::new(f)).unwrap();
        assert_eq!(registry.conversion_factories().len(), 6);

        let a = registry.lookup("GRAYA", "U16", None).unwrap();
        let b = registry.lookup("GRAYA", "F32", None).unwrap();
        assert!(registry.resolve(&a, &b).unwrap().is_lossless());
    }

    #[test]
    fn extension_ops() {
        let registry = Registry::with_builtins().unwrap();
        let early = registry.lookup("GRAYA", "U16", None).unwrap();
        registry
            .register_composite_op(early.id(), Arc::new(Dissolve))
            .unwrap();
        assert!(!early.has_composite_op("dissolve"));
        assert_eq!(registry.composite_op(&early, "dissolve").unwrap().id(), "dissolve");

        let id = ColorSpaceId::new("GRAYA", "U8", None);
        registry.register_composite_op(&id, Arc::new(Dissolve)).unwrap();
        let late = registry.lookup_id(&id).unwrap();
        assert!(late.has_composite_op("dissolve"));

        let err = registry.composite_op(&late, "nonsense").unwrap_err();
        assert!(matches!(err, Error::UnsupportedBlendMode { .. }));
    }

    #[test]
    fn prebuilt_space_registration() {
        let registry = Registry::with_builtins().unwrap();
        let layout = Arc::new(model::XYZA.layout(DataFormat::F64).unwrap());
        let space = ColorSpace::new("LAB", "F64", layout, None, Vec::new(), None);
        registry.register_color_space(space).unwrap();
        assert_eq!(registry.lookup("LAB", "F64", None).unwrap().channel_count(), 4);
        assert!(registry.models().contains(&"LAB".to_owned()));
    }

    #[test]
    fn converts_scenario_pixel() {
        let registry = Registry::with_builtins().unwrap();
        let a = registry.lookup("RGBA", "U8", None).unwrap();
        let b = registry.lookup("RGBA", "U16", None).unwrap();

        let mut wide = [0u8; 8];
        registry.convert(&a, &b, &[255, 128, 64, 255], &mut wide, 1).unwrap();
        let v: Vec<u16> = wide.chunks_exact(2).map(u16::read).collect();
        assert_eq!(v, [65535, 32896, 16320, 65535]);

        let mut back = [0u8; 4];
        registry.convert(&b, &a, &wide, &mut back, 1).unwrap();
        assert_eq!(back, [255, 128, 64, 255]);
    }

    #[test]
    fn cross_model_conversion() {
        let registry = Registry::with_builtins().unwrap();
        let gray = registry.lookup("GRAY", "U8", None).unwrap();
        let cmyk = registry.lookup("CMYKA", "F16", None).unwrap();
        let path = registry.resolve(&gray, &cmyk).unwrap();
        assert!(path.hops() >= 3);

        let mut out = vec![0u8; cmyk.pixel_size()];
        path.transform(&[0], &mut out, 1);
        let k = tincture_core::f16::read(&out[6..]).to_f32();
        assert_eq!(k, 1.0);
        assert_eq!(cmyk.opacity(&out), 1.0);
    }

    #[test]
    fn enumeration() {
        let registry = Registry::with_builtins().unwrap();
        assert_eq!(registry.models(), ["CMYKA", "GRAY", "GRAYA", "RGBA", "XYZA"]);
        assert_eq!(registry.depths("RGBA"), ["F16", "F32", "U16", "U8"]);
        assert_eq!(registry.nodes().len(), 20);
        assert_eq!(registry.profiles().len(), 5);
        assert_eq!(registry.conversion_factories().len(), 5 * 12 + 12);
        assert!(registry.color_spaces().is_empty());
    }

    #[test]
    fn global_is_populated() {
        let registry = Registry::global();
        assert!(std::ptr::eq(registry, Registry::global()));
        assert!(registry.lookup("XYZA", "F32", None).is_ok());
    }
}

//! Caller-owned conversion path cache.
//!
//! ```rust
//! use tincture_registry::{ConversionCache, Registry};
//!
//! let registry = Registry::global();
//! let a = registry.lookup("RGBA", "U8", None).unwrap();
//! let b = registry.lookup("GRAYA", "F32", None).unwrap();
//!
//! let cache = ConversionCache::new();
//! let first = cache.get_or_resolve(registry, &a, &b).unwrap();
//! let again = cache.get_or_resolve(registry, &a, &b).unwrap();
//! assert!(std::sync::Arc::ptr_eq(&first, &again));
//! ```

use crate::Registry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tincture_convert::ConversionPath;
use tincture_core::{ColorSpace, ColorSpaceId, Result};

/// Resolved paths keyed by `(source, destination)` identity.
#[derive(Debug, Default)]
pub struct ConversionCache {
    paths: RwLock<HashMap<(ColorSpaceId, ColorSpaceId), Arc<ConversionPath>>>,
}

impl ConversionCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached path, if any.
    pub fn get(&self, src: &ColorSpace, dst: &ColorSpace) -> Option<Arc<ConversionPath>> {
        self.paths
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(src.id().clone(), dst.id().clone()))
            .cloned()
    }

    /// The cached path, resolving and caching it on a miss.
    ///
    /// Resolution failures are not cached.
    pub fn get_or_resolve(
        &self,
        registry: &Registry,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
    ) -> Result<Arc<ConversionPath>> {
        if let Some(path) = self.get(src, dst) {
            return Ok(path);
        }
        let path = Arc::new(registry.resolve(src, dst)?);
        let mut paths = self.paths.write().unwrap_or_else(PoisonError::into_inner);
        Ok(paths
            .entry((src.id().clone(), dst.id().clone()))
            .or_insert(path)
            .clone())
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.paths.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Number of cached paths.
    pub fn len(&self) -> usize {
        self.paths.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn hit_and_clear() {
        let registry = Registry::with_builtins().unwrap();
        let a = registry.lookup("RGBA", "U8", None).unwrap();
        let b = registry.lookup("CMYKA", "U16", None).unwrap();
        let c = registry.lookup("XYZA", "F32", None).unwrap();

        let cache = ConversionCache::new();
        assert!(cache.is_empty());
        cache.get_or_resolve(&registry, &a, &b).unwrap();
        cache.get_or_resolve(&registry, &a, &b).unwrap();
        assert_eq!(cache.len(), 1);
        cache.get_or_resolve(&registry, &b, &c).unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&a, &c).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_fill_keeps_one_entry() {
        let registry = Registry::with_builtins().unwrap();
        let a = registry.lookup("GRAY", "U8", None).unwrap();
        let b = registry.lookup("RGBA", "F16", None).unwrap();
        let cache = ConversionCache::new();

        let paths: Vec<_> = (0..32)
            .into_par_iter()
            .map(|_| cache.get_or_resolve(&registry, &a, &b).unwrap())
            .collect();
        assert_eq!(cache.len(), 1);
        let kept = cache.get(&a, &b).unwrap();
        assert!(paths.iter().all(|p| p.hops() == kept.hops()));
    }
}

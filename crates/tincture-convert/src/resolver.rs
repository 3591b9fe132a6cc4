//! Conversion path resolution.
//!
//! Nodes are `(model, depth)` pairs, edges are factories. Each edge costs
//! one hop plus one count in its [`Fidelity`] class; costs add up and
//! compare lexicographically as `(lossy, partial, hops)`, so a path with
//! fewer lossy edges always wins, then fewer partial ones, then fewer hops.
//! Dijkstra over that ordering finds the best route.

use crate::{ColorTransformation, ConversionFactory, ConversionPath, Fidelity};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::fmt;
use std::sync::Arc;
use tincture_core::{ColorSpace, Error, ModelDepth, Result};
use tracing::debug;

/// Accumulated cost of a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathCost {
    /// Edges conserving neither color information nor dynamic range.
    pub lossy: u32,
    /// Edges conserving exactly one of the two.
    pub partial: u32,
    /// Total edges.
    pub hops: u32,
}

impl PathCost {
    /// Cost of the empty route.
    pub const ZERO: Self = Self {
        lossy: 0,
        partial: 0,
        hops: 0,
    };

    /// Cost of one edge.
    pub fn edge(fidelity: Fidelity) -> Self {
        Self {
            lossy: (fidelity == Fidelity::Lossy) as u32,
            partial: (fidelity == Fidelity::Partial) as u32,
            hops: 1,
        }
    }

    /// This cost followed by `next`.
    pub fn then(self, next: Self) -> Self {
        Self {
            lossy: self.lossy + next.lossy,
            partial: self.partial + next.partial,
            hops: self.hops + next.hops,
        }
    }

    /// Fidelity of the worst edge.
    pub fn fidelity(&self) -> Fidelity {
        if self.lossy > 0 {
            Fidelity::Lossy
        } else if self.partial > 0 {
            Fidelity::Partial
        } else {
            Fidelity::Lossless
        }
    }

    /// Whether every edge is lossless.
    pub fn is_lossless(&self) -> bool {
        self.fidelity() == Fidelity::Lossless
    }
}

impl fmt::Display for PathCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hop(s), {} lossy, {} partial",
            self.hops, self.lossy, self.partial
        )
    }
}

/// Supplies the color spaces at intermediate nodes of a route.
pub trait ColorSpaceProvider {
    /// The color space for `node`, with `profile` or the model default.
    fn color_space_at(&self, node: &ModelDepth, profile: Option<&str>) -> Result<Arc<ColorSpace>>;
}

impl<F> ColorSpaceProvider for F
where
    F: Fn(&ModelDepth, Option<&str>) -> Result<Arc<ColorSpace>>,
{
    fn color_space_at(&self, node: &ModelDepth, profile: Option<&str>) -> Result<Arc<ColorSpace>> {
        self(node, profile)
    }
}

/// A route through the factory graph.
#[derive(Debug, Clone)]
pub struct Route {
    /// Edges in order.
    pub factories: Vec<Arc<dyn ConversionFactory>>,
    /// Accumulated cost.
    pub cost: PathCost,
}

/// Shortest-path search over a set of factories.
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    factories: &'a [Arc<dyn ConversionFactory>],
}

impl<'a> PathResolver<'a> {
    /// Resolver over `factories`, earlier ones preferred on equal cost.
    pub fn new(factories: &'a [Arc<dyn ConversionFactory>]) -> Self {
        Self { factories }
    }

    /// Every node some factory touches.
    pub fn nodes(&self) -> BTreeSet<ModelDepth> {
        self.factories
            .iter()
            .flat_map(|f| [f.source().clone(), f.destination().clone()])
            .collect()
    }

    /// Best route from `src` to `dst`, `None` if unreachable.
    ///
    /// Profile-pinned factories are only used at the route's ends, where the
    /// concrete color space is known.
    pub fn route(&self, src: &ColorSpace, dst: &ColorSpace) -> Option<Route> {
        let start = src.model_depth();
        let goal = dst.model_depth();

        let mut edges: Vec<&Arc<dyn ConversionFactory>> = self
            .factories
            .iter()
            .filter(|f| f.source() != f.destination() && usable(f, src, dst))
            .collect();
        edges.sort_by_key(|f| !f.is_profile_specific());

        let mut best: HashMap<ModelDepth, PathCost> = HashMap::from([(start.clone(), PathCost::ZERO)]);
        let mut via: HashMap<ModelDepth, usize> = HashMap::new();
        let mut queue = BinaryHeap::from([Reverse((PathCost::ZERO, start.clone()))]);

        while let Some(Reverse((cost, node))) = queue.pop() {
            if node == goal {
                break;
            }
            if best.get(&node).is_some_and(|b| cost > *b) {
                continue;
            }
            for (i, f) in edges.iter().enumerate().filter(|(_, f)| *f.source() == node) {
                let next = cost.then(PathCost::edge(f.fidelity()));
                let to = f.destination();
                if best.get(to).is_none_or(|b| next < *b) {
                    best.insert(to.clone(), next);
                    via.insert(to.clone(), i);
                    queue.push(Reverse((next, to.clone())));
                }
            }
        }

        let cost = *best.get(&goal)?;
        let mut factories = Vec::with_capacity(cost.hops as usize);
        let mut node = goal;
        while node != start {
            let f = edges[*via.get(&node)?];
            node = f.source().clone();
            factories.push(f.clone());
        }
        factories.reverse();
        Some(Route { factories, cost })
    }

    /// Resolves the conversion path from `src` to `dst`.
    ///
    /// Equal identities give the identity path. Spaces of one model whose
    /// profiles differ in primaries are routed through the XYZA node so the
    /// gamut is actually converted, unless a profile-pinned factory for the
    /// pair is registered. Profiles without primaries are reinterpreted
    /// unchanged.
    pub fn resolve(
        &self,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
        provider: &dyn ColorSpaceProvider,
    ) -> Result<ConversionPath> {
        if src.id() == dst.id() {
            return Ok(ConversionPath::identity(src.clone(), dst.clone()));
        }

        if src.model_depth() == dst.model_depth() {
            let pinned = self.factories.iter().find(|f| {
                f.source() == f.destination() && f.can_be_source(src) && f.can_be_destination(dst)
            });
            if let Some(f) = pinned {
                let cost = PathCost::edge(f.fidelity());
                return Ok(ConversionPath::new(vec![f.create_transformation(src, dst)], cost));
            }
        }

        if changes_gamut(src, dst) {
            return self.through_xyz(src, dst, provider);
        }

        if src.model_depth() == dst.model_depth() {
            debug!(from = %src, to = %dst, "reinterpreting pixels under a new profile");
            return Ok(ConversionPath::identity(src.clone(), dst.clone()));
        }

        let (steps, cost) = self.chain(src, dst, provider)?;
        debug!(
            from = %src,
            to = %dst,
            hops = cost.hops,
            fidelity = %cost.fidelity(),
            "conversion path resolved"
        );
        Ok(ConversionPath::new(steps, cost))
    }

    /// Two routed legs meeting at an XYZA space, the first decoding with the
    /// source primaries and the second encoding with the destination's.
    fn through_xyz(
        &self,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
        provider: &dyn ColorSpaceProvider,
    ) -> Result<ConversionPath> {
        let nodes = self.nodes();
        let node = nodes
            .iter()
            .filter(|n| n.model == XYZ_MODEL)
            .min_by_key(|n| n.depth != "F32")
            .ok_or_else(|| Error::no_conversion_path(src.id(), dst.id()))?;
        let pivot = provider.color_space_at(node, None)?;

        let (mut steps, into) = self.chain(src, &pivot, provider)?;
        let (out, back) = self.chain(&pivot, dst, provider)?;
        steps.extend(out);
        let cost = into.then(back);

        debug!(
            from = %src,
            to = %dst,
            via = %pivot,
            hops = cost.hops,
            fidelity = %cost.fidelity(),
            "gamut conversion resolved"
        );
        Ok(ConversionPath::new(steps, cost))
    }

    /// Instantiates the best route between two spaces of different nodes.
    fn chain(
        &self,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
        provider: &dyn ColorSpaceProvider,
    ) -> Result<(Vec<Arc<dyn ColorTransformation>>, PathCost)> {
        let route = self
            .route(src, dst)
            .ok_or_else(|| Error::no_conversion_path(src.id(), dst.id()))?;

        let mut steps: Vec<Arc<dyn ColorTransformation>> = Vec::with_capacity(route.factories.len());
        let mut from = src.clone();
        for (i, f) in route.factories.iter().enumerate() {
            let to = if i + 1 == route.factories.len() {
                dst.clone()
            } else {
                let node = f.destination();
                let profile = if node.model == src.model_id() {
                    src.profile_name()
                } else if node.model == dst.model_id() {
                    dst.profile_name()
                } else {
                    None
                };
                provider.color_space_at(node, profile)?
            };
            steps.push(f.create_transformation(&from, &to));
            from = to;
        }
        Ok((steps, route.cost))
    }
}

const XYZ_MODEL: &str = "XYZA";

/// Same model, different profiles, and at least one side defines primaries.
fn changes_gamut(src: &ColorSpace, dst: &ColorSpace) -> bool {
    let primaries = |s: &ColorSpace| s.profile().and_then(|p| p.primaries()).is_some();
    src.model_id() == dst.model_id()
        && src.model_id() != XYZ_MODEL
        && src.profile_name() != dst.profile_name()
        && (primaries(src) || primaries(dst))
}

fn usable(f: &Arc<dyn ConversionFactory>, src: &ColorSpace, dst: &ColorSpace) -> bool {
    let from_ok = if *f.source() == src.model_depth() {
        f.can_be_source(src)
    } else {
        f.source_profile().is_none()
    };
    let to_ok = if *f.destination() == dst.model_depth() {
        f.can_be_destination(dst)
    } else {
        f.destination_profile().is_none()
    };
    from_ok && to_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, catalog, space};
    use tincture_core::ChannelValue;
    use crate::DepthScalingFactory;

    /// Edge with fixed flags; never instantiated.
    #[derive(Debug)]
    struct Edge {
        source: ModelDepth,
        destination: ModelDepth,
        pin: Option<&'static str>,
        lossless: bool,
    }

    impl Edge {
        fn new(from: &str, to: &str, lossless: bool) -> Self {
            let node = |s: &str| {
                let (m, d) = s.split_once('/').unwrap();
                ModelDepth::new(m, d)
            };
            Self {
                source: node(from),
                destination: node(to),
                pin: None,
                lossless,
            }
        }
    }

    impl ConversionFactory for Edge {
        fn source(&self) -> &ModelDepth {
            &self.source
        }
        fn destination(&self) -> &ModelDepth {
            &self.destination
        }
        fn source_profile(&self) -> Option<&str> {
            self.pin
        }
        fn conserves_color_information(&self) -> bool {
            self.lossless
        }
        fn conserves_dynamic_range(&self) -> bool {
            self.lossless
        }
        fn create_transformation(
            &self,
            src: &Arc<ColorSpace>,
            dst: &Arc<ColorSpace>,
        ) -> Arc<dyn ColorTransformation> {
            Arc::new(crate::IdentityTransformation::new(src.clone(), dst.clone()))
        }
    }

    #[test]
    fn cost_orders_lossy_first() {
        let lossy = PathCost::edge(Fidelity::Lossy);
        let two_partial = PathCost::edge(Fidelity::Partial).then(PathCost::edge(Fidelity::Partial));
        let three_lossless = PathCost::edge(Fidelity::Lossless)
            .then(PathCost::edge(Fidelity::Lossless))
            .then(PathCost::edge(Fidelity::Lossless));
        assert!(three_lossless < two_partial);
        assert!(two_partial < lossy);
        assert_eq!(two_partial.fidelity(), Fidelity::Partial);
        assert!(PathCost::ZERO.is_lossless());
    }

    #[test]
    fn direct_widening() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let a = space("RGBA", "U8", None).unwrap();
        let b = space("RGBA", "U16", None).unwrap();

        let path = resolver.resolve(&a, &b, &at).unwrap();
        assert_eq!(path.hops(), 1);
        assert!(path.is_lossless());

        let mut out = [0u8; 8];
        path.transform(&[255, 128, 64, 255], &mut out, 1);
        let v: Vec<u16> = out.chunks_exact(2).map(u16::read).collect();
        assert_eq!(v, [65535, 32896, 16320, 65535]);
    }

    #[test]
    fn multi_hop_keeps_source_profile() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let a = space("RGBA", "U8", Some("Rec.2020")).unwrap();
        let b = space("XYZA", "F32", None).unwrap();

        let path = resolver.resolve(&a, &b, &at).unwrap();
        let ids: Vec<String> = path.color_spaces().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, ["RGBA/U8/Rec.2020", "RGBA/F32/Rec.2020", "XYZA/F32"]);
        assert_eq!(path.cost().fidelity(), Fidelity::Partial);
    }

    #[test]
    fn prefers_fidelity_over_hops() {
        let mut factories = catalog();
        factories.push(Arc::new(Edge::new("RGBA/U16", "GRAYA/F32", false)));
        let resolver = PathResolver::new(&factories);
        let a = space("RGBA", "U16", None).unwrap();
        let b = space("GRAYA", "F32", None).unwrap();

        let route = resolver.route(&a, &b).unwrap();
        assert_eq!(route.cost.hops, 2);
        assert_eq!(route.cost.lossy, 0);
    }

    #[test]
    fn ties_prefer_fewer_hops() {
        let mut factories = catalog();
        factories.push(Arc::new(Edge::new("GRAY/U8", "RGBA/F32", true)));
        let resolver = PathResolver::new(&factories);
        let a = space("GRAY", "U8", None).unwrap();
        let b = space("RGBA", "F32", None).unwrap();
        assert_eq!(resolver.route(&a, &b).unwrap().cost.hops, 1);
    }

    #[test]
    fn identity_and_reinterpretation() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let a = space("CMYKA", "F32", Some("press")).unwrap();
        let same = space("CMYKA", "F32", Some("press")).unwrap();
        assert!(resolver.resolve(&a, &same, &at).unwrap().is_identity());

        let proof = space("CMYKA", "F32", Some("proof")).unwrap();
        let path = resolver.resolve(&a, &proof, &at).unwrap();
        assert!(path.is_identity());
        assert_eq!(path.color_spaces().len(), 2);
    }

    #[test]
    fn primaries_change_goes_through_xyz() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let srgb = space("RGBA", "F32", Some("sRGB")).unwrap();
        let wide = space("RGBA", "F32", Some("Rec.2020")).unwrap();

        let path = resolver.resolve(&srgb, &wide, &at).unwrap();
        let ids: Vec<String> = path.color_spaces().iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, ["RGBA/F32/sRGB", "XYZA/F32", "RGBA/F32/Rec.2020"]);
        assert!(!path.is_lossless());

        let mut out = [0u8; 16];
        let red: Vec<u8> = [1.0f32, 0.0, 0.0, 1.0].iter().flat_map(|v| v.to_ne_bytes()).collect();
        path.transform(&red, &mut out, 1);
        let v: Vec<f32> = out.chunks_exact(4).map(f32::read).collect();
        assert!((v[0] - 0.6274).abs() < 1e-3);
        assert!((v[1] - 0.0691).abs() < 1e-3);
        assert!((v[2] - 0.0164).abs() < 1e-3);
        assert_eq!(v[3], 1.0);
    }

    #[test]
    fn depth_and_primaries_change_together() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let srgb = space("RGBA", "F32", Some("sRGB")).unwrap();
        let wide = space("RGBA", "U16", Some("Rec.2020")).unwrap();

        let path = resolver.resolve(&srgb, &wide, &at).unwrap();
        assert!(path.hops() > 1);
        assert!(path.color_spaces().iter().any(|id| id.to_string() == "XYZA/F32"));
        assert_ne!(path.cost().fidelity(), Fidelity::Lossless);
    }

    #[test]
    fn gamut_change_needs_an_xyz_node() {
        let factories: Vec<Arc<dyn ConversionFactory>> = catalog()
            .into_iter()
            .filter(|f| f.source().model != "XYZA" && f.destination().model != "XYZA")
            .collect();
        let resolver = PathResolver::new(&factories);
        let srgb = space("RGBA", "F32", Some("sRGB")).unwrap();
        let wide = space("RGBA", "F32", Some("Rec.2020")).unwrap();
        assert!(resolver.resolve(&srgb, &wide, &at).unwrap_err().is_no_path());
    }

    #[test]
    fn pinned_factory_used_for_its_profile() {
        let mut factories = catalog();
        let mut pinned = Edge::new("RGBA/F32", "RGBA/F32", true);
        pinned.pin = Some("Rec.2020");
        factories.push(Arc::new(pinned));
        let resolver = PathResolver::new(&factories);

        let wide = space("RGBA", "F32", Some("Rec.2020")).unwrap();
        let srgb = space("RGBA", "F32", Some("sRGB")).unwrap();
        assert_eq!(resolver.resolve(&wide, &srgb, &at).unwrap().hops(), 1);
        assert_eq!(resolver.resolve(&srgb, &wide, &at).unwrap().hops(), 2);
    }

    #[test]
    fn pinned_factory_not_used_mid_route() {
        let mut pinned = Edge::new("RGBA/U16", "GRAYA/U8", true);
        pinned.pin = Some("Rec.2020");
        let factories: Vec<Arc<dyn ConversionFactory>> = vec![
            Arc::new(DepthScalingFactory::new("RGBA", tincture_core::DataFormat::U8, tincture_core::DataFormat::U16)),
            Arc::new(pinned),
        ];
        let resolver = PathResolver::new(&factories);
        let a = space("RGBA", "U8", Some("Rec.2020")).unwrap();
        let b = space("GRAYA", "U8", None).unwrap();
        assert!(resolver.route(&a, &b).is_none());
    }

    #[test]
    fn unreachable_is_no_path() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let a = space("CMYKA", "F32", None).unwrap();
        let b = space("GRAY", "U8", None).unwrap();
        assert!(resolver.route(&a, &b).is_some());

        let few: Vec<Arc<dyn ConversionFactory>> = factories.into_iter().take(2).collect();
        let err = PathResolver::new(&few).resolve(&a, &b, &at).unwrap_err();
        assert!(err.is_no_path());
    }

    #[test]
    fn provider_errors_propagate() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let a = space("RGBA", "U8", None).unwrap();
        let b = space("XYZA", "F32", None).unwrap();
        let refuse = |node: &ModelDepth, _: Option<&str>| -> Result<Arc<ColorSpace>> {
            Err(Error::unknown_color_space(&node.model, &node.depth, None))
        };
        assert!(resolver.resolve(&a, &b, &refuse).unwrap_err().is_lookup_miss());
    }
}

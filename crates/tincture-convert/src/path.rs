//! Composed conversions.

use crate::resolver::PathCost;
use crate::ColorTransformation;
use std::sync::Arc;
use tincture_core::{precondition, ColorSpace, ColorSpaceId};

/// An ordered chain of transformations from one color space to another.
///
/// Applying the chain allocates one scratch buffer per intermediate color
/// space, owned by the call. An empty chain is a plain copy.
#[derive(Debug, Clone)]
pub struct ConversionPath {
    source: Arc<ColorSpace>,
    destination: Arc<ColorSpace>,
    steps: Vec<Arc<dyn ColorTransformation>>,
    cost: PathCost,
}

impl ConversionPath {
    /// The copy path between two color spaces sharing a layout.
    pub fn identity(source: Arc<ColorSpace>, destination: Arc<ColorSpace>) -> Self {
        precondition!(
            source.layout() == destination.layout(),
            "identity conversion between different layouts ({source} -> {destination})"
        );
        Self {
            source,
            destination,
            steps: Vec::new(),
            cost: PathCost::ZERO,
        }
    }

    /// Chains `steps`, each reading what the previous one writes.
    ///
    /// # Panics
    ///
    /// If `steps` is empty or the chain is broken.
    pub fn new(steps: Vec<Arc<dyn ColorTransformation>>, cost: PathCost) -> Self {
        precondition!(!steps.is_empty(), "conversion path without steps");
        for pair in steps.windows(2) {
            precondition!(
                pair[0].destination().id() == pair[1].source().id(),
                "broken conversion chain: {} then {}",
                pair[0].destination(),
                pair[1].source()
            );
        }
        let source = steps[0].source().clone();
        let destination = steps[steps.len() - 1].destination().clone();
        Self {
            source,
            destination,
            steps,
            cost,
        }
    }

    /// The transformations in order.
    pub fn steps(&self) -> &[Arc<dyn ColorTransformation>] {
        &self.steps
    }

    /// Number of transformations.
    pub fn hops(&self) -> usize {
        self.steps.len()
    }

    /// Whether this path only copies bytes.
    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Accumulated fidelity cost.
    pub fn cost(&self) -> PathCost {
        self.cost
    }

    /// Whether every step conserves both color information and dynamic range.
    pub fn is_lossless(&self) -> bool {
        self.cost.is_lossless()
    }

    /// Color spaces visited, source and destination included.
    pub fn color_spaces(&self) -> Vec<&ColorSpaceId> {
        let mut ids = vec![self.source.id()];
        ids.extend(self.steps.iter().map(|s| s.destination().id()));
        if self.steps.is_empty() && self.source.id() != self.destination.id() {
            ids.push(self.destination.id());
        }
        ids
    }
}

impl ColorTransformation for ConversionPath {
    fn source(&self) -> &Arc<ColorSpace> {
        &self.source
    }

    fn destination(&self) -> &Arc<ColorSpace> {
        &self.destination
    }

    fn apply(&self, src: &[u8], dst: &mut [u8], pixel_count: usize) {
        match self.steps.as_slice() {
            [] => {
                let n = self.source.layout().bytes_for(pixel_count);
                dst[..n].copy_from_slice(&src[..n]);
            }
            [only] => only.apply(src, dst, pixel_count),
            [first, middle @ .., last] => {
                let mut scratch: Vec<Vec<u8>> = self.steps[..self.steps.len() - 1]
                    .iter()
                    .map(|s| vec![0u8; s.destination().layout().bytes_for(pixel_count)])
                    .collect();
                first.apply(src, &mut scratch[0], pixel_count);
                for (i, step) in middle.iter().enumerate() {
                    let (done, rest) = scratch.split_at_mut(i + 1);
                    step.apply(&done[i], &mut rest[0], pixel_count);
                }
                last.apply(&scratch[scratch.len() - 1], dst, pixel_count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, catalog, space};
    use crate::{DepthScalingFactory, ConversionFactory, PathResolver};
    use tincture_core::DataFormat;

    #[test]
    fn three_hops_through_scratch() {
        let factories = catalog();
        let resolver = PathResolver::new(&factories);
        let a = space("RGBA", "U8", None).unwrap();
        let b = space("GRAYA", "U8", None).unwrap();

        let path = resolver.resolve(&a, &b, &at).unwrap();
        assert_eq!(path.hops(), 3);
        assert!(!path.is_lossless());

        let src = [100, 100, 100, 200, 0, 0, 0, 0, 255, 255, 255, 255];
        let mut dst = [9u8; 6];
        path.transform(&src, &mut dst, 3);
        assert_eq!(dst, [100, 200, 0, 0, 255, 255]);
    }

    #[test]
    fn identity_copies() {
        let a = space("GRAYA", "U16", None).unwrap();
        let b = space("GRAYA", "U16", Some("linear")).unwrap();
        let path = ConversionPath::identity(a, b);
        let src = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let mut dst = [0u8; 8];
        path.transform(&src, &mut dst, 2);
        assert_eq!(src, dst);
    }

    #[test]
    fn zero_pixels_touch_nothing() {
        let factories = catalog();
        let a = space("RGBA", "U8", None).unwrap();
        let b = space("XYZA", "F32", None).unwrap();
        let path = PathResolver::new(&factories).resolve(&a, &b, &at).unwrap();
        path.transform(&[], &mut [], 0);
    }

    #[test]
    #[should_panic(expected = "precondition violated: destination holds")]
    fn short_destination_panics() {
        let a = space("RGBA", "U8", None).unwrap();
        let b = space("RGBA", "U16", None).unwrap();
        let f = DepthScalingFactory::new("RGBA", DataFormat::U8, DataFormat::U16);
        let path = ConversionPath::new(vec![f.create_transformation(&a, &b)], PathCost::ZERO);
        path.transform(&[0; 8], &mut [0; 8], 2);
    }

    #[test]
    #[should_panic(expected = "broken conversion chain")]
    fn broken_chain_panics() {
        let a = space("RGBA", "U8", None).unwrap();
        let b = space("RGBA", "U16", None).unwrap();
        let c = space("RGBA", "F32", None).unwrap();
        let ab = DepthScalingFactory::new("RGBA", DataFormat::U8, DataFormat::U16).create_transformation(&a, &b);
        let ac = DepthScalingFactory::new("RGBA", DataFormat::U8, DataFormat::F32).create_transformation(&a, &c);
        ConversionPath::new(vec![ab, ac], PathCost::ZERO);
    }
}

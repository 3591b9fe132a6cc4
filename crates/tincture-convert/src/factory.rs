//! Conversion factories: the edges of the conversion graph.
//!
//! A factory declares the `(model, depth)` pair it reads and the pair it
//! writes, plus two fidelity flags. Factories may additionally pin a profile
//! at either end; such factories only match color spaces carrying that
//! profile and win over generic ones on the same edge.

use crate::ColorTransformation;
use std::fmt;
use std::sync::Arc;
use tincture_core::{ColorSpace, ModelDepth};

/// Builds transformations between one ordered `(model, depth)` pair.
pub trait ConversionFactory: Send + Sync + fmt::Debug {
    /// Graph node read.
    fn source(&self) -> &ModelDepth;

    /// Graph node written.
    fn destination(&self) -> &ModelDepth;

    /// Profile the source must carry, `None` for any.
    fn source_profile(&self) -> Option<&str> {
        None
    }

    /// Profile the destination must carry, `None` for any.
    fn destination_profile(&self) -> Option<&str> {
        None
    }

    /// No information is lost (e.g. integer widening).
    fn conserves_color_information(&self) -> bool;

    /// Values outside `[0, 1]` survive (no clipping).
    fn conserves_dynamic_range(&self) -> bool;

    /// Builds the transformation for a concrete pair.
    ///
    /// Callers check [`can_be_source`](Self::can_be_source) and
    /// [`can_be_destination`](Self::can_be_destination) first.
    fn create_transformation(
        &self,
        src: &Arc<ColorSpace>,
        dst: &Arc<ColorSpace>,
    ) -> Arc<dyn ColorTransformation>;

    /// Whether `cs` is acceptable input.
    fn can_be_source(&self, cs: &ColorSpace) -> bool {
        matches_endpoint(cs, self.source(), self.source_profile())
    }

    /// Whether `cs` is acceptable output.
    fn can_be_destination(&self, cs: &ColorSpace) -> bool {
        matches_endpoint(cs, self.destination(), self.destination_profile())
    }

    /// Whether either end is pinned to a profile.
    fn is_profile_specific(&self) -> bool {
        self.source_profile().is_some() || self.destination_profile().is_some()
    }

    /// Fidelity class of this edge.
    fn fidelity(&self) -> Fidelity {
        match (self.conserves_color_information(), self.conserves_dynamic_range()) {
            (true, true) => Fidelity::Lossless,
            (false, false) => Fidelity::Lossy,
            _ => Fidelity::Partial,
        }
    }

    /// Label for logs and listings.
    fn name(&self) -> String {
        format!("{} -> {}", self.source(), self.destination())
    }
}

fn matches_endpoint(cs: &ColorSpace, node: &ModelDepth, profile: Option<&str>) -> bool {
    cs.model_id() == node.model
        && cs.depth_id() == node.depth
        && profile.is_none_or(|p| cs.profile_name() == Some(p))
}

/// Fidelity class of one edge, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fidelity {
    /// Conserves color information and dynamic range.
    Lossless,
    /// Conserves exactly one of the two.
    Partial,
    /// Conserves neither.
    Lossy,
}

impl fmt::Display for Fidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lossless => "lossless",
            Self::Partial => "partial",
            Self::Lossy => "lossy",
        })
    }
}

/// Whether two factories claim the same slot unconditionally.
pub fn same_slot(a: &dyn ConversionFactory, b: &dyn ConversionFactory) -> bool {
    a.source() == b.source()
        && a.destination() == b.destination()
        && a.source_profile() == b.source_profile()
        && a.destination_profile() == b.destination_profile()
}

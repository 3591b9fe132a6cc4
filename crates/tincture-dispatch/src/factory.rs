//! Tier-generic component construction.
//!
//! A component family implements [`OptimizedFactory`] with a `create` generic
//! over the tier marker. [`create_optimized`] instantiates it for the active
//! tier; [`create_optimized_for`] for an explicit one.
//!
//! ```rust
//! use tincture_dispatch::{create_optimized_for, CpuTier, OptimizedFactory, Tier};
//!
//! struct Name;
//!
//! impl OptimizedFactory for Name {
//!     type Param = ();
//!     type Output = &'static str;
//!
//!     fn create<T: Tier>(_: ()) -> &'static str {
//!         T::TIER.name()
//!     }
//! }
//!
//! assert_eq!(create_optimized_for::<Name>(CpuTier::Scalar, ()), "scalar");
//! ```

use crate::tier::{Avx, Avx2Fma, Neon, Scalar, Sse2, Sse41, Ssse3};
use crate::{active_tier, CpuTier, Tier};

/// A family of components with one implementation per tier.
pub trait OptimizedFactory {
    /// Construction argument.
    type Param;
    /// Tier-erased product.
    type Output;

    /// Builds the implementation for tier `T`.
    fn create<T: Tier>(param: Self::Param) -> Self::Output;
}

/// Builds `F`'s component for the process-wide active tier.
pub fn create_optimized<F: OptimizedFactory>(param: F::Param) -> F::Output {
    create_optimized_for::<F>(active_tier(), param)
}

/// Builds `F`'s component for `tier`.
///
/// An unsupported tier still yields a working component: its kernels run
/// without the tier's target features.
pub fn create_optimized_for<F: OptimizedFactory>(tier: CpuTier, param: F::Param) -> F::Output {
    match tier {
        CpuTier::Scalar => F::create::<Scalar>(param),
        CpuTier::Sse2 => F::create::<Sse2>(param),
        CpuTier::Ssse3 => F::create::<Ssse3>(param),
        CpuTier::Sse41 => F::create::<Sse41>(param),
        CpuTier::Avx => F::create::<Avx>(param),
        CpuTier::Avx2Fma => F::create::<Avx2Fma>(param),
        CpuTier::Neon => F::create::<Neon>(param),
    }
}

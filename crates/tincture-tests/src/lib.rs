//! Integration tests for the tincture crates.
//!
//! End-to-end checks of the engine's observable properties: conversion
//! round trips through the registry, composite identities, channel write
//! masks, and agreement between dispatcher tiers.


#[cfg(test)]
mod conversion {
    use crate::support::*;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;
    use tincture_convert::ColorTransformation;
    use tincture_core::{ColorSpace, DataFormat};
    use tincture_registry::{ConversionCache, Registry, BUILTIN_DEPTHS};

    fn round_trip(reg: &Registry, a: &Arc<ColorSpace>, b: &Arc<ColorSpace>, px: &[u8], n: usize) -> Vec<u8> {
        let mut mid = vec![0u8; b.layout().bytes_for(n)];
        let mut back = vec![0u8; a.layout().bytes_for(n)];
        reg.convert(a, b, px, &mut mid, n).unwrap();
        reg.convert(b, a, &mid, &mut back, n).unwrap();
        back
    }

    #[test]
    fn scenario_pixel() {
        let reg = registry();
        let a = reg.lookup("RGBA", "U8", None).unwrap();
        let b = reg.lookup("RGBA", "U16", None).unwrap();

        let src = [255u8, 128, 64, 255];
        let mut wide = [0u8; 8];
        reg.convert(&a, &b, &src, &mut wide, 1).unwrap();
        let channels: Vec<u16> = wide
            .chunks_exact(2)
            .map(|c| u16::from_ne_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(channels, [65535, 32896, 16320, 65535]);

        let mut back = [0u8; 4];
        reg.convert(&b, &a, &wide, &mut back, 1).unwrap();
        assert_eq!(back, src);
    }

    /// Channel reorders between RGBA and two scratch models.
    mod reorder {
        use std::sync::Arc;
        use tincture_convert::{ColorTransformation, ConversionFactory};
        use tincture_core::{ChannelRole, ColorModel, ColorSpace, DataFormat, ModelDepth};
        use tincture_registry::{ModelSpaceFactory, Registry};

        pub const BGRA: ColorModel = ColorModel {
            id: "BGRA",
            channels: &[
                ("B", ChannelRole::Color),
                ("G", ChannelRole::Color),
                ("R", ChannelRole::Color),
                ("A", ChannelRole::Alpha),
            ],
            default_profile: None,
        };

        pub const ARGB: ColorModel = ColorModel {
            id: "ARGB",
            channels: &[
                ("A", ChannelRole::Alpha),
                ("R", ChannelRole::Color),
                ("G", ChannelRole::Color),
                ("B", ChannelRole::Color),
            ],
            default_profile: None,
        };

        /// Output channel `i` is input channel `order[i]`.
        #[derive(Debug)]
        struct Reorder {
            source: ModelDepth,
            destination: ModelDepth,
            order: [usize; 4],
        }

        impl ConversionFactory for Reorder {
            fn source(&self) -> &ModelDepth {
                &self.source
            }
            fn destination(&self) -> &ModelDepth {
                &self.destination
            }
            fn conserves_color_information(&self) -> bool {
                true
            }
            fn conserves_dynamic_range(&self) -> bool {
                true
            }
            fn create_transformation(
                &self,
                src: &Arc<ColorSpace>,
                dst: &Arc<ColorSpace>,
            ) -> Arc<dyn ColorTransformation> {
                Arc::new(Shuffle {
                    src: src.clone(),
                    dst: dst.clone(),
                    order: self.order,
                })
            }
        }

        #[derive(Debug)]
        struct Shuffle {
            src: Arc<ColorSpace>,
            dst: Arc<ColorSpace>,
            order: [usize; 4],
        }

        impl ColorTransformation for Shuffle {
            fn source(&self) -> &Arc<ColorSpace> {
                &self.src
            }
            fn destination(&self) -> &Arc<ColorSpace> {
                &self.dst
            }
            fn apply(&self, src: &[u8], dst: &mut [u8], pixel_count: usize) {
                let (from, to) = (self.src.layout(), self.dst.layout());
                let pixels = src
                    .chunks_exact(from.pixel_size())
                    .zip(dst.chunks_exact_mut(to.pixel_size()))
                    .take(pixel_count);
                for (s, d) in pixels {
                    for (i, &j) in self.order.iter().enumerate() {
                        let (a, b) = (from.channel(j), to.channel(i));
                        let width = a.format.bytes_per_channel();
                        d[b.offset..b.offset + width].copy_from_slice(&s[a.offset..a.offset + width]);
                    }
                }
            }
        }

        /// Builtins plus BGRA and ARGB at U8 and U16, linked
        /// RGBA <-> BGRA <-> ARGB in both directions at each depth.
        pub fn registry() -> Registry {
            let reg = super::registry();
            for format in [DataFormat::U8, DataFormat::U16] {
                for model in [BGRA, ARGB] {
                    reg.register_color_space_factory(Arc::new(ModelSpaceFactory::new(model, format).unwrap()))
                        .unwrap();
                }
                let links = [
                    ("RGBA", "BGRA", [2, 1, 0, 3]),
                    ("BGRA", "RGBA", [2, 1, 0, 3]),
                    ("BGRA", "ARGB", [3, 2, 1, 0]),
                    ("ARGB", "BGRA", [3, 2, 1, 0]),
                ];
                for (from, to, order) in links {
                    reg.register_conversion_factory(Arc::new(Reorder {
                        source: ModelDepth::new(from, format.depth_id()),
                        destination: ModelDepth::new(to, format.depth_id()),
                        order,
                    }))
                    .unwrap();
                }
            }
            reg
        }
    }

    #[test]
    fn lossless_pairs_round_trip_exactly() {
        let reg = reorder::registry();
        for format in [DataFormat::U8, DataFormat::U16] {
            let a = space(&reg, "RGBA", format);
            let b = space(&reg, "ARGB", format);
            let there = reg.resolve(&a, &b).unwrap();
            let back = reg.resolve(&b, &a).unwrap();
            assert!(there.is_lossless() && back.is_lossless());
            assert_eq!(there.hops(), 2);
            assert_eq!(back.hops(), 2);

            let n = 1 << format.bits();
            let px = sweep(&a, n);
            let mut mid = vec![0u8; b.layout().bytes_for(n)];
            reg.convert(&a, &b, &px, &mut mid, n).unwrap();
            assert_ne!(mid, px);
            assert_eq!(round_trip(&reg, &a, &b, &px, n), px, "{} <-> {}", a.id(), b.id());
        }
    }

    #[test]
    fn reorder_places_channels() {
        let reg = reorder::registry();
        let a = space(&reg, "RGBA", DataFormat::U8);
        let b = space(&reg, "ARGB", DataFormat::U8);
        let mut out = [0u8; 4];
        reg.convert(&a, &b, &[10, 20, 30, 40], &mut out, 1).unwrap();
        assert_eq!(out, [40, 10, 20, 30]);
    }

    #[test]
    fn rgb_profiles_convert_through_xyz() {
        let reg = registry();
        let srgb = reg.lookup("RGBA", "F32", Some("sRGB")).unwrap();
        let wide = reg.lookup("RGBA", "F32", Some("Rec.2020")).unwrap();

        let path = reg.resolve(&srgb, &wide).unwrap();
        assert!(!path.is_identity());
        assert!(!path.is_lossless());

        let red: Vec<u8> = [1.0f32, 0.0, 0.0, 1.0].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let mut out = [0u8; 16];
        reg.convert(&srgb, &wide, &red, &mut out, 1).unwrap();
        let v: Vec<f32> = out
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_abs_diff_eq!(v[0], 0.6274, epsilon = 1e-3);
        assert_abs_diff_eq!(v[1], 0.0691, epsilon = 1e-3);
        assert_abs_diff_eq!(v[2], 0.0164, epsilon = 1e-3);
        assert_abs_diff_eq!(v[3], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn depth_and_profile_change_is_not_one_hop() {
        let reg = registry();
        let srgb = reg.lookup("RGBA", "F32", Some("sRGB")).unwrap();
        let wide = reg.lookup("RGBA", "U16", Some("Rec.2020")).unwrap();

        let path = reg.resolve(&srgb, &wide).unwrap();
        assert!(path.hops() > 1);
        assert!(path.color_spaces().iter().any(|id| id.to_string().starts_with("XYZA/")));

        let white: Vec<u8> = [1.0f32; 4].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let mut out = [0u8; 8];
        reg.convert(&srgb, &wide, &white, &mut out, 1).unwrap();
        for c in out.chunks_exact(2) {
            let v = u16::from_ne_bytes([c[0], c[1]]);
            assert!(v >= 65500, "white drifted to {v}");
        }
    }

    #[test]
    fn widening_round_trips_are_exact() {
        let reg = registry();
        for model in reg.models() {
            for from in [DataFormat::U8, DataFormat::U16] {
                let a = space(&reg, &model, from);
                let n = 1 << from.bits();
                let px = sweep(&a, n);
                for to in BUILTIN_DEPTHS {
                    let b = space(&reg, &model, to);
                    if !reg.resolve(&a, &b).unwrap().is_lossless() {
                        continue;
                    }
                    assert_eq!(round_trip(&reg, &a, &b, &px, n), px, "{} -> {}", a.id(), b.id());
                }
            }
        }
    }

    #[test]
    fn depth_extremes_survive() {
        let reg = registry();
        let pairs = [
            (DataFormat::U8, DataFormat::U16),
            (DataFormat::U8, DataFormat::F16),
            (DataFormat::U8, DataFormat::F32),
            (DataFormat::U16, DataFormat::F32),
        ];
        for model in ["GRAY", "RGBA", "CMYKA"] {
            for (narrow, wide) in pairs {
                let a = space(&reg, model, narrow);
                let b = space(&reg, model, wide);
                let size = a.pixel_size();
                let mut px = vec![0u8; size * 2];
                px[size..].fill(0xFF);
                assert_eq!(round_trip(&reg, &a, &b, &px, 2), px, "{} -> {}", a.id(), b.id());
            }
        }
    }

    #[test]
    fn cached_path_matches_fresh_resolution() {
        let reg = registry();
        let cache = ConversionCache::new();
        let a = space(&reg, "GRAYA", DataFormat::U8);
        let b = space(&reg, "CMYKA", DataFormat::F16);

        let px = sweep(&a, 256);
        let mut fresh = vec![0u8; b.layout().bytes_for(256)];
        let mut cached = fresh.clone();
        reg.convert(&a, &b, &px, &mut fresh, 256).unwrap();
        cache
            .get_or_resolve(&reg, &a, &b)
            .unwrap()
            .transform(&px, &mut cached, 256);
        assert_eq!(cached, fresh);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_spaces_are_lookup_misses() {
        let reg = registry();
        assert!(reg.lookup("LABA", "U8", None).unwrap_err().is_lookup_miss());
        assert!(reg.lookup("RGBA", "U12", None).unwrap_err().is_lookup_miss());
        assert!(reg
            .lookup("RGBA", "U8", Some("not-a-profile"))
            .unwrap_err()
            .is_lookup_miss());
    }
}


#[cfg(test)]
mod tiers {
    use crate::support::*;
    use approx::assert_abs_diff_eq;
    use tincture_composite::{mask_applicator_for, standard_ops_for, BlendMode};
    use tincture_core::{ChannelFlags, ColorSpace, CompositeParams, DataFormat};
    use tincture_dispatch::{active_tier, available_tiers, CpuTier};

    const ROWS: usize = 9;
    const COLS: usize = 37;

    fn assert_same(space: &ColorSpace, reference: &[u8], got: &[u8], what: &str) {
        if space.has_high_dynamic_range() {
            let eps = if space.layout().uniform_format() == Some(DataFormat::F16) { 1e-3 } else { 1e-5 };
            for (r, g) in reference
                .chunks_exact(space.pixel_size())
                .zip(got.chunks_exact(space.pixel_size()))
            {
                for (x, y) in space.to_normalized(r).into_iter().zip(space.to_normalized(g)) {
                    assert_abs_diff_eq!(x, y, epsilon = eps);
                }
            }
        } else {
            assert_eq!(reference, got, "{what}");
        }
    }

    fn run(tier: CpuTier, space: &ColorSpace, mode: BlendMode, seed: u64) -> Vec<u8> {
        let ops = standard_ops_for(tier, space.layout());
        let op = ops
            .iter()
            .find(|op| op.id() == mode.id())
            .expect("mode in table");
        let n = ROWS * COLS;
        let src = random_pixels(space, n, seed);
        let mut dst = random_pixels(space, n, seed + 1);
        let mask = random_mask(n, seed + 2);
        let stride = COLS * space.pixel_size();
        op.composite(
            CompositeParams::new(&mut dst, stride, &src, stride, ROWS, COLS)
                .with_mask(&mask, COLS)
                .with_opacity(0.6)
                .with_channel_flags(ChannelFlags::ALL),
        );
        dst
    }

    #[test]
    fn scalar_is_always_available() {
        let tiers = available_tiers();
        assert!(tiers.contains(&CpuTier::Scalar));
        assert!(tiers.contains(&active_tier()));
    }

    #[test]
    fn optimized_ops_agree_across_tiers() {
        let reg = registry();
        for model in ["RGBA", "GRAYA", "GRAY", "CMYKA"] {
            for format in [DataFormat::U8, DataFormat::U16, DataFormat::F16, DataFormat::F32] {
                let cs = space(&reg, model, format);
                for mode in [BlendMode::Over, BlendMode::Copy, BlendMode::AlphaDarken] {
                    for seed in [11, 29, 83] {
                        let reference = run(CpuTier::Scalar, &cs, mode, seed);
                        for tier in available_tiers() {
                            let got = run(tier, &cs, mode, seed);
                            assert_same(&cs, &reference, &got, &format!("{} {} {tier}", cs.id(), mode.id()));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn generic_ops_agree_across_tiers() {
        let reg = registry();
        let cs = space(&reg, "RGBA", DataFormat::U8);
        for &mode in BlendMode::ALL.iter().filter(|m| !m.is_optimized()) {
            let reference = run(CpuTier::Scalar, &cs, mode, 5);
            for tier in available_tiers() {
                assert_eq!(run(tier, &cs, mode, 5), reference, "{} {tier}", mode.id());
            }
        }
    }

    #[test]
    fn mask_appliers_agree_across_tiers() {
        use rand::{Rng, SeedableRng};

        let reg = registry();
        for format in [DataFormat::U8, DataFormat::U16, DataFormat::F32] {
            let cs = space(&reg, "RGBA", format);
            let n = 101;
            let pixels = random_pixels(&cs, n, 40);
            let mut rng = rand::rngs::StdRng::seed_from_u64(41);
            let mask: Vec<f32> = (0..n).map(|_| rng.r#gen()).collect();
            let color = random_pixels(&cs, 1, 42);

            let apply = |tier: CpuTier| {
                let applier = mask_applicator_for(tier, cs.layout()).expect("alpha layout");
                let mut a = pixels.clone();
                applier.apply_normed_float_mask(&mut a, &mask);
                let mut b = pixels.clone();
                applier.apply_inverse_normed_float_mask(&mut b, &mask);
                let mut c = pixels.clone();
                applier.fill_inverse_alpha_normed_float_mask_with_color(&mut c, &mask, &color);
                [a, b, c]
            };

            let reference = apply(CpuTier::Scalar);
            for tier in available_tiers() {
                for (r, g) in reference.iter().zip(apply(tier)) {
                    assert_same(&cs, r, &g, &format!("{} {tier}", cs.id()));
                }
            }
        }
    }
}

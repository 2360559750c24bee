//! Utility macros.

/// Implements [`approx::AbsDiffEq`] and [`approx::RelativeEq`] for a type
/// whose values are compared pairwise after a compatibility check.
///
/// The first expression decides whether the two values can be compared at
/// all. The second yields the pairs of components that must each be
/// approximately equal, which must themselves implement the approx traits
/// with `f64` epsilons.
macro_rules! impl_approx_eq {
    ($t:ty, |$a:ident, $b:ident| $compatible:expr, $pairs:expr) => {
        impl ::approx::AbsDiffEq for $t {
            type Epsilon = f64;

            fn default_epsilon() -> f64 {
                <f64 as ::approx::AbsDiffEq>::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
                let $a = self;
                let $b = other;
                $compatible
                    && $pairs
                        .into_iter()
                        .all(|(lhs, rhs)| ::approx::AbsDiffEq::abs_diff_eq(lhs, rhs, epsilon))
            }
        }

        impl ::approx::RelativeEq for $t {
            fn default_max_relative() -> f64 {
                <f64 as ::approx::RelativeEq>::default_max_relative()
            }

            fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
                let $a = self;
                let $b = other;
                $compatible
                    && $pairs.into_iter().all(|(lhs, rhs)| {
                        ::approx::RelativeEq::relative_eq(lhs, rhs, epsilon, max_relative)
                    })
            }
        }
    };
}

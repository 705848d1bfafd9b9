use num_traits::{One, PrimInt};

/// Trait implemented by flag enums.
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index.
/// You choose the backing integer type via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: Ensure your `bit_index()` is < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container over any primitive integer.
///
/// Used for collision layer masks and for pressed/held trick buttons.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn from_tags<U: FlagBitmask<Storage = T> + Copy>(tags: &[U]) -> Self {
        let mut flags = Self::new(T::zero());
        flags.add_many(tags);
        flags
    }

    // --- Single Tag Operations ---
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    // --- Bulk Operations ---
    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    // --- Logic Gates ---
    pub fn has_all<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return true;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) == combined
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Extra attributes (e.g. serde derives) are forwarded to the enum.
///
/// Example:
/// ```rust
/// ski_sim::define_bitmask_flags!(Surface, u16, {
///     Snow,
///     Ice,
///     Rock,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($(#[$meta:meta])* $name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// Every variant, in bit order.
            pub const VARIANTS: &'static [$name] = &[$($name::$variant),*];

            pub fn from_bit_index(index: u8) -> Option<Self> {
                Self::VARIANTS.get(index as usize).copied()
            }
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_bitmask_flags!(Flag, u8, { A, B, C });

    #[test]
    fn add_and_query_single_tags() {
        let mut flags = BitmaskFlags::<u8>::default();
        assert!(flags.is_empty());
        flags.add(Flag::B);

        assert!(flags.has(Flag::B));
        assert!(!flags.has(Flag::A));
        assert_eq!(flags.bits, 0b010);
        assert!(!flags.is_empty());
    }

    #[test]
    fn has_all_requires_every_tag() {
        let flags = BitmaskFlags::from_tags(&[Flag::A, Flag::C]);

        assert!(flags.has_all(&[Flag::A, Flag::C]));
        assert!(!flags.has_all(&[Flag::A, Flag::B]));
        assert!(flags.has_all::<Flag>(&[]));
    }

    #[test]
    fn variants_round_trip_through_bit_index() {
        for &flag in Flag::VARIANTS {
            assert_eq!(Flag::from_bit_index(flag.bit_index()), Some(flag));
        }
        assert_eq!(Flag::from_bit_index(3), None);
    }
}

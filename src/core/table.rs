//! Fixed-size tables keyed by a closed enumeration
//!
//! Every key has a slot initialized to zero, so a status or region with no
//! orders reads as `0` instead of a missing entry.

use chrono::Weekday;

/// A closed enumeration usable as a table key
pub trait TableKey: Copy + Sized + 'static {
    /// Number of distinct keys
    const COUNT: usize;

    /// Every key, in table order
    const KEYS: &'static [Self];

    /// Dense slot index in `0..COUNT`
    fn index(&self) -> usize;

    /// Label used when the table is serialized
    fn label(&self) -> &'static str;
}

/// Weekdays in chart order, Sunday first
impl TableKey for Weekday {
    const COUNT: usize = 7;
    const KEYS: &'static [Self] = &[
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    fn index(&self) -> usize {
        self.num_days_from_sunday() as usize
    }

    fn label(&self) -> &'static str {
        match self {
            Weekday::Sun => "Sun",
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
        }
    }
}

/// Declare a table type with one slot per key of `$key`
///
/// The generated type serializes as a map from key label to value, with every
/// key present.
#[macro_export]
macro_rules! keyed_table {
    ($(#[$meta:meta])* $name:ident, $key:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name<V> {
            values: [V; <$key as $crate::core::table::TableKey>::COUNT],
        }

        impl<V: Copy + Default> Default for $name<V> {
            fn default() -> Self {
                Self {
                    values: [V::default(); <$key as $crate::core::table::TableKey>::COUNT],
                }
            }
        }

        impl<V> $name<V> {
            /// Value stored for `key`
            pub fn get(&self, key: $key) -> &V {
                &self.values[$crate::core::table::TableKey::index(&key)]
            }

            /// Iterate over `(key, value)` pairs in key order
            pub fn iter(&self) -> impl Iterator<Item = ($key, &V)> + '_ {
                <$key as $crate::core::table::TableKey>::KEYS
                    .iter()
                    .copied()
                    .zip(self.values.iter())
            }

            /// Iterate over values in key order
            pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
                self.values.iter()
            }
        }

        impl<V: Copy + ::std::iter::Sum<V>> $name<V> {
            /// Sum of every slot
            pub fn total(&self) -> V {
                self.values.iter().copied().sum()
            }
        }

        impl<V> ::std::ops::Index<$key> for $name<V> {
            type Output = V;

            fn index(&self, key: $key) -> &V {
                &self.values[$crate::core::table::TableKey::index(&key)]
            }
        }

        impl<V> ::std::ops::IndexMut<$key> for $name<V> {
            fn index_mut(&mut self, key: $key) -> &mut V {
                &mut self.values[$crate::core::table::TableKey::index(&key)]
            }
        }

        impl<V: ::serde::Serialize> ::serde::Serialize for $name<V> {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                use ::serde::ser::SerializeMap;

                let mut map = serializer
                    .serialize_map(Some(<$key as $crate::core::table::TableKey>::COUNT))?;
                for (key, value) in self.iter() {
                    map.serialize_entry($crate::core::table::TableKey::label(&key), value)?;
                }
                map.end()
            }
        }
    };
}

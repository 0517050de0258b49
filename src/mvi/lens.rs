//! Named field accessors.

use std::fmt;

/// A named, copyable accessor pair from a parent state to one of its fields.
///
/// The name doubles as the stable key the scoping cache uses, so two lenses
/// built for the same field always produce the same key. Build them with
/// [`lens!`](crate::lens).
pub struct Lens<P, C> {
    name: &'static str,
    get: fn(&P) -> &C,
    get_mut: fn(&mut P) -> &mut C,
}

impl<P, C> Clone for Lens<P, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, C> Copy for Lens<P, C> {}

impl<P, C> fmt::Debug for Lens<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lens").field(&self.name).finish()
    }
}

impl<P, C> Lens<P, C> {
    pub const fn new(name: &'static str, get: fn(&P) -> &C, get_mut: fn(&mut P) -> &mut C) -> Self {
        Self { name, get, get_mut }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<'a>(&self, parent: &'a P) -> &'a C {
        (self.get)(parent)
    }

    pub fn get_mut<'a>(&self, parent: &'a mut P) -> &'a mut C {
        (self.get_mut)(parent)
    }
}

/// Build a [`Lens`] for `Parent.field`.
///
/// ```ignore
/// let detail = lens!(HomeState, detail);
/// assert_eq!(detail.name(), "HomeState.detail");
/// ```
#[macro_export]
macro_rules! lens {
    ($parent:ty, $field:ident) => {
        $crate::mvi::Lens::<$parent, _>::new(
            concat!(stringify!($parent), ".", stringify!($field)),
            |parent| &parent.$field,
            |parent| &mut parent.$field,
        )
    };
}

#[cfg(test)]
mod tests {
    struct Point {
        x: i32,
        label: String,
    }

    #[test]
    fn lens_reads_and_writes_field() {
        let x = crate::lens!(Point, x);
        let mut point = Point {
            x: 1,
            label: "origin".to_string(),
        };

        *x.get_mut(&mut point) += 41;

        assert_eq!(*x.get(&point), 42);
        assert_eq!(point.label, "origin");
    }

    #[test]
    fn lens_name_is_stable_per_field() {
        let a = crate::lens!(Point, label);
        let b = crate::lens!(Point, label);
        assert_eq!(a.name(), "Point.label");
        assert_eq!(a.name(), b.name());
    }
}

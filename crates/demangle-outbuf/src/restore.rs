//! Temporarily overriding a value for the length of a scope.

use core::ops::{Deref, DerefMut};

/// Restores a value when dropped.
///
/// The guard mutably borrows an owner `O` and remembers the value of one of
/// its slots, selected by the `field` projection. Until the guard is dropped,
/// the owner stays reachable through [`Deref`]/[`DerefMut`]; when it is
/// dropped (end of scope, early `?` return, or a panic unwinding through it)
/// the remembered value is put back.
///
/// Printers use it to change state carried by the
/// [`OutputBuffer`](crate::OutputBuffer) while recursing:
///
/// ```rust
/// use demangle_outbuf::{OutputBuffer, ScopedRestore};
///
/// let mut ob = OutputBuffer::new();
/// {
///     let mut args = ScopedRestore::replace(&mut ob, |ob| &mut ob.gt_is_gt, 0);
///     assert!(args.is_gt_inside_template_args());
///     args.push_str("<1>");
/// }
/// assert_eq!(ob.gt_is_gt, 1);
/// ```
///
/// For a plain variable the owner is the value itself:
///
/// ```rust
/// use demangle_outbuf::ScopedRestore;
///
/// let mut depth = 3;
/// {
///     let mut guard = ScopedRestore::capture_value(&mut depth);
///     *guard += 1;
///     assert_eq!(*guard, 4);
/// }
/// assert_eq!(depth, 3);
/// ```
#[must_use = "the value is restored as soon as the guard is dropped"]
pub struct ScopedRestore<'a, O: ?Sized, T> {
    owner: &'a mut O,
    field: fn(&mut O) -> &mut T,
    saved: T,
}

impl<'a, O: ?Sized, T> ScopedRestore<'a, O, T> {
    /// Remembers the current value of `field(owner)` without changing it.
    pub fn capture(owner: &'a mut O, field: fn(&mut O) -> &mut T) -> Self
    where
        T: Clone,
    {
        let saved = field(owner).clone();
        Self {
            owner,
            field,
            saved,
        }
    }

    /// Remembers the current value of `field(owner)` and replaces it with
    /// `value`.
    pub fn replace(owner: &'a mut O, field: fn(&mut O) -> &mut T, value: T) -> Self {
        let saved = core::mem::replace(field(owner), value);
        Self {
            owner,
            field,
            saved,
        }
    }

    /// The value that will be restored.
    #[must_use]
    pub fn saved(&self) -> &T {
        &self.saved
    }
}

impl<'a, T> ScopedRestore<'a, T, T> {
    /// [`ScopedRestore::capture`] for a plain variable.
    pub fn capture_value(slot: &'a mut T) -> Self
    where
        T: Clone,
    {
        Self::capture(slot, itself)
    }

    /// [`ScopedRestore::replace`] for a plain variable.
    pub fn replace_value(slot: &'a mut T, value: T) -> Self {
        Self::replace(slot, itself, value)
    }
}

fn itself<T>(value: &mut T) -> &mut T {
    value
}

impl<O: ?Sized, T> Deref for ScopedRestore<'_, O, T> {
    type Target = O;

    fn deref(&self) -> &O {
        &*self.owner
    }
}

impl<O: ?Sized, T> DerefMut for ScopedRestore<'_, O, T> {
    fn deref_mut(&mut self) -> &mut O {
        &mut *self.owner
    }
}

impl<O: ?Sized, T> Drop for ScopedRestore<'_, O, T> {
    fn drop(&mut self) {
        core::mem::swap((self.field)(&mut *self.owner), &mut self.saved);
    }
}

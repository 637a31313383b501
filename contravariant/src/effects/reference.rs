use std::{
    convert::Infallible,
    sync::{Arc, PoisonError, RwLock},
};

use crate::{Contravariant, PartiallyApplied};

/// A shared mutable cell written with `In` values and read as `Out` values. Writes may fail
/// with `EA` and reads with `EB`.
///
/// Every view of a cell (clones, adapted writers, mapped readers) observes the same state.
pub struct Ref<EA, EB, In, Out> {
    write: Arc<dyn Fn(In) -> Result<(), EA> + Send + Sync>,
    read: Arc<dyn Fn() -> Result<Out, EB> + Send + Sync>,
}

impl<EA, EB, In, Out> Clone for Ref<EA, EB, In, Out> {
    fn clone(&self) -> Self {
        Self {
            write: self.write.clone(),
            read: self.read.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Ref<Infallible, Infallible, T, T> {
    pub fn new(value: T) -> Self {
        let cell = Arc::new(RwLock::new(value));
        let reader = cell.clone();
        Ref {
            write: Arc::new(move |value: T| {
                *cell.write().unwrap_or_else(PoisonError::into_inner) = value;
                Ok(())
            }),
            read: Arc::new(move || {
                Ok(reader.read().unwrap_or_else(PoisonError::into_inner).clone())
            }),
        }
    }
}

impl<EA: 'static, EB: 'static, In: 'static, Out: 'static> Ref<EA, EB, In, Out> {
    pub fn get(&self) -> Result<Out, EB> {
        (self.read)()
    }

    pub fn set(&self, value: In) -> Result<(), EA> {
        (self.write)(value)
    }

    /// Translate every value via `f` before it is written.
    pub fn contramap_write<In0: 'static>(
        self,
        f: impl Fn(In0) -> In + Send + Sync + 'static,
    ) -> Ref<EA, EB, In0, Out> {
        let write = self.write;
        Ref {
            write: Arc::new(move |value: In0| write(f(value))),
            read: self.read,
        }
    }

    /// Validate every value via `f` before it is written; rejected values leave the cell
    /// untouched and surface as `EC`.
    pub fn contramap_either<EC: 'static, In0: 'static>(
        self,
        f: impl Fn(In0) -> Result<In, EC> + Send + Sync + 'static,
    ) -> Ref<EC, EB, In0, Out>
    where
        EC: From<EA>,
    {
        let write = self.write;
        Ref {
            write: Arc::new(move |value: In0| Ok(write(f(value)?)?)),
            read: self.read,
        }
    }

    pub fn map_read<Out2: 'static>(
        self,
        f: impl Fn(Out) -> Out2 + Send + Sync + 'static,
    ) -> Ref<EA, EB, In, Out2> {
        let read = self.read;
        Ref {
            write: self.write,
            read: Arc::new(move || read().map(|value| f(value))),
        }
    }
}

impl<EA: 'static, EB: 'static, Out: 'static> Contravariant for Ref<EA, EB, PartiallyApplied, Out> {
    type Consumer<X> = Ref<EA, EB, X, Out>;

    fn contramap<A: 'static, B: 'static>(
        input: Self::Consumer<A>,
        f: impl Fn(B) -> A + Send + Sync + 'static,
    ) -> Self::Consumer<B> {
        input.contramap_write(f)
    }
}

//! Concrete warp nodes.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::foundation::error::WarpResult;

pub(crate) mod lat_long;
pub(crate) mod lens_distort;
pub(crate) mod transform;

/// Parameter record of a node.
pub trait NodeParams: Clone + Send + Sync {
    /// Reject inconsistent or out-of-range values.
    fn validate(&self) -> WarpResult<()>;
}

/// Parameters published as immutable snapshots.
///
/// Readers clone the current `Arc` and keep using it while a writer installs a replacement, so
/// a computation never observes a half-applied change.
#[derive(Debug)]
pub(crate) struct ParamState<P> {
    current: RwLock<Arc<P>>,
}

impl<P: NodeParams> ParamState<P> {
    pub(crate) fn new(params: P) -> WarpResult<Self> {
        params.validate()?;
        Ok(Self {
            current: RwLock::new(Arc::new(params)),
        })
    }

    pub(crate) fn get(&self) -> Arc<P> {
        self.current.read().clone()
    }

    pub(crate) fn set(&self, params: P) -> WarpResult<()> {
        params.validate()?;
        *self.current.write() = Arc::new(params);
        Ok(())
    }

    /// Apply `f` to a copy of the current parameters and publish the result if it validates.
    /// Holds the write lock throughout so concurrent updates do not interleave.
    pub(crate) fn update(&self, f: impl FnOnce(&mut P) -> WarpResult<()>) -> WarpResult<()> {
        let mut guard = self.current.write();
        let mut next = P::clone(&guard);
        f(&mut next)?;
        next.validate()?;
        *guard = Arc::new(next);
        Ok(())
    }
}

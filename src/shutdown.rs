//! Shutdown coordination for background work.
//!
//! A [`ThreadGroup`] carries one stop signal and a count of in-flight
//! operations. Work joins the group with [`ThreadGroup::enter`] before it
//! starts and leaves when the returned [`OpGuard`] drops. Once
//! [`ThreadGroup::stop`] has been called no new operation is admitted, and
//! `stop` itself returns only after every admitted operation has left.
//!
//! Both pieces of state live in a single `watch` channel so admission and
//! the stop flag can never be observed out of step.

use std::sync::Arc;

use log::debug;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("thread group is stopping")]
pub struct Stopped;

#[derive(Debug, Clone, Copy, Default)]
struct Ops {
    stopping: bool,
    active: usize,
}

#[derive(Debug)]
pub struct ThreadGroup {
    ops: watch::Sender<Ops>,
}

impl ThreadGroup {
    pub fn new() -> Arc<Self> {
        let (ops, _) = watch::channel(Ops::default());
        Arc::new(Self { ops })
    }

    /// Registers an in-flight operation, or fails if shutdown has begun.
    pub fn enter(self: &Arc<Self>) -> Result<OpGuard, Stopped> {
        let mut admitted = false;
        self.ops.send_if_modified(|ops| {
            if ops.stopping {
                return false;
            }
            ops.active += 1;
            admitted = true;
            true
        });
        if admitted {
            Ok(OpGuard {
                group: Arc::clone(self),
            })
        } else {
            Err(Stopped)
        }
    }

    pub fn is_stopping(&self) -> bool {
        self.ops.borrow().stopping
    }

    /// Resolves once [`ThreadGroup::stop`] has been called.
    pub async fn stopped(&self) {
        let mut rx = self.ops.subscribe();
        let _ = rx.wait_for(|ops| ops.stopping).await;
    }

    /// Raises the stop signal and waits for in-flight operations to drain.
    pub async fn stop(&self) {
        self.ops.send_modify(|ops| ops.stopping = true);
        let mut rx = self.ops.subscribe();
        let _ = rx.wait_for(|ops| ops.active == 0).await;
        debug!("Thread group drained");
    }

    fn leave(&self) {
        self.ops.send_modify(|ops| ops.active -= 1);
    }
}

/// Membership in a [`ThreadGroup`]; leaves the group on drop.
#[derive(Debug)]
pub struct OpGuard {
    group: Arc<ThreadGroup>,
}

impl Drop for OpGuard {
    fn drop(&mut self) {
        self.group.leave();
    }
}

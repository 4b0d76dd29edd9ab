// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-threaded cooperative executor.
//!
//! A single-writer event loop: one task owns all mutable state and
//! drains one channel, so every submitted closure runs to completion
//! (or to its next `.await` point) before the next one starts. This
//! generalizes that pattern into a reusable `Actor<S>` that can host
//! any owned state `S`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// A boxed, `'a`-bound future, the shape every actor closure must return.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type Job<S> = Box<dyn for<'a> FnOnce(&'a mut S) -> BoxFuture<'a, ()> + Send>;

/// Errors surfaced by [`Actor`] submission.
#[derive(Debug, Error)]
pub enum ActorError {
    /// The actor's task has already ended; the closure was never run.
    #[error("actor has shut down")]
    Closed,
    /// The closure was accepted but the actor's task ended (e.g. a panic
    /// inside a previous closure) before it could return a result.
    #[error("actor closure did not complete (a prior closure may have panicked)")]
    Panicked,
}

/// A cooperative, single-threaded executor bound to one owned state `S`.
///
/// Cloning an `Actor` is cheap (it's a channel handle); all clones submit
/// to the same underlying task, so within one executor instance, all
/// submitted closures run serially in submission order, across every
/// clone.
pub struct Actor<S> {
    tx: mpsc::UnboundedSender<Job<S>>,
}

impl<S> Clone for Actor<S> {
    fn clone(&self) -> Self {
        Actor {
            tx: self.tx.clone(),
        }
    }
}

impl<S> Actor<S>
where
    S: Send + 'static,
{
    /// Spawn the executor task owning `state`.
    pub fn spawn(state: S) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job<S>>();
        tokio::spawn(async move {
            let mut state = state;
            while let Some(job) = rx.recv().await {
                job(&mut state).await;
            }
        });
        Actor { tx }
    }

    /// Fire-and-forget submission.
    pub fn run<F>(&self, f: F) -> Result<(), ActorError>
    where
        F: for<'a> FnOnce(&'a mut S) -> BoxFuture<'a, ()> + Send + 'static,
    {
        self.tx.send(Box::new(f)).map_err(|_| ActorError::Closed)
    }

    /// Submission returning a completion handle.
    pub async fn call<F, T>(&self, f: F) -> Result<T, ActorError>
    where
        F: for<'a> FnOnce(&'a mut S) -> BoxFuture<'a, T> + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel::<T>();
        let job: Job<S> = Box::new(move |state| {
            Box::pin(async move {
                let result = f(state).await;
                let _ = result_tx.send(result);
            })
        });
        self.tx.send(job).map_err(|_| ActorError::Closed)?;
        result_rx.await.map_err(|_| ActorError::Panicked)
    }

    /// Timer that reschedules after each execution completes. Not a
    /// fixed-rate ticker: the next wait only
    /// starts once the previous invocation's closure has finished, so a
    /// slow tick never overlaps with the next.
    pub fn schedule_periodic<F>(&self, interval: Duration, f: F) -> tokio::task::JoinHandle<()>
    where
        F: for<'a> Fn(&'a mut S) -> BoxFuture<'a, ()> + Send + Sync + 'static,
    {
        let actor = self.clone();
        let f = Arc::new(f);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let f = Arc::clone(&f);
                if actor.call(move |s| f(s)).await.is_err() {
                    break;
                }
            }
        })
    }

    /// Invoke `f` once every future in `completions` has resolved.
    /// Awaited in listed order: since none of
    /// the futures this crate hands it depend on each other, sequencing
    /// rather than racing them costs nothing but is simpler to reason
    /// about than a generic join.
    pub fn run_on_completion<Fut, F>(&self, completions: Vec<Fut>, f: F)
    where
        Fut: Future<Output = ()> + Send + 'static,
        F: for<'a> FnOnce(&'a mut S) -> BoxFuture<'a, ()> + Send + 'static,
    {
        let actor = self.clone();
        tokio::spawn(async move {
            for completion in completions {
                completion.await;
            }
            let _ = actor.run(f);
        });
    }
}

#[cfg(test)]
#[path = "actor_tests.rs"]
mod tests;

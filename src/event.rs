use std::future::Future;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::calendar::EventRecord;
use crate::remote::AuthSession;

/// Everything the UI loop reacts to: key presses and finished background work.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Loaded(Result<Vec<EventRecord>, String>),
    Auth(Result<AuthSession, String>),
    Created(Result<EventRecord, String>),
}

pub fn poll_event(timeout: Duration) -> color_eyre::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn next_key_event(timeout: Duration) -> color_eyre::Result<Option<KeyEvent>> {
    loop {
        match poll_event(timeout)? {
            Some(Event::Key(key)) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
            Some(_) => continue,
            None => return Ok(None),
        }
    }
}

/// Runs futures on the runtime and posts their results back to the UI loop.
#[derive(Clone)]
pub struct Tasks {
    handle: Handle,
    tx: UnboundedSender<AppEvent>,
}

impl Tasks {
    pub fn new(handle: Handle, tx: UnboundedSender<AppEvent>) -> Self {
        Self { handle, tx }
    }

    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            if tx.send(fut.await).is_err() {
                log::debug!("UI loop gone, dropping task result");
            }
        });
    }
}

pub struct Events {
    rx: UnboundedReceiver<AppEvent>,
    tx: UnboundedSender<AppEvent>,
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

impl Events {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { rx, tx }
    }

    pub fn tasks(&self, handle: Handle) -> Tasks {
        Tasks::new(handle, self.tx.clone())
    }

    /// Finished background work first, then at most `timeout` waiting on keys.
    pub fn next(&mut self, timeout: Duration) -> color_eyre::Result<Option<AppEvent>> {
        if let Ok(ev) = self.rx.try_recv() {
            return Ok(Some(ev));
        }
        Ok(next_key_event(timeout)?.map(AppEvent::Key))
    }

    #[cfg(test)]
    pub fn recv_blocking(&mut self) -> Option<AppEvent> {
        self.rx.blocking_recv()
    }
}

//! Interactive cancel key.
//!
//! A small blocking thread watches for `q` (or ctrl-c) while a session
//! runs and fires the supplied callback once. Raw mode is enabled for the
//! listener's lifetime and always restored on the way out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct CancelKeyListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

pub fn listen<F>(on_cancel: F) -> CancelKeyListener
where
    F: Fn() + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_ref = Arc::clone(&stop);

    let handle = std::thread::spawn(move || {
        if terminal::enable_raw_mode().is_err() {
            // Not a tty (tests, pipes); the session just runs to the end.
            return;
        }

        while !stop_ref.load(Ordering::Relaxed) {
            if !matches!(event::poll(POLL_INTERVAL), Ok(true)) {
                continue;
            }
            if let Ok(Event::Key(key)) = event::read() {
                let ctrl_c = key.code == KeyCode::Char('c')
                    && key.modifiers.contains(KeyModifiers::CONTROL);
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) || ctrl_c {
                    on_cancel();
                    break;
                }
            }
        }

        let _ = terminal::disable_raw_mode();
    });

    CancelKeyListener {
        stop,
        handle: Some(handle),
    }
}

impl CancelKeyListener {
    /// Stops the listener and waits for raw mode to be restored.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CancelKeyListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

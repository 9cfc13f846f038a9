//! Background thread hosting a single map generation run, so that the UI stays responsive
//! while the dialog waits for input and the maps download.

use std::thread::JoinHandle;

use tokio::sync::mpsc;

/// Run in progress, or finished and waiting to be dropped. Dropping it stops whatever is
/// still pending and joins the thread.
pub struct Runtime {
    thread: Option<JoinHandle<()>>,
    stop_tx: mpsc::UnboundedSender<()>,
}

impl Runtime {
    /// Start `run` on a fresh current-thread Tokio runtime.
    pub fn new<F>(run: F) -> Self
    where
        F: Future + Send + 'static,
        F::Output: Send,
    {
        let (stop_tx, mut stop_rx) = mpsc::unbounded_channel();

        let thread = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    log::error!("Could not start the map generation runtime: {e}.");
                    return;
                }
            };

            // Thread stays up after the run is done, until the next run replaces it.
            runtime.spawn(run);
            runtime.block_on(stop_rx.recv());
        });

        Self {
            thread: Some(thread),
            stop_tx,
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        // Thread exits early if the runtime could not be built.
        let _ = self.stop_tx.send(());

        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log::warn!("Map generation thread panicked.");
        }

        log::debug!("Map generation thread is down.");
    }
}

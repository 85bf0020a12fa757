fn main() {
    println!("Run `cargo test -p pipeline-tests` to execute the intake pipeline tests.");
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use docsight_intake::{
        FilePayload, FileTransfer, IntakeConfig, IntakeEvent, Orchestrator, ProgressFn,
        TransferError, TransferFuture,
    };
    use docsight_protocol::UploadResponse;
    use tokio::sync::oneshot;

    fn ok_response() -> UploadResponse {
        UploadResponse {
            message: "stored".into(),
            error: String::new(),
        }
    }

    fn pdf(name: &str, size: usize) -> FilePayload {
        FilePayload::new(name, vec![0u8; size])
    }

    // -----------------------------------------------------------------
    // Manually resolved transfer: each upload parks until the test
    // resolves it, so batch boundaries are observable.
    // -----------------------------------------------------------------

    struct ManualTransfer {
        started: Mutex<Vec<String>>,
        pending: Mutex<Vec<(String, oneshot::Sender<Result<(), String>>)>>,
    }

    impl ManualTransfer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                started: Mutex::new(Vec::new()),
                pending: Mutex::new(Vec::new()),
            })
        }

        fn started_count(&self) -> usize {
            self.started.lock().unwrap().len()
        }

        /// Polls until `n` uploads have been dispatched.
        async fn wait_for_started(&self, n: usize) {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
            while self.started_count() < n {
                assert!(
                    tokio::time::Instant::now() < deadline,
                    "timed out waiting for {n} uploads to start (saw {})",
                    self.started_count()
                );
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        }

        /// Resolves every currently parked upload.
        fn resolve_all(&self, result: Result<(), String>) {
            let mut pending = self.pending.lock().unwrap();
            for (_, tx) in pending.drain(..) {
                let _ = tx.send(result.clone());
            }
        }
    }

    impl FileTransfer for ManualTransfer {
        fn upload(&self, payload: Arc<FilePayload>, _progress: ProgressFn) -> TransferFuture<'_> {
            let (tx, rx) = oneshot::channel();
            self.started.lock().unwrap().push(payload.name.clone());
            self.pending.lock().unwrap().push((payload.name.clone(), tx));
            Box::pin(async move {
                match rx.await {
                    Ok(Ok(())) => Ok(ok_response()),
                    Ok(Err(msg)) => Err(TransferError::Failed(msg)),
                    Err(_) => Err(TransferError::Failed("resolver dropped".into())),
                }
            })
        }
    }

    // -----------------------------------------------------------------
    // Scripted transfer: replays a progress ramp, then succeeds, or
    // fails at a given fraction of the file.
    // -----------------------------------------------------------------

    struct ScriptedTransfer {
        /// Names that fail after reporting 40% progress.
        failing: Vec<String>,
    }

    impl ScriptedTransfer {
        fn new(failing: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                failing: failing.iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    impl FileTransfer for ScriptedTransfer {
        fn upload(&self, payload: Arc<FilePayload>, progress: ProgressFn) -> TransferFuture<'_> {
            Box::pin(async move {
                let total = payload.size_bytes();
                if self.failing.contains(&payload.name) {
                    progress(total * 2 / 5, total);
                    tokio::task::yield_now().await;
                    return Err(TransferError::Failed("connection reset".into()));
                }
                for step in 1..=4u64 {
                    progress(total * step / 4, total);
                    tokio::task::yield_now().await;
                }
                Ok(ok_response())
            })
        }
    }

    // -----------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn rejected_files_leave_the_ledger_unchanged() {
        let mut orch = Orchestrator::new(IntakeConfig::default(), ScriptedTransfer::new(&[]));
        let mut events = orch.take_events().unwrap();

        orch.submit(vec![pdf("notes.txt", 64)]).await;
        assert!(orch.snapshot().is_empty());

        orch.submit(vec![pdf("huge.pdf", 15 * 1024 * 1024 + 1)]).await;
        assert!(orch.snapshot().is_empty());

        let mut rejected = 0;
        while let Ok(e) = events.try_recv() {
            if matches!(e, IntakeEvent::FileRejected { .. }) {
                rejected += 1;
            }
        }
        assert_eq!(rejected, 2);
    }

    #[tokio::test]
    async fn twelve_files_run_as_two_sequential_batches() {
        let transfer = ManualTransfer::new();
        let orch = Arc::new(Orchestrator::new(
            IntakeConfig::default(),
            Arc::clone(&transfer) as Arc<dyn FileTransfer>,
        ));

        let files: Vec<FilePayload> = (0..12).map(|i| pdf(&format!("doc{i:02}.pdf"), 32)).collect();
        let submit = tokio::spawn({
            let orch = Arc::clone(&orch);
            async move { orch.submit(files).await }
        });

        // First group of 10 dispatched; entries 11 and 12 still queued.
        transfer.wait_for_started(10).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(transfer.started_count(), 10);
        let snaps = orch.snapshot();
        assert_eq!(snaps.len(), 12);
        for snap in &snaps[..10] {
            assert_eq!(snap.progress, 0, "{} should be in flight", snap.display_name);
        }
        assert_eq!(snaps[10].progress, -1);
        assert_eq!(snaps[11].progress, -1);

        // Resolving group one releases the remaining two.
        transfer.resolve_all(Ok(()));
        transfer.wait_for_started(12).await;
        transfer.resolve_all(Ok(()));

        let ids = submit.await.unwrap();
        assert_eq!(ids.len(), 12);
        assert!(orch.snapshot().iter().all(|s| s.progress == 100));
    }

    #[tokio::test]
    async fn twenty_five_files_need_three_batches() {
        let transfer = ManualTransfer::new();
        let orch = Arc::new(Orchestrator::new(
            IntakeConfig::default(),
            Arc::clone(&transfer) as Arc<dyn FileTransfer>,
        ));

        let files: Vec<FilePayload> = (0..25).map(|i| pdf(&format!("doc{i:02}.pdf"), 32)).collect();
        let submit = tokio::spawn({
            let orch = Arc::clone(&orch);
            async move { orch.submit(files).await }
        });

        for expected in [10usize, 20, 25] {
            transfer.wait_for_started(expected).await;
            tokio::time::sleep(Duration::from_millis(10)).await;
            // The next group never starts early.
            assert_eq!(transfer.started_count(), expected);
            transfer.resolve_all(Ok(()));
        }

        submit.await.unwrap();
        assert!(orch.snapshot().iter().all(|s| s.progress == 100));
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_reaches_one_hundred() {
        let mut orch = Orchestrator::new(IntakeConfig::default(), ScriptedTransfer::new(&[]));
        let mut events = orch.take_events().unwrap();

        let ids = orch
            .submit(vec![pdf("a.pdf", 1024 * 1024), pdf("b.pdf", 2 * 1024 * 1024)])
            .await;
        assert_eq!(ids.len(), 2);

        let mut last_percent: std::collections::HashMap<String, u8> = Default::default();
        while let Ok(e) = events.try_recv() {
            if let IntakeEvent::FileProgress { id, percent } = e {
                let last = last_percent.entry(id.clone()).or_insert(0);
                assert!(percent >= *last, "{id} regressed: {last} -> {percent}");
                *last = percent;
            }
        }
        assert_eq!(last_percent.len(), 2);
        assert!(last_percent.values().all(|p| *p == 100));
        assert!(orch.snapshot().iter().all(|s| s.progress == 100));
    }

    #[tokio::test]
    async fn mid_transfer_failure_is_isolated_and_removable() {
        let orch = Orchestrator::new(IntakeConfig::default(), ScriptedTransfer::new(&["bad.pdf"]));

        let ids = orch
            .submit(vec![pdf("a.pdf", 64), pdf("bad.pdf", 64), pdf("c.pdf", 64)])
            .await;

        let snaps = orch.snapshot();
        assert_eq!(snaps[0].progress, 100);
        assert_eq!(snaps[1].progress, -2);
        assert_eq!(snaps[2].progress, 100);

        // Removing the failed entry deletes exactly that entry.
        orch.remove(&ids[1]);
        assert_eq!(orch.selected_identities(), vec!["a.pdf", "c.pdf"]);

        // Removing a non-existent id is a no-op.
        orch.remove("file99-0");
        assert_eq!(orch.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn resubmitting_a_failed_file_creates_a_fresh_entry() {
        let orch = Orchestrator::new(IntakeConfig::default(), ScriptedTransfer::new(&["bad.pdf"]));

        let first = orch.submit(vec![pdf("bad.pdf", 64)]).await;
        assert_eq!(orch.snapshot()[0].progress, -2);

        // The scripted failure keys on the name, so the retry fails too,
        // but it lands in a brand-new entry; the old one is untouched.
        let second = orch.submit(vec![pdf("bad.pdf", 64)]).await;
        assert_ne!(first[0], second[0]);
        assert_eq!(orch.snapshot().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_transfers_fail_by_deadline_when_configured() {
        let transfer = ManualTransfer::new();
        let config = IntakeConfig {
            batch_size: 2,
            transfer_timeout: Some(Duration::from_secs(10)),
            ..IntakeConfig::default()
        };
        let orch = Orchestrator::new(config, Arc::clone(&transfer) as Arc<dyn FileTransfer>);

        // Nothing ever resolves these; the deadline fails each group and
        // later groups still run.
        let ids = orch
            .submit(vec![pdf("a.pdf", 64), pdf("b.pdf", 64), pdf("c.pdf", 64)])
            .await;
        assert_eq!(ids.len(), 3);
        assert!(orch.snapshot().iter().all(|s| s.progress == -2));
        assert_eq!(transfer.started_count(), 3);
    }

    #[tokio::test]
    async fn ordered_identities_feed_the_conversation_flow() {
        let orch = Orchestrator::new(IntakeConfig::default(), ScriptedTransfer::new(&[]));
        orch.submit(vec![pdf("q3-report.pdf", 64), pdf("annex.pdf", 64)])
            .await;

        // The downstream conversation collaborator consumes exactly the
        // ordered file names.
        assert_eq!(
            orch.selected_identities(),
            vec!["q3-report.pdf", "annex.pdf"]
        );
    }
}

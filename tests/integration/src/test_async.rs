//! Callback and future dispatch integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::time::Duration;

    use http::StatusCode;
    use qingstor_sdk::RequestError;
    use qingstor_sdk::model::{
        ListBucketsInput, ListBucketsOutput, ListObjectsInput, ListObjectsOutput,
    };

    use crate::{StubTransport, service};

    const LISTING: &str = r#"{"count":1,"buckets":[{"name":"photos","location":"pek3a"}]}"#;
    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_should_reject_missing_callback_without_scheduling() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, LISTING));

        let err = service(&transport, 1024)
            .list_buckets_async(ListBucketsInput::default(), None)
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidArgument(_)), "{err:?}");

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_should_invoke_callback_exactly_once_off_thread() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, LISTING));
        let invocations = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();
        let caller = std::thread::current().id();

        let counter = Arc::clone(&invocations);
        service(&transport, 1024)
            .list_buckets_async(
                ListBucketsInput::default(),
                Some(Box::new(move |result: Result<ListBucketsOutput, RequestError>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let _ = tx.send((std::thread::current().id(), result));
                })),
            )
            .unwrap();

        let (worker, result) = rx.recv_timeout(WAIT).unwrap();
        assert_ne!(worker, caller);
        assert_eq!(result.unwrap().count, Some(1));

        // The sender was consumed with the callback, so the channel closes.
        assert!(rx.recv_timeout(WAIT).is_err());
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn test_should_deliver_service_errors_to_callback() {
        let transport = Arc::new(StubTransport::json(
            StatusCode::FORBIDDEN,
            r#"{"code":"permission_denied","message":"denied"}"#,
        ));
        let (tx, rx) = mpsc::channel();

        service(&transport, 1024)
            .get_bucket("photos", None)
            .list_objects_async(
                ListObjectsInput::default(),
                Some(Box::new(move |result: Result<ListObjectsOutput, RequestError>| {
                    let _ = tx.send(result);
                })),
            )
            .unwrap();

        let err = rx.recv_timeout(WAIT).unwrap().unwrap_err();
        let service_error = err.as_service_error().unwrap();
        assert_eq!(service_error.status_code, 403);
        assert_eq!(service_error.code.as_deref(), Some("permission_denied"));
    }

    #[test]
    fn test_should_report_construction_errors_synchronously() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&invocations);

        let err = service(&transport, 1024)
            .get_bucket("", None)
            .list_objects_async(
                ListObjectsInput::default(),
                Some(Box::new(move |_: Result<ListObjectsOutput, RequestError>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .unwrap_err();

        assert!(matches!(err, RequestError::MissingRequiredField(_)), "{err:?}");
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_should_resolve_future_on_blocking_pool() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, LISTING));

        let out = service(&transport, 1024)
            .list_buckets_request(ListBucketsInput::default())
            .send_future()
            .await
            .unwrap();

        assert_eq!(out.count, Some(1));
        assert_eq!(out.buckets.unwrap()[0].name.as_deref(), Some("photos"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_should_run_callbacks_on_ambient_runtime() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, LISTING));
        let (tx, rx) = tokio::sync::oneshot::channel();

        service(&transport, 1024)
            .list_buckets_async(
                ListBucketsInput::default(),
                Some(Box::new(move |result: Result<ListBucketsOutput, RequestError>| {
                    let _ = tx.send(result);
                })),
            )
            .unwrap();

        let out = tokio::time::timeout(WAIT, rx).await.unwrap().unwrap().unwrap();
        assert_eq!(out.count, Some(1));
    }
}

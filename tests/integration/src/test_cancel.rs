//! Chunked transfer, progress and cancellation integration tests.

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use qingstor_sdk::model::{GetObjectInput, PutObjectInput};
    use qingstor_sdk::{CancellationFlag, RequestError};

    use crate::{StubTransport, cancel_on_poll, service};

    fn upload(body: &'static [u8]) -> PutObjectInput {
        PutObjectInput {
            body: Some(Bytes::from_static(body)),
            ..PutObjectInput::default()
        }
    }

    fn object_response(body: &'static [u8]) -> StubTransport {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from(body.len()));
        StubTransport::fixed(StatusCode::OK, headers, Bytes::from_static(body))
    }

    #[test]
    fn test_should_upload_in_chunks_and_report_progress() {
        let transport = Arc::new(StubTransport::fixed(
            StatusCode::CREATED,
            HeaderMap::new(),
            Bytes::new(),
        ));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        service(&transport, 4)
            .get_bucket("photos", None)
            .put_object_request("ten.bin", upload(b"0123456789"))
            .with_progress(move |sent: u64, total: Option<u64>| {
                sink.lock().unwrap().push((sent, total));
            })
            .send()
            .unwrap();

        let request = transport.last();
        assert_eq!(request.content_length, 10);
        assert_eq!(request.chunks, vec![4, 4, 2]);
        assert_eq!(request.body, b"0123456789");
        assert_eq!(
            *events.lock().unwrap(),
            vec![(4, Some(10)), (8, Some(10)), (10, Some(10))]
        );
    }

    #[test]
    fn test_should_stop_upload_when_cancelled_mid_transfer() {
        let transport = Arc::new(StubTransport::fixed(
            StatusCode::CREATED,
            HeaderMap::new(),
            Bytes::new(),
        ));
        // Polled before each of the three chunks; cancels before the third.
        let (handler, polls) = cancel_on_poll(3);

        let err = service(&transport, 4)
            .get_bucket("photos", None)
            .put_object_request("ten.bin", upload(b"0123456789"))
            .with_cancellation(handler)
            .send()
            .unwrap_err();

        assert!(matches!(err, RequestError::Cancelled), "{err:?}");
        assert_eq!(err.to_string(), "Request has been cancelled.");
        let request = transport.last();
        assert_eq!(request.chunks, vec![4, 4]);
        assert_eq!(request.body, b"01234567");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_should_not_transmit_body_when_cancelled_up_front() {
        let transport = Arc::new(StubTransport::fixed(
            StatusCode::CREATED,
            HeaderMap::new(),
            Bytes::new(),
        ));
        let flag = CancellationFlag::new();
        flag.cancel();

        let err = service(&transport, 4)
            .get_bucket("photos", None)
            .put_object_request("ten.bin", upload(b"0123456789"))
            .with_cancellation(flag)
            .send()
            .unwrap_err();

        assert!(matches!(err, RequestError::Cancelled), "{err:?}");
        assert!(transport.last().chunks.is_empty());
    }

    #[test]
    fn test_should_stop_download_when_cancelled() {
        let transport = Arc::new(object_response(b"0123456789").with_read_size(2));
        let (handler, polls) = cancel_on_poll(3);

        let err = service(&transport, 4)
            .get_bucket("photos", None)
            .get_object_request("ten.bin", GetObjectInput::default())
            .with_cancellation(handler)
            .send()
            .unwrap_err();

        assert!(matches!(err, RequestError::Cancelled), "{err:?}");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_should_download_in_chunks_and_report_progress() {
        let transport = Arc::new(object_response(b"0123456789").with_read_size(4));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);

        let out = service(&transport, 64)
            .get_bucket("photos", None)
            .get_object_request("ten.bin", GetObjectInput::default())
            .with_progress(move |received: u64, total: Option<u64>| {
                sink.lock().unwrap().push((received, total));
            })
            .send()
            .unwrap();

        assert_eq!(out.body, Bytes::from_static(b"0123456789"));
        assert_eq!(out.content_length, Some(10));
        assert_eq!(
            *events.lock().unwrap(),
            vec![(4, Some(10)), (8, Some(10)), (10, Some(10))]
        );
    }

    #[test]
    fn test_should_ignore_cancellation_after_full_receipt() {
        let transport = Arc::new(object_response(b"done"));
        // First poll precedes the only read; a second poll would cancel.
        let (handler, polls) = cancel_on_poll(2);

        let out = service(&transport, 64)
            .get_bucket("photos", None)
            .get_object_request("done.txt", GetObjectInput::default())
            .with_cancellation(handler)
            .send()
            .unwrap();

        assert_eq!(out.body, Bytes::from_static(b"done"));
        assert_eq!(polls.load(Ordering::SeqCst), 1);
    }
}

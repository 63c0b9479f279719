//! Error handling integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use qingstor_sdk::RequestError;
    use qingstor_sdk::model::{GetObjectInput, ListObjectsInput, PutObjectInput};

    use crate::{StubTransport, service};

    #[test]
    fn test_should_parse_service_error_document() {
        let transport = Arc::new(StubTransport::json(
            StatusCode::NOT_FOUND,
            r#"{"code":"bucket_not_exists","message":"The bucket you are accessing does not exist.","request_id":"aa08cf7a43f611e5886952542e6ce14b","url":"https://docs.qingcloud.com/object_storage/api/error_code.html"}"#,
        ));

        let err = service(&transport, 1024)
            .get_bucket("ghost", None)
            .list_objects(ListObjectsInput::default())
            .unwrap_err();

        let service_error = err.as_service_error().unwrap();
        assert_eq!(service_error.status_code, 404);
        assert_eq!(service_error.code.as_deref(), Some("bucket_not_exists"));
        assert_eq!(
            service_error.request_id.as_deref(),
            Some("aa08cf7a43f611e5886952542e6ce14b")
        );
        assert!(service_error.url.is_some());
        assert!(err.to_string().contains("bucket_not_exists"), "{err}");
    }

    #[test]
    fn test_should_keep_raw_body_of_unparseable_error() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/html"));
        headers.insert("x-qs-request-id", HeaderValue::from_static("gw-503"));
        let body = Bytes::from_static(b"<html><body>Service Unavailable");
        let transport = Arc::new(StubTransport::fixed(
            StatusCode::SERVICE_UNAVAILABLE,
            headers,
            body.clone(),
        ));

        let err = service(&transport, 1024)
            .get_bucket("photos", None)
            .get_object("a.txt", GetObjectInput::default())
            .unwrap_err();

        let service_error = err.as_service_error().unwrap();
        assert_eq!(service_error.status_code, 503);
        assert_eq!(service_error.code, None);
        assert_eq!(service_error.message, None);
        assert_eq!(service_error.request_id.as_deref(), Some("gw-503"));
        assert_eq!(service_error.raw_body, body);
    }

    #[test]
    fn test_should_fail_missing_path_field_without_io() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));
        let service = service(&transport, 1024);

        let err = service
            .get_bucket("", None)
            .list_objects(ListObjectsInput::default())
            .unwrap_err();
        assert!(
            matches!(&err, RequestError::MissingRequiredField(name) if name == "bucket_name"),
            "{err:?}"
        );

        let err = service
            .get_bucket("photos", None)
            .put_object("", PutObjectInput::default())
            .unwrap_err();
        assert!(
            matches!(&err, RequestError::MissingRequiredField(name) if name == "object_key"),
            "{err:?}"
        );
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_should_reject_invalid_arguments_without_io() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));
        let bucket = service(&transport, 1024).get_bucket("photos", None);

        let err = bucket
            .list_objects(ListObjectsInput {
                limit: Some(5000),
                ..ListObjectsInput::default()
            })
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidArgument(_)), "{err:?}");

        let err = bucket
            .put_object(
                "a.txt",
                PutObjectInput {
                    storage_class: Some("COLD".to_owned()),
                    ..PutObjectInput::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidArgument(_)), "{err:?}");
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_should_presign_get_object_without_io() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));
        let handler = service(&transport, 1024)
            .get_bucket("photos", None)
            .get_object_request("2024/cat.jpg", GetObjectInput::default());

        let url = handler.presigned_url(1_893_456_000).unwrap();
        assert!(
            url.starts_with("https://pek3a.qingstor.com/photos/2024/cat.jpg?"),
            "{url}"
        );
        assert!(url.contains("access_key_id=QYACCESSKEYIDEXAMPLE"), "{url}");
        assert!(url.contains("expires=1893456000"), "{url}");
        assert!(url.contains("signature="), "{url}");

        // Presigning is deterministic for a fixed expiry.
        assert_eq!(handler.presigned_url(1_893_456_000).unwrap(), url);
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_should_reject_non_positive_expiry() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));
        let handler = service(&transport, 1024)
            .get_bucket("photos", None)
            .get_object_request("a.txt", GetObjectInput::default());

        let err = handler.presigned_url(0).unwrap_err();
        assert!(matches!(err, RequestError::Signing(_)), "{err:?}");
    }
}

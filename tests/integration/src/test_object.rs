//! Bucket and object operation integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, Method, StatusCode};
    use qingstor_sdk::model::{
        AclModel, GetBucketAclInput, GranteeModel, HeadObjectInput, ListObjectsInput,
        PutBucketAclInput, PutObjectInput,
    };
    use qingstor_sdk::{ClientConfig, DocumentFormat, Zone};
    use serde_json::{Value, json};

    use crate::{StubTransport, service, service_with};

    fn public_read() -> Vec<AclModel> {
        vec![AclModel {
            grantee: GranteeModel {
                grantee_type: Some("group".to_owned()),
                id: None,
                name: Some("QS_ALL_USERS".to_owned()),
            },
            permission: Some("READ".to_owned()),
        }]
    }

    #[test]
    fn test_should_head_object_and_read_headers() -> anyhow::Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from_static("2048"));
        headers.insert("content-type", HeaderValue::from_static("image/jpeg"));
        headers.insert("etag", HeaderValue::from_static("\"9f2c\""));
        headers.insert("x-qs-storage-class", HeaderValue::from_static("STANDARD_IA"));
        let transport = Arc::new(StubTransport::fixed(StatusCode::OK, headers, Bytes::new()));

        let out = service(&transport, 1024)
            .get_bucket("photos", None)
            .head_object("2024/cat.jpg", HeadObjectInput::default())?;

        assert_eq!(out.content_length, Some(2048));
        assert_eq!(out.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(out.etag.as_deref(), Some("\"9f2c\""));
        assert_eq!(out.storage_class.as_deref(), Some("STANDARD_IA"));

        let request = transport.last();
        assert_eq!(request.method, Method::HEAD);
        assert_eq!(request.url, "https://pek3a.qingstor.com/photos/2024/cat.jpg");
        Ok(())
    }

    #[test]
    fn test_should_put_object_with_metadata_headers() {
        let transport = Arc::new(StubTransport::echo());
        let input = PutObjectInput {
            content_type: Some("text/plain".to_owned()),
            storage_class: Some("STANDARD".to_owned()),
            body: Some(Bytes::from_static(b"hello")),
            ..PutObjectInput::default()
        };

        service(&transport, 1024)
            .get_bucket("photos", None)
            .put_object("notes/hello.txt", input)
            .unwrap();

        let request = transport.last();
        assert_eq!(request.method, Method::PUT);
        assert_eq!(request.headers["content-type"], "text/plain");
        assert_eq!(request.headers["content-length"], "5");
        assert_eq!(request.headers["x-qs-storage-class"], "STANDARD");
        assert_eq!(request.body, b"hello");
    }

    #[test]
    fn test_should_use_bucket_zone_over_service_zone() -> anyhow::Result<()> {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, r#"{"keys":[]}"#));

        let out = service(&transport, 1024)
            .get_bucket("archive", Some(Zone::new("gd2")?))
            .list_objects(ListObjectsInput {
                delimiter: Some("/".to_owned()),
                ..ListObjectsInput::default()
            })?;

        assert_eq!(out.keys, Some(Vec::new()));
        assert_eq!(
            transport.last().url,
            "https://gd2.qingstor.com/archive?delimiter=%2F"
        );
        Ok(())
    }

    #[test]
    fn test_should_address_bucket_through_host_in_virtual_host_style() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));
        let config = ClientConfig::builder()
            .enable_virtual_host_style(true)
            .build();

        service_with(&transport, config)
            .get_bucket("photos", None)
            .head_object("a.txt", HeadObjectInput::default())
            .unwrap();

        assert_eq!(transport.last().url, "https://photos.pek3a.qingstor.com/a.txt");
    }

    #[test]
    fn test_should_put_bucket_acl_document() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));

        service(&transport, 1024)
            .get_bucket("photos", None)
            .put_acl(PutBucketAclInput {
                acl: Some(public_read()),
                ..PutBucketAclInput::default()
            })
            .unwrap();

        let request = transport.last();
        assert_eq!(request.url, "https://pek3a.qingstor.com/photos?acl");
        assert_eq!(request.headers["content-type"], "application/json");
        let document: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            document,
            json!({"acl": [{"grantee": {"type": "group", "name": "QS_ALL_USERS"}, "permission": "READ"}]})
        );
    }

    #[test]
    fn test_should_put_bucket_acl_as_xml() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, "{}"));
        let config = ClientConfig::builder()
            .document_format(DocumentFormat::Xml)
            .build();

        service_with(&transport, config)
            .get_bucket("photos", None)
            .put_acl(PutBucketAclInput {
                acl: Some(public_read()),
                ..PutBucketAclInput::default()
            })
            .unwrap();

        let request = transport.last();
        assert_eq!(request.headers["content-type"], "application/xml");
        let text = String::from_utf8(request.body).unwrap();
        assert!(text.contains("<AccessControlPolicy><acl><grantee>"), "{text}");
        assert!(text.contains("<permission>READ</permission>"), "{text}");
    }

    #[test]
    fn test_should_read_bucket_acl() -> anyhow::Result<()> {
        let transport = Arc::new(StubTransport::json(
            StatusCode::OK,
            r#"{"owner":{"id":"usr-7","name":"ops"},"acl":[{"grantee":{"type":"user","id":"usr-7","name":"ops"},"permission":"FULL_CONTROL"}]}"#,
        ));

        let out = service(&transport, 1024)
            .get_bucket("photos", None)
            .get_acl(GetBucketAclInput::default())?;

        let owner = out.owner.ok_or_else(|| anyhow::anyhow!("owner missing"))?;
        assert_eq!(owner.id.as_deref(), Some("usr-7"));
        let acl = out.acl.unwrap_or_default();
        assert_eq!(acl.len(), 1);
        assert_eq!(acl[0].grantee.grantee_type.as_deref(), Some("user"));
        assert_eq!(acl[0].permission.as_deref(), Some("FULL_CONTROL"));
        Ok(())
    }
}

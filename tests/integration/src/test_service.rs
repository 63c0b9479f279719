//! Service-level and field routing integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::{Method, StatusCode};
    use qingstor_request::{
        Dispatcher, FieldSpec, FieldValue, FromFieldValue, OperationContext, RequestHandler,
        RequestInput, ResponseMeta, ResponseOutput,
    };
    use qingstor_sdk::model::ListBucketsInput;
    use qingstor_sdk::{ClientConfig, DocumentFormat, StaticCredentialProvider};
    use serde_json::{Value, json};

    use crate::{StubTransport, service};

    const LISTING: &str = r#"{
        "count": 2,
        "buckets": [
            {"name": "photos", "location": "pek3a", "url": "https://photos.pek3a.qingstor.com"},
            {"name": "logs", "location": "sh1a", "created": "2024-03-01T08:00:00Z"}
        ]
    }"#;

    #[test]
    fn test_should_list_buckets_with_paging_query() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, LISTING));
        let input = ListBucketsInput {
            offset: Some(10),
            limit: Some(5),
            ..ListBucketsInput::default()
        };

        let out = service(&transport, 1024).list_buckets(input).unwrap();
        assert_eq!(out.meta.status_code, 200);
        assert_eq!(out.meta.request_id.as_deref(), Some("stub-request"));
        assert_eq!(out.count, Some(2));
        let buckets = out.buckets.unwrap();
        assert_eq!(buckets[0].name.as_deref(), Some("photos"));
        assert_eq!(buckets[1].created.as_deref(), Some("2024-03-01T08:00:00Z"));

        let request = transport.last();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://pek3a.qingstor.com/?limit=5&offset=10");
        assert_eq!(request.content_length, 0);
        assert!(request.headers.contains_key("date"));
        let authorization = request.headers["authorization"].to_str().unwrap();
        assert!(authorization.starts_with("QS QYACCESSKEYIDEXAMPLE:"), "{authorization}");
    }

    #[test]
    fn test_should_send_location_as_header() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, LISTING));
        let input = ListBucketsInput {
            location: Some("sh1a".to_owned()),
            ..ListBucketsInput::default()
        };

        service(&transport, 1024).list_buckets(input).unwrap();
        let request = transport.last();
        assert_eq!(request.headers["location"], "sh1a");
        assert_eq!(request.url, "https://pek3a.qingstor.com/");
    }

    #[test]
    fn test_should_include_non_default_port_and_default_headers() {
        let transport = Arc::new(StubTransport::json(StatusCode::OK, LISTING));
        let config = ClientConfig::builder()
            .protocol("http")
            .port(8080)
            .additional_user_agent("backup-tool/2.1")
            .default_headers([("x-qs-client".to_owned(), "nightly".to_owned())].into())
            .build();

        crate::service_with(&transport, config)
            .list_buckets(ListBucketsInput::default())
            .unwrap();
        let request = transport.last();
        assert_eq!(request.url, "http://pek3a.qingstor.com:8080/");
        assert_eq!(request.headers["x-qs-client"], "nightly");
        let agent = request.headers["user-agent"].to_str().unwrap();
        assert!(agent.ends_with(" backup-tool/2.1"), "{agent}");
    }

    /// A metadata update: one header and two document elements.
    #[derive(Debug, Default)]
    struct TagInput {
        owner: Option<String>,
        count: Option<i64>,
        tags: Option<Vec<String>>,
    }

    impl RequestInput for TagInput {
        const FIELDS: &'static [FieldSpec] = &[
            FieldSpec::header("owner", "x-qs-meta-owner"),
            FieldSpec::element("count", "count"),
            FieldSpec::element("tags", "tags"),
        ];

        fn field_value(&self, name: &str) -> Option<FieldValue> {
            match name {
                "owner" => self.owner.clone().map(FieldValue::from),
                "count" => self.count.map(FieldValue::from),
                "tags" => self
                    .tags
                    .clone()
                    .map(|tags| FieldValue::Document(json!(tags))),
                _ => None,
            }
        }
    }

    #[derive(Debug, Default)]
    struct TagOutput {
        meta: ResponseMeta,
        owner: Option<String>,
        count: Option<i64>,
        tags: Option<Vec<String>>,
    }

    impl ResponseOutput for TagOutput {
        const FIELDS: &'static [FieldSpec] = &[
            FieldSpec::header("owner", "x-qs-meta-owner"),
            FieldSpec::element("count", "count"),
            FieldSpec::element("tags", "tags"),
        ];

        fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), String> {
            match name {
                "owner" => self.owner = Some(String::from_field_value(value)?),
                "count" => self.count = Some(i64::from_field_value(value)?),
                "tags" => self.tags = Some(Vec::from_field_value(value)?),
                _ => {}
            }
            Ok(())
        }

        fn meta_mut(&mut self) -> &mut ResponseMeta {
            &mut self.meta
        }
    }

    fn colours() -> Vec<String> {
        vec!["red".to_owned(), "blue".to_owned()]
    }

    fn echo_round_trip(format: DocumentFormat, tags: Vec<String>) -> (TagOutput, Vec<u8>) {
        let transport = Arc::new(StubTransport::echo());
        let config = ClientConfig::builder().document_format(format).build();
        let ctx = OperationContext::builder()
            .service_name("QingStor")
            .operation_name("PutTags")
            .method(Method::PUT)
            .path_template("/")
            .credentials(Arc::new(StaticCredentialProvider::new("AK", "SK")))
            .config(Arc::new(config))
            .build();
        let input = TagInput {
            owner: Some("alice".to_owned()),
            count: Some(3),
            tags: Some(tags),
        };

        let dispatcher = Dispatcher::new(transport.clone());
        let output = RequestHandler::<_, TagOutput>::new(ctx, input, dispatcher)
            .send()
            .unwrap();
        (output, transport.last().body)
    }

    #[test]
    fn test_should_round_trip_header_and_elements_as_json() {
        let (output, sent) = echo_round_trip(DocumentFormat::Json, colours());

        let document: Value = serde_json::from_slice(&sent).unwrap();
        assert_eq!(document, json!({"count": 3, "tags": ["red", "blue"]}));
        assert_eq!(output.owner.as_deref(), Some("alice"));
        assert_eq!(output.count, Some(3));
        assert_eq!(output.tags, Some(vec!["red".to_owned(), "blue".to_owned()]));
    }

    #[test]
    fn test_should_round_trip_header_and_elements_as_xml() {
        let (output, sent) = echo_round_trip(DocumentFormat::Xml, colours());

        let text = String::from_utf8(sent).unwrap();
        assert!(text.contains("<tags>red</tags><tags>blue</tags>"), "{text}");
        assert_eq!(output.owner.as_deref(), Some("alice"));
        assert_eq!(output.count, Some(3));
        assert_eq!(output.tags, Some(vec!["red".to_owned(), "blue".to_owned()]));
    }

    #[test]
    fn test_should_round_trip_empty_list_as_xml() {
        let (output, sent) = echo_round_trip(DocumentFormat::Xml, Vec::new());

        let text = String::from_utf8(sent).unwrap();
        assert!(text.contains("<tags/>"), "{text}");
        assert_eq!(output.count, Some(3));
        assert_eq!(output.tags, Some(Vec::new()));
    }

    #[test]
    fn test_should_round_trip_empty_list_as_json() {
        let (output, sent) = echo_round_trip(DocumentFormat::Json, Vec::new());

        let document: Value = serde_json::from_slice(&sent).unwrap();
        assert_eq!(document, json!({"count": 3, "tags": []}));
        assert_eq!(output.tags, Some(Vec::new()));
    }
}

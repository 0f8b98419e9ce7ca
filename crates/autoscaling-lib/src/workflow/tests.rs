//! Tests for the binding configuration workflow
//!
//! A single mockito server plays both the control plane and the
//! Autoscaling API; they are told apart by path.

use super::*;
use crate::client::JsonClient;
use crate::error::ClientError;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

const BINDINGS_QUERY: &str =
    "q=app_guid%3Asome-app-guid&q=service_instance_guid%3Asome-service-instance-guid";
const BINDING_PATH: &str = "/api/bindings/some-service-binding-guid";
const CURRENT_BINDING: &str = r#"{
    "min_instances": 3,
    "max_instances": 7,
    "cpu_min_threshold": 20,
    "cpu_max_threshold": 80,
    "enabled": false
}"#;

fn context(server: &ServerGuard) -> WorkflowContext {
    WorkflowContext {
        app_name: "app-name".to_string(),
        service_name: "service-name".to_string(),
        app_guid: "some-app-guid".to_string(),
        service_guid: "some-service-instance-guid".to_string(),
        dashboard_url: format!("{}/something-that-doesnot-matter", server.url()),
        api_endpoint: server.url(),
        client: JsonClient::new("bearer some-token", false).unwrap(),
    }
}

fn flags() -> OverrideFlags {
    OverrideFlags::from_flag_values(9, 30, 10, 90)
}

async fn mock_service_bindings(server: &mut ServerGuard, body: &str) -> Mock {
    server
        .mock("GET", "/v2/service_bindings")
        .match_query(Matcher::Exact(BINDINGS_QUERY.to_string()))
        .match_header("authorization", "bearer some-token")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

async fn mock_single_binding(server: &mut ServerGuard) -> Mock {
    mock_service_bindings(
        server,
        r#"{"Resources": [{"Metadata": {"GUID": "some-service-binding-guid"}}]}"#,
    )
    .await
}

async fn mock_current_binding(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", BINDING_PATH)
        .match_header("authorization", "bearer some-token")
        .with_status(200)
        .with_body(CURRENT_BINDING)
        .create_async()
        .await
}

async fn mock_submit(server: &mut ServerGuard, expected: serde_json::Value) -> Mock {
    server
        .mock("POST", BINDING_PATH)
        .match_header("authorization", "bearer some-token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(expected))
        .with_status(200)
        .create_async()
        .await
}

async fn mock_no_submit(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", BINDING_PATH)
        .expect(0)
        .create_async()
        .await
}

mod url_tests {
    use super::*;

    #[test]
    fn test_service_bindings_url() {
        let url = service_bindings_url(
            "https://cloudcontroller.example.com",
            "some-app-guid",
            "some-service-instance-guid",
        )
        .unwrap();

        assert_eq!(
            url,
            "https://cloudcontroller.example.com/v2/service_bindings?q=app_guid%3Asome-app-guid&q=service_instance_guid%3Asome-service-instance-guid"
        );
    }

    #[test]
    fn test_service_bindings_url_replaces_existing_path_and_query() {
        let url = service_bindings_url("https://api.example.com/v3?x=1", "a", "s").unwrap();
        assert_eq!(
            url,
            "https://api.example.com/v2/service_bindings?q=app_guid%3Aa&q=service_instance_guid%3As"
        );
    }

    #[test]
    fn test_invalid_api_endpoint() {
        let err = service_bindings_url("%%%", "a", "s").unwrap_err();
        assert_eq!(err.to_string(), "invalid API URL from cli: %%%");
    }

    #[test]
    fn test_autoscaling_binding_url_keeps_scheme_and_host_only() {
        let url = autoscaling_binding_url(
            "http://autoscaling.example.com/something-that-doesnot-matter?x=1#frag",
            "some-service-binding-guid",
        )
        .unwrap();

        assert_eq!(
            url,
            "http://autoscaling.example.com/api/bindings/some-service-binding-guid"
        );
    }

    #[test]
    fn test_autoscaling_binding_url_keeps_port() {
        let url = autoscaling_binding_url("https://autoscaling.example.com:8443/dash", "g").unwrap();
        assert_eq!(url, "https://autoscaling.example.com:8443/api/bindings/g");
    }

    #[test]
    fn test_invalid_dashboard_url() {
        let err = autoscaling_binding_url("%%%", "g").unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidDashboardUrl(_)));
        assert_eq!(
            err.to_string(),
            "invalid dashboard URL from service instance: %%%"
        );
    }
}

mod configure_tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_fetches_and_submits_overrides() {
        let mut server = mockito::Server::new_async().await;
        let bindings = mock_single_binding(&mut server).await;
        let current = mock_current_binding(&mut server).await;
        let submit = mock_submit(
            &mut server,
            json!({
                "app_guid": "some-app-guid",
                "min_instances": 9,
                "max_instances": 30,
                "cpu_min_threshold": 10,
                "cpu_max_threshold": 90,
                "enabled": true
            }),
        )
        .await;

        let submitted = configure_autoscaling(&context(&server), &flags())
            .await
            .unwrap();

        bindings.assert_async().await;
        current.assert_async().await;
        submit.assert_async().await;
        assert_eq!(
            submitted,
            AutoscalingBinding {
                app_guid: "some-app-guid".to_string(),
                min_instances: 9,
                max_instances: 30,
                cpu_min_threshold: 10,
                cpu_max_threshold: 90,
                enabled: true,
            }
        );
    }

    #[tokio::test]
    async fn test_without_overrides_only_enables_binding() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let _current = mock_current_binding(&mut server).await;
        let submit = mock_submit(
            &mut server,
            json!({
                "app_guid": "some-app-guid",
                "min_instances": 3,
                "max_instances": 7,
                "cpu_min_threshold": 20,
                "cpu_max_threshold": 80,
                "enabled": true
            }),
        )
        .await;

        configure_autoscaling(&context(&server), &OverrideFlags::default())
            .await
            .unwrap();

        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_single_override_keeps_other_fetched_values() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let _current = mock_current_binding(&mut server).await;
        let submit = mock_submit(
            &mut server,
            json!({
                "app_guid": "some-app-guid",
                "min_instances": 3,
                "max_instances": 7,
                "cpu_min_threshold": 20,
                "cpu_max_threshold": 95,
                "enabled": true
            }),
        )
        .await;

        let overrides = OverrideFlags::from_flag_values(0, 0, 0, 95);
        configure_autoscaling(&context(&server), &overrides)
            .await
            .unwrap();

        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_inverted_instance_range_is_not_submitted() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let _current = mock_current_binding(&mut server).await;
        let submit = mock_no_submit(&mut server).await;

        let overrides = OverrideFlags::from_flag_values(35, 34, 0, 0);
        let err = configure_autoscaling(&context(&server), &overrides)
            .await
            .unwrap_err();

        submit.assert_async().await;
        assert!(matches!(err, WorkflowError::InstanceRange { min: 35, max: 34 }));
        assert_eq!(err.to_string(), "min instances must be <= max instances");
    }

    #[tokio::test]
    async fn test_override_crossing_fetched_bound_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let _current = mock_current_binding(&mut server).await;
        let submit = mock_no_submit(&mut server).await;

        // Fetched max_instances is 7
        let overrides = OverrideFlags::from_flag_values(8, 0, 0, 0);
        let err = configure_autoscaling(&context(&server), &overrides)
            .await
            .unwrap_err();

        submit.assert_async().await;
        assert!(matches!(err, WorkflowError::InstanceRange { min: 8, max: 7 }));
    }

    #[tokio::test]
    async fn test_inverted_threshold_range_is_not_submitted() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let _current = mock_current_binding(&mut server).await;
        let submit = mock_no_submit(&mut server).await;

        let overrides = OverrideFlags::from_flag_values(0, 0, 75, 24);
        let err = configure_autoscaling(&context(&server), &overrides)
            .await
            .unwrap_err();

        submit.assert_async().await;
        assert!(matches!(err, WorkflowError::ThresholdRange { min: 75, max: 24 }));
        assert_eq!(
            err.to_string(),
            "CPU min threshold must be <= CPU max threshold"
        );
    }
}

mod resolution_tests {
    use super::*;

    async fn mock_no_fetch(server: &mut ServerGuard) -> Mock {
        server
            .mock("GET", BINDING_PATH)
            .expect(0)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_no_binding_found() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_service_bindings(&mut server, r#"{"Resources": []}"#).await;
        let fetch = mock_no_fetch(&mut server).await;

        let err = configure_autoscaling(&context(&server), &flags())
            .await
            .unwrap_err();

        fetch.assert_async().await;
        assert!(matches!(err, WorkflowError::BindingResolution { matches: 0, .. }));
        assert_eq!(
            err.to_string(),
            "couldn't find service binding for app-name to service-name"
        );
    }

    #[tokio::test]
    async fn test_multiple_bindings_are_not_disambiguated() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_service_bindings(
            &mut server,
            r#"{"Resources": [
                {"Metadata": {"GUID": "some-service-binding-guid"}},
                {"Metadata": {"GUID": "another-service-binding-guid"}}
            ]}"#,
        )
        .await;
        let fetch = mock_no_fetch(&mut server).await;

        let err = configure_autoscaling(&context(&server), &flags())
            .await
            .unwrap_err();

        fetch.assert_async().await;
        assert!(matches!(err, WorkflowError::BindingResolution { matches: 2, .. }));
    }

    #[tokio::test]
    async fn test_lowercase_control_plane_shape() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_service_bindings(
            &mut server,
            r#"{"total_results": 1, "resources": [{"metadata": {"guid": "some-service-binding-guid"}, "entity": {}}]}"#,
        )
        .await;

        let guid = resolve_binding_guid(&context(&server)).await.unwrap();
        assert_eq!(guid, "some-service-binding-guid");
    }

    #[tokio::test]
    async fn test_missing_binding_guid_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _bindings =
            mock_service_bindings(&mut server, r#"{"Resources": [{"Metadata": {}}]}"#).await;

        let err = resolve_binding_guid(&context(&server)).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::RemoteCall {
                hop: Hop::ServiceBinding,
                error: ClientError::ResponseParse(_),
            }
        ));
    }
}

mod remote_failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_api_endpoint() {
        let server = mockito::Server::new_async().await;
        let mut ctx = context(&server);
        ctx.api_endpoint = "%%%".to_string();

        let err = configure_autoscaling(&ctx, &flags()).await.unwrap_err();
        assert_eq!(err.to_string(), "invalid API URL from cli: %%%");
    }

    #[tokio::test]
    async fn test_control_plane_failure() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = server
            .mock("GET", "/v2/service_bindings")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = configure_autoscaling(&context(&server), &flags())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::RemoteCall {
                hop: Hop::ServiceBinding,
                error: ClientError::UnexpectedStatus(_),
            }
        ));
        assert!(err
            .to_string()
            .starts_with("couldn't retrieve service binding: unexpected response code: 500"));
    }

    #[tokio::test]
    async fn test_invalid_dashboard_url() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let mut ctx = context(&server);
        ctx.dashboard_url = "%%%".to_string();

        let err = configure_autoscaling(&ctx, &flags()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid dashboard URL from service instance: %%%"
        );
    }

    #[tokio::test]
    async fn test_autoscaling_read_failure() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let _current = server
            .mock("GET", BINDING_PATH)
            .with_status(404)
            .create_async()
            .await;
        let submit = mock_no_submit(&mut server).await;

        let err = configure_autoscaling(&context(&server), &flags())
            .await
            .unwrap_err();

        submit.assert_async().await;
        assert!(err
            .to_string()
            .starts_with("autoscaling API: unexpected response code: 404"));
    }

    #[tokio::test]
    async fn test_autoscaling_write_failure() {
        let mut server = mockito::Server::new_async().await;
        let _bindings = mock_single_binding(&mut server).await;
        let _current = mock_current_binding(&mut server).await;
        let _submit = server
            .mock("POST", BINDING_PATH)
            .with_status(503)
            .create_async()
            .await;

        let err = configure_autoscaling(&context(&server), &flags())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::RemoteCall {
                hop: Hop::AutoscalingApi,
                ..
            }
        ));
        assert!(err
            .to_string()
            .starts_with("autoscaling API: unexpected response code: 503"));
    }
}

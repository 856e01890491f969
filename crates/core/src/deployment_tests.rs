// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn descriptor_defaults_optional_fields() {
    let json = r#"{"app_id":"web","image":"nginx:1.27","internal_port":80}"#;
    let deployment: Deployment = serde_json::from_str(json).unwrap();
    assert_eq!(deployment, Deployment::new("web", "nginx:1.27", 80));
    assert_eq!(deployment.runtime.kind, RuntimeKind::Docker);
    assert!(deployment.domains.is_empty());
}

#[test]
fn descriptor_parses_runtime_binding() {
    let json = r#"{
        "app_id": "api",
        "deployment_id": "dep-42",
        "image": "ghcr.io/acme/api:7",
        "internal_port": 8080,
        "domains": ["api.example.com"],
        "env": {"RUST_LOG": "info"},
        "runtime": {"kind": "podman", "options": {"memory": "512m"}}
    }"#;
    let deployment: Deployment = serde_json::from_str(json).unwrap();
    assert_eq!(deployment.deployment_id.as_deref(), Some("dep-42"));
    assert_eq!(deployment.runtime.kind.binary(), "podman");
    assert_eq!(deployment.runtime.options.get("memory").map(String::as_str), Some("512m"));
    assert_eq!(deployment.env.get("RUST_LOG").map(String::as_str), Some("info"));
}

#[yare::parameterized(
    uppercase   = { "Web" },
    empty       = { "" },
    leading_dot = { ".web" },
    slash       = { "web/api" },
)]
fn validate_rejects_bad_app_ids(app_id: &str) {
    let deployment = Deployment::new(app_id, "nginx", 80);
    assert!(matches!(deployment.validate(), Err(DeploymentError::InvalidAppId(_))));
}

#[test]
fn validate_rejects_empty_image_and_zero_port() {
    assert_eq!(Deployment::new("web", " ", 80).validate(), Err(DeploymentError::MissingImage));
    assert_eq!(Deployment::new("web", "nginx", 0).validate(), Err(DeploymentError::InvalidPort));
    assert_eq!(Deployment::new("web-2.api_x", "nginx", 80).validate(), Ok(()));
}

#[test]
fn route_id_is_derived_from_app_id() {
    assert_eq!(Deployment::new("appid", "nginx", 80).route_id(), "appid-route");
}

#[test]
fn container_name_round_trips_deployment_id() {
    let id = DeploymentId::from("dep-abc123");
    let name = container_name("web-api", &id);
    assert_eq!(name, "web-api-dep-abc123");
    assert_eq!(deployment_id_from_container("web-api", &name), Some(id));
}

#[test]
fn deployment_id_from_foreign_container_is_none() {
    assert_eq!(deployment_id_from_container("web", "other-dep-1"), None);
    assert_eq!(deployment_id_from_container("web", "web-"), None);
}

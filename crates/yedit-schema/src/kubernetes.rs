//! # Built-in Kubernetes Schemas
//!
//! The fallback layer consulted in Kubernetes mode when no explicit
//! association matches. Each YAML document in a stream is governed by the
//! schema for its `kind`; kinds without a dedicated schema get the generic
//! object schema, which only requires `apiVersion`, `kind` and `metadata`.
//!
//! The schemas cover the fields people actually edit by hand. They are not
//! a replacement for the upstream OpenAPI definitions.

use std::sync::Arc;

use serde_json::{json, Value};
use yedit_core::SchemaId;

/// Name of the layer under the `builtin:` identity prefix.
pub const KUBERNETES_LAYER: &str = "kubernetes";

/// Identity reported for documents governed by the Kubernetes layer.
pub fn kubernetes_schema_id() -> SchemaId {
    SchemaId::builtin(KUBERNETES_LAYER)
}

/// Label used when a document's kind has no dedicated schema.
pub const GENERIC_KIND: &str = "Object";

/// The catalog of built-in schemas, keyed by resource kind.
#[derive(Debug, Clone)]
pub struct KubernetesCatalog {
    kinds: Vec<(&'static str, Arc<Value>)>,
    generic: Arc<Value>,
}

impl Default for KubernetesCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl KubernetesCatalog {
    /// Build the catalog.
    pub fn new() -> Self {
        let kinds = vec![
            ("ConfigMap", config_map()),
            ("Deployment", workload("Deployment")),
            ("StatefulSet", workload("StatefulSet")),
            ("DaemonSet", workload("DaemonSet")),
            ("Job", job()),
            ("Namespace", resource("Namespace", json!({}))),
            ("Pod", resource("Pod", pod_spec())),
            ("Secret", secret()),
            ("Service", service()),
        ];
        Self {
            kinds: kinds.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
            generic: Arc::new(generic_object()),
        }
    }

    /// Kinds with a dedicated schema.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.iter().map(|(k, _)| *k)
    }

    /// The schema governing a document of `kind`, with the label of the
    /// schema actually chosen.
    pub fn schema_for(&self, kind: Option<&str>) -> (&'static str, &Arc<Value>) {
        kind.and_then(|k| self.kinds.iter().find(|(name, _)| *name == k))
            .map_or((GENERIC_KIND, &self.generic), |(name, schema)| (*name, schema))
    }

    /// Every schema in the catalog, generic included.
    pub fn all(&self) -> impl Iterator<Item = (&'static str, &Arc<Value>)> + '_ {
        self.kinds
            .iter()
            .map(|(k, v)| (*k, v))
            .chain(std::iter::once((GENERIC_KIND, &self.generic)))
    }
}

/// Read the `kind` of a parsed document.
pub fn document_kind(document: &Value) -> Option<&str> {
    document.get("kind").and_then(Value::as_str)
}

// ─── Schema fragments ────────────────────────────────────────────────

fn object_meta() -> Value {
    json!({
        "type": "object",
        "description": "Standard object metadata.",
        "properties": {
            "name": {
                "type": "string",
                "description": "Name must be unique within a namespace."
            },
            "namespace": {
                "type": "string",
                "description": "Namespace defines the space within which each name must be unique."
            },
            "labels": {
                "type": "object",
                "description": "Map of string keys and values used to organize and select objects.",
                "additionalProperties": { "type": "string" }
            },
            "annotations": {
                "type": "object",
                "description": "Unstructured key value map stored with a resource.",
                "additionalProperties": { "type": "string" }
            }
        }
    })
}

fn envelope_properties(kind: Option<&str>) -> serde_json::Map<String, Value> {
    let kind_schema = match kind {
        Some(k) => json!({
            "type": "string",
            "const": k,
            "description": "Kind is a string value representing the REST resource this object represents."
        }),
        None => json!({
            "type": "string",
            "description": "Kind is a string value representing the REST resource this object represents."
        }),
    };
    let mut props = serde_json::Map::new();
    props.insert(
        "apiVersion".to_string(),
        json!({
            "type": "string",
            "description": "APIVersion defines the versioned schema of this representation of an object."
        }),
    );
    props.insert("kind".to_string(), kind_schema);
    props.insert("metadata".to_string(), object_meta());
    props
}

fn generic_object() -> Value {
    json!({
        "title": "Kubernetes object",
        "type": "object",
        "required": ["apiVersion", "kind", "metadata"],
        "properties": Value::Object(envelope_properties(None))
    })
}

fn resource(kind: &str, spec: Value) -> Value {
    let mut props = envelope_properties(Some(kind));
    if spec.as_object().is_some_and(|o| !o.is_empty()) {
        props.insert("spec".to_string(), spec);
    }
    json!({
        "title": kind,
        "type": "object",
        "required": ["apiVersion", "kind", "metadata"],
        "properties": Value::Object(props)
    })
}

fn container() -> Value {
    json!({
        "type": "object",
        "description": "A single application container that you want to run within a pod.",
        "required": ["name"],
        "properties": {
            "name": { "type": "string", "description": "Name of the container specified as a DNS_LABEL." },
            "image": { "type": "string", "description": "Container image name." },
            "imagePullPolicy": {
                "type": "string",
                "description": "Image pull policy.",
                "enum": ["Always", "IfNotPresent", "Never"]
            },
            "command": { "type": "array", "items": { "type": "string" }, "description": "Entrypoint array." },
            "args": { "type": "array", "items": { "type": "string" }, "description": "Arguments to the entrypoint." },
            "ports": {
                "type": "array",
                "description": "List of ports to expose from the container.",
                "items": {
                    "type": "object",
                    "required": ["containerPort"],
                    "properties": {
                        "name": { "type": "string" },
                        "containerPort": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 65535,
                            "description": "Number of port to expose on the pod's IP address."
                        },
                        "protocol": { "type": "string", "enum": ["TCP", "UDP", "SCTP"] }
                    }
                }
            },
            "env": {
                "type": "array",
                "description": "List of environment variables to set in the container.",
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "value": { "type": "string" }
                    }
                }
            }
        }
    })
}

fn pod_spec() -> Value {
    json!({
        "type": "object",
        "description": "Specification of the desired behavior of the pod.",
        "required": ["containers"],
        "properties": {
            "containers": {
                "type": "array",
                "minItems": 1,
                "description": "List of containers belonging to the pod.",
                "items": container()
            },
            "restartPolicy": {
                "type": "string",
                "description": "Restart policy for all containers within the pod.",
                "enum": ["Always", "OnFailure", "Never"]
            },
            "serviceAccountName": {
                "type": "string",
                "description": "Name of the ServiceAccount to use to run this pod."
            }
        }
    })
}

fn pod_template() -> Value {
    json!({
        "type": "object",
        "description": "Template describes the pods that will be created.",
        "properties": {
            "metadata": object_meta(),
            "spec": pod_spec()
        }
    })
}

fn workload(kind: &str) -> Value {
    resource(
        kind,
        json!({
            "type": "object",
            "required": ["selector", "template"],
            "properties": {
                "replicas": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Number of desired pods."
                },
                "selector": {
                    "type": "object",
                    "description": "Label query over pods that should match the replica count.",
                    "properties": {
                        "matchLabels": {
                            "type": "object",
                            "additionalProperties": { "type": "string" }
                        }
                    }
                },
                "template": pod_template()
            }
        }),
    )
}

fn job() -> Value {
    resource(
        "Job",
        json!({
            "type": "object",
            "required": ["template"],
            "properties": {
                "backoffLimit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Number of retries before marking this job failed."
                },
                "template": pod_template()
            }
        }),
    )
}

fn service() -> Value {
    resource(
        "Service",
        json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "description": "Determines how the Service is exposed.",
                    "enum": ["ClusterIP", "NodePort", "LoadBalancer", "ExternalName"]
                },
                "selector": {
                    "type": "object",
                    "description": "Route service traffic to pods with label keys and values matching this selector.",
                    "additionalProperties": { "type": "string" }
                },
                "ports": {
                    "type": "array",
                    "description": "The list of ports that are exposed by this service.",
                    "items": {
                        "type": "object",
                        "required": ["port"],
                        "properties": {
                            "name": { "type": "string" },
                            "port": {
                                "type": "integer",
                                "minimum": 1,
                                "maximum": 65535,
                                "description": "The port that will be exposed by this service."
                            },
                            "targetPort": {
                                "type": ["integer", "string"],
                                "description": "Number or name of the port to access on the pods targeted by the service."
                            },
                            "protocol": { "type": "string", "enum": ["TCP", "UDP", "SCTP"] }
                        }
                    }
                }
            }
        }),
    )
}

fn config_map() -> Value {
    let mut schema = resource("ConfigMap", json!({}));
    if let Some(props) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        props.insert(
            "data".to_string(),
            json!({
                "type": "object",
                "description": "Configuration data. Values must be strings.",
                "additionalProperties": { "type": "string" }
            }),
        );
        props.insert(
            "immutable".to_string(),
            json!({ "type": "boolean", "description": "If set, the data cannot be updated." }),
        );
    }
    schema
}

fn secret() -> Value {
    let mut schema = resource("Secret", json!({}));
    if let Some(props) = schema.get_mut("properties").and_then(Value::as_object_mut) {
        props.insert(
            "type".to_string(),
            json!({ "type": "string", "description": "Used to facilitate programmatic handling of secret data." }),
        );
        props.insert(
            "data".to_string(),
            json!({
                "type": "object",
                "description": "Base64 encoded secret data.",
                "additionalProperties": { "type": "string" }
            }),
        );
        props.insert(
            "stringData".to_string(),
            json!({
                "type": "object",
                "description": "Write-only convenience field for non-binary secret data.",
                "additionalProperties": { "type": "string" }
            }),
        );
    }
    schema
}
